mod args;
mod config;
mod output;
mod particles;

use anyhow::{Context, Result, anyhow};
use args::{AnalysisCli, Cli, ModeSelect};
use beam_diagnostics::{BeamReport, current_profile};
use clap::Parser;
use config::CliConfig;
use log::LevelFilter;
use output::{SliceTable, current_text, report_text, slices_text, to_json};
use particles::read_particles;

fn main() -> Result<()> {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .try_init();
    let args = Cli::parse();
    match args.mode {
        ModeSelect::Report(args) => report(&args),
        ModeSelect::Current(args) => current(&args),
        ModeSelect::Slices(args) => slices(&args),
    }
}

fn load_config(args: &AnalysisCli) -> Result<CliConfig> {
    let mut config = CliConfig::load(args.config.as_deref())?;
    config.diagnostics = args.apply(config.diagnostics);
    log::debug!("{:?}", config);
    Ok(config)
}

fn report(args: &AnalysisCli) -> Result<()> {
    let config = load_config(args)?;
    let ensemble = read_particles(&args.particles)?;
    let report =
        BeamReport::compute(&ensemble, &config.diagnostics).context("failed to compute report")?;

    if args.json {
        println!("{}", to_json(&report, &config.output)?);
    } else {
        print!("{}", report_text(&report, &config.output));
    }
    Ok(())
}

fn current(args: &AnalysisCli) -> Result<()> {
    let config = load_config(args)?;
    let ensemble = read_particles(&args.particles)?;
    let charge = ensemble.charge().ok_or(anyhow!(
        "{} has no `q` column, charges are needed for the current profile",
        args.particles.display()
    ))?;
    let profile = current_profile(
        &ensemble.z,
        charge,
        config.diagnostics.slicing,
        config.diagnostics.speed_of_light,
    )
    .context("failed to compute current profile")?;

    if args.json {
        println!("{}", to_json(&profile, &config.output)?);
    } else {
        print!("{}", current_text(&profile, &config.output));
    }
    Ok(())
}

fn slices(args: &AnalysisCli) -> Result<()> {
    let config = load_config(args)?;
    let ensemble = read_particles(&args.particles)?;
    let table = SliceTable::compute(&ensemble, &config.diagnostics)
        .context("failed to compute slice diagnostics")?;

    if args.json {
        println!("{}", to_json(&table, &config.output)?);
    } else {
        print!("{}", slices_text(&table, &config.output));
    }
    Ok(())
}
