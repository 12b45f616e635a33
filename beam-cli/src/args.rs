use std::path::PathBuf;

use beam_diagnostics::{DiagnosticsConfig, EmittanceKind, Slicing};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "Beam CLI")]
#[command(bin_name = "beam-cli")]
pub struct Cli {
    #[clap(subcommand)]
    pub mode: ModeSelect,
}

#[derive(Subcommand, Debug)]
pub enum ModeSelect {
    #[command(about = "print every diagnostic of a particle file")]
    Report(AnalysisCli),

    #[command(about = "print the current profile, needs a `q` column")]
    Current(AnalysisCli),

    #[command(about = "print slice energy spread and slice emittances")]
    Slices(AnalysisCli),
}

#[derive(Parser, Debug)]
pub struct AnalysisCli {
    #[arg(help = "csv file with columns x,y,z,px,py,pz and optional w,q")]
    pub particles: PathBuf,

    #[arg(long, help = "config file, defaults to .beam-cli.toml")]
    pub config: Option<PathBuf>,

    #[arg(long, conflicts_with = "slice_length", help = "number of slices")]
    pub slices: Option<usize>,

    #[arg(long, help = "target slice length in metres")]
    pub slice_length: Option<f64>,

    #[arg(long, help = "remove the position-momentum correlation first")]
    pub dispersion_corrected: bool,

    #[arg(long, value_enum, help = "emittance the twiss parameters are derived from")]
    pub twiss_emittance: Option<EmittanceArg>,

    #[arg(long, help = "print json instead of text")]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmittanceArg {
    Trace,
    Phase,
}

impl From<EmittanceArg> for EmittanceKind {
    fn from(arg: EmittanceArg) -> Self {
        match arg {
            EmittanceArg::Trace => EmittanceKind::TraceSpace,
            EmittanceArg::Phase => EmittanceKind::PhaseSpace,
        }
    }
}

impl AnalysisCli {
    /// Command line flags take precedence over the config file.
    pub fn apply(&self, mut config: DiagnosticsConfig) -> DiagnosticsConfig {
        if let Some(n) = self.slices {
            config.slicing = Slicing::Count(n);
        }
        if let Some(length) = self.slice_length {
            config.slicing = Slicing::Length(length);
        }
        if self.dispersion_corrected {
            config.dispersion_corrected = true;
        }
        if let Some(kind) = self.twiss_emittance {
            config.twiss_emittance = kind.into();
        }
        config
    }
}
