use std::fmt::Write;

use anyhow::Result;
use beam_diagnostics::{
    BeamReport, CurrentProfile, DiagnosticsConfig, EmittanceKind, ParticleEnsemble, PlaneReport,
    SliceSet, SlicedDiagnostic, relative_rms_slice_energy_spread, slice_emittance,
};
use serde::Serialize;

use crate::config::OutputConfig;

/// Per-slice diagnostics printed by the `slices` subcommand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceTable {
    pub edges: Vec<f64>,
    pub weights: Vec<f64>,
    pub relative_energy_spread: Vec<f64>,
    pub emittance_x: Vec<f64>,
    pub emittance_y: Vec<f64>,
}

impl SliceTable {
    pub fn compute(ensemble: &ParticleEnsemble, config: &DiagnosticsConfig) -> Result<Self> {
        let ParticleEnsemble { x, y, z, px, py, pz, .. } = ensemble;
        let w = ensemble.weights();
        let slices = SliceSet::new(z, config.slicing)?;
        let disp = config.dispersion_corrected;

        let SlicedDiagnostic {
            values: relative_energy_spread,
            weights,
            edges,
        } = relative_rms_slice_energy_spread(&slices, px, py, pz, w)?;
        let emittance_x =
            slice_emittance(&slices, x, px, py, pz, w, EmittanceKind::PhaseSpace, disp)?.values;
        let emittance_y =
            slice_emittance(&slices, y, py, px, pz, w, EmittanceKind::PhaseSpace, disp)?.values;

        Ok(Self {
            edges,
            weights,
            relative_energy_spread,
            emittance_x,
            emittance_y,
        })
    }
}

pub fn to_json<T: Serialize>(value: &T, output: &OutputConfig) -> Result<String> {
    Ok(if output.pretty_json {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

struct Formatter {
    digits: usize,
    text: String,
}

impl Formatter {
    fn new(output: &OutputConfig) -> Self {
        Self {
            digits: output.precision.saturating_sub(1),
            text: String::new(),
        }
    }

    fn num(&self, value: f64) -> String {
        format!("{:.*e}", self.digits, value)
    }

    fn line(&mut self, label: &str, value: f64, unit: &str) {
        let value = self.num(value);
        let _ = writeln!(self.text, "  {label:<34} {value:>14} {unit}");
    }

    fn heading(&mut self, heading: &str) {
        let _ = writeln!(self.text, "{heading}");
    }

    fn row(&mut self, columns: &[f64]) {
        let row: Vec<String> = columns.iter().map(|v| format!("{:>14}", self.num(*v))).collect();
        let _ = writeln!(self.text, "{}", row.join(" "));
    }

    fn header(&mut self, columns: &[&str]) {
        let row: Vec<String> = columns.iter().map(|c| format!("{c:>14}")).collect();
        let _ = writeln!(self.text, "{}", row.join(" "));
    }

    fn plane(&mut self, name: &str, plane: &PlaneReport) {
        self.heading(&format!("{name} plane"));
        self.line("phase space emittance", plane.phase_space_emittance, "m rad");
        self.line(
            "normalized trace space emittance",
            plane.normalized_trace_space_emittance,
            "m rad",
        );
        self.line("geometric emittance", plane.geometric_emittance, "m rad");
        self.line("alpha", plane.twiss.alpha, "");
        self.line("beta", plane.twiss.beta, "m");
        self.line("gamma", plane.twiss.gamma, "1/m");
        self.line("rms size", plane.rms_size, "m");
    }
}

pub fn report_text(report: &BeamReport, output: &OutputConfig) -> String {
    let mut f = Formatter::new(output);
    let _ = writeln!(f.text, "{} particles", report.n_particles);
    if let Some(charge) = report.total_charge {
        f.line("total charge", charge, "C");
    }

    f.plane("x", &report.x);
    f.plane("y", &report.y);

    let longitudinal = &report.longitudinal;
    f.heading("longitudinal");
    f.line("rms length", longitudinal.rms_length, "m");
    f.line("emittance", longitudinal.emittance, "m");
    f.line("mean energy", longitudinal.mean_energy, "m_e c^2");
    f.line("rms energy spread", longitudinal.rms_energy_spread, "m_e c^2");
    f.line(
        "relative rms energy spread",
        longitudinal.relative_rms_energy_spread,
        "",
    );
    f.line("energy chirp", longitudinal.energy_chirp, "1/m");
    f.line(
        "rms correlated energy spread",
        longitudinal.rms_correlated_energy_spread,
        "m_e c^2",
    );

    if let Some(current) = &report.slices.current {
        f.line("peak current", current.peak_current(), "A");
    }
    f.text
}

pub fn current_text(profile: &CurrentProfile, output: &OutputConfig) -> String {
    let mut f = Formatter::new(output);
    f.line("slice length", profile.slice_length, "m");
    f.line("peak current", profile.peak_current(), "A");
    f.header(&["z_start [m]", "z_end [m]", "current [A]"]);
    for (edges, current) in profile.edges.windows(2).zip(&profile.current) {
        f.row(&[edges[0], edges[1], *current]);
    }
    f.text
}

pub fn slices_text(table: &SliceTable, output: &OutputConfig) -> String {
    let mut f = Formatter::new(output);
    f.header(&[
        "z_start [m]",
        "z_end [m]",
        "weight",
        "dE/E",
        "emit_x [m rad]",
        "emit_y [m rad]",
    ]);
    for (k, edges) in table.edges.windows(2).enumerate() {
        f.row(&[
            edges[0],
            edges[1],
            table.weights[k],
            table.relative_energy_spread[k],
            table.emittance_x[k],
            table.emittance_y[k],
        ]);
    }
    f.text
}
