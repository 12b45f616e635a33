use std::{fs::File, io::Read, path::Path};

use anyhow::{Context, Result};
use beam_diagnostics::{ParticleEnsemble, ParticleRecord};
use csv::Reader;

pub fn read_particles(path: &Path) -> Result<ParticleEnsemble> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let ensemble =
        parse_particles(file).with_context(|| format!("failed to load {}", path.display()))?;
    log::info!("loaded {} particles from {}", ensemble.len(), path.display());
    Ok(ensemble)
}

/// Reads a csv with header `x,y,z,px,py,pz` and optional `w` and `q` columns.
pub fn parse_particles<R: Read>(reader: R) -> Result<ParticleEnsemble> {
    let mut reader = Reader::from_reader(reader);
    let records = reader
        .deserialize::<ParticleRecord>()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("invalid particle on row {}", i + 1)))
        .collect::<Result<Vec<ParticleRecord>>>()?;
    Ok(ParticleEnsemble::from_records(&records)?)
}
