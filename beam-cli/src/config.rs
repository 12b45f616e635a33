use anyhow::{Context, Result};
use beam_diagnostics::DiagnosticsConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub diagnostics: DiagnosticsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print json output.
    pub pretty_json: bool,
    /// Significant digits of the text output.
    pub precision: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty_json: true,
            precision: 6,
        }
    }
}

impl CliConfig {
    /// Loads the config at `path`, or at the default location. A missing
    /// config file is created with the default values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::get_config_path);

        if !config_path.exists() {
            let config = Self::default();
            config.save(&config_path)?;
            log::info!("wrote default config to {}", config_path.display());
            return Ok(config);
        }

        let config_str = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        Ok(config)
    }

    pub fn save(&self, config_path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(config_path, config_str)?;
        Ok(())
    }

    fn get_config_path() -> PathBuf {
        ".beam-cli.toml".into()
    }
}

#[cfg(test)]
mod tests {
    use beam_diagnostics::{EmittanceKind, Slicing};

    use super::*;

    #[test]
    fn missing_config_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("beam.toml");

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config, CliConfig::default());
        assert!(path.exists());
        assert_eq!(CliConfig::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn saved_config_is_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beam.toml");

        let mut config = CliConfig::default();
        config.diagnostics.slicing = Slicing::Length(2.5e-7);
        config.diagnostics.twiss_emittance = EmittanceKind::PhaseSpace;
        config.output.precision = 3;
        config.save(&path).unwrap();

        assert_eq!(CliConfig::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beam.toml");
        fs::write(
            &path,
            "[diagnostics]\ndispersion_corrected = true\ntwiss_emittance = \"phase_space\"\n",
        )
        .unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert!(config.diagnostics.dispersion_corrected);
        assert_eq!(config.diagnostics.twiss_emittance, EmittanceKind::PhaseSpace);
        assert_eq!(config.diagnostics.slicing, Slicing::Count(10));
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beam.toml");
        fs::write(&path, "[diagnostics]\nslicing = \"many\"\n").unwrap();

        let error = CliConfig::load(Some(&path)).unwrap_err();
        assert!(error.to_string().contains("failed to parse"));
    }
}
