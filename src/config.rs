use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};
use crate::pipeline::normalize::VolumeUnit;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub inputs: InputsConfig,
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
}

/// One CSV path per dataset kind.
#[derive(Debug, Deserialize)]
pub struct InputsConfig {
    pub exports: PathBuf,
    pub climate: PathBuf,
    pub demographics: PathBuf,
    pub economics: PathBuf,
    pub ratings: PathBuf,
    /// Unit of the `volume` column in the export file.
    #[serde(default)]
    pub volume_unit: VolumeUnit,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    pub start_year: i32,
    pub end_year: i32,
    /// Last year of the future projection window.
    #[serde(default = "default_projection_until")]
    pub projection_until: i32,
    /// How many destination markets to list in the rankings.
    #[serde(default = "default_top_markets")]
    pub top_markets: usize,
}

/// Which sections make it into the assembled report.
#[derive(Debug, Deserialize)]
pub struct ReportConfig {
    pub output_path: PathBuf,
    /// Optional machine-readable summary written next to the text report.
    pub summary_json_path: Option<PathBuf>,
    #[serde(default = "enabled")]
    pub resumo_executivo: bool,
    #[serde(default = "enabled")]
    pub metodologia: bool,
    #[serde(default = "enabled")]
    pub principais_descobertas: bool,
    #[serde(default = "enabled")]
    pub projecoes_futuras: bool,
    #[serde(default = "enabled")]
    pub conclusoes: bool,
}

fn default_projection_until() -> i32 {
    2028
}

fn default_top_markets() -> usize {
    5
}

fn enabled() -> bool {
    true
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.analysis.start_year > self.analysis.end_year {
            return Err(ReportError::Config(format!(
                "analysis range is inverted: start_year {} > end_year {}",
                self.analysis.start_year, self.analysis.end_year
            )));
        }
        if self.analysis.projection_until <= self.analysis.end_year {
            return Err(ReportError::Config(format!(
                "projection_until {} must be after end_year {}",
                self.analysis.projection_until, self.analysis.end_year
            )));
        }
        Ok(())
    }
}
