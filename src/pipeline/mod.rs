// Report pipeline: load, normalize, aggregate, correlate, project, assemble

pub mod aggregate;
pub mod correlate;
pub mod loader;
pub mod normalize;
pub mod project;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::domain::Datasets;
use crate::error::Result;
use crate::report;

use aggregate::Aggregate;
use correlate::{CorrelationMatrix, YearSeries};
use project::Projection;

/// Everything the report assembler needs, computed once over the loaded
/// datasets. Also serves as the machine-readable summary when the config
/// asks for a JSON artifact.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub yearly: BTreeMap<i32, Aggregate>,
    pub countries: BTreeMap<String, Aggregate>,
    pub total: Aggregate,
    /// Year-over-year value growth; `None` marks an undefined rate.
    pub value_growth: BTreeMap<i32, Option<f64>>,
    pub volume_cagr: Option<f64>,
    pub value_cagr: Option<f64>,
    pub correlations: CorrelationMatrix,
    /// Headline relationship between growing-season climate and review scores.
    pub climate_quality: Option<f64>,
    pub volume_projection: Option<Projection>,
    pub value_projection: Option<Projection>,
}

impl Analysis {
    pub fn compute(datasets: &Datasets, config: &Config) -> Result<Self> {
        let yearly = aggregate::yearly_totals(&datasets.exports);
        let countries = aggregate::country_totals(&datasets.exports);
        let total = aggregate::grand_total(&datasets.exports);
        let value_growth = aggregate::yearly_value_growth(&yearly);
        let volume_cagr = aggregate::compound_annual_growth(&yearly, |a| a.volume_liters);
        let value_cagr = aggregate::compound_annual_growth(&yearly, |a| a.value_usd);

        let volume_series: YearSeries =
            yearly.iter().map(|(&y, a)| (y, a.volume_liters)).collect();
        let value_series: YearSeries = yearly.iter().map(|(&y, a)| (y, a.value_usd)).collect();
        let temperature = mean_by_year(datasets.climate.iter().map(|r| (r.year, r.avg_temperature)));
        let precipitation =
            mean_by_year(datasets.climate.iter().map(|r| (r.year, r.precipitation_mm)));
        let exchange_rate =
            mean_by_year(datasets.economics.iter().map(|r| (r.year, r.exchange_rate)));
        let avg_score = mean_by_year(datasets.ratings.iter().map(|r| (r.year, r.avg_score)));

        let correlations = correlate::correlation_matrix(&[
            ("volume_litros".to_string(), volume_series.clone()),
            ("valor_usd".to_string(), value_series.clone()),
            ("temperatura_media".to_string(), temperature.clone()),
            ("precipitacao_mm".to_string(), precipitation),
            ("taxa_cambio".to_string(), exchange_rate),
            ("pontuacao_media".to_string(), avg_score.clone()),
        ]);

        // The climate-quality figure headlines the findings section, so a
        // shortfall there is a terminal error rather than a silent blank.
        let climate_quality = if config.report.principais_descobertas {
            Some(correlate::pearson(
                &temperature,
                &avg_score,
                "climate-quality correlation",
            )?)
        } else {
            None
        };

        let (volume_projection, value_projection) = if config.report.projecoes_futuras {
            let until = config.analysis.projection_until;
            (
                Some(project::project_quadratic(&volume_series, until, "volume projection")?),
                Some(project::project_quadratic(&value_series, until, "value projection")?),
            )
        } else {
            (None, None)
        };

        Ok(Analysis {
            yearly,
            countries,
            total,
            value_growth,
            volume_cagr,
            value_cagr,
            correlations,
            climate_quality,
            volume_projection,
            value_projection,
        })
    }
}

/// Per-year arithmetic mean of an unordered stream of (year, value) samples.
fn mean_by_year(samples: impl Iterator<Item = (i32, f64)>) -> YearSeries {
    let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for (year, value) in samples {
        let entry = sums.entry(year).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(year, (sum, count))| (year, sum / count as f64))
        .collect()
}

/// Outcome of a full report run, for CLI display.
#[derive(Debug)]
pub struct RunResult {
    pub records_loaded: usize,
    pub sections_written: usize,
    pub output_path: PathBuf,
    pub summary_path: Option<PathBuf>,
}

/// Loads all datasets, computes the analysis and writes the report artifacts.
pub fn run(config: &Config) -> Result<RunResult> {
    let datasets = loader::load_datasets(&config.inputs, &config.analysis)?;
    let analysis = Analysis::compute(&datasets, config)?;

    let document = report::render(config, &analysis);
    if let Some(parent) = config.report.output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config.report.output_path, &document.text)?;
    info!(path = %config.report.output_path.display(), "Report written");

    let summary_path = match &config.report.summary_json_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, serde_json::to_string_pretty(&analysis)?)?;
            info!(path = %path.display(), "JSON summary written");
            Some(path.clone())
        }
        None => None,
    };

    Ok(RunResult {
        records_loaded: datasets.record_count(),
        sections_written: document.section_count,
        output_path: config.report.output_path.clone(),
        summary_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_by_year_averages_duplicates() {
        let series = mean_by_year(vec![(2022, 10.0), (2022, 20.0), (2023, 5.0)].into_iter());
        assert_eq!(series[&2022], 15.0);
        assert_eq!(series[&2023], 5.0);
    }
}
