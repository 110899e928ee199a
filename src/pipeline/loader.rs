use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use tracing::info;

use crate::config::{AnalysisConfig, InputsConfig};
use crate::domain::{
    ClimateRecord, DatasetKind, Datasets, DemographicRecord, EconomicRecord, ExportRecord,
    RatingRecord,
};
use crate::error::{ReportError, Result};
use crate::pipeline::normalize::VolumeUnit;

/// Loads every configured dataset into typed, immutable record vectors.
///
/// Any malformed row aborts the load for that dataset; there is no partial
/// recovery since the end product is a static report.
pub fn load_datasets(inputs: &InputsConfig, analysis: &AnalysisConfig) -> Result<Datasets> {
    let years = YearRange {
        min: analysis.start_year,
        max: analysis.end_year,
    };

    let datasets = Datasets {
        exports: load_exports(&inputs.exports, inputs.volume_unit, years)?,
        climate: load_climate(&inputs.climate, years)?,
        demographics: load_demographics(&inputs.demographics, years)?,
        economics: load_economics(&inputs.economics, years)?,
        ratings: load_ratings(&inputs.ratings, years)?,
    };

    info!(records = datasets.record_count(), "All datasets loaded");
    Ok(datasets)
}

/// Inclusive year bounds from the analysis configuration.
#[derive(Debug, Clone, Copy)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

pub fn load_exports(path: &Path, unit: VolumeUnit, years: YearRange) -> Result<Vec<ExportRecord>> {
    let mut records = Vec::new();
    for row in read_rows(path, DatasetKind::Export)? {
        let row = row?;
        let year = row.year(years)?;
        let country = row.required("country")?.to_string();
        let volume = row.non_negative_f64("volume")?;
        let value_usd = row.non_negative_f64("value_usd")?;

        records.push(ExportRecord {
            year,
            country,
            volume_liters: unit.to_liters(volume),
            value_usd,
        });
    }
    info!(records = records.len(), path = %path.display(), "Export dataset loaded");
    Ok(records)
}

pub fn load_climate(path: &Path, years: YearRange) -> Result<Vec<ClimateRecord>> {
    let mut records = Vec::new();
    for row in read_rows(path, DatasetKind::Climate)? {
        let row = row?;
        records.push(ClimateRecord {
            year: row.year(years)?,
            region: row.required("region")?.to_string(),
            avg_temperature: row.f64("avg_temperature")?,
            precipitation_mm: row.f64("precipitation_mm")?,
            sunny_days: row.f64("sunny_days")?,
        });
    }
    info!(records = records.len(), path = %path.display(), "Climate dataset loaded");
    Ok(records)
}

pub fn load_demographics(path: &Path, years: YearRange) -> Result<Vec<DemographicRecord>> {
    let mut records = Vec::new();
    for row in read_rows(path, DatasetKind::Demographic)? {
        let row = row?;
        records.push(DemographicRecord {
            year: row.year(years)?,
            country: row.required("country")?.to_string(),
            population: row.f64("population")?,
            income_per_capita: row.f64("income_per_capita")?,
        });
    }
    info!(records = records.len(), path = %path.display(), "Demographic dataset loaded");
    Ok(records)
}

pub fn load_economics(path: &Path, years: YearRange) -> Result<Vec<EconomicRecord>> {
    let mut records = Vec::new();
    for row in read_rows(path, DatasetKind::Economic)? {
        let row = row?;
        records.push(EconomicRecord {
            year: row.year(years)?,
            country: row.required("country")?.to_string(),
            gdp: row.f64("gdp")?,
            exchange_rate: row.f64("exchange_rate")?,
            inflation_rate: row.f64("inflation_rate")?,
        });
    }
    info!(records = records.len(), path = %path.display(), "Economic dataset loaded");
    Ok(records)
}

pub fn load_ratings(path: &Path, years: YearRange) -> Result<Vec<RatingRecord>> {
    let mut records = Vec::new();
    for row in read_rows(path, DatasetKind::Rating)? {
        let row = row?;
        records.push(RatingRecord {
            year: row.year(years)?,
            variety: row.required("variety")?.to_string(),
            avg_score: row.f64("avg_score")?,
            avg_price: row.f64("avg_price")?,
        });
    }
    info!(records = records.len(), path = %path.display(), "Rating dataset loaded");
    Ok(records)
}

/// A raw CSV row together with enough context to produce precise errors.
struct Row {
    dataset: DatasetKind,
    /// 1-based line number in the source file (header is line 1).
    line: usize,
    record: StringRecord,
    header_map: HashMap<String, usize>,
}

impl Row {
    fn parse_error(&self, message: impl Into<String>) -> ReportError {
        ReportError::Parse {
            dataset: self.dataset,
            line: self.line,
            message: message.into(),
        }
    }

    /// Field value for a named column; errors when the column or value is missing.
    fn required(&self, name: &str) -> Result<&str> {
        let idx = self
            .header_map
            .get(name)
            .ok_or_else(|| self.parse_error(format!("missing required column '{}'", name)))?;
        self.record
            .get(*idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| self.parse_error(format!("missing required field '{}'", name)))
    }

    fn f64(&self, name: &str) -> Result<f64> {
        let raw = self.required(name)?;
        let value: f64 = raw
            .parse()
            .map_err(|_| self.parse_error(format!("field '{}' is not numeric: '{}'", name, raw)))?;
        if !value.is_finite() {
            return Err(self.parse_error(format!("field '{}' is not finite: '{}'", name, raw)));
        }
        Ok(value)
    }

    fn non_negative_f64(&self, name: &str) -> Result<f64> {
        let value = self.f64(name)?;
        if value < 0.0 {
            return Err(self.parse_error(format!("field '{}' must be non-negative, got {}", name, value)));
        }
        Ok(value)
    }

    fn year(&self, range: YearRange) -> Result<i32> {
        let raw = self.required("year")?;
        let year: i32 = raw
            .parse()
            .map_err(|_| self.parse_error(format!("field 'year' is not numeric: '{}'", raw)))?;
        if year < range.min || year > range.max {
            return Err(ReportError::YearOutOfRange {
                dataset: self.dataset,
                line: self.line,
                year,
                min: range.min,
                max: range.max,
            });
        }
        Ok(year)
    }
}

/// Opens a CSV file and yields one `Row` per data line.
fn read_rows(path: &Path, dataset: DatasetKind) -> Result<impl Iterator<Item = Result<Row>>> {
    let file = File::open(path).map_err(|e| {
        ReportError::Config(format!(
            "Failed to open {} dataset '{}': {}",
            dataset,
            path.display(),
            e
        ))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let header_map = build_header_map(reader.headers()?);

    Ok(reader.into_records().enumerate().map(move |(idx, result)| {
        // Header occupies line 1, so the first data row is line 2
        let line = idx + 2;
        let record = result.map_err(|e| ReportError::Parse {
            dataset,
            line,
            message: format!("CSV parse error: {}", e),
        })?;
        Ok(Row {
            dataset,
            line,
            record,
            header_map: header_map.clone(),
        })
    }))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel-exported CSVs sometimes carry a UTF-8 BOM on the first header;
    // strip it so schema lookups do not report a phantom missing column.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const RANGE: YearRange = YearRange { min: 2009, max: 2023 };

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_exports_happy_path() {
        let file = write_csv(
            "year,country,volume,value_usd\n\
             2022,Estados Unidos,1000,5000\n\
             2023,Reino Unido,1100.5,5700\n",
        );

        let records = load_exports(file.path(), VolumeUnit::Liters, RANGE).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].country, "Estados Unidos");
        assert_eq!(records[1].volume_liters, 1100.5);
    }

    #[test]
    fn test_load_exports_kilogram_unit_converts_one_to_one() {
        let file = write_csv("year,country,volume,value_usd\n2022,Japão,2500,9000\n");

        let records = load_exports(file.path(), VolumeUnit::Kilograms, RANGE).unwrap();
        assert_eq!(records[0].volume_liters, 2500.0);
    }

    #[test]
    fn test_headers_only_file_yields_no_records() {
        let file = write_csv("year,country,volume,value_usd\n");
        let records = load_exports(file.path(), VolumeUnit::Liters, RANGE).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_non_numeric_volume_is_parse_error_with_line() {
        let file = write_csv(
            "year,country,volume,value_usd\n\
             2022,Alemanha,1000,5000\n\
             2023,Alemanha,muitos,5700\n",
        );

        let err = load_exports(file.path(), VolumeUnit::Liters, RANGE).unwrap_err();
        match err {
            ReportError::Parse { dataset, line, .. } => {
                assert_eq!(dataset, DatasetKind::Export);
                assert_eq!(line, 3);
            }
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_field_is_parse_error() {
        let file = write_csv("year,country,volume,value_usd\n2022,,1000,5000\n");
        let err = load_exports(file.path(), VolumeUnit::Liters, RANGE).unwrap_err();
        assert!(matches!(err, ReportError::Parse { .. }));
    }

    #[test]
    fn test_negative_volume_rejected() {
        let file = write_csv("year,country,volume,value_usd\n2022,Canadá,-5,5000\n");
        let err = load_exports(file.path(), VolumeUnit::Liters, RANGE).unwrap_err();
        assert!(matches!(err, ReportError::Parse { .. }));
    }

    #[test]
    fn test_year_outside_range_rejected() {
        let file = write_csv("year,country,volume,value_usd\n2002,França,1000,5000\n");
        let err = load_exports(file.path(), VolumeUnit::Liters, RANGE).unwrap_err();
        match err {
            ReportError::YearOutOfRange { year, min, max, .. } => {
                assert_eq!((year, min, max), (2002, 2009, 2023));
            }
            other => panic!("expected YearOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_bom_and_case_insensitive_headers() {
        let file = write_csv("\u{feff}Year,Country,Volume,Value_USD\n2022,Uruguai,10,20\n");
        let records = load_exports(file.path(), VolumeUnit::Liters, RANGE).unwrap();
        assert_eq!(records[0].country, "Uruguai");
    }

    #[test]
    fn test_load_climate_schema() {
        let file = write_csv(
            "year,region,avg_temperature,precipitation_mm,sunny_days\n\
             2022,Serra Gaúcha,24.8,1180,245\n",
        );
        let records = load_climate(file.path(), RANGE).unwrap();
        assert_eq!(records[0].region, "Serra Gaúcha");
        assert_eq!(records[0].sunny_days, 245.0);
    }

    #[test]
    fn test_load_ratings_schema() {
        let file = write_csv("year,variety,avg_score,avg_price\n2022,Merlot,87.2,22.5\n");
        let records = load_ratings(file.path(), RANGE).unwrap();
        assert_eq!(records[0].variety, "Merlot");
    }
}
