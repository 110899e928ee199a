use serde::{Deserialize, Serialize};
use std::fmt;

/// The dataset kinds the pipeline knows how to load.
///
/// Each kind maps to one CSV input file with a fixed column schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetKind {
    Export,
    Climate,
    Demographic,
    Economic,
    Rating,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetKind::Export => "export",
            DatasetKind::Climate => "climate",
            DatasetKind::Demographic => "demographic",
            DatasetKind::Economic => "economic",
            DatasetKind::Rating => "rating",
        };
        write!(f, "{}", name)
    }
}

/// One year of export shipments to a single destination country.
///
/// Volume is always stored in liters; the loader converts kilogram inputs
/// before constructing the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRecord {
    pub year: i32,
    pub country: String,
    pub volume_liters: f64,
    pub value_usd: f64,
}

/// Yearly climate observations for a producing region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateRecord {
    pub year: i32,
    pub region: String,
    pub avg_temperature: f64,
    pub precipitation_mm: f64,
    pub sunny_days: f64,
}

/// Yearly demographic figures for a country.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemographicRecord {
    pub year: i32,
    pub country: String,
    pub population: f64,
    pub income_per_capita: f64,
}

/// Yearly macroeconomic indicators for a country.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicRecord {
    pub year: i32,
    pub country: String,
    pub gdp: f64,
    pub exchange_rate: f64,
    pub inflation_rate: f64,
}

/// Yearly review aggregates for a grape variety.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRecord {
    pub year: i32,
    pub variety: String,
    pub avg_score: f64,
    pub avg_price: f64,
}

/// All loaded datasets for one report run. Immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub exports: Vec<ExportRecord>,
    pub climate: Vec<ClimateRecord>,
    pub demographics: Vec<DemographicRecord>,
    pub economics: Vec<EconomicRecord>,
    pub ratings: Vec<RatingRecord>,
}

impl Datasets {
    pub fn record_count(&self) -> usize {
        self.exports.len()
            + self.climate.len()
            + self.demographics.len()
            + self.economics.len()
            + self.ratings.len()
    }
}
