use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::ExportRecord;

/// Summed figures for one group of export records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Aggregate {
    pub volume_liters: f64,
    pub value_usd: f64,
    pub count: usize,
}

impl Aggregate {
    fn add(&mut self, record: &ExportRecord) {
        self.volume_liters += record.volume_liters;
        self.value_usd += record.value_usd;
        self.count += 1;
    }

    /// Average price per liter; `None` when no volume was shipped.
    pub fn avg_unit_price(&self) -> Option<f64> {
        if self.volume_liters == 0.0 {
            None
        } else {
            Some(self.value_usd / self.volume_liters)
        }
    }
}

/// Groups export records by an arbitrary key, summing volume, value and count.
///
/// A `BTreeMap` keeps group iteration order deterministic.
pub fn group_by<K, F>(records: &[ExportRecord], key_fn: F) -> BTreeMap<K, Aggregate>
where
    K: Ord,
    F: Fn(&ExportRecord) -> K,
{
    let mut groups: BTreeMap<K, Aggregate> = BTreeMap::new();
    for record in records {
        groups.entry(key_fn(record)).or_default().add(record);
    }
    groups
}

pub fn yearly_totals(records: &[ExportRecord]) -> BTreeMap<i32, Aggregate> {
    group_by(records, |r| r.year)
}

pub fn country_totals(records: &[ExportRecord]) -> BTreeMap<String, Aggregate> {
    group_by(records, |r| r.country.clone())
}

pub fn grand_total(records: &[ExportRecord]) -> Aggregate {
    let mut total = Aggregate::default();
    for record in records {
        total.add(record);
    }
    total
}

/// Relative change from `prev` to `cur`; undefined when `prev` is zero.
pub fn growth_rate(cur: f64, prev: f64) -> Option<f64> {
    if prev == 0.0 {
        None
    } else {
        Some((cur - prev) / prev)
    }
}

/// Year-over-year value growth for each year with a present predecessor.
///
/// Years whose predecessor is absent from the data are skipped entirely;
/// years whose predecessor had zero value map to `None`.
pub fn yearly_value_growth(yearly: &BTreeMap<i32, Aggregate>) -> BTreeMap<i32, Option<f64>> {
    let mut growth = BTreeMap::new();
    for (&year, agg) in yearly {
        if let Some(prev) = yearly.get(&(year - 1)) {
            growth.insert(year, growth_rate(agg.value_usd, prev.value_usd));
        }
    }
    growth
}

/// Compound annual growth rate between the first and last observation.
///
/// `None` when the series spans fewer than two years or starts at zero.
pub fn compound_annual_growth(yearly: &BTreeMap<i32, Aggregate>, metric: fn(&Aggregate) -> f64) -> Option<f64> {
    let (&first_year, first) = yearly.iter().next()?;
    let (&last_year, last) = yearly.iter().next_back()?;
    let periods = last_year - first_year;
    if periods <= 0 {
        return None;
    }
    let (start, end) = (metric(first), metric(last));
    if start <= 0.0 {
        return None;
    }
    Some((end / start).powf(1.0 / periods as f64) - 1.0)
}

/// Countries ordered by descending volume, ties broken alphabetically.
pub fn rank_countries_by_volume(countries: &BTreeMap<String, Aggregate>) -> Vec<(String, Aggregate)> {
    rank_countries(countries, |a| a.volume_liters)
}

/// Countries ordered by descending total value, ties broken alphabetically.
pub fn rank_countries_by_value(countries: &BTreeMap<String, Aggregate>) -> Vec<(String, Aggregate)> {
    rank_countries(countries, |a| a.value_usd)
}

fn rank_countries(
    countries: &BTreeMap<String, Aggregate>,
    metric: fn(&Aggregate) -> f64,
) -> Vec<(String, Aggregate)> {
    let mut ranked: Vec<(String, Aggregate)> = countries
        .iter()
        .map(|(name, agg)| (name.clone(), *agg))
        .collect();
    // Input comes out of the BTreeMap already alphabetical, and the sort is
    // stable, so equal metrics keep alphabetical order.
    ranked.sort_by(|a, b| metric(&b.1).total_cmp(&metric(&a.1)));
    ranked
}
