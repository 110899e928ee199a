use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ReportError, Result};

/// A numeric series indexed by year.
pub type YearSeries = BTreeMap<i32, f64>;

/// Pairs up two year-indexed series on the years present in both.
pub fn align(a: &YearSeries, b: &YearSeries) -> Vec<(f64, f64)> {
    a.iter()
        .filter_map(|(year, &x)| b.get(year).map(|&y| (x, y)))
        .collect()
}

/// Pearson correlation coefficient between two year-aligned series.
///
/// Errors when fewer than 2 aligned points exist or either side has zero
/// variance, since the coefficient is undefined in both cases.
pub fn pearson(a: &YearSeries, b: &YearSeries, what: &str) -> Result<f64> {
    let pairs = align(a, b);
    if pairs.len() < 2 {
        return Err(ReportError::InsufficientData {
            what: what.to_string(),
            needed: 2,
            got: pairs.len(),
        });
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return Err(ReportError::InsufficientData {
            what: format!("{} (a series is constant)", what),
            needed: 2,
            got: pairs.len(),
        });
    }

    Ok(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Pairwise correlations across a set of labelled yearly series.
///
/// Cells where the coefficient is undefined hold `None` instead of failing
/// the whole matrix.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

pub fn correlation_matrix(series: &[(String, YearSeries)]) -> CorrelationMatrix {
    let labels: Vec<String> = series.iter().map(|(name, _)| name.clone()).collect();
    let values = series
        .iter()
        .map(|(name_a, a)| {
            series
                .iter()
                .map(|(name_b, b)| {
                    if name_a == name_b {
                        Some(1.0)
                    } else {
                        pearson(a, b, "correlation matrix").ok()
                    }
                })
                .collect()
        })
        .collect();

    CorrelationMatrix { labels, values }
}

impl CorrelationMatrix {
    /// Looks up one coefficient by series labels.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        self.values[i][j]
    }
}
