use serde::Serialize;

use crate::error::{ReportError, Result};
use crate::pipeline::correlate::YearSeries;

/// Projected values for a run of future years.
#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub years: Vec<i32>,
    pub values: Vec<f64>,
}

impl Projection {
    pub fn final_value(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Fits a degree-2 polynomial to a yearly series and extrapolates it through
/// `until_year` (exclusive of the historical range).
///
/// Years are centered on their mean before fitting so the normal equations
/// stay well conditioned for calendar-year inputs.
pub fn project_quadratic(series: &YearSeries, until_year: i32, what: &str) -> Result<Projection> {
    if series.len() < 3 {
        return Err(ReportError::InsufficientData {
            what: what.to_string(),
            needed: 3,
            got: series.len(),
        });
    }

    let n = series.len() as f64;
    let mean_year = series.keys().map(|&y| y as f64).sum::<f64>() / n;

    // Normal equations for y = c0 + c1*x + c2*x^2 over centered x.
    let mut sx = [0.0f64; 5];
    let mut sy = 0.0;
    let mut sxy = 0.0;
    let mut sx2y = 0.0;
    for (&year, &value) in series {
        let x = year as f64 - mean_year;
        let mut power = 1.0;
        for s in sx.iter_mut() {
            *s += power;
            power *= x;
        }
        sy += value;
        sxy += x * value;
        sx2y += x * x * value;
    }

    let matrix = [
        [sx[0], sx[1], sx[2]],
        [sx[1], sx[2], sx[3]],
        [sx[2], sx[3], sx[4]],
    ];
    let rhs = [sy, sxy, sx2y];

    let coeffs = solve_3x3(matrix, rhs).ok_or_else(|| ReportError::InsufficientData {
        what: format!("{} (degenerate fit)", what),
        needed: 3,
        got: series.len(),
    })?;

    let last_year = *series.keys().next_back().unwrap_or(&0);
    let mut years = Vec::new();
    let mut values = Vec::new();
    for year in (last_year + 1)..=until_year {
        let x = year as f64 - mean_year;
        years.push(year);
        values.push(coeffs[0] + coeffs[1] * x + coeffs[2] * x * x);
    }

    Ok(Projection { years, values })
}

/// Gaussian elimination with partial pivoting; `None` on a singular system.
fn solve_3x3(mut m: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    for col in 0..3 {
        let pivot_row = (col..3).max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))?;
        if m[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        m.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..3 {
            let factor = m[row][col] / m[col][col];
            for k in col..3 {
                m[row][k] -= factor * m[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0f64; 3];
    for row in (0..3).rev() {
        let mut sum = b[row];
        for k in (row + 1)..3 {
            sum -= m[row][k] * x[k];
        }
        x[row] = sum / m[row][row];
    }
    Some(x)
}
