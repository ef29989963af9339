//! Pearson and Spearman correlation with two-sided significance tests

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    /// Coefficient in [-1, 1]
    pub coefficient: f64,
    /// Two-sided p-value in [0, 1]
    pub p_value: f64,
}

pub fn pearson(x: &[f64], y: &[f64]) -> Result<Correlation> {
    let coefficient = pearson_coefficient(x, y)?;
    let p_value = two_sided_p_value(coefficient, x.len())?;
    Ok(Correlation {
        coefficient,
        p_value,
    })
}

/// Spearman's rank correlation: Pearson over average ranks.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<Correlation> {
    pearson(&rank(x), &rank(y))
}

fn pearson_coefficient(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(AnalysisError::Statistics(format!(
            "paired samples differ in length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(AnalysisError::InsufficientData {
            context: "correlation".to_string(),
            found: n,
            required: 2,
        });
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return Err(AnalysisError::ConstantInput("correlation".to_string()));
    }

    Ok((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// t-test on r with n - 2 degrees of freedom.
fn two_sided_p_value(r: f64, n: usize) -> Result<f64> {
    if n <= 2 {
        return Ok(1.0);
    }
    if r.abs() >= 1.0 {
        return Ok(0.0);
    }

    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| AnalysisError::Statistics(e.to_string()))?;
    let p = 2.0 * dist.sf(t.abs());
    Ok(p.clamp(0.0, 1.0))
}

/// 1-based ranks; tied values share the average of their positions.
pub fn rank(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let average = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = average;
        }
        start = end;
    }
    ranks
}
