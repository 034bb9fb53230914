//! Summary statistics over per-frame high-frequency scores

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreStatistics {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// 5th percentile (midpoint method)
    pub pct_05: f64,
    /// 95th percentile (midpoint method)
    pub pct_95: f64,
}

impl ScoreStatistics {
    /// `None` for an empty slice.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }

        let mut sorted = scores.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            mean: scores.iter().sum::<f64>() / scores.len() as f64,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            median: percentile_midpoint(&sorted, 50.0)?,
            pct_05: percentile_midpoint(&sorted, 5.0)?,
            pct_95: percentile_midpoint(&sorted, 95.0)?,
        })
    }
}

/// Percentile of an ascending slice using the midpoint rule.
///
/// The fractional rank is `p / 100 * (n - 1)`. On an exact rank the order
/// statistic itself is returned, otherwise the mean of its two neighbours.
/// `None` for an empty slice.
pub fn percentile_midpoint(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (p.clamp(0.0, 100.0) / 100.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        Some(sorted[lo])
    } else {
        Some((sorted[lo] + sorted[hi]) / 2.0)
    }
}
