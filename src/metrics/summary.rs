use serde::{Deserialize, Serialize};

use crate::utils::round_report;

/// Mean and population standard deviation of one score series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    #[serde(rename = "stdDev")]
    pub std_dev: f64,
    /// Number of scores.
    pub count: usize,
}

impl StatSummary {
    /// Summarize a series; `None` when it is empty.
    ///
    /// Divides by N; a single value has a deviation of 0.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let mean = mean(values);
        let std_dev = if count > 1 {
            let variance = values
                .iter()
                .map(|value| (value - mean).powi(2))
                .sum::<f64>()
                / count as f64;
            variance.sqrt()
        } else {
            0.0
        };
        Some(Self {
            mean: round_report(mean),
            std_dev: round_report(std_dev),
            count,
        })
    }
}

/// Box-plot overlay of a distribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Middle value.
    pub median: f64,
    /// First quartile.
    pub q1: f64,
    /// Third quartile.
    pub q3: f64,
    /// Arithmetic mean.
    pub mean: f64,
}

/// Every point of a score series plus its box summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Sorted ascending.
    pub values: Vec<f64>,
    /// Box overlay.
    pub summary: BoxSummary,
    /// Number of scores.
    pub count: usize,
}

impl DistributionSummary {
    /// Summarize a series; `None` when it is empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let (q1, q3) = quartiles(&sorted);
        Some(Self {
            values: sorted.iter().copied().map(round_report).collect(),
            summary: BoxSummary {
                min: round_report(min),
                max: round_report(max),
                median: round_report(median(&sorted)),
                q1: round_report(q1),
                q3: round_report(q3),
                mean: round_report(mean(&sorted)),
            },
            count: sorted.len(),
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle value of a sorted, non-empty series; even lengths average the two middles.
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// First and third quartile of a sorted, non-empty series.
///
/// Four or more points use the exclusive method over `n + 1` positions with
/// linear interpolation. Two or three points pick `sorted[n / 4]` and
/// `sorted[3n / 4]`. A single point is both quartiles.
pub fn quartiles(sorted: &[f64]) -> (f64, f64) {
    let n = sorted.len();
    match n {
        0 => (f64::NAN, f64::NAN),
        1 => (sorted[0], sorted[0]),
        2 | 3 => (sorted[n / 4], sorted[(3 * n) / 4]),
        _ => (exclusive_quartile(sorted, 1), exclusive_quartile(sorted, 3)),
    }
}

fn exclusive_quartile(sorted: &[f64], i: usize) -> f64 {
    let m = sorted.len() + 1;
    let j = i * m / 4;
    let delta = (i * m - j * 4) as f64;
    (sorted[j - 1] * (4.0 - delta) + sorted[j] * delta) / 4.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_deviation_divides_by_n() {
        let summary = StatSummary::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.std_dev, 2.0);
        assert_eq!(summary.count, 8);
    }

    #[test]
    fn single_value_has_zero_deviation() {
        let summary = StatSummary::from_values(&[6.5]).unwrap();
        assert_eq!(summary.mean, 6.5);
        assert_eq!(summary.std_dev, 0.0);
        assert!(StatSummary::from_values(&[]).is_none());
    }

    #[test]
    fn stat_summary_serializes_camel_case_deviation() {
        let summary = StatSummary::from_values(&[1.0, 3.0]).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["stdDev"], 1.0);
        assert!(json.get("std_dev").is_none());
    }

    #[test]
    fn single_point_distribution_collapses_every_statistic() {
        let dist = DistributionSummary::from_values(&[7.0]).unwrap();
        assert_eq!(dist.values, vec![7.0]);
        assert_eq!(dist.count, 1);
        let s = &dist.summary;
        for value in [s.min, s.max, s.median, s.q1, s.q3, s.mean] {
            assert_eq!(value, 7.0);
        }
    }

    #[test]
    fn small_series_use_index_quartiles() {
        assert_eq!(quartiles(&[3.0, 8.0]), (3.0, 8.0));
        assert_eq!(quartiles(&[1.0, 2.0, 9.0]), (1.0, 9.0));
    }

    #[test]
    fn larger_series_use_exclusive_interpolation() {
        // n = 4: positions 1.25 and 3.75 over [1, 2, 3, 4].
        assert_eq!(quartiles(&[1.0, 2.0, 3.0, 4.0]), (1.25, 3.75));
        // n = 7: exact positions 2 and 6.
        assert_eq!(
            quartiles(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]),
            (2.0, 6.0)
        );
        let dist = DistributionSummary::from_values(&[9.0, 2.0, 4.0, 7.0, 5.0]).unwrap();
        assert_eq!(dist.values, vec![2.0, 4.0, 5.0, 7.0, 9.0]);
        assert_eq!(dist.summary.median, 5.0);
        assert_eq!(dist.summary.q1, 3.0);
        assert_eq!(dist.summary.q3, 8.0);
    }

    #[test]
    fn reported_values_are_rounded_to_two_decimals() {
        let dist = DistributionSummary::from_values(&[1.0, 2.0, 2.0]).unwrap();
        assert_eq!(dist.summary.mean, 1.67);
        let stat = StatSummary::from_values(&[1.0, 2.0, 2.0]).unwrap();
        assert_eq!(stat.std_dev, 0.47);
    }

    #[test]
    fn exact_halves_round_to_even() {
        let values = [5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 6.0];
        let stat = StatSummary::from_values(&values).unwrap();
        assert_eq!(stat.mean, 5.12);
        let dist = DistributionSummary::from_values(&values).unwrap();
        assert_eq!(dist.summary.mean, 5.12);
        // 7 / 8 = 0.875 -> 0.88
        let stat = StatSummary::from_values(&[0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(stat.mean, 0.88);
    }
}
