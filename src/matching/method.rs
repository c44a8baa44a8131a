use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pipeline::normalize_to_peak;

use super::error::MatchError;

/// Similarity metric between two peak-normalized series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchMethod {
    /// `1 − Σ(r − s)² / Σr²`
    SquaresSum,
    /// `1 − Σmax(0, r − s)² / Σr²`
    ///
    /// Only reference intensity missing from the sample is penalized, so a
    /// sample that contains the reference shape plus other lines still
    /// scores 1.
    #[default]
    SquaresSumSat,
    /// `Σ(s · r) / Σs²`
    Multiply,
}

impl MatchMethod {
    /// All methods in declaration order.
    pub const ALL: [MatchMethod; 3] = [
        MatchMethod::SquaresSum,
        MatchMethod::SquaresSumSat,
        MatchMethod::Multiply,
    ];

    /// Canonical name, as written in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMethod::SquaresSum => "SquaresSum",
            MatchMethod::SquaresSumSat => "SquaresSumSat",
            MatchMethod::Multiply => "Multiply",
        }
    }

    /// Score two equal-length, already normalized series.
    fn apply(self, sample: &[f64], reference: &[f64]) -> f64 {
        let pairs = sample.iter().zip(reference);
        match self {
            MatchMethod::SquaresSum => {
                let residual: f64 = pairs.map(|(s, r)| (r - s) * (r - s)).sum();
                1.0 - ratio(residual, sum_of_squares(reference))
            }
            MatchMethod::SquaresSumSat => {
                let residual: f64 = pairs
                    .map(|(s, r)| {
                        let missing = (r - s).max(0.0);
                        missing * missing
                    })
                    .sum();
                1.0 - ratio(residual, sum_of_squares(reference))
            }
            MatchMethod::Multiply => {
                let dot: f64 = pairs.map(|(s, r)| s * r).sum();
                ratio(dot, sum_of_squares(sample))
            }
        }
    }
}

fn sum_of_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// `value / total`, or `value` unchanged when `total` is 0.
fn ratio(value: f64, total: f64) -> f64 {
    if total != 0.0 {
        value / total
    } else {
        value
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMethod {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MatchError::UnknownMethod(s.to_string()))
    }
}

/// Score `sample` against `reference` with `method`.
///
/// Both series are divided by their own peak first. A reference whose peak
/// is not positive cannot be normalized and scores 0.
pub fn score(sample: &[f64], reference: &[f64], method: MatchMethod) -> Result<f64, MatchError> {
    if sample.len() != reference.len() {
        return Err(MatchError::LengthMismatch {
            sample: sample.len(),
            reference: reference.len(),
        });
    }

    let reference_peak = reference.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if reference_peak.is_nan() || reference_peak <= 0.0 {
        return Ok(0.0);
    }

    let sample = normalize_to_peak(sample);
    let reference: Vec<f64> = reference.iter().map(|v| v / reference_peak).collect();
    Ok(method.apply(&sample, &reference))
}

/// [`score`] expressed as a percentage.
pub fn score_percent(
    sample: &[f64],
    reference: &[f64],
    method: MatchMethod,
) -> Result<f64, MatchError> {
    score(sample, reference, method).map(|s| s * 100.0)
}
