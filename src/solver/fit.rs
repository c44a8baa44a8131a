use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::polynomial::POLYNOMIAL_TERMS;

use super::error::FitError;

/// Polynomial order used for wavelength calibration.
pub const DEFAULT_FIT_ORDER: usize = 3;

/// Relative tolerance on the R diagonal below which the fit is singular.
const RANK_TOLERANCE: f64 = 1e-12;

/// A sensor pixel paired with the wavelength it is known to observe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    /// Pixel index (fractional positions allowed)
    pub sensor_pixel: f64,
    /// Known wavelength at that pixel in nm
    pub reference_wavelength: f64,
}

impl CalibrationPoint {
    /// Create a point.
    pub fn new(sensor_pixel: f64, reference_wavelength: f64) -> Self {
        Self {
            sensor_pixel,
            reference_wavelength,
        }
    }
}

/// Fit a polynomial of `order` through `points` in the least-squares sense.
///
/// Returns `order + 1` coefficients from the constant term upwards.
pub fn polyfit(points: &[CalibrationPoint], order: usize) -> Result<Vec<f64>, FitError> {
    if order >= POLYNOMIAL_TERMS {
        return Err(FitError::UnsupportedOrder(order));
    }
    let terms = order + 1;
    if points.len() < terms {
        return Err(FitError::Underdetermined {
            points: points.len(),
            required: terms,
        });
    }

    let scale = points
        .iter()
        .map(|p| p.sensor_pixel.abs())
        .fold(0.0, f64::max);
    let scale = if scale > 0.0 { scale } else { 1.0 };

    let design = DMatrix::from_fn(points.len(), terms, |row, col| {
        (points[row].sensor_pixel / scale).powi(col as i32)
    });
    let target = DVector::from_iterator(
        points.len(),
        points.iter().map(|p| p.reference_wavelength),
    );

    let (q, r) = design.qr().unpack();

    let diagonal = r.diagonal();
    let largest = diagonal.iter().map(|d| d.abs()).fold(0.0, f64::max);
    if largest == 0.0 || diagonal.iter().any(|d| d.abs() <= largest * RANK_TOLERANCE) {
        return Err(FitError::Singular);
    }

    let rhs = q.transpose() * target;
    let scaled = r.solve_upper_triangular(&rhs).ok_or(FitError::Singular)?;

    let coefficients: Vec<f64> = scaled
        .iter()
        .enumerate()
        .map(|(power, c)| c / scale.powi(power as i32))
        .collect();

    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(FitError::Singular);
    }
    Ok(coefficients)
}
