//! # Calibration Solver
//!
//! Least-squares polynomial fit of sensor pixel → reference wavelength pairs,
//! used to derive the pixel-to-wavelength map from known emission lines.
//!
//! The fit solves the Vandermonde system by QR decomposition. Pixel values
//! are scaled to `[-1, 1]` before factorization and the coefficients
//! unscaled afterwards, which keeps the system well conditioned for the
//! 3000+ pixel range of typical sensors.

mod error;
mod fit;
mod session;

#[cfg(test)]
mod tests;

pub use error::FitError;
pub use fit::{polyfit, CalibrationPoint, DEFAULT_FIT_ORDER};
pub use session::{load_points_csv, CalibrationSession, FitOutcome};
