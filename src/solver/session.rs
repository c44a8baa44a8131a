use std::io::Read;
use std::path::Path;

use log::{debug, info};

use crate::config::ConfigStore;
use crate::polynomial::Polynomial;

use super::error::FitError;
use super::fit::{polyfit, CalibrationPoint, DEFAULT_FIT_ORDER};

/// Result of a refit.
#[derive(Debug, Clone, PartialEq)]
pub enum FitOutcome {
    /// A new fit was computed from the points
    Fitted(Vec<f64>),
    /// Too few or degenerate points; the active coefficients are shown instead
    Retained(Vec<f64>),
}

impl FitOutcome {
    /// Coefficients to display.
    pub fn coefficients(&self) -> &[f64] {
        match self {
            FitOutcome::Fitted(c) | FitOutcome::Retained(c) => c,
        }
    }

    /// Whether a new fit was produced.
    pub fn is_fitted(&self) -> bool {
        matches!(self, FitOutcome::Fitted(_))
    }
}

/// Interactive wavelength calibration.
///
/// Points are collected and refit after every change; the latest fit can
/// then be applied to the pixel-to-wavelength map.
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    points: Vec<CalibrationPoint>,
    order: usize,
    generated: Option<Vec<f64>>,
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self::new(DEFAULT_FIT_ORDER)
    }
}

impl CalibrationSession {
    /// Session fitting polynomials of `order`.
    pub fn new(order: usize) -> Self {
        Self {
            points: Vec::new(),
            order,
            generated: None,
        }
    }

    /// Collected points.
    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    /// Add a point.
    pub fn add(&mut self, point: CalibrationPoint) {
        self.points.push(point);
    }

    /// Add several points.
    pub fn extend(&mut self, points: impl IntoIterator<Item = CalibrationPoint>) {
        self.points.extend(points);
    }

    /// Remove the point at `index`.
    pub fn remove(&mut self, index: usize) -> Option<CalibrationPoint> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    /// Remove all points and the pending fit.
    pub fn clear(&mut self) {
        self.points.clear();
        self.generated = None;
    }

    /// Latest successful fit, if any.
    pub fn generated(&self) -> Option<&[f64]> {
        self.generated.as_deref()
    }

    /// Refit from the current points.
    ///
    /// When the points cannot determine a polynomial, the pending fit is
    /// discarded and `active`'s coefficients are returned for display.
    pub fn refit(&mut self, active: &Polynomial) -> FitOutcome {
        match polyfit(&self.points, self.order) {
            Ok(coefficients) => {
                debug!("Calibration fit: {:?}", coefficients);
                self.generated = Some(coefficients.clone());
                FitOutcome::Fitted(coefficients)
            }
            Err(e) => {
                debug!("Calibration fit unavailable: {}", e);
                self.generated = None;
                FitOutcome::Retained(active.coefficients.to_vec())
            }
        }
    }

    /// Replace the pixel-to-wavelength map with the latest fit.
    ///
    /// Returns false when there is no fit to apply.
    pub fn apply(&self, config: &ConfigStore) -> bool {
        let Some(coefficients) = self.generated.as_deref() else {
            return false;
        };
        config.update(|settings| {
            settings.lambda_map = settings.lambda_map.with_coefficients(coefficients);
        });
        info!("Applied wavelength calibration {:?}", coefficients);
        true
    }

    /// Reset the pixel-to-wavelength map to the identity.
    pub fn reset(config: &ConfigStore) {
        config.update(|settings| {
            settings.lambda_map = Polynomial::identity(settings.lambda_map.description.clone());
        });
        info!("Reset wavelength calibration to identity");
    }
}

/// Read calibration points from CSV with `pixel,wavelength` records.
///
/// A header row is optional; rows whose first field is not numeric are
/// skipped.
pub fn load_points_csv<R: Read>(reader: R) -> Result<Vec<CalibrationPoint>, FitError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut points = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let (Some(pixel), Some(wavelength)) = (record.get(0), record.get(1)) else {
            continue;
        };
        match (pixel.parse::<f64>(), wavelength.parse::<f64>()) {
            (Ok(pixel), Ok(wavelength)) => points.push(CalibrationPoint::new(pixel, wavelength)),
            _ => debug!("Skipping non-numeric calibration row {:?}", record),
        }
    }
    Ok(points)
}

impl CalibrationSession {
    /// Load points from a CSV file into a new session.
    pub fn from_csv_file(path: &Path, order: usize) -> Result<Self, FitError> {
        let file = std::fs::File::open(path)?;
        let mut session = Self::new(order);
        session.extend(load_points_csv(file)?);
        Ok(session)
    }
}
