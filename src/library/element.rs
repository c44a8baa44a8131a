use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::pipeline::normalize_to_peak;

use super::database::{LIBRARY_FILE_PREFIX, LIBRARY_FILE_SUFFIX};
use super::error::LibraryError;

/// One emission-line intensity series on its element's native axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReferenceLine {
    name: String,
    intensities: Vec<f64>,
    #[serde(skip)]
    normalized: OnceLock<Vec<f64>>,
}

impl ReferenceLine {
    /// Create a line series.
    pub fn new(name: impl Into<String>, intensities: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            intensities,
            normalized: OnceLock::new(),
        }
    }

    /// Line name, e.g. `Fe I`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Intensities on the native axis.
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// Intensities divided by their peak, computed on first use.
    ///
    /// The series cannot be mutated after construction, so the cache never
    /// goes stale.
    pub fn normalized(&self) -> &[f64] {
        self.normalized
            .get_or_init(|| normalize_to_peak(&self.intensities))
    }

    /// Largest native intensity, or 0 for an empty series.
    pub fn peak(&self) -> f64 {
        self.intensities.iter().copied().fold(0.0, f64::max)
    }
}

/// A reference series resampled onto a caller-provided wavelength grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralWindow {
    /// Line name
    pub name: String,
    /// The target wavelengths
    pub wavelengths: Vec<f64>,
    /// Interpolated intensity per target wavelength
    pub intensities: Vec<f64>,
}

impl SpectralWindow {
    /// Largest intensity in the window, or 0 when empty.
    pub fn peak(&self) -> f64 {
        self.intensities.iter().copied().fold(0.0, f64::max)
    }
}

/// Reference spectra of one chemical element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReferenceElement {
    /// Element symbol
    pub name: String,
    /// Native wavelength axis in nm, ascending
    pub wavelengths: Vec<f64>,
    /// Emission-line series sharing the native axis
    #[serde(rename = "Elements", default)]
    pub lines: Vec<ReferenceLine>,
}

impl ReferenceElement {
    /// Create an element with no lines.
    pub fn new(name: impl Into<String>, wavelengths: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            wavelengths,
            lines: Vec::new(),
        }
    }

    /// Add a line series.
    pub fn with_line(mut self, line: ReferenceLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Find a line by exact name.
    pub fn line(&self, name: &str) -> Option<&ReferenceLine> {
        self.lines.iter().find(|l| l.name == name)
    }

    /// Check that every series matches the axis and the axis is ascending.
    pub fn validate(&self, path: &Path) -> Result<(), LibraryError> {
        let malformed = |reason: String| LibraryError::Malformed {
            path: path.to_path_buf(),
            reason,
        };

        if self.wavelengths.windows(2).any(|w| w[1] < w[0]) {
            return Err(malformed("wavelength axis is not ascending".to_string()));
        }
        for line in &self.lines {
            if line.intensities.len() != self.wavelengths.len() {
                return Err(malformed(format!(
                    "line '{}' has {} intensities for {} wavelengths",
                    line.name,
                    line.intensities.len(),
                    self.wavelengths.len()
                )));
            }
        }
        Ok(())
    }

    /// Interpolate the lines onto `targets`.
    ///
    /// With `name_filter` only the line of that name is returned. Targets are
    /// expected in ascending order (the bracket search resumes from the
    /// previous position) but any order gives correct results. Targets
    /// outside the native range get intensity 0.
    pub fn get_window(&self, targets: &[f64], name_filter: Option<&str>) -> Vec<SpectralWindow> {
        let lines: Vec<&ReferenceLine> = self
            .lines
            .iter()
            .filter(|l| name_filter.map_or(true, |name| l.name == name))
            .collect();

        let mut series: Vec<Vec<f64>> = vec![Vec::with_capacity(targets.len()); lines.len()];
        let mut pos = 0;

        for &target in targets {
            let bracket = self.locate(target, &mut pos);
            for (line, out) in lines.iter().zip(series.iter_mut()) {
                out.push(match bracket {
                    Some((left, t)) => interpolate(&line.intensities, left, t),
                    None => 0.0,
                });
            }
        }

        lines
            .into_iter()
            .zip(series)
            .map(|(line, intensities)| SpectralWindow {
                name: line.name.clone(),
                wavelengths: targets.to_vec(),
                intensities,
            })
            .collect()
    }

    /// Find the left bracket index and interpolation fraction for `target`.
    ///
    /// `pos` carries the previous bracket between calls.
    fn locate(&self, target: f64, pos: &mut usize) -> Option<(usize, f64)> {
        let axis = &self.wavelengths;
        let n = axis.len();
        if n == 0 || !(target >= axis[0] && target <= axis[n - 1]) {
            return None;
        }
        if n == 1 {
            return Some((0, 0.0));
        }

        let mut left = (*pos).min(n - 2);
        while left > 0 && axis[left] > target {
            left -= 1;
        }
        while left + 2 < n && axis[left + 1] <= target {
            left += 1;
        }
        *pos = left;

        let (lo, hi) = (axis[left], axis[left + 1]);
        let t = if hi == lo { 0.0 } else { (target - lo) / (hi - lo) };
        Some((left, t))
    }

    /// File name under the library naming convention.
    pub fn file_name(&self) -> String {
        format!("{}{}{}", LIBRARY_FILE_PREFIX, self.name, LIBRARY_FILE_SUFFIX)
    }

    /// Write this element as `LIBS-<name>.json` into `dir`.
    pub fn save_to_dir(&self, dir: &Path) -> Result<PathBuf, LibraryError> {
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }

    /// Read and validate one element file.
    pub fn load(path: &Path) -> Result<Self, LibraryError> {
        let content = std::fs::read_to_string(path)?;
        let element: ReferenceElement = serde_json::from_str(&content)?;
        element.validate(path)?;
        Ok(element)
    }
}

fn interpolate(intensities: &[f64], left: usize, t: f64) -> f64 {
    let a = intensities[left];
    if t == 0.0 {
        return a;
    }
    let b = intensities.get(left + 1).copied().unwrap_or(a);
    a + t * (b - a)
}
