use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::ResampledSignal;

/// Colors assigned to new captures in rotation.
pub const CAPTURE_PALETTE: [&str; 8] = [
    "Orange",
    "Green",
    "Purple",
    "Brown",
    "Magenta",
    "Olive",
    "Teal",
    "Gray",
];

/// A stored spectrum.
///
/// Only the label and color can change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CapturedSpectrum {
    #[serde(skip, default = "Uuid::new_v4")]
    id: Uuid,
    name: String,
    #[serde(default)]
    color: String,
    wavelengths: Vec<f64>,
    intensities: Vec<f64>,
    #[serde(default = "Utc::now")]
    captured_at: DateTime<Utc>,
    #[serde(skip)]
    temporary: bool,
}

impl CapturedSpectrum {
    /// Create a persistent capture.
    pub fn new(name: impl Into<String>, wavelengths: Vec<f64>, intensities: Vec<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: String::new(),
            wavelengths,
            intensities,
            captured_at: Utc::now(),
            temporary: false,
        }
    }

    /// Capture `signal` labelled with the local time, e.g. `Captured 14:03:27`.
    pub fn from_signal(signal: &ResampledSignal, temporary: bool) -> Self {
        let label = format!("Captured {}", Local::now().format("%H:%M:%S"));
        Self {
            temporary,
            ..Self::new(label, signal.wavelengths.clone(), signal.intensities.clone())
        }
    }

    /// Builder-style color assignment.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Unique identifier, assigned at creation or load.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display color name; empty when unassigned.
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Wavelength axis.
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Intensities.
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// Creation time.
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Whether auto-clear may purge this capture.
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.intensities.len()
    }

    /// Returns true if the capture holds no points.
    pub fn is_empty(&self) -> bool {
        self.intensities.is_empty()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_color(&mut self, color: String) {
        self.color = color;
    }
}
