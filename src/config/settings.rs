use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::matching::MatchMethod;
use crate::polynomial::Polynomial;

use super::error::ConfigError;

/// Pixels per frame of the default sensor.
pub const DEFAULT_PIXEL_COUNT: usize = 3694;

/// Smallest SH period accepted from user entry (display units).
pub const MIN_SH_DISPLAY: u64 = 10;

/// Smallest ICG period accepted from user entry (display units).
pub const MIN_ICG_DISPLAY: u64 = 7388;

/// Largest trigger delay accepted by the device.
pub const MAX_TRIGGER_DELAY: u32 = 65535;

/// Trigger and capture automation flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerFlags {
    /// Wait for the external trigger instead of free-running
    pub enabled: bool,
    /// Purge temporary captures before each auto-capture
    pub auto_clear: bool,
    /// Run the matching engine after each triggered frame
    pub auto_match: bool,
    /// Store each triggered frame as a temporary capture
    pub auto_capture: bool,
    /// Divide each triggered frame by its own peak
    pub auto_normalize: bool,
}

/// Sensor timing parameters sent to the device every cycle.
///
/// Periods are stored in device units (twice the displayed value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceTiming {
    /// Shift-gate (integration) period
    pub sh_period: u32,
    /// Integration-clear-gate (readout) period
    pub icg_period: u32,
    /// Delay after the external trigger before integrating
    pub trigger_delay: u32,
    /// Pixels per frame
    pub pixel_count: usize,
}

impl Default for DeviceTiming {
    fn default() -> Self {
        Self {
            sh_period: 10,
            icg_period: 7400,
            trigger_delay: 0,
            pixel_count: DEFAULT_PIXEL_COUNT,
        }
    }
}

impl DeviceTiming {
    /// Set the SH period from a displayed value.
    ///
    /// The value is clamped to `[MIN_SH_DISPLAY, u32::MAX / 2]` and doubled.
    /// If the result exceeds the ICG period, the ICG period is raised to match.
    pub fn set_sh_display(&mut self, display: u64) {
        let display = display.clamp(MIN_SH_DISPLAY, u64::from(u32::MAX / 2));
        self.sh_period = (display * 2) as u32;
        if self.sh_period > self.icg_period {
            self.icg_period = self.sh_period;
        }
    }

    /// Set the ICG period from a displayed value.
    ///
    /// The value is clamped to `[MIN_ICG_DISPLAY, u32::MAX / 2]`, doubled and
    /// rounded up to a whole multiple of the SH period.
    pub fn set_icg_display(&mut self, display: u64) {
        let display = display.clamp(MIN_ICG_DISPLAY, u64::from(u32::MAX / 2));
        let raw = display * 2;
        let sh = u64::from(self.sh_period.max(1));
        let rounded = raw.div_ceil(sh) * sh;
        self.icg_period = rounded.min(u64::from(u32::MAX)) as u32;
    }

    /// Set the trigger delay, clamped to the device range.
    pub fn set_trigger_delay(&mut self, delay: i64) {
        self.trigger_delay = delay.clamp(0, i64::from(MAX_TRIGGER_DELAY)) as u32;
    }

    /// SH period in display units.
    pub fn sh_display(&self) -> u32 {
        self.sh_period / 2
    }

    /// ICG period in display units.
    pub fn icg_display(&self) -> u32 {
        self.icg_period / 2
    }

    /// Expected exposure duration in whole milliseconds.
    pub fn expected_capture_ms(&self) -> u64 {
        u64::from(self.icg_period / 2000)
    }

    /// Bytes in one frame payload.
    pub fn frame_bytes(&self) -> usize {
        self.pixel_count * 2
    }
}

/// Parameters handed to the reference-library fetch collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryQuery {
    /// Directory holding `LIBS-<element>.json` files
    pub directory: PathBuf,
    /// Lower wavelength bound in nm
    pub min_wavelength: u32,
    /// Upper wavelength bound in nm
    pub max_wavelength: u32,
    /// Highest ionization stage to include
    pub max_charge: u32,
    /// Spectral resolving power
    pub resolution: u32,
    /// Plasma temperature in eV
    pub temperature: f64,
}

impl Default for LibraryQuery {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            min_wavelength: 300,
            max_wavelength: 600,
            max_charge: 1,
            resolution: 500,
            temperature: 1.0,
        }
    }
}

/// Complete front-end settings.
///
/// Plain values are declared before nested tables so the TOML output stays
/// valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display color of the live measurement
    pub measurement_color: String,
    /// Display color of the selected reference line
    pub reference_color: String,
    /// Serial port of the last successful connection
    pub serial_port: String,
    /// Target bin count of the resampled signal
    pub resample_resolution: usize,
    /// Scoring strategy of the matching engine
    pub match_method: MatchMethod,
    /// Per-pixel baseline subtracted from every frame
    pub dark_frame: Vec<u16>,
    /// Pixel index → wavelength
    pub lambda_map: Polynomial,
    /// Wavelength → intensity scale, applied before the offset
    pub intensity_scaling: Polynomial,
    /// Wavelength → intensity offset, applied after scaling
    pub intensity_offset: Polynomial,
    /// Trigger and capture automation
    pub trigger: TriggerFlags,
    /// Device timing
    pub timing: DeviceTiming,
    /// Reference library parameters
    pub library: LibraryQuery,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            measurement_color: "SkyBlue".to_string(),
            reference_color: "Red".to_string(),
            serial_port: "COM1".to_string(),
            resample_resolution: 1024,
            match_method: MatchMethod::default(),
            dark_frame: Vec::new(),
            lambda_map: Polynomial::new(
                450.0,
                0.2,
                0.0,
                0.0,
                "Pixel number to wavelength. Input is pixel number, output is wavelength.",
            ),
            intensity_scaling: Polynomial::constant(
                1.0,
                "Intensity scale. Input is wavelength, output is scale. Applied before offset.",
            ),
            intensity_offset: Polynomial::constant(
                0.0,
                "Intensity offset. Input is wavelength, output is offset. Applied after scaling.",
            ),
            trigger: TriggerFlags::default(),
            timing: DeviceTiming::default(),
            library: LibraryQuery::default(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check value ranges that the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resample_resolution == 0 {
            return Err(ConfigError::Invalid(
                "resample_resolution must be at least 1".to_string(),
            ));
        }
        if self.timing.sh_period == 0 {
            return Err(ConfigError::Invalid("sh_period must be non-zero".to_string()));
        }
        if self.timing.icg_period < self.timing.sh_period {
            return Err(ConfigError::Invalid(format!(
                "icg_period ({}) must not be shorter than sh_period ({})",
                self.timing.icg_period, self.timing.sh_period
            )));
        }
        if self.timing.trigger_delay > MAX_TRIGGER_DELAY {
            return Err(ConfigError::Invalid(format!(
                "trigger_delay must be at most {}",
                MAX_TRIGGER_DELAY
            )));
        }
        if self.timing.pixel_count == 0 {
            return Err(ConfigError::Invalid("pixel_count must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Copy every externally editable field from `other`.
    ///
    /// The dark frame and display colors are owned by this process and kept.
    pub fn apply_external_edit(&mut self, other: Settings) {
        let dark_frame = std::mem::take(&mut self.dark_frame);
        let measurement_color = std::mem::take(&mut self.measurement_color);
        let reference_color = std::mem::take(&mut self.reference_color);

        *self = other;
        self.dark_frame = dark_frame;
        self.measurement_color = measurement_color;
        self.reference_color = reference_color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.lambda_map.calc(10.0), 452.0);
        assert_eq!(settings.match_method, MatchMethod::SquaresSumSat);
        assert_eq!(settings.timing.frame_bytes(), 3694 * 2);
    }

    #[test]
    fn test_toml_roundtrip_preserves_settings() {
        let mut settings = Settings::default();
        settings.trigger.enabled = true;
        settings.dark_frame = vec![1, 2, 3];

        let text = settings.to_toml_string().unwrap();
        let parsed = Settings::from_toml_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_partial_toml() {
        let settings = Settings::from_toml_str(
            r#"
            resample_resolution = 512

            [trigger]
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(settings.resample_resolution, 512);
        assert!(settings.trigger.enabled);
        assert!(!settings.trigger.auto_match);
        assert_eq!(settings.timing.icg_period, 7400);
    }

    #[test]
    fn test_empty_toml() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_unknown_match_method_rejected() {
        let err = Settings::from_toml_str(r#"match_method = "Correlate""#).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let err = Settings::from_toml_str("resample_resolution = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_sh_display_raises_icg() {
        let mut timing = DeviceTiming::default();
        timing.set_sh_display(5000);
        assert_eq!(timing.sh_period, 10000);
        assert_eq!(timing.icg_period, 10000);

        timing.set_sh_display(1);
        assert_eq!(timing.sh_period, 20);
    }

    #[test]
    fn test_icg_display_rounds_to_sh_multiple() {
        let mut timing = DeviceTiming {
            sh_period: 100,
            ..Default::default()
        };
        timing.set_icg_display(7390);
        // 14780 rounded up to a multiple of 100
        assert_eq!(timing.icg_period, 14800);
        assert_eq!(timing.icg_display(), 7400);

        timing.set_icg_display(10);
        assert_eq!(timing.icg_period, 14800);
    }

    #[test]
    fn test_trigger_delay_clamped() {
        let mut timing = DeviceTiming::default();
        timing.set_trigger_delay(-5);
        assert_eq!(timing.trigger_delay, 0);
        timing.set_trigger_delay(100_000);
        assert_eq!(timing.trigger_delay, MAX_TRIGGER_DELAY);
    }

    #[test]
    fn test_external_edit_keeps_dark_frame_and_colors() {
        let mut current = Settings {
            dark_frame: vec![7; 4],
            measurement_color: "Green".to_string(),
            ..Default::default()
        };
        let edited = Settings {
            resample_resolution: 64,
            measurement_color: "Blue".to_string(),
            ..Default::default()
        };

        current.apply_external_edit(edited);
        assert_eq!(current.resample_resolution, 64);
        assert_eq!(current.dark_frame, vec![7; 4]);
        assert_eq!(current.measurement_color, "Green");
    }
}
