//! # Configuration
//!
//! Device and calibration settings, persisted as TOML.
//!
//! ```toml
//! # spectrometer.toml
//! serial_port = "/dev/ttyUSB0"
//! resample_resolution = 1024
//! match_method = "SquaresSumSat"
//!
//! [lambda_map]
//! coefficients = [450.0, 0.2, 0.0, 0.0]
//!
//! [trigger]
//! enabled = true
//! auto_capture = true
//! auto_clear = true
//!
//! [timing]
//! sh_period = 10
//! icg_period = 7400
//! ```
//!
//! Readers never see a half-applied edit: the [`ConfigStore`] hands out
//! immutable, versioned [`ConfigSnapshot`]s and replaces them atomically.

mod error;
mod settings;
mod store;

pub use error::ConfigError;
pub use settings::{
    DeviceTiming, LibraryQuery, Settings, TriggerFlags, DEFAULT_PIXEL_COUNT, MAX_TRIGGER_DELAY,
    MIN_ICG_DISPLAY, MIN_SH_DISPLAY,
};
pub use store::{ConfigSnapshot, ConfigStore, RELOAD_CHECK_INTERVAL};
