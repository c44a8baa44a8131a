//! # spectrometer - Linear CCD Spectrometer Front End
//!
//! `spectrometer` turns raw frames from a serial-attached linear CCD sensor
//! into calibrated, display-ready spectra and compares them with stored
//! captures and theoretical emission lines.
//!
//! ## Key Features
//!
//! - **Device Driver**: dedicated acquisition thread speaking the sensor
//!   board's 12-byte command protocol, with cooperative cancellation and
//!   bounded teardown.
//!
//! - **Calibration Pipeline**: dark-frame subtraction, cubic pixel →
//!   wavelength mapping, intensity scale and offset curves, optional peak
//!   normalization and bin averaging to display resolution.
//!
//! - **Trigger Automation**: externally triggered frames can be captured,
//!   purged and matched automatically.
//!
//! - **Spectral Matching**: three similarity metrics against captures and a
//!   reference library interpolated onto the measured grid, computed on a
//!   cancellable background task.
//!
//! - **Wavelength Calibration**: least-squares cubic fit of known lines.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use spectrometer::acquisition::{AcquisitionDriver, DriverOptions, FrameSlot};
//! use spectrometer::capture::CaptureStore;
//! use spectrometer::config::ConfigStore;
//! use spectrometer::trigger::{CaptureController, TICK_INTERVAL};
//!
//! let config = Arc::new(ConfigStore::open("spectrometer.toml")?);
//! let frames = Arc::new(FrameSlot::new());
//! let driver = AcquisitionDriver::connect(
//!     "/dev/ttyACM0",
//!     Arc::clone(&config),
//!     Arc::clone(&frames),
//!     DriverOptions::default(),
//! )?;
//!
//! let (events, display) = crossbeam_channel::unbounded();
//! let controller = CaptureController::new(config, frames, Arc::new(CaptureStore::new()), events);
//! for _ in 0..100 {
//!     controller.tick();
//!     for event in display.try_iter() {
//!         println!("{:?}", event);
//!     }
//!     std::thread::sleep(TICK_INTERVAL);
//! }
//! driver.disconnect()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`acquisition`]: serial protocol, device link and acquisition thread
//! - [`pipeline`]: raw frame → corrected → resampled signal
//! - [`config`]: settings, versioned store and file reload
//! - [`trigger`]: the periodic tick and capture automation
//! - [`capture`]: stored spectra and `.spect` persistence
//! - [`library`]: reference emission lines
//! - [`matching`]: similarity metrics and the match engine
//! - [`solver`]: wavelength calibration fit
//! - [`polynomial`]: cubic calibration curves
//!
//! ## Threads
//!
//! | Thread | Owns | Talks to |
//! |--------|------|----------|
//! | `acquisition` | the device link | [`acquisition::FrameSlot`], driver events |
//! | caller (tick) | [`trigger::CaptureController`] | display events |
//! | `match-<n>` | one match run | display events |

// Documentation lints
#![warn(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod acquisition;
pub mod capture;
pub mod config;
pub mod events;
pub mod library;
pub mod matching;
pub mod pipeline;
pub mod polynomial;
pub mod solver;
pub mod trigger;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::acquisition::{
        AcquisitionDriver, AcquisitionError, DeviceLink, DriverEvent, DriverOptions, FrameSlot,
        SimulatedSensor,
    };
    pub use crate::capture::{CaptureStore, CapturedSpectrum, PersistError};
    pub use crate::config::{ConfigError, ConfigStore, Settings};
    pub use crate::events::DisplayEvent;
    pub use crate::library::{ElementLibrary, LibraryError, ReferenceElement, ReferenceLine};
    pub use crate::matching::{score, MatchEngine, MatchError, MatchMethod, MatchOutcome};
    pub use crate::pipeline::{correct, resample, CorrectedSignal, RawFrame, ResampledSignal};
    pub use crate::polynomial::Polynomial;
    pub use crate::solver::{polyfit, CalibrationPoint, CalibrationSession, FitError};
    pub use crate::trigger::{CaptureController, TickOutcome, TickState};
}
