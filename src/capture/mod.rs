//! # Captures
//!
//! Named snapshots of the processed signal. A capture is either temporary
//! (created by trigger automation and purged by auto-clear) or persistent
//! (taken manually or loaded from disk).
//!
//! Captures are stored behind `Arc` in a single [`CaptureStore`]; every
//! mutation and every iteration happens under the store's lock, and readers
//! that need to work longer (matching) take a snapshot of the `Arc`s.
//!
//! On disk a capture is a `.spect` JSON file:
//!
//! ```json
//! { "Name": "Captured 12:30:01", "Color": "SkyBlue",
//!   "Wavelengths": [450.0, 450.2], "Intensities": [0.01, 0.02] }
//! ```

mod error;
mod persist;
mod spectrum;
mod store;


pub use error::PersistError;
pub use persist::{load_capture, load_captures_in, save_capture, CAPTURE_FILE_EXTENSION};
pub use spectrum::{CapturedSpectrum, CAPTURE_PALETTE};
pub use store::CaptureStore;
