//! # Signal Pipeline
//!
//! Pure transforms from a raw sensor frame to the signal shown to the user:
//!
//! 1. [`correct`]: dark-frame subtraction, pixel → wavelength mapping, intensity
//!    scaling and offset, optional peak normalization.
//! 2. [`resample`]: bin averaging down to the display resolution.
//!
//! Neither step allocates shared state; both can run on any thread.

mod calibration;
mod peak;
mod resample;
mod types;

#[cfg(test)]
mod tests;

pub use calibration::{correct, normalize_to_peak, ADC_FULL_SCALE};
pub use peak::{find_local_peak, LocalPeak, DEFAULT_PEAK_REGION};
pub use resample::{group_size_for, resample};
pub use types::{CaptureWindow, CorrectedSignal, RawFrame, ResampledSignal};
