//! Frame and signal types passed between pipeline stages.

use std::time::{Duration, Instant};

/// Time window of one device exposure, used for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureWindow {
    /// When the start command was written to the device
    pub start: Instant,
    /// When the device is expected to have finished integrating
    pub expected_end: Instant,
}

impl CaptureWindow {
    /// Window starting at `start` and lasting `duration`.
    pub fn new(start: Instant, duration: Duration) -> Self {
        Self {
            start,
            expected_end: start + duration,
        }
    }

    /// Zero-length window at `now`.
    pub fn instant(now: Instant) -> Self {
        Self::new(now, Duration::ZERO)
    }

    /// Expected exposure duration.
    pub fn duration(&self) -> Duration {
        self.expected_end.saturating_duration_since(self.start)
    }

    /// Fraction of the window elapsed at `now`, clamped to `[0, 1]`.
    ///
    /// A zero-length window is always complete.
    pub fn progress(&self, now: Instant) -> f64 {
        let expected = self.duration().as_secs_f64();
        if expected <= 0.0 {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start).as_secs_f64();
        (elapsed / expected).min(1.0)
    }
}

/// One full sweep of sensor pixel readings.
///
/// The driver reuses its buffer every cycle; consumers receive copies.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// Unsigned 16-bit ADC counts, one per pixel
    pub samples: Vec<u16>,
    /// Exposure window of this frame
    pub window: CaptureWindow,
}

impl RawFrame {
    /// Frame with a zero-length capture window at the current instant.
    pub fn new(samples: Vec<u16>) -> Self {
        Self {
            samples,
            window: CaptureWindow::instant(Instant::now()),
        }
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the frame holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Calibrated signal: one wavelength and one intensity per pixel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectedSignal {
    /// Wavelength per pixel in nm
    pub wavelengths: Vec<f64>,
    /// Corrected intensity per pixel
    pub intensities: Vec<f64>,
}

impl CorrectedSignal {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    /// Returns true if the signal is empty.
    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }
}

/// A [`CorrectedSignal`] averaged down to display resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResampledSignal {
    /// Mean wavelength per bin
    pub wavelengths: Vec<f64>,
    /// Mean intensity per bin
    pub intensities: Vec<f64>,
    /// Number of input samples folded into each bin
    pub group_size: usize,
}

impl ResampledSignal {
    /// Number of bins.
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    /// Returns true if there are no bins.
    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// Largest intensity, or `None` for an empty signal.
    pub fn peak_intensity(&self) -> Option<f64> {
        self.intensities.iter().copied().reduce(f64::max)
    }
}
