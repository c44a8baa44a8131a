//! Bin averaging to display resolution.

use super::types::{CorrectedSignal, ResampledSignal};

/// Number of input samples per output bin for a signal of `len` samples.
///
/// A target resolution of 0 is treated as 1.
pub fn group_size_for(len: usize, target_resolution: usize) -> usize {
    (len / target_resolution.max(1)).max(1)
}

/// Average `signal` down to roughly `target_resolution` bins.
///
/// `group_size = max(1, len / target_resolution)` and
/// `bins = len / group_size`, so every bin holds exactly `group_size` samples
/// and any remainder at the end of the signal is dropped. Both axes are
/// averaged.
pub fn resample(signal: &CorrectedSignal, target_resolution: usize) -> ResampledSignal {
    let len = signal.len().min(signal.intensities.len());
    let group_size = group_size_for(len, target_resolution);
    let bins = len / group_size;

    let mut wavelengths = Vec::with_capacity(bins);
    let mut intensities = Vec::with_capacity(bins);

    for bin in 0..bins {
        let start = bin * group_size;
        let end = ((bin + 1) * group_size).min(len);

        let x_sum: f64 = signal.wavelengths[start..end].iter().sum();
        let y_sum: f64 = signal.intensities[start..end].iter().sum();

        wavelengths.push(x_sum / group_size as f64);
        intensities.push(y_sum / group_size as f64);
    }

    ResampledSignal {
        wavelengths,
        intensities,
        group_size,
    }
}
