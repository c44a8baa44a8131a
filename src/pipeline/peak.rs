//! Peak search around a cursor position.

/// Default half-width of the search region, in samples.
pub const DEFAULT_PEAK_REGION: usize = 50;

/// A peak located by [`find_local_peak`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPeak {
    /// Sample index of the peak
    pub index: usize,
    /// Wavelength at the peak
    pub wavelength: f64,
    /// Unweighted intensity at the peak
    pub intensity: f64,
}

/// Find the dominant peak within `region` samples of `index`.
///
/// Each candidate's intensity is weighted by `sqrt(1 - distance / region)`
/// so that nearby peaks win over slightly taller distant ones. Returns `None`
/// when no candidate has a positive weighted intensity.
pub fn find_local_peak(
    wavelengths: &[f64],
    intensities: &[f64],
    index: usize,
    region: usize,
) -> Option<LocalPeak> {
    let len = wavelengths.len().min(intensities.len());
    if len == 0 || region == 0 {
        return None;
    }

    let start = index.saturating_sub(region);
    let end = (index + region).min(len - 1);

    let mut best: Option<LocalPeak> = None;
    let mut best_weighted = 0.0;

    for pos in start..end {
        let distance = index.abs_diff(pos).max(1);
        let factor = (1.0 - distance as f64 / region as f64).max(0.0).sqrt();
        let weighted = intensities[pos] * factor;

        if weighted > best_weighted {
            best_weighted = weighted;
            best = Some(LocalPeak {
                index: pos,
                wavelength: wavelengths[pos],
                intensity: intensities[pos],
            });
        }
    }

    best
}
