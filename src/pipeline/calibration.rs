//! Raw frame → calibrated signal.

use crate::config::Settings;

use super::types::CorrectedSignal;

/// Full-scale ADC count; corrected counts are divided by this.
pub const ADC_FULL_SCALE: f64 = 65535.0;

/// Convert raw ADC counts into a calibrated signal.
///
/// Per pixel `i`:
///
/// ```text
/// dark          = dark_frame[i]            (0 when the dark frame length differs)
/// adc           = clamp01((raw[i] - min(dark, raw[i])) / 65535)
/// wavelength[i] = lambda_map(i)
/// intensity[i]  = adc · scaling(wavelength[i]) + offset(wavelength[i])
/// ```
///
/// With the trigger and auto-normalize flags both set, intensities are then
/// divided by their maximum (skipped when the maximum is 0).
pub fn correct(raw: &[u16], settings: &Settings) -> CorrectedSignal {
    let dark = if settings.dark_frame.len() == raw.len() {
        Some(settings.dark_frame.as_slice())
    } else {
        None
    };

    let mut wavelengths = Vec::with_capacity(raw.len());
    let mut intensities = Vec::with_capacity(raw.len());

    for (pixel, &value) in raw.iter().enumerate() {
        let value = f64::from(value);
        let dark_value = dark.map_or(0.0, |d| f64::from(d[pixel]));
        let adc = ((value - dark_value.min(value)) / ADC_FULL_SCALE).clamp(0.0, 1.0);

        let wavelength = settings.lambda_map.calc(pixel as f64);
        let intensity = adc * settings.intensity_scaling.calc(wavelength)
            + settings.intensity_offset.calc(wavelength);

        wavelengths.push(wavelength);
        intensities.push(intensity);
    }

    if settings.trigger.enabled && settings.trigger.auto_normalize {
        let max = intensities.iter().copied().fold(0.0, f64::max);
        if max != 0.0 {
            for v in intensities.iter_mut() {
                *v /= max;
            }
        }
    }

    CorrectedSignal {
        wavelengths,
        intensities,
    }
}

/// Divide every value by the sequence's own maximum.
///
/// Returns an unchanged copy when the maximum is 0 or the input is empty.
pub fn normalize_to_peak(values: &[f64]) -> Vec<f64> {
    match values.iter().copied().reduce(f64::max) {
        Some(peak) if peak != 0.0 => values.iter().map(|v| v / peak).collect(),
        _ => values.to_vec(),
    }
}
