use std::time::{Duration, Instant};

use proptest::prelude::*;

use super::*;
use crate::config::Settings;
use crate::polynomial::Polynomial;

fn identity_settings() -> Settings {
    Settings {
        lambda_map: Polynomial::identity("pixel"),
        ..Default::default()
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

#[test]
fn test_end_to_end_four_pixels() {
    let settings = identity_settings();
    let corrected = correct(&[100, 200, 300, 400], &settings);
    let resampled = resample(&corrected, 2);

    assert_eq!(resampled.group_size, 2);
    assert_eq!(resampled.wavelengths, vec![0.5, 2.5]);
    assert!(close(resampled.intensities[0], 150.0 / ADC_FULL_SCALE));
    assert!(close(resampled.intensities[1], 350.0 / ADC_FULL_SCALE));
}

#[test]
fn test_dark_equal_to_raw_gives_zero() {
    let raw = vec![10, 500, 65535, 0];
    let settings = Settings {
        dark_frame: raw.clone(),
        ..identity_settings()
    };
    let corrected = correct(&raw, &settings);
    assert!(corrected.intensities.iter().all(|&v| v == 0.0));
}

#[test]
fn test_dark_above_raw_clamps_to_zero() {
    let settings = Settings {
        dark_frame: vec![1000, 1000],
        ..identity_settings()
    };
    let corrected = correct(&[10, 2000], &settings);
    assert_eq!(corrected.intensities[0], 0.0);
    assert!(close(corrected.intensities[1], 1000.0 / ADC_FULL_SCALE));
}

#[test]
fn test_mismatched_dark_frame_is_ignored() {
    let settings = Settings {
        dark_frame: vec![100; 3],
        ..identity_settings()
    };
    let corrected = correct(&[100, 100], &settings);
    assert!(corrected
        .intensities
        .iter()
        .all(|&v| close(v, 100.0 / ADC_FULL_SCALE)));
}

#[test]
fn test_scaling_applies_before_offset() {
    let settings = Settings {
        intensity_scaling: Polynomial::constant(2.0, ""),
        intensity_offset: Polynomial::constant(0.5, ""),
        ..identity_settings()
    };
    let corrected = correct(&[65535], &settings);
    assert_eq!(corrected.intensities, vec![2.5]);
}

#[test]
fn test_default_lambda_map() {
    let corrected = correct(&[0; 11], &Settings::default());
    assert_eq!(corrected.wavelengths[0], 450.0);
    assert_eq!(corrected.wavelengths[10], 452.0);
}

#[test]
fn test_auto_normalize_requires_trigger() {
    let mut settings = identity_settings();
    settings.trigger.auto_normalize = true;

    let raw = [0, 100, 400];
    let untouched = correct(&raw, &settings);
    assert!(close(untouched.intensities[2], 400.0 / ADC_FULL_SCALE));

    settings.trigger.enabled = true;
    let normalized = correct(&raw, &settings);
    assert_eq!(normalized.intensities[2], 1.0);
    assert!(close(normalized.intensities[1], 0.25));
}

#[test]
fn test_auto_normalize_skips_all_zero_frame() {
    let mut settings = identity_settings();
    settings.trigger.enabled = true;
    settings.trigger.auto_normalize = true;
    let corrected = correct(&[0, 0, 0], &settings);
    assert_eq!(corrected.intensities, vec![0.0; 3]);
}

#[test]
fn test_resample_identity_when_resolution_matches() {
    let corrected = correct(&[1, 2, 3, 4, 5], &identity_settings());
    let resampled = resample(&corrected, 5);
    assert_eq!(resampled.group_size, 1);
    assert_eq!(resampled.wavelengths, corrected.wavelengths);
    assert_eq!(resampled.intensities, corrected.intensities);
}

#[test]
fn test_resample_upscaling_is_identity() {
    let corrected = correct(&[1, 2, 3], &identity_settings());
    let resampled = resample(&corrected, 1024);
    assert_eq!(resampled.len(), 3);
    assert_eq!(resampled.group_size, 1);
}

#[test]
fn test_resample_drops_remainder() {
    let corrected = correct(&[10; 3694], &Settings::default());
    let resampled = resample(&corrected, 1024);
    assert_eq!(resampled.group_size, 3);
    assert_eq!(resampled.len(), 1231);
}

#[test]
fn test_resample_empty_signal() {
    let resampled = resample(&CorrectedSignal::default(), 16);
    assert!(resampled.is_empty());
    assert_eq!(resampled.peak_intensity(), None);
}

#[test]
fn test_normalize_to_peak() {
    assert_eq!(normalize_to_peak(&[1.0, 2.0, 4.0]), vec![0.25, 0.5, 1.0]);
    assert_eq!(normalize_to_peak(&[0.0, 0.0]), vec![0.0, 0.0]);
    assert!(normalize_to_peak(&[]).is_empty());
}

#[test]
fn test_capture_progress() {
    let start = Instant::now();
    let window = CaptureWindow::new(start, Duration::from_millis(100));
    assert_eq!(window.progress(start), 0.0);
    assert!(close(window.progress(start + Duration::from_millis(25)), 0.25));
    assert_eq!(window.progress(start + Duration::from_secs(5)), 1.0);
    assert_eq!(CaptureWindow::instant(start).progress(start), 1.0);
}

#[test]
fn test_local_peak_prefers_nearby() {
    let wavelengths: Vec<f64> = (0..200).map(|i| 400.0 + i as f64 * 0.5).collect();
    let mut intensities = vec![0.0; 200];
    intensities[105] = 1.0;
    intensities[140] = 1.1;

    let peak = find_local_peak(&wavelengths, &intensities, 100, DEFAULT_PEAK_REGION).unwrap();
    assert_eq!(peak.index, 105);
    assert_eq!(peak.wavelength, 452.5);
    assert_eq!(peak.intensity, 1.0);
}

#[test]
fn test_local_peak_none_on_flat_signal() {
    let wavelengths = vec![1.0; 20];
    let intensities = vec![0.0; 20];
    assert!(find_local_peak(&wavelengths, &intensities, 10, 5).is_none());
    assert!(find_local_peak(&[], &[], 0, 5).is_none());
}

proptest! {
    #[test]
    fn test_dark_subtraction_is_idempotent_on_dark(
        dark in prop::collection::vec(any::<u16>(), 1..128),
    ) {
        let settings = Settings { dark_frame: dark.clone(), ..identity_settings() };
        let once = correct(&dark, &settings);
        prop_assert!(once.intensities.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_intensity_in_unit_range_with_default_curves(
        raw in prop::collection::vec(any::<u16>(), 1..256),
    ) {
        let corrected = correct(&raw, &identity_settings());
        prop_assert_eq!(corrected.len(), raw.len());
        prop_assert!(corrected.intensities.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_bins_never_exceed_input(
        len in 0usize..5000,
        resolution in 1usize..2048,
    ) {
        let signal = CorrectedSignal {
            wavelengths: (0..len).map(|i| i as f64).collect(),
            intensities: vec![1.0; len],
        };
        let resampled = resample(&signal, resolution);
        prop_assert!(resampled.len() * resampled.group_size <= len);
        prop_assert!(resampled.group_size >= 1);
        prop_assert!(resampled.intensities.iter().all(|&v| v == 1.0));
    }
}
