use super::*;
use crate::config::{ConfigStore, Settings};
use crate::polynomial::Polynomial;

fn sample(coefficients: [f64; 4], pixels: &[f64]) -> Vec<CalibrationPoint> {
    let p = Polynomial::from_slice(&coefficients, "");
    pixels
        .iter()
        .map(|&x| CalibrationPoint::new(x, p.calc(x)))
        .collect()
}

#[test]
fn test_exact_cubic_through_four_points() {
    let truth = [1.0, -2.0, 0.5, 0.25];
    let points = sample(truth, &[0.0, 1.0, 2.0, 3.0]);
    let fit = polyfit(&points, 3).unwrap();
    for (got, want) in fit.iter().zip(truth) {
        assert!((got - want).abs() < 1e-9, "{got} != {want}");
    }
}

#[test]
fn test_realistic_pixel_range() {
    let truth = [450.0, 0.2, 1e-5, -2e-9];
    let points = sample(truth, &[120.0, 900.0, 1850.0, 2700.0, 3600.0]);
    let fit = polyfit(&points, 3).unwrap();
    let fitted = Polynomial::from_slice(&fit, "");
    let expected = Polynomial::from_slice(&truth, "");
    for x in [0.0, 1000.0, 3693.0] {
        assert!((fitted.calc(x) - expected.calc(x)).abs() < 1e-6);
    }
}

#[test]
fn test_overdetermined_line() {
    let points = sample([450.0, 0.2, 0.0, 0.0], &[0.0, 10.0, 20.0, 30.0, 40.0]);
    let fit = polyfit(&points, 1).unwrap();
    assert_eq!(fit.len(), 2);
    assert!((fit[0] - 450.0).abs() < 1e-9);
    assert!((fit[1] - 0.2).abs() < 1e-12);
}

#[test]
fn test_underdetermined() {
    let points = sample([1.0, 1.0, 0.0, 0.0], &[1.0, 2.0]);
    assert!(matches!(
        polyfit(&points, 3),
        Err(FitError::Underdetermined {
            points: 2,
            required: 4
        })
    ));
}

#[test]
fn test_repeated_pixels_are_singular() {
    let points = vec![
        CalibrationPoint::new(5.0, 400.0),
        CalibrationPoint::new(5.0, 401.0),
        CalibrationPoint::new(5.0, 402.0),
    ];
    assert!(matches!(polyfit(&points, 2), Err(FitError::Singular)));
}

#[test]
fn test_unsupported_order() {
    assert!(matches!(
        polyfit(&[], 4),
        Err(FitError::UnsupportedOrder(4))
    ));
}

#[test]
fn test_session_retains_active_when_too_few_points() {
    let active = Polynomial::new(450.0, 0.2, 0.0, 0.0, "lambda");
    let mut session = CalibrationSession::default();
    session.add(CalibrationPoint::new(100.0, 470.0));

    let outcome = session.refit(&active);
    assert!(!outcome.is_fitted());
    assert_eq!(outcome.coefficients(), &[450.0, 0.2, 0.0, 0.0]);
    assert!(session.generated().is_none());
}

#[test]
fn test_session_apply_and_reset() {
    let store = ConfigStore::in_memory(Settings::default());
    let mut session = CalibrationSession::new(1);
    assert!(!session.apply(&store));

    session.extend(sample([400.0, 0.1, 0.0, 0.0], &[0.0, 1000.0]));
    let outcome = session.refit(&store.snapshot().settings.lambda_map);
    assert!(outcome.is_fitted());
    assert!(session.apply(&store));

    let lambda = store.snapshot().settings.lambda_map.clone();
    assert!((lambda.calc(500.0) - 450.0).abs() < 1e-9);
    assert_eq!(lambda.coefficients[2], 0.0);
    assert!(!lambda.description.is_empty());

    CalibrationSession::reset(&store);
    assert!(store.snapshot().settings.lambda_map.is_identity());
}

#[test]
fn test_session_remove_and_clear() {
    let mut session = CalibrationSession::default();
    session.add(CalibrationPoint::new(1.0, 2.0));
    assert!(session.remove(3).is_none());
    assert_eq!(session.remove(0), Some(CalibrationPoint::new(1.0, 2.0)));
    session.add(CalibrationPoint::new(1.0, 2.0));
    session.clear();
    assert!(session.points().is_empty());
}

#[test]
fn test_load_points_csv() {
    let data = "pixel, wavelength\n# Hg lines\n512, 435.83\n1500,546.07\n\n3000 ,\n";
    let points = load_points_csv(data.as_bytes()).unwrap();
    assert_eq!(
        points,
        vec![
            CalibrationPoint::new(512.0, 435.83),
            CalibrationPoint::new(1500.0, 546.07),
        ]
    );
}
