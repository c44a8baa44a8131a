use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use spectrometer::solver::{CalibrationSession, FitOutcome};

/// Fit the wavelength map from a CSV point list
pub fn run(
    config_path: Option<PathBuf>,
    points: Option<PathBuf>,
    order: usize,
    apply: bool,
    reset: bool,
) -> Result<()> {
    let config = super::open_store(config_path.as_deref())?;

    if reset {
        CalibrationSession::reset(&config);
        config.save().context("Failed to save settings")?;
        println!("Wavelength map reset to identity");
        return Ok(());
    }

    let Some(points) = points else {
        anyhow::bail!("No calibration point file given");
    };
    let mut session = CalibrationSession::from_csv_file(&points, order)
        .with_context(|| format!("Failed to read calibration points from {}", points.display()))?;
    info!("Loaded {} calibration points", session.points().len());

    let active = config.snapshot().settings.lambda_map.clone();
    let outcome = session.refit(&active);

    match &outcome {
        FitOutcome::Fitted(_) => println!("Fitted order-{} wavelength map:", order),
        FitOutcome::Retained(_) => println!(
            "Not enough distinct points for order {} ({} given); active map:",
            order,
            session.points().len()
        ),
    }
    for (power, c) in outcome.coefficients().iter().enumerate() {
        println!("  c{} = {:.12e}", power, c);
    }

    if let FitOutcome::Fitted(coefficients) = &outcome {
        let fitted = active.with_coefficients(coefficients);
        println!();
        println!("{:>10} {:>12} {:>12} {:>10}", "pixel", "reference", "fitted", "error");
        for point in session.points() {
            let predicted = fitted.calc(point.sensor_pixel);
            println!(
                "{:>10.2} {:>12.4} {:>12.4} {:>10.4}",
                point.sensor_pixel,
                point.reference_wavelength,
                predicted,
                predicted - point.reference_wavelength
            );
        }
    }

    if apply {
        if session.apply(&config) {
            config.save().context("Failed to save settings")?;
            println!("Applied to {}", config.path().map(|p| p.display().to_string()).unwrap_or_default());
        } else {
            anyhow::bail!("No fit to apply");
        }
    }
    Ok(())
}
