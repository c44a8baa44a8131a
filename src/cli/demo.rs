use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use spectrometer::acquisition::{AcquisitionDriver, DriverOptions, FrameSlot, SimulatedSensor};
use spectrometer::config::{ConfigStore, Settings};

use super::session::{self, SessionOptions};

/// Emission lines of the simulated sensor as (pixel, amplitude, width).
const DEMO_LINES: [(f64, f64, f64); 4] = [
    (410.0, 30000.0, 3.0),
    (1200.0, 52000.0, 4.0),
    (1260.0, 18000.0, 2.5),
    (2890.0, 41000.0, 5.0),
];

/// Run the pipeline against a simulated sensor
pub fn run(config_path: Option<PathBuf>, options: SessionOptions) -> Result<()> {
    // Without an explicit file the demo leaves the working directory untouched
    let config = match config_path {
        Some(path) => super::open_store(Some(&path))?,
        None => Arc::new(ConfigStore::in_memory(Settings::default())),
    };

    let pixels = config.snapshot().settings.timing.pixel_count;
    let sensor = DEMO_LINES
        .iter()
        .fold(SimulatedSensor::new(pixels), |sensor, &(center, amplitude, width)| {
            sensor.with_line(center, amplitude, width)
        });

    let frames = Arc::new(FrameSlot::new());
    let driver = AcquisitionDriver::connect_with(
        sensor,
        Arc::clone(&config),
        Arc::clone(&frames),
        DriverOptions::default(),
    )
    .context("Failed to start simulated sensor")?;
    info!("Simulated sensor with {} pixels", pixels);

    session::run(driver, config, frames, options)
}
