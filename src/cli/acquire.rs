use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use spectrometer::acquisition::{AcquisitionDriver, DriverOptions, FrameSlot};

use super::session::{self, SessionOptions};

/// Acquire from a real sensor board
pub fn run(config_path: Option<PathBuf>, port: Option<String>, options: SessionOptions) -> Result<()> {
    let config = super::open_store(config_path.as_deref())?;
    let port = port.unwrap_or_else(|| config.snapshot().settings.serial_port.clone());

    let frames = Arc::new(FrameSlot::new());
    let driver = AcquisitionDriver::connect(
        &port,
        Arc::clone(&config),
        Arc::clone(&frames),
        DriverOptions::default(),
    )
    .with_context(|| format!("Failed to connect to {}", port))?;
    info!("Connected to {}", port);

    if config.snapshot().settings.serial_port != port {
        config.update(|settings| settings.serial_port = port.clone());
    }

    session::run(driver, config, frames, options)
}
