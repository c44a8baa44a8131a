//! `config` subcommand: print the effective settings.
//!
//! The settings file is plain TOML and is picked up while acquiring, so it
//! can be edited by hand:
//!
//! ```toml
//! # spectrometer.toml
//! serial_port = "/dev/ttyACM0"
//! resample_resolution = 1024
//! match_method = "SquaresSumSat"
//!
//! [lambda_map]
//! coefficients = [450.0, 0.2, 0.0, 0.0]
//!
//! [trigger]
//! enabled = true
//! auto_capture = true
//! auto_clear = true
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Print the settings file
pub fn run(config_path: Option<PathBuf>) -> Result<()> {
    let config = super::open_store(config_path.as_deref())?;
    let text = config
        .snapshot()
        .settings
        .to_toml_string()
        .context("Failed to serialize settings")?;

    if let Some(path) = config.path() {
        println!("# {}", path.display());
    }
    print!("{}", text);
    Ok(())
}
