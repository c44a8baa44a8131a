//! # Spectrometer CLI
//!
//! Command-line front end for a serial-attached linear CCD spectrometer.
//!
//! ## Usage
//!
//! ```bash
//! # Acquire 10 frames and match them against a reference library
//! spectrometer acquire --port /dev/ttyACM0 --frames 10 --library ./libs
//!
//! # Same pipeline against a simulated sensor
//! spectrometer demo --frames 5
//!
//! # Fit the wavelength calibration from known lines
//! spectrometer fit lines.csv --apply
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
