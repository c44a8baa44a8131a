use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use spectrometer::config::ConfigStore;
use spectrometer::matching::MatchMethod;

mod acquire;
mod config;
mod demo;
mod fit;
mod matches;
mod ports;
mod report;
mod session;
mod timing;

/// Default settings file, relative to the working directory.
const DEFAULT_SETTINGS_FILE: &str = "spectrometer.toml";

/// spectrometer - Linear CCD spectrometer front end
#[derive(Parser)]
#[command(name = "spectrometer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Settings file (TOML); created with defaults if missing
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Similarity metric selection.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MethodArg {
    /// One minus squared residual relative to the reference energy
    SquaresSum,
    /// Like squares-sum, ignoring sample intensity above the reference
    SquaresSumSat,
    /// Dot product relative to the sample energy
    Multiply,
}

impl From<MethodArg> for MatchMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::SquaresSum => MatchMethod::SquaresSum,
            MethodArg::SquaresSumSat => MatchMethod::SquaresSumSat,
            MethodArg::Multiply => MatchMethod::Multiply,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List available serial ports
    Ports,

    /// Acquire frames from a sensor board
    Acquire {
        /// Serial port (defaults to the last successful port in the settings)
        #[arg(short, long)]
        port: Option<String>,

        /// Stop after this many processed frames (runs until Ctrl-C otherwise)
        #[arg(short = 'n', long)]
        frames: Option<u64>,

        /// Directory of LIBS-<element>.json reference files
        #[arg(short, long, value_name = "DIR")]
        library: Option<PathBuf>,

        /// Save the last signal as a .spect capture into this directory
        #[arg(short, long, value_name = "DIR")]
        save_dir: Option<PathBuf>,

        /// Use the first processed frame as the dark frame
        #[arg(long)]
        dark: bool,
    },

    /// Run the acquisition pipeline against a simulated sensor
    Demo {
        /// Number of processed frames
        #[arg(short = 'n', long, default_value = "5")]
        frames: u64,

        /// Directory of LIBS-<element>.json reference files
        #[arg(short, long, value_name = "DIR")]
        library: Option<PathBuf>,

        /// Save the last signal as a .spect capture into this directory
        #[arg(short, long, value_name = "DIR")]
        save_dir: Option<PathBuf>,
    },

    /// Fit the pixel-to-wavelength map from known lines
    Fit {
        /// CSV file of `pixel,wavelength` rows
        #[arg(value_name = "POINTS", required_unless_present = "reset")]
        points: Option<PathBuf>,

        /// Polynomial order (1-3)
        #[arg(short, long, default_value = "3")]
        order: usize,

        /// Write the fitted map into the settings file
        #[arg(long)]
        apply: bool,

        /// Reset the map to the identity instead of fitting
        #[arg(long, conflicts_with = "apply")]
        reset: bool,
    },

    /// Score a capture file against other captures and reference lines
    Match {
        /// Capture file (.spect)
        #[arg(value_name = "CAPTURE")]
        capture: PathBuf,

        /// Directory of LIBS-<element>.json reference files
        #[arg(short, long, value_name = "DIR")]
        library: Option<PathBuf>,

        /// Directory of .spect captures to compare against
        #[arg(short, long, value_name = "DIR")]
        captures: Option<PathBuf>,

        /// Similarity metric (defaults to the settings value)
        #[arg(short, long, value_enum)]
        method: Option<MethodArg>,

        /// Number of results to show
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Set sensor timing using display units
    Timing {
        /// Shift-gate period
        #[arg(long)]
        sh: Option<u64>,

        /// Integration-clear-gate period
        #[arg(long)]
        icg: Option<u64>,

        /// Trigger delay
        #[arg(long, allow_negative_numbers = true)]
        delay: Option<i64>,
    },

    /// Show the effective settings
    Config,
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Open the settings store at `path` or the default location.
fn open_store(path: Option<&Path>) -> Result<Arc<ConfigStore>> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_FILE));
    let store = ConfigStore::open(path)
        .with_context(|| format!("Failed to open settings file {}", path.display()))?;
    Ok(Arc::new(store))
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = cli.config;
    match cli.command {
        Commands::Ports => ports::run(),
        Commands::Acquire {
            port,
            frames,
            library,
            save_dir,
            dark,
        } => acquire::run(
            config,
            port,
            session::SessionOptions {
                frames,
                library,
                save_dir,
                dark,
            },
        ),
        Commands::Demo {
            frames,
            library,
            save_dir,
        } => demo::run(
            config,
            session::SessionOptions {
                frames: Some(frames),
                library,
                save_dir,
                dark: false,
            },
        ),
        Commands::Fit {
            points,
            order,
            apply,
            reset,
        } => fit::run(config, points, order, apply, reset),
        Commands::Match {
            capture,
            library,
            captures,
            method,
            top,
        } => matches::run(config, capture, library, captures, method.map(MatchMethod::from), top),
        Commands::Timing { sh, icg, delay } => timing::run(config, sh, icg, delay),
        Commands::Config => config::run(config),
    }
}
