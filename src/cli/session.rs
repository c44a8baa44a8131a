//! Tick loop shared by `acquire` and `demo`.

use anyhow::{bail, Context, Result};
use crossbeam_channel::{unbounded, Receiver};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use spectrometer::acquisition::{AcquisitionDriver, DriverEvent, FrameSlot};
use spectrometer::capture::{save_capture, CaptureStore, CapturedSpectrum, CAPTURE_FILE_EXTENSION};
use spectrometer::config::ConfigStore;
use spectrometer::events::DisplayEvent;
use spectrometer::library::ElementLibrary;
use spectrometer::matching::MatchOutcome;
use spectrometer::pipeline::{find_local_peak, ResampledSignal, DEFAULT_PEAK_REGION};
use spectrometer::trigger::{CaptureController, TickOutcome, TICK_INTERVAL};

use super::report;

/// Options common to live sessions.
pub struct SessionOptions {
    pub frames: Option<u64>,
    pub library: Option<PathBuf>,
    pub save_dir: Option<PathBuf>,
    pub dark: bool,
}

/// Results shown at the end of a session.
const TOP_MATCHES: usize = 10;

pub fn run(
    driver: AcquisitionDriver,
    config: Arc<ConfigStore>,
    frames: Arc<FrameSlot>,
    options: SessionOptions,
) -> Result<()> {
    let (tx, display) = unbounded();
    let captures = Arc::new(CaptureStore::new());
    let controller = CaptureController::new(Arc::clone(&config), frames, captures, tx);
    controller.set_library(Arc::new(load_library(&config, options.library.as_deref())?));

    let driver_events = driver.events();
    let mut processed = 0u64;
    let mut dark_pending = options.dark;
    let mut scores = Vec::new();
    let mut current_run = None;

    loop {
        if let Some(fault) = take_fault(&driver_events) {
            let _ = driver.disconnect();
            bail!("Device fault: {}", fault);
        }

        if let TickOutcome::Published { match_run, .. } = controller.tick() {
            processed += 1;
            if let Some(run) = match_run {
                current_run = Some(run);
                scores.clear();
            }
        }
        drain_display(&display, current_run, &mut scores);

        if dark_pending && controller.capture_dark_frame() {
            info!("Dark frame captured");
            dark_pending = false;
        }
        if options.frames.is_some_and(|n| processed >= n) {
            break;
        }
        thread::sleep(TICK_INTERVAL);
    }

    if let Some(signal) = controller.last_signal() {
        if let Some(dir) = &options.save_dir {
            let path = save_signal(&signal, dir)?;
            println!("Saved {}", path.display());
        }

        if let Some(run) = controller.start_match() {
            current_run = Some(run);
            scores.clear();
        }
        controller.matcher().wait();
        drain_display(&display, current_run, &mut scores);
    }

    if !scores.is_empty() {
        println!("{}", report::format_matches(&scores, TOP_MATCHES));
    }

    let published = driver.disconnect().context("Failed to stop acquisition")?;
    info!("Device published {} frames", published);
    config.save().context("Failed to save settings")?;
    Ok(())
}

fn load_library(config: &ConfigStore, dir: Option<&Path>) -> Result<ElementLibrary> {
    match dir {
        Some(dir) => ElementLibrary::load_dir(dir)
            .with_context(|| format!("Failed to load reference library from {}", dir.display())),
        None => {
            let dir = config.snapshot().settings.library.directory.clone();
            Ok(ElementLibrary::load_dir(&dir).unwrap_or_else(|e| {
                warn!("No reference library in {}: {}", dir.display(), e);
                ElementLibrary::default()
            }))
        }
    }
}

fn take_fault(events: &Receiver<DriverEvent>) -> Option<String> {
    events.try_iter().find_map(|event| match event {
        DriverEvent::Fault(msg) => Some(msg),
        DriverEvent::Stopped { frames } => Some(format!("acquisition stopped after {frames} frames")),
        DriverEvent::FramePublished { .. } => None,
    })
}

fn drain_display(
    display: &Receiver<DisplayEvent>,
    current_run: Option<u64>,
    scores: &mut Vec<MatchOutcome>,
) {
    for event in display.try_iter() {
        match event {
            DisplayEvent::Signal(signal) => print_signal(&signal),
            DisplayEvent::Progress(p) => debug!("Capture progress {:.0}%", p * 100.0),
            DisplayEvent::CapturesChanged => debug!("Capture list changed"),
            DisplayEvent::MatchScored(outcome) if Some(outcome.run) == current_run => {
                scores.push(outcome)
            }
            DisplayEvent::MatchScored(_) => {}
            DisplayEvent::MatchFinished {
                run,
                scored,
                cancelled,
            } => debug!("Match run {} done: {} items, cancelled {}", run, scored, cancelled),
        }
    }
}

fn print_signal(signal: &ResampledSignal) {
    let brightest = signal
        .intensities
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        });
    let Some((index, _)) = brightest else {
        println!("empty signal");
        return;
    };

    match find_local_peak(
        &signal.wavelengths,
        &signal.intensities,
        index,
        DEFAULT_PEAK_REGION,
    ) {
        Some(peak) => println!(
            "{} bins, maximum at {:.2} nm ({:.4})",
            signal.len(),
            peak.wavelength,
            peak.intensity
        ),
        None => println!("{} bins, no signal", signal.len()),
    }
}

fn save_signal(signal: &ResampledSignal, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let capture = CapturedSpectrum::from_signal(signal, false);
    let file_name = format!(
        "{}.{}",
        capture.captured_at().format("%Y%m%d-%H%M%S"),
        CAPTURE_FILE_EXTENSION
    );
    let path = dir.join(file_name);
    save_capture(&capture, &path)
        .with_context(|| format!("Failed to save capture {}", path.display()))?;
    Ok(path)
}
