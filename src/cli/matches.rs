use anyhow::{Context, Result};
use crossbeam_channel::unbounded;
use std::path::PathBuf;
use std::sync::Arc;

use spectrometer::capture::{load_capture, load_captures_in};
use spectrometer::events::DisplayEvent;
use spectrometer::library::ElementLibrary;
use spectrometer::matching::{MatchEngine, MatchMethod, MatchRequest};

use super::report;

/// Score one capture file
pub fn run(
    config_path: Option<PathBuf>,
    capture: PathBuf,
    library: Option<PathBuf>,
    captures: Option<PathBuf>,
    method: Option<MatchMethod>,
    top: usize,
) -> Result<()> {
    let config = super::open_store(config_path.as_deref())?;
    let settings = config.snapshot().settings.clone();

    let sample = load_capture(&capture)
        .with_context(|| format!("Failed to load capture {}", capture.display()))?;

    let library_dir = library.unwrap_or_else(|| settings.library.directory.clone());
    let library = ElementLibrary::load_dir(&library_dir).with_context(|| {
        format!("Failed to load reference library from {}", library_dir.display())
    })?;

    let others = match captures {
        Some(dir) => load_captures_in(&dir)
            .with_context(|| format!("Failed to read captures from {}", dir.display()))?,
        None => Vec::new(),
    };

    let (tx, rx) = unbounded();
    let engine = MatchEngine::new(tx);
    let method = method.unwrap_or(settings.match_method);
    let run = engine.submit(MatchRequest {
        wavelengths: sample.wavelengths().to_vec(),
        intensities: sample.intensities().to_vec(),
        captures: others.into_iter().map(Arc::new).collect(),
        library: Arc::new(library),
        method,
    })?;
    engine.wait();

    let scores: Vec<_> = rx
        .try_iter()
        .filter_map(|event| match event {
            DisplayEvent::MatchScored(outcome) if outcome.run == run => Some(outcome),
            _ => None,
        })
        .collect();

    println!("{} ({}) using {}", sample.name(), capture.display(), method);
    println!("{}", report::format_matches(&scores, top));
    Ok(())
}
