use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::warn;

use super::error::PersistError;
use super::spectrum::CapturedSpectrum;

/// File extension of capture files.
pub const CAPTURE_FILE_EXTENSION: &str = "spect";

/// Write `capture` as JSON to `path`.
pub fn save_capture(capture: &CapturedSpectrum, path: &Path) -> Result<(), PersistError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, capture)?;
    writer.flush()?;
    Ok(())
}

/// Read a capture file. Loaded captures are never temporary.
pub fn load_capture(path: &Path) -> Result<CapturedSpectrum, PersistError> {
    let reader = BufReader::new(File::open(path)?);
    let capture: CapturedSpectrum = serde_json::from_reader(reader)?;
    if capture.wavelengths().len() != capture.intensities().len() {
        return Err(PersistError::LengthMismatch {
            path: path.to_path_buf(),
            wavelengths: capture.wavelengths().len(),
            intensities: capture.intensities().len(),
        });
    }
    Ok(capture)
}

/// Load every `*.spect` file in `dir`, sorted by file name.
///
/// Files that fail to load are skipped with a warning.
pub fn load_captures_in(dir: &Path) -> Result<Vec<CapturedSpectrum>, PersistError> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == CAPTURE_FILE_EXTENSION))
        .collect();
    paths.sort();

    let mut captures = Vec::with_capacity(paths.len());
    for path in paths {
        match load_capture(&path) {
            Ok(capture) => captures.push(capture),
            Err(e) => warn!("Skipping capture file {}: {}", path.display(), e),
        }
    }
    Ok(captures)
}
