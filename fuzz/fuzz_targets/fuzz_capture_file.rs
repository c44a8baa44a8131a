#![no_main]

use libfuzzer_sys::fuzz_target;
use spectrometer::capture::CapturedSpectrum;
use spectrometer::library::ReferenceElement;

fuzz_target!(|data: &[u8]| {
    // Capture and library files come from disk and may be hand-edited
    if let Ok(capture) = serde_json::from_slice::<CapturedSpectrum>(data) {
        let _ = capture.len();
    }

    if let Ok(element) = serde_json::from_slice::<ReferenceElement>(data) {
        if element.validate(std::path::Path::new("fuzz")).is_ok() {
            let targets: Vec<f64> = element.wavelengths.iter().step_by(3).copied().collect();
            let _ = element.get_window(&targets, None);
        }
    }
});
