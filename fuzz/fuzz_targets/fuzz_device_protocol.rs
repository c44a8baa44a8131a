#![no_main]

use libfuzzer_sys::fuzz_target;
use spectrometer::acquisition::{decode_frame, Command, COMMAND_LEN};

fuzz_target!(|data: &[u8]| {
    // Device bytes must never panic the decoder, whatever their length
    let mut samples = Vec::new();
    if decode_frame(data, &mut samples).is_ok() {
        assert_eq!(samples.len() * 2, data.len());
    }

    for chunk in data.chunks(COMMAND_LEN) {
        if let Ok(command) = Command::decode(chunk) {
            // Anything that decodes must encode back to the same bytes
            assert_eq!(&command.encode()[..], chunk);
        }
    }
});
