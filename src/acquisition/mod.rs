//! # Acquisition
//!
//! Serial-link driver for a linear CCD sensor board.
//!
//! ## Wire Protocol
//!
//! Every command is 12 bytes:
//!
//! | Bytes  | Content                          |
//! |--------|----------------------------------|
//! | 0–1    | opcode `45 52`                   |
//! | 2–5    | parameter A, big-endian `u32`    |
//! | 6–9    | parameter B, big-endian `u32`    |
//! | 10–11  | mode selector, little-endian `u16` |
//!
//! A frame response is `pixel_count` little-endian `u16` ADC counts.
//!
//! ## Threading
//!
//! [`AcquisitionDriver`] owns the link on a dedicated thread that runs
//! arm → start → read cycles until stopped. Each finished frame is copied
//! into a [`FrameSlot`], which the display side polls; the slot always
//! holds the newest frame and older unconsumed frames are overwritten.

mod driver;
mod error;
mod link;
mod protocol;
mod simulated;
mod slot;

#[cfg(test)]
mod tests;

pub use driver::{AcquisitionDriver, DriverEvent, DriverOptions};
pub use error::AcquisitionError;
pub use link::{open_serial, DeviceLink, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};
pub use protocol::{
    decode_frame, Command, Mode, COMMAND_LEN, HANDSHAKE_COMMAND, HANDSHAKE_MAGIC, OPCODE,
};
pub use simulated::{SimulatedLine, SimulatedSensor};
pub use slot::FrameSlot;
