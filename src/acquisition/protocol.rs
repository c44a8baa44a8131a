//! Command encoding and frame decoding.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::config::DeviceTiming;

use super::error::AcquisitionError;

/// Opcode prefix of every command.
pub const OPCODE: [u8; 2] = [0x45, 0x52];

/// Length of an encoded command.
pub const COMMAND_LEN: usize = 12;

/// Firmware signature returned in response to [`HANDSHAKE_COMMAND`].
pub const HANDSHAKE_MAGIC: &[u8; 10] = b"[g3gg0.de]";

/// Identification request sent once after opening the link.
pub const HANDSHAKE_COMMAND: [u8; COMMAND_LEN] = Command {
    param_a: 0,
    param_b: 0xFF00_0100,
    mode: Mode::Arm,
}
.encode();

/// Mode selector carried in the last two command bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Begin integration and stream a frame
    Start,
    /// Prepare the next capture (also used for identification)
    Arm,
}

impl Mode {
    const fn code(self) -> u16 {
        match self {
            Mode::Start => 0,
            Mode::Arm => 2,
        }
    }

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Mode::Start),
            2 => Some(Mode::Arm),
            _ => None,
        }
    }
}

/// A decoded device command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// First parameter
    pub param_a: u32,
    /// Second parameter
    pub param_b: u32,
    /// Mode selector
    pub mode: Mode,
}

/// Byte 6 of an arm command: wait for the external trigger.
const ARM_WAIT_FOR_TRIGGER: u32 = 0;
/// Byte 6 of an arm command: free-running capture.
const ARM_FREE_RUN: u32 = 2;

impl Command {
    /// Arm the next capture.
    ///
    /// A carries the trigger delay; the top byte of B selects trigger or
    /// free-run mode.
    pub fn arm(timing: &DeviceTiming, trigger_enabled: bool) -> Self {
        let mode = if trigger_enabled {
            ARM_WAIT_FOR_TRIGGER
        } else {
            ARM_FREE_RUN
        };
        Self {
            param_a: timing.trigger_delay,
            param_b: mode << 24,
            mode: Mode::Arm,
        }
    }

    /// Start a capture with the given SH and ICG periods.
    pub fn start(timing: &DeviceTiming) -> Self {
        Self {
            param_a: timing.sh_period,
            param_b: timing.icg_period,
            mode: Mode::Start,
        }
    }

    /// Whether this arm command selects external trigger mode.
    pub fn waits_for_trigger(&self) -> bool {
        self.mode == Mode::Arm && self.param_b >> 24 == ARM_WAIT_FOR_TRIGGER
    }

    /// Serialize to wire format.
    pub const fn encode(&self) -> [u8; COMMAND_LEN] {
        let a = self.param_a.to_be_bytes();
        let b = self.param_b.to_be_bytes();
        let m = self.mode.code().to_le_bytes();
        [
            OPCODE[0], OPCODE[1], a[0], a[1], a[2], a[3], b[0], b[1], b[2], b[3], m[0], m[1],
        ]
    }

    /// Parse from wire format.
    pub fn decode(bytes: &[u8]) -> Result<Self, AcquisitionError> {
        if bytes.len() != COMMAND_LEN {
            return Err(AcquisitionError::BadCommand(format!(
                "expected {} bytes, got {}",
                COMMAND_LEN,
                bytes.len()
            )));
        }
        if bytes[..2] != OPCODE {
            return Err(AcquisitionError::BadCommand(format!(
                "bad opcode {:02X?}",
                &bytes[..2]
            )));
        }
        let code = LittleEndian::read_u16(&bytes[10..12]);
        let mode = Mode::from_code(code)
            .ok_or_else(|| AcquisitionError::BadCommand(format!("unknown mode {}", code)))?;
        Ok(Self {
            param_a: BigEndian::read_u32(&bytes[2..6]),
            param_b: BigEndian::read_u32(&bytes[6..10]),
            mode,
        })
    }
}

/// Decode a frame payload of little-endian `u16` samples into `out`.
///
/// `out` is resized to the sample count and reused across frames.
pub fn decode_frame(payload: &[u8], out: &mut Vec<u16>) -> Result<(), AcquisitionError> {
    if payload.len() % 2 != 0 {
        return Err(AcquisitionError::OddPayload(payload.len()));
    }
    out.resize(payload.len() / 2, 0);
    LittleEndian::read_u16_into(payload, out);
    Ok(())
}
