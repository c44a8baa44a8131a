use std::io::{Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, FlowControl, SerialPort};

use super::error::AcquisitionError;

/// Baud rate of the sensor board.
pub const DEFAULT_BAUD_RATE: u32 = 500_000;

/// Read timeout of the serial link. Also bounds how long the driver takes
/// to notice a stop request while waiting for data.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// A byte stream to the sensor board.
///
/// Reads must time out (returning [`std::io::ErrorKind::TimedOut`] or
/// `WouldBlock`) rather than block forever; the driver relies on that to
/// observe stop requests.
pub trait DeviceLink: Read + Write + Send {
    /// Discard any bytes buffered on the input side.
    fn clear_input(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl DeviceLink for Box<dyn SerialPort> {
    fn clear_input(&mut self) -> std::io::Result<()> {
        self.clear(ClearBuffer::Input).map_err(std::io::Error::from)
    }
}

/// Open a serial port configured for the sensor board.
pub fn open_serial(
    port: &str,
    baud_rate: u32,
    read_timeout: Duration,
) -> Result<Box<dyn SerialPort>, AcquisitionError> {
    serialport::new(port, baud_rate)
        .timeout(read_timeout)
        .flow_control(FlowControl::None)
        .open()
        .map_err(|source| AcquisitionError::Open {
            port: port.to_string(),
            source,
        })
}
