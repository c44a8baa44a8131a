/// Errors that can occur while talking to the sensor board
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    /// Serial port could not be opened
    #[error("Failed to open serial port {port}: {source}")]
    Open {
        /// Port name
        port: String,
        /// Underlying error
        #[source]
        source: serialport::Error,
    },

    /// I/O error on the link
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Device did not answer the handshake in time
    #[error("Handshake timed out after receiving {received} of {expected} bytes")]
    HandshakeTimeout {
        /// Bytes received
        received: usize,
        /// Bytes expected
        expected: usize,
    },

    /// Device answered with something other than the firmware signature
    #[error("Unexpected handshake response {0:02X?}")]
    BadMagic(Vec<u8>),

    /// Link closed before a full frame arrived
    #[error("Short read: got {received} of {expected} frame bytes")]
    ShortRead {
        /// Bytes received
        received: usize,
        /// Bytes expected
        expected: usize,
    },

    /// Frame payload has an odd byte count
    #[error("Frame payload of {0} bytes is not a whole number of samples")]
    OddPayload(usize),

    /// Command buffer is malformed
    #[error("Malformed command: {0}")]
    BadCommand(String),

    /// Worker thread could not be started
    #[error("Failed to spawn acquisition thread: {0}")]
    Spawn(String),

    /// Worker thread did not stop within the teardown bound
    #[error("Acquisition thread did not stop within {0:?}")]
    JoinTimeout(std::time::Duration),

    /// Worker thread failed
    #[error("Acquisition thread failed: {0}")]
    Worker(String),
}
