/// Errors from fitting a calibration polynomial
#[derive(Debug, thiserror::Error)]
pub enum FitError {
    /// Fewer points than coefficients
    #[error("Need at least {required} calibration points for this order, got {points}")]
    Underdetermined {
        /// Points available
        points: usize,
        /// Points required (order + 1)
        required: usize,
    },

    /// Points do not determine a unique polynomial (e.g. repeated pixels)
    #[error("Calibration points are degenerate; the fit is singular")]
    Singular,

    /// Order outside the supported range
    #[error("Unsupported polynomial order {0} (maximum is 3)")]
    UnsupportedOrder(usize),

    /// I/O error reading a point list
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}
