/// Errors from scoring or scheduling a match
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    /// Sample and reference are on different grids
    #[error("Length mismatch: sample has {sample} points, reference has {reference}")]
    LengthMismatch {
        /// Sample length
        sample: usize,
        /// Reference length
        reference: usize,
    },

    /// Method name not recognized
    #[error("Unknown match method '{0}' (expected SquaresSum, SquaresSumSat or Multiply)")]
    UnknownMethod(String),

    /// Background task could not be started
    #[error("Failed to spawn match task: {0}")]
    Spawn(String),
}
