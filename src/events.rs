//! Notifications for the display side.

use std::sync::Arc;

use crate::matching::MatchOutcome;
use crate::pipeline::ResampledSignal;

/// Something the display should reflect.
#[derive(Debug, Clone)]
pub enum DisplayEvent {
    /// A new processed signal is available
    Signal(Arc<ResampledSignal>),
    /// Capture progress in `[0, 1]`
    Progress(f64),
    /// The capture list changed
    CapturesChanged,
    /// One match item was scored
    MatchScored(MatchOutcome),
    /// A match run ended
    MatchFinished {
        /// Run number
        run: u64,
        /// Items scored
        scored: usize,
        /// Whether the run was cancelled before completing
        cancelled: bool,
    },
}
