use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use log::{debug, warn};
use uuid::Uuid;

use crate::capture::CapturedSpectrum;
use crate::events::DisplayEvent;
use crate::library::ElementLibrary;

use super::error::MatchError;
use super::method::{score_percent, MatchMethod};

/// What a score was computed against.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchTarget {
    /// A stored capture
    Capture {
        /// Capture identifier
        id: Uuid,
        /// Capture label at submission time
        name: String,
    },
    /// A reference emission line
    Reference {
        /// Element symbol
        element: String,
        /// Line name
        line: String,
    },
}

impl MatchTarget {
    /// Display label of the target.
    pub fn label(&self) -> &str {
        match self {
            MatchTarget::Capture { name, .. } => name,
            MatchTarget::Reference { line, .. } => line,
        }
    }
}

/// One scored item, posted as it is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Run that produced the score
    pub run: u64,
    /// What was scored
    pub target: MatchTarget,
    /// Score in percent, or why the item could not be scored
    pub percent: Result<f64, MatchError>,
}

/// Input of a match run. Everything is owned so the task shares nothing
/// mutable with the caller.
#[derive(Debug, Clone)]
pub struct MatchRequest {
    /// Measured wavelengths, the grid references are resampled onto
    pub wavelengths: Vec<f64>,
    /// Measured intensities
    pub intensities: Vec<f64>,
    /// Captures to compare against
    pub captures: Vec<Arc<CapturedSpectrum>>,
    /// Reference library
    pub library: Arc<ElementLibrary>,
    /// Similarity metric
    pub method: MatchMethod,
}

struct MatchTask {
    run: u64,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Owner of the single background match task.
pub struct MatchEngine {
    sink: Sender<DisplayEvent>,
    next_run: AtomicU64,
    current: Mutex<Option<MatchTask>>,
}

impl MatchEngine {
    /// Create an engine that posts results to `sink`.
    pub fn new(sink: Sender<DisplayEvent>) -> Self {
        Self {
            sink,
            next_run: AtomicU64::new(1),
            current: Mutex::new(None),
        }
    }

    /// Start a run, superseding any run in flight.
    ///
    /// The previous task is cancelled and joined before the new one starts.
    /// Returns the run number carried by every outcome of this run.
    pub fn submit(&self, request: MatchRequest) -> Result<u64, MatchError> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = current.take() {
            debug!("Superseding match run {}", previous.run);
            Self::stop(previous);
        }

        let run = self.next_run.fetch_add(1, Ordering::Relaxed);
        let cancel = Arc::new(AtomicBool::new(false));
        let task_cancel = Arc::clone(&cancel);
        let sink = self.sink.clone();

        let handle = thread::Builder::new()
            .name(format!("match-{run}"))
            .spawn(move || run_match(run, request, &task_cancel, &sink))
            .map_err(|e| MatchError::Spawn(e.to_string()))?;

        *current = Some(MatchTask {
            run,
            cancel,
            handle,
        });
        Ok(run)
    }

    /// Block until the current run, if any, has finished.
    ///
    /// Returns the run number that was waited on.
    pub fn wait(&self) -> Option<u64> {
        let task = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        let run = task.run;
        if task.handle.join().is_err() {
            warn!("Match run {} panicked", run);
        }
        Some(run)
    }

    /// Cancel and join the current run.
    pub fn cancel(&self) {
        if let Some(task) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            Self::stop(task);
        }
    }

    /// Whether a run is still executing.
    pub fn is_running(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    fn stop(task: MatchTask) {
        task.cancel.store(true, Ordering::Release);
        if task.handle.join().is_err() {
            warn!("Match run {} panicked", task.run);
        }
    }
}

impl Drop for MatchEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run_match(run: u64, request: MatchRequest, cancel: &AtomicBool, sink: &Sender<DisplayEvent>) {
    let cancelled = || cancel.load(Ordering::Acquire);
    let mut scored = 0usize;

    let post = |target: MatchTarget, percent: Result<f64, MatchError>| {
        if let Err(e) = &percent {
            debug!("Match run {}: {} not scored: {}", run, target.label(), e);
        }
        sink.send(DisplayEvent::MatchScored(MatchOutcome {
            run,
            target,
            percent,
        }))
        .is_ok()
    };

    for capture in &request.captures {
        if cancelled() {
            break;
        }
        let target = MatchTarget::Capture {
            id: capture.id(),
            name: capture.name().to_string(),
        };
        let percent = score_percent(&request.intensities, capture.intensities(), request.method);
        if !post(target, percent) {
            return;
        }
        scored += 1;
    }

    for element in request.library.elements() {
        if cancelled() {
            break;
        }
        for window in element.get_window(&request.wavelengths, None) {
            if cancelled() {
                break;
            }
            let target = MatchTarget::Reference {
                element: element.name.clone(),
                line: window.name.clone(),
            };
            let percent = score_percent(&request.intensities, &window.intensities, request.method);
            if !post(target, percent) {
                return;
            }
            scored += 1;
        }
    }

    let cancelled = cancelled();
    debug!(
        "Match run {} finished: {} scored{}",
        run,
        scored,
        if cancelled { " (cancelled)" } else { "" }
    );
    let _ = sink.send(DisplayEvent::MatchFinished {
        run,
        scored,
        cancelled,
    });
}
