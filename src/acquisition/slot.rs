use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use crate::pipeline::{CaptureWindow, RawFrame};

/// Single-frame mailbox between the driver and the display side.
///
/// The driver publishes into a reused buffer and raises the ready flag;
/// the consumer copies the buffer out and lowers the flag. An unconsumed
/// frame is overwritten by the next one.
#[derive(Debug)]
pub struct FrameSlot {
    latest: Mutex<RawFrame>,
    window: Mutex<CaptureWindow>,
    ready: AtomicBool,
    published: AtomicU64,
}

impl Default for FrameSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSlot {
    /// Empty slot.
    pub fn new() -> Self {
        Self {
            latest: Mutex::new(RawFrame::new(Vec::new())),
            window: Mutex::new(CaptureWindow::instant(Instant::now())),
            ready: AtomicBool::new(false),
            published: AtomicU64::new(0),
        }
    }

    /// Record the exposure window of the capture in progress.
    pub fn begin_capture(&self, window: CaptureWindow) {
        *self.window.lock().unwrap_or_else(PoisonError::into_inner) = window;
    }

    /// Exposure window of the capture in progress.
    pub fn window(&self) -> CaptureWindow {
        *self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish a finished frame of the capture in progress.
    ///
    /// The frame keeps the window it was exposed in, even after the next
    /// capture begins.
    pub fn publish(&self, samples: &[u16]) {
        let window = self.window();
        {
            let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
            latest.samples.clear();
            latest.samples.extend_from_slice(samples);
            latest.window = window;
        }
        self.published.fetch_add(1, Ordering::Relaxed);
        self.ready.store(true, Ordering::Release);
    }

    /// Take the newest frame if one arrived since the last call.
    pub fn take(&self) -> Option<RawFrame> {
        if !self.ready.swap(false, Ordering::AcqRel) {
            return None;
        }
        Some(
            self.latest
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        )
    }

    /// Whether an unconsumed frame is waiting.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Frames published since creation.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
