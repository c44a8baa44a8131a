use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::acquisition::FrameSlot;
use crate::capture::{CaptureStore, CapturedSpectrum};
use crate::config::ConfigStore;
use crate::events::DisplayEvent;
use crate::library::ElementLibrary;
use crate::matching::{MatchEngine, MatchRequest};
use crate::pipeline::{correct, resample, RawFrame, ResampledSignal};

/// Display refresh period.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Phase of the processing tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickState {
    /// Nothing new to process
    #[default]
    Idle,
    /// Correcting and resampling a frame
    Resampling,
    /// A signal was published by the last tick
    Published,
}

/// What a call to [`CaptureController::tick`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The previous tick was still running
    Overlapped,
    /// No new frame and no settings change
    Unchanged,
    /// A signal was published
    Published {
        /// Temporary capture stored by auto-capture
        captured: Option<Uuid>,
        /// Match run started by auto-match
        match_run: Option<u64>,
    },
}

#[derive(Debug, Default)]
struct TickData {
    state: TickState,
    frame: Option<Arc<RawFrame>>,
    signal: Option<Arc<ResampledSignal>>,
    seen_version: Option<u64>,
    progress: Option<f64>,
}

/// Clears the busy flag when a tick ends, including by panic.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Connects the frame slot, settings, captures and matching engine.
pub struct CaptureController {
    config: Arc<ConfigStore>,
    frames: Arc<FrameSlot>,
    captures: Arc<CaptureStore>,
    library: RwLock<Arc<ElementLibrary>>,
    matcher: MatchEngine,
    events: Sender<DisplayEvent>,
    busy: AtomicBool,
    data: Mutex<TickData>,
}

impl CaptureController {
    /// Create a controller posting to `events`.
    pub fn new(
        config: Arc<ConfigStore>,
        frames: Arc<FrameSlot>,
        captures: Arc<CaptureStore>,
        events: Sender<DisplayEvent>,
    ) -> Self {
        Self {
            config,
            frames,
            captures,
            library: RwLock::new(Arc::new(ElementLibrary::default())),
            matcher: MatchEngine::new(events.clone()),
            events,
            busy: AtomicBool::new(false),
            data: Mutex::new(TickData::default()),
        }
    }

    fn data(&self) -> MutexGuard<'_, TickData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the reference library used by matching.
    pub fn set_library(&self, library: Arc<ElementLibrary>) {
        info!("Reference library replaced ({} elements)", library.len());
        *self.library.write().unwrap_or_else(PoisonError::into_inner) = library;
    }

    /// Current reference library.
    pub fn library(&self) -> Arc<ElementLibrary> {
        Arc::clone(&self.library.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// The matching engine.
    pub fn matcher(&self) -> &MatchEngine {
        &self.matcher
    }

    /// The capture store.
    pub fn captures(&self) -> &Arc<CaptureStore> {
        &self.captures
    }

    /// Phase of the last tick.
    pub fn state(&self) -> TickState {
        self.data().state
    }

    /// Signal published by the last processing tick.
    pub fn last_signal(&self) -> Option<Arc<ResampledSignal>> {
        self.data().signal.clone()
    }

    /// Run one tick now.
    pub fn tick(&self) -> TickOutcome {
        self.tick_at(Instant::now())
    }

    /// Run one tick at `now`.
    pub fn tick_at(&self, now: Instant) -> TickOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return TickOutcome::Overlapped;
        }
        let _busy = BusyGuard(&self.busy);

        self.config.check_reload_at(now);
        let mut snapshot = self.config.snapshot();
        let mut data = self.data();

        let fresh = self.frames.take();
        let settings_changed = data.seen_version != Some(snapshot.version);

        let progress = if snapshot.settings.trigger.enabled {
            0.0
        } else {
            self.frames.window().progress(now)
        };
        if data.progress != Some(progress) {
            data.progress = Some(progress);
            let _ = self.events.send(DisplayEvent::Progress(progress));
        }

        if fresh.is_none() && !settings_changed {
            if data.state == TickState::Published {
                data.state = TickState::Idle;
            }
            return TickOutcome::Unchanged;
        }
        if let Some(frame) = fresh {
            data.frame = Some(Arc::new(frame));
        }
        let Some(frame) = data.frame.clone() else {
            data.seen_version = Some(snapshot.version);
            return TickOutcome::Unchanged;
        };
        data.state = TickState::Resampling;

        let pixels = frame.len();
        if snapshot.settings.dark_frame.len() != pixels {
            debug!("Dark frame reset to {} pixels", pixels);
            self.config
                .update(|settings| settings.dark_frame = vec![0; pixels]);
            snapshot = self.config.snapshot();
        }

        let settings = &snapshot.settings;
        let corrected = correct(&frame.samples, settings);
        let signal = Arc::new(resample(&corrected, settings.resample_resolution));

        let mut captured = None;
        let mut match_run = None;
        if settings.trigger.enabled {
            if settings.trigger.auto_capture {
                if settings.trigger.auto_clear {
                    let purged = self.captures.purge_temporary();
                    debug!("Auto-clear removed {} captures", purged);
                }
                captured = Some(
                    self.captures
                        .add(CapturedSpectrum::from_signal(&signal, true)),
                );
                let _ = self.events.send(DisplayEvent::CapturesChanged);
            }
            if settings.trigger.auto_match {
                match_run = self.submit_match(&signal, settings.match_method);
            }
        }

        data.signal = Some(Arc::clone(&signal));
        data.seen_version = Some(snapshot.version);
        data.state = TickState::Published;
        let _ = self.events.send(DisplayEvent::Signal(signal));

        TickOutcome::Published {
            captured,
            match_run,
        }
    }

    fn submit_match(
        &self,
        signal: &ResampledSignal,
        method: crate::matching::MatchMethod,
    ) -> Option<u64> {
        let request = MatchRequest {
            wavelengths: signal.wavelengths.clone(),
            intensities: signal.intensities.clone(),
            captures: self.captures.snapshot(),
            library: self.library(),
            method,
        };
        match self.matcher.submit(request) {
            Ok(run) => Some(run),
            Err(e) => {
                warn!("Could not start match: {}", e);
                None
            }
        }
    }

    /// Store the last published signal as a persistent capture and match it.
    pub fn capture_now(&self) -> Option<Uuid> {
        let signal = self.last_signal()?;
        let id = self
            .captures
            .add(CapturedSpectrum::from_signal(&signal, false));
        let _ = self.events.send(DisplayEvent::CapturesChanged);
        let method = self.config.snapshot().settings.match_method;
        self.submit_match(&signal, method);
        Some(id)
    }

    /// Match the last published signal against captures and references.
    pub fn start_match(&self) -> Option<u64> {
        let signal = self.last_signal()?;
        let method = self.config.snapshot().settings.match_method;
        self.submit_match(&signal, method)
    }

    /// Use the newest raw frame as the dark frame.
    ///
    /// Returns false if no frame has been received yet.
    pub fn capture_dark_frame(&self) -> bool {
        let Some(samples) = self.data().frame.as_ref().map(|f| f.samples.clone()) else {
            return false;
        };
        info!("Dark frame captured ({} pixels)", samples.len());
        self.config.update(|settings| settings.dark_frame = samples);
        true
    }

    /// Reset the dark frame to zeros.
    pub fn clear_dark_frame(&self) {
        self.config.update(|settings| {
            let len = settings.dark_frame.len();
            settings.dark_frame = vec![0; len];
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_overlapping_tick_returns_immediately() {
        let (tx, _rx) = unbounded();
        let controller = CaptureController::new(
            Arc::new(ConfigStore::in_memory(Default::default())),
            Arc::new(FrameSlot::new()),
            Arc::new(CaptureStore::new()),
            tx,
        );
        controller.frames.publish(&[1, 2, 3]);

        controller.busy.store(true, Ordering::Release);
        assert_eq!(controller.tick(), TickOutcome::Overlapped);
        // The pending frame was not consumed
        assert!(controller.frames.is_ready());

        controller.busy.store(false, Ordering::Release);
        assert!(matches!(controller.tick(), TickOutcome::Published { .. }));
        assert!(!controller.busy.load(Ordering::Acquire));
    }
}
