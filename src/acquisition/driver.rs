use std::io::{self, ErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};

use crate::config::ConfigStore;
use crate::pipeline::CaptureWindow;

use super::error::AcquisitionError;
use super::link::{open_serial, DeviceLink, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};
use super::protocol::{decode_frame, Command, HANDSHAKE_COMMAND, HANDSHAKE_MAGIC};
use super::slot::FrameSlot;

/// Link timing parameters.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Serial baud rate
    pub baud_rate: u32,
    /// Per-read timeout of the link
    pub read_timeout: Duration,
    /// Input must be silent this long before the handshake is sent
    pub drain_quiet: Duration,
    /// Give up connecting if the input never falls silent within this time
    pub drain_limit: Duration,
    /// Pause between writing the handshake and reading the reply
    pub handshake_settle: Duration,
    /// Deadline for the full handshake reply
    pub handshake_timeout: Duration,
    /// Bound on waiting for the worker thread at teardown
    pub join_timeout: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            drain_quiet: Duration::from_millis(200),
            drain_limit: Duration::from_secs(2),
            handshake_settle: Duration::from_millis(100),
            handshake_timeout: Duration::from_millis(1000),
            join_timeout: Duration::from_secs(2),
        }
    }
}

/// Notifications from the worker thread.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    /// A frame was published to the slot
    FramePublished {
        /// Frames published so far
        count: u64,
    },
    /// The link failed; the worker stops after sending this
    Fault(String),
    /// The worker exited
    Stopped {
        /// Frames published in total
        frames: u64,
    },
}

/// Handle to a running acquisition thread.
///
/// # Drop Safety
///
/// Dropping the driver without calling [`disconnect`](Self::disconnect)
/// stops the worker the same way and logs a warning if it does not exit in
/// time.
pub struct AcquisitionDriver {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<Result<u64, AcquisitionError>>>,
    done: Receiver<()>,
    events: Receiver<DriverEvent>,
    join_timeout: Duration,
}

impl AcquisitionDriver {
    /// Open `port`, verify the firmware signature and start acquiring.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be opened, the handshake fails,
    /// or the worker thread cannot be spawned.
    pub fn connect(
        port: &str,
        config: Arc<ConfigStore>,
        frames: Arc<FrameSlot>,
        options: DriverOptions,
    ) -> Result<Self, AcquisitionError> {
        info!("Opening {} at {} baud", port, options.baud_rate);
        let link = open_serial(port, options.baud_rate, options.read_timeout)?;
        Self::connect_with(link, config, frames, options)
    }

    /// Start acquiring over an already-open link.
    ///
    /// The handshake runs on the calling thread; acquisition runs on a
    /// thread named `"acquisition"`.
    pub fn connect_with<L>(
        mut link: L,
        config: Arc<ConfigStore>,
        frames: Arc<FrameSlot>,
        options: DriverOptions,
    ) -> Result<Self, AcquisitionError>
    where
        L: DeviceLink + 'static,
    {
        handshake(&mut link, &options)?;
        info!("Sensor board identified");

        let stop = Arc::new(AtomicBool::new(false));
        let (event_tx, events) = unbounded();
        let (done_tx, done) = bounded::<()>(0);

        let worker_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("acquisition".to_string())
            .spawn(move || {
                // Dropped on exit, including unwinding; signals completion
                let _done = done_tx;
                let result = acquire_loop(&mut link, &config, &frames, &worker_stop, &event_tx);
                let published = frames.published();
                if let Err(e) = &result {
                    warn!("Acquisition stopped: {}", e);
                    let _ = event_tx.send(DriverEvent::Fault(e.to_string()));
                }
                let _ = event_tx.send(DriverEvent::Stopped { frames: published });
                result
            })
            .map_err(|e| AcquisitionError::Spawn(e.to_string()))?;

        Ok(Self {
            stop,
            handle: Some(handle),
            done,
            events,
            join_timeout: options.join_timeout,
        })
    }

    /// Receiver of worker notifications.
    pub fn events(&self) -> Receiver<DriverEvent> {
        self.events.clone()
    }

    /// Whether the worker is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the worker and wait for it, bounded by the join timeout.
    ///
    /// Returns the number of frames the worker published.
    ///
    /// # Errors
    ///
    /// Returns the worker's link error if it stopped on a fault, or
    /// [`AcquisitionError::JoinTimeout`] if it did not exit in time. A
    /// timed-out worker is detached and exits on its next read timeout.
    pub fn disconnect(mut self) -> Result<u64, AcquisitionError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<u64, AcquisitionError> {
        self.stop.store(true, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return Ok(0);
        };

        match self.done.recv_timeout(self.join_timeout) {
            Err(RecvTimeoutError::Timeout) => {
                return Err(AcquisitionError::JoinTimeout(self.join_timeout));
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
        }

        match handle.join() {
            Ok(result) => result,
            Err(_) => Err(AcquisitionError::Worker("thread panicked".to_string())),
        }
    }
}

impl Drop for AcquisitionDriver {
    fn drop(&mut self) {
        if self.handle.is_some() {
            match self.shutdown() {
                Ok(frames) => debug!("Acquisition stopped on drop after {} frames", frames),
                Err(e) => warn!("AcquisitionDriver dropped: {}", e),
            }
        }
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock)
}

/// Discard input until the link has been quiet for `quiet`, for at most
/// `limit`.
fn drain<L: DeviceLink>(
    link: &mut L,
    quiet: Duration,
    limit: Duration,
) -> Result<(), AcquisitionError> {
    link.clear_input()?;
    let mut buf = [0u8; 256];
    let started = Instant::now();
    let mut silent_since = started;
    loop {
        if started.elapsed() >= limit {
            warn!("Device kept sending for {:?}; giving up", limit);
            return Err(AcquisitionError::HandshakeTimeout {
                received: 0,
                expected: HANDSHAKE_MAGIC.len(),
            });
        }
        match link.read(&mut buf) {
            Ok(n) if n > 0 => {
                debug!("Discarded {} stale bytes", n);
                silent_since = Instant::now();
            }
            Ok(_) => {}
            Err(e) if is_timeout(&e) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
        if silent_since.elapsed() >= quiet {
            return Ok(());
        }
    }
}

fn handshake<L: DeviceLink>(link: &mut L, options: &DriverOptions) -> Result<(), AcquisitionError> {
    drain(link, options.drain_quiet, options.drain_limit)?;

    link.write_all(&HANDSHAKE_COMMAND)?;
    link.flush()?;
    thread::sleep(options.handshake_settle);

    let mut reply = [0u8; HANDSHAKE_MAGIC.len()];
    let mut received = 0;
    let deadline = Instant::now() + options.handshake_timeout;

    while received < reply.len() {
        if Instant::now() >= deadline {
            return Err(AcquisitionError::HandshakeTimeout {
                received,
                expected: reply.len(),
            });
        }
        match link.read(&mut reply[received..]) {
            Ok(n) => received += n,
            Err(e) if is_timeout(&e) || e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    if &reply != HANDSHAKE_MAGIC {
        return Err(AcquisitionError::BadMagic(reply.to_vec()));
    }
    Ok(())
}

/// Fill `buf` completely, checking `stop` between reads.
///
/// Returns `Ok(false)` if stopped before the buffer was full.
fn read_frame<L: DeviceLink>(
    link: &mut L,
    buf: &mut [u8],
    stop: &AtomicBool,
) -> Result<bool, AcquisitionError> {
    let mut received = 0;
    while received < buf.len() {
        if stop.load(Ordering::Acquire) {
            return Ok(false);
        }
        match link.read(&mut buf[received..]) {
            Ok(0) => {
                return Err(AcquisitionError::ShortRead {
                    received,
                    expected: buf.len(),
                })
            }
            Ok(n) => received += n,
            Err(e) if is_timeout(&e) || e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

fn acquire_loop<L: DeviceLink>(
    link: &mut L,
    config: &ConfigStore,
    frames: &FrameSlot,
    stop: &AtomicBool,
    events: &Sender<DriverEvent>,
) -> Result<u64, AcquisitionError> {
    let mut payload = Vec::new();
    let mut samples = Vec::new();
    let mut count = 0u64;

    while !stop.load(Ordering::Acquire) {
        let snapshot = config.snapshot();
        let timing = &snapshot.settings.timing;
        let trigger = snapshot.settings.trigger.enabled;

        link.write_all(&Command::arm(timing, trigger).encode())?;

        let window = CaptureWindow::new(
            Instant::now(),
            Duration::from_millis(timing.expected_capture_ms()),
        );
        frames.begin_capture(window);
        link.write_all(&Command::start(timing).encode())?;
        link.flush()?;
        debug!(
            "Capture started: SH {}, ICG {}, delay {}, trigger {}",
            timing.sh_period, timing.icg_period, timing.trigger_delay, trigger
        );

        payload.resize(timing.frame_bytes(), 0);
        if !read_frame(link, &mut payload, stop)? {
            break;
        }

        decode_frame(&payload, &mut samples)?;
        frames.publish(&samples);
        count += 1;
        if events.send(DriverEvent::FramePublished { count }).is_err() {
            debug!("Driver event receiver gone");
        }
    }

    info!("Acquisition loop exited after {} frames", count);
    Ok(count)
}
