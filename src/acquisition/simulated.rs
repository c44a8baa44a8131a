//! In-process stand-in for the sensor board.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::link::DeviceLink;
use super::protocol::{Command, Mode, COMMAND_LEN, HANDSHAKE_COMMAND, HANDSHAKE_MAGIC};

/// A Gaussian emission line rendered into simulated frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedLine {
    /// Center pixel
    pub center: f64,
    /// Peak height in ADC counts above the baseline
    pub amplitude: f64,
    /// Standard deviation in pixels
    pub width: f64,
}

/// Simulated sensor board speaking the device protocol.
///
/// Answers the handshake with the firmware signature and every start
/// command with one synthetic frame. Reads on an empty buffer time out
/// after a short pause, like a serial port with a read timeout.
#[derive(Debug)]
pub struct SimulatedSensor {
    pixel_count: usize,
    baseline: u16,
    lines: Vec<SimulatedLine>,
    magic: Vec<u8>,
    frame_limit: Option<usize>,
    frames_sent: usize,
    silent: bool,
    chatter: bool,
    read_delay: Duration,
    pending: Vec<u8>,
    output: VecDeque<u8>,
    commands: Arc<Mutex<Vec<Command>>>,
}

impl SimulatedSensor {
    /// Sensor with `pixel_count` pixels, a flat baseline and no lines.
    pub fn new(pixel_count: usize) -> Self {
        Self {
            pixel_count,
            baseline: 1000,
            lines: Vec::new(),
            magic: HANDSHAKE_MAGIC.to_vec(),
            frame_limit: None,
            frames_sent: 0,
            silent: false,
            chatter: false,
            read_delay: Duration::from_millis(1),
            pending: Vec::new(),
            output: VecDeque::new(),
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the flat baseline in ADC counts.
    pub fn with_baseline(mut self, baseline: u16) -> Self {
        self.baseline = baseline;
        self
    }

    /// Add an emission line.
    pub fn with_line(mut self, center: f64, amplitude: f64, width: f64) -> Self {
        self.lines.push(SimulatedLine {
            center,
            amplitude,
            width,
        });
        self
    }

    /// Reply to the handshake with `magic` instead of the firmware signature.
    pub fn with_magic(mut self, magic: &[u8]) -> Self {
        self.magic = magic.to_vec();
        self
    }

    /// Close the link (reads return end-of-stream) after `frames` frames.
    pub fn with_frame_limit(mut self, frames: usize) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Accept start commands without ever sending a frame.
    pub fn with_silent_frames(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Keep streaming stale bytes forever, as a board left running by an
    /// earlier session does.
    pub fn with_stale_stream(mut self) -> Self {
        self.chatter = true;
        self
    }

    /// Pause of a read on an empty buffer before it times out.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    /// Commands received so far, shared with the test or caller.
    pub fn command_log(&self) -> Arc<Mutex<Vec<Command>>> {
        Arc::clone(&self.commands)
    }

    /// The frame this sensor sends for every start command.
    pub fn frame(&self) -> Vec<u16> {
        (0..self.pixel_count)
            .map(|pixel| {
                let signal: f64 = self
                    .lines
                    .iter()
                    .map(|line| {
                        let d = (pixel as f64 - line.center) / line.width.max(f64::EPSILON);
                        line.amplitude * (-0.5 * d * d).exp()
                    })
                    .sum();
                (f64::from(self.baseline) + signal).clamp(0.0, f64::from(u16::MAX)) as u16
            })
            .collect()
    }

    fn closed(&self) -> bool {
        self.frame_limit
            .is_some_and(|limit| self.frames_sent >= limit && self.output.is_empty())
    }

    fn handle(&mut self, bytes: &[u8]) {
        if bytes == HANDSHAKE_COMMAND {
            self.output.extend(self.magic.iter().copied());
            return;
        }
        let Ok(command) = Command::decode(bytes) else {
            return;
        };
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);

        if command.mode == Mode::Start && !self.silent && !self.closed() {
            let frame = self.frame();
            for sample in frame {
                self.output.extend(sample.to_le_bytes());
            }
            self.frames_sent += 1;
        }
    }
}

impl Read for SimulatedSensor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.chatter && self.output.is_empty() {
            std::thread::sleep(self.read_delay);
            let n = buf.len().min(64);
            buf[..n].fill(0xA5);
            return Ok(n);
        }
        if self.output.is_empty() {
            if self.closed() {
                return Ok(0);
            }
            std::thread::sleep(self.read_delay);
            return Err(io::Error::new(io::ErrorKind::TimedOut, "no data"));
        }
        let n = buf.len().min(self.output.len());
        for (dst, src) in buf.iter_mut().zip(self.output.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

impl Write for SimulatedSensor {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while self.pending.len() >= COMMAND_LEN {
            let command: Vec<u8> = self.pending.drain(..COMMAND_LEN).collect();
            self.handle(&command);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl DeviceLink for SimulatedSensor {
    fn clear_input(&mut self) -> io::Result<()> {
        self.output.clear();
        Ok(())
    }
}
