//! # Trigger and Capture Control
//!
//! The periodic tick that turns the newest raw frame into a published
//! signal and drives capture automation:
//!
//! 1. Poll the settings file for external edits.
//! 2. Skip unless a new frame arrived or the settings changed.
//! 3. Correct and resample the latest frame.
//! 4. With the trigger enabled: optionally purge temporary captures, store
//!    the signal as a temporary capture, and start a match run.
//! 5. Publish the signal and capture progress.
//!
//! Ticks never overlap; a tick that finds the previous one still running
//! returns immediately.

mod controller;


pub use controller::{CaptureController, TickOutcome, TickState, TICK_INTERVAL};
