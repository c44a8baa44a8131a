use std::sync::Arc;
use std::time::{Duration, Instant};

use super::*;
use crate::config::{ConfigStore, DeviceTiming, Settings};
use crate::pipeline::CaptureWindow;

fn fast_options() -> DriverOptions {
    DriverOptions {
        drain_quiet: Duration::from_millis(5),
        handshake_settle: Duration::ZERO,
        handshake_timeout: Duration::from_millis(200),
        join_timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

fn small_config(pixels: usize) -> Arc<ConfigStore> {
    let mut settings = Settings::default();
    settings.timing.pixel_count = pixels;
    Arc::new(ConfigStore::in_memory(settings))
}

fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    false
}

#[test]
fn test_handshake_bytes() {
    assert_eq!(
        HANDSHAKE_COMMAND,
        [0x45, 0x52, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x01, 0x00, 0x02, 0x00]
    );
}

#[test]
fn test_arm_command_encoding() {
    let timing = DeviceTiming {
        trigger_delay: 0x1234,
        ..Default::default()
    };

    let free = Command::arm(&timing, false).encode();
    assert_eq!(&free[..2], &OPCODE);
    assert_eq!(&free[2..6], &[0x00, 0x00, 0x12, 0x34]);
    assert_eq!(&free[6..10], &[0x02, 0x00, 0x00, 0x00]);
    assert_eq!(&free[10..], &[0x02, 0x00]);

    let triggered = Command::arm(&timing, true);
    assert_eq!(triggered.encode()[6], 0x00);
    assert!(triggered.waits_for_trigger());
}

#[test]
fn test_start_command_encoding() {
    let timing = DeviceTiming {
        sh_period: 20,
        icg_period: 0x0001_0000,
        ..Default::default()
    };
    let bytes = Command::start(&timing).encode();
    assert_eq!(&bytes[2..6], &[0x00, 0x00, 0x00, 0x14]);
    assert_eq!(&bytes[6..10], &[0x00, 0x01, 0x00, 0x00]);
    assert_eq!(&bytes[10..], &[0x00, 0x00]);

    let decoded = Command::decode(&bytes).unwrap();
    assert_eq!(decoded.mode, Mode::Start);
    assert_eq!(decoded.param_b, 0x0001_0000);
}

#[test]
fn test_decode_rejects_bad_commands() {
    assert!(Command::decode(&[0x45, 0x52]).is_err());
    let mut bytes = HANDSHAKE_COMMAND;
    bytes[0] = 0;
    assert!(Command::decode(&bytes).is_err());
    let mut bytes = HANDSHAKE_COMMAND;
    bytes[10] = 7;
    assert!(Command::decode(&bytes).is_err());
}

#[test]
fn test_decode_frame_little_endian() {
    let mut out = Vec::new();
    decode_frame(&[0x34, 0x12, 0xFF, 0xFF], &mut out).unwrap();
    assert_eq!(out, vec![0x1234, 0xFFFF]);

    decode_frame(&[0x01, 0x00], &mut out).unwrap();
    assert_eq!(out, vec![1]);

    assert!(matches!(
        decode_frame(&[1, 2, 3], &mut out),
        Err(AcquisitionError::OddPayload(3))
    ));
}

#[test]
fn test_frame_slot_keeps_newest() {
    let slot = FrameSlot::new();
    assert!(slot.take().is_none());

    slot.publish(&[1, 2, 3]);
    slot.publish(&[4, 5, 6]);
    assert!(slot.is_ready());
    assert_eq!(slot.take().unwrap().samples, vec![4, 5, 6]);
    assert!(slot.take().is_none());
    assert_eq!(slot.published(), 2);
}

#[test]
fn test_frame_keeps_its_own_capture_window() {
    let slot = FrameSlot::new();
    let start = Instant::now();
    let exposed = CaptureWindow::new(start, Duration::from_millis(4));
    let next = CaptureWindow::new(start + Duration::from_millis(10), Duration::from_millis(4));

    slot.begin_capture(exposed);
    slot.publish(&[7, 8]);
    // The driver starts the next exposure before the consumer takes the frame
    slot.begin_capture(next);

    let frame = slot.take().unwrap();
    assert_eq!(frame.window, exposed);
    assert_eq!(slot.window(), next);
}

#[test]
fn test_driver_publishes_frames() {
    let sensor = SimulatedSensor::new(64).with_line(32.0, 5000.0, 2.0);
    let expected = sensor.frame();
    let log = sensor.command_log();

    let frames = Arc::new(FrameSlot::new());
    let driver =
        AcquisitionDriver::connect_with(sensor, small_config(64), Arc::clone(&frames), fast_options())
            .unwrap();

    assert!(wait_for(|| frames.published() >= 3));
    let published = driver.disconnect().unwrap();
    assert!(published >= 3);

    let frame = frames.take().unwrap();
    assert_eq!(frame.samples, expected);
    assert_eq!(frame.samples[32], 6000);

    let commands = log.lock().unwrap();
    assert_eq!(commands[0].mode, Mode::Arm);
    assert_eq!(commands[1].mode, Mode::Start);
    assert_eq!(commands[1].param_b, 7400);
}

#[test]
fn test_driver_rejects_bad_magic() {
    let sensor = SimulatedSensor::new(8).with_magic(b"[nothing!]");
    let result = AcquisitionDriver::connect_with(
        sensor,
        small_config(8),
        Arc::new(FrameSlot::new()),
        fast_options(),
    );
    assert!(matches!(result, Err(AcquisitionError::BadMagic(_))));
}

#[test]
fn test_driver_handshake_timeout() {
    let sensor = SimulatedSensor::new(8).with_magic(b"[g3g");
    let result = AcquisitionDriver::connect_with(
        sensor,
        small_config(8),
        Arc::new(FrameSlot::new()),
        fast_options(),
    );
    assert!(matches!(
        result,
        Err(AcquisitionError::HandshakeTimeout {
            received: 4,
            expected: 10
        })
    ));
}

#[test]
fn test_driver_reports_fault_on_link_loss() {
    let sensor = SimulatedSensor::new(16).with_frame_limit(2);
    let frames = Arc::new(FrameSlot::new());
    let driver =
        AcquisitionDriver::connect_with(sensor, small_config(16), Arc::clone(&frames), fast_options())
            .unwrap();
    let events = driver.events();

    assert!(wait_for(|| !driver.is_running()));
    let received: Vec<DriverEvent> = events.try_iter().collect();
    assert!(received
        .iter()
        .any(|e| matches!(e, DriverEvent::Fault(msg) if msg.contains("Short read"))));
    assert_eq!(received.last(), Some(&DriverEvent::Stopped { frames: 2 }));

    assert!(matches!(
        driver.disconnect(),
        Err(AcquisitionError::ShortRead { received: 0, .. })
    ));
}

#[test]
fn test_driver_follows_live_timing_changes() {
    let sensor = SimulatedSensor::new(8);
    let log = sensor.command_log();
    let config = small_config(8);
    let frames = Arc::new(FrameSlot::new());
    let driver = AcquisitionDriver::connect_with(
        sensor,
        Arc::clone(&config),
        Arc::clone(&frames),
        fast_options(),
    )
    .unwrap();

    assert!(wait_for(|| frames.published() >= 1));
    config.update(|s| s.timing.set_sh_display(50));
    let seen = frames.published();
    assert!(wait_for(|| frames.published() >= seen + 2));
    driver.disconnect().unwrap();

    let commands = log.lock().unwrap();
    assert!(commands
        .iter()
        .any(|c| c.mode == Mode::Start && c.param_a == 100));
}

#[test]
fn test_disconnect_while_waiting_for_frame() {
    let sensor = SimulatedSensor::new(32).with_silent_frames();
    let log = sensor.command_log();
    let frames = Arc::new(FrameSlot::new());
    let driver =
        AcquisitionDriver::connect_with(sensor, small_config(32), Arc::clone(&frames), fast_options())
            .unwrap();

    assert!(wait_for(|| log
        .lock()
        .unwrap()
        .iter()
        .any(|c| c.mode == Mode::Start)));
    assert!(driver.is_running());

    let started = Instant::now();
    assert_eq!(driver.disconnect().unwrap(), 0);
    assert!(started.elapsed() < DEFAULT_READ_TIMEOUT * 5);
    assert_eq!(frames.published(), 0);
}

#[test]
fn test_disconnect_gives_up_on_stuck_read() {
    let sensor = SimulatedSensor::new(32)
        .with_silent_frames()
        .with_read_delay(Duration::from_millis(500));
    let log = sensor.command_log();
    let options = DriverOptions {
        join_timeout: Duration::from_millis(50),
        ..fast_options()
    };
    let driver =
        AcquisitionDriver::connect_with(sensor, small_config(32), Arc::new(FrameSlot::new()), options)
            .unwrap();

    assert!(wait_for(|| log
        .lock()
        .unwrap()
        .iter()
        .any(|c| c.mode == Mode::Start)));

    let started = Instant::now();
    assert!(matches!(
        driver.disconnect(),
        Err(AcquisitionError::JoinTimeout(t)) if t == Duration::from_millis(50)
    ));
    assert!(started.elapsed() < Duration::from_millis(400));
}

#[test]
fn test_connect_fails_on_endless_stale_input() {
    let sensor = SimulatedSensor::new(8).with_stale_stream();
    let options = DriverOptions {
        drain_quiet: Duration::from_millis(20),
        drain_limit: Duration::from_millis(100),
        ..fast_options()
    };

    let started = Instant::now();
    let result =
        AcquisitionDriver::connect_with(sensor, small_config(8), Arc::new(FrameSlot::new()), options);
    assert!(matches!(
        result,
        Err(AcquisitionError::HandshakeTimeout { received: 0, .. })
    ));
    assert!(started.elapsed() < Duration::from_secs(2));
}
