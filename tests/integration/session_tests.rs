//! Integration tests for the LinkSession → listener → evaluator pipeline.
//!
//! A mock device feeds bytes through a real listener thread, so these
//! cover framing, decoding, publication and the verdict end to end.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use skyguard::app::events::MonitorEvent;
use skyguard::error::{CommandError, Error, LinkError};
use skyguard::telegram::FrameError;
use skyguard::{
    DeviceCommand, LinkSession, LinkSettings, LinkStatus, MonitorConfig, SafetyVerdict,
    Thresholds, UnsafeReason,
};

use crate::mock_link::{MockConnector, MockDevice, RecordingSink, wait_until};

const CLEAR_SKY: &[u8] = b"$12.3,45,1013,-15.0,10.0,21.0,0.0#";
const HUMID: &[u8] = b"$12.3,95,1013,-15.0,10.0,21.0,0.0#";

fn make_session() -> (LinkSession<MockConnector>, Arc<MockDevice>, Arc<RecordingSink>) {
    let device = MockDevice::new();
    let sink = RecordingSink::new();
    let session = LinkSession::with_sink(
        MockConnector::new(&device),
        &MonitorConfig::default(),
        sink.clone(),
    );
    (session, device, sink)
}

fn connected() -> (LinkSession<MockConnector>, Arc<MockDevice>, Arc<RecordingSink>) {
    let (session, device, sink) = make_session();
    session.connect().unwrap();
    (session, device, sink)
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn failed_connect_reports_unavailable_and_stays_disconnected() {
    let (session, device, sink) = make_session();
    device.fail_open.store(true, Ordering::SeqCst);

    assert_eq!(session.connect(), Err(Error::Link(LinkError::Unavailable)));
    assert_eq!(session.status(), LinkStatus::Disconnected);
    assert_eq!(session.current_verdict(), SafetyVerdict::Unsafe);
    assert!(sink.events().is_empty());
}

#[test]
fn connect_uses_configured_port_and_baud() {
    let (session, device, sink) = connected();
    let settings = device.last_settings().unwrap();
    assert_eq!(settings.port, "COM1");
    assert_eq!(settings.baud_rate, 9600);
    assert_eq!(
        sink.events().first(),
        Some(&MonitorEvent::Connected {
            port: String::from("COM1")
        })
    );
    drop(session);
}

#[test]
fn connect_with_overrides_settings() {
    let (session, device, _sink) = make_session();
    session
        .connect_with(LinkSettings::new("/dev/ttyUSB0"))
        .unwrap();
    assert_eq!(device.last_settings().unwrap().port, "/dev/ttyUSB0");
    assert_eq!(session.settings().port, "/dev/ttyUSB0");
}

#[test]
fn connected_without_telegram_is_unsafe() {
    let (session, _device, _sink) = connected();
    assert_eq!(session.status(), LinkStatus::Connected);
    assert!(session.latest_record().is_none());
    assert_eq!(session.current_verdict(), SafetyVerdict::Unsafe);
    assert_eq!(session.assessment().reason, Some(UnsafeReason::NoRecord));
}

#[test]
fn disconnect_twice_is_harmless() {
    let (session, _device, sink) = connected();
    session.disconnect();
    session.disconnect();
    assert_eq!(session.status(), LinkStatus::Disconnected);
    assert_eq!(sink.count(|e| *e == MonitorEvent::Disconnected), 1);
}

#[test]
fn reconnect_replaces_the_link_and_drops_the_old_record() {
    let (session, device, _sink) = connected();
    device.send(CLEAR_SKY);
    assert!(wait_until(|| session.latest_record().is_some()));

    session.connect().unwrap();
    assert_eq!(device.open_count(), 2);
    assert!(session.is_connected());
    assert!(session.latest_record().is_none());
    assert_eq!(session.assessment().reason, Some(UnsafeReason::NoRecord));
}

// ── Telegram pipeline ─────────────────────────────────────────

#[test]
fn clear_sky_telegram_is_safe() {
    let (session, device, _sink) = connected();
    device.send(CLEAR_SKY);

    assert!(wait_until(|| session.latest_record().is_some()));
    let record = session.latest_record().unwrap();
    assert_eq!(record.humidity, Some(45.0));
    assert_eq!(record.sky_temperature, Some(-15.0));
    assert_eq!(session.current_verdict(), SafetyVerdict::Safe);
    assert_eq!(session.stats().telegrams_accepted, 1);
}

#[test]
fn telegram_split_across_reads_is_reassembled() {
    let (session, device, _sink) = connected();
    let (head, tail) = CLEAR_SKY.split_at(11);
    device.send(b"noise");
    device.send(head);
    device.send(tail);

    assert!(wait_until(|| session.latest_record().is_some()));
    assert_eq!(session.current_verdict(), SafetyVerdict::Safe);
    assert_eq!(session.stats().noise_bytes, 5);
}

#[test]
fn newer_telegram_replaces_older() {
    let (session, device, sink) = connected();
    device.send(CLEAR_SKY);
    assert!(wait_until(|| session.current_verdict().is_safe()));

    device.send(HUMID);
    assert!(wait_until(|| {
        sink.count(|e| matches!(e, MonitorEvent::VerdictChanged(_))) == 2
    }));
    assert_eq!(session.current_verdict(), SafetyVerdict::Unsafe);
    assert_eq!(session.assessment().reason, Some(UnsafeReason::HumidityHigh));
}

#[test]
fn overlong_frame_is_rejected_and_record_kept() {
    let (session, device, sink) = connected();
    device.send(CLEAR_SKY);
    assert!(wait_until(|| session.latest_record().is_some()));

    let mut long = vec![b'$'];
    long.extend(std::iter::repeat_n(b'1', 45));
    long.push(b'#');
    device.send(&long);

    assert!(wait_until(|| {
        sink.count(|e| *e == MonitorEvent::TelegramRejected(FrameError::TooLong)) == 1
    }));
    assert_eq!(session.stats().telegrams_rejected, 1);
    assert_eq!(session.current_verdict(), SafetyVerdict::Safe);
}

#[test]
fn empty_fields_give_sky_sensor_fault() {
    let (session, device, _sink) = connected();
    device.send(b"$,,,,,,#");
    assert!(wait_until(|| session.latest_record().is_some()));
    assert_eq!(session.latest_record().unwrap().parsed_count(), 0);
    assert_eq!(session.assessment().reason, Some(UnsafeReason::SkySensorFault));
}

#[test]
fn disconnect_clears_the_record() {
    let (session, device, _sink) = connected();
    device.send(CLEAR_SKY);
    assert!(wait_until(|| session.latest_record().is_some()));

    session.disconnect();
    assert!(session.latest_record().is_none());
    assert_eq!(session.assessment().reason, Some(UnsafeReason::LinkDown));
}

#[test]
fn link_loss_disconnects_and_clears_record() {
    let (session, device, sink) = connected();
    device.send(CLEAR_SKY);
    assert!(wait_until(|| session.latest_record().is_some()));

    device.break_link();
    assert!(wait_until(|| sink.count(|e| *e == MonitorEvent::LinkLost) == 1));
    assert_eq!(session.status(), LinkStatus::Disconnected);
    assert!(session.latest_record().is_none());
    assert_eq!(session.current_verdict(), SafetyVerdict::Unsafe);

    // A fresh connect recovers.
    session.connect().unwrap();
    device.send(CLEAR_SKY);
    assert!(wait_until(|| session.current_verdict().is_safe()));
}

// ── Thresholds ────────────────────────────────────────────────

#[test]
fn threshold_update_applies_to_next_evaluation() {
    let (session, device, _sink) = connected();
    device.send(CLEAR_SKY);
    assert!(wait_until(|| session.current_verdict().is_safe()));

    session.set_thresholds(Thresholds {
        humidity_max: 40.0,
        ..Thresholds::default()
    });
    assert_eq!(session.current_verdict(), SafetyVerdict::Unsafe);
    assert_eq!(session.assessment().reason, Some(UnsafeReason::HumidityHigh));
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn reset_writes_reset_frame() {
    let (session, device, sink) = connected();
    session.send_command("reset").unwrap();
    assert_eq!(device.written(), b"reset#");
    assert_eq!(
        sink.count(|e| *e == MonitorEvent::CommandSent(DeviceCommand::Reset)),
        1
    );
}

#[test]
fn buzzer_commands_use_wire_text() {
    let (session, device, _sink) = connected();
    session.send_command("buzzer-on").unwrap();
    session.send(DeviceCommand::BuzzerOff).unwrap();
    assert_eq!(device.written(), b"buzz on#buzz off#");
}

#[test]
fn unknown_command_is_refused_without_writing() {
    let (session, device, _sink) = connected();
    assert_eq!(
        session.send_command("dance"),
        Err(Error::Command(CommandError::Invalid))
    );
    assert!(device.written().is_empty());
}

#[test]
fn unknown_command_is_invalid_even_when_disconnected() {
    let (session, _device, _sink) = make_session();
    assert_eq!(
        session.send_command("dance"),
        Err(Error::Command(CommandError::Invalid))
    );
}

#[test]
fn command_while_disconnected_is_not_connected() {
    let (session, device, _sink) = make_session();
    assert_eq!(
        session.send_command("reset"),
        Err(Error::Link(LinkError::NotConnected))
    );
    assert!(device.written().is_empty());
}

#[test]
fn failed_write_surfaces_and_is_not_retried() {
    let (session, device, sink) = connected();
    device.fail_write.store(true, Ordering::SeqCst);
    assert_eq!(
        session.send_command("reset"),
        Err(Error::Link(LinkError::WriteFailed))
    );
    assert_eq!(
        sink.count(|e| matches!(e, MonitorEvent::CommandSent(_))),
        0
    );
    assert!(session.is_connected());
}
