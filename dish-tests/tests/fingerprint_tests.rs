//! Integration Tests für Sensor-Protokoll, Anlernen und passive Erkennung

mod common;

use common::*;
use dish_core::ApiRequest;
use dish_core::audio::Cue;
use dish_core::error::ProtocolError;
use dish_core::fingerprint::packet::{HEADER, encode, parse_reply};
use dish_core::fingerprint::{
    Command, EnrollFailure, EnrollPhase, EnrollProgress, EnrollPrompt, EnrollSession,
    FingerprintReader, ScanOutcome,
};
use dish_core::persist::STATE_FILE;
use dish_core::time::Instant;
use dish_core::traits::Timebase;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn reader(sensor: MockSensor) -> FingerprintReader<MockSensor> {
    FingerprintReader::new(sensor)
}

/// Lässt eine Sitzung laufen, bis sie endet; sammelt die Hinweise
fn run_session(
    session: &mut EnrollSession,
    reader: &mut FingerprintReader<MockSensor>,
    tb: &mut MockTimebase,
) -> (EnrollProgress, Vec<EnrollPrompt>) {
    let mut prompts = Vec::new();
    for _ in 0..10_000 {
        match session.step(reader, tb) {
            EnrollProgress::Pending => tb.advance(20),
            EnrollProgress::Prompt(p) => prompts.push(p),
            done => return (done, prompts),
        }
    }
    panic!("Sitzung endet nicht");
}

// ============================================================================
// Tests: Paketformat
// ============================================================================

#[test]
fn test_capture_packet_bytes() {
    let pkt = encode(&Command::CaptureImage.payload());
    assert_eq!(
        pkt.as_slice(),
        &[0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x03, 0x01, 0x00, 0x05]
    );
}

#[test]
fn test_store_packet_carries_slot() {
    let pkt = encode(&Command::Store(0x0102).payload());
    assert_eq!(&pkt[..7], &HEADER);
    assert_eq!(&pkt[9..13], &[0x06, 0x01, 0x01, 0x02]);
}

#[test]
fn test_parse_reply_errors() {
    assert_eq!(parse_reply(&[]), Err(ProtocolError::NoResponse));
    assert_eq!(parse_reply(&[0xEF, 0x01, 0xFF]), Err(ProtocolError::ShortResponse));

    let mut bad_header = reply_packet(0x00, &[]);
    bad_header[0] = 0xAA;
    assert_eq!(parse_reply(&bad_header), Err(ProtocolError::BadHeader));

    let mut bad_sum = reply_packet(0x00, &[]);
    let last = bad_sum.len() - 1;
    bad_sum[last] ^= 0xFF;
    assert_eq!(parse_reply(&bad_sum), Err(ProtocolError::Checksum));
}

#[test]
fn test_parse_reply_reads_word() {
    let reply = parse_reply(&reply_packet(0x00, &[0x00, 0x07, 0x00, 0x50])).unwrap();
    assert!(reply.is_ok());
    assert_eq!(reply.word, Some(7));

    let reply = parse_reply(&reply_packet(0x09, &[])).unwrap();
    assert_eq!(reply.word, None);
    assert_eq!(reply.confirmed(), Err(ProtocolError::Rejected(0x09)));
}

proptest! {
    #[test]
    fn prop_replies_with_valid_checksum_parse(code in any::<u8>(), data in proptest::collection::vec(any::<u8>(), 0..8)) {
        let reply = parse_reply(&reply_packet(code, &data)).unwrap();
        prop_assert_eq!(reply.code, code);
        prop_assert_eq!(reply.word.is_some(), data.len() >= 2);
    }

    #[test]
    fn prop_single_bit_flip_in_body_is_detected(data in proptest::collection::vec(any::<u8>(), 2..8), bit in 0u8..8) {
        let mut pkt = reply_packet(0x00, &data);
        pkt[10] ^= 1 << bit;
        prop_assert_eq!(parse_reply(&pkt), Err(ProtocolError::Checksum));
    }
}

// ============================================================================
// Tests: Reader
// ============================================================================

#[test]
fn test_transact_waits_and_feeds_watchdog() {
    let mut r = reader(MockSensor::default());
    let mut tb = MockTimebase::default();
    r.transact(Command::TemplateCount, &mut tb).unwrap();

    assert_eq!(tb.now_ms, 500);
    assert_eq!(tb.feeds, 1);
}

#[test]
fn test_identify_outcomes() {
    let mut tb = MockTimebase::default();

    let mut r = reader(MockSensor::default());
    assert_eq!(r.identify(&mut tb), ScanOutcome::NoFinger);
    assert_eq!(r.uart().opcodes(), vec![0x01]);

    let mut r = reader(MockSensor {
        finger_default: true,
        ..MockSensor::default()
    });
    assert_eq!(r.identify(&mut tb), ScanOutcome::NoMatch);
    assert_eq!(r.uart().opcodes(), vec![0x01, 0x02, 0x04]);

    let mut r = reader(MockSensor {
        finger_default: true,
        match_slot: Some(3),
        ..MockSensor::default()
    });
    assert_eq!(r.identify(&mut tb), ScanOutcome::Match(3));
    assert_eq!(r.scan(&mut tb), Some(3));

    let mut r = reader(MockSensor {
        finger_default: true,
        fail_opcode: Some(0x02),
        ..MockSensor::default()
    });
    assert_eq!(r.identify(&mut tb), ScanOutcome::Unreadable);
}

#[test]
fn test_silent_sensor() {
    let mut r = reader(MockSensor {
        silent: true,
        ..MockSensor::default()
    });
    let mut tb = MockTimebase::default();
    assert_eq!(r.capture(&mut tb), Err(ProtocolError::NoResponse));
    assert_eq!(r.count(&mut tb), 0);
    assert!(!r.delete(1, &mut tb));
    assert_eq!(r.identify(&mut tb), ScanOutcome::NoFinger);
}

#[test]
fn test_count_and_delete() {
    let mut r = reader(MockSensor {
        template_count: 5,
        ..MockSensor::default()
    });
    let mut tb = MockTimebase::default();
    assert_eq!(r.count(&mut tb), 5);
    assert!(r.delete(2, &mut tb));
    assert_eq!(r.uart().deleted, vec![2]);
}

// ============================================================================
// Tests: Anlern-Sitzung
// ============================================================================

#[test]
fn test_enroll_happy_path() {
    let mut r = reader(MockSensor {
        fingers: [true, false, true].into(),
        ..MockSensor::default()
    });
    let mut tb = MockTimebase::default();
    let mut session = EnrollSession::new(4, tb.now());

    let (result, prompts) = run_session(&mut session, &mut r, &mut tb);

    assert_eq!(result, EnrollProgress::Succeeded);
    assert_eq!(prompts, vec![EnrollPrompt::RemoveFinger, EnrollPrompt::PlaceAgain]);
    assert_eq!(session.phase(), EnrollPhase::Done);
    assert_eq!(r.uart().stored, vec![4]);
    assert_eq!(r.uart().opcodes(), vec![0x01, 0x02, 0x01, 0x01, 0x02, 0x05, 0x06]);
}

#[test]
fn test_enroll_times_out_without_finger() {
    let mut r = reader(MockSensor::default());
    let mut tb = MockTimebase::default();
    let mut session = EnrollSession::new(0, tb.now());

    let (result, prompts) = run_session(&mut session, &mut r, &mut tb);

    assert_eq!(result, EnrollProgress::Failed(EnrollFailure::Timeout));
    assert!(prompts.is_empty());
    assert!(tb.now_ms > 15_000 && tb.now_ms < 17_000);
    assert!(r.uart().stored.is_empty());
}

#[test]
fn test_enroll_continues_when_finger_stays() {
    let mut r = reader(MockSensor {
        finger_default: true,
        ..MockSensor::default()
    });
    let mut tb = MockTimebase::default();
    let mut session = EnrollSession::new(1, tb.now());

    let (result, _) = run_session(&mut session, &mut r, &mut tb);
    assert_eq!(result, EnrollProgress::Succeeded);
    assert!(tb.now_ms > 10_000);
}

#[test]
fn test_enroll_fails_on_second_image_timeout() {
    let mut r = reader(MockSensor {
        fingers: [true, false].into(),
        ..MockSensor::default()
    });
    let mut tb = MockTimebase::default();
    let mut session = EnrollSession::new(0, tb.now());

    let (result, prompts) = run_session(&mut session, &mut r, &mut tb);
    assert_eq!(result, EnrollProgress::Failed(EnrollFailure::Timeout));
    assert_eq!(prompts, vec![EnrollPrompt::RemoveFinger, EnrollPrompt::PlaceAgain]);
}

#[test]
fn test_enroll_fails_when_model_is_rejected() {
    let mut r = reader(MockSensor {
        fingers: [true, false, true].into(),
        fail_opcode: Some(0x05),
        ..MockSensor::default()
    });
    let mut tb = MockTimebase::default();
    let mut session = EnrollSession::new(0, tb.now());

    let (result, _) = run_session(&mut session, &mut r, &mut tb);
    assert_eq!(
        result,
        EnrollProgress::Failed(EnrollFailure::Protocol(ProtocolError::Rejected(0x01)))
    );
    assert!(r.uart().stored.is_empty());
}

#[test]
fn test_finished_session_stays_finished() {
    let mut r = reader(MockSensor::default());
    let mut tb = MockTimebase::default();
    let mut session = EnrollSession::new(0, Instant::from_millis(0));
    run_session(&mut session, &mut r, &mut tb);

    assert!(session.is_finished());
    assert_eq!(session.step(&mut r, &mut tb), EnrollProgress::Pending);
}

// ============================================================================
// Tests: Anlernen über den Scheduler
// ============================================================================

#[test]
fn test_blocking_enroll_sets_flag_and_announces() {
    let mut sched = booted_station();
    sched.ctx.fingerprint.uart_mut().fingers = [true, false, true].into();

    assert!(sched.enroll_fingerprint(1));

    assert!(!sched.is_enrolling());
    assert!(sched.game().state().players[1].fingerprint);
    assert_eq!(scroll_columns(&sched), expected_columns("AMELIE GESPEICHERT!"));
    let played = &sched.ctx.audio.sink().played;
    assert_eq!(played.last().unwrap().0, Cue::Score.melody().to_vec());
    let saved = sched.ctx.store.fs().text(STATE_FILE).unwrap();
    assert!(saved.contains(r#""fingerprint":true"#));
}

#[test]
fn test_failed_enroll_shows_error() {
    let mut sched = booted_station();

    assert!(!sched.enroll_fingerprint(0));

    assert!(!sched.game().state().players[0].fingerprint);
    assert_eq!(scroll_columns(&sched), expected_columns("FEHLER!"));
    let played = &sched.ctx.audio.sink().played;
    assert_eq!(played.last().unwrap().0, Cue::Error.melody().to_vec());
}

#[test]
fn test_enroll_rejects_unknown_slot() {
    let mut sched = booted_station();
    assert!(!sched.enroll_fingerprint(4));
    assert!(sched.ctx.fingerprint.uart().sent.is_empty());
}

#[test]
fn test_api_enroll_replies_when_finished() {
    let mut sched = booted_station();
    sched.ctx.fingerprint.uart_mut().fingers = [true, false, true].into();
    sched.ctx.requests.inbox.push_back(ApiRequest::EnrollFingerprint { slot: 2 });
    sched.ctx.requests.inbox.push_back(ApiRequest::Start);

    sched.ctx.timebase.advance(10);
    sched.run_once();
    assert!(sched.is_enrolling());
    assert!(sched.ctx.requests.replies.is_empty());
    assert_eq!(scroll_columns(&sched), expected_columns("FINGER AUFLEGEN"));

    for _ in 0..1_000 {
        if !sched.is_enrolling() {
            break;
        }
        sched.ctx.timebase.advance(20);
        sched.run_once();
    }

    assert!(!sched.is_enrolling());
    assert_eq!(sched.ctx.requests.replies, vec![Reply::Enrolled(true)]);
    assert_eq!(sched.ctx.requests.inbox.len(), 1);

    sched.ctx.timebase.advance(10);
    sched.run_once();
    assert_eq!(sched.ctx.requests.replies.last(), Some(&Reply::Ok));
}

#[test]
fn test_second_enroll_request_is_refused_while_busy() {
    let mut sched = booted_station();
    assert!(sched.begin_enrollment(0, false));
    assert!(!sched.begin_enrollment(1, false));
}

#[test]
fn test_delete_fingerprint_clears_flag() {
    let mut sched = booted_station();
    sched.ctx.fingerprint.uart_mut().fingers = [true, false, true].into();
    sched.enroll_fingerprint(3);

    assert!(sched.delete_fingerprint(3));
    assert!(!sched.game().state().players[3].fingerprint);
    assert_eq!(sched.ctx.fingerprint.uart().deleted, vec![3]);
    assert!(!sched.delete_fingerprint(9));
}

// ============================================================================
// Tests: Passive Erkennung
// ============================================================================

fn touch_ready() -> dish_core::Scheduler<MockPlatform> {
    let mut sched = booted_station();
    sched.ctx.inputs.levels.finger_touch = true;
    let sensor = sched.ctx.fingerprint.uart_mut();
    sensor.finger_default = true;
    sensor.sent.clear();
    sched
}

#[test]
fn test_match_scores_for_slot_owner() {
    let mut sched = touch_ready();
    sched.ctx.fingerprint.uart_mut().match_slot = Some(2);

    sched.ctx.timebase.advance(10);
    sched.run_once();

    assert_eq!(sched.game().state().players[2].score, 1);
    assert_eq!(scroll_columns(&sched), expected_columns("DANKE JAMIE +1 PUNKT!"));
}

#[test]
fn test_cooldown_after_recognition() {
    let mut sched = touch_ready();
    sched.ctx.fingerprint.uart_mut().match_slot = Some(0);

    sched.ctx.timebase.advance(10);
    sched.run_once();
    run_for(&mut sched, 2_900, 100);
    assert_eq!(sched.game().state().players[0].score, 1);

    run_for(&mut sched, 200, 100);
    assert_eq!(sched.game().state().players[0].score, 2);
}

#[test]
fn test_unknown_finger_announces_unknown() {
    let mut sched = touch_ready();

    sched.ctx.timebase.advance(10);
    sched.run_once();

    let scores: Vec<u32> = sched.game().state().players.iter().map(|p| p.score).collect();
    assert_eq!(scores, vec![0, 0, 0, 0]);
    assert_eq!(scroll_columns(&sched), expected_columns("UNBEKANNT!"));
    let played = &sched.ctx.audio.sink().played;
    assert_eq!(played.last().unwrap().0, Cue::Error.melody().to_vec());
}

#[test]
fn test_no_scan_without_touch() {
    let mut sched = touch_ready();
    sched.ctx.inputs.levels.finger_touch = false;

    run_for(&mut sched, 2_000, 50);
    assert!(sched.ctx.fingerprint.uart().sent.is_empty());
}

#[test]
fn test_no_scan_while_display_is_off() {
    let mut sched = touch_ready();
    sched.ctx.inputs.levels.finger_touch = false;
    sched.ctx.inputs.levels.motion = false;
    run_for(&mut sched, 16_000, 500);
    assert!(!sched.display_active());

    sched.ctx.inputs.levels.finger_touch = true;
    run_for(&mut sched, 1_000, 100);
    assert!(sched.ctx.fingerprint.uart().sent.is_empty());
}

#[test]
fn test_unreadable_image_retries_after_poll_interval() {
    let mut sched = touch_ready();
    sched.ctx.fingerprint.uart_mut().fail_opcode = Some(0x02);

    sched.ctx.timebase.advance(10);
    sched.run_once();
    let first = sched.ctx.fingerprint.uart().sent.len();
    assert_eq!(first, 2);

    sched.ctx.timebase.advance(10);
    sched.run_once();
    assert_eq!(sched.ctx.fingerprint.uart().sent.len(), first + 2);
}
