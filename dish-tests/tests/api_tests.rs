//! Integration Tests für die JSON-Antworten der HTTP-API

use core::net::Ipv4Addr;

use dish_core::api::{ApiResponse, Tagged, Ticket};
use dish_core::game::Reward;
use dish_core::types::ScanEntry;
use pretty_assertions::assert_eq;

fn json(response: ApiResponse<'_>) -> String {
    let mut buf = [0u8; 512];
    let n = response.write_json(&mut buf).unwrap();
    String::from_utf8(buf[..n].to_vec()).unwrap()
}

#[test]
fn test_ok_and_rejected() {
    assert_eq!(json(ApiResponse::Ok), r#"{"ok":true}"#);
    assert_eq!(json(ApiResponse::Rejected), r#"{"ok":false}"#);
    assert!(ApiResponse::Rejected.is_rejected());
    assert!(!ApiResponse::Ok.is_rejected());
}

#[test]
fn test_score_without_reward_has_no_reward_field() {
    assert_eq!(json(ApiResponse::Scored(None)), r#"{"ok":true}"#);
}

#[test]
fn test_score_with_reward() {
    let reward = Reward {
        player: 1,
        score: 10,
        text: "Eis essen".try_into().unwrap(),
    };
    assert_eq!(
        json(ApiResponse::Scored(Some(reward))),
        r#"{"ok":true,"reward":{"player":1,"score":10,"text":"Eis essen"}}"#
    );
}

#[test]
fn test_enrollment_results() {
    assert_eq!(
        json(ApiResponse::Enrolled(true)),
        r#"{"ok":true,"message":"enrolled"}"#
    );
    assert_eq!(
        json(ApiResponse::Enrolled(false)),
        r#"{"ok":false,"error":"Registrierung fehlgeschlagen"}"#
    );
}

#[test]
fn test_ip_includes_mdns_name() {
    assert_eq!(
        json(ApiResponse::Ip(Some(Ipv4Addr::new(192, 168, 1, 42)))),
        r#"{"ip":"192.168.1.42","local":"dishdash.local"}"#
    );
    assert_eq!(
        json(ApiResponse::Ip(None)),
        r#"{"ip":"","local":"dishdash.local"}"#
    );
}

#[test]
fn test_setup_result() {
    assert_eq!(
        json(ApiResponse::Setup(Some(Ipv4Addr::new(10, 0, 0, 7)))),
        r#"{"ok":true,"ip":"10.0.0.7"}"#
    );
    assert_eq!(json(ApiResponse::Setup(None)), r#"{"ok":true,"ip":""}"#);
}

#[test]
fn test_networks_and_count() {
    let networks = [
        ScanEntry {
            ssid: "Heimnetz".try_into().unwrap(),
            bars: 4,
        },
        ScanEntry {
            ssid: "Nachbar".try_into().unwrap(),
            bars: 1,
        },
    ];
    assert_eq!(
        json(ApiResponse::Networks(&networks)),
        r#"{"networks":[{"ssid":"Heimnetz","bars":4},{"ssid":"Nachbar","bars":1}]}"#
    );
    assert_eq!(json(ApiResponse::Count(3)), r#"{"ok":true,"count":3}"#);
}

#[test]
fn test_small_buffer_reports_encode_error() {
    let mut buf = [0u8; 4];
    assert!(ApiResponse::Ok.write_json(&mut buf).is_err());
}

#[test]
fn test_late_reply_is_not_taken_by_next_request() {
    let abandoned = Ticket::default().next();
    let current = abandoned.next();
    assert_ne!(abandoned, current);

    let late = Tagged {
        ticket: abandoned,
        value: "antwort-a",
    };
    assert_eq!(late.accept(current), None);

    let fresh = Tagged {
        ticket: current,
        value: "antwort-b",
    };
    assert_eq!(fresh.accept(current), Some("antwort-b"));
}
