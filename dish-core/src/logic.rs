//! Pure Business Logic Functions
//!
//! Funktionen ohne Hardware-Dependencies (testbar!)

use core::fmt::Write;

use heapless::String;

use crate::config::{NAME_CHARS, RECONNECT_BASE_MS, RECONNECT_MAX_MS, RECONNECT_STEP_MS};

/// Wartezeit bis zum nächsten Reconnect-Versuch
///
/// ```
/// # use dish_core::logic::reconnect_delay_ms;
/// assert_eq!(reconnect_delay_ms(0), 30_000);
/// assert_eq!(reconnect_delay_ms(3), 60_000);
/// assert_eq!(reconnect_delay_ms(50), 120_000);
/// ```
pub fn reconnect_delay_ms(failures: u32) -> u32 {
    RECONNECT_BASE_MS
        .saturating_add(failures.saturating_mul(RECONNECT_STEP_MS))
        .min(RECONNECT_MAX_MS)
}

/// RSSI in dBm → Balken 1..=4
pub fn signal_bars(rssi: i8) -> u8 {
    match rssi {
        r if r > -50 => 4,
        r if r > -65 => 3,
        r if r > -75 => 2,
        _ => 1,
    }
}

/// PWM-Duty für Lautstärke 1..=5; Werte außerhalb werden begrenzt
pub fn volume_duty(volume: u8) -> u16 {
    const DUTY: [u16; 5] = [40, 80, 130, 200, 300];
    DUTY[usize::from(volume.clamp(1, 5) - 1)]
}

/// Nächster Spieler im Kreis
pub fn next_turn(turn: u8, players: usize) -> u8 {
    if players == 0 {
        return 0;
    }
    ((usize::from(turn) + 1) % players) as u8
}

/// Kopiert `text` so weit er in die Kapazität passt (an Zeichengrenzen)
pub fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Spielername: Großbuchstaben, höchstens 10 Zeichen
pub fn normalize_name<const N: usize>(name: &str) -> String<N> {
    let mut out = String::new();
    for ch in name.trim().chars().flat_map(char::to_uppercase).take(NAME_CHARS) {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Ersetzt `{NAME}` und `{SCORE}` in einer Textvorlage
///
/// Unbekannte Platzhalter bleiben stehen. Zu lange Ergebnisse werden
/// abgeschnitten.
pub fn fill_template<const N: usize>(template: &str, name: &str, score: u32) -> String<N> {
    let mut out = String::<N>::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        push_truncating(&mut out, &rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{NAME}") {
            push_truncating(&mut out, name);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{SCORE}") {
            let _ = write!(out, "{}", score);
            rest = after;
        } else {
            push_truncating(&mut out, "{");
            rest = &tail[1..];
        }
    }
    push_truncating(&mut out, rest);
    out
}

fn push_truncating<const N: usize>(out: &mut String<N>, text: &str) {
    for ch in text.chars() {
        if out.push(ch).is_err() {
            return;
        }
    }
}
