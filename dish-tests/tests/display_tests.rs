//! Integration Tests für Renderer, Lauftext und Font

mod common;

use common::{MockDisplay, expected_columns};
use dish_core::config::WINDOW_WIDTH;
use dish_core::display::matrix::{REG_INTENSITY, REG_SHUTDOWN};
use dish_core::display::{Continuation, Renderer, glyph};
use dish_core::display::font::{PLACEHOLDER, text_width};
use dish_core::time::Instant;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn at(ms: u32) -> Instant {
    Instant::from_millis(ms)
}

fn powered() -> Renderer<MockDisplay> {
    let mut r = Renderer::new(MockDisplay::default());
    r.power_on();
    r.driver_mut().bus_mut().frames.clear();
    r
}

/// Zeilen-Bytes des zuletzt gezeichneten Frames für Modul 0
fn last_rows(r: &Renderer<MockDisplay>) -> Vec<u8> {
    let frames = &r.driver().bus().frames;
    frames[frames.len() - 8..].iter().map(|f| f[1]).collect()
}

// ============================================================================
// Tests: Ein/Aus
// ============================================================================

#[test]
fn test_power_on_wakes_driver() {
    let mut r = Renderer::new(MockDisplay::default());
    assert!(!r.is_powered());
    r.power_on();

    assert!(r.is_powered());
    let bus = r.driver().bus();
    assert_eq!(bus.frames[0], vec![REG_SHUTDOWN, 1, REG_SHUTDOWN, 1, REG_SHUTDOWN, 1, REG_SHUTDOWN, 1]);
    assert_eq!(bus.last_register(REG_INTENSITY), Some(3));
}

#[test]
fn test_power_off_clears_then_shuts_down() {
    let mut r = powered();
    r.power_off();

    let frames = &r.driver().bus().frames;
    assert_eq!(frames.len(), 9);
    assert!(frames[..8].iter().all(|f| f[1] == 0));
    assert_eq!(frames[8][0], REG_SHUTDOWN);
    assert_eq!(frames[8][1], 0);
    assert!(!r.is_powered());
}

#[test]
fn test_animation_continues_while_off_without_bus_traffic() {
    let mut r = Renderer::new(MockDisplay::default());
    r.start_scroll("HI", 1, 10, Continuation::Nothing, at(0));
    for t in (10..200).step_by(10) {
        r.tick(at(t));
    }
    assert!(r.driver().bus().frames.is_empty());
    assert!(r.scroll().offset() > 0);
}

#[test]
fn test_bus_errors_do_not_panic() {
    let mut r = Renderer::new(MockDisplay {
        fail_writes: true,
        ..MockDisplay::default()
    });
    r.power_on();
    r.set_brightness(7);
    r.show_static("X");
    r.power_off();
    assert!(r.driver().bus().frames.is_empty());
}

// ============================================================================
// Tests: Lauftext
// ============================================================================

#[test]
fn test_scroll_columns_match_font() {
    let mut r = powered();
    r.start_scroll("Aä!", 1, 10, Continuation::Nothing, at(0));
    assert_eq!(r.scroll().columns().to_vec(), expected_columns("AÄ!"));
}

#[test]
fn test_each_step_draws_one_frame() {
    let mut r = powered();
    r.start_scroll("I", 1, 10, Continuation::Nothing, at(0));

    assert_eq!(r.tick(at(5)), None);
    assert!(r.driver().bus().frames.is_empty());
    assert_eq!(r.tick(at(10)), None);
    assert_eq!(r.driver().bus().frames.len(), 8);
}

#[test]
fn test_text_enters_from_the_right() {
    let mut r = powered();
    r.start_scroll("I", 1, 1, Continuation::Nothing, at(0));
    // Nach einem Schritt steht die erste Glyphenspalte ganz rechts
    r.tick(at(1));
    let frames = &r.driver().bus().frames;
    let row1_module3 = frames[frames.len() - 7][7];
    assert_eq!(row1_module3 & 0x01, 0x01);
}

#[test]
fn test_finish_reports_continuation_once() {
    let mut r = powered();
    r.start_scroll("OK", 1, 1, Continuation::ShowCurrentState, at(0));
    let mut results = Vec::new();
    for t in 1..500 {
        if let Some(c) = r.tick(at(t)) {
            results.push(c);
        }
    }
    assert_eq!(results, vec![Continuation::ShowCurrentState]);
    assert!(r.is_done());
}

#[test]
fn test_static_text_is_drawn_immediately() {
    let mut r = powered();
    r.show_static("I");

    // "I" = 0x41 0x7F 0x41, zentriert ab Spalte 14 (Modul 1, Bit 6..8)
    let rows = &r.driver().bus().frames;
    assert_eq!(rows.len(), 8);
    let row1: Vec<u8> = rows[1].chunks(2).map(|p| p[1]).collect();
    assert_eq!(row1, vec![0, 0b0000_0011, 0b1000_0000, 0]);
    assert_eq!(r.tick(at(10_000)), None);
}

#[test]
fn test_set_speed_applies_to_running_scroll() {
    let mut r = powered();
    r.start_scroll("I", 1, 100, Continuation::Nothing, at(0));
    r.set_speed(10);
    r.tick(at(10));
    assert_eq!(r.scroll().offset(), 1);
}

#[test]
fn test_clear_blanks_rows() {
    let mut r = powered();
    r.show_static("X");
    r.clear();
    assert_eq!(last_rows(&r), vec![0; 8]);
}

// ============================================================================
// Tests: Font
// ============================================================================

#[test]
fn test_umlauts_and_placeholder() {
    assert_eq!(glyph('ö'), glyph('Ö'));
    assert_ne!(glyph('Ö'), PLACEHOLDER);
    assert_eq!(glyph('€'), PLACEHOLDER);
    assert_eq!(text_width("€"), PLACEHOLDER.len() + 1);
}

proptest! {
    #[test]
    fn prop_width_matches_scroll_columns(text in "[A-Za-z0-9 !?.:-]{0,40}") {
        let mut r = Renderer::new(MockDisplay::default());
        r.start_scroll(&text, 1, 10, Continuation::Nothing, at(0));
        prop_assert_eq!(r.scroll().columns().len(), text_width(&text) + 2 * WINDOW_WIDTH);
    }
}
