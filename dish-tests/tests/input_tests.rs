//! Integration Tests für Tastengesten und Bewegungsmelder

use dish_core::buttons::{ButtonAction, ButtonId, GestureRecognizer};
use dish_core::motion::{MotionController, PowerTransition};
use dish_core::time::Instant;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn at(ms: u32) -> Instant {
    Instant::from_millis(ms)
}

/// Spielt eine Folge von (Zeit, vorne, seitlich) ab und sammelt die Gesten
fn replay(steps: &[(u32, bool, bool)]) -> Vec<(u32, ButtonAction)> {
    let mut g = GestureRecognizer::new();
    steps
        .iter()
        .filter_map(|&(t, front, side)| g.poll(front, side, at(t)).map(|a| (t, a)))
        .collect()
}

/// 10-ms-Raster zwischen `from` und `to` mit konstanten Pegeln
fn hold(from: u32, to: u32, front: bool, side: bool) -> Vec<(u32, bool, bool)> {
    (from..to).step_by(10).map(|t| (t, front, side)).collect()
}

// ============================================================================
// Tests: Klicks
// ============================================================================

#[test]
fn test_single_click_front() {
    let mut steps = hold(0, 100, true, false);
    steps.extend(hold(100, 1_000, false, false));

    assert_eq!(
        replay(&steps),
        vec![(510, ButtonAction::SingleClick(ButtonId::Front))]
    );
}

#[test]
fn test_double_click_side() {
    let mut steps = hold(0, 80, false, true);
    steps.extend(hold(80, 250, false, false));
    steps.extend(hold(250, 330, false, true));
    steps.extend(hold(330, 1_000, false, false));

    assert_eq!(
        replay(&steps),
        vec![(740, ButtonAction::DoubleClick(ButtonId::Side))]
    );
}

#[test]
fn test_three_clicks_count_as_double() {
    let mut steps = Vec::new();
    for i in 0..3 {
        let start = i * 200;
        steps.extend(hold(start, start + 50, true, false));
        steps.extend(hold(start + 50, start + 200, false, false));
    }
    steps.extend(hold(600, 1_200, false, false));

    let actions: Vec<ButtonAction> = replay(&steps).into_iter().map(|(_, a)| a).collect();
    assert_eq!(actions, vec![ButtonAction::DoubleClick(ButtonId::Front)]);
}

#[test]
fn test_click_resolution_needs_more_than_settle_time() {
    let mut g = GestureRecognizer::new();
    g.poll(true, false, at(0));
    g.poll(false, false, at(100));
    assert_eq!(g.poll(false, false, at(500)), None);
    assert_eq!(
        g.poll(false, false, at(501)),
        Some(ButtonAction::SingleClick(ButtonId::Front))
    );
}

// ============================================================================
// Tests: Langer Druck & Kombination
// ============================================================================

#[test]
fn test_long_press_on_release_without_click() {
    let mut steps = hold(0, 1_600, true, false);
    steps.extend(hold(1_600, 3_000, false, false));

    assert_eq!(
        replay(&steps),
        vec![(1_600, ButtonAction::LongPress(ButtonId::Front))]
    );
}

#[test]
fn test_exactly_long_press_threshold_is_a_click() {
    let mut g = GestureRecognizer::new();
    g.poll(false, true, at(0));
    assert_eq!(g.poll(false, false, at(1_500)), None);
    assert_eq!(
        g.poll(false, false, at(1_901)),
        Some(ButtonAction::SingleClick(ButtonId::Side))
    );
}

#[test]
fn test_combo_fires_once_while_held() {
    let mut steps = hold(0, 6_000, true, true);
    steps.extend(hold(6_000, 7_000, false, false));

    let actions = replay(&steps);
    assert_eq!(actions, vec![(3_010, ButtonAction::WifiReset)]);
}

#[test]
fn test_combo_released_early_does_nothing_special() {
    let mut steps = hold(0, 2_000, true, true);
    steps.extend(hold(2_000, 3_000, false, false));

    let actions = replay(&steps);
    assert!(actions.iter().all(|(_, a)| *a != ButtonAction::WifiReset));
}

#[test]
fn test_action_codes() {
    let codes: Vec<&str> = [
        ButtonAction::SingleClick(ButtonId::Front),
        ButtonAction::DoubleClick(ButtonId::Front),
        ButtonAction::LongPress(ButtonId::Front),
        ButtonAction::SingleClick(ButtonId::Side),
        ButtonAction::DoubleClick(ButtonId::Side),
        ButtonAction::LongPress(ButtonId::Side),
        ButtonAction::WifiReset,
    ]
    .into_iter()
    .map(ButtonAction::code)
    .collect();

    assert_eq!(
        codes,
        vec![
            "front_1",
            "front_2",
            "front_long",
            "side_1",
            "side_2",
            "side_long",
            "wifi_reset"
        ]
    );
}

#[test]
fn test_unknown_code_is_rejected() {
    assert!(ButtonAction::try_from("back_1").is_err());
    assert!(ButtonAction::try_from("").is_err());
}

// ============================================================================
// Tests: Bewegungsmelder
// ============================================================================

#[test]
fn test_motion_keeps_display_on() {
    let mut m = MotionController::new(at(0));
    for t in (0..60_000).step_by(1_000) {
        assert_eq!(m.evaluate(at(t), true, true, 15), None);
    }
    assert!(m.is_active());
}

#[test]
fn test_display_turns_off_and_back_on() {
    let mut m = MotionController::new(at(0));
    assert_eq!(m.evaluate(at(10_000), true, true, 15), None);
    assert_eq!(m.evaluate(at(25_000), false, true, 15), None);
    assert_eq!(
        m.evaluate(at(25_001), false, true, 15),
        Some(PowerTransition::Deactivated)
    );
    assert!(!m.is_active());
    assert_eq!(m.evaluate(at(40_000), false, true, 15), None);
    assert_eq!(
        m.evaluate(at(41_000), true, true, 15),
        Some(PowerTransition::Activated)
    );
}

#[test]
fn test_disabling_motion_control_reactivates() {
    let mut m = MotionController::new(at(0));
    m.evaluate(at(20_000), false, true, 15);
    assert!(!m.is_active());

    assert_eq!(
        m.evaluate(at(20_010), false, false, 15),
        Some(PowerTransition::Activated)
    );
    assert_eq!(m.evaluate(at(99_000), false, false, 15), None);
    assert!(m.is_active());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_no_gesture_without_any_press(len in 0usize..300) {
        let mut g = GestureRecognizer::new();
        for i in 0..len {
            prop_assert_eq!(g.poll(false, false, at(i as u32 * 10)), None);
        }
    }

    #[test]
    fn prop_short_press_is_single_click(press in 20u32..1_500, gap in 401u32..5_000) {
        let mut g = GestureRecognizer::new();
        g.poll(true, false, at(0));
        prop_assert_eq!(g.poll(false, false, at(press)), None);
        prop_assert_eq!(
            g.poll(false, false, at(press + gap)),
            Some(ButtonAction::SingleClick(ButtonId::Front))
        );
    }
}
