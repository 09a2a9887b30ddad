//! Gestenerkennung für Front- und Seitentaste
//!
//! Wird einmal pro Scheduler-Durchlauf mit den aktuellen Pegeln aufgerufen
//! und liefert höchstens eine Aktion.

use crate::config::{CLICK_SETTLE_MS, COMBO_HOLD_MS, LONG_PRESS_MS};
use crate::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    Front,
    Side,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    SingleClick(ButtonId),
    /// Zwei oder mehr Klicks innerhalb des Klickfensters
    DoubleClick(ButtonId),
    LongPress(ButtonId),
    /// Beide Tasten länger als 3 s gehalten
    WifiReset,
}

impl ButtonAction {
    /// Kurzname, wie ihn die HTTP-API verwendet
    pub fn code(self) -> &'static str {
        match self {
            Self::SingleClick(ButtonId::Front) => "front_1",
            Self::DoubleClick(ButtonId::Front) => "front_2",
            Self::LongPress(ButtonId::Front) => "front_long",
            Self::SingleClick(ButtonId::Side) => "side_1",
            Self::DoubleClick(ButtonId::Side) => "side_2",
            Self::LongPress(ButtonId::Side) => "side_long",
            Self::WifiReset => "wifi_reset",
        }
    }
}

impl core::convert::TryFrom<&str> for ButtonAction {
    type Error = ();

    fn try_from(code: &str) -> Result<Self, Self::Error> {
        match code {
            "front_1" => Ok(Self::SingleClick(ButtonId::Front)),
            "front_2" => Ok(Self::DoubleClick(ButtonId::Front)),
            "front_long" => Ok(Self::LongPress(ButtonId::Front)),
            "side_1" => Ok(Self::SingleClick(ButtonId::Side)),
            "side_2" => Ok(Self::DoubleClick(ButtonId::Side)),
            "side_long" => Ok(Self::LongPress(ButtonId::Side)),
            "wifi_reset" => Ok(Self::WifiReset),
            _ => Err(()),
        }
    }
}

/// Zustand einer einzelnen Taste
#[derive(Clone, Copy, Debug, Default)]
pub struct ButtonState {
    pressed_since: Instant,
    click_count: u8,
    last_release_at: Instant,
    is_down: bool,
}

impl ButtonState {
    fn update(&mut self, id: ButtonId, down: bool, now: Instant) -> Option<ButtonAction> {
        if down {
            if !self.is_down {
                self.pressed_since = now;
                self.is_down = true;
            }
            return None;
        }

        if self.is_down {
            self.is_down = false;
            if now.exceeds(self.pressed_since, LONG_PRESS_MS) {
                self.click_count = 0;
                return Some(ButtonAction::LongPress(id));
            }
            self.click_count = self.click_count.saturating_add(1);
            self.last_release_at = now;
        }

        // Klicks erst auflösen, wenn nach dem letzten Loslassen Ruhe ist
        if self.click_count > 0 && now.exceeds(self.last_release_at, CLICK_SETTLE_MS) {
            let clicks = self.click_count;
            self.click_count = 0;
            return Some(if clicks == 1 {
                ButtonAction::SingleClick(id)
            } else {
                ButtonAction::DoubleClick(id)
            });
        }
        None
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct ComboState {
    both_pressed_since: Option<Instant>,
    triggered: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GestureRecognizer {
    front: ButtonState,
    side: ButtonState,
    combo: ComboState,
}

impl GestureRecognizer {
    pub const fn new() -> Self {
        Self {
            front: ButtonState {
                pressed_since: Instant::from_millis(0),
                click_count: 0,
                last_release_at: Instant::from_millis(0),
                is_down: false,
            },
            side: ButtonState {
                pressed_since: Instant::from_millis(0),
                click_count: 0,
                last_release_at: Instant::from_millis(0),
                is_down: false,
            },
            combo: ComboState {
                both_pressed_since: None,
                triggered: false,
            },
        }
    }

    /// Verarbeitet die Pegel eines Durchlaufs (`true` = gedrückt)
    ///
    /// Solange beide Tasten gedrückt sind, werden die Einzeltasten nicht
    /// ausgewertet. Die Kombination löst pro Halten nur einmal aus.
    pub fn poll(&mut self, front_down: bool, side_down: bool, now: Instant) -> Option<ButtonAction> {
        if front_down && side_down {
            match self.combo.both_pressed_since {
                None => self.combo.both_pressed_since = Some(now),
                Some(since) if !self.combo.triggered && now.exceeds(since, COMBO_HOLD_MS) => {
                    self.combo.triggered = true;
                    return Some(ButtonAction::WifiReset);
                }
                Some(_) => {}
            }
            return None;
        }
        self.combo = ComboState::default();

        if let Some(action) = self.front.update(ButtonId::Front, front_down, now) {
            return Some(action);
        }
        self.side.update(ButtonId::Side, side_down, now)
    }
}
