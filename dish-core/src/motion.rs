//! Bewegungsmelder (PIR) schaltet das Display ein und aus

use crate::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerTransition {
    Activated,
    Deactivated,
}

/// Display-Zustand abhängig von Bewegung
///
/// Ist die Bewegungssteuerung deaktiviert, bleibt das Display immer an.
#[derive(Clone, Copy, Debug)]
pub struct MotionController {
    display_active: bool,
    last_motion: Instant,
}

impl MotionController {
    pub const fn new(now: Instant) -> Self {
        Self {
            display_active: true,
            last_motion: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.display_active
    }

    pub fn evaluate(
        &mut self,
        now: Instant,
        motion_detected: bool,
        enabled: bool,
        idle_timeout_s: u32,
    ) -> Option<PowerTransition> {
        if !enabled {
            return self.activate();
        }

        if motion_detected {
            self.last_motion = now;
            return self.activate();
        }

        if self.display_active && now.exceeds(self.last_motion, idle_timeout_s.saturating_mul(1_000)) {
            self.display_active = false;
            return Some(PowerTransition::Deactivated);
        }
        None
    }

    fn activate(&mut self) -> Option<PowerTransition> {
        if self.display_active {
            return None;
        }
        self.display_active = true;
        Some(PowerTransition::Activated)
    }
}
