//! Monotoner Millisekunden-Zeitpunkt
//!
//! Der Zähler läuft nach ~49 Tagen über. Alle Vergleiche laufen daher über
//! die vorzeichenbehaftete Differenz, nie über `<` auf Rohwerten.

/// Zeitpunkt in Millisekunden seit Boot (mit Wraparound)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant(u32);

impl Instant {
    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Vorzeichenbehaftete Differenz `self - earlier`
    pub const fn ticks_since(self, earlier: Instant) -> i32 {
        self.0.wrapping_sub(earlier.0) as i32
    }

    /// `true` wenn seit `earlier` mehr als `ms` vergangen sind
    pub const fn exceeds(self, earlier: Instant, ms: u32) -> bool {
        self.ticks_since(earlier) > span(ms)
    }

    /// `true` wenn seit `earlier` mindestens `ms` vergangen sind
    pub const fn reaches(self, earlier: Instant, ms: u32) -> bool {
        self.ticks_since(earlier) >= span(ms)
    }

    pub const fn add_millis(self, ms: u32) -> Instant {
        Self(self.0.wrapping_add(ms))
    }
}

/// Wartezeit als Abstand; mehr als `i32::MAX` ms ist nicht darstellbar
const fn span(ms: u32) -> i32 {
    if ms > i32::MAX as u32 { i32::MAX } else { ms as i32 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_since_simple() {
        let a = Instant::from_millis(1_000);
        let b = Instant::from_millis(1_250);
        assert_eq!(b.ticks_since(a), 250);
        assert_eq!(a.ticks_since(b), -250);
    }

    #[test]
    fn test_ticks_since_across_wraparound() {
        let before = Instant::from_millis(u32::MAX - 99);
        let after = before.add_millis(300);
        assert_eq!(after.as_millis(), 200);
        assert_eq!(after.ticks_since(before), 300);
        assert!(after.exceeds(before, 299));
        assert!(!after.exceeds(before, 300));
        assert!(after.reaches(before, 300));
    }

    #[test]
    fn test_huge_wait_never_elapses_early() {
        let before = Instant::from_millis(0);
        let after = before.add_millis(5_000);
        assert!(!after.exceeds(before, u32::MAX));
        assert!(!after.reaches(before, u32::MAX));
    }
}
