// Zeitbasis: embassy-time als Uhr, TIMG1-Watchdog, Software-Reset

use dish_core::config::WATCHDOG_TIMEOUT_MS;
use dish_core::time::Instant;
use dish_core::traits::{SystemControl, Timebase};
use esp_hal::delay::Delay;
use esp_hal::peripherals::TIMG1;
use esp_hal::time::Duration;
use esp_hal::timer::timg::{MwdtStage, Wdt};

/// Millisekunden-Uhr und Hardware-Watchdog des Scheduler-Threads
///
/// `delay_ms` wartet blockierend; die Netzwerk-Tasks laufen im
/// Interrupt-Executor weiter.
pub struct EspTimebase {
    wdt: Wdt<TIMG1<'static>>,
    delay: Delay,
}

impl EspTimebase {
    /// Aktiviert den Watchdog mit 30 s Timeout
    pub fn new(mut wdt: Wdt<TIMG1<'static>>) -> Self {
        wdt.set_timeout(
            MwdtStage::Stage0,
            Duration::from_millis(u64::from(WATCHDOG_TIMEOUT_MS)),
        );
        wdt.enable();
        wdt.feed();
        Self {
            wdt,
            delay: Delay::new(),
        }
    }
}

impl Timebase for EspTimebase {
    fn now(&self) -> Instant {
        // Auf u32 gekürzt, der Kern vergleicht wraparound-sicher
        Instant::from_millis(embassy_time::Instant::now().as_millis() as u32)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_millis(ms);
    }

    fn feed_watchdog(&mut self) {
        self.wdt.feed();
    }

    fn wall_secs(&self) -> u64 {
        // Keine Zeitsynchronisation: Log-Einträge tragen 0
        0
    }
}

pub struct EspSystem;

impl SystemControl for EspSystem {
    fn reset(&mut self) {
        defmt::warn!("System: Software-Reset");
        esp_hal::system::software_reset();
    }
}
