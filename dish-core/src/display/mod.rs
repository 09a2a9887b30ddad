//! LED-Matrix: Font, MAX7219-Treiber und Lauftext

pub mod font;
pub mod matrix;
pub mod scroll;

use crate::log::warn;
use crate::time::Instant;
use crate::traits::DisplayBus;

pub use font::{Columns, glyph};
pub use matrix::MatrixDriver;
pub use scroll::{Continuation, ScrollState, Step};

/// Verbindet Lauftext-Zustand und Treiber
///
/// Solange das Display abgeschaltet ist, läuft die Animation weiter,
/// es wird aber nichts auf den Bus geschrieben.
pub struct Renderer<B> {
    driver: MatrixDriver<B>,
    scroll: ScrollState,
    powered: bool,
}

impl<B: DisplayBus> Renderer<B> {
    pub fn new(bus: B) -> Self {
        Self {
            driver: MatrixDriver::new(bus),
            scroll: ScrollState::idle(),
            powered: false,
        }
    }

    pub fn driver(&self) -> &MatrixDriver<B> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut MatrixDriver<B> {
        &mut self.driver
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn is_done(&self) -> bool {
        self.scroll.is_done()
    }

    pub fn power_on(&mut self) {
        if let Err(e) = self.driver.init() {
            warn!("Display init fehlgeschlagen: {:?}", e);
        }
        self.powered = true;
    }

    pub fn power_off(&mut self) {
        let result = self.driver.clear().and_then(|()| self.driver.shutdown());
        if let Err(e) = result {
            warn!("Display abschalten fehlgeschlagen: {:?}", e);
        }
        self.powered = false;
    }

    pub fn set_brightness(&mut self, level: u8) {
        if let Err(e) = self.driver.set_brightness(level) {
            warn!("Helligkeit setzen fehlgeschlagen: {:?}", e);
        }
    }

    pub fn set_speed(&mut self, speed_ms: u32) {
        self.scroll.set_speed(speed_ms);
    }

    pub fn start_scroll(
        &mut self,
        text: &str,
        repeats: u8,
        speed_ms: u32,
        on_complete: Continuation,
        now: Instant,
    ) {
        self.scroll.start(text, repeats, speed_ms, on_complete, now);
    }

    /// Zeigt `text` zentriert an und zeichnet sofort
    pub fn show_static(&mut self, text: &str) {
        self.scroll.set_static(text);
        self.redraw();
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.driver.clear() {
            warn!("Display löschen fehlgeschlagen: {:?}", e);
        }
    }

    /// Ein Animationsschritt; liefert die Folgeaktion, sobald der Lauftext endet
    pub fn tick(&mut self, now: Instant) -> Option<Continuation> {
        match self.scroll.advance(now) {
            Step::Idle => None,
            Step::Moved => {
                self.redraw();
                None
            }
            Step::Finished(action) => Some(action),
        }
    }

    fn redraw(&mut self) {
        if !self.powered {
            return;
        }
        if let Err(e) = self
            .driver
            .render_frame(self.scroll.columns(), self.scroll.offset())
        {
            warn!("Frame senden fehlgeschlagen: {:?}", e);
        }
    }
}
