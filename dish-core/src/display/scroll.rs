//! Nicht-blockierender Lauftext

use crate::config::WINDOW_WIDTH;
use crate::display::font::{Columns, push_text, text_width};
use crate::time::Instant;

/// Aktion, die nach dem letzten Durchlauf eines Lauftexts ausgeführt wird
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Continuation {
    #[default]
    Nothing,
    /// Zurück zur Anzeige "wer ist dran"
    ShowCurrentState,
}

/// Ergebnis eines Animationsschritts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Nichts zu tun (fertig, statisch oder Intervall nicht erreicht)
    Idle,
    /// Fenster ist eine Spalte weitergerückt, neu zeichnen
    Moved,
    /// Letzter Durchlauf beendet; wird genau einmal gemeldet
    Finished(Continuation),
}

pub struct ScrollState {
    cols: Columns,
    offset: usize,
    speed_ms: u32,
    repeat_count: u8,
    max_repeats: u8,
    done: bool,
    is_static: bool,
    on_complete: Continuation,
    last_step: Instant,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::idle()
    }
}

impl ScrollState {
    pub const fn idle() -> Self {
        Self {
            cols: Columns::new(),
            offset: 0,
            speed_ms: 0,
            repeat_count: 0,
            max_repeats: 0,
            done: true,
            is_static: false,
            on_complete: Continuation::Nothing,
            last_step: Instant::from_millis(0),
        }
    }

    /// Startet einen Lauftext mit je einer leeren Fensterbreite davor und danach
    pub fn start(
        &mut self,
        text: &str,
        max_repeats: u8,
        speed_ms: u32,
        on_complete: Continuation,
        now: Instant,
    ) {
        self.cols.clear();
        pad(&mut self.cols, WINDOW_WIDTH);
        let reserve = self.cols.capacity() - WINDOW_WIDTH;
        if !push_text(text, &mut self.cols) || self.cols.len() > reserve {
            self.cols.truncate(reserve);
        }
        pad(&mut self.cols, WINDOW_WIDTH);

        self.offset = 0;
        self.speed_ms = speed_ms;
        self.repeat_count = 0;
        self.max_repeats = max_repeats.max(1);
        self.done = false;
        self.is_static = false;
        self.on_complete = on_complete;
        self.last_step = now;
    }

    /// Text zentriert ohne Animation; gilt sofort als fertig
    pub fn set_static(&mut self, text: &str) {
        self.cols.clear();
        let width = text_width(text);
        pad(&mut self.cols, WINDOW_WIDTH.saturating_sub(width) / 2);
        push_text(text, &mut self.cols);
        pad(&mut self.cols, WINDOW_WIDTH);

        self.offset = 0;
        self.done = true;
        self.is_static = true;
        self.on_complete = Continuation::Nothing;
    }

    pub fn advance(&mut self, now: Instant) -> Step {
        if self.done || self.is_static || self.cols.is_empty() {
            return Step::Idle;
        }
        if !now.reaches(self.last_step, self.speed_ms) {
            return Step::Idle;
        }
        self.last_step = now;
        self.offset += 1;

        let total = self.cols.len().saturating_sub(WINDOW_WIDTH);
        if self.offset >= total {
            self.repeat_count += 1;
            if self.repeat_count >= self.max_repeats {
                self.done = true;
                return Step::Finished(core::mem::take(&mut self.on_complete));
            }
            self.offset = 0;
        }
        Step::Moved
    }

    pub fn set_speed(&mut self, speed_ms: u32) {
        self.speed_ms = speed_ms;
    }

    pub fn columns(&self) -> &[u8] {
        &self.cols
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn repeat_count(&self) -> u8 {
        self.repeat_count
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }
}

fn pad(cols: &mut Columns, count: usize) {
    for _ in 0..count {
        if cols.push(0).is_err() {
            break;
        }
    }
}
