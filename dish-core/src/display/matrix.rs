//! MAX7219-Treiber für eine Kette von 8×8-Modulen

use crate::config::{MATRIX_MODULES, MAX_BRIGHTNESS};
use crate::error::BusError;
use crate::traits::DisplayBus;

pub const REG_DECODE_MODE: u8 = 0x09;
pub const REG_INTENSITY: u8 = 0x0A;
pub const REG_SCAN_LIMIT: u8 = 0x0B;
pub const REG_SHUTDOWN: u8 = 0x0C;
pub const REG_DISPLAY_TEST: u8 = 0x0F;

/// Normalbetrieb, alle 8 Zeilen, kein BCD-Decode, Helligkeit 3, kein Testmodus
const INIT_SEQUENCE: [(u8, u8); 5] = [
    (REG_SHUTDOWN, 1),
    (REG_SCAN_LIMIT, 7),
    (REG_DECODE_MODE, 0),
    (REG_INTENSITY, 3),
    (REG_DISPLAY_TEST, 0),
];

/// Sendet Register-Frames an alle Module gleichzeitig
pub struct MatrixDriver<B> {
    bus: B,
    frame: [u8; MATRIX_MODULES * 2],
}

impl<B: DisplayBus> MatrixDriver<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            frame: [0; MATRIX_MODULES * 2],
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    fn broadcast(&mut self, register: u8, value: u8) -> Result<(), BusError> {
        for pair in self.frame.chunks_exact_mut(2) {
            pair[0] = register;
            pair[1] = value;
        }
        self.bus.write(&self.frame)
    }

    /// Init-Sequenz senden und alle Zeilen löschen
    pub fn init(&mut self) -> Result<(), BusError> {
        for (register, value) in INIT_SEQUENCE {
            self.broadcast(register, value)?;
        }
        self.clear()
    }

    pub fn clear(&mut self) -> Result<(), BusError> {
        for row in 1..=8 {
            self.broadcast(row, 0)?;
        }
        Ok(())
    }

    pub fn shutdown(&mut self) -> Result<(), BusError> {
        self.broadcast(REG_SHUTDOWN, 0)
    }

    /// Helligkeit 0..=15, größere Werte werden begrenzt
    pub fn set_brightness(&mut self, level: u8) -> Result<(), BusError> {
        self.broadcast(REG_INTENSITY, level.min(MAX_BRIGHTNESS))
    }

    /// Zeichnet das Fenster ab `offset` aus `cols`
    ///
    /// Zeile 0 nimmt Bit 7 der Spalte, Zeilen 1..=7 die Bits 0..=6.
    /// Spalten außerhalb von `cols` bleiben dunkel.
    pub fn render_frame(&mut self, cols: &[u8], offset: usize) -> Result<(), BusError> {
        for row in 0..8u8 {
            let mask = if row == 0 { 0x80 } else { 1 << (row - 1) };
            for (module, pair) in self.frame.chunks_exact_mut(2).enumerate() {
                let mut byte = 0u8;
                for bit in 0..8 {
                    let lit = cols
                        .get(offset + module * 8 + bit)
                        .is_some_and(|col| col & mask != 0);
                    if lit {
                        byte |= 0x80 >> bit;
                    }
                }
                pair[0] = row + 1;
                pair[1] = byte;
            }
            self.bus.write(&self.frame)?;
        }
        Ok(())
    }
}
