//! Befehls-/Antwort-Zyklus über UART

use crate::config::FP_TURNAROUND_MS;
use crate::error::ProtocolError;
use crate::fingerprint::packet::{CharBuffer, Command, Reply, encode, parse_reply};
use crate::log::debug;
use crate::traits::{SensorUart, Timebase};

/// Ergebnis einer passiven Erkennung
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanOutcome {
    /// Kein Finger auf dem Sensor
    NoFinger,
    /// Bild zu schlecht für ein Template
    Unreadable,
    NoMatch,
    Match(u16),
}

pub struct FingerprintReader<U> {
    uart: U,
    rx: [u8; 64],
}

impl<U: SensorUart> FingerprintReader<U> {
    pub fn new(uart: U) -> Self {
        Self { uart, rx: [0; 64] }
    }

    pub fn uart(&self) -> &U {
        &self.uart
    }

    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Verwirft Bytes, die noch im Empfangspuffer liegen
    pub fn flush(&mut self) {
        self.uart.clear();
    }

    /// Sendet einen Befehl und wartet die feste Antwortzeit ab
    ///
    /// Füttert den Watchdog vor jedem Senden.
    pub fn transact<T: Timebase>(&mut self, cmd: Command, tb: &mut T) -> Result<Reply, ProtocolError> {
        tb.feed_watchdog();
        let pkt = encode(&cmd.payload());
        self.uart.write(&pkt)?;
        tb.delay_ms(FP_TURNAROUND_MS);
        let n = self.uart.read(&mut self.rx);
        let reply = parse_reply(&self.rx[..n]);
        debug!("FP {:?} -> {:?}", cmd, reply);
        reply
    }

    /// `Ok(true)` wenn ein Finger aufliegt und ein Bild aufgenommen wurde
    pub fn capture<T: Timebase>(&mut self, tb: &mut T) -> Result<bool, ProtocolError> {
        let reply = self.transact(Command::CaptureImage, tb)?;
        Ok(reply.is_ok())
    }

    pub fn convert<T: Timebase>(&mut self, buffer: CharBuffer, tb: &mut T) -> Result<(), ProtocolError> {
        self.transact(Command::ImageToTemplate(buffer), tb)?.confirmed()?;
        Ok(())
    }

    pub fn register_model<T: Timebase>(&mut self, tb: &mut T) -> Result<(), ProtocolError> {
        self.transact(Command::RegisterModel, tb)?.confirmed()?;
        Ok(())
    }

    pub fn store<T: Timebase>(&mut self, slot: u16, tb: &mut T) -> Result<(), ProtocolError> {
        self.transact(Command::Store(slot), tb)?.confirmed()?;
        Ok(())
    }

    /// Aufnahme, Umwandlung und Suche in einem Durchgang
    pub fn identify<T: Timebase>(&mut self, tb: &mut T) -> ScanOutcome {
        match self.capture(tb) {
            Ok(true) => {}
            _ => return ScanOutcome::NoFinger,
        }
        if self.convert(CharBuffer::One, tb).is_err() {
            return ScanOutcome::Unreadable;
        }
        match self.transact(Command::Search, tb).and_then(Reply::confirmed) {
            Ok(Reply { word: Some(slot), .. }) => ScanOutcome::Match(slot),
            _ => ScanOutcome::NoMatch,
        }
    }

    /// Ein Scan-Versuch; Slot bei Treffer, sonst `None`
    pub fn scan<T: Timebase>(&mut self, tb: &mut T) -> Option<u16> {
        match self.identify(tb) {
            ScanOutcome::Match(slot) => Some(slot),
            _ => None,
        }
    }

    pub fn delete<T: Timebase>(&mut self, slot: u16, tb: &mut T) -> bool {
        self.transact(Command::Delete(slot), tb)
            .and_then(Reply::confirmed)
            .is_ok()
    }

    /// Anzahl gespeicherter Templates, 0 wenn der Sensor nicht antwortet
    pub fn count<T: Timebase>(&mut self, tb: &mut T) -> u16 {
        match self.transact(Command::TemplateCount, tb) {
            Ok(Reply { word: Some(n), .. }) => n,
            _ => 0,
        }
    }
}
