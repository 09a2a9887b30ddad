//! Anlernen eines Fingers als Zustandsautomat
//!
//! Der Scheduler ruft [`EnrollSession::step`] so lange auf, bis `Succeeded`
//! oder `Failed` kommt. Dazwischen werden keine Tasten, kein Netzwerk und
//! keine anderen Sensoren bedient (modal), Display und Watchdog schon.
//!
//! Ablauf:
//! 1. `AwaitFinger1`: Finger auflegen (max. 15 s), Bild → Puffer 1
//! 2. `AwaitRemoval`: Finger weg (max. 10 s, danach trotzdem weiter)
//! 3. `Settle`: 500 ms Pause
//! 4. `AwaitFinger2`: Finger erneut auflegen (max. 15 s), Bild → Puffer 2
//! 5. `Registering`: Modell bilden und im Slot speichern
//!
//! Erst der letzte Schritt schreibt in den Sensor-Flash; ein Abbruch
//! davor hinterlässt keinen Teilzustand.

use crate::config::{
    ENROLL_FINGER_TIMEOUT_MS, ENROLL_REMOVAL_TIMEOUT_MS, ENROLL_SETTLE_MS, FP_POLL_INTERVAL_MS,
};
use crate::error::ProtocolError;
use crate::fingerprint::packet::CharBuffer;
use crate::fingerprint::reader::FingerprintReader;
use crate::log::{debug, warn};
use crate::time::Instant;
use crate::traits::{SensorUart, Timebase};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnrollPhase {
    AwaitFinger1,
    AwaitRemoval,
    Settle,
    AwaitFinger2,
    Registering,
    Done,
    Failed,
}

/// Anweisung an den Benutzer während des Anlernens
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnrollPrompt {
    PlaceFinger,
    RemoveFinger,
    PlaceAgain,
}

impl EnrollPrompt {
    pub fn text(self) -> &'static str {
        match self {
            EnrollPrompt::PlaceFinger => "FINGER AUFLEGEN",
            EnrollPrompt::RemoveFinger => "OK! FINGER WEG!",
            EnrollPrompt::PlaceAgain => "NOCHMAL AUFLEGEN",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnrollFailure {
    Timeout,
    Protocol(ProtocolError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnrollProgress {
    Pending,
    /// Phase gewechselt, neuen Hinweis anzeigen
    Prompt(EnrollPrompt),
    Succeeded,
    Failed(EnrollFailure),
}

#[derive(Clone, Copy, Debug)]
pub struct EnrollSession {
    slot: u16,
    phase: EnrollPhase,
    phase_started: Instant,
    last_poll: Option<Instant>,
}

impl EnrollSession {
    /// Neue Sitzung; der erste Hinweis ist immer [`EnrollPrompt::PlaceFinger`]
    pub fn new(slot: u16, now: Instant) -> Self {
        Self {
            slot,
            phase: EnrollPhase::AwaitFinger1,
            phase_started: now,
            last_poll: None,
        }
    }

    pub fn slot(&self) -> u16 {
        self.slot
    }

    pub fn phase(&self) -> EnrollPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, EnrollPhase::Done | EnrollPhase::Failed)
    }

    pub fn step<U: SensorUart, T: Timebase>(
        &mut self,
        reader: &mut FingerprintReader<U>,
        tb: &mut T,
    ) -> EnrollProgress {
        let now = tb.now();
        match self.phase {
            EnrollPhase::AwaitFinger1 | EnrollPhase::AwaitFinger2 => {
                if now.exceeds(self.phase_started, ENROLL_FINGER_TIMEOUT_MS) {
                    return self.fail(EnrollFailure::Timeout);
                }
                if !self.poll_due(now) {
                    return EnrollProgress::Pending;
                }
                match reader.capture(tb) {
                    Ok(true) => {}
                    Ok(false) => return EnrollProgress::Pending,
                    Err(e) => {
                        debug!("FP enroll: keine gültige Antwort {:?}", e);
                        return EnrollProgress::Pending;
                    }
                }

                let first = self.phase == EnrollPhase::AwaitFinger1;
                let buffer = if first { CharBuffer::One } else { CharBuffer::Two };
                if let Err(e) = reader.convert(buffer, tb) {
                    return self.fail(EnrollFailure::Protocol(e));
                }
                if first {
                    self.enter(EnrollPhase::AwaitRemoval, tb.now());
                    EnrollProgress::Prompt(EnrollPrompt::RemoveFinger)
                } else {
                    self.enter(EnrollPhase::Registering, tb.now());
                    EnrollProgress::Pending
                }
            }
            EnrollPhase::AwaitRemoval => {
                if !now.exceeds(self.phase_started, ENROLL_REMOVAL_TIMEOUT_MS) {
                    if !self.poll_due(now) {
                        return EnrollProgress::Pending;
                    }
                    if let Ok(true) = reader.capture(tb) {
                        return EnrollProgress::Pending;
                    }
                }
                self.enter(EnrollPhase::Settle, tb.now());
                EnrollProgress::Pending
            }
            EnrollPhase::Settle => {
                if !now.reaches(self.phase_started, ENROLL_SETTLE_MS) {
                    return EnrollProgress::Pending;
                }
                self.enter(EnrollPhase::AwaitFinger2, now);
                EnrollProgress::Prompt(EnrollPrompt::PlaceAgain)
            }
            EnrollPhase::Registering => {
                let slot = self.slot;
                match reader
                    .register_model(tb)
                    .and_then(|()| reader.store(slot, tb))
                {
                    Ok(()) => {
                        self.phase = EnrollPhase::Done;
                        EnrollProgress::Succeeded
                    }
                    Err(e) => self.fail(EnrollFailure::Protocol(e)),
                }
            }
            EnrollPhase::Done | EnrollPhase::Failed => EnrollProgress::Pending,
        }
    }

    fn poll_due(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_poll {
            if !now.reaches(last, FP_POLL_INTERVAL_MS) {
                return false;
            }
        }
        self.last_poll = Some(now);
        true
    }

    fn enter(&mut self, phase: EnrollPhase, now: Instant) {
        self.phase = phase;
        self.phase_started = now;
        self.last_poll = None;
    }

    fn fail(&mut self, failure: EnrollFailure) -> EnrollProgress {
        warn!("FP enroll Slot {} abgebrochen: {:?}", self.slot, failure);
        self.phase = EnrollPhase::Failed;
        EnrollProgress::Failed(failure)
    }
}
