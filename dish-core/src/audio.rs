//! Tonfolgen für Rückmeldungen
//!
//! Jede Melodie ist eine feste Liste aus (Frequenz, Dauer); Frequenz 0 ist
//! eine Pause. Ob gespielt wird, entscheidet die [`SoundConfig`].

use crate::logic::volume_duty;
use crate::state::SoundConfig;
use crate::traits::AudioSink;
use crate::types::Note;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cue {
    Score,
    Start,
    Milestone,
    Error,
    Highscore,
}

const SCORE: [Note; 7] = [
    Note::tone(523, 200),
    Note::rest(40),
    Note::tone(659, 200),
    Note::rest(40),
    Note::tone(784, 200),
    Note::rest(40),
    Note::tone(1047, 400),
];

const START: [Note; 8] = [
    Note::tone(660, 150),
    Note::tone(660, 150),
    Note::rest(150),
    Note::tone(660, 150),
    Note::rest(150),
    Note::tone(523, 150),
    Note::tone(660, 200),
    Note::tone(784, 400),
];

const MILESTONE: [Note; 9] = [
    Note::tone(523, 150),
    Note::tone(523, 150),
    Note::rest(80),
    Note::tone(523, 150),
    Note::rest(80),
    Note::tone(392, 150),
    Note::tone(523, 200),
    Note::tone(659, 200),
    Note::tone(784, 400),
];

const ERROR: [Note; 4] = [
    Note::tone(392, 300),
    Note::tone(349, 300),
    Note::tone(330, 300),
    Note::tone(262, 450),
];

const HIGHSCORE: [Note; 5] = [
    Note::tone(784, 150),
    Note::rest(40),
    Note::tone(784, 150),
    Note::rest(40),
    Note::tone(1047, 350),
];

impl Cue {
    pub fn melody(self) -> &'static [Note] {
        match self {
            Cue::Score => &SCORE,
            Cue::Start => &START,
            Cue::Milestone => &MILESTONE,
            Cue::Error => &ERROR,
            Cue::Highscore => &HIGHSCORE,
        }
    }

    /// Fehler und Highscore hängen nur am Hauptschalter
    pub fn enabled_by(self, config: &SoundConfig) -> bool {
        config.enabled
            && match self {
                Cue::Score => config.on_score,
                Cue::Start => config.on_start,
                Cue::Milestone => config.on_milestone,
                Cue::Error | Cue::Highscore => true,
            }
    }
}

pub struct AudioCues<A> {
    sink: A,
}

impl<A: AudioSink> AudioCues<A> {
    pub fn new(sink: A) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    /// Spielt `cue`, falls in der Konfiguration erlaubt; `true` wenn gespielt
    pub fn play(&mut self, cue: Cue, config: &SoundConfig) -> bool {
        if !cue.enabled_by(config) {
            return false;
        }
        self.sink.play(cue.melody(), volume_duty(config.volume));
        true
    }
}
