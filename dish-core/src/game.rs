//! Turn/Score Engine
//!
//! Reine Spielregeln auf dem [`GameState`]. Anzeige, Sound und Speichern
//! übernimmt der Scheduler.

use core::fmt::Write;

use heapless::String;

use crate::error::GameError;
use crate::logic::{fill_template, next_turn, normalize_name, truncated};
use crate::state::{Avatar, GameState, LogEntry, Name, Player, RewardKey, RewardText, Rewards};

/// Text, wie er auf die Matrix geht
pub type Message = String<160>;

/// Ausgelöste Belohnung beim Erreichen eines Punktestands
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reward {
    pub player: u8,
    pub score: u32,
    pub text: RewardText,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub player: u8,
    /// Der Punkt kam vom Spieler, der dran war
    pub was_turn: bool,
    pub score: u32,
    pub reward: Option<Reward>,
}

pub struct GameEngine {
    state: GameState,
}

impl GameEngine {
    pub fn new(mut state: GameState) -> Self {
        state.migrate();
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Ersetzt den kompletten Stand (Backup einspielen)
    pub fn restore(&mut self, mut state: GameState) {
        state.migrate();
        self.state = state;
    }

    pub fn player_name(&self, index: usize) -> &str {
        self.state
            .players
            .get(index)
            .map_or("?", |p| p.name.as_str())
    }

    /// Punkt für `player`
    ///
    /// Der Zug rückt nur weiter, wenn der Spieler dran war. Jeder Punkt
    /// setzt die Ausräum-Erinnerung.
    pub fn score(&mut self, player: usize, timestamp: u64) -> Result<ScoreOutcome, GameError> {
        let n = self.state.players.len();
        if player >= n {
            return Err(GameError::UnknownPlayer);
        }
        let index = player as u8;
        let was_turn = index == self.state.turn;

        let p = &mut self.state.players[player];
        p.score = p.score.saturating_add(1);
        let score = p.score;

        if was_turn {
            self.state.turn = next_turn(self.state.turn, n);
        }
        self.state.unload_reminder = true;

        if self.state.last_scorer == Some(index) {
            let p = &mut self.state.players[player];
            p.streak = p.streak.saturating_add(1);
        } else {
            for (i, other) in self.state.players.iter_mut().enumerate() {
                if i == player {
                    other.streak = other.streak.max(1);
                } else {
                    other.streak = 0;
                }
            }
        }
        self.state.last_scorer = Some(index);

        self.state.push_log(LogEntry {
            player: index,
            at: timestamp,
        });

        let reward = reward_for(&self.state.players[player].rewards, score).map(|text| Reward {
            player: index,
            score,
            text,
        });

        Ok(ScoreOutcome {
            player: index,
            was_turn,
            score,
            reward,
        })
    }

    /// Maschine eingeräumt und gestartet
    pub fn start(&mut self) {
        self.state.unload_reminder = false;
    }

    /// Überspringt den Spieler, der dran ist; gibt dessen Index zurück
    pub fn skip(&mut self) -> u8 {
        let skipped = self.state.turn;
        self.state.turn = next_turn(skipped, self.state.players.len());
        skipped
    }

    pub fn reset(&mut self) {
        for p in self.state.players.iter_mut() {
            p.score = 0;
            p.streak = 0;
        }
        self.state.turn = 0;
        self.state.unload_reminder = false;
        self.state.log.clear();
        self.state.last_scorer = None;
    }

    /// Neue Spielerliste; bestehende Spieler behalten Punkte und Belohnungen
    ///
    /// Gibt die Anzahl der Spieler vor der Änderung zurück, damit der
    /// Aufrufer verwaiste Fingerabdruck-Slots löschen kann.
    pub fn set_names(&mut self, names: &[Name], avatars: Option<&[Avatar]>) -> Result<usize, GameError> {
        if names.is_empty() {
            return Err(GameError::EmptyRoster);
        }
        let previous = self.state.players.len();
        self.state.players.truncate(names.len());

        for (i, raw) in names.iter().enumerate() {
            let name: Name = normalize_name(raw);
            let avatar = avatars.and_then(|a| a.get(i));
            match self.state.players.get_mut(i) {
                Some(player) => {
                    player.name = name;
                    if let Some(avatar) = avatar {
                        player.avatar = avatar.clone();
                    }
                }
                None => {
                    let avatar = avatar.map_or("", |a| a.as_str());
                    if self.state.players.push(Player::new(&name, avatar)).is_err() {
                        break;
                    }
                }
            }
        }
        self.state.migrate();
        Ok(previous)
    }

    pub fn set_rewards(&mut self, player: usize, rewards: Rewards) -> Result<(), GameError> {
        let p = self
            .state
            .players
            .get_mut(player)
            .ok_or(GameError::UnknownPlayer)?;
        p.rewards = rewards;
        Ok(())
    }

    pub fn set_fingerprint_flag(&mut self, slot: usize, registered: bool) -> Result<(), GameError> {
        let p = self
            .state
            .players
            .get_mut(slot)
            .ok_or(GameError::UnknownPlayer)?;
        p.fingerprint = registered;
        Ok(())
    }

    /// Ausräum-Erinnerung oder "wer ist dran"
    pub fn current_message(&self) -> Message {
        if self.state.unload_reminder {
            truncated(&self.state.texts.dirty)
        } else {
            let name = self.player_name(usize::from(self.state.turn));
            fill_template(&self.state.texts.your_turn, name, 0)
        }
    }

    /// Text für einen Punkt (Dank, wenn jemand anderes eingesprungen ist)
    pub fn score_message(&self, outcome: &ScoreOutcome) -> Message {
        let name = self.player_name(usize::from(outcome.player));
        let texts = &self.state.texts;
        if outcome.reward.is_some() {
            let mut text: Message = fill_template(&texts.milestone, name, outcome.score);
            let extra: Message = fill_template(&texts.milestone_score, name, outcome.score);
            let _ = text.push_str("  ");
            let _ = text.push_str(&extra);
            return text;
        }
        let template = if outcome.was_turn {
            &texts.point
        } else {
            &texts.point_other
        };
        fill_template(template, name, outcome.score)
    }

    pub fn skipped_message(&self, skipped: u8) -> Message {
        fill_template(&self.state.texts.skipped, self.player_name(usize::from(skipped)), 0)
    }

    /// `NAME:PUNKTE` absteigend sortiert, bei Gleichstand in Spielerreihenfolge
    pub fn highscore_line(&self) -> Message {
        let players = &self.state.players;
        let mut order: heapless::Vec<usize, { crate::config::MAX_PLAYERS }> =
            (0..players.len()).collect();
        // Insertion-Sort ist stabil und braucht keinen Allocator
        for i in 1..order.len() {
            let mut j = i;
            while j > 0 && players[order[j - 1]].score < players[order[j]].score {
                order.swap(j - 1, j);
                j -= 1;
            }
        }

        let mut line = Message::new();
        for (pos, &i) in order.iter().enumerate() {
            if pos > 0 {
                let _ = line.push_str("  ");
            }
            let _ = write!(line, "{}:{}", players[i].name, players[i].score);
        }
        line
    }
}

fn reward_for(rewards: &Rewards, score: u32) -> Option<RewardText> {
    let mut key = RewardKey::new();
    write!(key, "{}", score).ok()?;
    rewards
        .iter()
        .find(|(k, _)| k.as_str() == key.as_str())
        .map(|(_, text)| text.clone())
}
