//! Persistierter Spielstand
//!
//! Wird als `state.json` gespeichert. Felder, die in älteren Dateien fehlen,
//! bekommen über `#[serde(default)]` ihren Standardwert; danach bringt
//! [`GameState::migrate`] den Rest in einen konsistenten Zustand.

use heapless::{LinearMap, String, Vec};
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_BRIGHTNESS, DEFAULT_MOTION_TIMEOUT_S, DEFAULT_SCROLL_COUNT, DEFAULT_SCROLL_SPEED_MS,
    LOG_CAPACITY, MAX_BRIGHTNESS, MAX_MOTION_TIMEOUT_S, MAX_PLAYERS, MAX_REWARDS,
    MAX_SCROLL_SPEED_MS,
};
use crate::logic::truncated;

/// Aktuelle Version des Dateiformats
pub const STATE_VERSION: u8 = 2;

/// Name: 10 Zeichen, UTF-8 (Umlaute brauchen 2 Bytes)
pub type Name = String<40>;
pub type Avatar = String<16>;
/// Textvorlage mit `{NAME}` / `{SCORE}`
pub type Template = String<64>;
pub type RewardKey = String<8>;
pub type RewardText = String<64>;
pub type Rewards = LinearMap<RewardKey, RewardText, MAX_REWARDS>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: Name,
    #[serde(default)]
    pub avatar: Avatar,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub streak: u32,
    /// Template im Sensor-Slot gleichen Index vorhanden
    #[serde(default)]
    pub fingerprint: bool,
    #[serde(default = "generic_rewards")]
    pub rewards: Rewards,
}

impl Player {
    pub fn new(name: &str, avatar: &str) -> Self {
        Self {
            name: truncated(name),
            avatar: truncated(avatar),
            score: 0,
            streak: 0,
            fingerprint: false,
            rewards: generic_rewards(),
        }
    }

    fn with_rewards(mut self, rewards: &[(&str, &str)]) -> Self {
        self.rewards = rewards_from(rewards);
        self
    }
}

/// Ein Punkt im Verlauf
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "p")]
    pub player: u8,
    /// Wanduhr in Sekunden
    #[serde(rename = "t")]
    pub at: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub brightness: u8,
    #[serde(rename = "scrollSpeed")]
    pub scroll_speed_ms: u32,
    #[serde(rename = "scrollCount")]
    pub scroll_count: u8,
    #[serde(rename = "motionTimeout")]
    pub motion_timeout_s: u32,
    #[serde(rename = "pirEnabled")]
    pub motion_enabled: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
            scroll_speed_ms: DEFAULT_SCROLL_SPEED_MS,
            scroll_count: DEFAULT_SCROLL_COUNT,
            motion_timeout_s: DEFAULT_MOTION_TIMEOUT_S,
            motion_enabled: true,
        }
    }
}

impl DisplayConfig {
    /// Werte aus API oder alter Datei in den gültigen Bereich bringen
    pub fn clamp(&mut self) {
        self.brightness = self.brightness.min(MAX_BRIGHTNESS);
        self.scroll_speed_ms = self.scroll_speed_ms.clamp(1, MAX_SCROLL_SPEED_MS);
        self.scroll_count = self.scroll_count.max(1);
        self.motion_timeout_s = self.motion_timeout_s.min(MAX_MOTION_TIMEOUT_S);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub enabled: bool,
    /// 1..=5
    pub volume: u8,
    #[serde(rename = "onStart")]
    pub on_start: bool,
    #[serde(rename = "onScore")]
    pub on_score: bool,
    #[serde(rename = "onMilestone")]
    pub on_milestone: bool,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 3,
            on_start: true,
            on_score: true,
            on_milestone: true,
        }
    }
}

/// Anzeigetexte
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Texts {
    pub dirty: Template,
    #[serde(rename = "yourTurn")]
    pub your_turn: Template,
    pub point: Template,
    #[serde(rename = "pointOther")]
    pub point_other: Template,
    pub skipped: Template,
    pub unknown: Template,
    pub milestone: Template,
    #[serde(rename = "milestoneScore")]
    pub milestone_score: Template,
    pub reset: Template,
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            dirty: truncated("EINRÄUMEN!"),
            your_turn: truncated("{NAME} DU BIST DRAN!"),
            point: truncated("{NAME} +1 PUNKT!"),
            point_other: truncated("DANKE {NAME} +1 PUNKT!"),
            skipped: truncated("{NAME} WURDE ÜBERSPRUNGEN!"),
            unknown: truncated("UNBEKANNT!"),
            milestone: truncated("GRATULIERE {NAME}!"),
            milestone_score: truncated("{SCORE} PUNKTE!"),
            reset: truncated("RESET!"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub version: u8,
    pub players: Vec<Player, MAX_PLAYERS>,
    #[serde(default)]
    pub turn: u8,
    #[serde(default, rename = "lastScorer")]
    pub last_scorer: Option<u8>,
    /// Maschine ist durchgelaufen und muss ausgeräumt werden
    #[serde(default, rename = "unloadReminder")]
    pub unload_reminder: bool,
    #[serde(default)]
    pub log: Vec<LogEntry, LOG_CAPACITY>,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub texts: Texts,
}

impl Default for GameState {
    fn default() -> Self {
        let mut players = Vec::new();
        for player in default_players() {
            let _ = players.push(player);
        }
        Self {
            version: STATE_VERSION,
            players,
            turn: 0,
            last_scorer: None,
            unload_reminder: false,
            log: Vec::new(),
            display: DisplayConfig::default(),
            sound: SoundConfig::default(),
            texts: Texts::default(),
        }
    }
}

impl GameState {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Bringt einen geladenen Stand in einen gültigen Zustand
    pub fn migrate(&mut self) {
        if self.players.is_empty() {
            self.players = GameState::default().players;
        }
        let n = self.players.len();
        if usize::from(self.turn) >= n {
            self.turn = 0;
        }
        if self.last_scorer.is_some_and(|p| usize::from(p) >= n) {
            self.last_scorer = None;
        }
        self.log.retain(|entry| usize::from(entry.player) < n);
        self.display.clamp();
        self.sound.volume = self.sound.volume.clamp(1, 5);
        self.version = STATE_VERSION;
    }

    /// Hängt einen Log-Eintrag an; ältester fällt bei vollem Log heraus
    pub fn push_log(&mut self, entry: LogEntry) {
        if self.log.is_full() {
            self.log.remove(0);
        }
        let _ = self.log.push(entry);
    }
}

fn rewards_from(pairs: &[(&str, &str)]) -> Rewards {
    let mut rewards = Rewards::new();
    for (key, text) in pairs {
        let _ = rewards.insert(truncated(key), truncated(text));
    }
    rewards
}

/// Belohnungen für neu angelegte Spieler
pub fn generic_rewards() -> Rewards {
    rewards_from(&[
        ("10", "Belohnung 🎁"),
        ("20", "Größere Belohnung 🌟"),
        ("50", "Super Belohnung! 🎉"),
        ("100", "Mega Belohnung!! 🏆"),
    ])
}

fn default_players() -> [Player; 4] {
    [
        Player::new("DAVID", "🔴").with_rewards(&[
            ("10", "Eis essen! 🍦"),
            ("20", "Extra Fernsehen 📺"),
            ("50", "Kleines Geschenk 🎁"),
            ("100", "Großer Ausflug! 🎢"),
        ]),
        Player::new("AMELIE", "🟢").with_rewards(&[
            ("10", "Lieblingskuchen backen 🧁"),
            ("20", "Film aussuchen 🎬"),
            ("50", "Freundin einladen 👯"),
            ("100", "Shopping Tour! 🛍"),
        ]),
        Player::new("JAMIE", "🔵").with_rewards(&[
            ("10", "Länger wach bleiben ⏰"),
            ("20", "Lieblingsessen 🍕"),
            ("50", "Neues Spielzeug 🎮"),
            ("100", "Freizeitpark! 🎡"),
        ]),
        Player::new("BABSI", "🟡").with_rewards(&[
            ("10", "Extra Süßigkeiten 🍭"),
            ("20", "Mama-Papa Zeit 👨‍👩‍👧‍👦"),
            ("50", "Kleiner Wunsch 💫"),
            ("100", "Großer Wunsch! ⭐"),
        ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster() {
        let state = GameState::default();
        assert_eq!(state.player_count(), 4);
        assert_eq!(state.players[0].name, "DAVID");
        assert_eq!(state.players[3].name, "BABSI");
        assert_eq!(state.players[1].rewards.len(), 4);
        assert_eq!(state.texts.your_turn, "{NAME} DU BIST DRAN!");
    }

    #[test]
    fn test_migrate_repairs_indices() {
        let mut state = GameState::default();
        state.version = 0;
        state.turn = 9;
        state.last_scorer = Some(7);
        state.sound.volume = 0;
        state.display.brightness = 99;
        state.migrate();
        assert_eq!(state.turn, 0);
        assert_eq!(state.last_scorer, None);
        assert_eq!(state.sound.volume, 1);
        assert_eq!(state.display.brightness, 15);
        assert_eq!(state.version, STATE_VERSION);
    }

    #[test]
    fn test_log_keeps_newest_entries() {
        let mut state = GameState::default();
        for i in 0..(LOG_CAPACITY as u64 + 5) {
            state.push_log(LogEntry { player: 0, at: i });
        }
        assert_eq!(state.log.len(), LOG_CAPACITY);
        assert_eq!(state.log[0].at, 5);
    }
}
