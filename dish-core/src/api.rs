//! Anfragen der HTTP-Schicht an den Scheduler und die Antworten darauf
//!
//! Jede Anfrage wird vollständig innerhalb eines Scheduler-Durchlaufs
//! ausgeführt. Einzige Ausnahme ist das Anlernen eines Fingers: die
//! Antwort kommt erst, wenn die Sitzung beendet ist.

use core::fmt::Write;
use core::net::Ipv4Addr;

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::buttons::ButtonAction;
use crate::config::{HOSTNAME, MAX_PLAYERS};
use crate::error::PersistenceError;
use crate::game::Reward;
use crate::state::{Avatar, GameState, Name, Rewards, SoundConfig, Template, Texts};
use crate::types::{NetworkConfig, ScanEntry, WifiCredentials, WifiMode};

/// Teil-Update der Display-Einstellungen; fehlende Felder bleiben
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayUpdate {
    pub brightness: Option<u8>,
    #[serde(rename = "scrollSpeed")]
    pub scroll_speed_ms: Option<u32>,
    #[serde(rename = "scrollCount")]
    pub scroll_count: Option<u8>,
    #[serde(rename = "motionTimeout")]
    pub motion_timeout_s: Option<u32>,
    #[serde(rename = "pirEnabled")]
    pub motion_enabled: Option<bool>,
}

/// Teil-Update der Anzeigetexte
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextsUpdate {
    pub dirty: Option<Template>,
    #[serde(rename = "yourTurn")]
    pub your_turn: Option<Template>,
    pub point: Option<Template>,
    #[serde(rename = "pointOther")]
    pub point_other: Option<Template>,
    pub skipped: Option<Template>,
    pub unknown: Option<Template>,
    pub milestone: Option<Template>,
    #[serde(rename = "milestoneScore")]
    pub milestone_score: Option<Template>,
    pub reset: Option<Template>,
}

impl TextsUpdate {
    pub fn apply(self, texts: &mut Texts) {
        let fields = [
            (self.dirty, &mut texts.dirty),
            (self.your_turn, &mut texts.your_turn),
            (self.point, &mut texts.point),
            (self.point_other, &mut texts.point_other),
            (self.skipped, &mut texts.skipped),
            (self.unknown, &mut texts.unknown),
            (self.milestone, &mut texts.milestone),
            (self.milestone_score, &mut texts.milestone_score),
            (self.reset, &mut texts.reset),
        ];
        for (update, text) in fields {
            if let Some(update) = update {
                *text = update;
            }
        }
    }
}

/// Teil-Update der Sound-Einstellungen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SoundUpdate {
    pub enabled: Option<bool>,
    pub volume: Option<u8>,
    #[serde(rename = "onStart")]
    pub on_start: Option<bool>,
    #[serde(rename = "onScore")]
    pub on_score: Option<bool>,
    #[serde(rename = "onMilestone")]
    pub on_milestone: Option<bool>,
}

impl SoundUpdate {
    pub fn apply(self, sound: &mut SoundConfig) {
        if let Some(enabled) = self.enabled {
            sound.enabled = enabled;
        }
        if let Some(volume) = self.volume {
            sound.volume = volume.clamp(1, 5);
        }
        if let Some(on_start) = self.on_start {
            sound.on_start = on_start;
        }
        if let Some(on_score) = self.on_score {
            sound.on_score = on_score;
        }
        if let Some(on_milestone) = self.on_milestone {
            sound.on_milestone = on_milestone;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ApiRequest {
    Score { player: u8 },
    Start,
    Skip,
    Reset,
    SetNames {
        names: Vec<Name, MAX_PLAYERS>,
        avatars: Option<Vec<Avatar, MAX_PLAYERS>>,
    },
    SetTexts(TextsUpdate),
    SetDisplay(DisplayUpdate),
    SetSound(SoundUpdate),
    SetRewards { player: u8, rewards: Rewards },
    EnrollFingerprint { slot: u8 },
    DeleteFingerprint { slot: u8 },
    SetFingerprintFlag { slot: u8, registered: bool },
    FingerprintCount,
    Button(ButtonAction),
    Snapshot,
    CurrentIp,
    Restore(GameState),
    SetWifi(WifiCredentials),
    SetNetwork(NetworkConfig),
    /// Zugangsdaten testen, speichern und neu starten
    SetupWifi(WifiCredentials),
    ScanResults,
    FactoryReset,
    Reboot,
    SoundTest,
}

/// Zusätzliche Laufzeitdaten zum Spielstand
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DeviceStatus {
    pub mode: WifiMode,
    pub ip: [u8; 4],
    #[serde(rename = "wifiFailures")]
    pub wifi_failures: u32,
    #[serde(rename = "uptimeS")]
    pub uptime_s: u32,
    #[serde(rename = "displayActive")]
    pub display_active: bool,
    pub enrolling: bool,
}

/// Spielstand plus Gerätestatus als eine JSON-Antwort
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Snapshot<'a> {
    pub state: &'a GameState,
    pub status: DeviceStatus,
    pub version: &'static str,
}

#[derive(Debug)]
pub enum ApiResponse<'a> {
    Ok,
    /// Ungültiger Index oder unzulässige Anfrage
    Rejected,
    Scored(Option<Reward>),
    Enrolled(bool),
    Deleted(bool),
    Count(u16),
    Ip(Option<Ipv4Addr>),
    Snapshot(Snapshot<'a>),
    Networks(&'a [ScanEntry]),
    /// Ergebnis des Verbindungstests; Gerät startet danach neu
    Setup(Option<Ipv4Addr>),
}

// ============================================================================
// JSON-Antworten
// ============================================================================

#[derive(Serialize)]
struct OkBody {
    ok: bool,
}

#[derive(Serialize)]
struct RewardBody<'a> {
    player: u8,
    score: u32,
    text: &'a str,
}

#[derive(Serialize)]
struct ScoredBody<'a> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reward: Option<RewardBody<'a>>,
}

#[derive(Serialize)]
struct EnrolledBody {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

#[derive(Serialize)]
struct CountBody {
    ok: bool,
    count: u16,
}

#[derive(Serialize)]
struct IpBody<'a> {
    ip: &'a str,
    local: &'a str,
}

#[derive(Serialize)]
struct NetworksBody<'a> {
    networks: &'a [ScanEntry],
}

#[derive(Serialize)]
struct SetupBody<'a> {
    ok: bool,
    ip: &'a str,
}

/// Punktnotation, leer wenn keine Adresse
fn dotted(ip: Option<Ipv4Addr>) -> String<16> {
    let mut out = String::new();
    if let Some(ip) = ip {
        let _ = write!(out, "{}", ip);
    }
    out
}

fn encode<T: Serialize>(value: &T, buf: &mut [u8]) -> Result<usize, PersistenceError> {
    serde_json_core::to_slice(value, buf).map_err(|_| PersistenceError::Encode)
}

impl ApiResponse<'_> {
    /// Abgelehnte Anfragen beantwortet die HTTP-Schicht mit 400
    pub fn is_rejected(&self) -> bool {
        matches!(self, ApiResponse::Rejected)
    }

    /// Schreibt den JSON-Body nach `buf` und gibt die Länge zurück
    pub fn write_json(&self, buf: &mut [u8]) -> Result<usize, PersistenceError> {
        match self {
            ApiResponse::Ok => encode(&OkBody { ok: true }, buf),
            ApiResponse::Rejected => encode(&OkBody { ok: false }, buf),
            ApiResponse::Deleted(ok) => encode(&OkBody { ok: *ok }, buf),
            ApiResponse::Scored(reward) => encode(
                &ScoredBody {
                    ok: true,
                    reward: reward.as_ref().map(|r| RewardBody {
                        player: r.player,
                        score: r.score,
                        text: r.text.as_str(),
                    }),
                },
                buf,
            ),
            ApiResponse::Enrolled(true) => encode(
                &EnrolledBody {
                    ok: true,
                    message: Some("enrolled"),
                    error: None,
                },
                buf,
            ),
            ApiResponse::Enrolled(false) => encode(
                &EnrolledBody {
                    ok: false,
                    message: None,
                    error: Some("Registrierung fehlgeschlagen"),
                },
                buf,
            ),
            ApiResponse::Count(count) => encode(
                &CountBody {
                    ok: true,
                    count: *count,
                },
                buf,
            ),
            ApiResponse::Ip(ip) => {
                let ip = dotted(*ip);
                let mut local: String<40> = String::new();
                let _ = write!(local, "{}.local", HOSTNAME);
                encode(
                    &IpBody {
                        ip: ip.as_str(),
                        local: local.as_str(),
                    },
                    buf,
                )
            }
            ApiResponse::Snapshot(snapshot) => encode(snapshot, buf),
            ApiResponse::Networks(networks) => encode(&NetworksBody { networks: *networks }, buf),
            ApiResponse::Setup(ip) => {
                let ip = dotted(*ip);
                encode(
                    &SetupBody {
                        ok: true,
                        ip: ip.as_str(),
                    },
                    buf,
                )
            }
        }
    }
}

/// Laufende Nummer einer Anfrage
///
/// Bricht ein HTTP-Task das Warten ab, darf die späte Antwort nicht beim
/// nächsten Aufrufer landen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ticket(u32);

impl Ticket {
    pub const FIRST: Self = Self(0);

    /// Zählt zyklisch weiter
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Anfrage oder Antwort samt Nummer
#[derive(Debug)]
pub struct Tagged<T> {
    pub ticket: Ticket,
    pub value: T,
}

impl<T> Tagged<T> {
    /// Wert nur herausgeben, wenn er zu `expected` gehört
    pub fn accept(self, expected: Ticket) -> Option<T> {
        (self.ticket == expected).then_some(self.value)
    }
}
