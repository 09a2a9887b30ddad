// HTTP-Protokoll-Definitionen
// JSON-Bodies der API-Anfragen (Browser → ESP32)
//
// Die Antworten serialisiert dish_core::api::ApiResponse selbst.

use dish_core::api::ApiRequest;
use dish_core::config::MAX_PLAYERS;
use dish_core::state::{Avatar, Name, Rewards};
use heapless::{String, Vec};
use serde::Deserialize;

/// `{"player": 2}` für Punkte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PlayerBody {
    #[serde(default)]
    pub player: u8,
}

/// `{"slot": 1}` für Anlernen und Löschen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SlotBody {
    #[serde(default)]
    pub slot: u8,
}

/// Setzt das Registriert-Flag ohne den Sensor anzufassen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FingerprintFlagBody {
    #[serde(default)]
    pub slot: u8,
    #[serde(default)]
    pub registered: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamesBody {
    pub names: Vec<Name, MAX_PLAYERS>,
    #[serde(default)]
    pub avatars: Option<Vec<Avatar, MAX_PLAYERS>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RewardsBody {
    #[serde(default)]
    pub player: u8,
    pub rewards: Rewards,
}

/// Virtueller Tastendruck, z.B. `{"action": "front_2"}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ButtonBody {
    pub action: String<16>,
}

impl From<NamesBody> for ApiRequest {
    fn from(body: NamesBody) -> Self {
        ApiRequest::SetNames {
            names: body.names,
            avatars: body.avatars,
        }
    }
}

impl From<RewardsBody> for ApiRequest {
    fn from(body: RewardsBody) -> Self {
        ApiRequest::SetRewards {
            player: body.player,
            rewards: body.rewards,
        }
    }
}

impl From<FingerprintFlagBody> for ApiRequest {
    fn from(body: FingerprintFlagBody) -> Self {
        ApiRequest::SetFingerprintFlag {
            slot: body.slot,
            registered: body.registered,
        }
    }
}
