//! Gemeinsame Datentypen ohne Hardware-Dependencies

use core::net::Ipv4Addr;

use heapless::String;
use serde::{Deserialize, Serialize};

// ============================================================================
// Eingänge
// ============================================================================

/// Momentaufnahme aller digitalen Eingänge eines Scheduler-Durchlaufs
///
/// Alle Felder sind bereits auf "aktiv = true" normiert; die Invertierung
/// der Pull-ups erledigt die Plattform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputLevels {
    pub front: bool,
    pub side: bool,
    pub motion: bool,
    /// Touch-Ring des Fingerabdrucksensors meldet Berührung
    pub finger_touch: bool,
}

// ============================================================================
// Audio
// ============================================================================

/// Ein Ton einer Melodie; `freq_hz == 0` ist eine Pause
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Note {
    pub freq_hz: u16,
    pub duration_ms: u16,
}

impl Note {
    pub const fn tone(freq_hz: u16, duration_ms: u16) -> Self {
        Self {
            freq_hz,
            duration_ms,
        }
    }

    pub const fn rest(duration_ms: u16) -> Self {
        Self::tone(0, duration_ms)
    }

    pub const fn is_rest(&self) -> bool {
        self.freq_hz == 0
    }
}

// ============================================================================
// Netzwerk
// ============================================================================

pub type Ssid = String<32>;
pub type Passphrase = String<64>;

/// Gespeicherte WLAN-Zugangsdaten (`wifi.json`)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: Ssid,
    #[serde(default)]
    pub password: Passphrase,
}

/// Statische IP oder DHCP (`network.json`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub dhcp: bool,
    pub ip: [u8; 4],
    pub gateway: [u8; 4],
    pub subnet: [u8; 4],
    pub dns: [u8; 4],
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            dhcp: true,
            ip: [0; 4],
            gateway: [0; 4],
            subnet: [255, 255, 255, 0],
            dns: [8, 8, 8, 8],
        }
    }
}

impl NetworkConfig {
    /// Statische Adresse, falls konfiguriert
    pub fn static_address(&self) -> Option<Ipv4Addr> {
        if self.dhcp || self.ip == [0; 4] {
            None
        } else {
            Some(Ipv4Addr::from(self.ip))
        }
    }

    /// Präfixlänge der Subnetzmaske (255.255.255.0 → 24)
    pub fn prefix_len(&self) -> u8 {
        u32::from_be_bytes(self.subnet).leading_ones() as u8
    }
}

/// Betriebsart des WLAN
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiMode {
    Station,
    AccessPoint,
}

/// Ein Eintrag des Scan-Caches für die Setup-Seite
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScanEntry {
    pub ssid: Ssid,
    /// Signalstärke als 1..=4 Balken
    pub bars: u8,
}
