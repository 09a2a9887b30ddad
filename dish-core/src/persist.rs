//! JSON-Dateien auf der Flash-Ablage
//!
//! Der Spielstand wird atomar geschrieben: erst `state.tmp`, dann altes
//! `state.json` löschen, dann umbenennen. Beim Laden wird zuerst
//! `state.json`, dann `state.tmp` versucht, danach gelten die Defaults.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{STATE_BUFFER_SIZE, UNESCAPE_BUFFER_SIZE};
use crate::error::PersistenceError;
use crate::log::{info, warn};
use crate::state::GameState;
use crate::traits::FileSystem;
use crate::types::{NetworkConfig, WifiCredentials};

pub const STATE_FILE: &str = "state.json";
pub const STATE_TMP_FILE: &str = "state.tmp";
pub const WIFI_FILE: &str = "wifi.json";
pub const NETWORK_FILE: &str = "network.json";

pub struct JsonStore<F> {
    fs: F,
    buf: [u8; STATE_BUFFER_SIZE],
    unescape: [u8; UNESCAPE_BUFFER_SIZE],
}

impl<F: FileSystem> JsonStore<F> {
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            buf: [0; STATE_BUFFER_SIZE],
            unescape: [0; UNESCAPE_BUFFER_SIZE],
        }
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    /// Lädt den Spielstand; ohne lesbare Datei werden Defaults gespeichert
    pub fn load_state(&mut self) -> GameState {
        for name in [STATE_FILE, STATE_TMP_FILE] {
            match self.load::<GameState>(name) {
                Ok(mut state) => {
                    state.migrate();
                    info!("State geladen aus {}", name);
                    return state;
                }
                Err(e) => warn!("{} nicht lesbar: {:?}", name, e),
            }
        }
        info!("Kein State, verwende Defaults");
        let state = GameState::default();
        if let Err(e) = self.save_state(&state) {
            warn!("Defaults speichern fehlgeschlagen: {:?}", e);
        }
        state
    }

    pub fn save_state(&mut self, state: &GameState) -> Result<(), PersistenceError> {
        let len = self.encode(state)?;
        self.fs.write(STATE_TMP_FILE, &self.buf[..len])?;
        match self.fs.remove(STATE_FILE) {
            Ok(()) | Err(PersistenceError::NotFound) => {}
            Err(e) => return Err(e),
        }
        self.fs.rename(STATE_TMP_FILE, STATE_FILE)
    }

    pub fn load_wifi(&mut self) -> Option<WifiCredentials> {
        self.load::<WifiCredentials>(WIFI_FILE)
            .ok()
            .filter(|c| !c.ssid.is_empty())
    }

    pub fn save_wifi(&mut self, credentials: &WifiCredentials) -> Result<(), PersistenceError> {
        self.save(WIFI_FILE, credentials)
    }

    pub fn clear_wifi(&mut self) {
        let _ = self.fs.remove(WIFI_FILE);
    }

    pub fn load_network(&mut self) -> NetworkConfig {
        self.load(NETWORK_FILE).unwrap_or_default()
    }

    pub fn save_network(&mut self, config: &NetworkConfig) -> Result<(), PersistenceError> {
        self.save(NETWORK_FILE, config)
    }

    /// Löscht Spielstand, Zugangsdaten und Netzwerkeinstellungen
    pub fn factory_reset(&mut self) {
        for name in [STATE_FILE, STATE_TMP_FILE, WIFI_FILE, NETWORK_FILE] {
            if self.fs.remove(name).is_ok() {
                info!("Gelöscht: {}", name);
            }
        }
    }

    fn load<T: DeserializeOwned>(&mut self, name: &str) -> Result<T, PersistenceError> {
        let len = self.fs.read(name, &mut self.buf)?;
        // Escapes (\", \\, \uXXXX) zurückwandeln, sonst wachsen Texte mit jedem Speichern
        let (value, _) =
            serde_json_core::from_slice_escaped::<T>(&self.buf[..len], &mut self.unescape)
                .map_err(|_| PersistenceError::Corrupt)?;
        Ok(value)
    }

    fn save<T: Serialize>(&mut self, name: &str, value: &T) -> Result<(), PersistenceError> {
        let len = self.encode(value)?;
        self.fs.write(name, &self.buf[..len])
    }

    fn encode<T: Serialize>(&mut self, value: &T) -> Result<usize, PersistenceError> {
        serde_json_core::to_slice(value, &mut self.buf).map_err(|_| PersistenceError::Encode)
    }
}
