//! Dish Dash Core - Gerätelogik ohne Hardware
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Traits für die Hardware, die Zustandsautomaten für
//! Display, Tasten, Bewegungsmelder, Fingerabdrucksensor und WLAN sowie
//! die Spielregeln. `dish-firmware` implementiert die Traits für den ESP32,
//! `dish-tests` mit Mocks.

#![no_std]

pub(crate) mod log;

pub mod actions;
pub mod api;
pub mod audio;
pub mod buttons;
pub mod config;
pub mod context;
pub mod display;
pub mod dns;
pub mod error;
pub mod fingerprint;
pub mod game;
pub mod logic;
pub mod motion;
pub mod persist;
pub mod scheduler;
pub mod state;
pub mod time;
pub mod traits;
pub mod types;
pub mod wifi;

// Re-exports für einfachen Zugriff
pub use api::{ApiRequest, ApiResponse};
pub use buttons::{ButtonAction, ButtonId, GestureRecognizer};
pub use context::Parts;
pub use error::{BusError, ConnectivityError, GameError, PersistenceError, ProtocolError};
pub use game::{GameEngine, Reward};
pub use scheduler::Scheduler;
pub use state::GameState;
pub use time::Instant;
pub use traits::Platform;
