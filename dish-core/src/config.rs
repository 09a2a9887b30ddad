//! Feste Konstanten: Geometrie, Timing und Protokoll
//!
//! Laufzeit-Einstellungen (Helligkeit, Texte, Sound) liegen im
//! persistierten [`GameState`](crate::state::GameState), nicht hier.

// ============================================================================
// Display
// ============================================================================

/// Anzahl der kaskadierten MAX7219-Module
pub const MATRIX_MODULES: usize = 4;

/// Sichtbare Spalten (8 pro Modul)
pub const WINDOW_WIDTH: usize = MATRIX_MODULES * 8;

/// Maximale Spaltenzahl eines gerenderten Textes
pub const MAX_COLUMNS: usize = 640;

pub const DEFAULT_SCROLL_SPEED_MS: u32 = 30;
pub const MAX_SCROLL_SPEED_MS: u32 = 1_000;
pub const DEFAULT_SCROLL_COUNT: u8 = 2;
pub const DEFAULT_BRIGHTNESS: u8 = 5;
pub const MAX_BRIGHTNESS: u8 = 15;

/// Lauftext-Geschwindigkeit für den Boot-Banner
pub const BANNER_SCROLL_SPEED_MS: u32 = 35;

/// Lauftext-Geschwindigkeit während des WLAN-Verbindungsaufbaus
pub const CONNECT_SCROLL_SPEED_MS: u32 = 12;

// ============================================================================
// Eingaben
// ============================================================================

pub const LONG_PRESS_MS: u32 = 1_500;
pub const CLICK_SETTLE_MS: u32 = 400;
pub const COMBO_HOLD_MS: u32 = 3_000;

pub const DEFAULT_MOTION_TIMEOUT_S: u32 = 15;
/// Ein Tag; in Millisekunden muss der Wert in einen i32-Abstand passen
pub const MAX_MOTION_TIMEOUT_S: u32 = 86_400;

// ============================================================================
// Fingerabdrucksensor (R503, UART)
// ============================================================================

pub const FP_BAUDRATE: u32 = 57_600;
pub const FP_TURNAROUND_MS: u32 = 500;
pub const FP_POLL_INTERVAL_MS: u32 = 500;
pub const FP_COOLDOWN_MS: u32 = 3_000;

pub const ENROLL_FINGER_TIMEOUT_MS: u32 = 15_000;
pub const ENROLL_REMOVAL_TIMEOUT_MS: u32 = 10_000;
pub const ENROLL_SETTLE_MS: u32 = 500;

// ============================================================================
// Watchdog & Neustart
// ============================================================================

pub const WATCHDOG_TIMEOUT_MS: u32 = 30_000;

pub const REBOOT_AFTER_SETUP_OK_MS: u32 = 3_000;
pub const REBOOT_AFTER_SETUP_FAIL_MS: u32 = 1_500;
pub const REBOOT_AFTER_CONFIG_MS: u32 = 1_000;
pub const REBOOT_AFTER_REQUEST_MS: u32 = 500;
pub const REBOOT_AFTER_WIFI_RESET_MS: u32 = 2_000;

// ============================================================================
// WLAN
// ============================================================================

pub const STATION_CONNECT_TIMEOUT_MS: u32 = 20_000;
pub const QUICK_CONNECT_TIMEOUT_MS: u32 = 12_000;
pub const RECONNECT_BASE_MS: u32 = 30_000;
pub const RECONNECT_STEP_MS: u32 = 10_000;
pub const RECONNECT_MAX_MS: u32 = 120_000;

/// Granularität beim Warten auf die Verbindung (Display bleibt animiert)
pub const CONNECT_POLL_MS: u32 = 50;

pub const HOSTNAME: &str = "dishdash";
pub const AP_SSID: &str = "DISH-DASH-Setup";
pub const MAX_NETWORKS: usize = 16;

pub const DNS_TTL_S: u32 = 60;
pub const MDNS_TTL_S: u32 = 120;
pub const DNS_PACKET_MAX: usize = 512;

// ============================================================================
// Spielstand
// ============================================================================

pub const MAX_PLAYERS: usize = 8;

/// Namen werden auf 10 Zeichen gekürzt
pub const NAME_CHARS: usize = 10;

pub const LOG_CAPACITY: usize = 30;
pub const MAX_REWARDS: usize = 8;

/// Puffergröße für die JSON-Serialisierung des Spielstands
pub const STATE_BUFFER_SIZE: usize = 12_288;

/// Zwischenpuffer für Escape-Sequenzen beim Laden (längster String: 64 Bytes)
pub const UNESCAPE_BUFFER_SIZE: usize = 128;

pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");
