// Firmware-Konfiguration: Pins, Puffer und Speicheraufteilung
//
// Spiel- und Protokollkonstanten liegen in `dish_core::config`.

use core::net::Ipv4Addr;
use core::ops::Range;

// ============================================================================
// Pin-Belegung (ESP32-C6 DevKit)
// ============================================================================
//
// Die Peripherals werden in main.rs direkt über ihre Namen angesprochen
// (`peripherals.GPIO6` usw.); die Nummern hier dienen der Dokumentation
// und dem Boot-Log.

/// MAX7219: SPI-Takt, Daten, Chip-Select
pub const DISPLAY_SCK_GPIO: u8 = 6;
pub const DISPLAY_MOSI_GPIO: u8 = 7;
pub const DISPLAY_CS_GPIO: u8 = 10;

/// R503: UART1 RX/TX und Touch-Ausgang (aktiv low)
pub const SENSOR_RX_GPIO: u8 = 4;
pub const SENSOR_TX_GPIO: u8 = 5;
pub const SENSOR_WAKE_GPIO: u8 = 3;

/// Taster gegen GND mit internem Pull-up
pub const FRONT_BUTTON_GPIO: u8 = 2;
pub const SIDE_BUTTON_GPIO: u8 = 11;

/// PIR-Bewegungsmelder, aktiv high
pub const MOTION_GPIO: u8 = 1;

/// Lautsprecher (LEDC-PWM) und Verstärker-Enable
pub const SPEAKER_GPIO: u8 = 18;
pub const AMP_ENABLE_GPIO: u8 = 19;

// ============================================================================
// Busse
// ============================================================================

/// SPI-Takt für die MAX7219-Kette (max. 10 MHz laut Datenblatt)
pub const DISPLAY_SPI_MHZ: u32 = 8;

/// Vorlaufzeit des Verstärkers vor dem ersten Ton
pub const AMP_WARMUP_MS: u32 = 80;

// ============================================================================
// Scheduler
// ============================================================================

/// Pause zwischen zwei Scheduler-Durchläufen
pub const SCHEDULER_TICK_MS: u32 = 5;

// ============================================================================
// Heap
// ============================================================================

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzlicher Heap für API-Anfragen und JSON-Antworten
pub const EXTRA_HEAP_SIZE: usize = 65536; // 64 KB

// ============================================================================
// WiFi
// ============================================================================

/// Eigene Adresse im Setup-Access-Point
pub const AP_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 4, 1);
pub const AP_PREFIX_LEN: u8 = 24;

/// Intervall, in dem der WiFi-Task Link und Adresse veröffentlicht
pub const RADIO_STATUS_INTERVAL_MS: u64 = 200;

/// Maximale Wartezeit auf ein Scan-Ergebnis
pub const SCAN_TIMEOUT_MS: u32 = 8_000;

/// Netze pro Scan (vor Deduplizierung)
pub const SCAN_CAPACITY: usize = 32;

// ============================================================================
// mDNS / Captive-DNS
// ============================================================================

pub const MDNS_PORT: u16 = 5353;
pub const MDNS_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// UDP TX/RX-Puffer des mDNS-Sockets
pub const MDNS_UDP_BUFFER_SIZE: usize = 512;

/// Paketpuffer von edge-mdns (Standard-MTU)
pub const MDNS_PACKET_BUFFER_SIZE: usize = 1500;

/// Pause vor dem Neustart des Responders nach einem Fehler
pub const MDNS_RETRY_DELAY_SECS: u64 = 5;

/// Abfrageintervall beim Warten auf Link und DHCP-Adresse
pub const NETWORK_POLL_MS: u64 = 500;

/// UDP-Puffer pro Richtung des Captive-DNS
pub const NAME_UDP_BUFFER_SIZE: usize = 1024;

/// Wartende Datagramme pro Richtung
pub const NAME_QUEUE_DEPTH: usize = 2;

// ============================================================================
// HTTP Server Konfiguration
// ============================================================================

pub const HTTP_PORT: u16 = 80;

/// Server-Instanzen pro Netzwerk-Stack (Station und Access Point)
pub const HTTP_TASKS_PER_STACK: usize = 2;

/// HTTP Buffer-Größe in Bytes
/// Muss den größten Request-Body aufnehmen (Restore mit komplettem Spielstand)
pub const HTTP_BUFFER_SIZE: usize = 8192;

/// TCP RX Buffer-Größe in Bytes
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
pub const TCP_TX_BUFFER_SIZE: usize = 1024;

/// Puffer für JSON-Strings mit Escape-Sequenzen
pub const JSON_UNESCAPE_BUFFER_SIZE: usize = 128;

/// Antwortpuffer (Snapshot enthält den kompletten Spielstand)
pub const RESPONSE_BUFFER_SIZE: usize = dish_core::config::STATE_BUFFER_SIZE + 1024;

// ============================================================================
// Flash-Ablage
// ============================================================================

/// Bereich für die sequential-storage Map (256 KB hinter der App-Partition)
pub const STORAGE_FLASH_RANGE: Range<u32> = 0x0040_0000..0x0044_0000;

/// Nutzdaten pro Flash-Eintrag; größere Dateien werden gestückelt
pub const STORAGE_CHUNK_SIZE: usize = 2048;

/// Maximale Länge eines Dateinamens als Schlüssel
pub const STORAGE_NAME_LEN: usize = 16;
