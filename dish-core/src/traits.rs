//! Hardware Abstraction Traits
//!
//! Diese Traits trennen die Gerätelogik von der konkreten Hardware.
//!
//! # Implementierungen
//! - **Production:** `dish-firmware` (esp-hal, esp-radio, embassy-net)
//! - **Testing:** Mocks in `dish-tests/tests/common`

use core::net::{Ipv4Addr, SocketAddrV4};

use crate::api::{ApiRequest, ApiResponse};
use crate::error::{BusError, ConnectivityError, PersistenceError};
use crate::time::Instant;
use crate::types::{InputLevels, NetworkConfig, Note};

/// Monotone Zeit, blockierendes Warten und Watchdog
///
/// Watchdog und Uhr sind zusammengelegt, weil jede längere Warteschleife
/// beides braucht.
pub trait Timebase {
    fn now(&self) -> Instant;

    /// Blockiert für `ms` Millisekunden
    fn delay_ms(&mut self, ms: u32);

    /// Setzt den Hardware-Watchdog zurück
    fn feed_watchdog(&mut self);

    /// Wanduhr in Sekunden (für Log-Zeitstempel); 0 wenn unbekannt
    fn wall_secs(&self) -> u64;
}

/// SPI-Bus zur MAX7219-Kette (inkl. Chip-Select)
pub trait DisplayBus {
    /// Schreibt einen kompletten Frame (2 Bytes pro Modul) in einer CS-Phase
    fn write(&mut self, frame: &[u8]) -> Result<(), BusError>;
}

/// UART zum Fingerabdrucksensor
pub trait SensorUart {
    fn write(&mut self, bytes: &[u8]) -> Result<(), BusError>;

    /// Liest verfügbare Bytes, blockiert nicht; gibt Anzahl zurück
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Verwirft alte Bytes im Empfangspuffer
    fn clear(&mut self) {
        let mut sink = [0u8; 32];
        for _ in 0..16 {
            if self.read(&mut sink) == 0 {
                break;
            }
        }
    }
}

pub trait InputPins {
    fn read(&mut self) -> InputLevels;
}

/// PWM-Lautsprecher
pub trait AudioSink {
    /// Spielt die Noten nacheinander mit dem gegebenen Duty-Cycle ab
    fn play(&mut self, notes: &[Note], duty: u16);
}

/// WLAN-Radio (Station und Access Point)
pub trait WifiRadio {
    fn set_hostname(&mut self, hostname: &str);

    /// Startet den Verbindungsaufbau, wartet nicht auf das Ergebnis
    fn begin_station(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;

    fn is_connected(&mut self) -> bool;

    /// Aktuelle Station-Adresse (DHCP oder statisch)
    fn station_address(&mut self) -> Option<Ipv4Addr>;

    fn apply_static_address(&mut self, config: &NetworkConfig) -> Result<(), ConnectivityError>;

    fn stop_station(&mut self);

    /// Ruft `found(ssid, rssi)` für jedes sichtbare Netz auf
    fn scan(&mut self, found: &mut dyn FnMut(&str, i8)) -> Result<(), ConnectivityError>;

    /// Startet einen offenen Access Point, gibt die eigene Adresse zurück
    fn start_access_point(&mut self, ssid: &str) -> Result<Ipv4Addr, ConnectivityError>;
}

/// Nicht-blockierender UDP-Socket für Captive-DNS (Port 53, nur AP-Modus)
pub trait NameService {
    /// Bindet den Socket; `false` wenn das fehlschlägt
    fn open(&mut self) -> bool;

    /// Holt höchstens ein wartendes Datagramm ab
    fn receive(&mut self, buf: &mut [u8]) -> Option<(usize, SocketAddrV4)>;

    fn send(&mut self, bytes: &[u8], to: SocketAddrV4);
}

/// Flache Dateiablage für JSON-Dateien
pub trait FileSystem {
    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, PersistenceError>;
    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), PersistenceError>;
    fn remove(&mut self, name: &str) -> Result<(), PersistenceError>;
    fn rename(&mut self, from: &str, to: &str) -> Result<(), PersistenceError>;
}

pub trait SystemControl {
    /// Software-Reset; kehrt auf echter Hardware nicht zurück
    fn reset(&mut self);
}

/// Brücke zur HTTP-API: Anfragen abholen, Antworten zurückgeben
pub trait RequestSource {
    fn poll(&mut self) -> Option<ApiRequest>;
    fn reply(&mut self, response: ApiResponse<'_>);
}

/// Bündelt alle Hardware-Typen einer Plattform
pub trait Platform {
    type Timebase: Timebase;
    type Display: DisplayBus;
    type Sensor: SensorUart;
    type Inputs: InputPins;
    type Audio: AudioSink;
    type Radio: WifiRadio;
    type Names: NameService;
    type Fs: FileSystem;
    type System: SystemControl;
    type Requests: RequestSource;
}
