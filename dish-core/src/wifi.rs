//! WLAN-Verbindungsverwaltung
//!
//! Station-Modus mit Reconnect-Backoff, Fallback auf einen offenen Access
//! Point mit Captive Portal. Verbindungsversuche blockieren begrenzt und
//! rufen währenddessen `idle` auf, damit Display und Watchdog weiterlaufen.

use core::net::Ipv4Addr;

use heapless::Vec;

use crate::config::{
    AP_SSID, CONNECT_POLL_MS, HOSTNAME, MAX_NETWORKS, QUICK_CONNECT_TIMEOUT_MS,
    STATION_CONNECT_TIMEOUT_MS,
};
use crate::error::ConnectivityError;
use crate::log::{info, warn};
use crate::logic::{reconnect_delay_ms, signal_bars, truncated};
use crate::time::Instant;
use crate::traits::{Timebase, WifiRadio};
use crate::types::{NetworkConfig, ScanEntry, WifiCredentials, WifiMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WifiConnectionState {
    pub mode: WifiMode,
    pub failure_count: u32,
    pub last_attempt: Instant,
    pub current_ip: Option<Ipv4Addr>,
}

pub struct Connectivity<R> {
    radio: R,
    state: WifiConnectionState,
    networks: Vec<ScanEntry, MAX_NETWORKS>,
}

impl<R: WifiRadio> Connectivity<R> {
    pub fn new(radio: R, now: Instant) -> Self {
        Self {
            radio,
            state: WifiConnectionState {
                mode: WifiMode::Station,
                failure_count: 0,
                last_attempt: now,
                current_ip: None,
            },
            networks: Vec::new(),
        }
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    pub fn state(&self) -> &WifiConnectionState {
        &self.state
    }

    pub fn mode(&self) -> WifiMode {
        self.state.mode
    }

    pub fn current_ip(&self) -> Option<Ipv4Addr> {
        self.state.current_ip
    }

    /// Zwischengespeichertes Scan-Ergebnis für die Setup-Seite
    pub fn networks(&self) -> &[ScanEntry] {
        &self.networks
    }

    /// Verbindet als Station, wartet bis zu 20 s
    ///
    /// `idle` wird alle 50 ms aufgerufen (Display animieren, Watchdog).
    pub fn connect_station<T: Timebase>(
        &mut self,
        credentials: &WifiCredentials,
        network: &NetworkConfig,
        tb: &mut T,
        mut idle: impl FnMut(&mut T),
    ) -> Result<Ipv4Addr, ConnectivityError> {
        info!("WLAN: verbinde mit {}", credentials.ssid.as_str());
        self.state.mode = WifiMode::Station;
        self.state.last_attempt = tb.now();
        self.radio.set_hostname(HOSTNAME);

        let connected = self.radio.begin_station(&credentials.ssid, &credentials.password).is_ok()
            && self.wait_connected(STATION_CONNECT_TIMEOUT_MS, tb, &mut idle);

        if !connected {
            self.state.failure_count = self.state.failure_count.saturating_add(1);
            self.radio.stop_station();
            warn!("WLAN: Verbindung fehlgeschlagen ({} Fehlversuche)", self.state.failure_count);
            return Err(ConnectivityError::Timeout);
        }

        let ip = self.apply_addressing(network);
        self.state.failure_count = 0;
        self.state.current_ip = Some(ip);
        info!("WLAN: verbunden, IP {}", ip.octets());
        Ok(ip)
    }

    /// Prüft die Verbindung und versucht nach Backoff neu zu verbinden
    ///
    /// `None` wenn kein Versuch nötig oder noch nicht fällig war.
    pub fn check_reconnect<T: Timebase>(
        &mut self,
        credentials: &WifiCredentials,
        network: &NetworkConfig,
        tb: &mut T,
        idle: impl FnMut(&mut T),
    ) -> Option<Result<Ipv4Addr, ConnectivityError>> {
        if self.state.mode == WifiMode::AccessPoint || self.radio.is_connected() {
            return None;
        }
        let now = tb.now();
        if !now.exceeds(self.state.last_attempt, reconnect_delay_ms(self.state.failure_count)) {
            return None;
        }
        info!("WLAN: Reconnect-Versuch {}", self.state.failure_count + 1);
        Some(self.connect_station(credentials, network, tb, idle))
    }

    /// Kurzer Verbindungstest mit neuen Zugangsdaten (Setup-Seite)
    ///
    /// Die Station wird danach immer wieder abgeschaltet; das Gerät startet
    /// anschließend neu und verbindet sich regulär.
    pub fn quick_connect<T: Timebase>(
        &mut self,
        credentials: &WifiCredentials,
        network: &NetworkConfig,
        tb: &mut T,
    ) -> Option<Ipv4Addr> {
        info!("WLAN: Schnelltest {}", credentials.ssid.as_str());
        let ip = if self.radio.begin_station(&credentials.ssid, &credentials.password).is_ok()
            && self.wait_connected(QUICK_CONNECT_TIMEOUT_MS, tb, &mut |_: &mut T| {})
        {
            Some(self.apply_addressing(network))
        } else {
            None
        };
        self.radio.stop_station();
        ip
    }

    /// Scan, dann offener Access Point "DISH-DASH-Setup"
    pub fn start_access_point<T: Timebase>(&mut self, tb: &mut T) -> Result<Ipv4Addr, ConnectivityError> {
        self.state.mode = WifiMode::AccessPoint;
        tb.feed_watchdog();
        self.scan_networks();
        self.radio.stop_station();
        tb.feed_watchdog();

        let ip = self.radio.start_access_point(AP_SSID).inspect_err(|e| {
            warn!("WLAN: Access Point fehlgeschlagen: {:?}", e);
        })?;
        self.state.current_ip = Some(ip);
        info!("WLAN: Access Point {} aktiv, IP {}", AP_SSID, ip.octets());
        Ok(ip)
    }

    /// Sichtbare Netze: ohne Duplikate und leere SSIDs, alphabetisch
    pub fn scan_networks(&mut self) {
        let mut found: Vec<ScanEntry, MAX_NETWORKS> = Vec::new();
        let result = self.radio.scan(&mut |ssid, rssi| {
            let ssid = ssid.trim();
            if ssid.is_empty() || found.iter().any(|n| n.ssid == ssid) {
                return;
            }
            let _ = found.push(ScanEntry {
                ssid: truncated(ssid),
                bars: signal_bars(rssi),
            });
        });
        if let Err(e) = result {
            warn!("WLAN: Scan fehlgeschlagen: {:?}", e);
            found.clear();
        }

        found.sort_unstable_by(|a, b| {
            let a = a.ssid.chars().flat_map(char::to_lowercase);
            let b = b.ssid.chars().flat_map(char::to_lowercase);
            a.cmp(b)
        });
        info!("WLAN: {} Netzwerke gefunden", found.len());
        self.networks = found;
    }

    fn wait_connected<T: Timebase>(
        &mut self,
        timeout_ms: u32,
        tb: &mut T,
        idle: &mut impl FnMut(&mut T),
    ) -> bool {
        let started = tb.now();
        loop {
            if self.radio.is_connected() {
                return true;
            }
            if tb.now().reaches(started, timeout_ms) {
                return false;
            }
            tb.feed_watchdog();
            idle(tb);
            tb.delay_ms(CONNECT_POLL_MS);
        }
    }

    fn apply_addressing(&mut self, network: &NetworkConfig) -> Ipv4Addr {
        if let Some(ip) = network.static_address() {
            match self.radio.apply_static_address(network) {
                Ok(()) => return ip,
                Err(e) => warn!("WLAN: statische IP fehlgeschlagen: {:?}", e),
            }
        }
        self.radio.station_address().unwrap_or(Ipv4Addr::UNSPECIFIED)
    }
}
