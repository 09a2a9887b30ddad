// WifiRadio-Implementierung des Scheduler-Threads
//
// Befehle gehen über RADIO_COMMANDS an den WiFi-Task, der Zustand kommt
// über RADIO_STATUS zurück. Kein Aufruf blockiert außer `scan`.

use core::net::Ipv4Addr;

use dish_core::error::ConnectivityError;
use dish_core::traits::WifiRadio;
use dish_core::types::{NetworkConfig, Passphrase, Ssid};
use esp_hal::delay::Delay;
use heapless::String;

use crate::bridge::{
    RADIO_COMMANDS, RadioCommand, RadioStatus, SCAN_RESULTS, publish_radio_status, radio_status,
};
use crate::config::{AP_ADDRESS, SCAN_TIMEOUT_MS};

const SCAN_POLL_MS: u32 = 50;

pub struct RadioBridge {
    delay: Delay,
}

impl RadioBridge {
    pub fn new() -> Self {
        Self {
            delay: Delay::new(),
        }
    }

    fn send(&self, command: RadioCommand) -> Result<(), ConnectivityError> {
        RADIO_COMMANDS.try_send(command).map_err(|_| {
            defmt::warn!("WiFi: Befehlswarteschlange voll");
            ConnectivityError::Radio
        })
    }
}

impl Default for RadioBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl WifiRadio for RadioBridge {
    fn set_hostname(&mut self, hostname: &str) {
        let mut name = String::new();
        if name.push_str(hostname).is_ok() {
            let _ = self.send(RadioCommand::Hostname(name));
        }
    }

    fn begin_station(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        let ssid = Ssid::try_from(ssid).map_err(|_| ConnectivityError::Radio)?;
        let password = Passphrase::try_from(password).map_err(|_| ConnectivityError::Radio)?;
        publish_radio_status(RadioStatus::default());
        self.send(RadioCommand::Station { ssid, password })
    }

    fn is_connected(&mut self) -> bool {
        radio_status().connected
    }

    fn station_address(&mut self) -> Option<Ipv4Addr> {
        let status = radio_status();
        if status.connected { status.address } else { None }
    }

    fn apply_static_address(&mut self, config: &NetworkConfig) -> Result<(), ConnectivityError> {
        self.send(RadioCommand::StaticAddress(*config))
    }

    fn stop_station(&mut self) {
        publish_radio_status(RadioStatus::default());
        let _ = self.send(RadioCommand::StopStation);
    }

    fn scan(&mut self, found: &mut dyn FnMut(&str, i8)) -> Result<(), ConnectivityError> {
        SCAN_RESULTS.reset();
        self.send(RadioCommand::Scan)?;

        let mut waited = 0;
        while waited < SCAN_TIMEOUT_MS {
            if let Some(list) = SCAN_RESULTS.try_take() {
                for (ssid, rssi) in &list {
                    found(ssid.as_str(), *rssi);
                }
                return Ok(());
            }
            self.delay.delay_millis(SCAN_POLL_MS);
            waited += SCAN_POLL_MS;
        }
        defmt::warn!("WiFi: Scan ohne Ergebnis");
        Err(ConnectivityError::Timeout)
    }

    fn start_access_point(&mut self, _ssid: &str) -> Result<Ipv4Addr, ConnectivityError> {
        publish_radio_status(RadioStatus::default());
        self.send(RadioCommand::AccessPoint)?;
        Ok(AP_ADDRESS)
    }
}
