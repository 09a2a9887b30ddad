// WiFi Task - Führt die Befehle des Schedulers am Radio aus
use defmt::{Debug2Format, error, info, warn};
use embassy_futures::select::{Either, select};
use embassy_net::{ConfigV4, DhcpConfig, Ipv4Cidr, Runner, Stack, StaticConfigV4};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{
    AccessPointConfig, ClientConfig, ModeConfig, ScanConfig, WifiController, WifiDevice,
};
use heapless::String;

use dish_core::config::{AP_SSID, HOSTNAME};
use dish_core::types::NetworkConfig;

use crate::bridge::{
    RADIO_COMMANDS, RadioCommand, RadioStatus, SCAN_RESULTS, ScanList, publish_radio_status,
};
use crate::config::RADIO_STATUS_INTERVAL_MS;

/// DHCP-Konfiguration mit Hostname (für Router-Listen)
fn dhcp_config(hostname: &str) -> ConfigV4 {
    let mut config = DhcpConfig::default();
    config.hostname = hostname.try_into().ok();
    ConfigV4::Dhcp(config)
}

fn static_config(network: &NetworkConfig) -> ConfigV4 {
    let mut config = StaticConfigV4 {
        address: Ipv4Cidr::new(network.ip.into(), network.prefix_len()),
        gateway: Some(network.gateway.into()),
        dns_servers: Default::default(),
    };
    let _ = config.dns_servers.push(network.dns.into());
    ConfigV4::Static(config)
}

/// WiFi Connection Task
///
/// Besitzt den `WifiController` und den Station-Stack:
/// - Führt `RadioCommand`s aus (Station, statische IP, Scan, Access Point)
/// - Veröffentlicht alle 200 ms Link-Zustand und Adresse
///
/// Wann verbunden oder neu verbunden wird, entscheidet allein der Scheduler.
#[embassy_executor::task]
pub async fn connection_task(mut controller: WifiController<'static>, sta: Stack<'static>) {
    info!("WiFi: Starting connection task");
    let mut hostname: String<32> = String::new();
    let _ = hostname.push_str(HOSTNAME);

    loop {
        match select(
            RADIO_COMMANDS.receive(),
            Timer::after(Duration::from_millis(RADIO_STATUS_INTERVAL_MS)),
        )
        .await
        {
            Either::First(command) => match command {
                RadioCommand::Hostname(name) => {
                    hostname = name;
                    sta.set_config_v4(dhcp_config(&hostname));
                }
                RadioCommand::Station { ssid, password } => {
                    sta.set_config_v4(dhcp_config(&hostname));
                    let config = ModeConfig::Client(
                        ClientConfig::default()
                            .with_ssid(ssid.as_str().into())
                            .with_password(password.as_str().into()),
                    );
                    if restart(&mut controller, &config).await {
                        info!("WiFi: Connecting to '{}'...", ssid.as_str());
                        match controller.connect_async().await {
                            Ok(_) => info!("WiFi: Connected successfully!"),
                            Err(e) => error!("WiFi: Connection failed: {}", Debug2Format(&e)),
                        }
                    }
                }
                RadioCommand::StaticAddress(network) => {
                    info!("WiFi: Static address {}", network.ip);
                    sta.set_config_v4(static_config(&network));
                }
                RadioCommand::StopStation => {
                    if matches!(controller.is_connected(), Ok(true)) {
                        let _ = controller.disconnect_async().await;
                    }
                }
                RadioCommand::Scan => scan(&mut controller).await,
                RadioCommand::AccessPoint => {
                    let config =
                        ModeConfig::AccessPoint(AccessPointConfig::default().with_ssid(AP_SSID.into()));
                    if restart(&mut controller, &config).await {
                        info!("WiFi: Access point '{}' started", AP_SSID);
                    }
                }
            },
            Either::Second(()) => {}
        }

        let address = sta.config_v4().map(|config| config.address.address());
        publish_radio_status(RadioStatus {
            connected: matches!(controller.is_connected(), Ok(true))
                && sta.is_link_up()
                && address.is_some(),
            address,
        });
    }
}

/// Stoppt das Radio, setzt die neue Betriebsart und startet es wieder
async fn restart(controller: &mut WifiController<'static>, config: &ModeConfig) -> bool {
    if matches!(controller.is_started(), Ok(true)) {
        let _ = controller.stop_async().await;
    }
    if let Err(e) = controller.set_config(config) {
        error!("WiFi: Failed to set configuration: {}", Debug2Format(&e));
        return false;
    }
    if let Err(e) = controller.start_async().await {
        error!("WiFi: Failed to start: {}", Debug2Format(&e));
        return false;
    }
    true
}

/// Scan im Station-Modus; startet das Radio bei Bedarf
async fn scan(controller: &mut WifiController<'static>) {
    if !matches!(controller.is_started(), Ok(true))
        && !restart(controller, &ModeConfig::Client(ClientConfig::default())).await
    {
        SCAN_RESULTS.signal(ScanList::new());
        return;
    }

    let mut list = ScanList::new();
    match controller
        .scan_with_config_async(ScanConfig::default())
        .await
    {
        Ok(ap_infos) => {
            info!("WiFi: Found {} access points", ap_infos.len());
            for ap_info in &ap_infos {
                let mut ssid = String::new();
                if ssid.push_str(ap_info.ssid.as_str()).is_ok()
                    && list.push((ssid, ap_info.signal_strength)).is_err()
                {
                    break;
                }
            }
        }
        Err(e) => warn!("WiFi: Scan failed: {}", Debug2Format(&e)),
    }
    SCAN_RESULTS.signal(list);
}

/// Network Task
///
/// Überwacht einen Netzwerk-Stack (Station oder Access Point):
/// - Prozessiert Netzwerk-Pakete
/// - Managed TCP/IP Stack
#[embassy_executor::task(pool_size = 2)]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}
