// Task-Modul: Enthält alle Embassy Tasks
//
// Alle Tasks laufen im Interrupt-Executor, damit sie auch dann
// weiterarbeiten, wenn der Scheduler im Thread-Modus blockierend wartet.
// Mit dem Scheduler kommunizieren sie ausschließlich über `crate::bridge`.

pub mod dns;
pub mod http;
pub mod mdns;
pub mod wifi;

use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Ipv4Cidr, StackResources, StaticConfigV4};
use esp_radio::wifi::{Interfaces, WifiController};
use static_cell::StaticCell;

use crate::config::{AP_ADDRESS, AP_PREFIX_LEN, HTTP_TASKS_PER_STACK};

// Re-export Tasks für einfachen Import
pub use dns::captive_dns_task;
pub use http::http_server_task;
pub use mdns::mdns_responder_task;
pub use wifi::{connection_task, net_task};

/// Sockets pro Stack: HTTP-Listener + mDNS bzw. DNS + DHCP + Reserve
const SOCKETS_PER_STACK: usize = 6;

/// Meldet fehlgeschlagene Spawns statt zu paniken
fn spawned(result: Result<(), embassy_executor::SpawnError>, name: &str) {
    if result.is_err() {
        error!("Tasks: {} konnte nicht gestartet werden", name);
    }
}

/// Network Setup Task
///
/// Erstellt die beiden Netzwerk-Stacks und startet alle Netzwerk-Tasks
/// auf dem eigenen (Interrupt-)Executor:
/// - Station-Stack mit DHCP
/// - Access-Point-Stack mit fester Adresse 192.168.4.1/24
///
/// Stacks sind nicht `Send` und müssen auf diesem Executor entstehen.
#[embassy_executor::task]
pub async fn network_task(
    controller: WifiController<'static>,
    interfaces: Interfaces<'static>,
    seed: u64,
) {
    let spawner = Spawner::for_current_executor().await;

    static STA_RESOURCES: StaticCell<StackResources<SOCKETS_PER_STACK>> = StaticCell::new();
    static AP_RESOURCES: StaticCell<StackResources<SOCKETS_PER_STACK>> = StaticCell::new();

    let (sta_stack, sta_runner) = embassy_net::new(
        interfaces.sta,
        NetConfig::dhcpv4(Default::default()),
        STA_RESOURCES.init(StackResources::new()),
        seed,
    );
    let (ap_stack, ap_runner) = embassy_net::new(
        interfaces.ap,
        NetConfig::ipv4_static(StaticConfigV4 {
            address: Ipv4Cidr::new(AP_ADDRESS, AP_PREFIX_LEN),
            gateway: Some(AP_ADDRESS),
            dns_servers: Default::default(),
        }),
        AP_RESOURCES.init(StackResources::new()),
        seed.rotate_left(17),
    );

    spawned(spawner.spawn(net_task(sta_runner)), "net_task(sta)");
    spawned(spawner.spawn(net_task(ap_runner)), "net_task(ap)");
    spawned(
        spawner.spawn(connection_task(controller, sta_stack)),
        "connection_task",
    );
    spawned(
        spawner.spawn(mdns_responder_task(sta_stack)),
        "mdns_responder_task",
    );
    spawned(
        spawner.spawn(captive_dns_task(ap_stack)),
        "captive_dns_task",
    );
    for task_id in 0..HTTP_TASKS_PER_STACK {
        spawned(
            spawner.spawn(http_server_task(task_id, sta_stack)),
            "http_server_task(sta)",
        );
        spawned(
            spawner.spawn(http_server_task(HTTP_TASKS_PER_STACK + task_id, ap_stack)),
            "http_server_task(ap)",
        );
    }

    info!("Tasks: Netzwerk-Tasks gestartet");
}
