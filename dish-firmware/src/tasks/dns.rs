// Captive-DNS Task - UDP-Socket auf Port 53 im Access-Point-Modus
//
// Die Antworten baut der Scheduler (dish_core::dns); dieser Task
// reicht nur Datagramme zwischen Socket und Bridge-Kanälen durch.

use core::net::SocketAddrV4;

use defmt::{Debug2Format, debug, error, info, warn};
use embassy_futures::select::{Either, select};
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpAddress, IpEndpoint, Stack};
use embassy_time::{Duration, Timer};

use dish_core::config::DNS_PACKET_MAX;
use dish_core::dns::DNS_PORT;

use crate::bridge::{CAPTIVE_DNS, Datagram};
use crate::config::NAME_UDP_BUFFER_SIZE;

const RETRY_DELAY_SECS: u64 = 5;

/// Captive-DNS Task
///
/// Wartet, bis der Scheduler den Access Point öffnet, bindet dann Port 53
/// auf dem AP-Stack und bedient ihn für immer.
#[embassy_executor::task]
pub async fn captive_dns_task(stack: Stack<'static>) {
    let channels = &CAPTIVE_DNS;
    channels.open.wait().await;
    let port = DNS_PORT;

    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0u8; NAME_UDP_BUFFER_SIZE];
    let mut tx_buffer = [0u8; NAME_UDP_BUFFER_SIZE];
    let mut packet = [0u8; DNS_PACKET_MAX];

    loop {
        stack.wait_config_up().await;

        let mut socket = UdpSocket::new(
            stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );
        if let Err(e) = socket.bind(port) {
            error!("DNS: Bind on port {} failed: {}", port, Debug2Format(&e));
            Timer::after(Duration::from_secs(RETRY_DELAY_SECS)).await;
            continue;
        }
        info!("DNS: listening on port {}", port);

        loop {
            match select(socket.recv_from(&mut packet), channels.outbox.receive()).await {
                Either::First(Ok((len, meta))) => {
                    #[allow(irrefutable_let_patterns)]
                    let IpAddress::Ipv4(addr) = meta.endpoint.addr else {
                        continue;
                    };
                    let mut datagram = Datagram {
                        len,
                        data: [0; DNS_PACKET_MAX],
                        peer: SocketAddrV4::new(addr, meta.endpoint.port),
                    };
                    datagram.data[..len].copy_from_slice(&packet[..len]);
                    if channels.inbox.try_send(datagram).is_err() {
                        debug!("DNS: Inbox full, query dropped");
                    }
                }
                Either::First(Err(_)) => {
                    debug!("DNS: Oversized datagram dropped");
                }
                Either::Second(datagram) => {
                    let endpoint = IpEndpoint::new(
                        IpAddress::Ipv4(*datagram.peer.ip()),
                        datagram.peer.port(),
                    );
                    if let Err(e) = socket.send_to(datagram.payload(), endpoint).await {
                        warn!("DNS: Send failed: {}", Debug2Format(&e));
                    }
                }
            }
        }
    }
}
