// mDNS Responder Task - dishdash.local im Heimnetz
//
// Beantwortet A-Anfragen für `<HOSTNAME>.local` auf dem Station-Stack.
// Protokoll und Paketbau übernimmt edge-mdns, edge-nal-embassy verbindet
// es mit embassy-net.

use core::net::{Ipv4Addr, SocketAddr};
use core::sync::atomic::{AtomicU32, Ordering};

use defmt::{Debug2Format, error, info, warn};
use edge_mdns::{HostAnswersMdnsHandler, buf::VecBufAccess, domain::base::Ttl, host::Host, io};
use edge_nal::{MulticastV4, UdpBind, UdpSplit};
use edge_nal_embassy::{Udp, UdpBuffers};
use embassy_net::Stack;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;

use dish_core::config::{HOSTNAME, MDNS_TTL_S};

use crate::config::{
    MDNS_MULTICAST_ADDR, MDNS_PACKET_BUFFER_SIZE, MDNS_PORT, MDNS_RETRY_DELAY_SECS,
    MDNS_UDP_BUFFER_SIZE, NETWORK_POLL_MS,
};

type MdnsUdpBuffers = UdpBuffers<1, MDNS_UDP_BUFFER_SIZE, MDNS_UDP_BUFFER_SIZE>;

/// Zähler statt Zufall: mDNS braucht nur eindeutige IDs
static RNG_COUNTER: AtomicU32 = AtomicU32::new(0);

fn mdns_rng(buf: &mut [u8]) {
    let mut counter = RNG_COUNTER.fetch_add(1, Ordering::Relaxed);
    for chunk in buf.chunks_mut(4) {
        let bytes = counter.to_le_bytes();
        let len = chunk.len();
        chunk.copy_from_slice(&bytes[..len]);
        counter = counter.wrapping_add(1);
    }
}

#[derive(Debug)]
enum MdnsError {
    NoAddress,
    SocketBindFailed,
    MulticastJoinFailed,
    ResponderFailed,
}

impl defmt::Format for MdnsError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MdnsError::NoAddress => defmt::write!(fmt, "No IPv4 address"),
            MdnsError::SocketBindFailed => defmt::write!(fmt, "Socket bind failed"),
            MdnsError::MulticastJoinFailed => defmt::write!(fmt, "Multicast join failed"),
            MdnsError::ResponderFailed => defmt::write!(fmt, "Responder failed"),
        }
    }
}

/// mDNS Responder Task
///
/// Wartet auf Link und DHCP-Adresse der Station und beantwortet dann
/// Anfragen nach `dishdash.local`. Nach jedem Fehler (z.B. Link weg,
/// neue Adresse) startet der Responder nach kurzer Pause neu.
/// Im Access-Point-Modus bleibt der Task beim Warten stehen.
#[embassy_executor::task]
pub async fn mdns_responder_task(stack: Stack<'static>) {
    info!("mDNS: Task started, waiting for network...");
    // StaticCell darf nur einmal initialisiert werden, daher außerhalb der Schleife
    static UDP_BUFFERS: StaticCell<MdnsUdpBuffers> = StaticCell::new();
    let udp_buffers: &'static MdnsUdpBuffers = UDP_BUFFERS.init(UdpBuffers::new());

    loop {
        wait_for_network(stack).await;
        match run_mdns_responder(stack, udp_buffers).await {
            Ok(()) => warn!("mDNS: Responder stopped"),
            Err(e) => error!("mDNS: Error: {}", e),
        }
        Timer::after(Duration::from_secs(MDNS_RETRY_DELAY_SECS)).await;
    }
}

async fn wait_for_network(stack: Stack<'static>) {
    while !(stack.is_link_up() && stack.config_v4().is_some()) {
        Timer::after(Duration::from_millis(NETWORK_POLL_MS)).await;
    }
}

async fn run_mdns_responder(
    stack: Stack<'static>,
    udp_buffers: &'static MdnsUdpBuffers,
) -> Result<(), MdnsError> {
    let our_ip = stack
        .config_v4()
        .ok_or(MdnsError::NoAddress)?
        .address
        .address();
    info!("mDNS: Using IP {}", Debug2Format(&our_ip));

    let udp_stack = Udp::new(stack, udp_buffers);

    let mut socket = udp_stack
        .bind(SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), MDNS_PORT))
        .await
        .map_err(|_| MdnsError::SocketBindFailed)?;
    socket
        .join_v4(MDNS_MULTICAST_ADDR, Ipv4Addr::UNSPECIFIED)
        .await
        .map_err(|_| MdnsError::MulticastJoinFailed)?;
    let (recv, send) = socket.split();

    let host = Host {
        hostname: HOSTNAME,
        ipv4: our_ip.into(),
        // kein proto-ipv6 in smoltcp
        ipv6: [0u8; 16].into(),
        ttl: Ttl::from_secs(MDNS_TTL_S),
    };

    let recv_buf = VecBufAccess::<NoopRawMutex, MDNS_PACKET_BUFFER_SIZE>::new();
    let send_buf = VecBufAccess::<NoopRawMutex, MDNS_PACKET_BUFFER_SIZE>::new();
    // Von der API verlangt, hier ungenutzt
    let signal = Signal::<NoopRawMutex, ()>::new();

    let mdns = io::Mdns::new(
        Some(our_ip),
        None,
        recv,
        send,
        recv_buf,
        send_buf,
        mdns_rng,
        &signal,
    );

    info!("mDNS: Responder running, advertising '{}.local'", HOSTNAME);
    mdns.run(HostAnswersMdnsHandler::new(&host))
        .await
        .map_err(|_| MdnsError::ResponderFailed)
}
