// NameService-Implementierung: Captive-DNS-Datagramme über die Bridge-Kanäle

use core::net::SocketAddrV4;

use dish_core::config::DNS_PACKET_MAX;
use dish_core::traits::NameService;

use crate::bridge::{CAPTIVE_DNS, Datagram};

pub struct NameBridge;

impl NameService for NameBridge {
    fn open(&mut self) -> bool {
        // Der Socket wird im Task gebunden; Fehler loggt der Task
        CAPTIVE_DNS.open.signal(());
        true
    }

    fn receive(&mut self, buf: &mut [u8]) -> Option<(usize, SocketAddrV4)> {
        let datagram = CAPTIVE_DNS.inbox.try_receive().ok()?;
        let payload = datagram.payload();
        let len = payload.len().min(buf.len());
        buf[..len].copy_from_slice(&payload[..len]);
        Some((len, datagram.peer))
    }

    fn send(&mut self, bytes: &[u8], to: SocketAddrV4) {
        if bytes.len() > DNS_PACKET_MAX {
            defmt::warn!("DNS: Antwort zu groß ({} Bytes)", bytes.len());
            return;
        }
        let mut datagram = Datagram {
            len: bytes.len(),
            data: [0; DNS_PACKET_MAX],
            peer: to,
        };
        datagram.data[..bytes.len()].copy_from_slice(bytes);
        if CAPTIVE_DNS.outbox.try_send(datagram).is_err() {
            defmt::warn!("DNS: Ausgang voll, Antwort verworfen");
        }
    }
}
