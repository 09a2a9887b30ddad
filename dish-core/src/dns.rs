//! Minimaler DNS-Responder für das Captive Portal
//!
//! Jede Antwort enthält genau einen A-Record mit der eigenen Adresse.
//! Es wird nur die erste Frage ausgewertet. mDNS im Station-Modus
//! übernimmt die Firmware selbst.

use core::net::Ipv4Addr;

use heapless::Vec;

use crate::config::{DNS_PACKET_MAX, DNS_TTL_S};

pub type DnsPacket = Vec<u8, DNS_PACKET_MAX>;

pub const DNS_PORT: u16 = 53;

const HEADER_LEN: usize = 12;
const TYPE_A: u16 = 1;
const CLASS_IN: u16 = 1;
/// Pointer auf den Namen bei Offset 12
const NAME_POINTER: [u8; 2] = [0xC0, 0x0C];

/// Antwort auf eine beliebige Anfrage: jeder Name zeigt auf `ip`
///
/// `None` bei zu kurzen oder abgeschnittenen Paketen.
pub fn captive_reply(query: &[u8], ip: Ipv4Addr) -> Option<DnsPacket> {
    if query.len() < HEADER_LEN {
        return None;
    }
    let question_end = question_end(query)?;

    let mut out = DnsPacket::new();
    out.extend_from_slice(&query[0..2]).ok()?;
    // QR, Opcode 0, RD, RA, kein Fehler
    out.extend_from_slice(&[0x81, 0x80]).ok()?;
    // QDCOUNT aus der Anfrage, ANCOUNT gleich QDCOUNT
    out.extend_from_slice(&query[4..6]).ok()?;
    out.extend_from_slice(&query[4..6]).ok()?;
    out.extend_from_slice(&[0, 0, 0, 0]).ok()?;
    out.extend_from_slice(&query[HEADER_LEN..question_end]).ok()?;
    push_a_record(&mut out, &NAME_POINTER, ip)?;
    Some(out)
}

/// Ende der ersten Frage (Labels, Null-Byte, QTYPE, QCLASS)
fn question_end(query: &[u8]) -> Option<usize> {
    let mut pos = HEADER_LEN;
    while pos < query.len() && query[pos] != 0 {
        pos += usize::from(query[pos]) + 1;
    }
    let end = pos + 5;
    (end <= query.len()).then_some(end)
}

fn push_a_record(out: &mut DnsPacket, name: &[u8], ip: Ipv4Addr) -> Option<()> {
    out.extend_from_slice(name).ok()?;
    out.extend_from_slice(&TYPE_A.to_be_bytes()).ok()?;
    out.extend_from_slice(&CLASS_IN.to_be_bytes()).ok()?;
    out.extend_from_slice(&DNS_TTL_S.to_be_bytes()).ok()?;
    out.extend_from_slice(&4u16.to_be_bytes()).ok()?;
    out.extend_from_slice(&ip.octets()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Anfrage für "a.b" Typ A
    const QUERY: [u8; 21] = [
        0x12, 0x34, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x01, b'a', 0x01, b'b', 0x00, 0x00, 0x01, 0x00, 0x01,
    ];

    #[test]
    fn test_captive_reply_layout() {
        let ip = Ipv4Addr::new(192, 168, 4, 1);
        let reply = captive_reply(&QUERY, ip).unwrap();
        assert_eq!(&reply[0..4], &[0x12, 0x34, 0x81, 0x80]);
        assert_eq!(&reply[4..8], &[0x00, 0x01, 0x00, 0x01]);
        assert_eq!(&reply[12..21], &QUERY[12..21]);
        assert_eq!(
            &reply[21..],
            &[0xC0, 0x0C, 0, 1, 0, 1, 0, 0, 0, 0x3C, 0, 4, 192, 168, 4, 1]
        );
    }

    #[test]
    fn test_captive_reply_rejects_truncated() {
        assert!(captive_reply(&QUERY[..11], Ipv4Addr::LOCALHOST).is_none());
        assert!(captive_reply(&QUERY[..18], Ipv4Addr::LOCALHOST).is_none());
    }
}
