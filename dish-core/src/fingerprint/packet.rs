//! Paketformat des R503/R307 Fingerabdrucksensors
//!
//! ```text
//! EF 01 | FF FF FF FF | PID | LEN_H LEN_L | PAYLOAD... | SUM_H SUM_L
//! ```
//!
//! `LEN` zählt Payload plus Prüfsumme. Die Prüfsumme ist die 16-Bit-Summe
//! aller Bytes ab PID (Index 6) bis vor die Prüfsumme.

use heapless::Vec;

use crate::error::ProtocolError;

pub const HEADER: [u8; 7] = [0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];

/// Größtes Paket, das wir senden
pub const MAX_PACKET: usize = 24;

/// Kürzeste gültige Antwort: Header, PID, Länge, Code, Prüfsumme
pub const MIN_REPLY: usize = 12;

pub type Packet = Vec<u8, MAX_PACKET>;

/// Ziel-Puffer für Bild-zu-Template
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CharBuffer {
    One = 1,
    Two = 2,
}

/// Befehle, die das Gerät verwendet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// GenImg: Bild aufnehmen (Code 0x02 = kein Finger)
    CaptureImage,
    /// Img2Tz: Bild in Template-Puffer wandeln
    ImageToTemplate(CharBuffer),
    /// Search über Puffer 1, Slots 0..0xA3
    Search,
    /// RegModel: Puffer 1 und 2 zu einem Modell vereinen
    RegisterModel,
    Store(u16),
    Delete(u16),
    TemplateCount,
}

impl Command {
    pub fn payload(self) -> Vec<u8, 8> {
        let bytes: &[u8] = match self {
            Command::CaptureImage => &[0x01],
            Command::ImageToTemplate(buffer) => &[0x02, buffer as u8],
            Command::Search => &[0x04, 0x01, 0x00, 0x00, 0x00, 0xA3],
            Command::RegisterModel => &[0x05],
            Command::Store(slot) => {
                let [hi, lo] = slot.to_be_bytes();
                return Vec::from_iter([0x06, 0x01, hi, lo]);
            }
            Command::Delete(slot) => {
                let [hi, lo] = slot.to_be_bytes();
                return Vec::from_iter([0x0C, hi, lo, 0x00, 0x01]);
            }
            Command::TemplateCount => &[0x1D],
        };
        Vec::from_iter(bytes.iter().copied())
    }
}

fn checksum(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0u16, |sum, &b| sum.wrapping_add(u16::from(b)))
}

/// Baut ein Befehlspaket aus dem Payload
pub fn encode(payload: &[u8]) -> Packet {
    let mut pkt = Packet::new();
    let len = (payload.len() + 2) as u16;
    pkt.extend(HEADER);
    pkt.extend(len.to_be_bytes());
    pkt.extend(payload.iter().copied());
    let sum = checksum(&pkt[6..]);
    pkt.extend(sum.to_be_bytes());
    pkt
}

/// Ausgewertete Antwort des Sensors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reply {
    /// Confirmation-Code (Index 9), 0 = OK
    pub code: u8,
    /// Erstes 16-Bit-Datenwort (Index 10..12), z.B. Slot oder Anzahl
    pub word: Option<u16>,
}

impl Reply {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }

    /// Fehler, wenn der Sensor nicht mit 0 bestätigt hat
    pub fn confirmed(self) -> Result<Self, ProtocolError> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(ProtocolError::Rejected(self.code))
        }
    }
}

/// Prüft Rahmen, Länge und Prüfsumme einer Antwort
pub fn parse_reply(raw: &[u8]) -> Result<Reply, ProtocolError> {
    if raw.is_empty() {
        return Err(ProtocolError::NoResponse);
    }
    if raw.len() < MIN_REPLY {
        return Err(ProtocolError::ShortResponse);
    }
    if raw[..2] != HEADER[..2] {
        return Err(ProtocolError::BadHeader);
    }

    let len = usize::from(u16::from_be_bytes([raw[7], raw[8]]));
    let total = 9 + len;
    if len < 3 || raw.len() < total {
        return Err(ProtocolError::ShortResponse);
    }

    let body = &raw[6..total - 2];
    let expected = u16::from_be_bytes([raw[total - 2], raw[total - 1]]);
    if checksum(body) != expected {
        return Err(ProtocolError::Checksum);
    }

    let data = &raw[10..total - 2];
    let word = match data {
        [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
        _ => None,
    };
    Ok(Reply {
        code: raw[9],
        word,
    })
}
