//! Fehler-Typen der einzelnen Subsysteme
//!
//! Keines dieser Fehlerbilder ist fatal: der Scheduler loggt sie und
//! macht mit dem nächsten Durchlauf weiter.

/// Fehler beim Zugriff auf einen Bus (SPI, UART)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    WriteFailed,
    ReadFailed,
}

/// Fehler im Paketprotokoll des Fingerabdrucksensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Keine Antwort innerhalb der Wartezeit
    NoResponse,
    /// Antwort kürzer als das Mindest-Ack (12 Bytes) oder als angekündigt
    ShortResponse,
    /// Header passt nicht zu `EF 01`
    BadHeader,
    /// Prüfsumme stimmt nicht
    Checksum,
    /// Sensor hat mit Confirmation-Code != 0 geantwortet
    Rejected(u8),
    Bus(BusError),
}

impl From<BusError> for ProtocolError {
    fn from(err: BusError) -> Self {
        ProtocolError::Bus(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectivityError {
    /// Verbindung kam innerhalb des Timeouts nicht zustande
    Timeout,
    /// Radio hat den Befehl abgelehnt
    Radio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistenceError {
    NotFound,
    /// Datei vorhanden, aber kein gültiges JSON für den Zieltyp
    Corrupt,
    /// Serialisierung passt nicht in den Puffer
    Encode,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GameError {
    UnknownPlayer,
    /// Spielerliste darf nicht leer werden
    EmptyRoster,
}
