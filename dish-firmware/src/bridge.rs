// Brücke zwischen Scheduler-Thread und Netzwerk-Tasks
//
// Der Scheduler läuft blockierend im Thread-Modus, die Netzwerk-Tasks im
// Interrupt-Executor. Geteilter Zustand liegt deshalb ausschließlich in
// den statischen embassy-sync Primitiven dieses Moduls, alle mit
// CriticalSectionRawMutex.

use alloc::boxed::Box;
use alloc::string::String;
use core::cell::Cell;
use core::net::{Ipv4Addr, SocketAddrV4};

use dish_core::api::{ApiRequest, Tagged, Ticket};
use dish_core::config::DNS_PACKET_MAX;
use dish_core::types::{NetworkConfig, Passphrase, Ssid};
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use heapless::{String as HString, Vec};

use crate::config::{NAME_QUEUE_DEPTH, SCAN_CAPACITY};

// ============================================================================
// WiFi
// ============================================================================

/// Auftrag des Schedulers an den WiFi-Task
pub enum RadioCommand {
    Hostname(HString<32>),
    Station { ssid: Ssid, password: Passphrase },
    StaticAddress(NetworkConfig),
    StopStation,
    Scan,
    AccessPoint,
}

/// Vom WiFi-Task veröffentlichter Verbindungszustand
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RadioStatus {
    pub connected: bool,
    pub address: Option<Ipv4Addr>,
}

pub type ScanList = Vec<(Ssid, i8), SCAN_CAPACITY>;

pub static RADIO_COMMANDS: Channel<CriticalSectionRawMutex, RadioCommand, 4> = Channel::new();
pub static RADIO_STATUS: BlockingMutex<CriticalSectionRawMutex, Cell<RadioStatus>> =
    BlockingMutex::new(Cell::new(RadioStatus {
        connected: false,
        address: None,
    }));
pub static SCAN_RESULTS: Signal<CriticalSectionRawMutex, ScanList> = Signal::new();

pub fn radio_status() -> RadioStatus {
    RADIO_STATUS.lock(|status| status.get())
}

pub fn publish_radio_status(next: RadioStatus) {
    RADIO_STATUS.lock(|status| status.set(next));
}

// ============================================================================
// Captive-DNS
// ============================================================================

/// Ein UDP-Datagramm samt Gegenstelle
pub struct Datagram {
    pub len: usize,
    pub data: [u8; DNS_PACKET_MAX],
    pub peer: SocketAddrV4,
}

impl Datagram {
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

/// Kanäle des Captive-DNS: Öffnen, Eingang, Ausgang
pub struct NameChannels {
    pub open: Signal<CriticalSectionRawMutex, ()>,
    pub inbox: Channel<CriticalSectionRawMutex, Datagram, NAME_QUEUE_DEPTH>,
    pub outbox: Channel<CriticalSectionRawMutex, Datagram, NAME_QUEUE_DEPTH>,
}

pub static CAPTIVE_DNS: NameChannels = NameChannels {
    open: Signal::new(),
    inbox: Channel::new(),
    outbox: Channel::new(),
};

// ============================================================================
// HTTP-API
// ============================================================================

/// Fertig serialisierte Antwort des Schedulers
pub struct ApiReply {
    pub rejected: bool,
    pub body: String,
}

static API_REQUESTS: Channel<CriticalSectionRawMutex, Tagged<Box<ApiRequest>>, 1> =
    Channel::new();
static API_REPLIES: Signal<CriticalSectionRawMutex, Tagged<ApiReply>> = Signal::new();
static API_TICKET: BlockingMutex<CriticalSectionRawMutex, Cell<Ticket>> =
    BlockingMutex::new(Cell::new(Ticket::FIRST));

/// Serialisiert Anfragen mehrerer HTTP-Tasks: immer nur eine ist unterwegs
static API_LOCK: Mutex<CriticalSectionRawMutex, ()> = Mutex::new(());

/// Reicht eine Anfrage an den Scheduler und wartet auf dessen Antwort
///
/// Das Anlernen eines Fingers antwortet erst nach Ende der Sitzung,
/// bis dahin bleiben weitere Anfragen am Lock stehen. Antworten auf
/// abgebrochene Aufrufe tragen eine fremde Nummer und werden verworfen.
pub async fn call(request: ApiRequest) -> ApiReply {
    let _guard = API_LOCK.lock().await;
    let ticket = API_TICKET.lock(|t| {
        let next = t.get().next();
        t.set(next);
        next
    });
    API_REQUESTS
        .send(Tagged {
            ticket,
            value: Box::new(request),
        })
        .await;
    loop {
        if let Some(reply) = API_REPLIES.wait().await.accept(ticket) {
            return reply;
        }
        defmt::debug!("HTTP: veraltete Antwort verworfen");
    }
}

/// Scheduler-Seite: holt höchstens eine wartende Anfrage ab
pub fn next_request() -> Option<(Ticket, ApiRequest)> {
    API_REQUESTS
        .try_receive()
        .ok()
        .map(|request| (request.ticket, *request.value))
}

pub fn deliver_reply(ticket: Ticket, reply: ApiReply) {
    API_REPLIES.signal(Tagged {
        ticket,
        value: reply,
    });
}
