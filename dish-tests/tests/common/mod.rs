//! Mocks für alle Hardware-Traits
//!
//! Jeder Mock zeichnet auf, was der Core mit ihm macht, und lässt sich
//! über öffentliche Felder steuern.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::net::{Ipv4Addr, SocketAddrV4};

use dish_core::api::{ApiRequest, ApiResponse};
use dish_core::context::Parts;
use dish_core::error::{BusError, ConnectivityError, PersistenceError};
use dish_core::game::Reward;
use dish_core::scheduler::Scheduler;
use dish_core::time::Instant;
use dish_core::traits::{
    AudioSink, DisplayBus, FileSystem, InputPins, NameService, Platform, RequestSource,
    SensorUart, SystemControl, Timebase, WifiRadio,
};
use dish_core::types::{InputLevels, NetworkConfig, Note};

// ============================================================================
// Zeit
// ============================================================================

#[derive(Default)]
pub struct MockTimebase {
    pub now_ms: u32,
    pub feeds: usize,
    pub slept_ms: u64,
}

impl MockTimebase {
    pub fn starting_at(ms: u32) -> Self {
        Self {
            now_ms: ms,
            ..Self::default()
        }
    }

    pub fn advance(&mut self, ms: u32) {
        self.now_ms = self.now_ms.wrapping_add(ms);
    }
}

impl Timebase for MockTimebase {
    fn now(&self) -> Instant {
        Instant::from_millis(self.now_ms)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.slept_ms += u64::from(ms);
        self.advance(ms);
    }

    fn feed_watchdog(&mut self) {
        self.feeds += 1;
    }

    fn wall_secs(&self) -> u64 {
        1_700_000_000 + u64::from(self.now_ms / 1_000)
    }
}

// ============================================================================
// Display
// ============================================================================

#[derive(Default)]
pub struct MockDisplay {
    pub frames: Vec<Vec<u8>>,
    pub fail_writes: bool,
}

impl MockDisplay {
    /// Letzter gesendeter Wert eines Registers (Modul 0)
    pub fn last_register(&self, register: u8) -> Option<u8> {
        self.frames
            .iter()
            .rev()
            .find(|f| f[0] == register)
            .map(|f| f[1])
    }
}

impl DisplayBus for MockDisplay {
    fn write(&mut self, frame: &[u8]) -> Result<(), BusError> {
        if self.fail_writes {
            return Err(BusError::WriteFailed);
        }
        self.frames.push(frame.to_vec());
        Ok(())
    }
}

// ============================================================================
// Fingerabdrucksensor
// ============================================================================

/// Antwortpaket (PID 0x07) mit gültiger Prüfsumme
pub fn reply_packet(code: u8, data: &[u8]) -> Vec<u8> {
    let len = (data.len() + 3) as u16;
    let mut pkt = vec![0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x07];
    pkt.extend_from_slice(&len.to_be_bytes());
    pkt.push(code);
    pkt.extend_from_slice(data);
    let sum = pkt[6..].iter().fold(0u16, |s, &b| s.wrapping_add(u16::from(b)));
    pkt.extend_from_slice(&sum.to_be_bytes());
    pkt
}

/// Simuliert einen R503 anhand des Befehlscodes
#[derive(Default)]
pub struct MockSensor {
    /// Finger-Zustand pro GenImg-Aufruf; danach gilt `finger_default`
    pub fingers: VecDeque<bool>,
    pub finger_default: bool,
    pub match_slot: Option<u16>,
    pub template_count: u16,
    /// Dieser Befehlscode wird mit 0x01 beantwortet
    pub fail_opcode: Option<u8>,
    /// Sensor antwortet gar nicht
    pub silent: bool,
    pub sent: Vec<Vec<u8>>,
    pub stored: Vec<u16>,
    pub deleted: Vec<u16>,
    pub pending: Vec<u8>,
}

impl MockSensor {
    pub fn opcodes(&self) -> Vec<u8> {
        self.sent.iter().map(|p| p[9]).collect()
    }

    fn respond(&mut self, pkt: &[u8]) -> Vec<u8> {
        let opcode = pkt[9];
        if self.fail_opcode == Some(opcode) {
            return reply_packet(0x01, &[]);
        }
        match opcode {
            0x01 => {
                let finger = self.fingers.pop_front().unwrap_or(self.finger_default);
                reply_packet(if finger { 0x00 } else { 0x02 }, &[])
            }
            0x04 => match self.match_slot {
                Some(slot) => {
                    let [hi, lo] = slot.to_be_bytes();
                    reply_packet(0x00, &[hi, lo, 0x00, 0x50])
                }
                None => reply_packet(0x09, &[]),
            },
            0x06 => {
                self.stored.push(u16::from_be_bytes([pkt[11], pkt[12]]));
                reply_packet(0x00, &[])
            }
            0x0C => {
                self.deleted.push(u16::from_be_bytes([pkt[10], pkt[11]]));
                reply_packet(0x00, &[])
            }
            0x1D => reply_packet(0x00, &self.template_count.to_be_bytes()),
            _ => reply_packet(0x00, &[]),
        }
    }
}

impl SensorUart for MockSensor {
    fn write(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        self.sent.push(bytes.to_vec());
        self.pending = if self.silent {
            Vec::new()
        } else {
            self.respond(bytes)
        };
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        n
    }
}

// ============================================================================
// Eingänge & Audio
// ============================================================================

#[derive(Default)]
pub struct MockInputs {
    pub levels: InputLevels,
}

impl InputPins for MockInputs {
    fn read(&mut self) -> InputLevels {
        self.levels
    }
}

#[derive(Default)]
pub struct MockAudio {
    pub played: Vec<(Vec<Note>, u16)>,
}

impl AudioSink for MockAudio {
    fn play(&mut self, notes: &[Note], duty: u16) {
        self.played.push((notes.to_vec(), duty));
    }
}

// ============================================================================
// WLAN
// ============================================================================

pub struct MockRadio {
    /// Verbindung steht nach so vielen `is_connected`-Abfragen; `None` = nie
    pub connect_after_polls: Option<u32>,
    pub polls: u32,
    pub dhcp_address: Ipv4Addr,
    pub ap_address: Ipv4Addr,
    pub visible: Vec<(String, i8)>,
    pub begin_calls: Vec<(String, String)>,
    pub static_applied: Option<NetworkConfig>,
    pub stop_calls: usize,
    pub ap_started: Option<String>,
    pub hostname: Option<String>,
    pub connecting: bool,
}

impl Default for MockRadio {
    fn default() -> Self {
        Self {
            connect_after_polls: Some(1),
            polls: 0,
            dhcp_address: Ipv4Addr::new(192, 168, 1, 42),
            ap_address: Ipv4Addr::new(192, 168, 4, 1),
            visible: Vec::new(),
            begin_calls: Vec::new(),
            static_applied: None,
            stop_calls: 0,
            ap_started: None,
            hostname: None,
            connecting: false,
        }
    }
}

impl MockRadio {
    pub fn never_connects() -> Self {
        Self {
            connect_after_polls: None,
            ..Self::default()
        }
    }

    /// Verbindung bricht ab; nächster Aufbau braucht wieder `polls` Abfragen
    pub fn drop_link(&mut self) {
        self.connecting = false;
        self.polls = 0;
    }
}

impl WifiRadio for MockRadio {
    fn set_hostname(&mut self, hostname: &str) {
        self.hostname = Some(hostname.to_string());
    }

    fn begin_station(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        self.begin_calls.push((ssid.to_string(), password.to_string()));
        self.connecting = true;
        self.polls = 0;
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        if !self.connecting {
            return false;
        }
        self.polls += 1;
        self.connect_after_polls.is_some_and(|n| self.polls >= n)
    }

    fn station_address(&mut self) -> Option<Ipv4Addr> {
        self.connecting.then_some(self.dhcp_address)
    }

    fn apply_static_address(&mut self, config: &NetworkConfig) -> Result<(), ConnectivityError> {
        self.static_applied = Some(*config);
        Ok(())
    }

    fn stop_station(&mut self) {
        self.connecting = false;
        self.stop_calls += 1;
    }

    fn scan(&mut self, found: &mut dyn FnMut(&str, i8)) -> Result<(), ConnectivityError> {
        for (ssid, rssi) in &self.visible {
            found(ssid, *rssi);
        }
        Ok(())
    }

    fn start_access_point(&mut self, ssid: &str) -> Result<Ipv4Addr, ConnectivityError> {
        self.ap_started = Some(ssid.to_string());
        Ok(self.ap_address)
    }
}

#[derive(Default)]
pub struct MockNames {
    pub opened: u32,
    pub inbox: VecDeque<(Vec<u8>, SocketAddrV4)>,
    pub sent: Vec<(Vec<u8>, SocketAddrV4)>,
}

impl NameService for MockNames {
    fn open(&mut self) -> bool {
        self.opened += 1;
        true
    }

    fn receive(&mut self, buf: &mut [u8]) -> Option<(usize, SocketAddrV4)> {
        let (data, peer) = self.inbox.pop_front()?;
        buf[..data.len()].copy_from_slice(&data);
        Some((data.len(), peer))
    }

    fn send(&mut self, bytes: &[u8], to: SocketAddrV4) {
        self.sent.push((bytes.to_vec(), to));
    }
}

// ============================================================================
// Dateien & System
// ============================================================================

#[derive(Default)]
pub struct MockFs {
    pub files: BTreeMap<String, Vec<u8>>,
    pub fail_writes: bool,
    pub ops: Vec<String>,
}

impl MockFs {
    pub fn text(&self, name: &str) -> Option<String> {
        self.files
            .get(name)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

impl FileSystem for MockFs {
    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, PersistenceError> {
        let data = self.files.get(name).ok_or(PersistenceError::NotFound)?;
        if data.len() > buf.len() {
            return Err(PersistenceError::Io);
        }
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), PersistenceError> {
        self.ops.push(format!("write {name}"));
        if self.fail_writes {
            return Err(PersistenceError::Io);
        }
        self.files.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), PersistenceError> {
        self.ops.push(format!("remove {name}"));
        self.files
            .remove(name)
            .map(|_| ())
            .ok_or(PersistenceError::NotFound)
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), PersistenceError> {
        self.ops.push(format!("rename {from} {to}"));
        let data = self.files.remove(from).ok_or(PersistenceError::NotFound)?;
        self.files.insert(to.to_string(), data);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockSystem {
    pub resets: usize,
}

impl SystemControl for MockSystem {
    fn reset(&mut self) {
        self.resets += 1;
    }
}

// ============================================================================
// API
// ============================================================================

/// Eigenständige Kopie einer Antwort (ohne Lebensdauer)
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ok,
    Rejected,
    Scored(Option<Reward>),
    Enrolled(bool),
    Deleted(bool),
    Count(u16),
    Ip(Option<Ipv4Addr>),
    Snapshot { turn: u8, scores: Vec<u32>, enrolling: bool },
    Networks(Vec<(String, u8)>),
    Setup(Option<Ipv4Addr>),
}

#[derive(Default)]
pub struct MockRequests {
    pub inbox: VecDeque<ApiRequest>,
    pub replies: Vec<Reply>,
    /// JSON-Body jeder Antwort, wie ihn die HTTP-Schicht senden würde
    pub bodies: Vec<String>,
}

impl RequestSource for MockRequests {
    fn poll(&mut self) -> Option<ApiRequest> {
        self.inbox.pop_front()
    }

    fn reply(&mut self, response: ApiResponse<'_>) {
        let mut buf = vec![0u8; 16 * 1024];
        if let Ok(n) = response.write_json(&mut buf) {
            self.bodies
                .push(String::from_utf8_lossy(&buf[..n]).into_owned());
        }
        let reply = match response {
            ApiResponse::Ok => Reply::Ok,
            ApiResponse::Rejected => Reply::Rejected,
            ApiResponse::Scored(reward) => Reply::Scored(reward),
            ApiResponse::Enrolled(ok) => Reply::Enrolled(ok),
            ApiResponse::Deleted(ok) => Reply::Deleted(ok),
            ApiResponse::Count(n) => Reply::Count(n),
            ApiResponse::Ip(ip) => Reply::Ip(ip),
            ApiResponse::Snapshot(snapshot) => Reply::Snapshot {
                turn: snapshot.state.turn,
                scores: snapshot.state.players.iter().map(|p| p.score).collect(),
                enrolling: snapshot.status.enrolling,
            },
            ApiResponse::Networks(list) => Reply::Networks(
                list.iter()
                    .map(|n| (n.ssid.as_str().to_string(), n.bars))
                    .collect(),
            ),
            ApiResponse::Setup(ip) => Reply::Setup(ip),
        };
        self.replies.push(reply);
    }
}

// ============================================================================
// Plattform
// ============================================================================

pub struct MockPlatform;

impl Platform for MockPlatform {
    type Timebase = MockTimebase;
    type Display = MockDisplay;
    type Sensor = MockSensor;
    type Inputs = MockInputs;
    type Audio = MockAudio;
    type Radio = MockRadio;
    type Names = MockNames;
    type Fs = MockFs;
    type System = MockSystem;
    type Requests = MockRequests;
}

pub fn parts() -> Parts<MockPlatform> {
    Parts {
        timebase: MockTimebase::starting_at(1_000),
        display: MockDisplay::default(),
        sensor: MockSensor::default(),
        inputs: MockInputs::default(),
        audio: MockAudio::default(),
        radio: MockRadio::default(),
        names: MockNames::default(),
        fs: MockFs::default(),
        system: MockSystem::default(),
        requests: MockRequests::default(),
    }
}

/// WLAN-Zugangsdaten als JSON, wie sie `wifi.json` enthält
pub fn with_wifi(mut parts: Parts<MockPlatform>) -> Parts<MockPlatform> {
    parts.fs.files.insert(
        "wifi.json".to_string(),
        br#"{"ssid":"Heimnetz","password":"geheim123"}"#.to_vec(),
    );
    parts
}

/// Gebooteter Scheduler im Station-Modus, Bewegungsmelder meldet Bewegung
pub fn booted_station() -> Scheduler<MockPlatform> {
    let mut sched = Scheduler::new(with_wifi(parts()));
    sched.boot();
    sched.ctx.inputs.levels.motion = true;
    sched
}

/// Mehrere Durchläufe im Abstand von `step_ms`
pub fn run_for(sched: &mut Scheduler<MockPlatform>, total_ms: u32, step_ms: u32) {
    let mut elapsed = 0;
    while elapsed < total_ms {
        sched.ctx.timebase.advance(step_ms);
        sched.run_once();
        elapsed += step_ms;
    }
}

/// Text des aktuell laufenden Lauftexts, aus den Spalten zurückgelesen
pub fn scroll_columns(sched: &Scheduler<MockPlatform>) -> Vec<u8> {
    sched.ctx.renderer.scroll().columns().to_vec()
}

/// Spalten, die `text` als Lauftext ergeben würde
pub fn expected_columns(text: &str) -> Vec<u8> {
    let mut cols = vec![0u8; dish_core::config::WINDOW_WIDTH];
    for ch in text.chars() {
        cols.extend_from_slice(dish_core::display::glyph(ch));
        cols.push(0);
    }
    cols.extend(std::iter::repeat_n(0, dish_core::config::WINDOW_WIDTH));
    cols
}
