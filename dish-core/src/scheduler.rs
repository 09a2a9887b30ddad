//! Kooperativer Hauptloop
//!
//! Ein Durchlauf von [`Scheduler::run_once`] in fester Reihenfolge:
//!
//! 1. Watchdog füttern
//! 2. Netzwerk: Captive-DNS (AP) bzw. Reconnect (Station)
//! 3. Display-Animation weiterschalten
//! 4. Bewegungsmelder auswerten
//! 5. Fingerabdruck passiv abfragen
//! 6. Tastengesten auswerten
//! 7. (Speicherpflege, hier nichts zu tun)
//! 8. Höchstens eine API-Anfrage bearbeiten
//!
//! Alles ist nicht-blockierend bis auf die festen Wartezeiten des
//! Fingerabdrucksensors und begrenzte Verbindungsversuche. Während eines
//! Anlernvorgangs läuft nur Watchdog, Display und die Anlern-Sitzung.

use core::net::Ipv4Addr;

use crate::buttons::GestureRecognizer;
use crate::config::{
    BANNER_SCROLL_SPEED_MS, CONNECT_SCROLL_SPEED_MS, DNS_PACKET_MAX, FIRMWARE_VERSION, FP_COOLDOWN_MS,
    FP_POLL_INTERVAL_MS,
};
use crate::context::{DeviceContext, Parts};
use crate::display::Continuation;
use crate::dns::captive_reply;
use crate::fingerprint::{EnrollProgress, EnrollSession, ScanOutcome};
use crate::game::{GameEngine, Message};
use crate::log::{info, warn};
use crate::motion::{MotionController, PowerTransition};
use crate::state::GameState;
use crate::time::Instant;
use crate::traits::{InputPins, NameService, Platform, RequestSource, SystemControl, Timebase};
use crate::types::{InputLevels, NetworkConfig, WifiCredentials, WifiMode};

/// Zeitstempel der passiven Fingerabdruck-Abfrage
#[derive(Clone, Copy, Debug, Default)]
struct PassiveScan {
    last_poll: Option<Instant>,
    /// Letzter Erkennungsversuch (Treffer oder nicht)
    last_attempt: Option<Instant>,
}

pub(crate) struct Enrollment {
    pub(crate) session: EnrollSession,
    /// Antwort an die API steht noch aus
    pub(crate) reply_pending: bool,
}

pub struct Scheduler<P: Platform> {
    pub ctx: DeviceContext<P>,
    pub(crate) game: GameEngine,
    pub(crate) motion: MotionController,
    gestures: GestureRecognizer,
    passive: PassiveScan,
    pub(crate) enrollment: Option<Enrollment>,
    pub(crate) pending_reboot: Option<Instant>,
    pub(crate) booted_at: Instant,
    pub(crate) credentials: Option<WifiCredentials>,
    pub(crate) network: NetworkConfig,
}

impl<P: Platform> Scheduler<P> {
    pub fn new(parts: Parts<P>) -> Self {
        let ctx = DeviceContext::new(parts);
        let now = ctx.timebase.now();
        Self {
            ctx,
            game: GameEngine::new(GameState::default()),
            motion: MotionController::new(now),
            gestures: GestureRecognizer::new(),
            passive: PassiveScan::default(),
            enrollment: None,
            pending_reboot: None,
            booted_at: now,
            credentials: None,
            network: NetworkConfig::default(),
        }
    }

    pub fn game(&self) -> &GameEngine {
        &self.game
    }

    pub fn display_active(&self) -> bool {
        self.motion.is_active()
    }

    pub fn is_enrolling(&self) -> bool {
        self.enrollment.is_some()
    }

    pub fn pending_reboot(&self) -> Option<Instant> {
        self.pending_reboot
    }

    pub fn current_ip(&self) -> Option<Ipv4Addr> {
        self.ctx.connectivity.current_ip()
    }

    /// Startsequenz: Zustand laden, Banner, WLAN oder Setup-AP
    pub fn boot(&mut self) {
        self.ctx.timebase.feed_watchdog();
        let state = self.ctx.store.load_state();
        self.game = GameEngine::new(state);
        self.network = self.ctx.store.load_network();
        self.credentials = self.ctx.store.load_wifi();

        self.ctx.renderer.power_on();
        self.ctx.renderer.set_brightness(self.game.state().display.brightness);
        self.play_banner();

        let connected = match self.credentials.clone() {
            Some(credentials) => {
                let now = self.ctx.timebase.now();
                self.ctx.renderer.start_scroll(
                    "VERBINDE WIFI...",
                    99,
                    CONNECT_SCROLL_SPEED_MS,
                    Continuation::Nothing,
                    now,
                );
                self.connect_station(&credentials).is_some()
            }
            None => false,
        };

        let now = self.ctx.timebase.now();
        self.motion = MotionController::new(now);
        self.booted_at = now;

        if connected {
            self.blink_static("BOOT", 10);
            self.show_current_state();
        } else {
            info!("Kein WLAN, starte Setup-Modus");
            self.start_access_point();
            self.ctx.renderer.show_static("SETUP");
        }
    }

    /// Ein Durchlauf des Hauptloops
    pub fn run_once(&mut self) {
        self.ctx.timebase.feed_watchdog();

        if self.enrollment.is_some() {
            let now = self.ctx.timebase.now();
            let _ = self.ctx.renderer.tick(now);
            self.enrollment_pass();
            return;
        }

        if self.reboot_due() {
            return;
        }

        self.service_network();

        let now = self.ctx.timebase.now();
        if let Some(action) = self.ctx.renderer.tick(now) {
            self.resolve(action);
        }

        let levels = self.ctx.inputs.read();
        self.evaluate_motion(&levels);
        self.poll_fingerprint(&levels);

        let now = self.ctx.timebase.now();
        if let Some(action) = self.gestures.poll(levels.front, levels.side, now) {
            info!("Taste: {}", action.code());
            self.handle_button_action(action);
        }

        if let Some(request) = self.ctx.requests.poll() {
            self.handle_request(request);
        }
    }

    pub(crate) fn resolve(&mut self, action: Continuation) {
        match action {
            Continuation::Nothing => {}
            Continuation::ShowCurrentState => self.show_current_state(),
        }
    }

    fn reboot_due(&mut self) -> bool {
        let Some(at) = self.pending_reboot else {
            return false;
        };
        if self.ctx.timebase.now().ticks_since(at) < 0 {
            return false;
        }
        info!("Neustart");
        self.pending_reboot = None;
        self.ctx.system.reset();
        true
    }

    // ========================================================================
    // Boot-Helfer
    // ========================================================================

    fn play_banner(&mut self) {
        let mut banner = Message::new();
        let _ = banner.push_str("DISH DASH V");
        let _ = banner.push_str(FIRMWARE_VERSION);
        let now = self.ctx.timebase.now();
        self.ctx
            .renderer
            .start_scroll(&banner, 1, BANNER_SCROLL_SPEED_MS, Continuation::Nothing, now);
        while !self.ctx.renderer.is_done() {
            self.ctx.timebase.feed_watchdog();
            let now = self.ctx.timebase.now();
            let _ = self.ctx.renderer.tick(now);
            self.ctx.timebase.delay_ms(5);
        }
    }

    fn blink_static(&mut self, text: &str, times: u8) {
        for _ in 0..times {
            self.ctx.timebase.feed_watchdog();
            self.ctx.renderer.show_static(text);
            self.ctx.timebase.delay_ms(300);
            self.ctx.renderer.clear();
            self.ctx.timebase.delay_ms(200);
        }
    }

    // ========================================================================
    // Netzwerk
    // ========================================================================

    /// Station-Verbindung mit animiertem Display
    pub(crate) fn connect_station(&mut self, credentials: &WifiCredentials) -> Option<Ipv4Addr> {
        let mut pending = None;
        let renderer = &mut self.ctx.renderer;
        let result = self.ctx.connectivity.connect_station(
            credentials,
            &self.network,
            &mut self.ctx.timebase,
            |tb| {
                if let Some(action) = renderer.tick(tb.now()) {
                    pending = Some(action);
                }
            },
        );
        if let Some(action) = pending {
            self.resolve(action);
        }
        result.ok()
    }

    pub(crate) fn start_access_point(&mut self) {
        match self.ctx.connectivity.start_access_point(&mut self.ctx.timebase) {
            Ok(_) => {
                if !self.ctx.names.open() {
                    warn!("DNS: Socket nicht verfügbar");
                }
            }
            Err(e) => warn!("Access Point nicht gestartet: {:?}", e),
        }
    }

    fn service_network(&mut self) {
        let ip = self.ctx.connectivity.current_ip();
        match self.ctx.connectivity.mode() {
            WifiMode::AccessPoint => {
                if let Some(ip) = ip {
                    self.answer_query(ip);
                }
            }
            WifiMode::Station => self.check_reconnect(),
        }
    }

    fn check_reconnect(&mut self) {
        let Some(credentials) = self.credentials.as_ref() else {
            return;
        };
        let mut pending = None;
        let renderer = &mut self.ctx.renderer;
        // Fehlversuche zählt und loggt Connectivity selbst
        let _ = self.ctx.connectivity.check_reconnect(
            credentials,
            &self.network,
            &mut self.ctx.timebase,
            |tb| {
                if let Some(action) = renderer.tick(tb.now()) {
                    pending = Some(action);
                }
            },
        );
        if let Some(action) = pending {
            self.resolve(action);
        }
    }

    /// Beantwortet höchstens eine wartende DNS-Anfrage
    fn answer_query(&mut self, ip: Ipv4Addr) {
        let mut buf = [0u8; DNS_PACKET_MAX];
        let Some((len, peer)) = self.ctx.names.receive(&mut buf) else {
            return;
        };
        if let Some(reply) = captive_reply(&buf[..len], ip) {
            self.ctx.names.send(&reply, peer);
        }
    }

    // ========================================================================
    // Sensoren
    // ========================================================================

    fn evaluate_motion(&mut self, levels: &InputLevels) {
        let now = self.ctx.timebase.now();
        let display = self.game.state().display;
        match self.motion.evaluate(
            now,
            levels.motion,
            display.motion_enabled,
            display.motion_timeout_s,
        ) {
            Some(PowerTransition::Activated) => {
                info!("Bewegung: Display an");
                self.ctx.renderer.power_on();
                self.show_current_state();
            }
            Some(PowerTransition::Deactivated) => {
                info!("Keine Bewegung: Display aus");
                self.ctx.renderer.power_off();
            }
            None => {}
        }
    }

    fn poll_fingerprint(&mut self, levels: &InputLevels) {
        if !self.motion.is_active() || !levels.finger_touch {
            return;
        }
        let now = self.ctx.timebase.now();
        if self
            .passive
            .last_attempt
            .is_some_and(|t| !now.reaches(t, FP_COOLDOWN_MS))
        {
            return;
        }
        if self
            .passive
            .last_poll
            .is_some_and(|t| !now.reaches(t, FP_POLL_INTERVAL_MS))
        {
            return;
        }
        self.passive.last_poll = Some(now);

        self.ctx.fingerprint.flush();
        match self.ctx.fingerprint.identify(&mut self.ctx.timebase) {
            ScanOutcome::NoFinger | ScanOutcome::Unreadable => {}
            ScanOutcome::NoMatch => {
                info!("Fingerabdruck unbekannt");
                self.passive.last_attempt = Some(self.ctx.timebase.now());
                self.announce_unknown();
            }
            ScanOutcome::Match(slot) => {
                info!("Fingerabdruck Slot {}", slot);
                self.passive.last_attempt = Some(self.ctx.timebase.now());
                self.score(usize::from(slot));
            }
        }
    }

    /// Ein Schritt der laufenden Anlern-Sitzung; `Some(ok)` wenn beendet
    pub(crate) fn enrollment_pass(&mut self) -> Option<bool> {
        let enrollment = self.enrollment.as_mut()?;
        let progress = enrollment
            .session
            .step(&mut self.ctx.fingerprint, &mut self.ctx.timebase);
        match progress {
            EnrollProgress::Pending => None,
            EnrollProgress::Prompt(prompt) => {
                self.show_enroll_prompt(prompt.text());
                None
            }
            EnrollProgress::Succeeded | EnrollProgress::Failed(_) => {
                let done = self.enrollment.take()?;
                let ok = progress == EnrollProgress::Succeeded;
                self.finish_enrollment(done, ok);
                Some(ok)
            }
        }
    }
}

