//! Operationen auf Spielstand und Gerät
//!
//! Jede zustandsändernde Operation speichert den Stand und stößt die
//! passende Anzeige an, bevor sie zurückkehrt. Aufgerufen werden sie von
//! Tasten, Fingerabdruck und der HTTP-API, immer innerhalb eines
//! Scheduler-Durchlaufs.

use core::fmt::Write;
use core::net::Ipv4Addr;

use crate::api::{
    ApiRequest, ApiResponse, DeviceStatus, DisplayUpdate, Snapshot, SoundUpdate, TextsUpdate,
};
use crate::audio::Cue;
use crate::buttons::{ButtonAction, ButtonId};
use crate::config::{
    BANNER_SCROLL_SPEED_MS, FIRMWARE_VERSION, REBOOT_AFTER_CONFIG_MS,
    REBOOT_AFTER_REQUEST_MS, REBOOT_AFTER_SETUP_FAIL_MS, REBOOT_AFTER_SETUP_OK_MS,
    REBOOT_AFTER_WIFI_RESET_MS,
};
use crate::display::Continuation;
use crate::fingerprint::EnrollSession;
use crate::fingerprint::EnrollPrompt;
use crate::game::{Message, Reward};
use crate::log::{info, warn};
use crate::logic::truncated;
use crate::scheduler::{Enrollment, Scheduler};
use crate::state::{Avatar, GameState, Name, Rewards};
use crate::traits::{Platform, RequestSource, Timebase};
use crate::types::{NetworkConfig, WifiCredentials};

impl<P: Platform> Scheduler<P> {
    // ========================================================================
    // Anzeige & Sound
    // ========================================================================

    /// Ausräum-Erinnerung oder "wer ist dran" als Endlosschleife
    ///
    /// Bei abgeschaltetem Display passiert nichts.
    pub fn show_current_state(&mut self) {
        if !self.motion.is_active() {
            return;
        }
        let display = self.game.state().display;
        self.ctx.renderer.set_brightness(display.brightness);
        let text = self.game.current_message();
        let now = self.ctx.timebase.now();
        self.ctx.renderer.start_scroll(
            &text,
            display.scroll_count,
            display.scroll_speed_ms,
            Continuation::ShowCurrentState,
            now,
        );
    }

    /// Einmaliger Lauftext, danach zurück zum aktuellen Stand
    fn announce(&mut self, text: &str) {
        let speed = self.game.state().display.scroll_speed_ms;
        let now = self.ctx.timebase.now();
        self.ctx
            .renderer
            .start_scroll(text, 1, speed, Continuation::ShowCurrentState, now);
    }

    pub(crate) fn announce_unknown(&mut self) {
        let text: Message = truncated(&self.game.state().texts.unknown);
        self.announce(&text);
        self.play(Cue::Error);
    }

    fn play(&mut self, cue: Cue) {
        self.ctx.timebase.feed_watchdog();
        let sound = self.game.state().sound;
        self.ctx.audio.play(cue, &sound);
    }

    fn persist(&mut self) {
        if let Err(e) = self.ctx.store.save_state(self.game.state()) {
            warn!("State speichern fehlgeschlagen: {:?}", e);
        }
    }

    pub(crate) fn show_enroll_prompt(&mut self, text: &str) {
        let now = self.ctx.timebase.now();
        self.ctx
            .renderer
            .start_scroll(text, 99, BANNER_SCROLL_SPEED_MS, Continuation::Nothing, now);
    }

    fn schedule_reboot(&mut self, delay_ms: u32) {
        let at = self.ctx.timebase.now().add_millis(delay_ms);
        info!("Neustart in {} ms", delay_ms);
        self.pending_reboot = Some(at);
    }

    // ========================================================================
    // Spiel
    // ========================================================================

    /// Punkt für `player`; bei ungültigem Index "unbekannt"-Hinweis
    pub fn score(&mut self, player: usize) -> Option<Reward> {
        let timestamp = self.ctx.timebase.wall_secs();
        let outcome = match self.game.score(player, timestamp) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Punkt für Spieler {} abgelehnt: {:?}", player, e);
                self.announce_unknown();
                return None;
            }
        };
        self.persist();

        let text = self.game.score_message(&outcome);
        if outcome.reward.is_some() {
            self.play(Cue::Milestone);
        } else {
            self.play(Cue::Score);
        }
        self.announce(&text);
        outcome.reward
    }

    pub fn start(&mut self) {
        self.game.start();
        self.persist();
        self.play(Cue::Start);
        self.show_current_state();
    }

    pub fn skip(&mut self) {
        let skipped = self.game.skip();
        self.persist();
        let text = self.game.skipped_message(skipped);
        self.announce(&text);
    }

    pub fn reset(&mut self) {
        self.game.reset();
        self.persist();
        let text: Message = truncated(&self.game.state().texts.reset);
        self.announce(&text);
    }

    pub fn show_highscores(&mut self) {
        self.play(Cue::Highscore);
        let text = self.game.highscore_line();
        self.announce(&text);
    }

    pub fn show_ip(&mut self) {
        let mut text = Message::new();
        match self.current_ip() {
            Some(ip) => {
                let _ = write!(text, "{}", ip);
            }
            None => {
                let _ = text.push_str("KEINE IP");
            }
        }
        self.announce(&text);
    }

    /// Namen (und optional Avatare) setzen
    ///
    /// Fingerabdrücke von Slots, die dabei wegfallen, werden im Sensor
    /// gelöscht.
    pub fn set_names(&mut self, names: &[Name], avatars: Option<&[Avatar]>) -> bool {
        let previous = match self.game.set_names(names, avatars) {
            Ok(previous) => previous,
            Err(_) => return false,
        };
        for slot in names.len()..previous {
            if !self.ctx.fingerprint.delete(slot as u16, &mut self.ctx.timebase) {
                warn!("Fingerabdruck Slot {} nicht gelöscht", slot);
            }
        }
        self.persist();
        self.show_current_state();
        true
    }

    /// Übernimmt nur die gesendeten Texte
    pub fn set_texts(&mut self, update: TextsUpdate) {
        update.apply(&mut self.game.state_mut().texts);
        self.persist();
        self.show_current_state();
    }

    pub fn set_display_config(&mut self, update: DisplayUpdate) {
        let display = &mut self.game.state_mut().display;
        if let Some(brightness) = update.brightness {
            display.brightness = brightness;
        }
        if let Some(speed) = update.scroll_speed_ms {
            display.scroll_speed_ms = speed;
        }
        if let Some(count) = update.scroll_count {
            display.scroll_count = count;
        }
        if let Some(timeout) = update.motion_timeout_s {
            display.motion_timeout_s = timeout;
        }
        if let Some(enabled) = update.motion_enabled {
            display.motion_enabled = enabled;
        }
        display.clamp();
        let display = *display;
        self.ctx.renderer.set_brightness(display.brightness);
        self.ctx.renderer.set_speed(display.scroll_speed_ms);
        self.persist();
    }

    pub fn set_sound_config(&mut self, update: SoundUpdate) {
        update.apply(&mut self.game.state_mut().sound);
        self.persist();
    }

    pub fn set_rewards(&mut self, player: usize, rewards: Rewards) -> bool {
        if self.game.set_rewards(player, rewards).is_err() {
            return false;
        }
        self.persist();
        true
    }

    pub fn set_fingerprint_flag(&mut self, slot: usize, registered: bool) -> bool {
        if self.game.set_fingerprint_flag(slot, registered).is_err() {
            return false;
        }
        self.persist();
        true
    }

    /// Backup einspielen
    pub fn restore(&mut self, state: GameState) {
        self.game.restore(state);
        self.persist();
        self.show_current_state();
    }

    // ========================================================================
    // Fingerabdruck
    // ========================================================================

    /// Startet eine Anlern-Sitzung für `slot`
    ///
    /// Ab jetzt arbeitet der Scheduler modal, bis die Sitzung endet.
    pub fn begin_enrollment(&mut self, slot: usize, reply_pending: bool) -> bool {
        if self.enrollment.is_some() || slot >= self.game.state().player_count() {
            return false;
        }
        info!("FP: Anlernen Slot {}", slot);
        self.ctx.fingerprint.flush();
        let now = self.ctx.timebase.now();
        self.enrollment = Some(Enrollment {
            session: EnrollSession::new(slot as u16, now),
            reply_pending,
        });
        self.show_enroll_prompt(EnrollPrompt::PlaceFinger.text());
        true
    }

    /// Anlernen bis zum Ende durchlaufen lassen
    pub fn enroll_fingerprint(&mut self, slot: usize) -> bool {
        if !self.begin_enrollment(slot, false) {
            return false;
        }
        loop {
            self.ctx.timebase.feed_watchdog();
            let now = self.ctx.timebase.now();
            let _ = self.ctx.renderer.tick(now);
            if let Some(ok) = self.enrollment_pass() {
                return ok;
            }
            self.ctx.timebase.delay_ms(20);
        }
    }

    pub(crate) fn finish_enrollment(&mut self, done: Enrollment, ok: bool) {
        let slot = usize::from(done.session.slot());
        let speed = BANNER_SCROLL_SPEED_MS;
        let mut text = Message::new();
        if ok {
            let _ = self.game.set_fingerprint_flag(slot, true);
            self.persist();
            let _ = write!(text, "{} GESPEICHERT!", self.game.player_name(slot));
            self.play(Cue::Score);
        } else {
            let _ = text.push_str("FEHLER!");
            self.play(Cue::Error);
        }
        let now = self.ctx.timebase.now();
        self.ctx
            .renderer
            .start_scroll(&text, 2, speed, Continuation::ShowCurrentState, now);

        if done.reply_pending {
            self.ctx.requests.reply(ApiResponse::Enrolled(ok));
        }
    }

    pub fn delete_fingerprint(&mut self, slot: usize) -> bool {
        if slot >= self.game.state().player_count() {
            return false;
        }
        let deleted = self.ctx.fingerprint.delete(slot as u16, &mut self.ctx.timebase);
        let _ = self.game.set_fingerprint_flag(slot, false);
        self.persist();
        deleted
    }

    // ========================================================================
    // Tasten
    // ========================================================================

    pub fn handle_button_action(&mut self, action: ButtonAction) {
        match action {
            ButtonAction::SingleClick(ButtonId::Front) => self.start(),
            ButtonAction::DoubleClick(ButtonId::Front) => self.show_highscores(),
            ButtonAction::LongPress(ButtonId::Front) => self.skip(),
            ButtonAction::SingleClick(ButtonId::Side) => self.show_ip(),
            ButtonAction::LongPress(ButtonId::Side) => self.reset(),
            ButtonAction::DoubleClick(ButtonId::Side) => {}
            ButtonAction::WifiReset => {
                info!("WLAN-Reset angefordert");
                let now = self.ctx.timebase.now();
                let speed = self.game.state().display.scroll_speed_ms;
                self.ctx
                    .renderer
                    .start_scroll("WIFI RESET!", 1, speed, Continuation::Nothing, now);
                self.ctx.store.clear_wifi();
                self.credentials = None;
                self.schedule_reboot(REBOOT_AFTER_WIFI_RESET_MS);
            }
        }
    }

    // ========================================================================
    // Netzwerk-Konfiguration
    // ========================================================================

    pub fn set_wifi(&mut self, credentials: WifiCredentials) -> bool {
        if let Err(e) = self.ctx.store.save_wifi(&credentials) {
            warn!("wifi.json speichern fehlgeschlagen: {:?}", e);
            return false;
        }
        self.credentials = Some(credentials);
        true
    }

    pub fn set_network(&mut self, config: NetworkConfig) -> bool {
        if let Err(e) = self.ctx.store.save_network(&config) {
            warn!("network.json speichern fehlgeschlagen: {:?}", e);
            return false;
        }
        self.network = config;
        true
    }

    /// Zugangsdaten aus dem Setup-Portal: testen, nur bei Erfolg speichern,
    /// danach neu starten
    pub fn setup_wifi(&mut self, credentials: WifiCredentials) -> Option<Ipv4Addr> {
        let ip = self
            .ctx
            .connectivity
            .quick_connect(&credentials, &self.network, &mut self.ctx.timebase);
        if ip.is_some() {
            if let Err(e) = self.ctx.store.save_wifi(&credentials) {
                warn!("wifi.json speichern fehlgeschlagen: {:?}", e);
            }
            self.credentials = Some(credentials);
        }
        self.schedule_reboot(if ip.is_some() {
            REBOOT_AFTER_SETUP_OK_MS
        } else {
            REBOOT_AFTER_SETUP_FAIL_MS
        });
        ip
    }

    pub fn factory_reset(&mut self) {
        self.ctx.store.factory_reset();
        self.schedule_reboot(REBOOT_AFTER_CONFIG_MS);
    }

    // ========================================================================
    // API
    // ========================================================================

    fn status(&self) -> DeviceStatus {
        let now = self.ctx.timebase.now();
        let wifi = self.ctx.connectivity.state();
        DeviceStatus {
            mode: wifi.mode,
            ip: wifi.current_ip.map_or([0; 4], |ip| ip.octets()),
            wifi_failures: wifi.failure_count,
            uptime_s: now.ticks_since(self.booted_at).max(0) as u32 / 1_000,
            display_active: self.motion.is_active(),
            enrolling: self.enrollment.is_some(),
        }
    }

    /// Führt eine API-Anfrage aus und beantwortet sie
    ///
    /// Anlern-Anfragen werden erst beantwortet, wenn die Sitzung endet.
    pub fn handle_request(&mut self, request: ApiRequest) {
        let response = match request {
            ApiRequest::Score { player } => ApiResponse::Scored(self.score(usize::from(player))),
            ApiRequest::Start => {
                self.start();
                ApiResponse::Ok
            }
            ApiRequest::Skip => {
                self.skip();
                ApiResponse::Ok
            }
            ApiRequest::Reset => {
                self.reset();
                ApiResponse::Ok
            }
            ApiRequest::SetNames { names, avatars } => {
                ok_or_rejected(self.set_names(&names, avatars.as_deref()))
            }
            ApiRequest::SetTexts(texts) => {
                self.set_texts(texts);
                ApiResponse::Ok
            }
            ApiRequest::SetDisplay(update) => {
                self.set_display_config(update);
                ApiResponse::Ok
            }
            ApiRequest::SetSound(sound) => {
                self.set_sound_config(sound);
                ApiResponse::Ok
            }
            ApiRequest::SetRewards { player, rewards } => {
                ok_or_rejected(self.set_rewards(usize::from(player), rewards))
            }
            ApiRequest::EnrollFingerprint { slot } => {
                if self.begin_enrollment(usize::from(slot), true) {
                    return;
                }
                ApiResponse::Enrolled(false)
            }
            ApiRequest::DeleteFingerprint { slot } => {
                ApiResponse::Deleted(self.delete_fingerprint(usize::from(slot)))
            }
            ApiRequest::SetFingerprintFlag { slot, registered } => {
                ok_or_rejected(self.set_fingerprint_flag(usize::from(slot), registered))
            }
            ApiRequest::FingerprintCount => {
                ApiResponse::Count(self.ctx.fingerprint.count(&mut self.ctx.timebase))
            }
            ApiRequest::Button(action) => {
                self.handle_button_action(action);
                ApiResponse::Ok
            }
            ApiRequest::Snapshot => {
                let status = self.status();
                ApiResponse::Snapshot(Snapshot {
                    state: self.game.state(),
                    status,
                    version: FIRMWARE_VERSION,
                })
            }
            ApiRequest::CurrentIp => ApiResponse::Ip(self.ctx.connectivity.current_ip()),
            ApiRequest::Restore(state) => {
                self.restore(state);
                ApiResponse::Ok
            }
            ApiRequest::SetWifi(credentials) => ok_or_rejected(self.set_wifi(credentials)),
            ApiRequest::SetNetwork(config) => ok_or_rejected(self.set_network(config)),
            ApiRequest::SetupWifi(credentials) => ApiResponse::Setup(self.setup_wifi(credentials)),
            ApiRequest::ScanResults => ApiResponse::Networks(self.ctx.connectivity.networks()),
            ApiRequest::FactoryReset => {
                self.factory_reset();
                ApiResponse::Ok
            }
            ApiRequest::Reboot => {
                self.schedule_reboot(REBOOT_AFTER_REQUEST_MS);
                ApiResponse::Ok
            }
            ApiRequest::SoundTest => {
                self.play(Cue::Score);
                ApiResponse::Ok
            }
        };
        self.ctx.requests.reply(response);
    }
}

fn ok_or_rejected(ok: bool) -> ApiResponse<'static> {
    if ok { ApiResponse::Ok } else { ApiResponse::Rejected }
}
