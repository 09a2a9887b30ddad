// Lautsprecher über LEDC-PWM mit schaltbarem Verstärker

use dish_core::traits::AudioSink;
use dish_core::types::Note;
use esp_hal::delay::Delay;
use esp_hal::gpio::{AnyPin, DriveMode, Output};
use esp_hal::ledc::channel::{self, ChannelHW, ChannelIFace};
use esp_hal::ledc::timer::{self, TimerIFace};
use esp_hal::ledc::{Ledc, LowSpeed};
use esp_hal::time::Rate;

use crate::config::AMP_WARMUP_MS;

/// Spielt Notenfolgen blockierend ab
///
/// Der Duty-Cycle ist 10 Bit breit (0..=1023); die Lautstärkestufen des
/// Kerns liegen bei 40..300. Für jede Note wird der LEDC-Timer auf die
/// neue Frequenz umkonfiguriert.
pub struct PwmSpeaker {
    ledc: Ledc<'static>,
    speaker: AnyPin<'static>,
    amp: Output<'static>,
    delay: Delay,
}

impl PwmSpeaker {
    pub fn new(ledc: Ledc<'static>, speaker: AnyPin<'static>, amp: Output<'static>) -> Self {
        Self {
            ledc,
            speaker,
            amp,
            delay: Delay::new(),
        }
    }

    fn tone(&mut self, note: &Note, duty: u16) {
        let mut timer = self.ledc.timer::<LowSpeed>(timer::Number::Timer0);
        let configured = timer.configure(timer::config::Config {
            duty: timer::config::Duty::Duty10Bit,
            clock_source: timer::LSClockSource::APBClk,
            frequency: Rate::from_hz(u32::from(note.freq_hz)),
        });
        if configured.is_err() {
            defmt::warn!("Audio: Frequenz {} Hz nicht einstellbar", note.freq_hz);
            self.delay.delay_millis(u32::from(note.duration_ms));
            return;
        }

        let mut channel = self
            .ledc
            .channel(channel::Number::Channel0, self.speaker.reborrow());
        if channel
            .configure(channel::config::Config {
                timer: &timer,
                duty_pct: 0,
                drive_mode: DriveMode::PushPull,
            })
            .is_ok()
        {
            channel.set_duty_hw(u32::from(duty));
            self.delay.delay_millis(u32::from(note.duration_ms));
            channel.set_duty_hw(0);
        }
    }
}

impl AudioSink for PwmSpeaker {
    fn play(&mut self, notes: &[Note], duty: u16) {
        self.amp.set_high();
        self.delay.delay_millis(AMP_WARMUP_MS);

        for note in notes {
            if note.is_rest() {
                self.delay.delay_millis(u32::from(note.duration_ms));
            } else {
                self.tone(note, duty);
            }
        }

        self.amp.set_low();
    }
}
