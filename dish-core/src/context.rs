//! Bündel aller Hardware-Kollaborateure des Schedulers

use crate::audio::AudioCues;
use crate::display::Renderer;
use crate::fingerprint::FingerprintReader;
use crate::persist::JsonStore;
use crate::traits::{Platform, Timebase};
use crate::wifi::Connectivity;

/// Rohe Plattform-Implementierungen, wie sie `main` zusammensteckt
pub struct Parts<P: Platform> {
    pub timebase: P::Timebase,
    pub display: P::Display,
    pub sensor: P::Sensor,
    pub inputs: P::Inputs,
    pub audio: P::Audio,
    pub radio: P::Radio,
    pub names: P::Names,
    pub fs: P::Fs,
    pub system: P::System,
    pub requests: P::Requests,
}

/// Hardware mit den darauf aufsetzenden Treibern
pub struct DeviceContext<P: Platform> {
    pub timebase: P::Timebase,
    pub renderer: Renderer<P::Display>,
    pub fingerprint: FingerprintReader<P::Sensor>,
    pub inputs: P::Inputs,
    pub audio: AudioCues<P::Audio>,
    pub connectivity: Connectivity<P::Radio>,
    pub names: P::Names,
    pub store: JsonStore<P::Fs>,
    pub system: P::System,
    pub requests: P::Requests,
}

impl<P: Platform> DeviceContext<P> {
    pub fn new(parts: Parts<P>) -> Self {
        let now = parts.timebase.now();
        Self {
            timebase: parts.timebase,
            renderer: Renderer::new(parts.display),
            fingerprint: FingerprintReader::new(parts.sensor),
            inputs: parts.inputs,
            audio: AudioCues::new(parts.audio),
            connectivity: Connectivity::new(parts.radio, now),
            names: parts.names,
            store: JsonStore::new(parts.fs),
            system: parts.system,
            requests: parts.requests,
        }
    }
}
