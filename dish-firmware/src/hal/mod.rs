// Hardware Abstraction Layer (HAL) Module
//
// Implementiert die Traits aus `dish_core::traits` für den ESP32-C6.
// Direkte Peripherie (SPI, UART, GPIO, LEDC, Flash) wird im Scheduler-
// Thread bedient; WiFi, DNS und HTTP laufen über die Bridge-Kanäle.

pub mod audio;
pub mod display;
pub mod inputs;
pub mod names;
pub mod radio;
pub mod requests;
pub mod sensor;
pub mod storage;
pub mod timebase;

pub use audio::PwmSpeaker;
pub use display::SpiDisplayBus;
pub use inputs::GpioInputs;
pub use names::NameBridge;
pub use radio::RadioBridge;
pub use requests::ApiBridge;
pub use sensor::UartSensor;
pub use storage::FlashFileSystem;
pub use timebase::{EspSystem, EspTimebase};

use dish_core::traits::Platform;

/// Plattform-Bündel für `Scheduler<EspPlatform>`
pub struct EspPlatform;

impl Platform for EspPlatform {
    type Timebase = EspTimebase;
    type Display = SpiDisplayBus;
    type Sensor = UartSensor;
    type Inputs = GpioInputs;
    type Audio = PwmSpeaker;
    type Radio = RadioBridge;
    type Names = NameBridge;
    type Fs = FlashFileSystem;
    type System = EspSystem;
    type Requests = ApiBridge;
}
