// Digitale Eingänge: Taster, PIR und Touch-Ausgang des Sensors

use dish_core::traits::InputPins;
use dish_core::types::InputLevels;
use esp_hal::gpio::Input;

/// Normiert alle Pegel auf "aktiv = true"
///
/// Taster und Touch-Ausgang ziehen gegen GND (Pull-up, aktiv low),
/// der PIR liefert aktiv high.
pub struct GpioInputs {
    pub front: Input<'static>,
    pub side: Input<'static>,
    pub motion: Input<'static>,
    pub finger_touch: Input<'static>,
}

impl InputPins for GpioInputs {
    fn read(&mut self) -> InputLevels {
        InputLevels {
            front: self.front.is_low(),
            side: self.side.is_low(),
            motion: self.motion.is_high(),
            finger_touch: self.finger_touch.is_low(),
        }
    }
}
