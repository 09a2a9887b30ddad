// SPI-Anbindung der MAX7219-Kette

use dish_core::error::BusError;
use dish_core::traits::DisplayBus;
use esp_hal::Blocking;
use esp_hal::gpio::Output;
use esp_hal::spi::master::Spi;

/// SPI2 plus manuell geführtes Chip-Select
///
/// Der MAX7219 übernimmt die geschobenen Daten mit der steigenden
/// CS-Flanke, deshalb bleibt CS für einen kompletten Frame low.
pub struct SpiDisplayBus {
    spi: Spi<'static, Blocking>,
    cs: Output<'static>,
}

impl SpiDisplayBus {
    pub fn new(spi: Spi<'static, Blocking>, cs: Output<'static>) -> Self {
        Self { spi, cs }
    }
}

impl DisplayBus for SpiDisplayBus {
    fn write(&mut self, frame: &[u8]) -> Result<(), BusError> {
        self.cs.set_low();
        let result = self.spi.write(frame);
        self.cs.set_high();
        result.map_err(|_| BusError::WriteFailed)
    }
}
