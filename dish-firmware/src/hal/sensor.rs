// UART-Anbindung des R503 Fingerabdrucksensors

use dish_core::error::BusError;
use dish_core::traits::SensorUart;
use esp_hal::Blocking;
use esp_hal::uart::Uart;

pub struct UartSensor {
    uart: Uart<'static, Blocking>,
}

impl UartSensor {
    pub fn new(uart: Uart<'static, Blocking>) -> Self {
        Self { uart }
    }
}

impl SensorUart for UartSensor {
    fn write(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        let mut rest = bytes;
        while !rest.is_empty() {
            match self.uart.write(rest) {
                Ok(0) | Err(_) => return Err(BusError::WriteFailed),
                Ok(n) => rest = &rest[n..],
            }
        }
        self.uart.flush().map_err(|_| BusError::WriteFailed)
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        // Nur was schon im FIFO liegt; Fehler (Overrun, Framing) zählen als leer
        self.uart.read_buffered(buf).unwrap_or(0)
    }
}
