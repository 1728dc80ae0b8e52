//! SPI interface implementation built on top of `embedded-hal` `SpiDevice`.

use embedded_hal::spi::{Operation, SpiDevice};

use super::Atm90e26Interface;

/// SPI-based interface implementation for the ATM90E26 driver.
///
/// `embedded-hal` devices are handed over already configured, so
/// [`open`](Atm90e26Interface::open) and [`close`](Atm90e26Interface::close)
/// do nothing and [`configure`](Atm90e26Interface::configure) only records
/// the requested clock. The owner of the HAL device must set SPI mode 0.
pub struct SpiInterface<SPI> {
    spi: SPI,
    speed_hz: Option<u32>,
}

impl<SPI> SpiInterface<SPI> {
    /// Creates a new interface from the provided SPI device abstraction.
    pub const fn new(spi: SPI) -> Self {
        Self {
            spi,
            speed_hz: None,
        }
    }

    /// Clock last passed to `configure`, if any.
    pub fn speed_hz(&self) -> Option<u32> {
        self.speed_hz
    }

    /// Provides mutable access to the wrapped SPI device.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the interface and returns the owned SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Atm90e26Interface for SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn open(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }

    fn configure(&mut self, speed_hz: u32) -> core::result::Result<(), Self::Error> {
        self.speed_hz = Some(speed_hz);
        Ok(())
    }

    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> core::result::Result<usize, Self::Error> {
        let received = rx.len();
        let mut operations = [Operation::Write(tx), Operation::Read(rx)];
        self.spi.transaction(&mut operations)?;
        Ok(received)
    }

    fn write(&mut self, tx: &[u8]) -> core::result::Result<usize, Self::Error> {
        self.spi.write(tx)?;
        Ok(tx.len())
    }

    fn close(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}
