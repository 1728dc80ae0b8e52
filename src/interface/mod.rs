//! Bus interface abstraction for the ATM90E26 driver.

#[cfg(test)]
pub(crate) mod mock;
pub mod spi;
#[cfg(feature = "linux")]
pub mod spidev;

/// Abstraction over the low-level bus access required by the driver.
///
/// Implementations perform raw, ordered byte exchanges and report how many
/// bytes actually moved; the driver turns a wrong count into
/// [`Error::ShortTransfer`](crate::Error::ShortTransfer).
pub trait Atm90e26Interface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Acquires the bus connection.
    fn open(&mut self) -> core::result::Result<(), Self::Error>;

    /// Sets the maximum clock speed and forces SPI mode 0.
    fn configure(&mut self, speed_hz: u32) -> core::result::Result<(), Self::Error>;

    /// Transmits `tx` then receives into `rx` while chip-select stays asserted
    /// across both segments. Returns the number of bytes received.
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> core::result::Result<usize, Self::Error>;

    /// Transmits `tx` as a single chip-select window. Returns the number of
    /// bytes transmitted.
    fn write(&mut self, tx: &[u8]) -> core::result::Result<usize, Self::Error>;

    /// Releases the bus connection.
    fn close(&mut self) -> core::result::Result<(), Self::Error>;
}
