//! High-level ATM90E26 device driver implementation.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::interface::spi::SpiInterface;
use crate::interface::Atm90e26Interface;
use crate::log::{debug, trace, warning};
use crate::params::CurrentGain;
use crate::registers::{
    read_header,
    write_frame,
    MAX_ADDRESS,
    REG_LASTDATA,
    REG_SOFTRESET,
    SOFT_RESET_COMMAND,
};
use embedded_hal::spi::SpiDevice;

// Every register carries a 16-bit payload.
const REGISTER_BYTES: usize = 2;
// Header byte plus payload.
const WRITE_FRAME_BYTES: usize = 3;

/// Lifecycle state of a driver handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// No bus connection; every bus operation fails with `NotInitialized`.
    Uninitialized,
    /// Bus open and configured; the start-up sequence has not completed.
    Initialized,
    /// Start-up sequence completed with the given current gain.
    Running(CurrentGain),
}

/// High-level synchronous driver for the ATM90E26 energy meter.
///
/// The handle exclusively owns its interface. The multi-step operations
/// (verified reads, the start-up sequence) are not atomic against another
/// bus master, since `LastData` mirrors whichever access happened last;
/// shared use needs one lock held for the whole operation.
pub struct Atm90e26<IFACE> {
    pub(crate) interface: IFACE,
    pub(crate) config: Config,
    pub(crate) state: State,
}

impl<IFACE> Atm90e26<IFACE> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates an uninitialized driver instance from the provided bus interface.
    pub fn new(interface: IFACE, config: Config) -> Self {
        Self {
            interface,
            config,
            state: State::Uninitialized,
        }
    }

    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> (IFACE, Config) {
        (self.interface, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns the configuration the handle was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns `true` once `init` succeeded and until `deinit`.
    pub fn is_initialized(&self) -> bool {
        !matches!(self.state, State::Uninitialized)
    }
}

impl<SPI> Atm90e26<SpiInterface<SPI>>
where
    SPI: SpiDevice,
{
    // ==================================================================
    // == SPI Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for `embedded-hal` SPI devices.
    pub fn new_spi(spi: SPI, config: Config) -> Self {
        Self::new(SpiInterface::new(spi), config)
    }

    /// Releases the driver, returning the SPI device and configuration.
    pub fn release_spi(self) -> (SPI, Config) {
        let (iface, config) = self.release();
        (iface.release(), config)
    }
}

#[cfg(feature = "linux")]
impl Atm90e26<crate::interface::spidev::SpidevInterface> {
    /// Opens and configures a Linux spidev node, returning an initialized driver.
    pub fn open_spidev(
        path: impl AsRef<std::path::Path>,
        config: Config,
    ) -> Result<Self, std::io::Error> {
        let interface = crate::interface::spidev::SpidevInterface::new(path);
        let mut device = Self::new(interface, config);
        device.init()?;
        Ok(device)
    }
}

impl<IFACE, CommE> Atm90e26<IFACE>
where
    IFACE: Atm90e26Interface<Error = CommE>,
{
    // ==================================================================
    // == Lifecycle ======================================================
    // ==================================================================
    /// Opens and configures the bus.
    ///
    /// The handle becomes `Initialized` only when both steps succeed; a
    /// rejected configuration closes the bus again. Calling `init` on an
    /// initialized handle is a no-op.
    pub fn init(&mut self) -> Result<(), CommE> {
        self.config.validate().map_err(|_| Error::InvalidConfig)?;

        if self.is_initialized() {
            return Ok(());
        }

        self.interface.open().map_err(Error::DeviceOpenFailed)?;
        if let Err(err) = self.interface.configure(self.config.speed_hz) {
            if self.interface.close().is_err() {
                warning!("bus close failed after rejected configuration");
            }
            return Err(Error::ConfigError(err));
        }

        self.state = State::Initialized;
        debug!("atm90e26 initialized at {} Hz", self.config.speed_hz);
        Ok(())
    }

    /// Closes the bus and returns the handle to `Uninitialized`.
    ///
    /// The state resets even when closing fails; the close error is still
    /// reported.
    pub fn deinit(&mut self) -> Result<(), CommE> {
        let closed = self.interface.close();
        self.state = State::Uninitialized;
        debug!("atm90e26 deinitialized");
        closed.map_err(Error::Interface)
    }

    /// Issues the soft reset command.
    pub fn soft_reset(&mut self) -> Result<(), CommE> {
        self.write_register(REG_SOFTRESET, SOFT_RESET_COMMAND)
    }

    // ==================================================================
    // == Register Access ================================================
    // ==================================================================
    /// Writes a 16-bit value as one 3-byte frame.
    pub fn write_register(&mut self, address: u8, value: u16) -> Result<(), CommE> {
        self.ensure_initialized()?;
        Self::check_address(address)?;

        let frame = write_frame(address, value);
        let sent = self.interface.write(&frame).map_err(Error::Interface)?;
        if sent != WRITE_FRAME_BYTES {
            return Err(Error::ShortTransfer {
                expected: WRITE_FRAME_BYTES,
                actual: sent,
            });
        }

        trace!("wrote {:#x} = {:#x}", address, value);
        Ok(())
    }

    /// Reads a register once, without consulting `LastData`.
    pub fn raw_read_register(&mut self, address: u8) -> Result<u16, CommE> {
        self.ensure_initialized()?;
        Self::check_address(address)?;

        let header = read_header(address);
        let mut raw = [0u8; REGISTER_BYTES];
        let received = self
            .interface
            .transfer(&header, &mut raw)
            .map_err(Error::Interface)?;
        if received != REGISTER_BYTES {
            return Err(Error::ShortTransfer {
                expected: REGISTER_BYTES,
                actual: received,
            });
        }

        Ok(u16::from_be_bytes(raw))
    }

    /// Reads a register and cross-checks it against the `LastData` shadow.
    ///
    /// A matching shadow costs two bus reads. On a mismatch `LastData` is read
    /// once more and that value is returned as-is, for three reads in total.
    pub fn verified_read_register(&mut self, address: u8) -> Result<u16, CommE> {
        let target = self.raw_read_register(address)?;
        let shadow = self.raw_read_register(REG_LASTDATA)?;
        if target == shadow {
            return Ok(target);
        }

        warning!(
            "register {:#x} read {:#x} but LastData holds {:#x}",
            address, target, shadow
        );
        self.raw_read_register(REG_LASTDATA)
    }

    /// Verified read, `mutate`, write back. Returns the written value.
    pub(crate) fn modify_register<F>(&mut self, address: u8, mutate: F) -> Result<u16, CommE>
    where
        F: FnOnce(u16) -> u16,
    {
        let current = self.verified_read_register(address)?;
        let updated = mutate(current);
        self.write_register(address, updated)?;
        Ok(updated)
    }

    fn ensure_initialized(&self) -> Result<(), CommE> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn check_address(address: u8) -> Result<(), CommE> {
        if address > MAX_ADDRESS {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }
}
