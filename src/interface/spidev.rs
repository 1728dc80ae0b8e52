//! Linux `spidev` interface implementation.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};

use super::Atm90e26Interface;
use crate::log::debug;

/// Interface over a Linux SPI character device such as `/dev/spidev0.0`.
pub struct SpidevInterface {
    path: PathBuf,
    spi: Option<Spidev>,
}

impl SpidevInterface {
    /// Creates an interface for the given device node without opening it.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            spi: None,
        }
    }

    /// Device node this interface talks to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` while the device node is open.
    pub fn is_open(&self) -> bool {
        self.spi.is_some()
    }

    fn device(&mut self) -> io::Result<&mut Spidev> {
        self.spi
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "spidev not open"))
    }
}

impl Atm90e26Interface for SpidevInterface {
    type Error = io::Error;

    fn open(&mut self) -> io::Result<()> {
        let spi = Spidev::open(&self.path)?;
        debug!("spidev device opened");
        self.spi = Some(spi);
        Ok(())
    }

    fn configure(&mut self, speed_hz: u32) -> io::Result<()> {
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        self.device()?.configure(&options)
    }

    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> io::Result<usize> {
        let received = rx.len();
        let spi = self.device()?;
        let mut transfers = [SpidevTransfer::write(tx), SpidevTransfer::read(rx)];
        spi.transfer_multiple(&mut transfers)?;
        Ok(received)
    }

    fn write(&mut self, tx: &[u8]) -> io::Result<usize> {
        self.device()?.write(tx)
    }

    fn close(&mut self) -> io::Result<()> {
        if self.spi.take().is_some() {
            debug!("spidev device closed");
        }
        Ok(())
    }
}
