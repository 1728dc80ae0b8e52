//! `#![no_std]` driver for the ATM90E26 single-phase energy metering IC.
//!
//! The driver owns a bus [`interface`](crate::interface::Atm90e26Interface),
//! brings the chip up through [`Atm90e26::init`] and [`Atm90e26::start`], and
//! exposes RMS current, RMS voltage and active power in physical units.
//!
//! ```no_run
//! # use embedded_hal::spi::SpiDevice;
//! # fn run<SPI: SpiDevice>(spi: SPI) -> Result<(), atm90e26::Error<SPI::Error>> {
//! use atm90e26::{Atm90e26, config::Config, params::{CurrentGain, CurrentScale}};
//!
//! let config = Config::new().current_scale(CurrentScale::Boosted).build();
//! let mut meter = Atm90e26::new_spi(spi, config);
//! meter.init()?;
//! meter.start(CurrentGain::Gain24, 20.0)?;
//! let amps = meter.irms_amps()?;
//! let volts = meter.vrms_volts()?;
//! let watts = meter.power_watts()?;
//! meter.deinit()?;
//! # let _ = (amps, volts, watts);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod error;
mod log;

pub mod config;
pub mod device;
pub mod dump;
pub mod interface;
pub mod measurement;
pub mod params;
pub mod registers;
pub mod startup;

pub use crate::device::{Atm90e26, State};
pub use crate::error::{Error, Result};
