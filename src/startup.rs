//! Start-up sequence bringing an initialized ATM90E26 into metering.

use crate::device::{Atm90e26, State};
use crate::error::{Error, Result};
use crate::interface::Atm90e26Interface;
use crate::log::debug;
use crate::params::CurrentGain;
use crate::registers::{
    FunctionEnable,
    MeterMode,
    DEFAULT_CS2,
    DEFAULT_IGAINL,
    REG_ADJSTART,
    REG_CALSTART,
    REG_CS2,
    REG_FUNCEN,
    REG_IGAINL,
    REG_MMODE,
    REG_SAGTH,
    START_WITHOUT_CHECKSUM,
};

// SagTh is expressed in units of 10 mV.
const SAG_COUNTS_PER_VOLT: f32 = 100.0;

/// Steps of the start-up sequence, in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupStep {
    /// `SoftReset = 0x789A`.
    SoftReset,
    /// Read-modify-write of `MMode[15:13]`.
    CurrentGain,
    /// `CalStart = 0x5678`.
    CalibrationStart,
    /// `AdjStart = 0x5678`.
    AdjustmentStart,
    /// `IgainL = 0x21C1`.
    CurrentGainCalibration,
    /// `CS2 = 0xE20E`.
    AdjustmentChecksum,
    /// `SagTh` from the requested threshold.
    SagThreshold,
    /// Read-modify-write setting the sag enable and WarnOut bits of `FuncEn`.
    SagEnable,
}

/// Converts a sag threshold in volts to `SagTh` counts, rounding to nearest.
///
/// Returns `None` for negative, NaN or out-of-range thresholds.
pub fn sag_threshold_counts(volts: f32) -> Option<u16> {
    if volts.is_nan() || volts < 0.0 {
        return None;
    }
    // f32 * 100 is exact in f64, so adding one half and truncating rounds
    // half-up without drift. The range check applies to the rounded count.
    let shifted = f64::from(volts) * f64::from(SAG_COUNTS_PER_VOLT) + 0.5;
    if shifted >= 65_536.0 {
        return None;
    }
    Some(shifted as u16)
}

impl<IFACE, CommE> Atm90e26<IFACE>
where
    IFACE: Atm90e26Interface<Error = CommE>,
{
    /// Runs the start-up sequence and enters [`State::Running`].
    ///
    /// Valid once initialized; a running handle is taken back to
    /// `Initialized` first since the soft reset discards the previous setup.
    /// The first failing step aborts the sequence and leaves the handle
    /// `Initialized`. Writes already issued are not rolled back.
    pub fn start(&mut self, gain: CurrentGain, sag_threshold_volts: f32) -> Result<(), CommE> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }
        let sag_counts = sag_threshold_counts(sag_threshold_volts).ok_or(Error::InvalidArgument)?;

        self.state = State::Initialized;

        self.run_step(StartupStep::SoftReset, |dev| dev.soft_reset())?;
        self.run_step(StartupStep::CurrentGain, |dev| {
            dev.modify_register(REG_MMODE, |mmode| {
                u16::from(MeterMode::from(mmode).with_current_gain(gain))
            })
            .map(|_| ())
        })?;
        self.run_step(StartupStep::CalibrationStart, |dev| {
            dev.write_register(REG_CALSTART, START_WITHOUT_CHECKSUM)
        })?;
        self.run_step(StartupStep::AdjustmentStart, |dev| {
            dev.write_register(REG_ADJSTART, START_WITHOUT_CHECKSUM)
        })?;
        self.run_step(StartupStep::CurrentGainCalibration, |dev| {
            dev.write_register(REG_IGAINL, DEFAULT_IGAINL)
        })?;
        self.run_step(StartupStep::AdjustmentChecksum, |dev| {
            dev.write_register(REG_CS2, DEFAULT_CS2)
        })?;
        self.run_step(StartupStep::SagThreshold, |dev| {
            dev.write_register(REG_SAGTH, sag_counts)
        })?;
        self.run_step(StartupStep::SagEnable, |dev| {
            dev.modify_register(REG_FUNCEN, |funcen| {
                u16::from(
                    FunctionEnable::from(funcen)
                        .with_sag_enable(true)
                        .with_sag_warn_out(true),
                )
            })
            .map(|_| ())
        })?;

        self.state = State::Running(gain);
        debug!("atm90e26 running with {}x current gain", gain.factor());
        Ok(())
    }

    /// Like [`start`](Self::start) but takes the gain as a numeric factor.
    pub fn start_with_gain_factor(
        &mut self,
        factor: u8,
        sag_threshold_volts: f32,
    ) -> Result<(), CommE> {
        let gain = CurrentGain::from_factor(factor).ok_or(Error::InvalidArgument)?;
        self.start(gain, sag_threshold_volts)
    }

    fn run_step<F>(&mut self, step: StartupStep, action: F) -> Result<(), CommE>
    where
        F: FnOnce(&mut Self) -> Result<(), CommE>,
    {
        debug!("start-up step {:?}", step);
        action(self).inspect_err(|_| {
            crate::log::warning!("start-up aborted at {:?}", step);
        })
    }
}
