//! Measurement accessors converting register counts to physical units.
//!
//! Values are read on demand and never cached.

use crate::device::Atm90e26;
use crate::error::Result;
use crate::interface::Atm90e26Interface;
use crate::params::CurrentScale;
use crate::registers::{SystemStatus, REG_FREQ, REG_IRMS, REG_PMEAN, REG_SYSSTATUS, REG_URMS};

// Urms holds centivolts RMS.
const VOLTAGE_COUNTS_PER_VOLT: f32 = 100.0;
// Freq holds centihertz.
const FREQUENCY_COUNTS_PER_HZ: f32 = 100.0;

/// Converts an `Irms` count to amperes.
pub fn current_amps(raw: u16, scale: CurrentScale) -> f32 {
    raw as f32 / scale.counts_per_amp()
}

/// Converts a `Urms` count to volts.
pub fn voltage_volts(raw: u16) -> f32 {
    raw as f32 / VOLTAGE_COUNTS_PER_VOLT
}

/// Reinterprets a `Pmean` count as signed watts.
pub fn power_watts(raw: u16) -> f32 {
    raw as i16 as f32
}

impl<IFACE, CommE> Atm90e26<IFACE>
where
    IFACE: Atm90e26Interface<Error = CommE>,
{
    /// Verified read of the L-line `Irms` register.
    pub fn irms_raw(&mut self) -> Result<u16, CommE> {
        self.verified_read_register(REG_IRMS)
    }

    /// RMS current in amperes, scaled per [`Config::current_scale`](crate::config::Config).
    pub fn irms_amps(&mut self) -> Result<f32, CommE> {
        let raw = self.irms_raw()?;
        Ok(current_amps(raw, self.config.current_scale))
    }

    /// Verified read of the `Urms` register.
    pub fn vrms_raw(&mut self) -> Result<u16, CommE> {
        self.verified_read_register(REG_URMS)
    }

    /// RMS line voltage in volts.
    pub fn vrms_volts(&mut self) -> Result<f32, CommE> {
        Ok(voltage_volts(self.vrms_raw()?))
    }

    /// `Pmean` as a signed count.
    ///
    /// Unlike the RMS accessors this is a single plain read, without the
    /// `LastData` cross-check.
    pub fn power_raw(&mut self) -> Result<i16, CommE> {
        Ok(self.raw_read_register(REG_PMEAN)? as i16)
    }

    /// Mean active power in watts; negative when power flows back to the grid.
    pub fn power_watts(&mut self) -> Result<f32, CommE> {
        Ok(self.power_raw()? as f32)
    }

    /// Line frequency in hertz.
    pub fn line_frequency_hz(&mut self) -> Result<f32, CommE> {
        let raw = self.verified_read_register(REG_FREQ)?;
        Ok(raw as f32 / FREQUENCY_COUNTS_PER_HZ)
    }

    /// Decoded `SysStatus` flags.
    pub fn system_status(&mut self) -> Result<SystemStatus, CommE> {
        self.verified_read_register(REG_SYSSTATUS)
            .map(SystemStatus::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::Error;
    use crate::interface::mock::{Access, ScriptedInterface};
    use crate::params::CurrentGain;

    fn initialized(bus: ScriptedInterface, scale: CurrentScale) -> Atm90e26<ScriptedInterface> {
        let config = Config::new().current_scale(scale).build();
        let mut device = Atm90e26::new(bus, config);
        device.init().unwrap();
        device
    }

    #[test]
    fn power_is_twos_complement_watts() {
        assert_eq!(power_watts(0x0001), 1.0);
        assert_eq!(power_watts(0xFFFF), -1.0);
        assert_eq!(power_watts(0x8000), -32768.0);
        assert_eq!(power_watts(0x7FFF), 32767.0);
    }

    #[test]
    fn current_scale_selects_divisor() {
        assert_eq!(current_amps(500, CurrentScale::Documented), 0.5);
        assert_eq!(current_amps(500, CurrentScale::Boosted), 5.0);
    }

    #[test]
    fn voltage_is_centivolts() {
        assert_eq!(voltage_volts(23_012), 230.12);
        assert_eq!(voltage_volts(0), 0.0);
    }

    #[test]
    fn sampler_flow_reports_scaled_values() {
        let bus = ScriptedInterface::new().with_values(&[
            0x0000, 0x0000, // MMode
            0x0000, 0x0000, // FuncEn
            500, 500, // Irms
            23_000, 23_000, // Urms
            0xFF9C, // Pmean
        ]);
        let mut device = initialized(bus, CurrentScale::Boosted);

        device.start(CurrentGain::Gain24, 20.0).unwrap();
        assert_eq!(device.irms_amps(), Ok(5.0));
        assert_eq!(device.vrms_volts(), Ok(230.0));
        assert_eq!(device.power_watts(), Ok(-100.0));
        device.deinit().unwrap();

        assert_eq!(device.interface_mut().pending_reads(), 0);
    }

    #[test]
    fn documented_scale_reads_milliamps() {
        let mut device = initialized(
            ScriptedInterface::new().with_values(&[500, 500]),
            CurrentScale::Documented,
        );

        assert_eq!(device.irms_raw(), Ok(500));
        assert_eq!(device.config().current_scale, CurrentScale::Documented);

        let mut device = initialized(
            ScriptedInterface::new().with_values(&[500, 500]),
            CurrentScale::Documented,
        );
        assert_eq!(device.irms_amps(), Ok(0.5));
    }

    // Pmean deliberately skips the LastData cross-check; this pins that the
    // power path differs from the RMS accessors.
    #[test]
    fn power_uses_single_plain_read() {
        let mut device = initialized(
            ScriptedInterface::new().with_values(&[0x0001]),
            CurrentScale::Documented,
        );

        assert_eq!(device.power_raw(), Ok(1));
        assert_eq!(device.interface_mut().accesses, [Access::Read(REG_PMEAN)]);
    }

    #[test]
    fn rms_accessors_use_verified_reads() {
        let mut device = initialized(
            ScriptedInterface::new().with_values(&[23_000, 22_000, 23_001]),
            CurrentScale::Documented,
        );

        assert_eq!(device.vrms_raw(), Ok(23_001));
        assert_eq!(device.interface_mut().read_count(), 3);
    }

    #[test]
    fn frequency_and_status_decode() {
        let mut device = initialized(
            ScriptedInterface::new().with_values(&[5_000, 5_000, 0x0002, 0x0002]),
            CurrentScale::Documented,
        );

        assert_eq!(device.line_frequency_hz(), Ok(50.0));
        let status = device.system_status().unwrap();
        assert!(status.sag_warn());
        assert!(!status.ln_change());
    }

    #[test]
    fn measurements_require_initialization() {
        let mut device = Atm90e26::new(ScriptedInterface::new(), Config::default());

        assert_eq!(device.irms_raw(), Err(Error::NotInitialized));
        assert_eq!(device.irms_amps(), Err(Error::NotInitialized));
        assert_eq!(device.vrms_raw(), Err(Error::NotInitialized));
        assert_eq!(device.vrms_volts(), Err(Error::NotInitialized));
        assert_eq!(device.power_watts(), Err(Error::NotInitialized));
        assert!(device.interface_mut().accesses.is_empty());
    }
}
