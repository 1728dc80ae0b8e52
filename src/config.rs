//! Configuration primitives for the ATM90E26 driver.

use crate::params::CurrentScale;

/// Bus clock used when none is configured explicitly.
pub const DEFAULT_SPEED_HZ: u32 = 15_625;

/// User-facing configuration for the ATM90E26 driver.
///
/// Fixed for the lifetime of a driver handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Maximum bus clock in hertz.
    pub speed_hz: u32,
    /// Conversion applied to `IRMS` counts.
    pub current_scale: CurrentScale,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks whether this configuration is usable.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.speed_hz == 0 {
            return Err(ConfigError::ZeroSpeed);
        }

        Ok(())
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the bus clock.
    pub fn speed_hz(mut self, speed_hz: u32) -> Self {
        self.config.speed_hz = speed_hz;
        self
    }

    /// Selects the `IRMS` conversion.
    pub fn current_scale(mut self, scale: CurrentScale) -> Self {
        self.config.current_scale = scale;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed_hz: DEFAULT_SPEED_HZ,
            current_scale: CurrentScale::Documented,
        }
    }
}

/// Validation errors generated while verifying a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A bus clock of zero hertz was requested.
    ZeroSpeed,
}
