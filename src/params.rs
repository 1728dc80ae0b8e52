//! Strongly typed parameter enumerations for the ATM90E26 driver.
//!
//! These enums map directly to datasheet field encodings and are used across
//! [`Config`](crate::config::Config) and the high-level driver APIs. Prefer these
//! types over raw integers to keep configuration values valid and explicit.
//!
//! # Examples
//!
//! ```rust
//! use atm90e26::params::{CurrentGain, CurrentScale};
//!
//! let gain = CurrentGain::from_factor(24).unwrap();
//! assert_eq!(gain.bits(), 0b011);
//! let _ = CurrentScale::Boosted;
//! ```

use modular_bitfield::prelude::Specifier;

/// L-line current channel PGA gain (`MMODE[15:13]`).
///
/// The hardware encoding is not ordered by gain factor: 1X sits at `0b100`
/// while 4X through 24X occupy `0b000..=0b011`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum CurrentGain {
    /// 4X gain.
    Gain4 = 0b000,
    /// 8X gain.
    Gain8 = 0b001,
    /// 16X gain.
    Gain16 = 0b010,
    /// 24X gain.
    Gain24 = 0b011,
    /// 1X gain.
    Gain1 = 0b100,
}

impl CurrentGain {
    /// Maps a numeric gain factor to its selector, rejecting unsupported factors.
    pub const fn from_factor(factor: u8) -> Option<Self> {
        match factor {
            1 => Some(Self::Gain1),
            4 => Some(Self::Gain4),
            8 => Some(Self::Gain8),
            16 => Some(Self::Gain16),
            24 => Some(Self::Gain24),
            _ => None,
        }
    }

    /// Returns the amplification factor.
    pub const fn factor(self) -> u8 {
        match self {
            Self::Gain1 => 1,
            Self::Gain4 => 4,
            Self::Gain8 => 8,
            Self::Gain16 => 16,
            Self::Gain24 => 24,
        }
    }

    /// Returns the 3-bit field value written into `MMODE[15:13]`.
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Error returned when a numeric factor has no [`CurrentGain`] selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnsupportedGain(pub u8);

impl TryFrom<u8> for CurrentGain {
    type Error = UnsupportedGain;

    fn try_from(factor: u8) -> core::result::Result<Self, Self::Error> {
        Self::from_factor(factor).ok_or(UnsupportedGain(factor))
    }
}

/// Conversion applied to the `IRMS` register count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CurrentScale {
    /// Datasheet scale: the register holds milliamps RMS (count / 1000).
    #[default]
    Documented,
    /// Corrects the x10 under-reading seen on boards of this hardware revision
    /// (count / 100).
    Boosted,
}

impl CurrentScale {
    /// Register counts per ampere.
    pub const fn counts_per_amp(self) -> f32 {
        match self {
            Self::Documented => 1000.0,
            Self::Boosted => 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_encoding_is_exact() {
        assert_eq!(CurrentGain::from_factor(1).unwrap().bits(), 4);
        assert_eq!(CurrentGain::from_factor(4).unwrap().bits(), 0);
        assert_eq!(CurrentGain::from_factor(8).unwrap().bits(), 1);
        assert_eq!(CurrentGain::from_factor(16).unwrap().bits(), 2);
        assert_eq!(CurrentGain::from_factor(24).unwrap().bits(), 3);
    }

    #[test]
    fn unsupported_factors_are_rejected() {
        for factor in [0u8, 2, 3, 5, 12, 25, 32, 255] {
            assert_eq!(CurrentGain::try_from(factor), Err(UnsupportedGain(factor)));
        }
    }

    #[test]
    fn factor_inverts_from_factor() {
        for factor in [1u8, 4, 8, 16, 24] {
            assert_eq!(CurrentGain::from_factor(factor).unwrap().factor(), factor);
        }
    }
}
