//! Error handling primitives for the ATM90E26 driver.

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The bus device could not be opened.
    DeviceOpenFailed(E),
    /// The bus rejected the requested speed or mode.
    ConfigError(E),
    /// The driver configuration itself is invalid.
    InvalidConfig,
    /// Any error reported by the underlying bus interface during an exchange.
    Interface(E),
    /// A bus exchange moved fewer (or more) bytes than the frame requires.
    ShortTransfer {
        /// Number of bytes the frame requires.
        expected: usize,
        /// Number of bytes the transport reported.
        actual: usize,
    },
    /// The operation was invoked before `init` or after `deinit`.
    NotInitialized,
    /// Unsupported gain selector, out-of-range register address or threshold.
    InvalidArgument,
}

impl<E> Error<E> {
    /// Returns `true` for the transfer-failure class (`Interface` and `ShortTransfer`).
    pub fn is_transfer_failure(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::ShortTransfer { .. })
    }
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}

#[cfg(feature = "std")]
impl<E> std::fmt::Display for Error<E>
where
    E: std::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceOpenFailed(err) => write!(f, "unable to open bus device: {err:?}"),
            Self::ConfigError(err) => write!(f, "bus configuration rejected: {err:?}"),
            Self::InvalidConfig => write!(f, "invalid driver configuration"),
            Self::Interface(err) => write!(f, "bus transfer failed: {err:?}"),
            Self::ShortTransfer { expected, actual } => {
                write!(f, "bus transfer moved {actual} bytes, expected {expected}")
            }
            Self::NotInitialized => write!(f, "device not initialized"),
            Self::InvalidArgument => write!(f, "invalid argument"),
        }
    }
}

#[cfg(feature = "std")]
impl<E> std::error::Error for Error<E> where E: std::fmt::Debug {}
