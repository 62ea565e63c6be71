//! Error types for the EFM32 SPI DMA driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Peripheral bring-up and configuration failures
//! - [`DmaError`]: Channel, descriptor and burst activation failures
//!
//! The unified [`Error`] enum wraps both domain errors and is returned
//! by the stream facade.
//!
//! Steady-state data loss (a trigger arriving while a channel is not armed,
//! RX overflow) is not an error value: it is counted in the channel
//! statistics and the engine keeps running.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and initialization errors
///
/// These errors occur during serial master setup, engine initialization
/// or when the setup steps are called out of order. They are reported to
/// the caller and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Already initialized
    AlreadyInitialized,
    /// Invalid configuration parameter
    InvalidConfig,
    /// Requested SPI clock rate is zero or above half the reference clock
    UnsupportedClockRate,
    /// Pin route location does not exist on this peripheral
    InvalidRouteLocation,
    /// Setup step called before the step it depends on
    InvalidSequence,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::AlreadyInitialized => "already initialized",
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::UnsupportedClockRate => "unsupported clock rate",
            ConfigError::InvalidRouteLocation => "invalid route location",
            ConfigError::InvalidSequence => "setup step out of order",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// Transfer engine errors
///
/// These errors relate to channel binding, descriptor slots and burst
/// activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Engine used before `init()`
    NotInitialized,
    /// Channel number out of range
    InvalidChannel,
    /// Channel has no configuration bound
    ChannelNotConfigured,
    /// Descriptor slot was never configured
    DescriptorNotConfigured,
    /// Channel is armed or mid-burst
    ChannelBusy,
    /// Channel was stopped and no longer accepts bursts
    ChannelStopped,
    /// Previous binding still owns a buffer
    BufferNotReleased,
    /// Unit count is zero or exceeds the burst limit
    InvalidLength,
    /// Bound buffer is shorter than the burst
    BufferTooSmall,
    /// Burst references the channel buffer but none is bound
    NoBuffer,
    /// Address mode does not match the endpoint kind
    AddressModeMismatch,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::NotInitialized => "engine not initialized",
            DmaError::InvalidChannel => "invalid channel",
            DmaError::ChannelNotConfigured => "channel not configured",
            DmaError::DescriptorNotConfigured => "descriptor not configured",
            DmaError::ChannelBusy => "channel busy",
            DmaError::ChannelStopped => "channel stopped",
            DmaError::BufferNotReleased => "buffer not released",
            DmaError::InvalidLength => "invalid unit count",
            DmaError::BufferTooSmall => "buffer too small for burst",
            DmaError::NoBuffer => "no buffer bound to channel",
            DmaError::AddressModeMismatch => "address mode does not match endpoint",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::UnsupportedClockRate)) => { /* ... */ }
///     Err(Error::Dma(DmaError::ChannelBusy)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

/// Result type alias for stream operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for DMA operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

// =============================================================================
// Unit Tests
// =============================================================================
