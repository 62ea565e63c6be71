//! Basic burst activation parameters.

use crate::internal::constants::MAX_BURST_UNITS;

/// One end of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endpoint {
    /// Peripheral register at the given bus address
    Register(u32),
    /// The buffer owned by the channel
    Buffer,
}

impl Endpoint {
    /// Whether this endpoint is the channel buffer
    #[inline]
    #[must_use]
    pub const fn is_buffer(&self) -> bool {
        matches!(self, Endpoint::Buffer)
    }
}

/// A basic (single descriptor) burst
///
/// Once activated the channel performs `units` unit transfers, one per
/// trigger, then completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Burst {
    /// Where units are written
    pub destination: Endpoint,
    /// Where units are read from
    pub source: Endpoint,
    /// Number of unit transfers
    pub units: u16,
    /// Respond to burst requests only
    pub use_burst: bool,
}

impl Burst {
    /// Create a burst between two endpoints
    #[must_use]
    pub const fn new(destination: Endpoint, source: Endpoint, units: u16) -> Self {
        Self {
            destination,
            source,
            units,
            use_burst: false,
        }
    }

    /// Peripheral data register into the channel buffer
    #[must_use]
    pub const fn peripheral_to_memory(register: u32, units: u16) -> Self {
        Self::new(Endpoint::Buffer, Endpoint::Register(register), units)
    }

    /// Channel buffer into a peripheral data register
    #[must_use]
    pub const fn memory_to_peripheral(register: u32, units: u16) -> Self {
        Self::new(Endpoint::Register(register), Endpoint::Buffer, units)
    }

    /// Set burst-request mode
    #[must_use]
    pub const fn with_burst(mut self, use_burst: bool) -> Self {
        self.use_burst = use_burst;
        self
    }

    /// Hardware `n_minus_1` field, `None` when `units` is out of range
    #[must_use]
    pub const fn n_minus_1(&self) -> Option<u16> {
        if self.units == 0 || self.units as usize > MAX_BURST_UNITS {
            None
        } else {
            Some(self.units - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_constructors_place_buffer() {
        let rx = Burst::peripheral_to_memory(0x4000_C01C, 10);
        assert_eq!(rx.source, Endpoint::Register(0x4000_C01C));
        assert!(rx.destination.is_buffer());
        assert!(!rx.use_burst);

        let tx = Burst::memory_to_peripheral(0x4000_C034, 10).with_burst(true);
        assert!(tx.source.is_buffer());
        assert_eq!(tx.destination, Endpoint::Register(0x4000_C034));
        assert!(tx.use_burst);
    }

    #[test]
    fn n_minus_1_bounds() {
        assert_eq!(Burst::peripheral_to_memory(0, 10).n_minus_1(), Some(9));
        assert_eq!(Burst::peripheral_to_memory(0, 1).n_minus_1(), Some(0));
        assert_eq!(Burst::peripheral_to_memory(0, 1024).n_minus_1(), Some(1023));
        assert_eq!(Burst::peripheral_to_memory(0, 0).n_minus_1(), None);
        assert_eq!(Burst::peripheral_to_memory(0, 1025).n_minus_1(), None);
    }
}
