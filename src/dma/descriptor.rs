//! Channel control descriptors.
//!
//! A descriptor carries the addressing behaviour of a channel: whether the
//! source and destination pointers advance after each unit, how wide a unit
//! is, and how often the controller re-arbitrates. Each channel owns a
//! primary and an alternate descriptor slot.

/// Pointer behaviour after each unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressMode {
    /// Address stays put (peripheral data registers)
    #[default]
    Fixed,
    /// Address advances by one unit (memory buffers)
    Increment,
}

/// Width of one transfer unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnitSize {
    /// 8 bits
    #[default]
    Byte,
    /// 16 bits
    HalfWord,
    /// 32 bits
    Word,
}

impl UnitSize {
    /// Unit width in bytes
    #[inline]
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            UnitSize::Byte => 1,
            UnitSize::HalfWord => 2,
            UnitSize::Word => 4,
        }
    }

    /// Mask selecting the low bits of a register value for this width
    #[inline]
    #[must_use]
    pub const fn mask(self) -> u32 {
        match self {
            UnitSize::Byte => 0xFF,
            UnitSize::HalfWord => 0xFFFF,
            UnitSize::Word => 0xFFFF_FFFF,
        }
    }
}

/// Units transferred between arbitration checks (R_power 0..=10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ArbitrationRate {
    /// Re-arbitrate after 1 unit
    #[default]
    Every1 = 0,
    /// Re-arbitrate after 2 units
    Every2 = 1,
    /// Re-arbitrate after 4 units
    Every4 = 2,
    /// Re-arbitrate after 8 units
    Every8 = 3,
    /// Re-arbitrate after 16 units
    Every16 = 4,
    /// Re-arbitrate after 32 units
    Every32 = 5,
    /// Re-arbitrate after 64 units
    Every64 = 6,
    /// Re-arbitrate after 128 units
    Every128 = 7,
    /// Re-arbitrate after 256 units
    Every256 = 8,
    /// Re-arbitrate after 512 units
    Every512 = 9,
    /// Re-arbitrate after 1024 units
    Every1024 = 10,
}

impl ArbitrationRate {
    /// Units per arbitration window
    #[inline]
    #[must_use]
    pub const fn units(self) -> u16 {
        1 << (self as u8)
    }
}

/// Descriptor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    /// Primary descriptor, used for basic transfers
    #[default]
    Primary,
    /// Alternate descriptor, used for ping-pong transfers
    Alternate,
}

impl Slot {
    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            Slot::Primary => 0,
            Slot::Alternate => 1,
        }
    }
}

/// Addressing configuration for one descriptor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Descriptor {
    /// Source pointer behaviour
    pub source_mode: AddressMode,
    /// Destination pointer behaviour
    pub destination_mode: AddressMode,
    /// Unit width
    pub unit_size: UnitSize,
    /// Arbitration granularity
    pub arbitration: ArbitrationRate,
    /// HPROT bits, carried but not interpreted
    pub protection: u8,
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Descriptor {
    /// Register to buffer, byte units, arbitrate every unit
    #[must_use]
    pub const fn new() -> Self {
        Self::peripheral_to_memory()
    }

    /// Fixed source register, incrementing destination buffer
    #[must_use]
    pub const fn peripheral_to_memory() -> Self {
        Self {
            source_mode: AddressMode::Fixed,
            destination_mode: AddressMode::Increment,
            unit_size: UnitSize::Byte,
            arbitration: ArbitrationRate::Every1,
            protection: 0,
        }
    }

    /// Incrementing source buffer, fixed destination register
    #[must_use]
    pub const fn memory_to_peripheral() -> Self {
        Self {
            source_mode: AddressMode::Increment,
            destination_mode: AddressMode::Fixed,
            unit_size: UnitSize::Byte,
            arbitration: ArbitrationRate::Every1,
            protection: 0,
        }
    }

    /// Set source pointer behaviour
    #[must_use]
    pub const fn with_source_mode(mut self, mode: AddressMode) -> Self {
        self.source_mode = mode;
        self
    }

    /// Set destination pointer behaviour
    #[must_use]
    pub const fn with_destination_mode(mut self, mode: AddressMode) -> Self {
        self.destination_mode = mode;
        self
    }

    /// Set unit width
    #[must_use]
    pub const fn with_unit_size(mut self, size: UnitSize) -> Self {
        self.unit_size = size;
        self
    }

    /// Set arbitration granularity
    #[must_use]
    pub const fn with_arbitration(mut self, rate: ArbitrationRate) -> Self {
        self.arbitration = rate;
        self
    }

    /// Set HPROT bits
    #[must_use]
    pub const fn with_protection(mut self, protection: u8) -> Self {
        self.protection = protection;
        self
    }
}
