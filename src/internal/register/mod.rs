//! Memory-mapped register definitions
//!
//! Registers are reached through a [`RegisterBus`](crate::hal::bus::RegisterBus)
//! rather than raw pointers so the same accessors run on target (volatile
//! MMIO) and on the host (mock bus).

pub mod usart;

/// Generate read/write accessor methods for a register relative to `self.base`.
///
/// # Example
/// ```ignore
/// impl UsartRegs {
///     reg_rw!(ctrl, set_ctrl, CTRL_OFFSET, "Control register");
/// }
/// ```
macro_rules! reg_rw {
    ($read_fn:ident, $write_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn<B: $crate::hal::bus::RegisterBus>(&self, bus: &mut B) -> u32 {
            bus.read(self.base + $offset)
        }

        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn<B: $crate::hal::bus::RegisterBus>(&self, bus: &mut B, value: u32) {
            bus.write(self.base + $offset, value);
        }
    };
}

/// Generate a read-only accessor method for a register.
macro_rules! reg_ro {
    ($read_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn<B: $crate::hal::bus::RegisterBus>(&self, bus: &mut B) -> u32 {
            bus.read(self.base + $offset)
        }
    };
}

/// Generate a write-only accessor method for a command style register.
macro_rules! reg_wo {
    ($write_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn<B: $crate::hal::bus::RegisterBus>(&self, bus: &mut B, value: u32) {
            bus.write(self.base + $offset, value);
        }
    };
}

pub(crate) use reg_ro;
pub(crate) use reg_rw;
pub(crate) use reg_wo;
