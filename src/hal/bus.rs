//! Register bus abstraction.
//!
//! Every peripheral register access in this crate goes through
//! [`RegisterBus`]. On target, [`Mmio`] performs volatile 32-bit accesses
//! at the given physical address. On the host, tests substitute a mock bus
//! that models the USART data path.

/// 32-bit register bus
pub trait RegisterBus {
    /// Read the register at `addr`
    fn read(&mut self, addr: u32) -> u32;

    /// Write `value` to the register at `addr`
    fn write(&mut self, addr: u32, value: u32);

    /// Read-modify-write the register at `addr`
    #[inline]
    fn modify<F>(&mut self, addr: u32, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(addr);
        self.write(addr, f(value));
    }

    /// Set bits in the register at `addr`
    #[inline]
    fn set_bits(&mut self, addr: u32, bits: u32) {
        self.modify(addr, |v| v | bits);
    }

    /// Clear bits in the register at `addr`
    #[inline]
    fn clear_bits(&mut self, addr: u32, bits: u32) {
        self.modify(addr, |v| v & !bits);
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    #[inline]
    fn read(&mut self, addr: u32) -> u32 {
        (**self).read(addr)
    }

    #[inline]
    fn write(&mut self, addr: u32, value: u32) {
        (**self).write(addr, value);
    }
}

/// Volatile memory-mapped I/O on the system bus.
#[derive(Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Create a handle to the system bus.
    ///
    /// # Safety
    ///
    /// Every address later passed to [`RegisterBus::read`] or
    /// [`RegisterBus::write`] must be a valid, 4-byte aligned register (or
    /// RAM) address on the running chip. Only one `Mmio` should drive a
    /// given peripheral at a time.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for Mmio {
    #[inline(always)]
    fn read(&mut self, addr: u32) -> u32 {
        // SAFETY: validity of `addr` is the contract of `Mmio::new`
        unsafe { core::ptr::read_volatile(addr as usize as *const u32) }
    }

    #[inline(always)]
    fn write(&mut self, addr: u32, value: u32) {
        // SAFETY: validity of `addr` is the contract of `Mmio::new`
        unsafe { core::ptr::write_volatile(addr as usize as *mut u32, value) }
    }
}
