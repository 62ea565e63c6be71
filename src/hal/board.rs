//! Board bring-up hooks.
//!
//! The serial master needs its peripheral clock running and its pins routed
//! to GPIO before any USART register access. Both are board concerns, so the
//! stream asks a [`BoardSetup`] implementation to perform them.

use crate::driver::config::UsartInstance;

/// Clock and pin setup performed once before the stream starts
pub trait BoardSetup {
    /// Enable the high-frequency peripheral clock tree and the clock for
    /// `instance`
    fn enable_clocks(&mut self, instance: UsartInstance);

    /// Put the TX, RX, CLK and CS pins for `instance` at route `location`
    /// into their GPIO modes (push-pull outputs, input for RX)
    fn configure_pins(&mut self, instance: UsartInstance, location: u8);
}

/// Board already configured by the application
///
/// Both hooks do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preconfigured;

impl BoardSetup for Preconfigured {
    #[inline]
    fn enable_clocks(&mut self, _instance: UsartInstance) {}

    #[inline]
    fn configure_pins(&mut self, _instance: UsartInstance, _location: u8) {}
}

impl<T: BoardSetup + ?Sized> BoardSetup for &mut T {
    #[inline]
    fn enable_clocks(&mut self, instance: UsartInstance) {
        (**self).enable_clocks(instance);
    }

    #[inline]
    fn configure_pins(&mut self, instance: UsartInstance, location: u8) {
        (**self).configure_pins(instance, location);
    }
}
