//! ISR-safe stream wrapper using critical sections.

use super::primitives::CriticalSectionCell;
use crate::driver::config::StreamConfig;
use crate::driver::stream::SpiDmaStream;
use crate::hal::bus::RegisterBus;

/// ISR-safe stream wrapper.
///
/// All access goes through `critical_section::with()`, disabling interrupts
/// for the duration of the closure.
///
/// # Example
///
/// ```ignore
/// static STREAM: SharedStream<12> = SharedStream::new(StreamConfig::new());
///
/// STREAM.with(|s| s.start(Preconfigured, &mut bus, tx, rx))?;
///
/// #[interrupt]
/// fn DMA() {
///     STREAM.service(&mut unsafe { Mmio::new() });
/// }
/// ```
pub struct SharedStream<const CHANNELS: usize> {
    inner: CriticalSectionCell<SpiDmaStream<CHANNELS>>,
}

impl<const CHANNELS: usize> SharedStream<CHANNELS> {
    /// Create a new shared stream (const, suitable for static initialization).
    pub const fn new(config: StreamConfig) -> Self {
        Self {
            inner: CriticalSectionCell::new(SpiDmaStream::new(config)),
        }
    }

    /// Execute a closure with exclusive access to the stream.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut SpiDmaStream<CHANNELS>) -> R,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut SpiDmaStream<CHANNELS>) -> R,
    {
        self.inner.try_with(f)
    }

    /// Run one interrupt pass, see [`SpiDmaStream::service`]
    #[inline]
    pub fn service<B: RegisterBus>(&self, bus: &mut B) -> usize {
        self.inner.with(|stream| stream.service(bus))
    }
}

impl<const CHANNELS: usize> Default for SharedStream<CHANNELS> {
    fn default() -> Self {
        Self::new(StreamConfig::new())
    }
}
