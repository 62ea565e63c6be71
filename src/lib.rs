//! EFM32 SPI DMA Stream
//!
//! A `no_std`, `no_alloc` driver that streams bytes continuously between an
//! EFM32 Series 0 USART in synchronous master mode and memory, using DMA
//! channels that re-arm themselves from their completion callbacks.
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **Stream Layer** ([`driver`]): [`SpiMaster`] configuration and the
//!    [`SpiDmaStream`] facade with its four ordered setup steps
//! 2. **Transfer Layer** ([`dma`]): [`TransferEngine`] channels, descriptors,
//!    bursts and completion callbacks
//! 3. **HAL Layer** ([`hal`]): [`RegisterBus`] register access and
//!    [`BoardSetup`] clock and pin bring-up
//!
//! # Re-arm Protocol
//!
//! Each channel runs `Unarmed -> Armed -> InProgress -> Completed`. When a
//! burst completes with interrupts enabled, the channel callback runs from
//! the interrupt path and asks for the same burst again, so the channel goes
//! straight back to `Armed`. The TX channel keeps retransmitting its buffer
//! and the RX channel keeps overwriting its buffer with the newest bytes.
//! A trigger that reaches a channel which is not armed is counted as data
//! loss in [`ChannelStats::dropped_triggers`].
//!
//! Callbacks and buffers are moved into the channel configuration, so the
//! engine owns both for as long as the channel exists. They can only be taken
//! back with [`TransferEngine::release_channel`], which refuses while a burst
//! is armed or in progress.
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting and bring-up logging
//! - `log`: Log dropped triggers, rejected re-arms and receive overflows
//! - `critical-section`: Enable the ISR-safe [`sync::SharedStream`] wrapper
//!
//! # Example
//!
//! ```ignore
//! use efm32_spi_dma::{Mmio, Preconfigured, SpiDmaStreamDefault, StreamConfig};
//!
//! static mut TX: [u8; 10] = efm32_spi_dma::constants::TX_PATTERN;
//! static mut RX: [u8; 10] = [0; 10];
//!
//! let mut bus = unsafe { Mmio::new() };
//! let mut stream = SpiDmaStreamDefault::new(StreamConfig::new());
//!
//! stream.start(
//!     Preconfigured,
//!     &mut bus,
//!     unsafe { &mut *core::ptr::addr_of_mut!(TX) },
//!     unsafe { &mut *core::ptr::addr_of_mut!(RX) },
//! )?;
//!
//! // From the DMA / USART interrupt handler:
//! stream.service(&mut bus);
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod dma;
pub mod driver;
pub mod hal;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use dma::{
    Burst, Channel, ChannelConfig, ChannelState, ChannelStats, CompletionCallback,
    CompletionContext, Descriptor, Endpoint, Priority, Slot, TransferEngine, TriggerSource,
};
pub use driver::config::{BitOrder, MasterConfig, State, StreamConfig, UsartInstance};
pub use driver::error::{ConfigError, ConfigResult, DmaError, DmaResult, Error, Result};
pub use driver::master::{MasterEndpoints, MasterState, SpiMaster};
pub use driver::stream::{SpiDmaStream, SpiDmaStreamDefault};
pub use hal::{BoardSetup, Mmio, Preconfigured, RegisterBus};

/// Low-level register accessors for advanced use.
///
/// Most users should prefer [`SpiMaster`] instead of touching registers
/// directly.
pub mod unsafe_registers {
    pub use crate::internal::register::usart::*;
}

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::SharedStream;

/// Shared driver constants.
pub mod constants {
    pub use crate::internal::constants::{
        // Clocks
        DEFAULT_PERIPHERAL_CLOCK_HZ,
        DEFAULT_RX_CHANNEL,
        DEFAULT_SPI_CLOCK_HZ,
        DEFAULT_TX_CHANNEL,
        // Controller
        DMA_CHANNELS,
        MAX_BURST_UNITS,
        MAX_ROUTE_LOCATION,
        // Reference stream
        PEER_ECHO_OFFSET,
        STREAM_BUFFER_SIZE,
        TX_PATTERN,
    };
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Declare a static, ISR-safe stream.
///
/// Expands to a [`sync::SharedStream`] static. The one-argument form uses the
/// default configuration and every controller channel.
///
/// # Examples
///
/// ```ignore
/// efm32_spi_dma::spi_dma_static!(STREAM);
///
/// STREAM.with(|s| s.start(Preconfigured, &mut bus, tx, rx)).unwrap();
/// ```
#[cfg(feature = "critical-section")]
#[macro_export]
macro_rules! spi_dma_static {
    ($name:ident) => {
        $crate::spi_dma_static!($name, $crate::StreamConfig::new());
    };
    ($name:ident, $config:expr) => {
        $crate::spi_dma_static!($name, $config, $crate::constants::DMA_CHANNELS);
    };
    ($name:ident, $config:expr, $channels:expr) => {
        static $name: $crate::sync::SharedStream<{ $channels }> =
            $crate::sync::SharedStream::new($config);
    };
}
