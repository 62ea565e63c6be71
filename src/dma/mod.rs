//! Transfer Engine
//!
//! Channel, descriptor and burst model of the DMA controller, plus the
//! completion callbacks that keep a channel running by re-arming it after
//! every burst.
//!
//! # Architecture
//!
//! - [`TransferEngine`]: owns every channel, moves units on trigger and
//!   dispatches completions
//! - [`ChannelConfig`]: trigger, priority, interrupt enable, callback and
//!   buffer bound to one channel
//! - [`Descriptor`]: addressing behaviour per channel and [`Slot`]
//! - [`Burst`]: one basic activation
//! - [`CompletionCallback`]: handler run when a burst completes
//!
//! # Example
//!
//! ```ignore
//! use efm32_spi_dma::dma::*;
//!
//! static mut RX_BUF: [u8; 10] = [0; 10];
//!
//! let mut engine: TransferEngine<12> = TransferEngine::new();
//! engine.init()?;
//!
//! let config = ChannelConfig::new(
//!     TriggerSource::UsartRxDataValid(UsartInstance::Usart1),
//!     CompletionCallback::rearm(),
//! )
//! .with_buffer(unsafe { &mut *core::ptr::addr_of_mut!(RX_BUF) });
//!
//! engine.configure_channel(0, config)?;
//! engine.configure_descriptor(0, Slot::Primary, Descriptor::peripheral_to_memory())?;
//! engine.activate_basic(0, Slot::Primary, Burst::peripheral_to_memory(rxdata, 10))?;
//! ```

mod burst;
mod callback;
mod channel;
mod descriptor;
mod engine;

pub use burst::{Burst, Endpoint};
pub use callback::{CompletionCallback, CompletionContext, CompletionFn, refresh_transfer};
pub use channel::{Channel, ChannelConfig, ChannelState, ChannelStats, Priority, TriggerSource};
pub use descriptor::{AddressMode, ArbitrationRate, Descriptor, Slot, UnitSize};
pub use engine::TransferEngine;
