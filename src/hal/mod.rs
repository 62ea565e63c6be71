//! Hardware Abstraction Layer
//!
//! Seams between the driver and the physical chip.
//!
//! # Modules
//!
//! - [`bus`]: 32-bit register access ([`RegisterBus`], [`Mmio`])
//! - [`board`]: clock and pin bring-up hooks ([`BoardSetup`])

pub mod board;
pub mod bus;

pub use board::{BoardSetup, Preconfigured};
pub use bus::{Mmio, RegisterBus};
