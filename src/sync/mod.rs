//! Synchronization and Concurrency Support
//!
//! - **Primitives** (`primitives`): [`CriticalSectionCell`] for ISR-safe
//!   interior mutability
//! - **Shared Wrappers** (`shared`): [`SharedStream`], a critical-section
//!   protected [`SpiDmaStream`](crate::SpiDmaStream)
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables this module
//!
//! # Example
//!
//! ```ignore
//! use efm32_spi_dma::sync::SharedStream;
//!
//! static STREAM: SharedStream<12> = SharedStream::new(StreamConfig::new());
//!
//! fn main() {
//!     STREAM.with(|s| s.start(Preconfigured, &mut bus, tx, rx)).unwrap();
//!     loop {}
//! }
//!
//! #[interrupt]
//! fn DMA() {
//!     STREAM.service(&mut bus);
//! }
//! ```

mod primitives;

pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::SharedStream;
