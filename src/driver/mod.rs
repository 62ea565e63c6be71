//! Core driver components for the USART SPI master and its DMA stream.
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`master`] - USART synchronous master
//! - [`stream`] - Continuous stream over two self re-arming channels
//!
//! # Example
//!
//! ```ignore
//! use efm32_spi_dma::driver::{MasterConfig, StreamConfig, SpiDmaStreamDefault};
//!
//! let config = StreamConfig::new()
//!     .with_master(MasterConfig::new().with_clock_rate(1_000_000));
//! let mut stream = SpiDmaStreamDefault::new(config);
//! ```

// Submodules
pub mod config;
pub mod error;
pub mod master;
pub mod stream;

// Re-exports for convenience
pub use config::{BitOrder, MasterConfig, State, StreamConfig, UsartInstance};
pub use error::{ConfigError, ConfigResult, DmaError, DmaResult, Error, Result};
pub use master::{MasterEndpoints, MasterState, PendingTriggers, SpiMaster};
pub use stream::{SpiDmaStream, SpiDmaStreamDefault};
