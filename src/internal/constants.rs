//! Centralized Constants
//!
//! Single source of truth for the magic numbers used by the serial master
//! and the transfer engine.
//!
//! # Organization
//!
//! - **Clocks**: reference and default SPI clock frequencies
//! - **Transfer limits**: burst unit limits
//! - **Reference stream**: buffer size, channel numbers and test pattern
//!
//! Register bit definitions live in `register/usart.rs`.

// =============================================================================
// Clock Frequencies
// =============================================================================

/// HFPERCLK frequency after reset (HFRCO at 14 MHz)
pub const DEFAULT_PERIPHERAL_CLOCK_HZ: u32 = 14_000_000;

/// Default SPI bit clock
pub const DEFAULT_SPI_CLOCK_HZ: u32 = 1_000_000;

/// Highest route location on Series 0 USARTs
pub const MAX_ROUTE_LOCATION: u8 = 5;

// =============================================================================
// Transfer Limits
// =============================================================================

/// Maximum units in one basic burst (10-bit `n_minus_1` field)
pub const MAX_BURST_UNITS: usize = 1024;

/// Number of channels on the Series 0 DMA controller
pub const DMA_CHANNELS: usize = 12;

// =============================================================================
// Reference Stream
// =============================================================================

/// Stream buffer length in bytes
pub const STREAM_BUFFER_SIZE: usize = 10;

/// Default RX channel number
pub const DEFAULT_RX_CHANNEL: usize = 0;

/// Default TX channel number
pub const DEFAULT_TX_CHANNEL: usize = 1;

/// Transmit pattern loaded into the TX buffer at startup
pub const TX_PATTERN: [u8; STREAM_BUFFER_SIZE] = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];

/// Offset the reference peer adds to every byte it echoes back
pub const PEER_ECHO_OFFSET: u8 = 0xA0;
