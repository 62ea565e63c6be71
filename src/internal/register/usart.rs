//! USART register block (EFM32 Series 0, synchronous mode subset).
//!
//! Based on the EFM32 Gecko reference manual, USART chapter.

use super::{reg_ro, reg_rw, reg_wo};

// =============================================================================
// Instance Base Addresses
// =============================================================================

/// USART0 register block base address
pub const USART0_BASE: u32 = 0x4000_C000;
/// USART1 register block base address
pub const USART1_BASE: u32 = 0x4000_C400;
/// USART2 register block base address
pub const USART2_BASE: u32 = 0x4000_C800;

// =============================================================================
// Register Offsets
// =============================================================================

/// Control register
pub const CTRL_OFFSET: u32 = 0x000;
/// Frame format register
pub const FRAME_OFFSET: u32 = 0x004;
/// Command register
pub const CMD_OFFSET: u32 = 0x00C;
/// Status register
pub const STATUS_OFFSET: u32 = 0x010;
/// Clock divider register
pub const CLKDIV_OFFSET: u32 = 0x014;
/// RX buffer data register
pub const RXDATA_OFFSET: u32 = 0x01C;
/// TX buffer data register
pub const TXDATA_OFFSET: u32 = 0x034;
/// Interrupt flag register
pub const IF_OFFSET: u32 = 0x040;
/// Interrupt flag clear register
pub const IFC_OFFSET: u32 = 0x048;
/// I/O routing register
pub const ROUTE_OFFSET: u32 = 0x054;

// =============================================================================
// CTRL
// =============================================================================

/// Synchronous mode
pub const CTRL_SYNC: u32 = 1 << 0;
/// Clock idles high
pub const CTRL_CLKPOL: u32 = 1 << 8;
/// Sample on the second clock edge
pub const CTRL_CLKPHA: u32 = 1 << 9;
/// Most significant bit first
pub const CTRL_MSBF: u32 = 1 << 10;
/// Hardware-driven chip select
pub const CTRL_AUTOCS: u32 = 1 << 16;

// =============================================================================
// FRAME
// =============================================================================

/// Eight data bits
pub const FRAME_DATABITS_EIGHT: u32 = 0x5;
/// No parity
pub const FRAME_PARITY_NONE: u32 = 0x0 << 8;
/// One stop bit
pub const FRAME_STOPBITS_ONE: u32 = 0x1 << 12;

// =============================================================================
// CMD
// =============================================================================

/// Receiver enable
pub const CMD_RXEN: u32 = 1 << 0;
/// Receiver disable
pub const CMD_RXDIS: u32 = 1 << 1;
/// Transmitter enable
pub const CMD_TXEN: u32 = 1 << 2;
/// Transmitter disable
pub const CMD_TXDIS: u32 = 1 << 3;
/// Master enable
pub const CMD_MASTEREN: u32 = 1 << 4;
/// Master disable
pub const CMD_MASTERDIS: u32 = 1 << 5;
/// Clear TX buffer and shift register
pub const CMD_CLEARTX: u32 = 1 << 10;
/// Clear RX buffer and shift register
pub const CMD_CLEARRX: u32 = 1 << 11;

// =============================================================================
// STATUS
// =============================================================================

/// TX buffer level: room for at least one more frame
pub const STATUS_TXBL: u32 = 1 << 6;
/// RX data valid
pub const STATUS_RXDATAV: u32 = 1 << 7;

// =============================================================================
// IF / IFC
// =============================================================================

/// RX overflow
pub const IF_RXOF: u32 = 1 << 4;

// =============================================================================
// CLKDIV
// =============================================================================

/// Divider field mask (integer part plus the fractional bits usable in sync mode)
pub const CLKDIV_DIV_MASK: u32 = 0x001F_FFC0;

// =============================================================================
// ROUTE
// =============================================================================

/// RX (MISO) pin enable
pub const ROUTE_RXPEN: u32 = 1 << 0;
/// TX (MOSI) pin enable
pub const ROUTE_TXPEN: u32 = 1 << 1;
/// Chip select pin enable
pub const ROUTE_CSPEN: u32 = 1 << 2;
/// Clock pin enable
pub const ROUTE_CLKPEN: u32 = 1 << 3;
/// Location field shift
pub const ROUTE_LOCATION_SHIFT: u32 = 8;
/// Location field mask
pub const ROUTE_LOCATION_MASK: u32 = 0x7 << 8;

/// Compute the synchronous-mode CLKDIV value for `rate_hz` from `ref_hz`.
///
/// Returns `None` when the rate is zero, faster than `ref_hz / 2`, or too
/// slow for the divider field.
#[must_use]
pub const fn sync_clkdiv(ref_hz: u32, rate_hz: u32) -> Option<u32> {
    if rate_hz == 0 || ref_hz == 0 || rate_hz > ref_hz / 2 {
        return None;
    }
    let div = ((ref_hz - 1) / (2 * rate_hz)).saturating_sub(1);
    if div > CLKDIV_DIV_MASK >> 8 {
        return None;
    }
    Some((div << 8) & CLKDIV_DIV_MASK)
}

/// Bit clock actually produced by a CLKDIV value.
#[must_use]
pub const fn sync_rate_from_clkdiv(ref_hz: u32, clkdiv: u32) -> u32 {
    let div = (clkdiv & CLKDIV_DIV_MASK) >> 8;
    ref_hz / (2 * (div + 1))
}

/// Register accessors for one USART instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsartRegs {
    base: u32,
}

impl UsartRegs {
    /// Accessors for the block at `base`
    #[must_use]
    pub const fn new(base: u32) -> Self {
        Self { base }
    }

    /// Base address of the register block
    #[must_use]
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Bus address of RXDATA
    #[must_use]
    pub const fn rxdata_addr(&self) -> u32 {
        self.base + RXDATA_OFFSET
    }

    /// Bus address of TXDATA
    #[must_use]
    pub const fn txdata_addr(&self) -> u32 {
        self.base + TXDATA_OFFSET
    }

    reg_rw!(ctrl, set_ctrl, CTRL_OFFSET, "Control register");
    reg_rw!(frame, set_frame, FRAME_OFFSET, "Frame format register");
    reg_rw!(clkdiv, set_clkdiv, CLKDIV_OFFSET, "Clock divider register");
    reg_rw!(route, set_route, ROUTE_OFFSET, "I/O routing register");
    reg_wo!(command, CMD_OFFSET, "Command register");
    reg_ro!(status, STATUS_OFFSET, "Status register");
    reg_ro!(interrupt_flags, IF_OFFSET, "Interrupt flag register");
    reg_wo!(clear_interrupt_flags, IFC_OFFSET, "Interrupt flag clear register");
}
