//! Testing utilities and mock implementations
//!
//! Mocks for running the serial master and the transfer engine on the host
//! without hardware access.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use std::boxed::Box;
use std::collections::HashMap;
use std::vec::Vec;

use crate::driver::config::UsartInstance;
use crate::hal::board::BoardSetup;
use crate::hal::bus::RegisterBus;
use crate::internal::constants::PEER_ECHO_OFFSET;
use crate::internal::register::usart::{
    IF_OFFSET, IF_RXOF, IFC_OFFSET, RXDATA_OFFSET, STATUS_OFFSET, STATUS_RXDATAV, STATUS_TXBL,
    TXDATA_OFFSET,
};

// =============================================================================
// Mock Register Bus
// =============================================================================

/// Mock register bus for testing drivers without hardware
///
/// Plain addresses behave as memory. When a USART is attached with
/// [`MockBus::with_usart`], its data path is modelled:
///
/// - STATUS.TXBL is always set
/// - a TXDATA write is logged and the peer answers with `byte + echo_offset`
///   in RXDATA, setting STATUS.RXDATAV
/// - reading RXDATA clears STATUS.RXDATAV
/// - a byte arriving while RXDATAV is still set raises IF.RXOF
/// - writing IFC clears the matching IF bits
///
/// # Example
///
/// ```ignore
/// let mut bus = MockBus::with_usart(UsartInstance::Usart1);
/// bus.write(USART1_BASE + TXDATA_OFFSET, 0x03);
/// assert_eq!(bus.read(USART1_BASE + RXDATA_OFFSET), 0xA3);
/// ```
#[derive(Debug, Default)]
pub struct MockBus {
    /// Register values: address -> value
    registers: HashMap<u32, u32>,
    /// Record of writes: (address, value)
    write_log: Vec<(u32, u32)>,
    /// Base of the modelled USART, if any
    usart_base: Option<u32>,
    /// Offset the peer adds to each byte it echoes
    echo_offset: u8,
    /// Bytes shifted out through TXDATA
    tx_log: Vec<u8>,
}

impl MockBus {
    /// Create a bus with no peripheral model
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bus modelling `instance` with an echoing peer
    pub fn with_usart(instance: UsartInstance) -> Self {
        let mut bus = Self {
            usart_base: Some(instance.base()),
            echo_offset: PEER_ECHO_OFFSET,
            ..Self::default()
        };
        bus.registers.insert(instance.base() + STATUS_OFFSET, STATUS_TXBL);
        bus
    }

    /// Set a register value without logging a write
    pub fn set_register(&mut self, addr: u32, value: u32) {
        self.registers.insert(addr, value);
    }

    /// Current value of a register, without read side effects
    pub fn register(&self, addr: u32) -> u32 {
        self.registers.get(&addr).copied().unwrap_or(0)
    }

    /// All writes made so far
    pub fn writes(&self) -> &[(u32, u32)] {
        &self.write_log
    }

    /// Writes made to one address, in order
    pub fn writes_to(&self, addr: u32) -> Vec<u32> {
        self.write_log
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Clear the write log
    pub fn clear_writes(&mut self) {
        self.write_log.clear();
    }

    /// Bytes written to TXDATA so far
    pub fn tx_log(&self) -> &[u8] {
        &self.tx_log
    }

    /// Change what the peer adds to each echoed byte
    pub fn set_echo_offset(&mut self, offset: u8) {
        self.echo_offset = offset;
    }

    /// Have the peer shift `byte` in as if the master had clocked it
    pub fn push_rx(&mut self, byte: u8) {
        let Some(base) = self.usart_base else {
            return;
        };
        let status = self.register(base + STATUS_OFFSET);
        if status & STATUS_RXDATAV != 0 {
            let flags = self.register(base + IF_OFFSET);
            self.registers.insert(base + IF_OFFSET, flags | IF_RXOF);
        }
        self.registers.insert(base + RXDATA_OFFSET, byte as u32);
        self.registers.insert(base + STATUS_OFFSET, status | STATUS_RXDATAV);
    }
}

impl RegisterBus for MockBus {
    fn read(&mut self, addr: u32) -> u32 {
        let value = self.register(addr);
        if let Some(base) = self.usart_base
            && addr == base + RXDATA_OFFSET
        {
            let status = self.register(base + STATUS_OFFSET);
            self.registers.insert(base + STATUS_OFFSET, status & !STATUS_RXDATAV);
        }
        value
    }

    fn write(&mut self, addr: u32, value: u32) {
        self.write_log.push((addr, value));
        match self.usart_base {
            Some(base) if addr == base + TXDATA_OFFSET => {
                let byte = value as u8;
                self.tx_log.push(byte);
                self.push_rx(byte.wrapping_add(self.echo_offset));
            }
            Some(base) if addr == base + IFC_OFFSET => {
                let flags = self.register(base + IF_OFFSET);
                self.registers.insert(base + IF_OFFSET, flags & !value);
            }
            _ => {
                self.registers.insert(addr, value);
            }
        }
    }
}

// =============================================================================
// Mock Board
// =============================================================================

/// Board bring-up recorder
#[derive(Debug, Default)]
pub struct MockBoard {
    /// Instances whose clocks were enabled
    pub clocks: Vec<UsartInstance>,
    /// Pin routes applied
    pub pins: Vec<(UsartInstance, u8)>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BoardSetup for MockBoard {
    fn enable_clocks(&mut self, instance: UsartInstance) {
        self.clocks.push(instance);
    }

    fn configure_pins(&mut self, instance: UsartInstance, location: u8) {
        self.pins.push((instance, location));
    }
}

// =============================================================================
// Buffers
// =============================================================================

/// Leak a zeroed buffer with static lifetime
pub fn static_buffer(len: usize) -> &'static mut [u8] {
    Box::leak(std::vec![0u8; len].into_boxed_slice())
}

/// Leak a copy of `data` with static lifetime
pub fn static_copy(data: &[u8]) -> &'static mut [u8] {
    Box::leak(data.to_vec().into_boxed_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::register::usart::USART1_BASE;

    #[test]
    fn plain_addresses_behave_as_memory() {
        let mut bus = MockBus::new();
        bus.write(0x2000_0000, 0xDEAD_BEEF);

        assert_eq!(bus.read(0x2000_0000), 0xDEAD_BEEF);
        assert_eq!(bus.writes(), &[(0x2000_0000, 0xDEAD_BEEF)]);
    }

    #[test]
    fn usart_echoes_with_offset() {
        let mut bus = MockBus::with_usart(UsartInstance::Usart1);
        assert_ne!(bus.register(USART1_BASE + STATUS_OFFSET) & STATUS_TXBL, 0);

        bus.write(USART1_BASE + TXDATA_OFFSET, 0x03);
        assert_ne!(bus.register(USART1_BASE + STATUS_OFFSET) & STATUS_RXDATAV, 0);
        assert_eq!(bus.read(USART1_BASE + RXDATA_OFFSET), 0xA3);
        assert_eq!(bus.register(USART1_BASE + STATUS_OFFSET) & STATUS_RXDATAV, 0);
        assert_eq!(bus.tx_log(), &[0x03]);
    }

    #[test]
    fn unread_byte_raises_overflow() {
        let mut bus = MockBus::with_usart(UsartInstance::Usart1);

        bus.write(USART1_BASE + TXDATA_OFFSET, 0x00);
        bus.write(USART1_BASE + TXDATA_OFFSET, 0x01);
        assert_eq!(bus.register(USART1_BASE + IF_OFFSET) & IF_RXOF, IF_RXOF);
        assert_eq!(bus.read(USART1_BASE + RXDATA_OFFSET), 0xA1);

        bus.write(USART1_BASE + IFC_OFFSET, IF_RXOF);
        assert_eq!(bus.register(USART1_BASE + IF_OFFSET), 0);
    }
}
