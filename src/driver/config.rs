//! Configuration types for the EFM32 SPI DMA driver

use embedded_hal::spi::{MODE_0, Mode};

use crate::dma::{ArbitrationRate, Priority};
use crate::internal::constants::{
    DEFAULT_PERIPHERAL_CLOCK_HZ, DEFAULT_RX_CHANNEL, DEFAULT_SPI_CLOCK_HZ, DEFAULT_TX_CHANNEL,
};
use crate::internal::register::usart::{USART0_BASE, USART1_BASE, USART2_BASE};

/// USART peripheral instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsartInstance {
    /// USART0
    #[default]
    Usart0,
    /// USART1
    Usart1,
    /// USART2
    Usart2,
}

impl UsartInstance {
    /// Register block base address
    #[must_use]
    pub const fn base(self) -> u32 {
        match self {
            UsartInstance::Usart0 => USART0_BASE,
            UsartInstance::Usart1 => USART1_BASE,
            UsartInstance::Usart2 => USART2_BASE,
        }
    }
}

/// Bit order on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first
    #[default]
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

/// Serial master configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MasterConfig {
    /// SPI bit clock in Hz
    pub clock_rate_hz: u32,
    /// Peripheral reference clock (HFPERCLK) in Hz
    pub peripheral_clock_hz: u32,
    /// Clock polarity and sampling edge
    pub mode: Mode,
    /// Bit order
    pub bit_order: BitOrder,
    /// Let the peripheral drive chip select around each frame
    pub auto_chip_select: bool,
    /// Pin route location (0..=5)
    pub route_location: u8,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MasterConfig {
    /// 1 MHz, mode 0, MSB first, hardware chip select, location 0
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clock_rate_hz: DEFAULT_SPI_CLOCK_HZ,
            peripheral_clock_hz: DEFAULT_PERIPHERAL_CLOCK_HZ,
            mode: MODE_0,
            bit_order: BitOrder::MsbFirst,
            auto_chip_select: true,
            route_location: 0,
        }
    }

    /// Set the SPI bit clock
    #[must_use]
    pub const fn with_clock_rate(mut self, hz: u32) -> Self {
        self.clock_rate_hz = hz;
        self
    }

    /// Set the peripheral reference clock the divider is computed from
    #[must_use]
    pub const fn with_peripheral_clock(mut self, hz: u32) -> Self {
        self.peripheral_clock_hz = hz;
        self
    }

    /// Set clock polarity and phase
    #[must_use]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the bit order
    #[must_use]
    pub const fn with_bit_order(mut self, order: BitOrder) -> Self {
        self.bit_order = order;
        self
    }

    /// Enable or disable hardware chip select
    #[must_use]
    pub const fn with_auto_chip_select(mut self, enabled: bool) -> Self {
        self.auto_chip_select = enabled;
        self
    }

    /// Set the pin route location
    #[must_use]
    pub const fn with_route_location(mut self, location: u8) -> Self {
        self.route_location = location;
        self
    }
}

/// Continuous stream configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamConfig {
    /// USART driven as master
    pub instance: UsartInstance,
    /// Serial master settings
    pub master: MasterConfig,
    /// Channel moving RXDATA into the RX buffer
    pub rx_channel: usize,
    /// Channel moving the TX buffer into TXDATA
    pub tx_channel: usize,
    /// RX channel priority
    pub rx_priority: Priority,
    /// TX channel priority
    pub tx_priority: Priority,
    /// Raise a completion interrupt (and re-arm) at the end of each burst
    pub interrupts_enabled: bool,
    /// Units between arbitration re-checks
    pub arbitration: ArbitrationRate,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamConfig {
    /// USART0, RX on channel 0, TX on channel 1, normal priority, interrupts on
    #[must_use]
    pub const fn new() -> Self {
        Self {
            instance: UsartInstance::Usart0,
            master: MasterConfig::new(),
            rx_channel: DEFAULT_RX_CHANNEL,
            tx_channel: DEFAULT_TX_CHANNEL,
            rx_priority: Priority::Normal,
            tx_priority: Priority::Normal,
            interrupts_enabled: true,
            arbitration: ArbitrationRate::Every1,
        }
    }

    /// Set the USART instance
    #[must_use]
    pub const fn with_instance(mut self, instance: UsartInstance) -> Self {
        self.instance = instance;
        self
    }

    /// Set the serial master configuration
    #[must_use]
    pub const fn with_master(mut self, master: MasterConfig) -> Self {
        self.master = master;
        self
    }

    /// Set the RX and TX channel numbers
    #[must_use]
    pub const fn with_channels(mut self, rx: usize, tx: usize) -> Self {
        self.rx_channel = rx;
        self.tx_channel = tx;
        self
    }

    /// Set the RX channel priority
    #[must_use]
    pub const fn with_rx_priority(mut self, priority: Priority) -> Self {
        self.rx_priority = priority;
        self
    }

    /// Set the TX channel priority
    #[must_use]
    pub const fn with_tx_priority(mut self, priority: Priority) -> Self {
        self.tx_priority = priority;
        self
    }

    /// Enable or disable completion interrupts on both channels
    #[must_use]
    pub const fn with_interrupts(mut self, enabled: bool) -> Self {
        self.interrupts_enabled = enabled;
        self
    }

    /// Set the arbitration rate for both descriptors
    #[must_use]
    pub const fn with_arbitration(mut self, rate: ArbitrationRate) -> Self {
        self.arbitration = rate;
        self
    }
}

/// Stream setup state
///
/// Advances strictly in declaration order up to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Nothing configured
    #[default]
    Uninitialized,
    /// Serial master configured and enabled
    MasterReady,
    /// Transfer engine initialized
    EngineReady,
    /// RX channel armed
    ReceiveArmed,
    /// TX channel armed, stream running
    Running,
    /// Both channels stopped
    Stopped,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::spi::{MODE_3, Phase, Polarity};

    #[test]
    fn master_config_default_values() {
        let config = MasterConfig::new();

        assert_eq!(config.clock_rate_hz, 1_000_000);
        assert_eq!(config.mode.polarity, Polarity::IdleLow);
        assert_eq!(config.mode.phase, Phase::CaptureOnFirstTransition);
        assert_eq!(config.bit_order, BitOrder::MsbFirst);
        assert!(config.auto_chip_select);
        assert_eq!(config.route_location, 0);
    }

    #[test]
    fn master_config_default_trait_matches_new() {
        assert_eq!(MasterConfig::default(), MasterConfig::new());
    }

    #[test]
    fn master_config_builder_chaining() {
        let config = MasterConfig::new()
            .with_clock_rate(2_000_000)
            .with_peripheral_clock(48_000_000)
            .with_mode(MODE_3)
            .with_bit_order(BitOrder::LsbFirst)
            .with_auto_chip_select(false)
            .with_route_location(2);

        assert_eq!(config.clock_rate_hz, 2_000_000);
        assert_eq!(config.peripheral_clock_hz, 48_000_000);
        assert_eq!(config.mode, MODE_3);
        assert_eq!(config.bit_order, BitOrder::LsbFirst);
        assert!(!config.auto_chip_select);
        assert_eq!(config.route_location, 2);
    }

    #[test]
    fn stream_config_defaults() {
        let config = StreamConfig::default();

        assert_eq!(config.instance, UsartInstance::Usart0);
        assert_eq!(config.rx_channel, 0);
        assert_eq!(config.tx_channel, 1);
        assert_eq!(config.rx_priority, Priority::Normal);
        assert_eq!(config.tx_priority, Priority::Normal);
        assert!(config.interrupts_enabled);
        assert_eq!(config.arbitration, ArbitrationRate::Every1);
    }

    #[test]
    fn stream_config_builder() {
        let config = StreamConfig::new()
            .with_instance(UsartInstance::Usart2)
            .with_channels(4, 5)
            .with_rx_priority(Priority::High)
            .with_interrupts(false)
            .with_arbitration(ArbitrationRate::Every4);

        assert_eq!(config.instance, UsartInstance::Usart2);
        assert_eq!((config.rx_channel, config.tx_channel), (4, 5));
        assert_eq!(config.rx_priority, Priority::High);
        assert_eq!(config.tx_priority, Priority::Normal);
        assert!(!config.interrupts_enabled);
        assert_eq!(config.arbitration, ArbitrationRate::Every4);
    }

    #[test]
    fn usart_instance_bases_are_distinct() {
        assert_eq!(UsartInstance::Usart0.base(), 0x4000_C000);
        assert_ne!(UsartInstance::Usart0.base(), UsartInstance::Usart1.base());
        assert_ne!(UsartInstance::Usart1.base(), UsartInstance::Usart2.base());
    }

    #[test]
    fn state_ordering_follows_setup_sequence() {
        assert!(State::Uninitialized < State::MasterReady);
        assert!(State::MasterReady < State::EngineReady);
        assert!(State::EngineReady < State::ReceiveArmed);
        assert!(State::ReceiveArmed < State::Running);
        assert_eq!(State::default(), State::Uninitialized);
    }
}
