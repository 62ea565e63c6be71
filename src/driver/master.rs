//! USART synchronous (SPI) master.
//!
//! Configures a USART as bus master and exposes its data registers and
//! request lines as transfer endpoints.

use embedded_hal::spi::{Phase, Polarity};

use super::config::{BitOrder, MasterConfig, UsartInstance};
use super::error::{ConfigError, ConfigResult};
use crate::dma::TriggerSource;
use crate::hal::bus::RegisterBus;
use crate::internal::constants::MAX_ROUTE_LOCATION;
use crate::internal::register::usart::{
    CMD_CLEARRX, CMD_CLEARTX, CMD_MASTERDIS, CMD_MASTEREN, CMD_RXDIS, CMD_RXEN, CMD_TXDIS,
    CMD_TXEN, CTRL_AUTOCS, CTRL_CLKPHA, CTRL_CLKPOL, CTRL_MSBF, CTRL_SYNC, FRAME_DATABITS_EIGHT,
    FRAME_PARITY_NONE, FRAME_STOPBITS_ONE, IF_RXOF, ROUTE_CLKPEN, ROUTE_CSPEN, ROUTE_LOCATION_MASK,
    ROUTE_LOCATION_SHIFT, ROUTE_RXPEN, ROUTE_TXPEN, STATUS_RXDATAV, STATUS_TXBL, UsartRegs,
    sync_clkdiv,
};

/// Serial master state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MasterState {
    /// Never configured
    #[default]
    Unconfigured,
    /// Configured with receiver and transmitter enabled
    Enabled,
    /// Receiver, transmitter and master disabled
    Disabled,
}

/// Transfer endpoints of a configured master
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MasterEndpoints {
    /// RXDATA address, source for receive transfers
    pub data_in: u32,
    /// TXDATA address, destination for transmit transfers
    pub data_out: u32,
    /// Request line asserted while a received byte is waiting
    pub rx_trigger: TriggerSource,
    /// Request line asserted while the transmit buffer has room
    pub tx_trigger: TriggerSource,
}

/// Request lines currently asserted by the peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingTriggers {
    /// STATUS.RXDATAV
    pub rx_data_valid: bool,
    /// STATUS.TXBL
    pub tx_buffer_level: bool,
}

/// USART in synchronous master mode
#[derive(Debug)]
pub struct SpiMaster {
    instance: UsartInstance,
    regs: UsartRegs,
    state: MasterState,
}

impl SpiMaster {
    /// Create a driver for `instance`. No register access.
    #[must_use]
    pub const fn new(instance: UsartInstance) -> Self {
        Self {
            instance,
            regs: UsartRegs::new(instance.base()),
            state: MasterState::Unconfigured,
        }
    }

    /// USART instance
    #[inline]
    pub fn instance(&self) -> UsartInstance {
        self.instance
    }

    /// Current state
    #[inline]
    pub fn state(&self) -> MasterState {
        self.state
    }

    /// Whether receiver and transmitter are enabled
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.state == MasterState::Enabled
    }

    /// Endpoints of this instance
    #[must_use]
    pub const fn endpoints(&self) -> MasterEndpoints {
        MasterEndpoints {
            data_in: self.regs.rxdata_addr(),
            data_out: self.regs.txdata_addr(),
            rx_trigger: TriggerSource::UsartRxDataValid(self.instance),
            tx_trigger: TriggerSource::UsartTxBufferLevel(self.instance),
        }
    }

    /// Configure the USART as synchronous master.
    ///
    /// The configuration is validated before any register is touched. The
    /// peripheral is held disabled while CTRL, FRAME, CLKDIV and ROUTE are
    /// written, and the receiver and transmitter are enabled last.
    pub fn configure_master<B: RegisterBus>(
        &mut self,
        bus: &mut B,
        config: MasterConfig,
    ) -> ConfigResult<MasterEndpoints> {
        if config.route_location > MAX_ROUTE_LOCATION {
            return Err(ConfigError::InvalidRouteLocation);
        }
        let clkdiv = sync_clkdiv(config.peripheral_clock_hz, config.clock_rate_hz)
            .ok_or(ConfigError::UnsupportedClockRate)?;

        let regs = self.regs;
        regs.command(
            bus,
            CMD_RXDIS | CMD_TXDIS | CMD_MASTERDIS | CMD_CLEARRX | CMD_CLEARTX,
        );
        regs.set_ctrl(bus, ctrl_bits(&config));
        regs.set_frame(bus, FRAME_DATABITS_EIGHT | FRAME_PARITY_NONE | FRAME_STOPBITS_ONE);
        regs.set_clkdiv(bus, clkdiv);
        regs.command(bus, CMD_MASTEREN);
        regs.set_route(
            bus,
            ROUTE_RXPEN
                | ROUTE_TXPEN
                | ROUTE_CSPEN
                | ROUTE_CLKPEN
                | (((config.route_location as u32) << ROUTE_LOCATION_SHIFT) & ROUTE_LOCATION_MASK),
        );
        regs.command(bus, CMD_RXEN | CMD_TXEN);
        self.state = MasterState::Enabled;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "{}: SPI master at {} Hz (clkdiv {:#010x}), location {}",
            self.instance,
            config.clock_rate_hz,
            clkdiv,
            config.route_location
        );

        Ok(self.endpoints())
    }

    /// Read STATUS and report which request lines are asserted
    pub fn pending_triggers<B: RegisterBus>(&self, bus: &mut B) -> PendingTriggers {
        if self.state != MasterState::Enabled {
            return PendingTriggers::default();
        }
        let status = self.regs.status(bus);
        PendingTriggers {
            rx_data_valid: status & STATUS_RXDATAV != 0,
            tx_buffer_level: status & STATUS_TXBL != 0,
        }
    }

    /// Read and clear the receive overflow flag
    pub fn take_rx_overflow<B: RegisterBus>(&self, bus: &mut B) -> bool {
        if self.regs.interrupt_flags(bus) & IF_RXOF == 0 {
            return false;
        }
        self.regs.clear_interrupt_flags(bus, IF_RXOF);
        true
    }

    /// Disable receiver, transmitter and master mode
    pub fn disable<B: RegisterBus>(&mut self, bus: &mut B) {
        self.regs.command(bus, CMD_RXDIS | CMD_TXDIS | CMD_MASTERDIS);
        self.state = MasterState::Disabled;
    }
}

fn ctrl_bits(config: &MasterConfig) -> u32 {
    let mut ctrl = CTRL_SYNC;
    if config.mode.polarity == Polarity::IdleHigh {
        ctrl |= CTRL_CLKPOL;
    }
    if config.mode.phase == Phase::CaptureOnSecondTransition {
        ctrl |= CTRL_CLKPHA;
    }
    if config.bit_order == BitOrder::MsbFirst {
        ctrl |= CTRL_MSBF;
    }
    if config.auto_chip_select {
        ctrl |= CTRL_AUTOCS;
    }
    ctrl
}

// =============================================================================
// Unit Tests
// =============================================================================
