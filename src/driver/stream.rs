//! Continuous SPI stream over two self re-arming channels.
//!
//! [`SpiDmaStream`] wires a [`SpiMaster`] to a [`TransferEngine`]: the RX
//! channel copies RXDATA into the receive buffer, the TX channel copies the
//! transmit buffer into TXDATA, and both re-arm themselves from their
//! completion callbacks so the transfer never ends.

use super::config::{State, StreamConfig};
use super::error::{ConfigError, DmaError, DmaResult, Result};
use super::master::{MasterEndpoints, MasterState, SpiMaster};
use crate::dma::{
    Burst, ChannelConfig, ChannelState, ChannelStats, CompletionCallback, Descriptor, Slot,
    TransferEngine,
};
use crate::hal::board::BoardSetup;
use crate::hal::bus::RegisterBus;
use crate::internal::constants::{DMA_CHANNELS, MAX_BURST_UNITS};

#[cfg(feature = "log")]
use log::warn;

/// SPI master streaming through the transfer engine
///
/// # Type Parameters
/// * `CHANNELS` - Number of engine channels
pub struct SpiDmaStream<const CHANNELS: usize> {
    config: StreamConfig,
    master: SpiMaster,
    engine: TransferEngine<CHANNELS>,
    endpoints: Option<MasterEndpoints>,
    state: State,
    rx_overflows: u32,
}

/// Stream sized for the full Series 0 controller
pub type SpiDmaStreamDefault = SpiDmaStream<DMA_CHANNELS>;

impl<const CHANNELS: usize> SpiDmaStream<CHANNELS> {
    /// Create an idle stream. Const-compatible, no register access.
    #[must_use]
    pub const fn new(config: StreamConfig) -> Self {
        Self {
            config,
            master: SpiMaster::new(config.instance),
            engine: TransferEngine::new(),
            endpoints: None,
            state: State::Uninitialized,
            rx_overflows: 0,
        }
    }

    /// Bring up the board and run the four setup steps in order
    pub fn start<P: BoardSetup, B: RegisterBus>(
        &mut self,
        mut board: P,
        bus: &mut B,
        tx_buffer: &'static mut [u8],
        rx_buffer: &'static mut [u8],
    ) -> Result<()> {
        self.expect_state(State::Uninitialized)?;
        board.enable_clocks(self.config.instance);
        board.configure_pins(self.config.instance, self.config.master.route_location);

        self.initialize_serial_master(bus)?;
        self.initialize_transfer_engine()?;
        self.arm_receive_channel(rx_buffer)?;
        self.arm_transmit_channel(tx_buffer)
    }

    /// Step 1: configure and enable the serial master
    pub fn initialize_serial_master<B: RegisterBus>(&mut self, bus: &mut B) -> Result<MasterEndpoints> {
        self.expect_state(State::Uninitialized)?;
        let endpoints = self.master.configure_master(bus, self.config.master)?;
        self.endpoints = Some(endpoints);
        self.state = State::MasterReady;
        Ok(endpoints)
    }

    /// Step 2: initialize the transfer engine
    pub fn initialize_transfer_engine(&mut self) -> Result<()> {
        self.expect_state(State::MasterReady)?;
        let (rx, tx) = (self.config.rx_channel, self.config.tx_channel);
        if rx == tx || rx >= CHANNELS || tx >= CHANNELS {
            return Err(ConfigError::InvalidConfig.into());
        }
        self.engine.init()?;
        self.state = State::EngineReady;
        Ok(())
    }

    /// Step 3: hand `rx_buffer` to the RX channel and arm it
    pub fn arm_receive_channel(&mut self, rx_buffer: &'static mut [u8]) -> Result<()> {
        self.expect_state(State::EngineReady)?;
        let endpoints = self.endpoints.ok_or(ConfigError::InvalidSequence)?;
        let units = burst_units(rx_buffer)?;

        let id = self.config.rx_channel;
        let config = ChannelConfig::new(endpoints.rx_trigger, CompletionCallback::rearm())
            .with_priority(self.config.rx_priority)
            .with_interrupts(self.config.interrupts_enabled)
            .with_buffer(rx_buffer);
        self.engine.configure_channel(id, config)?;
        self.engine.configure_descriptor(
            id,
            Slot::Primary,
            Descriptor::peripheral_to_memory().with_arbitration(self.config.arbitration),
        )?;
        self.engine
            .activate_basic(id, Slot::Primary, Burst::peripheral_to_memory(endpoints.data_in, units))?;
        self.state = State::ReceiveArmed;

        #[cfg(feature = "defmt")]
        defmt::info!("RX armed on ch{}, {} units", id, units);

        Ok(())
    }

    /// Step 4: hand `tx_buffer` to the TX channel and arm it
    pub fn arm_transmit_channel(&mut self, tx_buffer: &'static mut [u8]) -> Result<()> {
        self.expect_state(State::ReceiveArmed)?;
        let endpoints = self.endpoints.ok_or(ConfigError::InvalidSequence)?;
        let units = burst_units(tx_buffer)?;

        let id = self.config.tx_channel;
        let config = ChannelConfig::new(endpoints.tx_trigger, CompletionCallback::rearm())
            .with_priority(self.config.tx_priority)
            .with_interrupts(self.config.interrupts_enabled)
            .with_buffer(tx_buffer);
        self.engine.configure_channel(id, config)?;
        self.engine.configure_descriptor(
            id,
            Slot::Primary,
            Descriptor::memory_to_peripheral().with_arbitration(self.config.arbitration),
        )?;
        self.engine
            .activate_basic(id, Slot::Primary, Burst::memory_to_peripheral(endpoints.data_out, units))?;
        self.state = State::Running;

        #[cfg(feature = "defmt")]
        defmt::info!("TX armed on ch{}, {} units, stream running", id, units);

        Ok(())
    }

    /// Run one pass of the interrupt path.
    ///
    /// Delivers the asserted peripheral requests to the engine (TX first, so
    /// the byte it shifts out can be answered in the same pass), records a
    /// receive overflow, then dispatches completions. Returns the number of
    /// units moved.
    pub fn service<B: RegisterBus>(&mut self, bus: &mut B) -> usize {
        let Some(endpoints) = self.endpoints else {
            return 0;
        };
        if self.state < State::ReceiveArmed {
            return 0;
        }

        let mut moved = 0;
        if self.master.pending_triggers(bus).tx_buffer_level {
            moved += self.engine.on_trigger(endpoints.tx_trigger, bus);
        }
        if self.master.pending_triggers(bus).rx_data_valid {
            moved += self.engine.on_trigger(endpoints.rx_trigger, bus);
        }
        if self.master.take_rx_overflow(bus) {
            self.rx_overflows = self.rx_overflows.wrapping_add(1);
            #[cfg(feature = "log")]
            warn!("{:?}: receive overflow, total={}", self.config.instance, self.rx_overflows);
        }
        self.engine.on_interrupt();
        moved
    }

    /// Stop both channels and disable the serial master
    pub fn stop<B: RegisterBus>(&mut self, bus: &mut B) -> Result<()> {
        if self.state == State::Uninitialized {
            return Err(ConfigError::InvalidSequence.into());
        }
        for id in [self.config.rx_channel, self.config.tx_channel] {
            match self.engine.stop(id) {
                Ok(()) | Err(DmaError::NotInitialized | DmaError::ChannelNotConfigured) => {}
                Err(e) => return Err(e.into()),
            }
        }
        if self.master.state() == MasterState::Enabled {
            self.master.disable(bus);
        }
        self.state = State::Stopped;

        #[cfg(feature = "defmt")]
        defmt::info!("stream stopped");

        Ok(())
    }

    /// Take both buffers back as `(rx, tx)`.
    ///
    /// Refused while either channel still has a burst armed or in progress.
    pub fn release_buffers(&mut self) -> Result<(&'static mut [u8], &'static mut [u8])> {
        let (rx, tx) = (self.config.rx_channel, self.config.tx_channel);
        for id in [rx, tx] {
            if self.engine.channel_state(id)?.is_active() {
                return Err(DmaError::ChannelBusy.into());
            }
        }
        let rx_buffer = self.engine.release_channel(rx)?.into_buffer();
        let tx_buffer = self.engine.release_channel(tx)?.into_buffer();
        match (rx_buffer, tx_buffer) {
            (Some(rx), Some(tx)) => Ok((rx, tx)),
            _ => Err(DmaError::NoBuffer.into()),
        }
    }

    /// Receive buffer, once armed
    pub fn rx_buffer(&self) -> Option<&[u8]> {
        self.engine.buffer(self.config.rx_channel).ok().flatten()
    }

    /// Transmit buffer, once armed
    pub fn tx_buffer(&self) -> Option<&[u8]> {
        self.engine.buffer(self.config.tx_channel).ok().flatten()
    }

    /// State of engine channel `id`
    pub fn channel_state(&self, id: usize) -> DmaResult<ChannelState> {
        self.engine.channel_state(id)
    }

    /// Counters of engine channel `id`
    pub fn stats(&self, id: usize) -> DmaResult<ChannelStats> {
        self.engine.stats(id)
    }

    /// Counters of the RX channel
    pub fn rx_stats(&self) -> DmaResult<ChannelStats> {
        self.engine.stats(self.config.rx_channel)
    }

    /// Counters of the TX channel
    pub fn tx_stats(&self) -> DmaResult<ChannelStats> {
        self.engine.stats(self.config.tx_channel)
    }

    /// Receive overflows seen by [`service`](Self::service)
    #[inline]
    pub fn rx_overflows(&self) -> u32 {
        self.rx_overflows
    }

    /// Setup state
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Stream configuration
    #[inline]
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Master endpoints, once the master is configured
    #[inline]
    pub fn endpoints(&self) -> Option<MasterEndpoints> {
        self.endpoints
    }

    /// Underlying transfer engine
    #[inline]
    pub fn engine(&self) -> &TransferEngine<CHANNELS> {
        &self.engine
    }

    fn expect_state(&self, expected: State) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ConfigError::InvalidSequence.into())
        }
    }
}

fn burst_units(buffer: &[u8]) -> DmaResult<u16> {
    if buffer.is_empty() || buffer.len() > MAX_BURST_UNITS {
        return Err(DmaError::InvalidLength);
    }
    Ok(buffer.len() as u16)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::driver::config::{MasterConfig, UsartInstance};
    use crate::driver::error::Error;
    use crate::dma::Priority;
    use crate::hal::board::Preconfigured;
    use crate::internal::constants::{STREAM_BUFFER_SIZE, TX_PATTERN};
    use crate::testing::{MockBoard, MockBus, static_buffer, static_copy};
    use std::vec::Vec;

    type Stream = SpiDmaStream<DMA_CHANNELS>;

    fn running(config: StreamConfig) -> (Stream, MockBus) {
        let mut bus = MockBus::with_usart(config.instance);
        let mut stream = Stream::new(config);
        stream
            .start(
                Preconfigured,
                &mut bus,
                static_copy(&TX_PATTERN),
                static_buffer(STREAM_BUFFER_SIZE),
            )
            .unwrap();
        (stream, bus)
    }

    fn run(stream: &mut Stream, bus: &mut MockBus, passes: usize) {
        for _ in 0..passes {
            stream.service(bus);
        }
    }

    fn echoed(offset: u8) -> Vec<u8> {
        TX_PATTERN.iter().map(|b| b.wrapping_add(offset)).collect()
    }

    #[test]
    fn start_brings_up_board_then_runs() {
        let mut board = MockBoard::new();
        let mut bus = MockBus::with_usart(UsartInstance::Usart0);
        let mut stream = Stream::new(StreamConfig::new());

        stream
            .start(&mut board, &mut bus, static_copy(&TX_PATTERN), static_buffer(10))
            .unwrap();

        assert_eq!(board.clocks, [UsartInstance::Usart0]);
        assert_eq!(board.pins, [(UsartInstance::Usart0, 0)]);
        assert_eq!(stream.state(), State::Running);
        assert_eq!(stream.channel_state(0), Ok(ChannelState::Armed));
        assert_eq!(stream.channel_state(1), Ok(ChannelState::Armed));
        assert_eq!(stream.tx_buffer(), Some(&TX_PATTERN[..]));
    }

    #[test]
    fn entry_points_enforce_order() {
        let mut bus = MockBus::with_usart(UsartInstance::Usart0);
        let mut stream = Stream::new(StreamConfig::new());
        let sequence = Error::Config(ConfigError::InvalidSequence);

        assert_eq!(stream.initialize_transfer_engine(), Err(sequence));
        assert_eq!(stream.arm_receive_channel(static_buffer(10)), Err(sequence));

        stream.initialize_serial_master(&mut bus).unwrap();
        assert_eq!(stream.initialize_serial_master(&mut bus).unwrap_err(), sequence);
        assert_eq!(stream.arm_transmit_channel(static_buffer(10)), Err(sequence));

        stream.initialize_transfer_engine().unwrap();
        assert_eq!(stream.arm_transmit_channel(static_buffer(10)), Err(sequence));

        stream.arm_receive_channel(static_buffer(10)).unwrap();
        assert_eq!(stream.state(), State::ReceiveArmed);
        stream.arm_transmit_channel(static_copy(&TX_PATTERN)).unwrap();
        assert_eq!(stream.state(), State::Running);

        assert_eq!(
            stream.start(Preconfigured, &mut bus, static_buffer(1), static_buffer(1)),
            Err(sequence)
        );
    }

    #[test]
    fn master_error_aborts_setup() {
        let mut board = MockBoard::new();
        let mut bus = MockBus::with_usart(UsartInstance::Usart0);
        let config = StreamConfig::new().with_master(MasterConfig::new().with_clock_rate(8_000_000));
        let mut stream = Stream::new(config);

        let err = stream
            .start(&mut board, &mut bus, static_buffer(10), static_buffer(10))
            .unwrap_err();

        assert_eq!(err, Error::Config(ConfigError::UnsupportedClockRate));
        assert_eq!(stream.state(), State::Uninitialized);
        assert!(bus.writes().is_empty());
        assert_eq!(board.clocks.len(), 1);
    }

    #[test]
    fn channel_numbers_validated() {
        let mut bus = MockBus::with_usart(UsartInstance::Usart0);
        for (rx, tx) in [(2, 2), (0, DMA_CHANNELS)] {
            let mut stream = Stream::new(StreamConfig::new().with_channels(rx, tx));
            stream.initialize_serial_master(&mut bus).unwrap();
            assert_eq!(
                stream.initialize_transfer_engine(),
                Err(Error::Config(ConfigError::InvalidConfig))
            );
        }
    }

    #[test]
    fn buffer_length_validated() {
        let mut bus = MockBus::with_usart(UsartInstance::Usart0);
        let mut stream = Stream::new(StreamConfig::new());
        stream.initialize_serial_master(&mut bus).unwrap();
        stream.initialize_transfer_engine().unwrap();

        assert_eq!(
            stream.arm_receive_channel(static_buffer(0)),
            Err(Error::Dma(DmaError::InvalidLength))
        );
        assert_eq!(
            stream.arm_receive_channel(static_buffer(MAX_BURST_UNITS + 1)),
            Err(Error::Dma(DmaError::InvalidLength))
        );
        assert_eq!(stream.state(), State::EngineReady);
        stream.arm_receive_channel(static_buffer(MAX_BURST_UNITS)).unwrap();
    }

    #[test]
    fn transmits_pattern_in_order() {
        let (mut stream, mut bus) = running(StreamConfig::new());

        run(&mut stream, &mut bus, 10);

        assert_eq!(bus.tx_log(), &TX_PATTERN);
    }

    #[test]
    fn receives_peer_echo() {
        let (mut stream, mut bus) = running(StreamConfig::new());

        run(&mut stream, &mut bus, 10);

        assert_eq!(stream.rx_buffer(), Some(&echoed(0xA0)[..]));
        assert_eq!(stream.rx_overflows(), 0);
    }

    #[test]
    fn second_burst_overwrites_receive_buffer() {
        let (mut stream, mut bus) = running(StreamConfig::new());
        run(&mut stream, &mut bus, 10);
        let base = stream.rx_buffer().unwrap().as_ptr();
        assert_eq!(stream.channel_state(0), Ok(ChannelState::Armed));

        bus.set_echo_offset(0xB0);
        run(&mut stream, &mut bus, 10);

        let rx = stream.rx_buffer().unwrap();
        assert_eq!(rx, &echoed(0xB0)[..]);
        assert_eq!(rx.as_ptr(), base);
        assert_eq!(stream.rx_stats().unwrap().rearms, 2);
    }

    #[test]
    fn channels_stay_in_lockstep() {
        let (mut stream, mut bus) = running(StreamConfig::new());

        for pass in 1..=35u32 {
            stream.service(&mut bus);
            let rx = stream.rx_stats().unwrap();
            let tx = stream.tx_stats().unwrap();
            assert_eq!(rx.units_transferred, pass);
            assert_eq!(tx.units_transferred, pass);
            assert_eq!(rx.completed_bursts, tx.completed_bursts);
        }

        assert_eq!(stream.tx_stats().unwrap().completed_bursts, 3);
        assert_eq!(stream.rx_stats().unwrap().dropped_triggers, 0);
        assert_eq!(stream.tx_stats().unwrap().dropped_triggers, 0);
        assert_eq!(bus.tx_log().len(), 35);
    }

    #[test]
    fn interrupts_disabled_gives_single_shot() {
        let config = StreamConfig::new()
            .with_rx_priority(Priority::High)
            .with_interrupts(false);
        let (mut stream, mut bus) = running(config);

        run(&mut stream, &mut bus, 10);
        assert_eq!(stream.channel_state(0), Ok(ChannelState::Completed));
        assert_eq!(stream.channel_state(1), Ok(ChannelState::Completed));
        assert_eq!(stream.rx_buffer(), Some(&echoed(0xA0)[..]));

        run(&mut stream, &mut bus, 5);
        assert_eq!(stream.channel_state(0), Ok(ChannelState::Completed));
        assert_eq!(stream.rx_stats().unwrap().rearms, 0);
        assert_eq!(stream.tx_stats().unwrap().dropped_triggers, 5);
        assert_eq!(bus.tx_log().len(), 10);
    }

    #[test]
    fn receive_overflow_is_counted() {
        let (mut stream, mut bus) = running(StreamConfig::new());

        bus.push_rx(0x55);
        bus.push_rx(0x56);
        stream.service(&mut bus);

        assert_eq!(stream.rx_overflows(), 1);
        stream.service(&mut bus);
        assert_eq!(stream.rx_overflows(), 1);
    }

    #[test]
    fn stop_halts_traffic() {
        let (mut stream, mut bus) = running(StreamConfig::new());
        run(&mut stream, &mut bus, 4);

        stream.stop(&mut bus).unwrap();
        assert_eq!(stream.state(), State::Stopped);
        assert_eq!(stream.channel_state(0), Ok(ChannelState::Stopped));
        assert_eq!(stream.channel_state(1), Ok(ChannelState::Stopped));

        assert_eq!(stream.service(&mut bus), 0);
        assert_eq!(bus.tx_log().len(), 4);
    }

    #[test]
    fn stop_before_start_is_rejected() {
        let mut bus = MockBus::new();
        let mut stream = Stream::new(StreamConfig::new());
        assert_eq!(
            stream.stop(&mut bus),
            Err(Error::Config(ConfigError::InvalidSequence))
        );
    }

    #[test]
    fn buffers_released_only_after_stop() {
        let (mut stream, mut bus) = running(StreamConfig::new());
        run(&mut stream, &mut bus, 3);

        assert_eq!(stream.release_buffers().unwrap_err(), Error::Dma(DmaError::ChannelBusy));

        stream.stop(&mut bus).unwrap();
        let (rx, tx) = stream.release_buffers().unwrap();
        assert_eq!(&rx[..3], &[0xA0, 0xA1, 0xA2]);
        assert_eq!(tx, &TX_PATTERN);
        assert_eq!(stream.rx_buffer(), None);
        assert_eq!(stream.channel_state(0), Err(DmaError::ChannelNotConfigured));
    }

    #[test]
    fn service_before_arming_does_nothing() {
        let mut bus = MockBus::with_usart(UsartInstance::Usart0);
        let mut stream = Stream::new(StreamConfig::new());
        assert_eq!(stream.service(&mut bus), 0);

        stream.initialize_serial_master(&mut bus).unwrap();
        stream.initialize_transfer_engine().unwrap();
        assert_eq!(stream.service(&mut bus), 0);
        assert!(bus.tx_log().is_empty());
    }
}
