//! Transfer engine with self re-arming basic bursts.
//!
//! The engine models the channel side of the DMA controller. Peripheral
//! request lines call [`TransferEngine::on_trigger`], which moves one unit
//! on every armed channel bound to that line. A channel whose burst runs
//! out moves to `Completed` and, with interrupts enabled, marks its
//! completion pending. [`TransferEngine::on_interrupt`] then runs the
//! channel callbacks and applies any activation they request.

use super::burst::{Burst, Endpoint};
use super::callback::CompletionContext;
use super::channel::{Channel, ChannelConfig, ChannelState, ChannelStats, Priority, TriggerSource};
use super::descriptor::{AddressMode, Descriptor, Slot, UnitSize};
use crate::driver::error::{ConfigError, ConfigResult, DmaError, DmaResult};
use crate::hal::bus::RegisterBus;

#[cfg(feature = "log")]
use log::warn;

struct ChannelSlot {
    config: Option<ChannelConfig>,
    descriptors: [Option<Descriptor>; 2],
    state: ChannelState,
    active: Option<(Slot, Burst)>,
    progress: u16,
    pending: bool,
    stats: ChannelStats,
}

impl ChannelSlot {
    const fn new() -> Self {
        Self {
            config: None,
            descriptors: [None, None],
            state: ChannelState::Unarmed,
            active: None,
            progress: 0,
            pending: false,
            stats: ChannelStats {
                completed_bursts: 0,
                rearms: 0,
                rearm_failures: 0,
                dropped_triggers: 0,
                units_transferred: 0,
            },
        }
    }

    fn reset(&mut self) -> Option<ChannelConfig> {
        let config = self.config.take();
        *self = Self::new();
        config
    }
}

/// Transfer engine with `CHANNELS` channels
pub struct TransferEngine<const CHANNELS: usize> {
    channels: [ChannelSlot; CHANNELS],
    initialized: bool,
}

impl<const CHANNELS: usize> Default for TransferEngine<CHANNELS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CHANNELS: usize> TransferEngine<CHANNELS> {
    /// Create an uninitialized engine. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            channels: [const { ChannelSlot::new() }; CHANNELS],
            initialized: false,
        }
    }

    /// Reset every channel and enable the controller.
    ///
    /// Valid once per engine.
    pub fn init(&mut self) -> ConfigResult<()> {
        if self.initialized {
            return Err(ConfigError::AlreadyInitialized);
        }
        for slot in &mut self.channels {
            slot.reset();
        }
        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::info!("transfer engine initialized, {} channels", CHANNELS);

        Ok(())
    }

    /// Check if the engine has been initialized
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of channels
    #[inline(always)]
    pub const fn channel_count(&self) -> usize {
        CHANNELS
    }

    /// Bind a trigger, callback and optional buffer to channel `id`.
    ///
    /// Replaces any previous binding, clears both descriptor slots and returns
    /// the channel to `Unarmed`. A previous binding that still owns a buffer
    /// must be handed back with [`release_channel`](Self::release_channel)
    /// first.
    pub fn configure_channel(&mut self, id: usize, config: ChannelConfig) -> DmaResult<Channel> {
        let slot = self.slot_mut(id)?;
        if slot.state.is_active() {
            return Err(DmaError::ChannelBusy);
        }
        if slot.config.as_ref().is_some_and(|c| c.buffer().is_some()) {
            return Err(DmaError::BufferNotReleased);
        }

        let channel = Channel::from_config(id, &config);
        *slot = ChannelSlot::new();
        slot.config = Some(config);
        Ok(channel)
    }

    /// Write the descriptor for `slot` of channel `id`
    pub fn configure_descriptor(
        &mut self,
        id: usize,
        slot: Slot,
        descriptor: Descriptor,
    ) -> DmaResult<Descriptor> {
        let channel = self.configured_mut(id)?;
        if channel.state.is_active() {
            return Err(DmaError::ChannelBusy);
        }
        channel.descriptors[slot.index()] = Some(descriptor);
        Ok(descriptor)
    }

    /// Activate a basic burst on channel `id` using the descriptor in `slot`.
    ///
    /// Moves `Unarmed` or `Completed` to `Armed`.
    pub fn activate_basic(&mut self, id: usize, slot: Slot, burst: Burst) -> DmaResult<()> {
        let channel = self.configured_mut(id)?;
        match channel.state {
            ChannelState::Stopped => return Err(DmaError::ChannelStopped),
            ChannelState::Armed | ChannelState::InProgress => return Err(DmaError::ChannelBusy),
            ChannelState::Unarmed | ChannelState::Completed => {}
        }

        let descriptor = channel.descriptors[slot.index()].ok_or(DmaError::DescriptorNotConfigured)?;
        let buffer_len = channel
            .config
            .as_ref()
            .and_then(ChannelConfig::buffer)
            .map(<[u8]>::len);
        validate_burst(&descriptor, &burst, buffer_len)?;

        channel.active = Some((slot, burst));
        channel.progress = 0;
        channel.pending = false;
        channel.state = ChannelState::Armed;
        Ok(())
    }

    /// Deliver one request from `source`.
    ///
    /// Every channel bound to `source` moves one unit, high priority
    /// channels first, then by ascending channel number. Returns the number
    /// of units moved.
    pub fn on_trigger<B: RegisterBus>(&mut self, source: TriggerSource, bus: &mut B) -> usize {
        if !self.initialized {
            return 0;
        }

        let mut moved = 0;
        for priority in [Priority::High, Priority::Normal] {
            for (_id, channel) in self.channels.iter_mut().enumerate() {
                let bound = channel
                    .config
                    .as_ref()
                    .is_some_and(|c| c.trigger == source && c.priority == priority);
                if !bound {
                    continue;
                }

                match channel.state {
                    ChannelState::Armed | ChannelState::InProgress => {
                        step(channel, bus);
                        moved += 1;
                    }
                    ChannelState::Unarmed | ChannelState::Completed => {
                        channel.stats.dropped_triggers = channel.stats.dropped_triggers.wrapping_add(1);
                        #[cfg(feature = "log")]
                        warn!(
                            "dma ch{}: trigger while {:?}, dropped={}",
                            _id, channel.state, channel.stats.dropped_triggers
                        );
                    }
                    ChannelState::Stopped => {}
                }
            }
        }
        moved
    }

    /// Service pending completions.
    ///
    /// Runs the callback of every channel with a pending completion, in
    /// ascending channel order, and applies the activation it requests.
    /// A rejected activation is counted and the channel stays `Completed`.
    /// Returns the number of callbacks run.
    pub fn on_interrupt(&mut self) -> usize {
        let mut dispatched = 0;
        for id in 0..CHANNELS {
            let channel = &mut self.channels[id];
            if !core::mem::take(&mut channel.pending) || channel.state != ChannelState::Completed {
                continue;
            }
            let (Some(config), Some((slot, burst))) = (channel.config.as_ref(), channel.active) else {
                continue;
            };

            let callback = config.callback;
            let mut ctx = CompletionContext::new(
                id,
                slot,
                channel.stats.completed_bursts,
                callback.user(),
                &burst,
            );
            callback.invoke(&mut ctx);
            dispatched += 1;

            let Some((next_slot, next)) = ctx.take_request() else {
                continue;
            };
            match self.activate_basic(id, next_slot, next) {
                Ok(()) => {
                    let stats = &mut self.channels[id].stats;
                    stats.rearms = stats.rearms.wrapping_add(1);
                }
                Err(_e) => {
                    let stats = &mut self.channels[id].stats;
                    stats.rearm_failures = stats.rearm_failures.wrapping_add(1);
                    #[cfg(feature = "log")]
                    warn!("dma ch{}: re-arm rejected: {}", id, _e);
                }
            }
        }
        dispatched
    }

    /// Stop channel `id`.
    ///
    /// The current burst is abandoned, triggers are ignored and completions
    /// are no longer dispatched. Reconfiguring or releasing the channel
    /// leaves this state.
    pub fn stop(&mut self, id: usize) -> DmaResult<()> {
        let channel = self.configured_mut(id)?;
        channel.state = ChannelState::Stopped;
        channel.pending = false;
        Ok(())
    }

    /// Unbind channel `id` and hand back its configuration and buffer.
    ///
    /// Refused while a burst is armed or in progress.
    pub fn release_channel(&mut self, id: usize) -> DmaResult<ChannelConfig> {
        let channel = self.configured_mut(id)?;
        if channel.state.is_active() {
            return Err(DmaError::ChannelBusy);
        }
        channel.reset().ok_or(DmaError::ChannelNotConfigured)
    }

    /// Current state of channel `id`
    pub fn channel_state(&self, id: usize) -> DmaResult<ChannelState> {
        self.configured(id).map(|c| c.state)
    }

    /// Counters for channel `id`
    pub fn stats(&self, id: usize) -> DmaResult<ChannelStats> {
        self.configured(id).map(|c| c.stats)
    }

    /// Last activated burst on channel `id`
    pub fn active_burst(&self, id: usize) -> DmaResult<Option<(Slot, Burst)>> {
        self.configured(id).map(|c| c.active)
    }

    /// Units moved in the current burst of channel `id`
    pub fn progress(&self, id: usize) -> DmaResult<u16> {
        self.configured(id).map(|c| c.progress)
    }

    /// Buffer owned by channel `id`
    pub fn buffer(&self, id: usize) -> DmaResult<Option<&[u8]>> {
        self.configured(id)
            .map(|c| c.config.as_ref().and_then(ChannelConfig::buffer))
    }

    /// Whether channel `id` has a completion waiting for [`on_interrupt`](Self::on_interrupt)
    pub fn is_pending(&self, id: usize) -> DmaResult<bool> {
        self.configured(id).map(|c| c.pending)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    fn slot_mut(&mut self, id: usize) -> DmaResult<&mut ChannelSlot> {
        if !self.initialized {
            return Err(DmaError::NotInitialized);
        }
        self.channels.get_mut(id).ok_or(DmaError::InvalidChannel)
    }

    fn configured_mut(&mut self, id: usize) -> DmaResult<&mut ChannelSlot> {
        let slot = self.slot_mut(id)?;
        if slot.config.is_none() {
            return Err(DmaError::ChannelNotConfigured);
        }
        Ok(slot)
    }

    fn configured(&self, id: usize) -> DmaResult<&ChannelSlot> {
        if !self.initialized {
            return Err(DmaError::NotInitialized);
        }
        let slot = self.channels.get(id).ok_or(DmaError::InvalidChannel)?;
        if slot.config.is_none() {
            return Err(DmaError::ChannelNotConfigured);
        }
        Ok(slot)
    }
}

/// Check a burst against the descriptor and the channel buffer.
///
/// Register endpoints must be fixed, buffer endpoints incrementing, and at
/// most one side may be the channel buffer.
fn validate_burst(descriptor: &Descriptor, burst: &Burst, buffer_len: Option<usize>) -> DmaResult<()> {
    if burst.n_minus_1().is_none() {
        return Err(DmaError::InvalidLength);
    }
    if burst.source.is_buffer() && burst.destination.is_buffer() {
        return Err(DmaError::AddressModeMismatch);
    }
    check_mode(burst.source, descriptor.source_mode)?;
    check_mode(burst.destination, descriptor.destination_mode)?;

    if burst.source.is_buffer() || burst.destination.is_buffer() {
        let len = buffer_len.ok_or(DmaError::NoBuffer)?;
        if len < burst.units as usize * descriptor.unit_size.bytes() {
            return Err(DmaError::BufferTooSmall);
        }
    }
    Ok(())
}

fn check_mode(endpoint: Endpoint, mode: AddressMode) -> DmaResult<()> {
    match (endpoint, mode) {
        (Endpoint::Register(_), AddressMode::Fixed) | (Endpoint::Buffer, AddressMode::Increment) => Ok(()),
        _ => Err(DmaError::AddressModeMismatch),
    }
}

/// Move one unit on an armed channel
fn step<B: RegisterBus>(channel: &mut ChannelSlot, bus: &mut B) {
    let Some((slot, burst)) = channel.active else {
        return;
    };
    let Some(descriptor) = channel.descriptors[slot.index()] else {
        return;
    };
    let size = descriptor.unit_size;
    let offset = channel.progress as usize * size.bytes();

    let value = match burst.source {
        Endpoint::Register(addr) => bus.read(addr) & size.mask(),
        Endpoint::Buffer => channel
            .config
            .as_ref()
            .and_then(ChannelConfig::buffer)
            .map_or(0, |buf| load_unit(buf, offset, size)),
    };
    match burst.destination {
        Endpoint::Register(addr) => bus.write(addr, value),
        Endpoint::Buffer => {
            if let Some(buf) = channel.config.as_mut().and_then(ChannelConfig::buffer_mut) {
                store_unit(buf, offset, size, value);
            }
        }
    }

    channel.progress += 1;
    channel.stats.units_transferred = channel.stats.units_transferred.wrapping_add(1);
    if channel.progress >= burst.units {
        channel.state = ChannelState::Completed;
        channel.stats.completed_bursts = channel.stats.completed_bursts.wrapping_add(1);
        channel.pending = channel.config.as_ref().is_some_and(|c| c.interrupts_enabled);
    } else {
        channel.state = ChannelState::InProgress;
    }
}

fn load_unit(buf: &[u8], offset: usize, size: UnitSize) -> u32 {
    let mut bytes = [0u8; 4];
    let n = size.bytes();
    if let Some(src) = buf.get(offset..offset + n) {
        bytes[..n].copy_from_slice(src);
    }
    u32::from_le_bytes(bytes)
}

fn store_unit(buf: &mut [u8], offset: usize, size: UnitSize, value: u32) {
    let n = size.bytes();
    if let Some(dst) = buf.get_mut(offset..offset + n) {
        dst.copy_from_slice(&value.to_le_bytes()[..n]);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
