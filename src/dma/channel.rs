//! Channel configuration and state.

use super::callback::CompletionCallback;
use crate::driver::config::UsartInstance;

/// Channel priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Priority {
    /// Default priority
    #[default]
    Normal,
    /// Served before normal channels on the same trigger
    High,
}

/// Hardware request line that advances a channel by one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerSource {
    /// USART receive data valid (RXDATAV)
    UsartRxDataValid(UsartInstance),
    /// USART transmit buffer level (TXBL)
    UsartTxBufferLevel(UsartInstance),
    /// USART transmit complete (TXC)
    UsartTxComplete(UsartInstance),
    /// Software request
    Software,
}

/// Per-channel state machine
///
/// `Unarmed -> Armed -> InProgress -> Completed -> Armed -> ...`, with
/// `Stopped` reachable from any state and left only by releasing the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// Configured, never activated
    #[default]
    Unarmed,
    /// Burst activated, no unit moved yet
    Armed,
    /// At least one unit moved, more outstanding
    InProgress,
    /// All units moved
    Completed,
    /// Stopped; triggers are ignored and nothing re-arms
    Stopped,
}

impl ChannelState {
    /// Whether the channel consumes triggers
    #[inline]
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, ChannelState::Armed | ChannelState::InProgress)
    }
}

/// Channel configuration
///
/// The completion callback is required up front so it is always bound
/// before the channel can be armed. The buffer, when present, is owned by
/// the channel until [`release_channel`] hands it back.
///
/// [`release_channel`]: super::TransferEngine::release_channel
#[derive(Debug)]
pub struct ChannelConfig {
    /// Request line
    pub trigger: TriggerSource,
    /// Completion handler
    pub callback: CompletionCallback,
    /// Priority level
    pub priority: Priority,
    /// Raise the completion interrupt at the end of each burst
    pub interrupts_enabled: bool,
    buffer: Option<&'static mut [u8]>,
}

impl ChannelConfig {
    /// Normal priority, interrupts enabled, no buffer
    #[must_use]
    pub const fn new(trigger: TriggerSource, callback: CompletionCallback) -> Self {
        Self {
            trigger,
            callback,
            priority: Priority::Normal,
            interrupts_enabled: true,
            buffer: None,
        }
    }

    /// Set the priority level
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Enable or disable the completion interrupt
    #[must_use]
    pub const fn with_interrupts(mut self, enabled: bool) -> Self {
        self.interrupts_enabled = enabled;
        self
    }

    /// Hand a buffer to the channel
    #[must_use]
    pub fn with_buffer(mut self, buffer: &'static mut [u8]) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// Channel buffer
    #[inline]
    pub fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    #[inline]
    pub(crate) fn buffer_mut(&mut self) -> Option<&mut [u8]> {
        self.buffer.as_deref_mut()
    }

    /// Take the buffer back
    pub fn into_buffer(self) -> Option<&'static mut [u8]> {
        self.buffer
    }
}

/// Handle describing a configured channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel {
    id: usize,
    trigger: TriggerSource,
    priority: Priority,
    interrupts_enabled: bool,
}

impl Channel {
    pub(crate) fn from_config(id: usize, config: &ChannelConfig) -> Self {
        Self {
            id,
            trigger: config.trigger,
            priority: config.priority,
            interrupts_enabled: config.interrupts_enabled,
        }
    }

    /// Channel number
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Bound request line
    #[inline]
    pub fn trigger(&self) -> TriggerSource {
        self.trigger
    }

    /// Priority level
    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Completion interrupt enabled
    #[inline]
    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }
}

/// Per-channel counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelStats {
    /// Bursts that reached `Completed`
    pub completed_bursts: u32,
    /// Successful activations requested by the completion callback
    pub rearms: u32,
    /// Callback activations the engine rejected
    pub rearm_failures: u32,
    /// Triggers that arrived while the channel was not armed (data loss)
    pub dropped_triggers: u32,
    /// Units moved
    pub units_transferred: u32,
}
