//! Completion callbacks.
//!
//! A [`CompletionCallback`] is stored by value inside the channel
//! configuration, so the engine owns it for as long as the channel exists.
//! The callback runs from [`TransferEngine::on_interrupt`] after the channel
//! reaches `Completed`. It cannot touch the engine directly; instead it
//! records an activation request on the [`CompletionContext`], which the
//! engine applies as soon as the callback returns.
//!
//! [`TransferEngine::on_interrupt`]: super::TransferEngine::on_interrupt

use core::fmt;

use super::burst::Burst;
use super::descriptor::Slot;

/// Callback signature
pub type CompletionFn = fn(&mut CompletionContext<'_>);

/// Completion handler bound to a channel at configuration time
#[derive(Clone, Copy)]
pub struct CompletionCallback {
    func: CompletionFn,
    user: u32,
}

impl CompletionCallback {
    /// Wrap a handler function
    #[must_use]
    pub const fn new(func: CompletionFn) -> Self {
        Self { func, user: 0 }
    }

    /// Re-activate the finished burst with identical parameters
    #[must_use]
    pub const fn rearm() -> Self {
        Self::new(refresh_transfer)
    }

    /// Leave the channel in `Completed`
    #[must_use]
    pub const fn single_shot() -> Self {
        Self::new(leave_completed)
    }

    /// Attach an opaque value handed back through [`CompletionContext::user`]
    #[must_use]
    pub const fn with_user(mut self, user: u32) -> Self {
        self.user = user;
        self
    }

    /// Opaque user value
    #[inline]
    pub const fn user(&self) -> u32 {
        self.user
    }

    #[inline]
    pub(crate) fn invoke(&self, ctx: &mut CompletionContext<'_>) {
        (self.func)(ctx);
    }
}

impl fmt::Debug for CompletionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionCallback")
            .field("func", &(self.func as *const ()))
            .field("user", &self.user)
            .finish()
    }
}

/// View of a finished burst handed to the completion callback
#[derive(Debug)]
pub struct CompletionContext<'a> {
    channel: usize,
    slot: Slot,
    completed: u32,
    user: u32,
    burst: &'a Burst,
    request: Option<(Slot, Burst)>,
}

impl<'a> CompletionContext<'a> {
    pub(crate) fn new(channel: usize, slot: Slot, completed: u32, user: u32, burst: &'a Burst) -> Self {
        Self {
            channel,
            slot,
            completed,
            user,
            burst,
            request: None,
        }
    }

    /// Channel that completed
    #[inline]
    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Descriptor slot the burst ran on
    #[inline]
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Bursts completed on this channel so far, this one included
    #[inline]
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Value attached with [`CompletionCallback::with_user`]
    #[inline]
    pub fn user(&self) -> u32 {
        self.user
    }

    /// Parameters of the burst that just finished
    #[inline]
    pub fn burst(&self) -> &Burst {
        self.burst
    }

    /// Request a new basic burst on this channel
    ///
    /// Later requests replace earlier ones.
    pub fn activate_basic(&mut self, slot: Slot, burst: Burst) {
        self.request = Some((slot, burst));
    }

    /// Request the finished burst again on the same slot
    pub fn rearm(&mut self) {
        self.request = Some((self.slot, *self.burst));
    }

    /// Whether an activation has been requested
    #[inline]
    pub fn rearm_requested(&self) -> bool {
        self.request.is_some()
    }

    pub(crate) fn take_request(&mut self) -> Option<(Slot, Burst)> {
        self.request.take()
    }
}

/// Re-arm the channel with the parameters of the burst that just finished
pub fn refresh_transfer(ctx: &mut CompletionContext<'_>) {
    ctx.rearm();
}

fn leave_completed(_ctx: &mut CompletionContext<'_>) {}
