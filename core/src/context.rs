//! The state every handler runs against.

use core::sync::atomic::{AtomicU8, Ordering};

use trapgate_abi::{
    Console, ContextSlot, DeviceLine, InterruptController, PageFaultResolver, Scheduler,
    SyscallDispatcher, TrapCpu, TrapThread,
};

/// Selects which register snapshot the next context switch restores.
///
/// There is one per processor; the low-level switch primitive reads it.
/// Only one hardware thread of control exists and it is written with
/// interrupts disabled, so relaxed ordering is enough.
pub struct ActiveContext {
    slot: AtomicU8,
}

impl ActiveContext {
    pub const fn new() -> Self {
        Self {
            slot: AtomicU8::new(ContextSlot::Kernel as u8),
        }
    }

    #[inline]
    pub fn select(&self, slot: ContextSlot) {
        self.slot.store(slot as u8, Ordering::Relaxed);
    }

    #[inline]
    pub fn current(&self) -> ContextSlot {
        ContextSlot::from_raw(self.slot.load(Ordering::Relaxed))
    }
}

impl Default for ActiveContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Collaborators the handlers forward to.
pub struct TrapEnv<'a> {
    pub cpu: &'a dyn TrapCpu,
    pub scheduler: &'a dyn Scheduler,
    pub page_faults: &'a dyn PageFaultResolver,
    pub syscalls: &'a dyn SyscallDispatcher,
    pub keyboard: &'a dyn DeviceLine,
    /// Owner of both serial lines.
    pub serial: &'a dyn DeviceLine,
    /// Owner of every block-device line.
    pub block: &'a dyn DeviceLine,
    pub pic: &'a dyn InterruptController,
    pub console: &'a dyn Console,
}

/// One trap in flight: the interrupted thread, the process-wide snapshot
/// selector and the collaborators.
pub struct TrapContext<'a> {
    pub thread: &'a dyn TrapThread,
    pub active: &'a ActiveContext,
    pub env: &'a TrapEnv<'a>,
}

impl<'a> TrapContext<'a> {
    pub fn new(
        thread: &'a dyn TrapThread,
        active: &'a ActiveContext,
        env: &'a TrapEnv<'a>,
    ) -> Self {
        Self {
            thread,
            active,
            env,
        }
    }
}
