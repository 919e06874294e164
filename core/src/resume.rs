//! Resume-target policy shared by every handler.
//!
//! Handlers report *what happened*; this module alone turns the thread's
//! resume-to-user flag into *where execution continues*.

use trapgate_abi::{ContextSlot, Resume};

use crate::context::TrapContext;

/// Handler prologue: the thread is now executing kernel-side logic.
#[inline]
pub fn enter_kernel(cx: &mut TrapContext<'_>) {
    cx.thread.set_switch_to_userspace(false);
    cx.active.select(ContextSlot::Kernel);
}

/// Handler epilogue.
///
/// A thread due to resume in user mode gets its user snapshot selected and a
/// context switch; anything else returns into the interrupted kernel context.
pub fn decide(cx: &mut TrapContext<'_>) -> Resume {
    if cx.thread.switch_to_userspace() {
        cx.active.select(ContextSlot::User);
        Resume::ContextSwitch
    } else {
        Resume::Kernel
    }
}
