//! Collaborator interfaces consumed by the trap handlers.
//!
//! These traits are defined in `abi` (no kernel dependencies) so that:
//! - `core` dispatches through trait objects without knowing the subsystems
//! - the scheduler, memory manager and drivers implement them in their own crates
//! - `boot` wires concrete implementations together at bring-up
//!
//! Handlers only decide *when* to call a collaborator. What the collaborator
//! does is its own business.

use core::fmt;

use crate::arch::x86::TablePointer;
use crate::context::{ContextSlot, RegisterContext, SyscallArgs, ThreadId};
use crate::fault::PageFault;

/// The thread that was running when the trap fired.
///
/// Owned by the thread lifecycle. Handlers re-enable interrupts, so a nested
/// trap can be handed the same thread while an outer handler still holds it.
/// Every method therefore takes `&self` and implementations keep their state
/// behind atomics or locks.
pub trait TrapThread {
    fn id(&self) -> ThreadId;

    /// Whether the thread is due to resume in user mode.
    fn switch_to_userspace(&self) -> bool;

    fn set_switch_to_userspace(&self, value: bool);

    /// A copy of one of the thread's two register snapshots.
    fn registers(&self, slot: ContextSlot) -> RegisterContext;

    /// Replace one of the thread's two register snapshots.
    fn save_registers(&self, slot: ContextSlot, registers: &RegisterContext);

    /// Store a system call's return value in the user snapshot's `eax`.
    fn set_syscall_result(&self, value: u32);

    /// Remove the thread from scheduling. Its resources are reclaimed by the
    /// lifecycle; it never runs again.
    fn kill(&self);
}

/// Scheduler entry points driven by the timer and yield vectors.
pub trait Scheduler: Sync {
    /// Advance the tick counter.
    fn tick(&self);

    /// Pick the next thread and install it (and its register snapshot) as current.
    fn schedule(&self);
}

/// Page-fault resolution.
pub trait PageFaultResolver: Sync {
    /// Resolve `fault` for `thread`. A fault resolved for a user program leaves
    /// the thread's resume-to-user flag set.
    fn enter(&self, thread: &dyn TrapThread, fault: &PageFault);
}

/// System-call dispatch. Total over its argument domain: unknown call numbers
/// are reported through the return value.
pub trait SyscallDispatcher: Sync {
    fn dispatch(&self, args: SyscallArgs) -> u32;
}

/// A device manager owning one or more IRQ lines.
pub trait DeviceLine: Sync {
    fn service_irq(&self, line: u8);
}

/// The programmable interrupt controller.
pub trait InterruptController: Sync {
    /// Acknowledge `line` so it can fire again.
    fn end_of_interrupt(&self, line: u8);
}

/// The user-visible output channel.
pub trait Console: Sync {
    fn write_fmt(&self, args: fmt::Arguments<'_>);

    /// Advance the on-screen activity indicator. Called once per timer tick.
    fn heartbeat(&self) {}
}

/// The processor operations the dispatch core needs.
///
/// The hardware binding lives in `trapgate-lib::cpu`; tests supply recorders.
pub trait TrapCpu: Sync {
    fn enable_interrupts(&self);

    fn disable_interrupts(&self);

    /// Drop all non-global translations by reloading the page directory base.
    fn flush_translation_cache(&self);

    /// Load the interrupt descriptor table register.
    fn load_table(&self, pointer: &TablePointer);

    /// Restore the selected register snapshot. Does not return.
    fn context_switch(&self) -> !;

    /// Idle with interrupts enabled until the scheduler switches away. Does not return.
    fn park(&self) -> !;
}
