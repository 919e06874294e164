//! C-ABI entry points called by the assembly trampolines.
//!
//! Each trampoline first hands its stack frame to [`save_interrupted_state`],
//! then calls one of the `#[unsafe(no_mangle)]` handler entries below. They
//! look up the registered [`TrapHost`], run the handler, and carry out the
//! returned [`Resume`].

use core::mem::size_of;

use spin::Mutex;
use trapgate_abi::{
    ContextSlot, InterruptedStack, RegisterContext, Resume, SegmentSelector, ThreadId, TrapError,
    TrapFrame, TrapThread,
};
use trapgate_lib::{ServiceCell, klog_debug};

use crate::context::{ActiveContext, TrapContext, TrapEnv};
use crate::{exceptions, irq, page_fault, spurious, syscall};

/// Hands the trap layer the thread that was interrupted.
pub trait ThreadLifecycle: Sync {
    /// The thread running when the trap fired, or `None` during early
    /// bring-up before the first thread exists.
    ///
    /// A nested trap gets the same shared handle as the trap it interrupted.
    fn current(&self) -> Option<&'static dyn TrapThread>;
}

/// Everything the entry points need, registered once at bring-up.
pub struct TrapHost {
    pub env: TrapEnv<'static>,
    pub threads: &'static dyn ThreadLifecycle,
}

/// The snapshot selector read by the context-switch primitive.
pub static ACTIVE_CONTEXT: ActiveContext = ActiveContext::new();

static TRAP_HOST: ServiceCell<TrapHost> = ServiceCell::new("trap host");

pub fn register_trap_host(host: &'static TrapHost) -> Result<(), TrapError> {
    if TRAP_HOST.register(host) {
        klog_debug!("{} registered", TRAP_HOST.name());
        Ok(())
    } else {
        Err(TrapError::HostAlreadyRegistered)
    }
}

#[inline]
pub fn trap_host() -> Option<&'static TrapHost> {
    TRAP_HOST.get()
}

/// Stand-in for the interrupted thread before the lifecycle has one.
///
/// It never resumes in user mode, and killing it means the kernel itself
/// faulted during bring-up.
#[derive(Default)]
pub struct BootstrapThread {
    snapshots: Mutex<[RegisterContext; 2]>,
}

impl BootstrapThread {
    pub const ID: ThreadId = ThreadId(0);

    pub fn new() -> Self {
        Self::default()
    }
}

impl TrapThread for BootstrapThread {
    fn id(&self) -> ThreadId {
        Self::ID
    }

    fn switch_to_userspace(&self) -> bool {
        false
    }

    fn set_switch_to_userspace(&self, _value: bool) {}

    fn registers(&self, slot: ContextSlot) -> RegisterContext {
        self.snapshots.lock()[slot as usize]
    }

    fn save_registers(&self, slot: ContextSlot, registers: &RegisterContext) {
        self.snapshots.lock()[slot as usize] = *registers;
    }

    fn set_syscall_result(&self, value: u32) {
        self.snapshots.lock()[ContextSlot::User as usize].eax = value;
    }

    fn kill(&self) {
        panic!("fatal fault during bring-up, no thread to terminate");
    }
}

/// Carry out a handler's decision.
///
/// Returns only for the two kernel resume targets; the trampoline then
/// restores the interrupted kernel state itself.
pub fn perform(resume: Resume, env: &TrapEnv<'_>) {
    match resume {
        Resume::Kernel => {}
        Resume::KernelAfterFlush => env.cpu.flush_translation_cache(),
        Resume::ContextSwitch => env.cpu.context_switch(),
        Resume::Terminated => env.cpu.park(),
    }
}

fn run_trap(handler: impl FnOnce(&mut TrapContext<'_>) -> Resume) {
    let Some(host) = TRAP_HOST.get() else {
        panic!("trap taken before the trap host was registered");
    };

    let bootstrap = BootstrapThread::new();
    let thread: &dyn TrapThread = match host.threads.current() {
        Some(thread) => thread,
        None => &bootstrap,
    };

    let resume = {
        let mut cx = TrapContext::new(thread, &ACTIVE_CONTEXT, &host.env);
        handler(&mut cx)
    };
    perform(resume, &host.env);
}

/// Copy an interrupted state into the matching snapshot of the current thread.
///
/// A trap from user mode refreshes the user snapshot, one from kernel mode
/// the kernel snapshot.
pub fn save_frame(threads: &dyn ThreadLifecycle, frame: &TrapFrame, stack: InterruptedStack) {
    let Some(thread) = threads.current() else {
        return;
    };
    let slot = frame.interrupted_slot();
    let mut snapshot = thread.registers(slot);
    frame.store_into(&mut snapshot, stack);
    thread.save_registers(slot, &snapshot);
}

/// Called by every entry stub, before the handler, with the frame it built.
///
/// # Safety
/// `frame` points at a complete [`TrapFrame`] on the current stack. When the
/// frame's code segment has RPL 3, the CPU-pushed user `esp` and `ss` follow
/// it directly.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn save_interrupted_state(frame: *const TrapFrame) {
    // SAFETY: the caller passes the frame it just pushed.
    let Some(saved) = (unsafe { frame.as_ref() }) else {
        return;
    };
    let stack = match saved.interrupted_slot() {
        // SAFETY: a privilege change pushed the user stack above the frame.
        ContextSlot::User => unsafe { frame.add(1).cast::<InterruptedStack>().read() },
        ContextSlot::Kernel => InterruptedStack {
            esp: (frame as usize + size_of::<TrapFrame>()) as u32,
            ss: SegmentSelector::KERNEL_DATA.bits() as u32,
        },
    };
    if let Some(host) = TRAP_HOST.get() {
        save_frame(host.threads, saved, stack);
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn error_handler(vector: u32) {
    run_trap(|cx| exceptions::handle_fatal_fault(cx, vector));
}

#[unsafe(no_mangle)]
pub extern "C" fn irq_handler(line: u8) {
    run_trap(|cx| irq::handle_irq(cx, line));
}

#[unsafe(no_mangle)]
pub extern "C" fn page_fault_handler(address: u32, error: u32) {
    run_trap(|cx| page_fault::handle(cx, address, error));
}

#[unsafe(no_mangle)]
pub extern "C" fn syscall_handler() {
    run_trap(syscall::handle);
}

#[unsafe(no_mangle)]
pub extern "C" fn yield_handler() {
    run_trap(irq::handle_yield);
}

#[unsafe(no_mangle)]
pub extern "C" fn dummy_handler() {
    run_trap(spurious::handle);
}

#[unsafe(no_mangle)]
pub extern "C" fn active_context_slot() -> u8 {
    ACTIVE_CONTEXT.current() as u8
}
