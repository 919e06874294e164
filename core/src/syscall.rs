//! System-call entry, the one vector user mode may raise.

use trapgate_abi::{ContextSlot, Resume, SyscallArgs};
use trapgate_lib::klog_trace;

use crate::context::TrapContext;
use crate::resume;

/// Run the call described by the user snapshot and return to the caller.
///
/// Interrupts stay enabled while the dispatcher runs so a system call can be
/// preempted; they are disabled again before the user snapshot is written.
pub fn handle(cx: &mut TrapContext<'_>) -> Resume {
    resume::enter_kernel(cx);
    cx.env.cpu.enable_interrupts();

    let args = SyscallArgs::from_registers(&cx.thread.registers(ContextSlot::User));
    klog_trace!("syscall {} from thread {}", args.number(), cx.thread.id());
    let result = cx.env.syscalls.dispatch(args);

    cx.env.cpu.disable_interrupts();
    cx.thread.set_syscall_result(result);
    cx.thread.set_switch_to_userspace(true);
    resume::decide(cx)
}
