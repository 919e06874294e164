//! Fallback installed in every slot without a dedicated handler.

use trapgate_abi::Resume;
use trapgate_lib::klog_warn;

use crate::context::TrapContext;
use crate::resume;

/// Log the event and leave the pending resume target exactly as it was.
pub fn handle(cx: &mut TrapContext<'_>) -> Resume {
    let saved = cx.thread.switch_to_userspace();
    resume::enter_kernel(cx);
    cx.env.cpu.enable_interrupts();

    klog_warn!("spurious interrupt in thread {}", cx.thread.id());

    cx.env.cpu.disable_interrupts();
    cx.thread.set_switch_to_userspace(saved);
    resume::decide(cx)
}
