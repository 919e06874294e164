//! Page-fault entry.

use trapgate_abi::{PageFault, Resume};
use trapgate_lib::klog_debug;

use crate::context::TrapContext;
use crate::resume;

/// Decode the fault, hand it to the resolver, and pick the resume target.
///
/// A thread left due for user mode is switched back in. Anything else
/// returns straight into the interrupted kernel context after a translation
/// cache flush; no user snapshot may exist there, so no switch is attempted.
pub fn handle(cx: &mut TrapContext<'_>, address: u32, error_code: u32) -> Resume {
    let fault = PageFault::new(address, error_code);
    klog_debug!("Page fault in thread {}: {}", cx.thread.id(), fault);

    cx.env.page_faults.enter(cx.thread, &fault);

    match resume::decide(cx) {
        Resume::Kernel => Resume::KernelAfterFlush,
        other => other,
    }
}
