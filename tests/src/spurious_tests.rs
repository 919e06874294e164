use trapgate_abi::{ContextSlot, Resume};
use trapgate_core::ActiveContext;
use trapgate_core::spurious;

use crate::log_capture;
use crate::mock::{Event, Machine, MockThread};

#[test]
fn pending_user_resume_survives() {
    log_capture::install();
    let machine = Machine::new();
    let active = ActiveContext::new();
    let thread = MockThread::in_user_mode(5);

    let resume = machine.trap(&thread, &active, spurious::handle);

    assert_eq!(resume, Resume::ContextSwitch);
    assert!(thread.resumes_user());
    assert_eq!(active.current(), ContextSlot::User);
    assert_eq!(
        machine.events(),
        [Event::EnableInterrupts, Event::DisableInterrupts]
    );
    assert!(log_capture::captured().contains("[WARN] spurious interrupt in thread 5"));
}

#[test]
fn kernel_resume_survives() {
    let machine = Machine::new();
    let active = ActiveContext::new();
    let thread = MockThread::new(5);

    let resume = machine.trap(&thread, &active, spurious::handle);

    assert_eq!(resume, Resume::Kernel);
    assert!(!thread.resumes_user());
    assert_eq!(active.current(), ContextSlot::Kernel);
    assert!(!machine.log.contains(Event::ContextSwitch));
}
