use trapgate_abi::{ContextSlot, Resume};
use trapgate_core::ActiveContext;
use trapgate_core::irq;

use crate::mock::{Device, Event, Machine, MockThread};

fn deliver(machine: &Machine, thread: &MockThread<'_>, line: u8) -> (Resume, ContextSlot) {
    let active = ActiveContext::new();
    let resume = machine.trap(thread, &active, |cx| irq::handle_irq(cx, line));
    (resume, active.current())
}

#[test]
fn timer_ticks_and_schedules_before_acknowledging() {
    let machine = Machine::new();
    let thread = MockThread::new(1);

    let (resume, _) = deliver(&machine, &thread, 0);

    assert_eq!(resume, Resume::ContextSwitch);
    assert_eq!(
        machine.events(),
        [
            Event::Heartbeat,
            Event::Tick,
            Event::Schedule,
            Event::EndOfInterrupt(0)
        ]
    );
}

#[test]
fn keyboard_is_serviced_before_acknowledgement() {
    let machine = Machine::new();
    let thread = MockThread::in_user_mode(1);

    let (resume, slot) = deliver(&machine, &thread, 1);

    assert_eq!(resume, Resume::ContextSwitch);
    assert_eq!(slot, ContextSlot::User);
    assert_eq!(
        machine.events(),
        [
            Event::Service {
                device: Device::Keyboard,
                line: 1
            },
            Event::EndOfInterrupt(1)
        ]
    );
}

#[test]
fn serial_lines_return_to_kernel_when_not_due_for_user() {
    for line in [3, 4] {
        let machine = Machine::new();
        let thread = MockThread::new(1);

        let (resume, slot) = deliver(&machine, &thread, line);

        assert_eq!(resume, Resume::Kernel);
        assert_eq!(slot, ContextSlot::Kernel);
        assert_eq!(
            machine.events(),
            [
                Event::Service {
                    device: Device::Serial,
                    line
                },
                Event::EndOfInterrupt(line)
            ]
        );
    }
}

#[test]
fn block_lines_share_one_manager() {
    for line in [9, 11, 14, 15] {
        let machine = Machine::new();
        let thread = MockThread::in_user_mode(1);

        let (resume, _) = deliver(&machine, &thread, line);

        assert_eq!(resume, Resume::ContextSwitch);
        assert_eq!(
            machine.events(),
            [
                Event::Service {
                    device: Device::Block,
                    line
                },
                Event::EndOfInterrupt(line)
            ]
        );
    }
}

#[test]
fn stub_lines_are_not_acknowledged() {
    for line in [2, 5, 6, 7, 8, 10, 12, 13, 16, 200] {
        let machine = Machine::new();
        let thread = MockThread::new(1);

        let (resume, _) = deliver(&machine, &thread, line);

        assert_eq!(resume, Resume::Kernel, "line {line}");
        assert!(machine.events().is_empty(), "line {line}");
    }

    let machine = Machine::new();
    let thread = MockThread::in_user_mode(1);
    let (resume, slot) = deliver(&machine, &thread, 7);
    assert_eq!(resume, Resume::ContextSwitch);
    assert_eq!(slot, ContextSlot::User);
}

#[test]
fn yield_reschedules() {
    let machine = Machine::new();
    let active = ActiveContext::new();
    let thread = MockThread::new(1);

    let resume = machine.trap(&thread, &active, irq::handle_yield);

    assert_eq!(resume, Resume::ContextSwitch);
    assert_eq!(machine.events(), [Event::Schedule]);
}
