use core::sync::atomic::{AtomicBool, Ordering};

use trapgate_abi::{
    ContextSlot, RegisterContext, Resume, SyscallArgs, TablePointer, TrapCpu, TrapThread,
};
use trapgate_core::ActiveContext;
use trapgate_core::{spurious, syscall};

use crate::mock::{Event, Machine, MockThread};

fn registers() -> RegisterContext {
    RegisterContext {
        eax: 4,
        ebx: 10,
        ecx: 20,
        edx: 30,
        esi: 40,
        edi: 50,
        ebp: 0xDEAD,
        ..RegisterContext::default()
    }
}

fn caller(machine: &Machine) -> MockThread<'_> {
    MockThread::recording(3, &machine.log).with_user_registers(registers())
}

#[test]
fn dispatches_six_registers_and_returns_in_eax() {
    let machine = Machine::new();
    machine.set_syscall_result(42);
    let active = ActiveContext::new();
    let thread = caller(&machine);

    let resume = machine.trap(&thread, &active, syscall::handle);

    assert_eq!(resume, Resume::ContextSwitch);
    assert_eq!(active.current(), ContextSlot::User);
    assert!(thread.resumes_user());
    assert_eq!(thread.user().eax, 42);
    assert_eq!(thread.user().ebx, 10);
    assert_eq!(thread.user().ebp, 0xDEAD);
}

#[test]
fn result_is_written_after_interrupts_are_disabled() {
    let machine = Machine::new();
    machine.set_syscall_result(42);
    let active = ActiveContext::new();
    let thread = caller(&machine);

    machine.trap(&thread, &active, syscall::handle);

    assert_eq!(
        machine.events(),
        [
            Event::EnableInterrupts,
            Event::Syscall(SyscallArgs([4, 10, 20, 30, 40, 50])),
            Event::DisableInterrupts,
            Event::WriteResult(42),
        ]
    );
}

#[test]
fn unknown_call_number_still_returns_to_caller() {
    let machine = Machine::new();
    machine.set_syscall_result(u32::MAX);
    let active = ActiveContext::new();
    let thread = MockThread::new(3).with_user_registers(RegisterContext {
        eax: 9999,
        ..registers()
    });

    let resume = machine.trap(&thread, &active, syscall::handle);

    assert_eq!(resume, Resume::ContextSwitch);
    assert_eq!(thread.user().eax, u32::MAX);
    assert!(!thread.is_killed());
}

/// Delivers a spurious interrupt to the same thread the first time a handler
/// enables interrupts, the way real hardware may preempt a system call.
struct PreemptingCpu<'a> {
    machine: &'a Machine,
    thread: &'a MockThread<'a>,
    active: &'a ActiveContext,
    fired: AtomicBool,
}

impl TrapCpu for PreemptingCpu<'_> {
    fn enable_interrupts(&self) {
        self.machine.enable_interrupts();
        if !self.fired.swap(true, Ordering::Relaxed) {
            let nested = self
                .machine
                .trap(self.thread, self.active, spurious::handle);
            assert_eq!(nested, Resume::Kernel);
        }
    }

    fn disable_interrupts(&self) {
        self.machine.disable_interrupts();
    }

    fn flush_translation_cache(&self) {
        self.machine.flush_translation_cache();
    }

    fn load_table(&self, pointer: &TablePointer) {
        self.machine.load_table(pointer);
    }

    fn context_switch(&self) -> ! {
        self.machine.context_switch()
    }

    fn park(&self) -> ! {
        self.machine.park()
    }
}

#[test]
fn nested_trap_shares_the_caller_thread() {
    let machine = Machine::new();
    machine.set_syscall_result(42);
    let active = ActiveContext::new();
    let thread = caller(&machine);
    let cpu = PreemptingCpu {
        machine: &machine,
        thread: &thread,
        active: &active,
        fired: AtomicBool::new(false),
    };

    let resume = machine.trap_on(&cpu, &thread, &active, syscall::handle);

    assert!(cpu.fired.load(Ordering::Relaxed));
    assert_eq!(resume, Resume::ContextSwitch);
    assert_eq!(active.current(), ContextSlot::User);
    assert!(thread.resumes_user());
    assert_eq!(thread.registers(ContextSlot::User).eax, 42);
    assert_eq!(
        machine.events(),
        [
            Event::EnableInterrupts,
            Event::EnableInterrupts,
            Event::DisableInterrupts,
            Event::Syscall(SyscallArgs([4, 10, 20, 30, 40, 50])),
            Event::DisableInterrupts,
            Event::WriteResult(42),
        ]
    );
}
