extern crate std;

use core::mem::size_of;
use core::sync::atomic::{AtomicBool, Ordering};
use std::panic::{AssertUnwindSafe, catch_unwind};

use trapgate_abi::{
    ContextSlot, InterruptedStack, RegisterContext, Resume, SegmentSelector, TrapError, TrapFrame,
    TrapThread,
};
use trapgate_boot::{INTERRUPT_TABLE, TableConfig, VectorEntry, VectorRegistry};
use trapgate_core::entry::{
    active_context_slot, dummy_handler, irq_handler, page_fault_handler, save_interrupted_state,
    syscall_handler, trap_host,
};
use trapgate_core::{ThreadLifecycle, TrapEnv, TrapHost, perform};

use crate::mock::{Device, MockDevice, Event, Machine, MockThread};

/// Hands out [`WORKER`] once it has started, nothing before.
struct Threads {
    started: AtomicBool,
}

impl ThreadLifecycle for Threads {
    fn current(&self) -> Option<&'static dyn TrapThread> {
        if self.started.load(Ordering::Relaxed) {
            Some(&WORKER)
        } else {
            None
        }
    }
}

static MACHINE: Machine = Machine::new();
static KEYBOARD: MockDevice<'static> = MockDevice::new(Device::Keyboard, &MACHINE.log);
static SERIAL: MockDevice<'static> = MockDevice::new(Device::Serial, &MACHINE.log);
static BLOCK: MockDevice<'static> = MockDevice::new(Device::Block, &MACHINE.log);
static WORKER: MockThread<'static> = MockThread::recording(9, &MACHINE.log);
static THREADS: Threads = Threads {
    started: AtomicBool::new(false),
};

static HOST: TrapHost = TrapHost {
    env: TrapEnv {
        cpu: &MACHINE,
        scheduler: &MACHINE,
        page_faults: &MACHINE,
        syscalls: &MACHINE,
        keyboard: &KEYBOARD,
        serial: &SERIAL,
        block: &BLOCK,
        pic: &MACHINE,
        console: &MACHINE,
    },
    threads: &THREADS,
};

unsafe extern "C" fn fallback() {}
unsafe extern "C" fn syscall() {}

const REGISTRY: &[VectorEntry] = &[VectorEntry::new(0x80, syscall), VectorEntry::SENTINEL];

// The host and the table are process-wide, so bring-up and every trap that
// depends on it live in this one test.
#[test]
fn bring_up_then_trap_entry() {
    let config = TableConfig::default();
    let table = trapgate_boot::init(
        &HOST,
        &VectorRegistry::new(REGISTRY),
        fallback,
        &config,
        &MACHINE,
    )
    .expect("first bring-up succeeds");

    assert_eq!(table.len(), 0x81);
    assert!(trap_host().is_some());
    assert_eq!(
        INTERRUPT_TABLE.get().map(|t| t.pointer().limit()),
        Some(0x81 * 8 - 1)
    );
    assert_eq!(MACHINE.events(), [Event::LoadTable { limit: 0x81 * 8 - 1 }]);

    let again = trapgate_boot::init(
        &HOST,
        &VectorRegistry::new(REGISTRY),
        fallback,
        &config,
        &MACHINE,
    );
    assert_eq!(again.err(), Some(TrapError::HostAlreadyRegistered));

    dummy_handler();
    irq_handler(6);
    page_fault_handler(0x0010_0000, 0x02);
    MACHINE.set_syscall_result(1);
    syscall_handler();

    assert_eq!(
        MACHINE.events()[1..],
        [
            Event::EnableInterrupts,
            Event::DisableInterrupts,
            Event::PageFault {
                thread: trapgate_core::BootstrapThread::ID,
                address: 0x0010_0000,
                cause: trapgate_abi::PageFaultCause::WRITE,
            },
            Event::FlushTranslationCache,
            Event::EnableInterrupts,
            Event::Syscall(trapgate_abi::SyscallArgs([0; 6])),
            Event::DisableInterrupts,
        ]
    );
    assert_eq!(active_context_slot(), ContextSlot::Kernel as u8);

    THREADS.started.store(true, Ordering::Relaxed);
    stub_frames_refresh_the_worker_snapshots();
}

/// What a stub leaves on the stack for a trap out of ring 3.
#[repr(C)]
struct UserEntry {
    frame: TrapFrame,
    stack: InterruptedStack,
}

fn stub_frames_refresh_the_worker_snapshots() {
    let user = UserEntry {
        frame: TrapFrame {
            eax: 4,
            ebx: 10,
            ecx: 20,
            eip: 0x0804_8000,
            cs: SegmentSelector::USER_CODE.bits() as u32,
            eflags: 0x202,
            ..TrapFrame::default()
        },
        stack: InterruptedStack {
            esp: 0xBFFF_F000,
            ss: SegmentSelector::USER_DATA.bits() as u32,
        },
    };
    // SAFETY: the frame is followed by the user stack, as for a ring 3 trap.
    unsafe { save_interrupted_state((&raw const user).cast::<TrapFrame>()) };

    let snapshot = WORKER.user();
    assert_eq!((snapshot.eax, snapshot.ebx, snapshot.ecx), (4, 10, 20));
    assert_eq!(snapshot.eip, 0x0804_8000);
    assert_eq!((snapshot.esp, snapshot.ss), (0xBFFF_F000, 0x23));
    assert_eq!(WORKER.kernel(), RegisterContext::ZERO);

    let kernel = TrapFrame {
        eip: 0xC010_0000,
        cs: SegmentSelector::KERNEL_CODE.bits() as u32,
        ..TrapFrame::default()
    };
    // SAFETY: a kernel frame needs nothing past its own end.
    unsafe { save_interrupted_state(&kernel) };

    let snapshot = WORKER.kernel();
    let past_frame = (&kernel as *const TrapFrame as usize + size_of::<TrapFrame>()) as u32;
    assert_eq!(snapshot.eip, 0xC010_0000);
    assert_eq!(snapshot.esp, past_frame);
    assert_eq!(snapshot.ss, 0x10);
    assert_eq!(WORKER.user().eip, 0x0804_8000);
}
