//! Hardware entry stubs and the kernel vector registry.
//!
//! Every stub builds a `TrapFrame` (a zero stands in for the error code on
//! vectors where the CPU pushes none), hands it to `save_interrupted_state`,
//! and then calls the matching entry point in `trapgate_core::entry`. It
//! returns with `iretd` when the handler resumes the interrupted kernel
//! context. Resuming anywhere else goes through the context-switch primitive
//! and never comes back here.

use core::arch::global_asm;
use core::ffi::c_int;

use trapgate_abi::TrapError;
use trapgate_abi::arch::pushes_error_code;
use trapgate_lib::cpu::X86Cpu;

use crate::idt::{DescriptorTable, INTERRUPT_TABLE, TableConfig};
use crate::vectors::{VectorEntry, VectorRegistry};

global_asm!(
    r#"
.macro enter_frame
    pushad
    push esp
    call save_interrupted_state
    add esp, 4
.endm

.macro leave_frame
    popad
    add esp, 4
    iretd
.endm

.macro fault_body vector
    enter_frame
    push \vector
    call error_handler
    add esp, 4
    leave_frame
.endm

.macro fault_stub vector
.global trap_fault_\vector
trap_fault_\vector:
    push 0
    fault_body \vector
.endm

.macro fault_stub_code vector
.global trap_fault_\vector
trap_fault_\vector:
    fault_body \vector
.endm

.macro irq_stub line
.global trap_irq_\line
trap_irq_\line:
    push 0
    enter_frame
    push \line
    call irq_handler
    add esp, 4
    leave_frame
.endm

.macro plain_stub name, target
.global \name
\name:
    push 0
    enter_frame
    call \target
    leave_frame
.endm

fault_stub 0
fault_stub 1
fault_stub 2
fault_stub 3
fault_stub 4
fault_stub 5
fault_stub 6
fault_stub 7
fault_stub_code 8
fault_stub 9
fault_stub_code 10
fault_stub_code 11
fault_stub_code 12
fault_stub_code 13
fault_stub 15
fault_stub 16
fault_stub_code 17
fault_stub 18
fault_stub 19

irq_stub 0
irq_stub 1
irq_stub 2
irq_stub 3
irq_stub 4
irq_stub 5
irq_stub 6
irq_stub 7
irq_stub 8
irq_stub 9
irq_stub 10
irq_stub 11
irq_stub 12
irq_stub 13
irq_stub 14
irq_stub 15

.global trap_page_fault
trap_page_fault:
    enter_frame
    mov eax, [esp + 32]
    push eax
    mov eax, cr2
    push eax
    call page_fault_handler
    add esp, 8
    leave_frame

plain_stub trap_yield, yield_handler
plain_stub trap_syscall, syscall_handler
plain_stub trap_spurious, dummy_handler
"#
);

/// Vectors whose stub is `fault_stub_code` above, plus the page fault.
const CPU_ERROR_CODE_STUBS: [u32; 7] = [8, 10, 11, 12, 13, 14, 17];

const _: () = {
    let mut vector = 0;
    let mut listed = 0;
    while vector < 20 {
        if pushes_error_code(vector) {
            assert!(CPU_ERROR_CODE_STUBS[listed] == vector);
            listed += 1;
        }
        vector += 1;
    }
    assert!(listed == CPU_ERROR_CODE_STUBS.len());
};

unsafe extern "C" {
    fn trap_fault_0();
    fn trap_fault_1();
    fn trap_fault_2();
    fn trap_fault_3();
    fn trap_fault_4();
    fn trap_fault_5();
    fn trap_fault_6();
    fn trap_fault_7();
    fn trap_fault_8();
    fn trap_fault_9();
    fn trap_fault_10();
    fn trap_fault_11();
    fn trap_fault_12();
    fn trap_fault_13();
    fn trap_fault_15();
    fn trap_fault_16();
    fn trap_fault_17();
    fn trap_fault_18();
    fn trap_fault_19();

    fn trap_page_fault();

    fn trap_irq_0();
    fn trap_irq_1();
    fn trap_irq_2();
    fn trap_irq_3();
    fn trap_irq_4();
    fn trap_irq_5();
    fn trap_irq_6();
    fn trap_irq_7();
    fn trap_irq_8();
    fn trap_irq_9();
    fn trap_irq_10();
    fn trap_irq_11();
    fn trap_irq_12();
    fn trap_irq_13();
    fn trap_irq_14();
    fn trap_irq_15();

    fn trap_yield();
    fn trap_syscall();
    pub fn trap_spurious();
}

/// Every vector the kernel handles, in ascending order.
pub static KERNEL_VECTORS: [VectorEntry; 39] = [
    VectorEntry::new(0, trap_fault_0),
    VectorEntry::new(1, trap_fault_1),
    VectorEntry::new(2, trap_fault_2),
    VectorEntry::new(3, trap_fault_3),
    VectorEntry::new(4, trap_fault_4),
    VectorEntry::new(5, trap_fault_5),
    VectorEntry::new(6, trap_fault_6),
    VectorEntry::new(7, trap_fault_7),
    VectorEntry::new(8, trap_fault_8),
    VectorEntry::new(9, trap_fault_9),
    VectorEntry::new(10, trap_fault_10),
    VectorEntry::new(11, trap_fault_11),
    VectorEntry::new(12, trap_fault_12),
    VectorEntry::new(13, trap_fault_13),
    VectorEntry::new(14, trap_page_fault),
    VectorEntry::new(15, trap_fault_15),
    VectorEntry::new(16, trap_fault_16),
    VectorEntry::new(17, trap_fault_17),
    VectorEntry::new(18, trap_fault_18),
    VectorEntry::new(19, trap_fault_19),
    VectorEntry::new(32, trap_irq_0),
    VectorEntry::new(33, trap_irq_1),
    VectorEntry::new(34, trap_irq_2),
    VectorEntry::new(35, trap_irq_3),
    VectorEntry::new(36, trap_irq_4),
    VectorEntry::new(37, trap_irq_5),
    VectorEntry::new(38, trap_irq_6),
    VectorEntry::new(39, trap_irq_7),
    VectorEntry::new(40, trap_irq_8),
    VectorEntry::new(41, trap_irq_9),
    VectorEntry::new(42, trap_irq_10),
    VectorEntry::new(43, trap_irq_11),
    VectorEntry::new(44, trap_irq_12),
    VectorEntry::new(45, trap_irq_13),
    VectorEntry::new(46, trap_irq_14),
    VectorEntry::new(47, trap_irq_15),
    VectorEntry::new(65, trap_yield),
    VectorEntry::new(128, trap_syscall),
    VectorEntry::SENTINEL,
];

pub fn kernel_registry() -> VectorRegistry<'static> {
    VectorRegistry::new(&KERNEL_VECTORS)
}

/// Build the kernel table and load it. Zero on success, a negative
/// [`TrapError`] code otherwise.
#[unsafe(no_mangle)]
pub extern "C" fn trap_table_init() -> c_int {
    let result = DescriptorTable::build(&kernel_registry(), trap_spurious, &TableConfig::kernel())
        .and_then(|table| INTERRUPT_TABLE.activate(table, &X86Cpu));
    TrapError::result_to_c_int(result)
}
