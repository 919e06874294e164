//! Fatal CPU faults.
//!
//! Every synchronous fault other than the page fault is either a kernel bug
//! or a user program doing something it cannot recover from. All of them get
//! the same treatment: report, then kill the faulting thread.

use trapgate_abi::Resume;
use trapgate_abi::arch::x86::idt::*;
use trapgate_lib::klog_error;

use crate::context::TrapContext;
use crate::resume;

/// Where to read up on a fault.
pub const HARDWARE_REFERENCE: &str = "See the Intel 64 and IA-32 Architectures Software \
Developer's Manual, Volume 3A, Chapter 6 \"Interrupt and Exception Handling\", \
section \"Exception and Interrupt Reference\", for the meaning of this fault.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaultInfo {
    pub vector: u32,
    pub mnemonic: &'static str,
    pub name: &'static str,
}

const fn fault(vector: u32, mnemonic: &'static str, name: &'static str) -> FaultInfo {
    FaultInfo {
        vector,
        mnemonic,
        name,
    }
}

/// Vectors handled by [`handle_fatal_fault`], in vector order.
pub const FATAL_FAULTS: [FaultInfo; 19] = [
    fault(EXCEPTION_DIVIDE_ERROR, "#DE", "Divide Error"),
    fault(EXCEPTION_DEBUG, "#DB", "Debug"),
    fault(EXCEPTION_NMI, "NMI", "Non-Maskable Interrupt"),
    fault(EXCEPTION_BREAKPOINT, "#BP", "Breakpoint"),
    fault(EXCEPTION_OVERFLOW, "#OF", "Overflow"),
    fault(EXCEPTION_BOUND_RANGE, "#BR", "Bound Range Exceeded"),
    fault(EXCEPTION_INVALID_OPCODE, "#UD", "Invalid Opcode"),
    fault(EXCEPTION_DEVICE_NOT_AVAIL, "#NM", "Device Not Available"),
    fault(EXCEPTION_DOUBLE_FAULT, "#DF", "Double Fault"),
    fault(EXCEPTION_COPROCESSOR_OVERRUN, "-", "Coprocessor Segment Overrun"),
    fault(EXCEPTION_INVALID_TSS, "#TS", "Invalid TSS"),
    fault(EXCEPTION_SEGMENT_NOT_PRES, "#NP", "Segment Not Present"),
    fault(EXCEPTION_STACK_FAULT, "#SS", "Stack Segment Fault"),
    fault(EXCEPTION_GENERAL_PROTECTION, "#GP", "General Protection Fault"),
    fault(EXCEPTION_RESERVED_15, "-", "Reserved"),
    fault(EXCEPTION_FPU_ERROR, "#MF", "x87 FPU Floating-Point Error"),
    fault(EXCEPTION_ALIGNMENT_CHECK, "#AC", "Alignment Check"),
    fault(EXCEPTION_MACHINE_CHECK, "#MC", "Machine Check"),
    fault(EXCEPTION_SIMD_FP_EXCEPTION, "#XM", "SIMD Floating-Point Exception"),
];

pub const UNKNOWN_FAULT: FaultInfo = fault(u32::MAX, "?", "Unknown Fault");

pub fn fault_info(vector: u32) -> FaultInfo {
    FATAL_FAULTS
        .iter()
        .copied()
        .find(|info| info.vector == vector)
        .unwrap_or(FaultInfo {
            vector,
            ..UNKNOWN_FAULT
        })
}

/// Report a fatal fault on both output channels and terminate the thread.
///
/// Never requests a context switch: the thread is gone and the scheduler
/// picks what runs next.
pub fn handle_fatal_fault(cx: &mut TrapContext<'_>, vector: u32) -> Resume {
    resume::enter_kernel(cx);
    cx.env.cpu.enable_interrupts();

    let info = fault_info(vector);
    let thread = cx.thread.id();
    klog_error!(
        "CPU Fault {} ({}, vector {}) in thread {}\n\n{}",
        info.name,
        info.mnemonic,
        info.vector,
        thread,
        HARDWARE_REFERENCE
    );
    write!(
        cx.env.console,
        "\nCPU Fault {} ({})\n\n{}\n",
        info.name, info.mnemonic, HARDWARE_REFERENCE
    );

    cx.thread.kill();
    Resume::Terminated
}
