//! Architecture-specific definitions.
//!
//! Only 32-bit x86 protected mode is supported; the gate and table pointer
//! layouts in [`x86`] are the ones the CPU consumes in that mode.

pub mod x86;

pub use x86::idt::{
    IRQ_BASE_VECTOR, IRQ_LINES, MAX_VECTORS, PAGE_FAULT_VECTOR, SYSCALL_VECTOR, YIELD_VECTOR,
    pushes_error_code,
};
