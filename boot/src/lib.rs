#![no_std]

extern crate alloc;

pub mod idt;
#[cfg(all(target_arch = "x86", target_os = "none"))]
pub mod trampolines;
pub mod vectors;

pub use idt::{
    DescriptorTable, INTERRUPT_TABLE, MissingSyscallGate, TableConfig, TableSlot, init,
};
pub use vectors::{Trampoline, VectorEntry, VectorRegistry};
