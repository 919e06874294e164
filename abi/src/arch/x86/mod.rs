//! 32-bit x86 definitions.
//!
//! Raw integer fields are wrapped in types so that a selector cannot be passed
//! where a handler address is expected:
//! - `SegmentSelector(u16)` for GDT selectors
//! - `GateDescriptor` for one interrupt descriptor table slot
//! - `TablePointer` for the image loaded by `lidt`

pub mod gdt;
pub mod idt;

pub use gdt::SegmentSelector;
pub use idt::{GateDescriptor, GateType, TablePointer};
