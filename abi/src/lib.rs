//! trapgate shared types
//!
//! This crate provides the canonical definitions shared by the trap table
//! builder, the handler layer and the kernel subsystems that plug into it:
//! - Hardware record formats (gate descriptors, the table pointer image)
//! - Vector numbers and segment selectors
//! - Register snapshots and the page-fault cause bits
//! - Collaborator traits that decouple dispatch from the subsystems it serves
//!
//! Hardware records are `#[repr(C, packed)]` with compile-time size checks.

#![no_std]
#![forbid(unsafe_code)]

pub mod arch;
pub mod context;
pub mod error;
pub mod fault;
pub mod traits;

pub use arch::x86::{GateDescriptor, GateType, SegmentSelector, TablePointer};
pub use context::*;
pub use error::*;
pub use fault::*;
pub use traits::*;
pub use x86_64::PrivilegeLevel;
