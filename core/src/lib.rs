#![no_std]

pub mod context;
pub mod entry;
pub mod exceptions;
pub mod irq;
pub mod page_fault;
pub mod resume;
pub mod spurious;
pub mod syscall;

pub use context::{ActiveContext, TrapContext, TrapEnv};
pub use entry::{
    ACTIVE_CONTEXT, BootstrapThread, ThreadLifecycle, TrapHost, perform, register_trap_host,
    save_frame, trap_host,
};
pub use trapgate_abi::Resume;
