//! Host-side suites for the trap layer.
//!
//! The handlers run against recording collaborators from [`mock`]; each suite
//! asserts on the resume target, the thread state and the order of
//! collaborator calls.

#![no_std]

extern crate alloc;

#[cfg(test)]
mod log_capture;

#[cfg(test)]
mod entry_tests;
#[cfg(test)]
mod irq_tests;
#[cfg(test)]
mod spurious_tests;
#[cfg(test)]
mod syscall_tests;
