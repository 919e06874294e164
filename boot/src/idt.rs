//! Interrupt descriptor table construction and activation.

use alloc::boxed::Box;
use alloc::vec::Vec;

use spin::Once;
use trapgate_abi::arch::SYSCALL_VECTOR;
use trapgate_abi::{
    GateDescriptor, GateType, PrivilegeLevel, SegmentSelector, TablePointer, TrapCpu, TrapError,
};
use trapgate_core::{TrapHost, register_trap_host};
use trapgate_lib::{klog_debug, klog_info, klog_warn};

use crate::vectors::{Trampoline, VectorRegistry, entry_address};

/// What to do when the syscall vector has no registered handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingSyscallGate {
    /// Leave the slot on the fallback at kernel privilege and log a warning.
    #[default]
    KernelOnly,
    /// Fail the build with [`TrapError::SyscallVectorUnregistered`].
    Reject,
}

impl MissingSyscallGate {
    /// The policy the kernel boots with.
    pub const KERNEL: Self = if cfg!(feature = "strict-syscall-gate") {
        Self::Reject
    } else {
        Self::KernelOnly
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableConfig {
    /// Code segment every gate jumps through.
    pub kernel_code: SegmentSelector,
    /// The only vector user mode may raise.
    pub syscall_vector: u32,
    pub missing_syscall_gate: MissingSyscallGate,
}

impl TableConfig {
    /// Defaults with the policy selected by the crate features.
    pub const fn kernel() -> Self {
        Self {
            kernel_code: SegmentSelector::KERNEL_CODE,
            syscall_vector: SYSCALL_VECTOR,
            missing_syscall_gate: MissingSyscallGate::KERNEL,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            kernel_code: SegmentSelector::KERNEL_CODE,
            syscall_vector: SYSCALL_VECTOR,
            missing_syscall_gate: MissingSyscallGate::KernelOnly,
        }
    }
}

/// A built table. The storage is leaked and lives for the kernel lifetime.
pub struct DescriptorTable {
    gates: &'static [GateDescriptor],
}

impl DescriptorTable {
    /// Fill one gate per vector from 0 to the highest registered one.
    ///
    /// Unregistered slots point at `fallback`. Every gate is a present 32-bit
    /// interrupt gate through the kernel code segment; only a registered
    /// syscall vector is reachable from user mode.
    pub fn build(
        registry: &VectorRegistry<'_>,
        fallback: Trampoline,
        config: &TableConfig,
    ) -> Result<Self, TrapError> {
        registry.validate()?;

        let syscall_registered = registry.lookup(config.syscall_vector).is_some();
        if !syscall_registered {
            match config.missing_syscall_gate {
                MissingSyscallGate::KernelOnly => klog_warn!(
                    "IDT: no handler for syscall vector {:#x}, user mode cannot enter the kernel",
                    config.syscall_vector
                ),
                MissingSyscallGate::Reject => return Err(TrapError::SyscallVectorUnregistered),
            }
        }

        let count = registry.highest_vector().map_or(1, |v| v as usize + 1);
        let fallback_address = entry_address(fallback);
        let mut gates = Vec::with_capacity(count);
        let mut cursor = registry.entries().iter().peekable();

        for vector in 0..count as u32 {
            let handler = cursor
                .next_if(|entry| entry.vector == vector)
                .and_then(|entry| entry.entry)
                .map_or(fallback_address, entry_address);
            let dpl = if vector == config.syscall_vector && syscall_registered {
                PrivilegeLevel::Ring3
            } else {
                PrivilegeLevel::Ring0
            };
            gates.push(GateDescriptor::new(
                handler,
                config.kernel_code,
                GateType::Interrupt,
                dpl,
            ));
        }

        klog_debug!(
            "IDT: built {} gates from {} registered vectors",
            count,
            registry.entry_count()
        );
        Ok(Self {
            gates: Box::leak(gates.into_boxed_slice()),
        })
    }

    #[inline]
    pub fn gates(&self) -> &'static [GateDescriptor] {
        self.gates
    }

    #[inline]
    pub fn gate(&self, vector: u32) -> Option<&'static GateDescriptor> {
        self.gates.get(vector as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// The image loaded into the table register.
    pub fn pointer(&self) -> TablePointer {
        TablePointer::new(self.gates.as_ptr() as usize as u32, self.gates.len())
    }
}

/// Holds the one table the CPU is using.
pub struct TableSlot {
    table: Once<DescriptorTable>,
}

impl TableSlot {
    pub const fn new() -> Self {
        Self { table: Once::new() }
    }

    /// Install `table` and load it into `cpu`.
    ///
    /// Fails with [`TrapError::AlreadyActive`] on every call after the
    /// first; the loaded table is left untouched.
    pub fn activate(
        &'static self,
        table: DescriptorTable,
        cpu: &dyn TrapCpu,
    ) -> Result<&'static DescriptorTable, TrapError> {
        let mut installed = false;
        let active = self.table.call_once(|| {
            installed = true;
            table
        });
        if !installed {
            return Err(TrapError::AlreadyActive);
        }

        let pointer = active.pointer();
        cpu.load_table(&pointer);
        klog_info!("IDT: loaded {:?}", pointer);
        Ok(active)
    }

    pub fn get(&'static self) -> Option<&'static DescriptorTable> {
        self.table.get()
    }
}

impl Default for TableSlot {
    fn default() -> Self {
        Self::new()
    }
}

pub static INTERRUPT_TABLE: TableSlot = TableSlot::new();

/// Register the trap host, then build and activate the kernel table.
pub fn init(
    host: &'static TrapHost,
    registry: &VectorRegistry<'_>,
    fallback: Trampoline,
    config: &TableConfig,
    cpu: &dyn TrapCpu,
) -> Result<&'static DescriptorTable, TrapError> {
    register_trap_host(host)?;
    let table = DescriptorTable::build(registry, fallback, config)?;
    INTERRUPT_TABLE.activate(table, cpu)
}
