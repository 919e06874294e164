//! Register snapshots and the kernel/user resume selector.

use core::fmt;
use core::mem::size_of;

use x86_64::PrivilegeLevel;

use crate::arch::x86::SegmentSelector;

/// Identifier of a kernel thread, as assigned by the thread lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ThreadId(pub u32);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Saved 32-bit register state of one execution context.
///
/// Every thread owns two of these: one for the kernel side of a trap and
/// one for the user program it runs.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterContext {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
    pub esi: u32,
    pub edi: u32,
    pub ebp: u32,
    pub esp: u32,
    pub eip: u32,
    pub eflags: u32,
    pub cs: u32,
    pub ds: u32,
    pub es: u32,
    pub fs: u32,
    pub gs: u32,
    pub ss: u32,
    pub cr3: u32,
}

impl RegisterContext {
    pub const ZERO: Self = Self {
        eax: 0,
        ebx: 0,
        ecx: 0,
        edx: 0,
        esi: 0,
        edi: 0,
        ebp: 0,
        esp: 0,
        eip: 0,
        eflags: 0,
        cs: 0,
        ds: 0,
        es: 0,
        fs: 0,
        gs: 0,
        ss: 0,
        cr3: 0,
    };
}

/// Interrupted state as an entry stub leaves it on the stack.
///
/// Lowest address first: the `pushad` block, the error code (a pushed zero
/// for vectors where the CPU supplies none), then the return frame.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrapFrame {
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    /// Stack pointer at the `pushad` itself, not the interrupted one.
    pub pushad_esp: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,
    pub error_code: u32,
    pub eip: u32,
    pub cs: u32,
    pub eflags: u32,
}

/// The stack the interrupted code was running on.
///
/// On a trap from user mode the CPU pushes this right above the
/// [`TrapFrame`]. A kernel trap keeps the stack, so it begins just past it.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterruptedStack {
    pub esp: u32,
    pub ss: u32,
}

const _: () = assert!(size_of::<TrapFrame>() == 48);
const _: () = assert!(size_of::<InterruptedStack>() == 8);

impl TrapFrame {
    /// Which snapshot the interrupted code belongs to, by the RPL of its code segment.
    pub fn interrupted_slot(&self) -> ContextSlot {
        match SegmentSelector(self.cs as u16).rpl() {
            PrivilegeLevel::Ring3 => ContextSlot::User,
            _ => ContextSlot::Kernel,
        }
    }

    /// Overwrite `snapshot` with the interrupted state. `cr3` belongs to the
    /// address space and is kept.
    pub fn store_into(&self, snapshot: &mut RegisterContext, stack: InterruptedStack) {
        let data = match self.interrupted_slot() {
            ContextSlot::User => SegmentSelector::USER_DATA,
            ContextSlot::Kernel => SegmentSelector::KERNEL_DATA,
        }
        .bits() as u32;

        *snapshot = RegisterContext {
            eax: self.eax,
            ebx: self.ebx,
            ecx: self.ecx,
            edx: self.edx,
            esi: self.esi,
            edi: self.edi,
            ebp: self.ebp,
            esp: stack.esp,
            eip: self.eip,
            eflags: self.eflags,
            cs: self.cs,
            ds: data,
            es: data,
            fs: data,
            gs: data,
            ss: stack.ss,
            cr3: snapshot.cr3,
        };
    }
}

/// Which of a thread's two snapshots the next context switch restores.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextSlot {
    Kernel = 0,
    User = 1,
}

impl ContextSlot {
    #[inline]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::User,
            _ => Self::Kernel,
        }
    }
}

/// The six argument registers of the `int 0x80` calling convention.
///
/// Index 0 is the call number (`eax`), followed by `ebx, ecx, edx, esi, edi`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyscallArgs(pub [u32; 6]);

impl SyscallArgs {
    pub const fn from_registers(regs: &RegisterContext) -> Self {
        Self([regs.eax, regs.ebx, regs.ecx, regs.edx, regs.esi, regs.edi])
    }

    #[inline]
    pub const fn number(&self) -> u32 {
        self.0[0]
    }
}

/// Where execution continues once a handler is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resume {
    /// Return into the interrupted kernel context.
    Kernel,
    /// Flush the translation cache, then return into the interrupted kernel context.
    KernelAfterFlush,
    /// Restore the selected register snapshot through the context-switch primitive.
    ContextSwitch,
    /// The current thread is gone; wait for the scheduler to switch away.
    Terminated,
}

impl Resume {
    #[inline]
    pub const fn switches_context(self) -> bool {
        matches!(self, Self::ContextSwitch)
    }
}
