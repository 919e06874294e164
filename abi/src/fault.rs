//! Page-fault error code decoding.

use core::fmt;

use bitflags::bitflags;

bitflags! {
    /// Cause bits pushed by the CPU with every page fault.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PageFaultCause: u32 {
        /// Set: protection violation on a present page. Clear: page not present.
        const PROTECTION_VIOLATION = 1 << 0;
        /// Set: write access. Clear: read access.
        const WRITE = 1 << 1;
        /// Set: fault raised at CPL 3.
        const USER = 1 << 2;
        /// A reserved bit was set in a paging structure.
        const RESERVED_BIT = 1 << 3;
        /// Instruction fetch (only reported with PAE/NX).
        const INSTRUCTION_FETCH = 1 << 4;
    }
}

impl PageFaultCause {
    /// Decode the raw error code; bits above the five cause flags are ignored.
    #[inline]
    pub const fn from_error_code(code: u32) -> Self {
        Self::from_bits_truncate(code)
    }
}

/// A decoded page fault, handed to the page-fault resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageFault {
    pub address: u32,
    pub cause: PageFaultCause,
}

impl PageFault {
    pub const fn new(address: u32, error_code: u32) -> Self {
        Self {
            address,
            cause: PageFaultCause::from_error_code(error_code),
        }
    }

    #[inline]
    pub const fn is_present(&self) -> bool {
        self.cause.contains(PageFaultCause::PROTECTION_VIOLATION)
    }

    #[inline]
    pub const fn is_write(&self) -> bool {
        self.cause.contains(PageFaultCause::WRITE)
    }

    #[inline]
    pub const fn is_user(&self) -> bool {
        self.cause.contains(PageFaultCause::USER)
    }

    #[inline]
    pub const fn is_reserved(&self) -> bool {
        self.cause.contains(PageFaultCause::RESERVED_BIT)
    }

    #[inline]
    pub const fn is_instruction_fetch(&self) -> bool {
        self.cause.contains(PageFaultCause::INSTRUCTION_FETCH)
    }
}

impl fmt::Display for PageFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "address {:#010x} ({}) ({}) ({})",
            self.address,
            if self.is_present() { "page present" } else { "page not present" },
            if self.is_write() { "write" } else { "read" },
            if self.is_user() { "user" } else { "supervisor" },
        )?;
        if self.is_reserved() {
            f.write_str(" (reserved bit)")?;
        }
        if self.is_instruction_fetch() {
            f.write_str(" (instruction fetch)")?;
        }
        Ok(())
    }
}
