//! Segment selectors of the flat 32-bit GDT.
//!
//! Every gate names the code segment its handler runs in, so the selector
//! layout is part of the trap table contract.

use x86_64::PrivilegeLevel;

/// A 16-bit selector: descriptor index in bits 3-15, table indicator in
/// bit 2 (set for the LDT), requested privilege level in bits 0-1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct SegmentSelector(pub u16);

impl SegmentSelector {
    pub const NULL: Self = Self(0);
    /// 0x08
    pub const KERNEL_CODE: Self = Self::gdt(1, PrivilegeLevel::Ring0);
    /// 0x10
    pub const KERNEL_DATA: Self = Self::gdt(2, PrivilegeLevel::Ring0);
    /// 0x1B
    pub const USER_CODE: Self = Self::gdt(3, PrivilegeLevel::Ring3);
    /// 0x23
    pub const USER_DATA: Self = Self::gdt(4, PrivilegeLevel::Ring3);

    const LDT_BIT: u16 = 1 << 2;

    /// A GDT selector for descriptor `index`.
    #[inline]
    pub const fn gdt(index: u16, rpl: PrivilegeLevel) -> Self {
        Self((index << 3) | rpl as u16)
    }

    #[inline]
    pub const fn index(self) -> u16 {
        self.0 >> 3
    }

    #[inline]
    pub const fn is_ldt(self) -> bool {
        self.0 & Self::LDT_BIT != 0
    }

    #[inline]
    pub fn rpl(self) -> PrivilegeLevel {
        PrivilegeLevel::from_u16(self.0 & 0x3)
    }

    /// Value as stored in a gate descriptor.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }
}
