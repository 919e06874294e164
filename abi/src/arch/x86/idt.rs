//! Interrupt descriptor table formats and vector numbers.

use core::fmt;
use core::mem::size_of;

use x86_64::PrivilegeLevel;

use super::gdt::SegmentSelector;

pub const EXCEPTION_DIVIDE_ERROR: u32 = 0;
pub const EXCEPTION_DEBUG: u32 = 1;
pub const EXCEPTION_NMI: u32 = 2;
pub const EXCEPTION_BREAKPOINT: u32 = 3;
pub const EXCEPTION_OVERFLOW: u32 = 4;
pub const EXCEPTION_BOUND_RANGE: u32 = 5;
pub const EXCEPTION_INVALID_OPCODE: u32 = 6;
pub const EXCEPTION_DEVICE_NOT_AVAIL: u32 = 7;
pub const EXCEPTION_DOUBLE_FAULT: u32 = 8;
pub const EXCEPTION_COPROCESSOR_OVERRUN: u32 = 9;
pub const EXCEPTION_INVALID_TSS: u32 = 10;
pub const EXCEPTION_SEGMENT_NOT_PRES: u32 = 11;
pub const EXCEPTION_STACK_FAULT: u32 = 12;
pub const EXCEPTION_GENERAL_PROTECTION: u32 = 13;
pub const EXCEPTION_RESERVED_15: u32 = 15;
pub const EXCEPTION_FPU_ERROR: u32 = 16;
pub const EXCEPTION_ALIGNMENT_CHECK: u32 = 17;
pub const EXCEPTION_MACHINE_CHECK: u32 = 18;
pub const EXCEPTION_SIMD_FP_EXCEPTION: u32 = 19;

pub const PAGE_FAULT_VECTOR: u32 = 14;

/// Whether the CPU pushes an error code below the return frame for `vector`.
///
/// Entry stubs for every other vector push a zero in its place so all
/// frames share one layout.
pub const fn pushes_error_code(vector: u32) -> bool {
    matches!(
        vector,
        EXCEPTION_DOUBLE_FAULT
            | EXCEPTION_INVALID_TSS
            | EXCEPTION_SEGMENT_NOT_PRES
            | EXCEPTION_STACK_FAULT
            | EXCEPTION_GENERAL_PROTECTION
            | PAGE_FAULT_VECTOR
            | EXCEPTION_ALIGNMENT_CHECK
    )
}

/// Vector of IRQ line 0 after the interrupt controller is remapped.
pub const IRQ_BASE_VECTOR: u32 = 32;
pub const IRQ_LINES: u32 = 16;

/// Software interrupt the kernel raises to give up the CPU.
pub const YIELD_VECTOR: u32 = 65;

/// The only vector user mode may raise (`int 0x80`).
pub const SYSCALL_VECTOR: u32 = 0x80;

/// Hardware limit on the number of table slots.
pub const MAX_VECTORS: usize = 256;

const ATTR_TYPE_MASK: u8 = 0b0000_0111;
const ATTR_SIZE_32_BIT: u8 = 1 << 3;
const ATTR_UNUSED: u8 = 1 << 4;
const ATTR_DPL_SHIFT: u8 = 5;
const ATTR_DPL_MASK: u8 = 0b0110_0000;
const ATTR_PRESENT: u8 = 1 << 7;

/// Gate kind stored in the low three attribute bits.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateType {
    /// IF is cleared on entry.
    Interrupt = 6,
    /// IF is left untouched on entry.
    Trap = 7,
}

impl GateType {
    const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            6 => Some(Self::Interrupt),
            7 => Some(Self::Trap),
            _ => None,
        }
    }
}

/// One slot of the interrupt descriptor table, in the layout the CPU reads.
///
/// Layout (8 bytes):
/// - `offset_low`: bits 0-15 of the handler entry address
/// - `selector`: code segment the handler executes in
/// - `reserved`: bits 0-4 reserved, bits 5-7 zero
/// - `attributes`: bits 0-2 gate type, bit 3 gate size (1 = 32-bit),
///   bit 4 unused, bits 5-6 DPL, bit 7 present
/// - `offset_high`: bits 16-31 of the handler entry address
#[repr(C, packed)]
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct GateDescriptor {
    offset_low: u16,
    selector: u16,
    reserved: u8,
    attributes: u8,
    offset_high: u16,
}

const _: () = assert!(size_of::<GateDescriptor>() == 8);

impl GateDescriptor {
    /// A present 32-bit gate. All reserved bits are zero.
    pub const fn new(
        handler: u32,
        selector: SegmentSelector,
        gate_type: GateType,
        dpl: PrivilegeLevel,
    ) -> Self {
        Self {
            offset_low: (handler & 0xFFFF) as u16,
            selector: selector.bits(),
            reserved: 0,
            attributes: ATTR_PRESENT
                | ((dpl as u8) << ATTR_DPL_SHIFT)
                | ATTR_SIZE_32_BIT
                | gate_type as u8,
            offset_high: (handler >> 16) as u16,
        }
    }

    #[inline]
    pub const fn handler_address(&self) -> u32 {
        (self.offset_high as u32) << 16 | self.offset_low as u32
    }

    #[inline]
    pub const fn selector(&self) -> SegmentSelector {
        SegmentSelector(self.selector)
    }

    #[inline]
    pub const fn gate_type(&self) -> Option<GateType> {
        GateType::from_bits(self.attributes & ATTR_TYPE_MASK)
    }

    #[inline]
    pub const fn is_32_bit(&self) -> bool {
        self.attributes & ATTR_SIZE_32_BIT != 0
    }

    #[inline]
    pub const fn is_present(&self) -> bool {
        self.attributes & ATTR_PRESENT != 0
    }

    #[inline]
    pub fn dpl(&self) -> PrivilegeLevel {
        PrivilegeLevel::from_u16(((self.attributes & ATTR_DPL_MASK) >> ATTR_DPL_SHIFT) as u16)
    }

    /// True when every reserved and must-be-zero bit is clear.
    #[inline]
    pub const fn reserved_bits_clear(&self) -> bool {
        self.reserved == 0 && self.attributes & ATTR_UNUSED == 0
    }

    /// The descriptor as the CPU sees it, little-endian.
    pub const fn to_bits(&self) -> u64 {
        let offset_low = self.offset_low as u64;
        let selector = self.selector as u64;
        let reserved = self.reserved as u64;
        let attributes = self.attributes as u64;
        let offset_high = self.offset_high as u64;
        offset_low | selector << 16 | reserved << 32 | attributes << 40 | offset_high << 48
    }
}

impl fmt::Debug for GateDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateDescriptor")
            .field("handler", &format_args!("{:#010x}", self.handler_address()))
            .field("selector", &format_args!("{:#06x}", self.selector().bits()))
            .field("type", &self.gate_type())
            .field("dpl", &self.dpl())
            .field("present", &self.is_present())
            .finish()
    }
}

/// Image loaded into the IDT register by `lidt`.
#[repr(C, packed)]
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct TablePointer {
    limit: u16,
    base: u32,
}

const _: () = assert!(size_of::<TablePointer>() == 6);

impl TablePointer {
    /// Pointer image for `entry_count` contiguous descriptors at `base`.
    ///
    /// `entry_count` must be in `1..=MAX_VECTORS`.
    pub const fn new(base: u32, entry_count: usize) -> Self {
        Self {
            limit: (size_of::<GateDescriptor>() * entry_count - 1) as u16,
            base,
        }
    }

    #[inline]
    pub const fn limit(&self) -> u16 {
        self.limit
    }

    #[inline]
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Number of descriptors covered by the limit.
    #[inline]
    pub const fn entry_count(&self) -> usize {
        (self.limit as usize + 1) / size_of::<GateDescriptor>()
    }
}

impl fmt::Debug for TablePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TablePointer")
            .field("base", &format_args!("{:#010x}", self.base()))
            .field("limit", &format_args!("{:#06x}", self.limit()))
            .finish()
    }
}
