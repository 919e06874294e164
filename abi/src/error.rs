//! Boot-time errors of the trap table.

use core::ffi::c_int;
use core::fmt;

/// Implement the C return-code conversions for kernel error enums.
///
/// Generates `as_c_int()`, `from_c_int()` and `result_to_c_int()` for
/// `#[repr(i32)]` enums whose variants are all negative; zero means success.
macro_rules! impl_kernel_error {
    ($ty:ty, fallback: $fallback:ident, variants: { $($val:literal => $variant:ident),* $(,)? }) => {
        impl $ty {
            /// Convert to C-style integer for extern entry points.
            #[inline]
            pub fn as_c_int(self) -> c_int {
                self as c_int
            }

            /// Convert from C-style integer; zero is success.
            #[inline]
            pub fn from_c_int(val: c_int) -> Result<(), Self> {
                match val {
                    0 => Ok(()),
                    $($val => Err(Self::$variant),)*
                    _ => Err(Self::$fallback),
                }
            }

            /// Collapse a result into the C return convention.
            #[inline]
            pub fn result_to_c_int<T>(result: Result<T, Self>) -> c_int {
                match result {
                    Ok(_) => 0,
                    Err(err) => err.as_c_int(),
                }
            }
        }
    };
}

/// Errors raised while building or activating the interrupt descriptor table.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapError {
    /// Registry vector numbers are not in ascending order
    UnsortedRegistry = -1,
    /// Two registry entries name the same vector
    DuplicateVector = -2,
    /// Registry does not end in a null sentinel
    MissingSentinel = -3,
    /// A registered vector does not fit in the hardware table
    VectorOutOfRange = -4,
    /// No handler registered for the syscall vector under a strict gate policy
    SyscallVectorUnregistered = -5,
    /// The table was already loaded into the CPU
    AlreadyActive = -6,
    /// A trap host is already registered
    HostAlreadyRegistered = -7,
    /// A return code this table does not know about
    Unknown = -99,
}

impl_kernel_error!(TrapError, fallback: Unknown, variants: {
    -1 => UnsortedRegistry,
    -2 => DuplicateVector,
    -3 => MissingSentinel,
    -4 => VectorOutOfRange,
    -5 => SyscallVectorUnregistered,
    -6 => AlreadyActive,
    -7 => HostAlreadyRegistered,
    -99 => Unknown,
});

impl fmt::Display for TrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::UnsortedRegistry => "vector registry is not sorted",
            Self::DuplicateVector => "vector registered twice",
            Self::MissingSentinel => "vector registry has no terminating sentinel",
            Self::VectorOutOfRange => "vector number exceeds the hardware table",
            Self::SyscallVectorUnregistered => "no handler registered for the syscall vector",
            Self::AlreadyActive => "interrupt table already active",
            Self::HostAlreadyRegistered => "trap host already registered",
            Self::Unknown => "unknown trap table error",
        };
        f.write_str(msg)
    }
}
