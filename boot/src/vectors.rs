//! The link-time vector registry.
//!
//! A registry is a constant slice of `(vector, entry point)` pairs in
//! ascending vector order, closed by [`VectorEntry::SENTINEL`]. It is never
//! modified at run time.

use trapgate_abi::TrapError;
use trapgate_abi::arch::MAX_VECTORS;

/// A trampoline as emitted by the assembler.
pub type Trampoline = unsafe extern "C" fn();

#[derive(Clone, Copy, Debug)]
pub struct VectorEntry {
    pub vector: u32,
    /// `None` only in the sentinel.
    pub entry: Option<Trampoline>,
}

impl VectorEntry {
    pub const SENTINEL: Self = Self {
        vector: 0,
        entry: None,
    };

    pub const fn new(vector: u32, entry: Trampoline) -> Self {
        Self {
            vector,
            entry: Some(entry),
        }
    }

    #[inline]
    pub const fn is_sentinel(&self) -> bool {
        self.entry.is_none()
    }
}

/// The 32-bit address a gate stores for `entry`.
#[inline]
pub fn entry_address(entry: Trampoline) -> u32 {
    entry as *const () as usize as u32
}

#[derive(Clone, Copy, Debug)]
pub struct VectorRegistry<'a> {
    raw: &'a [VectorEntry],
}

impl<'a> VectorRegistry<'a> {
    pub const fn new(raw: &'a [VectorEntry]) -> Self {
        Self { raw }
    }

    /// Registered entries, sentinel excluded.
    pub fn entries(&self) -> &'a [VectorEntry] {
        let end = self
            .raw
            .iter()
            .position(VectorEntry::is_sentinel)
            .unwrap_or(self.raw.len());
        &self.raw[..end]
    }

    /// Highest registered vector, `None` for an empty registry.
    pub fn highest_vector(&self) -> Option<u32> {
        self.entries().iter().map(|e| e.vector).max()
    }

    pub fn entry_count(&self) -> usize {
        self.entries().len()
    }

    pub fn lookup(&self, vector: u32) -> Option<Trampoline> {
        self.entries()
            .iter()
            .find(|e| e.vector == vector)
            .and_then(|e| e.entry)
    }

    /// Check the shape the table builder relies on.
    pub fn validate(&self) -> Result<(), TrapError> {
        if !self.raw.iter().any(VectorEntry::is_sentinel) {
            return Err(TrapError::MissingSentinel);
        }

        let mut previous: Option<u32> = None;
        for entry in self.entries() {
            if entry.vector as usize >= MAX_VECTORS {
                return Err(TrapError::VectorOutOfRange);
            }
            match previous {
                Some(prev) if prev == entry.vector => return Err(TrapError::DuplicateVector),
                Some(prev) if prev > entry.vector => return Err(TrapError::UnsortedRegistry),
                _ => {}
            }
            previous = Some(entry.vector);
        }
        Ok(())
    }
}
