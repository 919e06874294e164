//! Single-registration cell for kernel service tables.
//!
//! Bring-up registers a `'static` table once; trap entry points look it up on
//! every event without taking a lock.

use core::sync::atomic::{AtomicPtr, Ordering};

pub struct ServiceCell<T> {
    ptr: AtomicPtr<T>,
    name: &'static str,
}

// SAFETY: Only stores pointer to 'static T; AtomicPtr provides synchronization.
unsafe impl<T: Sync> Sync for ServiceCell<T> {}

impl<T> ServiceCell<T> {
    /// Create an empty cell. `name` appears in diagnostics.
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self {
            ptr: AtomicPtr::new(core::ptr::null_mut()),
            name,
        }
    }

    /// Register the service table. Returns `false` and keeps the existing
    /// table if one is already registered.
    #[inline]
    pub fn register(&self, services: &'static T) -> bool {
        self.ptr
            .compare_exchange(
                core::ptr::null_mut(),
                services as *const T as *mut T,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.ptr.load(Ordering::Acquire).is_null()
    }

    /// The registered table, or `None` before registration.
    #[inline]
    pub fn get(&self) -> Option<&'static T> {
        let ptr = self.ptr.load(Ordering::Acquire);
        // SAFETY: Only valid &'static T pointers are ever stored.
        unsafe { ptr.as_ref() }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}
