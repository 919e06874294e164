#![no_std]

#[cfg(target_arch = "x86")]
pub mod cpu {
    use core::arch::asm;

    use trapgate_abi::{TablePointer, TrapCpu};

    unsafe extern "C" {
        /// Restores the register snapshot named by the active context selector.
        fn arch_context_switch() -> !;
    }

    #[inline(always)]
    pub fn hlt() {
        unsafe {
            asm!("hlt", options(nomem, nostack, preserves_flags));
        }
    }

    #[inline(always)]
    pub fn enable_interrupts() {
        unsafe {
            asm!("sti", options(nomem, nostack));
        }
    }

    #[inline(always)]
    pub fn disable_interrupts() {
        unsafe {
            asm!("cli", options(nomem, nostack));
        }
    }

    /// Reload CR3 with its own value, dropping every non-global TLB entry.
    #[inline(always)]
    pub fn reload_cr3() {
        unsafe {
            asm!(
                "mov {tmp}, cr3",
                "mov cr3, {tmp}",
                tmp = out(reg) _,
                options(nostack, preserves_flags)
            );
        }
    }

    /// # Safety
    /// `pointer` must describe a table that stays valid for the kernel lifetime.
    #[inline(always)]
    pub unsafe fn lidt(pointer: &TablePointer) {
        unsafe {
            asm!(
                "lidt [{}]",
                in(reg) pointer as *const TablePointer,
                options(readonly, nostack, preserves_flags)
            );
        }
    }

    /// The processor itself.
    pub struct X86Cpu;

    impl TrapCpu for X86Cpu {
        fn enable_interrupts(&self) {
            enable_interrupts();
        }

        fn disable_interrupts(&self) {
            disable_interrupts();
        }

        fn flush_translation_cache(&self) {
            reload_cr3();
        }

        fn load_table(&self, pointer: &TablePointer) {
            // SAFETY: table activation only hands out leaked, never-freed tables.
            unsafe { lidt(pointer) }
        }

        fn context_switch(&self) -> ! {
            unsafe { arch_context_switch() }
        }

        fn park(&self) -> ! {
            loop {
                enable_interrupts();
                hlt();
            }
        }
    }
}

pub mod klog;
pub mod service_cell;

pub use klog::{klog_attach_sink, klog_get_level, klog_init, klog_set_level, KlogLevel};
pub use service_cell::ServiceCell;
