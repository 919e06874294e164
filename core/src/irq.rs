//! External interrupt lines and the kernel yield vector.

use trapgate_abi::Resume;
use trapgate_abi::arch::IRQ_LINES;
use trapgate_lib::{klog_debug, klog_trace, klog_warn};

use crate::context::TrapContext;
use crate::resume;

pub const IRQ_TIMER: u8 = 0;
pub const IRQ_KEYBOARD: u8 = 1;
pub const IRQ_COM2: u8 = 3;
pub const IRQ_COM1: u8 = 4;
pub const IRQ_BLOCK_9: u8 = 9;
pub const IRQ_BLOCK_11: u8 = 11;
pub const IRQ_ATA_PRIMARY: u8 = 14;
pub const IRQ_ATA_SECONDARY: u8 = 15;

/// Which subsystem owns a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrqRoute {
    Timer,
    Keyboard,
    Serial,
    Block,
    /// Line exists but nothing is wired to it yet.
    Stub,
}

pub const fn route(line: u8) -> IrqRoute {
    match line {
        IRQ_TIMER => IrqRoute::Timer,
        IRQ_KEYBOARD => IrqRoute::Keyboard,
        IRQ_COM2 | IRQ_COM1 => IrqRoute::Serial,
        IRQ_BLOCK_9 | IRQ_BLOCK_11 | IRQ_ATA_PRIMARY | IRQ_ATA_SECONDARY => IrqRoute::Block,
        _ => IrqRoute::Stub,
    }
}

/// Service `line`, acknowledge it, and pick the resume target.
///
/// Device lines are acknowledged only after their manager ran. The timer
/// ticks and reschedules before its acknowledgement and always ends in a
/// context switch. Stub lines are logged and left unacknowledged.
pub fn handle_irq(cx: &mut TrapContext<'_>, line: u8) -> Resume {
    let env = cx.env;
    match route(line) {
        IrqRoute::Timer => {
            env.console.heartbeat();
            env.scheduler.tick();
            env.scheduler.schedule();
            env.pic.end_of_interrupt(line);
            return Resume::ContextSwitch;
        }
        IrqRoute::Keyboard => {
            env.keyboard.service_irq(line);
            env.pic.end_of_interrupt(line);
        }
        IrqRoute::Serial => {
            klog_trace!("IRQ {} called", line);
            env.serial.service_irq(line);
            env.pic.end_of_interrupt(line);
            klog_trace!("IRQ {} ended", line);
        }
        IrqRoute::Block => {
            env.block.service_irq(line);
            env.pic.end_of_interrupt(line);
        }
        IrqRoute::Stub if u32::from(line) >= IRQ_LINES => {
            klog_warn!("IRQ {} is beyond the interrupt controller, ignoring", line);
        }
        IrqRoute::Stub => {
            klog_debug!("IRQ {} called, no handler wired", line);
        }
    }
    resume::decide(cx)
}

/// The kernel gives up the CPU voluntarily.
pub fn handle_yield(cx: &mut TrapContext<'_>) -> Resume {
    cx.env.scheduler.schedule();
    Resume::ContextSwitch
}
