//! Leveled kernel log on the debug channel.
//!
//! Lines are formatted straight into the attached sink, one fragment at a
//! time, so logging never allocates and is safe from inside trap handlers.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use spin::Once;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum KlogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl KlogLevel {
    const DEFAULT: Self = Self::Info;

    const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Error,
            1 => Self::Warn,
            2 => Self::Info,
            3 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// Prefix written before every line of this level.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Error => "[ERROR] ",
            Self::Warn => "[WARN] ",
            Self::Info => "[INFO] ",
            Self::Debug => "[DEBUG] ",
            Self::Trace => "[TRACE] ",
        }
    }
}

/// Writes one fragment of a log line to the debug channel.
pub type KlogSink = fn(&str);

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(KlogLevel::DEFAULT as u8);
static SINK: Once<KlogSink> = Once::new();

struct SinkWriter(KlogSink);

impl fmt::Write for SinkWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        (self.0)(s);
        Ok(())
    }
}

pub fn is_enabled_level(level: KlogLevel) -> bool {
    level as u8 <= CURRENT_LEVEL.load(Ordering::Relaxed)
}

/// Emit one line. Dropped when filtered out or before a sink is attached.
pub fn log_args(level: KlogLevel, args: fmt::Arguments<'_>) {
    if !is_enabled_level(level) {
        return;
    }
    if let Some(&sink) = SINK.get() {
        let mut writer = SinkWriter(sink);
        sink(level.tag());
        let _ = fmt::write(&mut writer, args);
        sink("\n");
    }
}

/// Reset the level filter to its boot default.
pub fn klog_init() {
    klog_set_level(KlogLevel::DEFAULT);
}

/// Attach the debug channel. Only the first sink attached is kept.
pub fn klog_attach_sink(sink: KlogSink) {
    SINK.call_once(|| sink);
}

pub fn klog_set_level(level: KlogLevel) {
    CURRENT_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn klog_get_level() -> KlogLevel {
    KlogLevel::from_raw(CURRENT_LEVEL.load(Ordering::Relaxed))
}

#[macro_export]
macro_rules! klog {
    ($level:expr, $($arg:tt)*) => {
        $crate::klog::log_args($level, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! klog_error {
    ($($arg:tt)*) => { $crate::klog!($crate::klog::KlogLevel::Error, $($arg)*) };
}

#[macro_export]
macro_rules! klog_warn {
    ($($arg:tt)*) => { $crate::klog!($crate::klog::KlogLevel::Warn, $($arg)*) };
}

#[macro_export]
macro_rules! klog_info {
    ($($arg:tt)*) => { $crate::klog!($crate::klog::KlogLevel::Info, $($arg)*) };
}

#[macro_export]
macro_rules! klog_debug {
    ($($arg:tt)*) => { $crate::klog!($crate::klog::KlogLevel::Debug, $($arg)*) };
}

#[macro_export]
macro_rules! klog_trace {
    ($($arg:tt)*) => { $crate::klog!($crate::klog::KlogLevel::Trace, $($arg)*) };
}
