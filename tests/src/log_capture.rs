//! A klog sink that keeps what each test thread logs.

extern crate std;

use std::cell::RefCell;
use std::string::String;
use std::thread_local;

use trapgate_lib::klog_attach_sink;

thread_local! {
    static CAPTURED: RefCell<String> = const { RefCell::new(String::new()) };
}

fn sink(text: &str) {
    CAPTURED.with(|captured| captured.borrow_mut().push_str(text));
}

/// Attach the capturing sink. Later calls are no-ops.
pub fn install() {
    klog_attach_sink(sink);
}

/// Everything logged so far on the calling thread.
pub fn captured() -> String {
    CAPTURED.with(|captured| captured.borrow().clone())
}
