//! Process-wide interrupt flag set by Ctrl+C / SIGTERM.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag for handling Ctrl+C across the application
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Check if an interrupt has been received.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Set up the Ctrl+C handler.
///
/// This should be called once at program startup.
pub fn setup_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        INTERRUPTED.store(true, Ordering::SeqCst);
        log::info!("Received interrupt, shutting down");
    })
}
