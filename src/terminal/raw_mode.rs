//! Raw terminal mode and alternate screen with panic-safe cleanup.

use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

/// Static flag to track if raw mode is active (for panic handler)
pub(crate) static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Guard that puts the terminal in raw mode on the alternate screen with
/// the cursor hidden, and restores all three on drop (including panics).
pub struct RawModeGuard {
    /// Whether this guard is responsible for cleanup
    active: bool,
}

impl RawModeGuard {
    /// Enter raw mode and the alternate screen.
    ///
    /// # Errors
    /// Returns an error if the terminal refuses raw mode (e.g. stdin is not
    /// a TTY). Raw mode is undone again if the screen switch fails.
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();

        enable_raw_mode()?;
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);
        let mut guard = Self { active: true };

        if let Err(err) = crossterm::execute!(io::stdout(), EnterAlternateScreen, Hide) {
            let _ = guard.exit();
            return Err(err);
        }
        Ok(guard)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Restore the terminal now. Drop becomes a no-op afterwards.
    pub fn exit(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            RAW_MODE_ACTIVE.store(false, Ordering::SeqCst);
            crossterm::execute!(io::stdout(), Show, LeaveAlternateScreen)?;
            disable_raw_mode()?;
        }
        Ok(())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            RAW_MODE_ACTIVE.store(false, Ordering::SeqCst);
            // Best-effort cleanup - ignore errors during drop
            let _ = crossterm::execute!(io::stdout(), Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

/// Install a panic hook that restores terminal state before panicking.
pub(crate) fn install_panic_hook() {
    static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        if RAW_MODE_ACTIVE.swap(false, Ordering::SeqCst) {
            let _ = crossterm::execute!(io::stdout(), Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
        original_hook(panic_info);
    }));
}
