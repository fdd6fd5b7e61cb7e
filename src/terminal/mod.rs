//! Terminal front end: raw mode, key input and the half-block preview.

mod preview;
mod raw_mode;
mod ui;

pub use preview::{downsample_into, draw, PreviewLayout};
pub use raw_mode::RawModeGuard;
pub use ui::{TerminalKeys, TerminalScreen};
