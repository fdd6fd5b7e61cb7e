//! Keyboard commands.
//!
//! This module handles:
//! - The fixed key → [`Command`] table
//! - Converting crossterm KeyEvents to the plain characters the table uses

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::camera::CameraId;
use crate::state::Step;

/// Operator commands, one per keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectCamera(CameraId),
    SaveActive,
    SaveBoth,
    CycleResolution,
    AdjustExposure(Step),
    AdjustBrightness(Step),
    TogglePreview,
    Quit,
    NoOp,
}

/// Controls listing, shown under `dualcam --help`.
pub const HELP: &str = "\
Controls:
  1, 2      - Select Camera 1 or 2
  s         - Save image from active camera
  d         - Save images from both cameras
  r         - Change resolution of active camera
  e/c       - Increase/decrease exposure of active camera
  b/v       - Increase/decrease brightness of active camera
  p         - Pause/resume preview
  q         - Quit application";

/// One-line form of [`HELP`] for the status bar.
pub const HELP_SHORT: &str = "1/2 cam  s/d save  r res  e/c exp  b/v bright  p pause  q quit";

/// Map a key to its command. Unmapped keys are `NoOp`.
pub fn dispatch(key: char) -> Command {
    match key {
        '1' => Command::SelectCamera(CameraId::One),
        '2' => Command::SelectCamera(CameraId::Two),
        's' => Command::SaveActive,
        'd' => Command::SaveBoth,
        'r' => Command::CycleResolution,
        'e' => Command::AdjustExposure(Step::Up),
        'c' => Command::AdjustExposure(Step::Down),
        'b' => Command::AdjustBrightness(Step::Up),
        'v' => Command::AdjustBrightness(Step::Down),
        'p' => Command::TogglePreview,
        'q' => Command::Quit,
        _ => Command::NoOp,
    }
}

/// Convert a crossterm KeyEvent to the character fed to [`dispatch`].
///
/// Raw mode swallows SIGINT, so Ctrl+C (and Esc) become `'q'`.
/// Key releases and non-character keys yield `None`.
pub fn key_event_to_char(event: KeyEvent) -> Option<char> {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = event;

    if kind == KeyEventKind::Release {
        return None;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some('q'),
            _ => None,
        };
    }

    match code {
        KeyCode::Esc => Some('q'),
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_table() {
        assert_eq!(dispatch('1'), Command::SelectCamera(CameraId::One));
        assert_eq!(dispatch('2'), Command::SelectCamera(CameraId::Two));
        assert_eq!(dispatch('s'), Command::SaveActive);
        assert_eq!(dispatch('d'), Command::SaveBoth);
        assert_eq!(dispatch('r'), Command::CycleResolution);
        assert_eq!(dispatch('e'), Command::AdjustExposure(Step::Up));
        assert_eq!(dispatch('c'), Command::AdjustExposure(Step::Down));
        assert_eq!(dispatch('b'), Command::AdjustBrightness(Step::Up));
        assert_eq!(dispatch('v'), Command::AdjustBrightness(Step::Down));
        assert_eq!(dispatch('p'), Command::TogglePreview);
        assert_eq!(dispatch('q'), Command::Quit);
    }

    #[test]
    fn test_dispatch_unmapped_keys_are_noop() {
        for key in ['z', 'Q', '3', ' ', '\n', 'é'] {
            assert_eq!(dispatch(key), Command::NoOp, "key {:?}", key);
        }
    }

    #[test]
    fn test_key_event_to_char_regular_char() {
        let event = KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE);
        assert_eq!(key_event_to_char(event), Some('e'));
    }

    #[test]
    fn test_key_event_to_char_ctrl_c_quits() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_event_to_char(event), Some('q'));
    }

    #[test]
    fn test_key_event_to_char_other_ctrl_ignored() {
        let event = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(key_event_to_char(event), None);
    }

    #[test]
    fn test_key_event_to_char_escape_quits() {
        let event = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(key_event_to_char(event), Some('q'));
    }

    #[test]
    fn test_key_event_to_char_release_ignored() {
        let event = KeyEvent::new_with_kind(
            KeyCode::Char('s'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );
        assert_eq!(key_event_to_char(event), None);
    }

    #[test]
    fn test_key_event_to_char_arrow_ignored() {
        let event = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(key_event_to_char(event), None);
    }
}
