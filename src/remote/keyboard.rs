//! Keyboard shortcuts.
//!
//! Maps key events onto transport and rate actions. Nothing is intercepted
//! while focus is in a text-entry context, so typing a space in an input
//! field never toggles playback.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MediaKeyCode};

use crate::sync::TransportCommand;

/// Where keyboard focus currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusContext {
    /// Reading view, buttons, anything that is not a text field
    #[default]
    Document,
    /// A text input or editable area
    TextEntry,
}

/// What a shortcut asks the host to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Transport(TransportCommand),
    RateUp,
    RateDown,
    ToggleHelp,
    Quit,
}

/// Shortcut reference for help screens: (keys, description).
pub const SHORTCUTS: &[(&str, &str)] = &[
    ("space / k", "Play / pause"),
    ("← / j", "Skip back"),
    ("→ / l", "Skip forward"),
    ("0-9", "Jump to 0%..90%"),
    ("home", "Back to start"),
    ("m", "Mute / unmute"),
    ("+ / -", "Faster / slower"),
    ("?", "Toggle help"),
    ("q / esc", "Quit"),
];

/// Map a key event to a shortcut action.
///
/// Returns `None` for unbound keys, key releases, and for every key while
/// `focus` is [`FocusContext::TextEntry`].
pub fn map_key(key: &KeyEvent, focus: FocusContext) -> Option<KeyAction> {
    if focus == FocusContext::TextEntry || key.kind == KeyEventKind::Release {
        return None;
    }

    let action = match key.code {
        // === Quit ===
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,

        // === Playback controls ===
        KeyCode::Char(' ') | KeyCode::Char('k') => {
            KeyAction::Transport(TransportCommand::TogglePlayback)
        }
        KeyCode::Media(MediaKeyCode::PlayPause) => {
            KeyAction::Transport(TransportCommand::TogglePlayback)
        }
        KeyCode::Char('m') => KeyAction::Transport(TransportCommand::ToggleMute),
        KeyCode::Char('+') | KeyCode::Char('=') => KeyAction::RateUp,
        KeyCode::Char('-') | KeyCode::Char('_') => KeyAction::RateDown,

        // === Seeking ===
        KeyCode::Left | KeyCode::Char('j') => KeyAction::Transport(TransportCommand::SkipBackward),
        KeyCode::Right | KeyCode::Char('l') => KeyAction::Transport(TransportCommand::SkipForward),
        KeyCode::Home => KeyAction::Transport(TransportCommand::SeekTo(0.0)),
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = c.to_digit(10).unwrap_or(0) as f64;
            KeyAction::Transport(TransportCommand::SeekFraction(tenth / 10.0))
        }

        KeyCode::Char('?') => KeyAction::ToggleHelp,

        _ => return None,
    };
    Some(action)
}
