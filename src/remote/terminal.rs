//! Media keys delivered through the terminal.
//!
//! Terminals that implement the progressive keyboard protocol report hardware
//! media keys as key events once escape-code disambiguation is enabled. Other
//! terminals never send them, so the surface reports itself unavailable there.

use std::io;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags, MediaKeyCode,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use super::{RemoteAction, RemoteControlSurface, SurfaceError};

/// Media-key surface backed by the controlling terminal.
///
/// The availability check queries the terminal, so build the bridge after
/// raw mode has been enabled.
#[derive(Debug, Default)]
pub struct TerminalMediaKeys {
    pushed: bool,
}

impl TerminalMediaKeys {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RemoteControlSurface for TerminalMediaKeys {
    type Event = KeyEvent;

    fn name(&self) -> &'static str {
        "terminal media keys"
    }

    fn is_available(&self) -> bool {
        crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false)
    }

    fn register(&mut self, _actions: &[RemoteAction]) -> Result<(), SurfaceError> {
        execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        self.pushed = true;
        Ok(())
    }

    fn unregister(&mut self) {
        if self.pushed {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
            self.pushed = false;
        }
    }

    fn translate(&self, event: &KeyEvent) -> Option<RemoteAction> {
        media_key_action(event)
    }
}

/// Map a media key press onto a [`RemoteAction`].
pub fn media_key_action(key: &KeyEvent) -> Option<RemoteAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let KeyCode::Media(media) = key.code else {
        return None;
    };
    match media {
        MediaKeyCode::Play => Some(RemoteAction::Play),
        MediaKeyCode::Pause | MediaKeyCode::Stop => Some(RemoteAction::Pause),
        MediaKeyCode::Rewind | MediaKeyCode::Reverse | MediaKeyCode::TrackPrevious => {
            Some(RemoteAction::SeekBackward)
        }
        MediaKeyCode::FastForward | MediaKeyCode::TrackNext => Some(RemoteAction::SeekForward),
        MediaKeyCode::MuteVolume => Some(RemoteAction::ToggleMute),
        _ => None,
    }
}
