//! External transport controls.
//!
//! Exposes the transport to control surfaces outside the reading view: OS media
//! keys / remote-control surfaces through [`ExternalControlBridge`], and
//! keyboard shortcuts through [`keyboard`].
//!
//! A surface is checked once when the bridge is built. When it is missing the
//! bridge is inert: every call is a silent no-op and playback works as usual.

pub mod keyboard;
mod terminal;

pub use terminal::TerminalMediaKeys;

use crate::playback::PlaybackEngine;
use crate::sync::{TransportCommand, TransportController};

/// The fixed set of actions offered to remote-control surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteAction {
    Play,
    Pause,
    SeekBackward,
    SeekForward,
    ToggleMute,
}

impl RemoteAction {
    /// Every action, in registration order.
    pub const ALL: [RemoteAction; 5] = [
        RemoteAction::Play,
        RemoteAction::Pause,
        RemoteAction::SeekBackward,
        RemoteAction::SeekForward,
        RemoteAction::ToggleMute,
    ];

    /// Action name as used by media session APIs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::SeekBackward => "seekbackward",
            Self::SeekForward => "seekforward",
            Self::ToggleMute => "togglemute",
        }
    }
}

impl From<RemoteAction> for TransportCommand {
    fn from(action: RemoteAction) -> Self {
        match action {
            RemoteAction::Play => TransportCommand::Play,
            RemoteAction::Pause => TransportCommand::Pause,
            RemoteAction::SeekBackward => TransportCommand::SkipBackward,
            RemoteAction::SeekForward => TransportCommand::SkipForward,
            RemoteAction::ToggleMute => TransportCommand::ToggleMute,
        }
    }
}

/// Errors reported by a control surface during registration.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Control surface rejected registration: {0}")]
    Registration(String),

    #[error("Control surface I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A host control surface that can deliver [`RemoteAction`]s.
pub trait RemoteControlSurface {
    /// Raw event type the host receives from the surface.
    type Event;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Whether the surface exists in this runtime.
    ///
    /// Should be fast; it is called once when the bridge is built.
    fn is_available(&self) -> bool;

    /// Announce the actions the bridge will handle.
    fn register(&mut self, actions: &[RemoteAction]) -> Result<(), SurfaceError>;

    /// Withdraw the registration.
    fn unregister(&mut self) {}

    /// Map a raw surface event onto an action, if it is one.
    fn translate(&self, event: &Self::Event) -> Option<RemoteAction>;
}

/// Adapter between a control surface and the transport controller.
pub struct ExternalControlBridge<S: RemoteControlSurface> {
    surface: Option<S>,
}

impl<S: RemoteControlSurface> ExternalControlBridge<S> {
    /// Check `surface` and register every [`RemoteAction`] with it.
    ///
    /// A missing surface, an unavailable one or a failed registration all give
    /// an inert bridge.
    pub fn new(surface: Option<S>) -> Self {
        let surface = surface.and_then(|mut surface| {
            if !surface.is_available() {
                tracing::debug!("{} not available, remote controls disabled", surface.name());
                return None;
            }
            match surface.register(&RemoteAction::ALL) {
                Ok(()) => {
                    tracing::debug!("Registered remote controls with {}", surface.name());
                    Some(surface)
                }
                Err(e) => {
                    tracing::warn!("Failed to register with {}: {}", surface.name(), e);
                    None
                }
            }
        });
        Self { surface }
    }

    /// A bridge with no surface.
    pub fn inert() -> Self {
        Self { surface: None }
    }

    /// Whether a surface is attached and registered.
    pub fn is_active(&self) -> bool {
        self.surface.is_some()
    }

    /// Run `action` against `transport`. Returns whether it was delivered.
    pub fn dispatch<E: PlaybackEngine>(
        &self,
        action: RemoteAction,
        transport: &mut TransportController<E>,
    ) -> bool {
        if !self.is_active() {
            return false;
        }
        transport.execute(action.into());
        true
    }

    /// Translate a raw surface event and dispatch it.
    ///
    /// Returns the action that was run, if the event was one.
    pub fn handle<E: PlaybackEngine>(
        &self,
        event: &S::Event,
        transport: &mut TransportController<E>,
    ) -> Option<RemoteAction> {
        let action = self.surface.as_ref()?.translate(event)?;
        self.dispatch(action, transport);
        Some(action)
    }
}

impl<S: RemoteControlSurface> Drop for ExternalControlBridge<S> {
    fn drop(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.unregister();
        }
    }
}
