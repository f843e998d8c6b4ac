//! Transport controls: play/pause, seeking, skipping, muting.
//!
//! Every time argument is clamped to `[0, duration]`, and every operation is a
//! silent no-op while the duration is unknown or zero.

use crate::playback::{usable_duration, PlaybackEngine, PlaybackSnapshot};

/// Fixed skip distances in seconds (both positive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipDeltas {
    pub backward: f64,
    pub forward: f64,
}

impl Default for SkipDeltas {
    fn default() -> Self {
        Self {
            backward: 15.0,
            forward: 30.0,
        }
    }
}

/// An abstract transport operation, as issued by buttons, keys or media keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportCommand {
    Play,
    Pause,
    TogglePlayback,
    SkipBackward,
    SkipForward,
    /// Seek to an absolute position in seconds
    SeekTo(f64),
    /// Seek relative to the current position
    SeekBy(f64),
    /// Seek to a fraction of the duration (scrubbing)
    SeekFraction(f64),
    ToggleMute,
    SetMuted(bool),
}

/// Sole writer of playback engine state.
pub struct TransportController<E: PlaybackEngine> {
    engine: E,
    skip: SkipDeltas,
}

impl<E: PlaybackEngine> TransportController<E> {
    pub fn new(engine: E, skip: SkipDeltas) -> Self {
        Self { engine, skip }
    }

    fn duration(&self) -> Option<f64> {
        usable_duration(self.engine.duration())
    }

    /// Seek to `clamp(t, 0, duration)`.
    pub fn seek_absolute(&mut self, t: f64) {
        let Some(duration) = self.duration() else {
            tracing::debug!("Ignoring seek to {} - duration unknown", t);
            return;
        };
        if t.is_nan() {
            return;
        }
        self.engine.set_current_time(t.clamp(0.0, duration));
    }

    /// Seek by `delta` seconds from the current position.
    pub fn seek_relative(&mut self, delta: f64) {
        let current = self.engine.current_time();
        self.seek_absolute(current + delta);
    }

    /// Seek to `fraction * duration`, with `fraction` clamped to `[0, 1]`.
    pub fn seek_by_fraction(&mut self, fraction: f64) {
        let Some(duration) = self.duration() else {
            return;
        };
        if fraction.is_nan() {
            return;
        }
        self.seek_absolute(fraction.clamp(0.0, 1.0) * duration);
    }

    pub fn skip_backward(&mut self) {
        self.seek_relative(-self.skip.backward);
    }

    pub fn skip_forward(&mut self) {
        self.seek_relative(self.skip.forward);
    }

    pub fn play(&mut self) {
        if self.duration().is_some() {
            self.engine.play();
        }
    }

    pub fn pause(&mut self) {
        if self.duration().is_some() {
            self.engine.pause();
        }
    }

    /// Play if paused, pause if playing.
    pub fn toggle_playback(&mut self) {
        if self.engine.is_paused() {
            self.play();
        } else {
            self.pause();
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        if self.duration().is_some() {
            self.engine.set_muted(muted);
        }
    }

    pub fn toggle_mute(&mut self) {
        let muted = self.engine.is_muted();
        self.set_muted(!muted);
    }

    /// Run a [`TransportCommand`].
    pub fn execute(&mut self, command: TransportCommand) {
        match command {
            TransportCommand::Play => self.play(),
            TransportCommand::Pause => self.pause(),
            TransportCommand::TogglePlayback => self.toggle_playback(),
            TransportCommand::SkipBackward => self.skip_backward(),
            TransportCommand::SkipForward => self.skip_forward(),
            TransportCommand::SeekTo(t) => self.seek_absolute(t),
            TransportCommand::SeekBy(delta) => self.seek_relative(delta),
            TransportCommand::SeekFraction(f) => self.seek_by_fraction(f),
            TransportCommand::ToggleMute => self.toggle_mute(),
            TransportCommand::SetMuted(muted) => self.set_muted(muted),
        }
    }

    /// Apply a rate already validated by the rate controller.
    pub(crate) fn apply_rate(&mut self, rate: f64) {
        self.engine.set_playback_rate(rate);
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot::of(&self.engine)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
