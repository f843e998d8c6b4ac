//! Playback engine abstraction.
//!
//! The sync core never decodes audio itself. It drives whatever engine the host
//! provides (a browser media element, a native decoder, a test double) through
//! [`PlaybackEngine`] and reacts to the [`PlaybackEvent`]s the engine emits.

mod simulated;

pub use simulated::SimulatedEngine;

/// Events emitted by a playback engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Duration and other metadata became available
    MetadataReady,
    /// Playback position advanced or was changed by a seek
    Progress,
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// Playback reached the end of the media
    Ended,
}

/// Control and query surface of a playback engine.
pub trait PlaybackEngine {
    /// Current position in seconds.
    fn current_time(&self) -> f64;

    /// Move the position to `secs`.
    fn set_current_time(&mut self, secs: f64);

    /// Media duration in seconds, `None` before metadata has loaded.
    ///
    /// Engines may also report non-finite values (live streams); callers must
    /// check before using it.
    fn duration(&self) -> Option<f64>;

    fn playback_rate(&self) -> f64;

    fn set_playback_rate(&mut self, rate: f64);

    fn is_paused(&self) -> bool;

    fn play(&mut self);

    fn pause(&mut self);

    fn is_muted(&self) -> bool;

    fn set_muted(&mut self, muted: bool);
}

/// Point-in-time view of the engine state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    pub current_time: f64,
    /// `None` when unknown, non-finite or zero
    pub duration: Option<f64>,
    pub rate: f64,
    pub playing: bool,
}

impl PlaybackSnapshot {
    /// Capture the state of `engine`.
    pub fn of<E: PlaybackEngine + ?Sized>(engine: &E) -> Self {
        Self {
            current_time: engine.current_time(),
            duration: usable_duration(engine.duration()),
            rate: engine.playback_rate(),
            playing: !engine.is_paused(),
        }
    }

    /// Position as a fraction of the duration, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        match self.duration {
            Some(d) if self.current_time.is_finite() => (self.current_time / d).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

/// Filter a reported duration down to one that can be used for arithmetic.
pub fn usable_duration(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d > 0.0)
}
