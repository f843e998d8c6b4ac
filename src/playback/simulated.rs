//! Headless playback engine.
//!
//! Advances a virtual position by `elapsed * rate` whenever the host calls
//! [`SimulatedEngine::advance`], and queues the events a real media element
//! would emit. Used by the `simulate`/`listen` commands and by tests.

use std::collections::VecDeque;

use super::{PlaybackEngine, PlaybackEvent};

/// Clock-driven engine without audio output.
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    current_time: f64,
    duration: Option<f64>,
    rate: f64,
    paused: bool,
    muted: bool,
    events: VecDeque<PlaybackEvent>,
}

impl SimulatedEngine {
    /// Create an engine with no media loaded.
    pub fn new() -> Self {
        Self {
            current_time: 0.0,
            duration: None,
            rate: 1.0,
            paused: true,
            muted: false,
            events: VecDeque::new(),
        }
    }

    /// Load media of the given duration and emit `MetadataReady`.
    ///
    /// Like a media element switching source, this resets the position and
    /// pauses playback.
    pub fn load(&mut self, duration: f64) {
        self.current_time = 0.0;
        self.duration = Some(duration);
        self.paused = true;
        self.events.clear();
        self.events.push_back(PlaybackEvent::MetadataReady);
    }

    /// Advance playback by `elapsed` seconds of wall time.
    ///
    /// Emits `Progress`, plus `Pause` and `Ended` when the end is reached.
    pub fn advance(&mut self, elapsed: f64) {
        if self.paused || !elapsed.is_finite() || elapsed <= 0.0 {
            return;
        }
        let Some(duration) = self.duration else {
            return;
        };

        self.current_time = (self.current_time + elapsed * self.rate).min(duration);
        self.events.push_back(PlaybackEvent::Progress);

        if self.current_time >= duration {
            self.paused = true;
            self.events.push_back(PlaybackEvent::Pause);
            self.events.push_back(PlaybackEvent::Ended);
        }
    }

    /// Take all queued events in emission order.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.events.drain(..).collect()
    }

    /// Whether playback has reached the end.
    pub fn is_ended(&self) -> bool {
        matches!(self.duration, Some(d) if self.current_time >= d)
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, secs: f64) {
        if self.duration.is_none() || !secs.is_finite() {
            return;
        }
        self.current_time = secs.max(0.0);
        self.events.push_back(PlaybackEvent::Progress);
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        if rate.is_finite() && rate > 0.0 {
            self.rate = rate;
        }
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn play(&mut self) {
        if !self.paused || self.duration.is_none() {
            return;
        }
        // Playing from the very end restarts, as media elements do
        if self.is_ended() {
            self.current_time = 0.0;
        }
        self.paused = false;
        self.events.push_back(PlaybackEvent::Play);
    }

    fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.events.push_back(PlaybackEvent::Pause);
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}
