//! The playback/text synchronization state machine.
//!
//! ```text
//! Uninitialized --metadata--> MetadataReady --tick/play/pause--> Playing | Paused
//!                                                 Playing --ended--> Ended
//! any --load/unload--> Uninitialized
//! ```
//!
//! Seeking is not a state of its own: a seek shows up as a progress tick at the
//! new position.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::playback::{PlaybackEngine, PlaybackEvent, SimulatedEngine};
use crate::render::format_duration;
use crate::storage::KeyValueStore;
use crate::text;

use super::position::{
    clamp_restored, PositionStore, ResourceKey, SaveThrottle, DEFAULT_RESTORE_EPSILON,
};
use super::rate::{AllowedRates, RateController, RateSubscription, NEUTRAL_RATE};
use super::segment_map::BoundaryTable;
use super::transport::{SkipDeltas, TransportCommand, TransportController};

/// Lifecycle state of a [`SyncEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No resource, or waiting for the media's metadata
    Uninitialized,
    /// Duration known, boundaries built, no tick seen yet
    MetadataReady,
    Playing,
    Paused,
    Ended,
}

/// When a newly highlighted segment should be scrolled into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrollPolicy {
    /// Only while audio is playing (a paused reader may be looking elsewhere)
    #[default]
    WhilePlaying,
    Always,
    Never,
}

impl ScrollPolicy {
    pub fn should_scroll(self, playing: bool) -> bool {
        match self {
            ScrollPolicy::WhilePlaying => playing,
            ScrollPolicy::Always => true,
            ScrollPolicy::Never => false,
        }
    }
}

/// An article to synchronize: its key and the lengths of its segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub key: ResourceKey,
    pub segment_lengths: Vec<usize>,
}

impl Resource {
    pub fn new(key: ResourceKey, segment_lengths: Vec<usize>) -> Self {
        Self {
            key,
            segment_lengths,
        }
    }

    /// Build a resource from plain article text, one segment per paragraph.
    pub fn from_text(key: ResourceKey, article: &str) -> Self {
        Self::new(key, text::segment_lengths(&text::split_paragraphs(article)))
    }
}

/// Highlight moved from one segment to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightChange {
    /// Segment to deactivate, `None` on the first highlight after a load
    pub previous: Option<usize>,
    /// Segment to activate
    pub current: usize,
    /// Whether the UI should bring `current` into view
    pub scroll_into_view: bool,
}

/// Rendering side of the engine.
pub trait SyncObserver {
    /// The active segment changed.
    fn on_highlight_change(&mut self, change: HighlightChange);

    /// Elapsed/total time labels changed (`MM:SS`).
    fn on_time_display_change(&mut self, elapsed: &str, total: &str);

    /// Playback progress as a fraction in `[0, 1]`.
    fn on_progress(&mut self, _fraction: f64) {}
}

/// Tunables for a [`SyncEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    pub allowed_rates: AllowedRates,
    pub default_rate: f64,
    pub skip: SkipDeltas,
    pub save_throttle: SaveThrottle,
    /// Restored positions stay at least this far from the end
    pub restore_epsilon: f64,
    pub scroll: ScrollPolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            allowed_rates: AllowedRates::default(),
            default_rate: NEUTRAL_RATE,
            skip: SkipDeltas::default(),
            save_throttle: SaveThrottle::default(),
            restore_epsilon: DEFAULT_RESTORE_EPSILON,
            scroll: ScrollPolicy::default(),
        }
    }
}

/// Derived per-resource state. Dropped wholesale on navigation.
struct Session {
    resource: Resource,
    boundaries: Option<BoundaryTable>,
    last_index: Option<usize>,
}

/// Keeps playback, highlighted segment and persisted position in step.
pub struct SyncEngine<E: PlaybackEngine, O: SyncObserver> {
    transport: TransportController<E>,
    positions: PositionStore,
    rates: RateController,
    observer: O,
    restore_epsilon: f64,
    scroll: ScrollPolicy,
    state: SyncState,
    session: Option<Session>,
}

impl<E: PlaybackEngine, O: SyncObserver> SyncEngine<E, O> {
    /// Create an engine with no resource loaded.
    ///
    /// The persisted global rate is applied to `engine` right away.
    pub fn new(engine: E, observer: O, store: Rc<dyn KeyValueStore>, options: SyncOptions) -> Self {
        let rates = RateController::new(options.allowed_rates, options.default_rate, store.clone());
        let mut transport = TransportController::new(engine, options.skip);
        transport.apply_rate(rates.current());

        Self {
            transport,
            positions: PositionStore::new(store, options.save_throttle),
            rates,
            observer,
            restore_epsilon: options.restore_epsilon,
            scroll: options.scroll,
            state: SyncState::Uninitialized,
            session: None,
        }
    }

    /// Start tracking `resource`. Any previous resource is unloaded first.
    ///
    /// Sync begins once the engine reports `MetadataReady` for the new media.
    pub fn load(&mut self, resource: Resource) {
        if self.session.is_some() {
            self.unload();
        }
        tracing::debug!(
            "Loaded resource {} ({} segments)",
            resource.key,
            resource.segment_lengths.len()
        );
        self.session = Some(Session {
            resource,
            boundaries: None,
            last_index: None,
        });
        self.state = SyncState::Uninitialized;
    }

    /// Stop tracking the current resource.
    ///
    /// Pending position writes are cancelled and all derived state is dropped.
    pub fn unload(&mut self) {
        self.positions.cancel();
        if let Some(session) = self.session.take() {
            tracing::debug!("Unloaded resource {}", session.resource.key);
        }
        self.state = SyncState::Uninitialized;
    }

    /// Process one event from the playback engine.
    pub fn handle_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::MetadataReady => self.on_metadata_ready(),
            PlaybackEvent::Progress => self.on_tick(),
            PlaybackEvent::Play => self.on_play_state(true),
            PlaybackEvent::Pause => self.on_play_state(false),
            PlaybackEvent::Ended => self.on_ended(),
        }
    }

    fn on_metadata_ready(&mut self) {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!("Metadata ready with no resource loaded");
            return;
        };
        let Some(duration) = self.transport.snapshot().duration else {
            tracing::debug!("Metadata ready without a usable duration, deferring");
            return;
        };

        // New media may come up at the engine's default rate
        self.transport.apply_rate(self.rates.current());

        if let Some(saved) = self.positions.restore(&session.resource.key) {
            let target = clamp_restored(saved, duration, self.restore_epsilon);
            tracing::debug!("Restoring {} to {:.2}s", session.resource.key, target);
            self.transport.seek_absolute(target);
        }

        session.boundaries = Some(BoundaryTable::build(
            &session.resource.segment_lengths,
            duration,
        ));
        session.last_index = None;
        self.state = SyncState::MetadataReady;

        let elapsed = self.transport.snapshot().current_time;
        self.observer
            .on_time_display_change(&format_duration(elapsed), &format_duration(duration));
    }

    fn on_tick(&mut self) {
        if self.state == SyncState::Uninitialized {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let snapshot = self.transport.snapshot();
        let Some(duration) = snapshot.duration else {
            return;
        };
        let t = snapshot.current_time;
        if !t.is_finite() {
            return;
        }

        self.positions.save(&session.resource.key, t);

        self.observer
            .on_time_display_change(&format_duration(t), &format_duration(duration));
        self.observer.on_progress(snapshot.progress());

        let resolved = session.boundaries.as_ref().and_then(|b| b.resolve(t));
        if let Some(index) = resolved {
            if session.last_index != Some(index) {
                let change = HighlightChange {
                    previous: session.last_index,
                    current: index,
                    scroll_into_view: self.scroll.should_scroll(snapshot.playing),
                };
                session.last_index = Some(index);
                self.observer.on_highlight_change(change);
            }
        }

        self.state = if snapshot.playing {
            SyncState::Playing
        } else if self.state == SyncState::Ended && t >= duration {
            SyncState::Ended
        } else {
            SyncState::Paused
        };
    }

    fn on_play_state(&mut self, playing: bool) {
        if self.state == SyncState::Uninitialized {
            return;
        }
        if playing {
            self.state = SyncState::Playing;
        } else {
            self.state = SyncState::Paused;
            self.positions.flush();
        }
    }

    fn on_ended(&mut self) {
        if self.state == SyncState::Uninitialized {
            return;
        }
        self.state = SyncState::Ended;
        self.positions.flush();
    }

    /// Run a transport command (buttons, keys, media keys).
    pub fn execute(&mut self, command: TransportCommand) {
        self.transport.execute(command);
    }

    /// Seek to the start of segment `index`. Unknown segments are ignored.
    pub fn seek_to_segment(&mut self, index: usize) {
        let start = self.boundaries().and_then(|b| b.start_of(index));
        if let Some(start) = start {
            self.transport.seek_absolute(start);
        }
    }

    /// Switch playback rate. Returns the rate in effect afterwards.
    pub fn set_rate(&mut self, candidate: f64) -> f64 {
        let applied = self.rates.set_rate(candidate);
        self.transport.apply_rate(applied);
        applied
    }

    /// Step to the next faster allowed rate.
    pub fn rate_up(&mut self) -> f64 {
        let applied = self.rates.step_up();
        self.transport.apply_rate(applied);
        applied
    }

    /// Step to the next slower allowed rate.
    pub fn rate_down(&mut self) -> f64 {
        let applied = self.rates.step_down();
        self.transport.apply_rate(applied);
        applied
    }

    /// Listen for applied rate changes.
    pub fn subscribe_rate(&mut self, listener: impl FnMut(f64) + 'static) -> RateSubscription {
        self.rates.subscribe(listener)
    }

    pub fn unsubscribe_rate(&mut self, subscription: RateSubscription) {
        self.rates.unsubscribe(subscription);
    }

    /// Write any throttled position now.
    pub fn flush_position(&mut self) {
        self.positions.flush();
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Segment currently highlighted, if any.
    pub fn active_segment(&self) -> Option<usize> {
        self.session.as_ref().and_then(|s| s.last_index)
    }

    pub fn boundaries(&self) -> Option<&BoundaryTable> {
        self.session.as_ref().and_then(|s| s.boundaries.as_ref())
    }

    pub fn resource(&self) -> Option<&Resource> {
        self.session.as_ref().map(|s| &s.resource)
    }

    pub fn rates(&self) -> &RateController {
        &self.rates
    }

    pub fn transport(&self) -> &TransportController<E> {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut TransportController<E> {
        &mut self.transport
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

impl<O: SyncObserver> SyncEngine<SimulatedEngine, O> {
    /// Deliver every event queued by the simulated engine, including events
    /// raised while handling earlier ones. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let events = self.transport.engine_mut().drain_events();
            if events.is_empty() {
                return handled;
            }
            handled += events.len();
            for event in events {
                self.handle_event(event);
            }
        }
    }
}
