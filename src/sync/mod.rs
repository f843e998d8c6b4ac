//! Playback-text synchronization core.
//!
//! # Architecture
//!
//! - `segment_map`: proportional time boundaries per paragraph and lookup
//! - `position`: per-resource position persistence with write throttling
//! - `rate`: allow-listed playback speed, persisted globally
//! - `transport`: clamped seek/skip/play/pause/mute against the engine
//! - `engine`: the [`SyncEngine`] state machine tying the above together
//!
//! Data flows one way: the playback engine emits events, the sync engine
//! resolves the active segment and notifies its observer, the position store
//! persists the offset, and UI controls or the remote bridge go back through
//! the transport controller.

mod engine;
pub mod position;
pub mod rate;
mod segment_map;
pub mod transport;

pub use engine::{
    HighlightChange, Resource, ScrollPolicy, SyncEngine, SyncObserver, SyncOptions, SyncState,
};
pub use position::{PositionStore, ResourceKey, SaveThrottle};
pub use rate::{AllowedRates, RateController, RateSubscription};
pub use segment_map::BoundaryTable;
pub use transport::{SkipDeltas, TransportCommand, TransportController};
