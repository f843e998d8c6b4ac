//! readalong - keeps audio playback aligned with the paragraphs of an article.
//!
//! The crate is built around a single-threaded, event-driven [`SyncEngine`]:
//! the host feeds it [`PlaybackEvent`]s from a [`PlaybackEngine`], and the
//! engine resolves the active paragraph, persists the listening position and
//! reports highlight/time changes through a [`SyncObserver`].
//!
//! # Modules
//! - `sync`: segment boundaries, position persistence, rate control,
//!   transport and the sync state machine
//! - `playback`: the playback engine abstraction and a headless engine
//! - `storage`: string key-value persistence backends
//! - `remote`: media-key / remote-control bridge and keyboard shortcuts
//! - `render`: time formatting and the terminal progress bar
//! - `text`: splitting article text into paragraph segments
//! - `config`: TOML configuration

pub mod config;
pub mod playback;
pub mod remote;
pub mod render;
pub mod storage;
pub mod sync;
pub mod text;

pub use config::Config;
pub use playback::{PlaybackEngine, PlaybackEvent, PlaybackSnapshot, SimulatedEngine};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use sync::{
    BoundaryTable, HighlightChange, PositionStore, RateController, Resource, ResourceKey,
    ScrollPolicy, SyncEngine, SyncObserver, SyncOptions, SyncState, TransportCommand,
    TransportController,
};
