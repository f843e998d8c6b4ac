//! Listening position persistence.
//!
//! Positions are stored per resource under `playbackPos-<key>` as plain decimal
//! strings. Writes happen from the progress tick handler, so they are throttled:
//! a tick only reaches the store when enough time has passed since the last
//! write or the position jumped (a seek). The skipped value is kept as a
//! pending write and can be flushed on pause/end or cancelled on navigation.

use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::storage::KeyValueStore;

/// Storage key prefix for per-resource positions.
pub const POSITION_KEY_PREFIX: &str = "playbackPos-";

/// Stable identifier of the article whose position is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for an item addressed by its numeric or string id.
    pub fn from_item_id(id: impl fmt::Display) -> Self {
        Self(id.to_string())
    }

    /// Key for an item addressed by its page path (`/items/42`).
    ///
    /// Trailing slashes are ignored so `/items/42/` and `/items/42` share one
    /// position.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        Self(if trimmed.is_empty() { "/" } else { trimmed }.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key used in the persistence layer.
    pub fn storage_key(&self) -> String {
        format!("{}{}", POSITION_KEY_PREFIX, self.0)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Write throttling for [`PositionStore::save`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaveThrottle {
    /// Minimum wall time between two writes for the same resource
    pub min_interval: Duration,
    /// Position change (seconds) that bypasses the interval, e.g. after a seek
    pub min_delta: f64,
}

impl Default for SaveThrottle {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(1000),
            min_delta: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Written {
    key: ResourceKey,
    offset: f64,
    at: Instant,
}

#[derive(Debug, Clone)]
struct Pending {
    key: ResourceKey,
    offset: f64,
}

/// Persists and restores playback offsets keyed by resource.
pub struct PositionStore {
    store: Rc<dyn KeyValueStore>,
    throttle: SaveThrottle,
    last_write: Option<Written>,
    pending: Option<Pending>,
}

impl PositionStore {
    pub fn new(store: Rc<dyn KeyValueStore>, throttle: SaveThrottle) -> Self {
        Self {
            store,
            throttle,
            last_write: None,
            pending: None,
        }
    }

    /// Read the saved offset for `key`.
    ///
    /// Missing, unparsable, negative and non-finite values all come back as
    /// `None`, meaning "start from zero".
    pub fn restore(&self, key: &ResourceKey) -> Option<f64> {
        let raw = self.store.get(&key.storage_key())?;
        match raw.trim().parse::<f64>() {
            Ok(offset) if offset.is_finite() && offset >= 0.0 => Some(offset),
            _ => {
                tracing::debug!("Ignoring invalid saved position for {}: {:?}", key, raw);
                None
            }
        }
    }

    /// Record the current offset for `key`, subject to throttling.
    pub fn save(&mut self, key: &ResourceKey, offset: f64) {
        self.save_at(key, offset, Instant::now());
    }

    /// [`save`](Self::save) with an explicit clock reading.
    pub fn save_at(&mut self, key: &ResourceKey, offset: f64, now: Instant) {
        if !offset.is_finite() || offset < 0.0 {
            tracing::debug!("Not saving invalid offset {} for {}", offset, key);
            return;
        }

        let due = match &self.last_write {
            Some(last) if last.key == *key => {
                now.saturating_duration_since(last.at) >= self.throttle.min_interval
                    || (offset - last.offset).abs() >= self.throttle.min_delta
            }
            _ => true,
        };

        if due {
            self.pending = None;
            self.write(key.clone(), offset, now);
        } else {
            self.pending = Some(Pending {
                key: key.clone(),
                offset,
            });
        }
    }

    /// Write the pending (throttled) offset, if any.
    pub fn flush(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.write(pending.key, pending.offset, Instant::now());
        }
    }

    /// Drop the pending offset without writing it.
    ///
    /// Called when the active resource changes so a late write can never land
    /// on the previous resource after navigation.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(
                "Cancelled pending position write for {} ({:.2}s)",
                pending.key,
                pending.offset
            );
        }
        self.last_write = None;
    }

    /// Forget the saved offset for `key`.
    pub fn clear(&mut self, key: &ResourceKey) {
        if self.pending.as_ref().is_some_and(|p| p.key == *key) {
            self.pending = None;
        }
        if let Err(e) = self.store.remove(&key.storage_key()) {
            tracing::warn!("Failed to clear saved position for {}: {}", key, e);
        }
    }

    /// Whether a throttled write is waiting to be flushed.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn write(&mut self, key: ResourceKey, offset: f64, now: Instant) {
        if let Err(e) = self.store.set(&key.storage_key(), &offset.to_string()) {
            tracing::warn!("Failed to save position for {}: {}", key, e);
        }
        self.last_write = Some(Written {
            key,
            offset,
            at: now,
        });
    }
}

/// Default distance a restored offset keeps from the end of the media.
pub const DEFAULT_RESTORE_EPSILON: f64 = 0.1;

/// Clamp a restored offset so it never lands on or past the end of the media.
///
/// A non-positive or non-finite `epsilon` is replaced by
/// [`DEFAULT_RESTORE_EPSILON`].
///
/// # Arguments
/// * `offset` - Offset read from the store
/// * `duration` - Media duration in seconds
/// * `epsilon` - Distance to keep from the end
pub fn clamp_restored(offset: f64, duration: f64, epsilon: f64) -> f64 {
    let epsilon = if epsilon.is_finite() && epsilon > 0.0 {
        epsilon
    } else {
        DEFAULT_RESTORE_EPSILON
    };
    offset.min(duration - epsilon).max(0.0)
}
