//! Playback speed control.
//!
//! Rates come from a fixed allow-list. The last applied rate is persisted
//! globally (not per article) under `playbackRate` and restored at startup.

use std::rc::Rc;

use crate::storage::KeyValueStore;

/// Storage key for the global playback rate.
pub const RATE_KEY: &str = "playbackRate";

/// Rate used when nothing valid is persisted.
pub const NEUTRAL_RATE: f64 = 1.0;

/// Default allow-list of playback multipliers.
pub const DEFAULT_ALLOWED_RATES: [f64; 5] = [0.8, 1.0, 1.1, 1.25, 1.5];

const RATE_TOLERANCE: f64 = 1e-6;

/// Ordered set of permitted playback multipliers.
#[derive(Debug, Clone, PartialEq)]
pub struct AllowedRates(Vec<f64>);

impl AllowedRates {
    /// Build an allow-list, dropping non-positive or non-finite entries.
    ///
    /// Returns `None` if nothing usable remains.
    pub fn new(rates: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut rates: Vec<f64> = rates
            .into_iter()
            .filter(|r| r.is_finite() && *r > 0.0)
            .collect();
        rates.sort_by(f64::total_cmp);
        rates.dedup_by(|a, b| (*a - *b).abs() < RATE_TOLERANCE);
        if rates.is_empty() {
            None
        } else {
            Some(Self(rates))
        }
    }

    /// The allowed entry equal to `rate`, if any.
    pub fn find(&self, rate: f64) -> Option<f64> {
        self.0
            .iter()
            .copied()
            .find(|r| (r - rate).abs() < RATE_TOLERANCE)
    }

    pub fn contains(&self, rate: f64) -> bool {
        self.find(rate).is_some()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Default for AllowedRates {
    fn default() -> Self {
        Self(DEFAULT_ALLOWED_RATES.to_vec())
    }
}

/// Handle returned by [`RateController::subscribe`].
///
/// Listeners are owned by the controller: they stay registered until
/// [`RateController::unsubscribe`] is called or the controller (and with it the
/// owning [`SyncEngine`](crate::SyncEngine)) is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RateSubscription(u64);

type RateListener = Box<dyn FnMut(f64)>;

/// Validates, applies and persists the playback rate.
pub struct RateController {
    allowed: AllowedRates,
    store: Rc<dyn KeyValueStore>,
    current: f64,
    listeners: Vec<(RateSubscription, RateListener)>,
    next_id: u64,
}

impl RateController {
    /// Create the controller, restoring the persisted rate.
    ///
    /// A persisted value that does not parse or is not allowed falls back to
    /// the neutral default, which is the configured `default_rate` (1.0 unless
    /// configured otherwise). When `default_rate` is not allowed, 1.0 is used,
    /// then the slowest allowed rate above 1.0, then the fastest allowed rate.
    pub fn new(allowed: AllowedRates, default_rate: f64, store: Rc<dyn KeyValueStore>) -> Self {
        let fallback = allowed
            .find(default_rate)
            .or_else(|| allowed.find(NEUTRAL_RATE))
            .unwrap_or_else(|| {
                let rates = allowed.as_slice();
                rates
                    .iter()
                    .copied()
                    .find(|r| *r >= NEUTRAL_RATE)
                    .unwrap_or(rates[rates.len() - 1])
            });

        let current = match store.get(RATE_KEY) {
            Some(raw) => match raw.trim().parse::<f64>().ok().and_then(|r| allowed.find(r)) {
                Some(rate) => rate,
                None => {
                    tracing::debug!("Ignoring persisted rate {:?}, using {}", raw, fallback);
                    fallback
                }
            },
            None => fallback,
        };

        Self {
            allowed,
            store,
            current,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Currently active rate.
    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn allowed(&self) -> &AllowedRates {
        &self.allowed
    }

    /// Whether `rate` is the active one (for "selected" markers in a UI).
    pub fn is_active(&self, rate: f64) -> bool {
        (self.current - rate).abs() < RATE_TOLERANCE
    }

    /// Try to switch to `candidate`.
    ///
    /// Rates outside the allow-list are rejected and leave everything
    /// unchanged. Returns the rate in effect after the call.
    pub fn set_rate(&mut self, candidate: f64) -> f64 {
        let Some(rate) = self.allowed.find(candidate) else {
            tracing::debug!("Rejected playback rate {}", candidate);
            return self.current;
        };

        self.current = rate;
        if let Err(e) = self.store.set(RATE_KEY, &rate.to_string()) {
            tracing::warn!("Failed to persist playback rate: {}", e);
        }
        for (_, listener) in &mut self.listeners {
            listener(rate);
        }
        rate
    }

    /// Switch to the next faster allowed rate. Stays put at the top.
    pub fn step_up(&mut self) -> f64 {
        let next = self
            .allowed
            .as_slice()
            .iter()
            .copied()
            .find(|r| *r > self.current + RATE_TOLERANCE);
        match next {
            Some(rate) => self.set_rate(rate),
            None => self.current,
        }
    }

    /// Switch to the next slower allowed rate. Stays put at the bottom.
    pub fn step_down(&mut self) -> f64 {
        let next = self
            .allowed
            .as_slice()
            .iter()
            .rev()
            .copied()
            .find(|r| *r < self.current - RATE_TOLERANCE);
        match next {
            Some(rate) => self.set_rate(rate),
            None => self.current,
        }
    }

    /// Filter offered rate controls down to the allowed ones.
    ///
    /// UI code renders only what this returns, so a disallowed rate never
    /// shows up as a button that silently does nothing.
    pub fn controls(&self, offered: &[f64]) -> Vec<f64> {
        offered
            .iter()
            .copied()
            .filter(|r| self.allowed.contains(*r))
            .collect()
    }

    /// Register a listener called with the new rate after every applied change.
    ///
    /// The listener is dropped together with the controller.
    pub fn subscribe(&mut self, listener: impl FnMut(f64) + 'static) -> RateSubscription {
        let id = RateSubscription(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Unknown handles are ignored.
    pub fn unsubscribe(&mut self, subscription: RateSubscription) {
        self.listeners.retain(|(id, _)| *id != subscription);
    }
}
