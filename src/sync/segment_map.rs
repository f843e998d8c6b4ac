//! Segment time boundaries.
//!
//! Spreads the media duration over the article's paragraphs in proportion to
//! their character counts and resolves a playback timestamp back to the
//! paragraph being read.

/// Cumulative end timestamps, one per segment.
///
/// Built once per load from the segment lengths and the media duration; a new
/// resource gets a new table rather than an updated one.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryTable {
    ends: Vec<f64>,
    duration: f64,
}

impl BoundaryTable {
    /// Build the table for `lengths` spread over `duration` seconds.
    ///
    /// `ends[i] = sum(lengths[..=i]) / max(sum(lengths), 1) * duration`. The final
    /// entry is pinned to `duration` so rounding (or an all-empty article) can
    /// never leave a gap at the tail.
    ///
    /// # Arguments
    /// * `lengths` - Character count of each segment, in document order
    /// * `duration` - Total media duration in seconds
    pub fn build(lengths: &[usize], duration: f64) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };

        let total = lengths.iter().sum::<usize>().max(1) as f64;
        let mut acc = 0usize;
        let mut ends: Vec<f64> = lengths
            .iter()
            .map(|&len| {
                acc += len;
                (acc as f64 / total) * duration
            })
            .collect();

        if let Some(last) = ends.last_mut() {
            *last = duration;
        }

        Self { ends, duration }
    }

    /// Resolve `t` to the index of the segment playing at that time.
    ///
    /// Returns the first segment whose end boundary is `>= t`. Past the final
    /// boundary (trailing silence, float tail) the last segment stays active.
    /// Returns `None` only when there are no segments.
    pub fn resolve(&self, t: f64) -> Option<usize> {
        if self.ends.is_empty() {
            return None;
        }
        // ends is non-decreasing, so `end < t` holds for a prefix
        let idx = self.ends.partition_point(|&end| end < t);
        Some(idx.min(self.ends.len() - 1))
    }

    /// Start time of segment `index` (the previous segment's end).
    pub fn start_of(&self, index: usize) -> Option<f64> {
        if index >= self.ends.len() {
            return None;
        }
        Some(if index == 0 { 0.0 } else { self.ends[index - 1] })
    }

    /// End time of segment `index`.
    pub fn end_of(&self, index: usize) -> Option<f64> {
        self.ends.get(index).copied()
    }

    /// All end boundaries in segment order.
    pub fn ends(&self) -> &[f64] {
        &self.ends
    }

    /// Duration the table was built for.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// Whether the table has no segments.
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }
}
