// SPDX-License-Identifier: MIT OR Apache-2.0
//! Throttled sampling of live pose changes while recording.

use crate::phase::ObjectId;
use indexmap::IndexMap;

/// Minimum spacing between accepted samples of one object, in milliseconds.
///
/// Continuous drag gestures fire pose-change notifications every frame;
/// this floor keeps recordings from oversampling them.
pub const MIN_SAMPLE_INTERVAL_MS: u64 = 80;

/// Per-object debounce for auto-captured keyframes
#[derive(Debug, Default)]
pub struct CaptureThrottle {
    last_accepted: IndexMap<ObjectId, u64>,
}

impl CaptureThrottle {
    /// Create an empty throttle
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a sample for `id` at `now_ts` may become a keyframe.
    ///
    /// The first sample per object is always accepted; after that a sample
    /// is accepted only when at least [`MIN_SAMPLE_INTERVAL_MS`] has passed
    /// since the last accepted one. Accepting records the timestamp.
    pub fn accept(&mut self, id: &ObjectId, now_ts: u64) -> bool {
        if let Some(&last) = self.last_accepted.get(id) {
            if now_ts.saturating_sub(last) < MIN_SAMPLE_INTERVAL_MS {
                return false;
            }
        }
        self.last_accepted.insert(id.clone(), now_ts);
        true
    }

    /// Forget all accepted timestamps (new recording session)
    pub fn reset(&mut self) {
        self.last_accepted.clear();
    }
}
