// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback clock state machine.
//!
//! All time bookkeeping lives in one owned struct, transitioned only through
//! the operations below. Every method takes the current monotonic reading in
//! milliseconds, so the machine runs against any [`crate::clock::Clock`].

/// Playback state of the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    /// Not playing; the resume offset is the last paused position
    #[default]
    Idle,
    /// Advancing against the wall clock
    Playing,
    /// Suspended at a remembered offset
    Paused,
}

/// Epoch and offset bookkeeping for playback plus the orthogonal recording
/// flag.
///
/// Elapsed time is always recomputed from the wall-clock epoch, never
/// accumulated per tick, so dropped frames slow apparent playback without
/// desynchronizing state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transport {
    state: TransportState,
    /// Wall-clock reading when playback last started
    epoch_ms: u64,
    /// Phase-relative offset at `epoch_ms`
    base_offset_ms: u64,
    /// Offset to resume from while paused or idle
    paused_at_ms: u64,
    /// Wall-clock reading when recording started, while recording
    recording_epoch_ms: Option<u64>,
}

impl Transport {
    /// Create an idle transport at offset 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Current playback state
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Whether the transport is in `Playing`
    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    /// Whether the recording flag is set
    pub fn is_recording(&self) -> bool {
        self.recording_epoch_ms.is_some()
    }

    /// Enter `Playing`, resuming from `from_ms` when given, else from the
    /// previously paused offset (0 if never played).
    pub fn begin_play(&mut self, now_ms: u64, from_ms: Option<u64>) {
        self.base_offset_ms = from_ms.unwrap_or(self.paused_at_ms);
        self.epoch_ms = now_ms;
        self.state = TransportState::Playing;
    }

    /// Elapsed phase time while playing, clamped to `[0, duration]`.
    /// `None` unless in `Playing`.
    pub fn playback_elapsed(&self, now_ms: u64, duration_ms: u64) -> Option<u64> {
        if !self.is_playing() {
            return None;
        }
        let elapsed = self.base_offset_ms + now_ms.saturating_sub(self.epoch_ms);
        Some(elapsed.min(duration_ms))
    }

    /// Suspend playback, remembering the clamped offset. No-op unless
    /// playing.
    pub fn pause(&mut self, now_ms: u64, duration_ms: u64) {
        if let Some(elapsed) = self.playback_elapsed(now_ms, duration_ms) {
            self.paused_at_ms = elapsed;
            self.state = TransportState::Paused;
        }
    }

    /// Terminal transition to `Idle` with the resume offset cleared.
    ///
    /// Used both when playback reaches the end of a phase and for a full
    /// rewind; reaching the end is not a pause.
    pub fn finish(&mut self) {
        self.state = TransportState::Idle;
        self.paused_at_ms = 0;
    }

    /// Set the recording flag and epoch
    pub fn begin_recording(&mut self, now_ms: u64) {
        self.recording_epoch_ms = Some(now_ms);
    }

    /// Clear the recording flag
    pub fn end_recording(&mut self) {
        self.recording_epoch_ms = None;
    }

    /// Elapsed time since the recording epoch, while recording
    pub fn recording_elapsed(&self, now_ms: u64) -> Option<u64> {
        self.recording_epoch_ms
            .map(|epoch| now_ms.saturating_sub(epoch))
    }

    /// Phase-relative time for the current mode: playback elapsed while
    /// playing, recording elapsed while recording, else the last paused
    /// offset.
    pub fn current_time(&self, now_ms: u64, duration_ms: u64) -> u64 {
        if let Some(elapsed) = self.playback_elapsed(now_ms, duration_ms) {
            return elapsed;
        }
        if let Some(elapsed) = self.recording_elapsed(now_ms) {
            return elapsed;
        }
        self.paused_at_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle_at_zero() {
        let transport = Transport::new();
        assert_eq!(transport.state(), TransportState::Idle);
        assert_eq!(transport.current_time(500, 1000), 0);
    }

    #[test]
    fn test_play_elapsed_is_clamped_to_duration() {
        let mut transport = Transport::new();
        transport.begin_play(100, None);
        assert_eq!(transport.playback_elapsed(350, 1000), Some(250));
        assert_eq!(transport.playback_elapsed(5000, 1000), Some(1000));
    }

    #[test]
    fn test_pause_then_resume_keeps_offset() {
        let mut transport = Transport::new();
        transport.begin_play(0, None);
        transport.pause(400, 1000);
        assert_eq!(transport.state(), TransportState::Paused);
        assert_eq!(transport.current_time(9999, 1000), 400);

        // Resuming starts from the paused offset
        transport.begin_play(2000, None);
        assert_eq!(transport.playback_elapsed(2100, 1000), Some(500));
    }

    #[test]
    fn test_explicit_from_overrides_paused_offset() {
        let mut transport = Transport::new();
        transport.begin_play(0, None);
        transport.pause(400, 1000);
        transport.begin_play(1000, Some(700));
        assert_eq!(transport.playback_elapsed(1000, 1000), Some(700));
    }

    #[test]
    fn test_pause_when_not_playing_is_noop() {
        let mut transport = Transport::new();
        transport.pause(100, 1000);
        assert_eq!(transport.state(), TransportState::Idle);
    }

    #[test]
    fn test_finish_is_terminal_and_rewinds() {
        let mut transport = Transport::new();
        transport.begin_play(0, None);
        transport.finish();
        assert_eq!(transport.state(), TransportState::Idle);
        assert_eq!(transport.current_time(9999, 1000), 0);
    }

    #[test]
    fn test_recording_time_basis() {
        let mut transport = Transport::new();
        transport.begin_recording(300);
        assert!(transport.is_recording());
        assert_eq!(transport.current_time(450, 1000), 150);

        transport.end_recording();
        assert!(!transport.is_recording());
        assert_eq!(transport.current_time(450, 1000), 0);
    }

    #[test]
    fn test_playback_takes_precedence_over_paused_offset() {
        let mut transport = Transport::new();
        transport.begin_play(0, Some(200));
        assert_eq!(transport.current_time(100, 1000), 300);
    }
}
