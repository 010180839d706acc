// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline engine façade.
//!
//! [`TimelineEngine`] is the only type external collaborators talk to. It
//! owns all phase/keyframe storage and the playback clock; the scene never
//! holds animation state and is borrowed per call. Everything runs on one
//! logical thread: mutation, interpolation and the per-frame tick all happen
//! inside the host's callback/event flow.

use crate::capture::CaptureThrottle;
use crate::clock::{Clock, SystemClock};
use crate::phase::{ObjectId, Phase, PhaseId, Timeline, DEFAULT_PHASE_DURATION_MS};
use crate::pose::Pose;
use crate::scene::{PoseObserver, Scene};
use crate::transport::Transport;

/// The animation/timeline engine.
///
/// Malformed input never raises an error: unknown IDs, out-of-range indices
/// and empty-phase playback all degrade to logged no-ops. Consumers treat
/// lack of visible effect as the error signal (check [`Self::is_playing`]
/// after [`Self::play`]).
pub struct TimelineEngine<C: Clock = SystemClock> {
    timeline: Timeline,
    transport: Transport,
    throttle: CaptureThrottle,
    clock: C,
}

impl TimelineEngine<SystemClock> {
    /// Create an engine driven by the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for TimelineEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TimelineEngine<C> {
    /// Create an engine driven by the given clock
    pub fn with_clock(clock: C) -> Self {
        Self {
            timeline: Timeline::new(),
            transport: Transport::new(),
            throttle: CaptureThrottle::new(),
            clock,
        }
    }

    // --- phase store ---

    /// All phases in display order
    pub fn phases(&self) -> &[Phase] {
        self.timeline.phases()
    }

    /// Replace the whole phase list (external synchronization)
    pub fn set_phases(&mut self, phases: Vec<Phase>) {
        self.timeline.set_phases(phases);
    }

    /// Index of the currently selected phase
    pub fn current_phase_index(&self) -> usize {
        self.timeline.current_phase_index()
    }

    /// Append a new phase with the default duration and return its ID
    pub fn add_phase(&mut self, name: impl Into<String>) -> PhaseId {
        self.add_phase_with_duration(name, DEFAULT_PHASE_DURATION_MS)
    }

    /// Append a new phase with an explicit duration and return its ID
    pub fn add_phase_with_duration(&mut self, name: impl Into<String>, duration_ms: u64) -> PhaseId {
        self.timeline.add_phase(name, duration_ms)
    }

    /// Remove a phase; unknown IDs are ignored
    pub fn delete_phase(&mut self, id: &PhaseId) {
        self.timeline.delete_phase(id);
    }

    /// Rename a phase; unknown IDs are ignored
    pub fn rename_phase(&mut self, id: &PhaseId, name: impl Into<String>) {
        self.timeline.rename_phase(id, name);
    }

    /// Change a phase's duration; unknown IDs are ignored
    pub fn set_phase_duration(&mut self, id: &PhaseId, duration_ms: u64) {
        self.timeline.set_phase_duration(id, duration_ms);
    }

    /// Remove every phase and fully stop playback
    pub fn clear_phases(&mut self, scene: &mut dyn Scene) {
        self.timeline.clear();
        self.stop(scene);
    }

    // --- keyframes ---

    /// Append a keyframe to the named phase.
    ///
    /// When `timestamp_ms` is omitted it is derived from the active clock:
    /// elapsed time since recording or playback started, 0 otherwise. The
    /// phase duration auto-extends to the latest sample.
    pub fn add_keyframe(
        &mut self,
        phase_id: &PhaseId,
        object_id: ObjectId,
        pose: Pose,
        timestamp_ms: Option<u64>,
    ) {
        let ts = timestamp_ms.unwrap_or_else(|| self.current_time_ms());
        match self.timeline.phase_mut(phase_id) {
            Some(phase) => phase.push_keyframe(object_id, ts, pose),
            None => tracing::debug!("keyframe ignored: unknown phase {}", phase_id),
        }
    }

    /// Snapshot the current pose of every tracked object into the named
    /// phase, at the given or clock-derived timestamp.
    pub fn capture_current_positions(
        &mut self,
        scene: &dyn Scene,
        phase_id: &PhaseId,
        timestamp_ms: Option<u64>,
    ) {
        if self.timeline.phase(phase_id).is_none() {
            tracing::debug!("capture ignored: unknown phase {}", phase_id);
            return;
        }
        let ts = timestamp_ms.unwrap_or_else(|| self.current_time_ms());
        for id in scene.object_ids() {
            let Some(pose) = scene.pose(&id) else {
                continue;
            };
            self.add_keyframe(phase_id, id, pose, Some(ts));
        }
    }

    // --- playback ---

    /// Start playback of a phase.
    ///
    /// Defaults to the current phase; resumes from `from_ms` when given,
    /// else from the paused offset. Refuses silently when the index is out
    /// of range, the phase has no keyframes, or a recording is active
    /// (playback and recording are mutually exclusive). Applies the first
    /// frame synchronously and starts the host frame loop.
    pub fn play(&mut self, scene: &mut dyn Scene, phase_index: Option<usize>, from_ms: Option<u64>) {
        if self.transport.is_recording() {
            tracing::debug!("play refused: recording is active");
            return;
        }
        let index = phase_index.unwrap_or_else(|| self.timeline.current_phase_index());
        let name = match self.timeline.phase_at(index) {
            Some(phase) if phase.keyframes.is_empty() => {
                tracing::debug!("play refused: phase {} has no keyframes", index);
                return;
            }
            Some(phase) => phase.name.clone(),
            None => {
                tracing::debug!("play refused: phase index {} out of range", index);
                return;
            }
        };

        self.timeline.select_phase(index);
        self.transport.begin_play(self.clock.now_ms(), from_ms);
        scene.start_frame_loop();
        tracing::info!("playback started: {}", name);
        self.tick(scene);
    }

    /// Per-frame callback body.
    ///
    /// Computes the elapsed time once, applies interpolated poses to every
    /// tracked object, triggers one redraw, and on reaching the phase
    /// duration cancels the frame loop and finishes to idle. Does nothing
    /// unless playing.
    pub fn tick(&mut self, scene: &mut dyn Scene) {
        let duration = match self.timeline.current_phase() {
            Some(phase) => phase.duration_ms,
            None => return,
        };
        let Some(elapsed) = self.transport.playback_elapsed(self.clock.now_ms(), duration) else {
            return;
        };

        self.apply_poses(scene, self.timeline.current_phase_index(), elapsed);

        if elapsed >= duration {
            scene.cancel_frame_loop();
            self.transport.finish();
            tracing::info!("playback finished");
        }
    }

    /// Suspend playback, cancelling the pending frame callback. No-op
    /// unless playing.
    pub fn pause(&mut self, scene: &mut dyn Scene) {
        if !self.transport.is_playing() {
            return;
        }
        scene.cancel_frame_loop();
        let duration = self.timeline.current_phase().map_or(0, |p| p.duration_ms);
        self.transport.pause(self.clock.now_ms(), duration);
        tracing::debug!("playback paused at {} ms", self.transport.current_time(self.clock.now_ms(), duration));
    }

    /// Full rewind: pause, reset the selection to phase 0 at offset 0, and
    /// apply the t=0 poses of phase 0.
    pub fn stop(&mut self, scene: &mut dyn Scene) {
        self.pause(scene);
        self.transport.finish();
        if !self.timeline.phases().is_empty() {
            self.timeline.select_phase(0);
            self.seek(scene, 0, 0);
        }
    }

    /// Apply the interpolated poses of a phase at an arbitrary time.
    ///
    /// Pure pose application: playback state is untouched, so scrubbing is
    /// safe at any time, including mid-playback. Out-of-range indices are
    /// ignored.
    pub fn seek(&self, scene: &mut dyn Scene, phase_index: usize, time_ms: u64) {
        if self.timeline.phase_at(phase_index).is_none() {
            tracing::debug!("seek ignored: phase index {} out of range", phase_index);
            return;
        }
        self.apply_poses(scene, phase_index, time_ms);
    }

    fn apply_poses(&self, scene: &mut dyn Scene, phase_index: usize, time_ms: u64) {
        let Some(phase) = self.timeline.phase_at(phase_index) else {
            return;
        };
        for id in scene.object_ids() {
            if let Some(pose) = phase.pose_at(&id, time_ms) {
                scene.set_pose(&id, pose);
            }
        }
        scene.request_redraw();
    }

    // --- recording ---

    /// Begin recording into a phase.
    ///
    /// Cancels any active playback first (playback and recording are
    /// mutually exclusive), selects the phase, resets the capture throttle
    /// and sets the recording epoch. Does not drive a frame loop; hosts
    /// poll [`Self::current_time_ms`] for display.
    pub fn start_recording(&mut self, scene: &mut dyn Scene, phase_index: usize) {
        if self.timeline.phase_at(phase_index).is_none() {
            tracing::debug!("recording refused: phase index {} out of range", phase_index);
            return;
        }
        if self.transport.is_playing() {
            scene.cancel_frame_loop();
            self.transport.finish();
        }
        self.timeline.select_phase(phase_index);
        self.throttle.reset();
        self.transport.begin_recording(self.clock.now_ms());
        tracing::info!("recording started on phase {}", phase_index);
    }

    /// Clear the recording flag. No-op unless recording.
    pub fn stop_recording(&mut self) {
        if !self.transport.is_recording() {
            return;
        }
        self.transport.end_recording();
        tracing::info!("recording stopped");
    }

    fn auto_capture(&mut self, object_id: &ObjectId, pose: Pose) {
        if !self.transport.is_recording() {
            return;
        }
        let now_ts = self.current_time_ms();
        if !self.throttle.accept(object_id, now_ts) {
            return;
        }
        let Some(phase_id) = self.timeline.current_phase().map(|p| p.id.clone()) else {
            return;
        };
        self.add_keyframe(&phase_id, object_id.clone(), pose, Some(now_ts));
    }

    // --- introspection ---

    /// Whether playback is active
    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    /// Whether recording is active
    pub fn is_recording(&self) -> bool {
        self.transport.is_recording()
    }

    /// Phase-relative time for the current mode: playback elapsed while
    /// playing (clamped to the phase duration), recording elapsed while
    /// recording, else the last paused offset (0 if never played).
    pub fn current_time_ms(&self) -> u64 {
        let duration = self.timeline.current_phase().map_or(0, |p| p.duration_ms);
        self.transport.current_time(self.clock.now_ms(), duration)
    }
}

impl<C: Clock> PoseObserver for TimelineEngine<C> {
    fn pose_changed(&mut self, id: &ObjectId, pose: Pose) {
        self.auto_capture(id, pose);
    }
}
