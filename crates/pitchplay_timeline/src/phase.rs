// SPDX-License-Identifier: MIT OR Apache-2.0
//! Phases, keyframes and the timeline store.

use crate::pose::Pose;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Duration of a newly created phase when none is given
pub const DEFAULT_PHASE_DURATION_MS: u64 = 2000;

/// Stable identity of a board object, assigned by the scene
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub String);

impl ObjectId {
    /// Wrap a scene-assigned identity
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a phase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseId(pub String);

impl PhaseId {
    /// Create a new random phase ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for PhaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A timestamped pose sample for one object within a phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Identity of the sampled object
    #[serde(rename = "objectId")]
    pub object_id: ObjectId,
    /// Phase-relative time of the sample in milliseconds
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
    /// The sampled pose
    #[serde(rename = "properties")]
    pub pose: Pose,
}

/// A named, timed animation segment containing keyframes for one or more
/// objects.
///
/// Keyframes are stored in insertion order; interpolation sorts the frames
/// of one object lazily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Unique phase ID
    pub id: PhaseId,
    /// Phase name
    pub name: String,
    /// Phase duration in milliseconds, always >= the latest keyframe
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// Keyframes in this phase
    pub keyframes: Vec<Keyframe>,
}

impl Phase {
    /// Create a new empty phase
    pub fn new(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            id: PhaseId::new(),
            name: name.into(),
            duration_ms,
            keyframes: Vec::new(),
        }
    }

    /// Append a keyframe.
    ///
    /// The duration auto-extends to the latest recorded sample; it never
    /// shrinks.
    pub fn push_keyframe(&mut self, object_id: ObjectId, timestamp_ms: u64, pose: Pose) {
        self.keyframes.push(Keyframe {
            object_id,
            timestamp_ms,
            pose,
        });
        self.duration_ms = self.duration_ms.max(timestamp_ms);
    }

    /// Keyframes of one object, sorted by timestamp ascending
    fn object_keyframes(&self, object_id: &ObjectId) -> Vec<&Keyframe> {
        let mut frames: Vec<&Keyframe> = self
            .keyframes
            .iter()
            .filter(|k| k.object_id == *object_id)
            .collect();
        frames.sort_by_key(|k| k.timestamp_ms);
        frames
    }

    /// Interpolated pose of an object at a phase-relative time.
    ///
    /// Returns `None` when the object has no keyframes in this phase (the
    /// object is unaffected). Time is clamped to `[0, duration]`; before
    /// the first keyframe the first pose holds, after the last the last
    /// pose holds.
    pub fn pose_at(&self, object_id: &ObjectId, time_ms: u64) -> Option<Pose> {
        let frames = self.object_keyframes(object_id);
        if frames.is_empty() {
            return None;
        }

        let time = time_ms.min(self.duration_ms);

        let (from, to) = match frames.iter().position(|k| k.timestamp_ms >= time) {
            // Time is past all keyframes: hold the last value
            None => (frames[frames.len() - 1], frames[frames.len() - 1]),
            // Time is before or at the first keyframe: hold the first value
            Some(0) => (frames[0], frames[0]),
            Some(idx) => (frames[idx - 1], frames[idx]),
        };

        if from.timestamp_ms == to.timestamp_ms {
            // Same keyframe or coincident timestamps
            return Some(from.pose);
        }

        let span = (to.timestamp_ms - from.timestamp_ms) as f64;
        let t = ((time - from.timestamp_ms) as f64 / span).clamp(0.0, 1.0);
        Some(from.pose.lerp(&to.pose, t))
    }
}

/// Ordered collection of phases plus the current selection.
///
/// Phase insertion order is meaningful: index equals display order.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    phases: Vec<Phase>,
    current_phase_index: usize,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// All phases in display order
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Index of the currently selected phase (0 when empty)
    pub fn current_phase_index(&self) -> usize {
        self.current_phase_index
    }

    /// The currently selected phase, if any
    pub fn current_phase(&self) -> Option<&Phase> {
        self.phases.get(self.current_phase_index)
    }

    /// Phase by display index
    pub fn phase_at(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    /// Phase by ID
    pub fn phase(&self, id: &PhaseId) -> Option<&Phase> {
        self.phases.iter().find(|p| p.id == *id)
    }

    /// Mutable phase by ID
    pub fn phase_mut(&mut self, id: &PhaseId) -> Option<&mut Phase> {
        self.phases.iter_mut().find(|p| p.id == *id)
    }

    /// Select a phase by index; out-of-range indices are ignored
    pub fn select_phase(&mut self, index: usize) {
        if index < self.phases.len() {
            self.current_phase_index = index;
        } else {
            tracing::debug!("select ignored: phase index {} out of range", index);
        }
    }

    /// Append a new phase and return its ID
    pub fn add_phase(&mut self, name: impl Into<String>, duration_ms: u64) -> PhaseId {
        let phase = Phase::new(name, duration_ms);
        let id = phase.id.clone();
        self.phases.push(phase);
        id
    }

    /// Rename a phase; unknown IDs are ignored
    pub fn rename_phase(&mut self, id: &PhaseId, name: impl Into<String>) {
        match self.phase_mut(id) {
            Some(phase) => phase.name = name.into(),
            None => tracing::debug!("rename ignored: unknown phase {}", id),
        }
    }

    /// Change a phase's duration; unknown IDs are ignored
    pub fn set_phase_duration(&mut self, id: &PhaseId, duration_ms: u64) {
        match self.phase_mut(id) {
            Some(phase) => phase.duration_ms = duration_ms,
            None => tracing::debug!("duration change ignored: unknown phase {}", id),
        }
    }

    /// Remove a phase, clamping the current index into range
    pub fn delete_phase(&mut self, id: &PhaseId) {
        let before = self.phases.len();
        self.phases.retain(|p| p.id != *id);
        if self.phases.len() == before {
            tracing::debug!("delete ignored: unknown phase {}", id);
        }
        self.clamp_index();
    }

    /// Replace the whole phase list, clamping the current index
    pub fn set_phases(&mut self, phases: Vec<Phase>) {
        self.phases = phases;
        self.clamp_index();
    }

    /// Remove every phase and reset the selection
    pub fn clear(&mut self) {
        self.phases.clear();
        self.current_phase_index = 0;
    }

    fn clamp_index(&mut self) {
        let max = self.phases.len().saturating_sub(1);
        self.current_phase_index = self.current_phase_index.min(max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(id: &str) -> ObjectId {
        ObjectId::new(id)
    }

    fn phase_with_x_ramp() -> (Phase, ObjectId) {
        // x goes 0 -> 100 over the first second of a 2 s phase
        let mut phase = Phase::new("Ramp", 2000);
        let id = obj("player-1");
        phase.push_keyframe(id.clone(), 0, Pose::at(0.0, 0.0));
        phase.push_keyframe(id.clone(), 1000, Pose::at(100.0, 0.0));
        (phase, id)
    }

    #[test]
    fn test_lerp_exact() {
        let (phase, id) = phase_with_x_ramp();
        let pose = phase.pose_at(&id, 250).unwrap();
        assert_eq!(pose.x, 25.0);
    }

    #[test]
    fn test_interpolation_is_deterministic() {
        let (phase, id) = phase_with_x_ramp();
        assert_eq!(phase.pose_at(&id, 337), phase.pose_at(&id, 337));
    }

    #[test]
    fn test_boundary_hold() {
        let mut phase = Phase::new("Hold", 2000);
        let id = obj("player-1");
        phase.push_keyframe(id.clone(), 200, Pose::at(10.0, 10.0));
        phase.push_keyframe(id.clone(), 800, Pose::at(90.0, 90.0));

        // Before the first keyframe the first pose holds
        assert_eq!(phase.pose_at(&id, 0).unwrap().x, 10.0);
        // Past the last keyframe the last pose holds
        assert_eq!(phase.pose_at(&id, 1500).unwrap().x, 90.0);
        // Past the duration, time clamps
        assert_eq!(phase.pose_at(&id, 99999).unwrap().x, 90.0);
    }

    #[test]
    fn test_single_keyframe_holds_everywhere() {
        let mut phase = Phase::new("Single", 1000);
        let id = obj("ball");
        phase.push_keyframe(id.clone(), 400, Pose::at(5.0, 6.0));
        for t in [0, 399, 400, 401, 1000] {
            assert_eq!(phase.pose_at(&id, t).unwrap(), Pose::at(5.0, 6.0));
        }
    }

    #[test]
    fn test_coincident_timestamps_return_a_pose_unchanged() {
        let mut phase = Phase::new("Coincident", 1000);
        let id = obj("player-1");
        phase.push_keyframe(id.clone(), 500, Pose::at(1.0, 1.0));
        phase.push_keyframe(id.clone(), 500, Pose::at(2.0, 2.0));
        let pose = phase.pose_at(&id, 500).unwrap();
        // No division by zero; one of the coincident poses comes back as-is
        assert!(pose.x.is_finite());
        assert_eq!(pose, Pose::at(1.0, 1.0));
    }

    #[test]
    fn test_unsorted_insertion_interpolates_correctly() {
        let mut phase = Phase::new("Unsorted", 1000);
        let id = obj("player-1");
        phase.push_keyframe(id.clone(), 1000, Pose::at(100.0, 0.0));
        phase.push_keyframe(id.clone(), 0, Pose::at(0.0, 0.0));
        assert_eq!(phase.pose_at(&id, 500).unwrap().x, 50.0);
    }

    #[test]
    fn test_object_without_keyframes_is_unaffected() {
        let (phase, _) = phase_with_x_ramp();
        assert!(phase.pose_at(&obj("ghost"), 500).is_none());
    }

    #[test]
    fn test_duration_auto_extends_and_never_shrinks() {
        let mut phase = Phase::new("Grow", 2000);
        let id = obj("player-1");
        phase.push_keyframe(id.clone(), 5000, Pose::default());
        assert_eq!(phase.duration_ms, 5000);
        // A later, smaller timestamp never shrinks the duration
        phase.push_keyframe(id, 100, Pose::default());
        assert_eq!(phase.duration_ms, 5000);
    }

    #[test]
    fn test_delete_phase_clamps_current_index() {
        let mut timeline = Timeline::new();
        timeline.add_phase("A", 1000);
        timeline.add_phase("B", 1000);
        let last = timeline.add_phase("C", 1000);
        timeline.select_phase(2);

        timeline.delete_phase(&last);
        assert_eq!(timeline.current_phase_index(), 1);

        timeline.set_phases(Vec::new());
        assert_eq!(timeline.current_phase_index(), 0);
    }

    #[test]
    fn test_unknown_phase_mutations_are_noops() {
        let mut timeline = Timeline::new();
        timeline.add_phase("A", 1000);
        let ghost = PhaseId::new();

        timeline.rename_phase(&ghost, "B");
        timeline.set_phase_duration(&ghost, 123);
        timeline.delete_phase(&ghost);

        assert_eq!(timeline.phases().len(), 1);
        assert_eq!(timeline.phases()[0].name, "A");
        assert_eq!(timeline.phases()[0].duration_ms, 1000);
    }

    #[test]
    fn test_set_phases_clamps_index() {
        let mut timeline = Timeline::new();
        for name in ["A", "B", "C"] {
            timeline.add_phase(name, 1000);
        }
        timeline.select_phase(2);
        timeline.set_phases(vec![Phase::new("Only", 500)]);
        assert_eq!(timeline.current_phase_index(), 0);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut phase = Phase::new("Opening move", 3000);
        phase.push_keyframe(obj("player-1"), 0, Pose::at(10.0, 20.0));
        phase.push_keyframe(
            obj("player-1"),
            1500,
            Pose {
                x: 40.0,
                y: 60.0,
                opacity: 0.5,
                rotation: 45.0,
            },
        );
        phase.push_keyframe(obj("ball"), 800, Pose::at(55.0, 33.0));

        let json = serde_json::to_string(&phase).unwrap();
        let loaded: Phase = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, phase);
    }

    #[test]
    fn test_serde_field_names_match_document_format() {
        let mut phase = Phase::new("Named", 1000);
        phase.push_keyframe(
            obj("player-7"),
            250,
            Pose {
                x: 1.0,
                y: 2.0,
                opacity: 0.75,
                rotation: 30.0,
            },
        );

        let value = serde_json::to_value(&phase).unwrap();
        assert_eq!(value["duration"], 1000);
        let kf = &value["keyframes"][0];
        assert_eq!(kf["objectId"], "player-7");
        assert_eq!(kf["timestamp"], 250);
        assert_eq!(kf["properties"]["left"], 1.0);
        assert_eq!(kf["properties"]["top"], 2.0);
        assert_eq!(kf["properties"]["opacity"], 0.75);
        assert_eq!(kf["properties"]["angle"], 30.0);
    }

    #[test]
    fn test_serde_optional_pose_fields_default() {
        let json = r#"{
            "id": "phase-1",
            "name": "Legacy",
            "duration": 2000,
            "keyframes": [
                {"objectId": "player-1", "timestamp": 0, "properties": {"left": 3.0, "top": 4.0}}
            ]
        }"#;
        let phase: Phase = serde_json::from_str(json).unwrap();
        let pose = phase.keyframes[0].pose;
        assert_eq!(pose.opacity, 1.0);
        assert_eq!(pose.rotation, 0.0);
    }
}
