// SPDX-License-Identifier: MIT OR Apache-2.0
//! External scene collaborator contract.

use crate::phase::ObjectId;
use crate::pose::Pose;

/// The render surface the engine drives.
///
/// Identity is the scene's responsibility: every tracked object carries a
/// stable [`ObjectId`] for its whole lifetime. The engine performs no
/// fallback lookup through other identity fields.
///
/// The frame loop methods wrap the host's repeating per-frame scheduler.
/// While the loop is running the host invokes
/// [`TimelineEngine::tick`](crate::engine::TimelineEngine::tick) once per
/// frame; cancelling must take effect synchronously so no stale callback
/// chain keeps applying poses.
pub trait Scene {
    /// Stable IDs of all tracked objects
    fn object_ids(&self) -> Vec<ObjectId>;

    /// Current pose of an object, `None` for unknown IDs
    fn pose(&self, id: &ObjectId) -> Option<Pose>;

    /// Write an object's pose; unknown IDs are ignored
    fn set_pose(&mut self, id: &ObjectId, pose: Pose);

    /// Ask the surface to repaint
    fn request_redraw(&mut self);

    /// Start invoking the engine's tick once per frame
    fn start_frame_loop(&mut self);

    /// Cancel the pending per-frame callback
    fn cancel_frame_loop(&mut self);
}

/// Subscription interface for "pose changed by user interaction"
/// notifications.
///
/// The engine implements this; the host registers the engine with its scene
/// at construction and deregisters it on teardown.
pub trait PoseObserver {
    /// Called whenever direct interaction moves a tracked object
    fn pose_changed(&mut self, id: &ObjectId, pose: Pose);
}
