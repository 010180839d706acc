// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation timeline engine for the PitchPlay tactics board.
//!
//! The board editor lets a coach place movable objects on a 2D pitch and
//! define multi-phase animations: sequences of recorded or captured poses
//! played back with linear interpolation. This crate is the engine behind
//! that feature:
//! - Phase and keyframe storage with silent-no-op mutation
//! - Pose interpolation
//! - The playback clock state machine
//! - Recording with throttled auto-capture
//! - Seek/scrub
//!
//! ## Architecture
//!
//! The engine owns all animation state; the render surface is an external
//! collaborator reached through the [`Scene`] trait and borrowed per call.
//! Everything runs on one logical thread, driven by the host invoking
//! [`TimelineEngine::tick`] once per frame while playback is active.
//! Rendering, export and persistence live outside this crate and consume
//! the serialized phase shape.

pub mod capture;
pub mod clock;
pub mod engine;
pub mod phase;
pub mod pose;
pub mod scene;
pub mod transport;

pub use capture::{CaptureThrottle, MIN_SAMPLE_INTERVAL_MS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::TimelineEngine;
pub use phase::{Keyframe, ObjectId, Phase, PhaseId, Timeline, DEFAULT_PHASE_DURATION_MS};
pub use pose::Pose;
pub use scene::{PoseObserver, Scene};
pub use transport::{Transport, TransportState};
