// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pose values carried by keyframes.

use serde::{Deserialize, Serialize};

fn default_opacity() -> f64 {
    1.0
}

/// Position, opacity and rotation of a board object at an instant.
///
/// The serialized field names (`left`, `top`, `angle`) match the board's
/// persisted document format; `opacity` and `angle` may be absent on input
/// and default to 1 and 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Horizontal position on the board
    #[serde(rename = "left")]
    pub x: f64,
    /// Vertical position on the board
    #[serde(rename = "top")]
    pub y: f64,
    /// Opacity in `[0, 1]`
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Rotation in degrees
    #[serde(rename = "angle", default)]
    pub rotation: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            opacity: 1.0,
            rotation: 0.0,
        }
    }
}

impl Pose {
    /// Create a pose at a position with default opacity and rotation
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Linearly interpolate every field toward `other`.
    ///
    /// Rotation interpolates as a plain scalar, not through the shortest
    /// angular path: a 350° to 10° transition sweeps the long way. Known
    /// limitation; existing animations depend on it.
    pub fn lerp(&self, other: &Pose, t: f64) -> Pose {
        Pose {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
            opacity: lerp(self.opacity, other.opacity, t),
            rotation: lerp(self.rotation, other.rotation, t),
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
