//! 3D marker positions.

use serde::{Deserialize, Serialize};

/// A marker position in capture space.
///
/// `(0, 0, 0)` is reserved: capture systems write it when a marker was
/// not seen in a frame, so it never denotes a real position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    /// The "not captured this frame" sentinel.
    pub const MISSING: Point3D = Point3D {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Whether this is the dropped-sample sentinel.
    pub fn is_missing(&self) -> bool {
        *self == Self::MISSING
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point3D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}
