//! Positions and the identity tuple shared by agents and objects.

use serde::{Deserialize, Serialize};

/// Axis-aligned 2D position in world units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Construct a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx.mul_add(dx, dy * dy).sqrt()
    }
}

/// Identity tuple carried by every agent and object.
///
/// The `id` is stable for the lifetime of the logical entity; the position is
/// snapshotted per tick, so a memory holding an old entity record sees the
/// position at observation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: String,
    pub position: Position,
}

impl Entity {
    /// Construct a new entity record.
    #[must_use]
    pub fn new(id: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }

    /// Produce a replacement record at a new position.
    #[must_use]
    pub fn moved_to(&self, position: Position) -> Self {
        Self {
            id: self.id.clone(),
            position,
        }
    }
}
