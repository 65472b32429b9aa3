//! Inanimate world objects and their categories.

use crate::agent::AgentIdentity;
use crate::entity::Entity;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Closed set of object categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ObjectCategory {
    Food,
    Structure,
    Tool,
    Burial,
    Plant,
    Marker,
}

impl ObjectCategory {
    /// Stable human-readable name used in traces and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Structure => "Structure",
            Self::Tool => "Tool",
            Self::Burial => "Burial",
            Self::Plant => "Plant",
            Self::Marker => "Marker",
        }
    }
}

/// An object placed in the world. Objects remember the identity of their
/// creator but carry no back-pointer into any agent's full record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldObject {
    pub entity: Arc<Entity>,
    pub category: ObjectCategory,
    pub created_by: Arc<AgentIdentity>,
}

impl WorldObject {
    /// Construct a new object record.
    #[must_use]
    pub fn new(entity: Entity, category: ObjectCategory, created_by: Arc<AgentIdentity>) -> Self {
        Self {
            entity: Arc::new(entity),
            category,
            created_by,
        }
    }
}
