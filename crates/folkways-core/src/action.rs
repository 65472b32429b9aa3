//! Action vocabulary and target references.

use crate::entity::Entity;
use crate::object::WorldObject;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Closed set of actions an agent can perform or witness.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Move,
    Observe,
    Give,
    Take,
    Rest,
    Build,
    Plant,
    Bury,
    Gesture,
    Follow,
}

impl ActionKind {
    /// Stable human-readable name used in traces and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Move => "Move",
            Self::Observe => "Observe",
            Self::Give => "Give",
            Self::Take => "Take",
            Self::Rest => "Rest",
            Self::Build => "Build",
            Self::Plant => "Plant",
            Self::Bury => "Bury",
            Self::Gesture => "Gesture",
            Self::Follow => "Follow",
        }
    }
}

/// What an action is aimed at. At most one target is carried by construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum TargetRef {
    #[default]
    None,
    Entity(Arc<Entity>),
    Object(Arc<WorldObject>),
}

impl TargetRef {
    /// Returns true when no target is set.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns true for an entity target.
    #[must_use]
    pub fn is_entity(&self) -> bool {
        matches!(self, Self::Entity(_))
    }

    /// The entity id of the target, when it has one.
    #[must_use]
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Entity(entity) => Some(&entity.id),
            Self::Object(object) => Some(&object.entity.id),
        }
    }

    /// The target's entity record, when it has one.
    #[must_use]
    pub fn entity(&self) -> Option<&Arc<Entity>> {
        match self {
            Self::None => None,
            Self::Entity(entity) => Some(entity),
            Self::Object(object) => Some(&object.entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Position;
    use crate::object::ObjectCategory;

    #[test]
    fn target_id_resolves_through_objects() {
        let entity = Arc::new(Entity::new("npc_7", Position::new(0.0, 0.0)));
        let target = TargetRef::Entity(Arc::clone(&entity));
        assert_eq!(target.target_id(), Some("npc_7"));
        assert!(target.is_entity());

        let object = Arc::new(WorldObject::new(
            Entity::new("food_3", Position::new(1.0, 1.0)),
            ObjectCategory::Food,
            Arc::new(crate::agent::AgentIdentity::idle(entity)),
        ));
        let target = TargetRef::Object(object);
        assert_eq!(target.target_id(), Some("food_3"));
        assert!(!target.is_entity());

        assert_eq!(TargetRef::None.target_id(), None);
    }
}
