//! Agents, their identities, and asymmetric relationships.

use crate::action::{ActionKind, TargetRef};
use crate::drive::{Drive, DriveKind, DriveParameters};
use crate::entity::{Entity, Position};
use crate::memory::{MemoryEpisode, PerceptionBuffer, WitnessedSequence};
use crate::object::WorldObject;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The slice of an agent referenced from memories: entity plus current
/// intent. Deliberately omits drives, perception, and memory so that a memory
/// can reference an actor without creating a cycle back into the actor's full
/// record. Identities are value-snapshots; updating an agent produces a new
/// identity without disturbing memories holding the old one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentIdentity {
    pub entity: Arc<Entity>,
    pub current_action: Option<ActionKind>,
    pub target: TargetRef,
}

impl AgentIdentity {
    /// Identity with no current action.
    #[must_use]
    pub fn idle(entity: Arc<Entity>) -> Self {
        Self {
            entity,
            current_action: None,
            target: TargetRef::None,
        }
    }

    /// Identity carrying a chosen action and its target.
    #[must_use]
    pub fn acting(entity: Arc<Entity>, action: ActionKind, target: TargetRef) -> Self {
        Self {
            entity,
            current_action: Some(action),
            target,
        }
    }
}

/// Historical emotional impact of a relationship for one drive kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AffectiveTrace {
    pub drive_kind: DriveKind,
    pub value: f32,
}

/// What a relationship points at: another entity, an object, or a region of
/// the world. A `Location` matches any point within its radius.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RelationshipTarget {
    Entity(Arc<Entity>),
    Object(Arc<WorldObject>),
    Location { position: Position, radius: f32 },
}

impl RelationshipTarget {
    /// Whether this target covers the given position. Entities and objects
    /// match only their exact position; locations match their disc.
    #[must_use]
    pub fn contains(&self, position: &Position) -> bool {
        match self {
            Self::Entity(entity) => entity.position == *position,
            Self::Object(object) => object.entity.position == *position,
            Self::Location {
                position: center,
                radius,
            } => {
                let dx = position.x - center.x;
                let dy = position.y - center.y;
                dx.mul_add(dx, dy * dy) <= radius * radius
            }
        }
    }
}

/// One agent's view of a relationship. Relationships are asymmetric: each
/// side holds its own record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    pub target: RelationshipTarget,
    /// Exposure level in `[0, 1]`.
    pub familiarity: f32,
    pub affective_traces: Vec<AffectiveTrace>,
    pub last_interaction: u64,
    pub interaction_count: u32,
}

impl Relationship {
    /// Construct a new relationship record.
    #[must_use]
    pub fn new(
        target: RelationshipTarget,
        familiarity: f32,
        affective_traces: Vec<AffectiveTrace>,
        last_interaction: u64,
        interaction_count: u32,
    ) -> Self {
        Self {
            target,
            familiarity,
            affective_traces,
            last_interaction,
            interaction_count,
        }
    }
}

/// A simulated character: identity plus the inner state the identity omits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub identity: Arc<AgentIdentity>,
    pub drives: Vec<Drive>,
    pub perception: PerceptionBuffer,
    pub episodic_memory: Vec<Arc<MemoryEpisode>>,
    pub observed_behaviors: Vec<WitnessedSequence>,
    pub relationships: Vec<Relationship>,
}

impl Agent {
    /// Construct an agent with empty buffers and memories.
    #[must_use]
    pub fn new(identity: AgentIdentity, drives: Vec<Drive>) -> Self {
        Self {
            identity: Arc::new(identity),
            drives,
            perception: PerceptionBuffer::default(),
            episodic_memory: Vec::new(),
            observed_behaviors: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// The agent's stable entity id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.identity.entity.id
    }

    /// The agent's current position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.identity.entity.position
    }

    /// Replacement record with every drive advanced by natural growth.
    #[must_use]
    pub fn with_advanced_drives(&self, params: &DriveParameters, ticks_elapsed: u64) -> Self {
        let drives = self
            .drives
            .iter()
            .map(|drive| crate::drive::update_drive(*drive, params, ticks_elapsed))
            .collect();
        Self {
            drives,
            ..self.clone()
        }
    }

    /// Replacement record carrying a new identity.
    #[must_use]
    pub fn with_identity(&self, identity: AgentIdentity) -> Self {
        Self {
            identity: Arc::new(identity),
            ..self.clone()
        }
    }

    /// Familiarity with another entity, 0 when no relationship exists.
    #[must_use]
    pub fn entity_familiarity(&self, entity_id: &str) -> f32 {
        self.relationships
            .iter()
            .find_map(|relationship| match &relationship.target {
                RelationshipTarget::Entity(entity) if entity.id == entity_id => {
                    Some(relationship.familiarity)
                }
                _ => None,
            })
            .unwrap_or(0.0)
    }

    /// Familiarity with the location covering `position`, 0 when none does.
    #[must_use]
    pub fn location_familiarity(&self, position: &Position) -> f32 {
        self.relationships
            .iter()
            .find_map(|relationship| match &relationship.target {
                target @ RelationshipTarget::Location { .. } if target.contains(position) => {
                    Some(relationship.familiarity)
                }
                _ => None,
            })
            .unwrap_or(0.0)
    }
}
