//! Structured events emitted by the tick orchestrator for the replay trace.

use crate::agent::Agent;
use crate::drive::Drive;
use crate::entity::Position;
use crate::object::WorldObject;
use serde::{Deserialize, Serialize};

/// Which roster an entity belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EntityType {
    #[serde(rename = "NPC")]
    Npc,
    Object,
}

/// Position payload as persisted in the trace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PositionRecord {
    pub x: f32,
    pub y: f32,
}

impl From<Position> for PositionRecord {
    fn from(position: Position) -> Self {
        Self {
            x: position.x,
            y: position.y,
        }
    }
}

/// Drive payload as persisted in the trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriveRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f32,
}

/// Roster entry listed in the simulation-start event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub position: PositionRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drives: Option<Vec<DriveRecord>>,
}

/// The event vocabulary of the replay trace. The sink layer stamps each
/// event with a wall-clock timestamp on receipt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceEvent {
    SimulationStart {
        npc_count: usize,
        object_count: usize,
        world_size: f32,
        entities: Vec<EntityRecord>,
    },
    TickStart {
        tick_number: u64,
        generation: u32,
    },
    EntityUpdate {
        entity_id: String,
        entity_type: EntityType,
        position: PositionRecord,
        #[serde(skip_serializing_if = "Option::is_none")]
        drives: Option<Vec<DriveRecord>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        current_action: Option<String>,
    },
    ActionExecution {
        entity_id: String,
        action_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        target_id: Option<String>,
    },
    TickEnd {
        tick_number: u64,
        generation: u32,
        npc_count: usize,
        object_count: usize,
    },
    SimulationEnd {
        total_ticks: u64,
        final_generation: u32,
        npc_count: usize,
        object_count: usize,
    },
}

/// Render drives for a trace payload.
#[must_use]
pub fn drive_records(drives: &[Drive]) -> Vec<DriveRecord> {
    drives
        .iter()
        .map(|drive| DriveRecord {
            kind: drive.kind.name().to_owned(),
            value: drive.intensity,
        })
        .collect()
}

/// Roster entry for an agent, drives included.
#[must_use]
pub fn agent_entity_record(agent: &Agent) -> EntityRecord {
    EntityRecord {
        id: agent.id().to_owned(),
        entity_type: EntityType::Npc,
        position: agent.position().into(),
        drives: Some(drive_records(&agent.drives)),
    }
}

/// Roster entry for an object.
#[must_use]
pub fn object_entity_record(object: &WorldObject) -> EntityRecord {
    EntityRecord {
        id: object.entity.id.clone(),
        entity_type: EntityType::Object,
        position: object.entity.position.into(),
        drives: None,
    }
}

/// Per-tick state event for an agent.
#[must_use]
pub fn agent_update_event(agent: &Agent) -> TraceEvent {
    TraceEvent::EntityUpdate {
        entity_id: agent.id().to_owned(),
        entity_type: EntityType::Npc,
        position: agent.position().into(),
        drives: Some(drive_records(&agent.drives)),
        current_action: agent
            .identity
            .current_action
            .map(|action| action.name().to_owned()),
    }
}

/// Per-tick state event for an object.
#[must_use]
pub fn object_update_event(object: &WorldObject) -> TraceEvent {
    TraceEvent::EntityUpdate {
        entity_id: object.entity.id.clone(),
        entity_type: EntityType::Object,
        position: object.entity.position.into(),
        drives: None,
        current_action: None,
    }
}

/// Sink invoked by the orchestrator for every produced event.
pub trait TraceSink: Send {
    fn record(&mut self, event: TraceEvent);
}

/// Sink that drops every event (headless runs).
#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn record(&mut self, _event: TraceEvent) {}
}

/// Sink that keeps every event in memory, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for MemoryTraceSink {
    fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}
