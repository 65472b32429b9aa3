//! Core types and tick pipeline shared across the Folkways workspace.
//!
//! The simulation advances an agent population through discrete ticks: drives
//! grow, perceptions fold into episodic memory, and the next action is scored
//! against current drive pressure. Everything here is deterministic given a
//! seeded world.

pub mod action;
pub mod agent;
pub mod behavior;
pub mod drive;
pub mod entity;
pub mod episode;
pub mod events;
pub mod execution;
pub mod impact;
pub mod memory;
pub mod object;
pub mod perception;
pub mod simulation;
pub mod world;

pub use action::{ActionKind, TargetRef};
pub use agent::{Agent, AgentIdentity, AffectiveTrace, Relationship, RelationshipTarget};
pub use behavior::{
    apply_action_impacts, drive_score, generate_memory_options, generate_primitive_options,
    preference_score, select_action, select_next_action, ActionOption, SelectionCriteria,
    OBJECT_RADIUS, SOCIAL_RADIUS,
};
pub use drive::{update_drive, Drive, DriveKind, DriveParameters};
pub use entity::{Entity, Position};
pub use episode::{
    build_action_sequence, combine_impacts, find_similar_episode, form_episodic_memories,
    identify_action_sequences,
};
pub use events::{
    agent_entity_record, agent_update_event, drive_records, object_entity_record,
    object_update_event, DriveRecord, EntityRecord, EntityType, MemoryTraceSink, NullTraceSink,
    PositionRecord, TraceEvent, TraceSink,
};
pub use execution::{
    execute_action, ARRIVAL_DISTANCE, MOVE_SPEED, WANDER_SPEED_MAX, WANDER_SPEED_MIN, WORLD_SIZE,
};
pub use impact::{evaluate_impact, has_emotional_significance, ActionContext};
pub use memory::{
    ActionSequence, ActionStep, MemoryEpisode, MemoryError, PerceptionBuffer, PerceptionEntry,
    WitnessedSequence, MAX_BUFFER, RESERVED_SEQUENCE_ID,
};
pub use object::{ObjectCategory, WorldObject};
pub use perception::{perceptible_pairs, process_perceptions, PerceptionHit};
pub use simulation::{
    NpcUpdateParams, Simulation, SimulationConfig, SimulationError, TickReport,
};
pub use world::{AgentArena, AgentId, SimulationClock, World};
