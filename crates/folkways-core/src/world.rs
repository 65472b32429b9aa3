//! World roster, simulation clock, and the agent arena.

use crate::agent::Agent;
use crate::object::WorldObject;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;

new_key_type! {
    /// Stable handle for agents backed by a generational slot map.
    pub struct AgentId;
}

/// Discrete simulation time: the tick counter plus the coarse generation
/// counter derived from it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulationClock {
    pub current_tick: u64,
    pub current_generation: u32,
    pub ticks_per_generation: u32,
}

impl SimulationClock {
    /// Construct a clock. A zero generation length is clamped to one.
    #[must_use]
    pub fn new(current_tick: u64, current_generation: u32, ticks_per_generation: u32) -> Self {
        Self {
            current_tick,
            current_generation,
            ticks_per_generation: ticks_per_generation.max(1),
        }
    }

    /// The clock one tick later; the generation increments exactly when the
    /// new tick is a positive multiple of `ticks_per_generation`.
    #[must_use]
    pub fn advanced(&self) -> Self {
        let current_tick = self.current_tick + 1;
        let rolled = current_tick % u64::from(self.ticks_per_generation) == 0;
        Self {
            current_tick,
            current_generation: if rolled {
                self.current_generation + 1
            } else {
                self.current_generation
            },
            ticks_per_generation: self.ticks_per_generation,
        }
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(0, 1, 100)
    }
}

/// Dense storage with generational handles for agent access. Iteration order
/// is insertion order, which downstream tie-breaking relies on.
#[derive(Debug, Default)]
pub struct AgentArena {
    slots: SlotMap<AgentId, usize>,
    handles: Vec<AgentId>,
    agents: Vec<Agent>,
}

impl AgentArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Returns true when no agents are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Insert a new agent and return its handle.
    pub fn insert(&mut self, agent: Agent) -> AgentId {
        let index = self.agents.len();
        self.agents.push(agent);
        let id = self.slots.insert(index);
        self.handles.push(id);
        id
    }

    /// Returns the dense index for `id`, if present.
    #[must_use]
    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.slots.get(id).copied()
    }

    /// Returns true if `id` refers to a stored agent.
    #[must_use]
    pub fn contains(&self, id: AgentId) -> bool {
        self.slots.contains_key(id)
    }

    /// Borrow the agent for `id`.
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.index_of(id).map(|index| &self.agents[index])
    }

    /// Mutably borrow the agent for `id`.
    #[must_use]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        let index = self.index_of(id)?;
        Some(&mut self.agents[index])
    }

    /// Replace the agent record stored under `id`.
    pub fn replace(&mut self, id: AgentId, agent: Agent) {
        if let Some(index) = self.index_of(id) {
            self.agents[index] = agent;
        }
    }

    /// Iterate over agent handles in dense insertion order.
    pub fn iter_handles(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.handles.iter().copied()
    }

    /// Iterate over agents in dense insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Dense slice of the stored agents.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }
}

/// Aggregate world state advanced by the tick pipeline.
#[derive(Debug)]
pub struct World {
    clock: SimulationClock,
    agents: AgentArena,
    objects: Vec<Arc<WorldObject>>,
}

impl World {
    /// Assemble a world from a bootstrap roster.
    #[must_use]
    pub fn new(clock: SimulationClock, agents: Vec<Agent>, objects: Vec<Arc<WorldObject>>) -> Self {
        let mut arena = AgentArena::new();
        for agent in agents {
            arena.insert(agent);
        }
        Self {
            clock,
            agents: arena,
            objects,
        }
    }

    /// Current clock value.
    #[must_use]
    pub const fn clock(&self) -> SimulationClock {
        self.clock
    }

    /// Replace the clock (used by the tick orchestrator).
    pub fn set_clock(&mut self, clock: SimulationClock) {
        self.clock = clock;
    }

    /// Read-only access to the agent arena.
    #[must_use]
    pub fn agents(&self) -> &AgentArena {
        &self.agents
    }

    /// Mutable access to the agent arena.
    #[must_use]
    pub fn agents_mut(&mut self) -> &mut AgentArena {
        &mut self.agents
    }

    /// The world's objects.
    #[must_use]
    pub fn objects(&self) -> &[Arc<WorldObject>] {
        &self.objects
    }

    /// Number of agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Number of objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Whether an agent with the given entity id is in the roster.
    #[must_use]
    pub fn has_agent_with_id(&self, entity_id: &str) -> bool {
        self.agents.iter().any(|agent| agent.id() == entity_id)
    }

    /// Whether an object with the given entity id is in the roster.
    #[must_use]
    pub fn has_object_with_id(&self, entity_id: &str) -> bool {
        self.objects
            .iter()
            .any(|object| object.entity.id == entity_id)
    }
}
