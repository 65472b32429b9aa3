//! Tick orchestration: composes selection, execution, perception, and the
//! clock into the atomic world step, emitting trace events along the way.

use crate::agent::Agent;
use crate::behavior::{select_next_action, SelectionCriteria};
use crate::drive::DriveParameters;
use crate::episode::form_episodic_memories;
use crate::events::{
    agent_entity_record, agent_update_event, object_entity_record, object_update_event,
    NullTraceSink, TraceEvent, TraceSink,
};
use crate::execution::{execute_action, WORLD_SIZE};
use crate::memory::MemoryError;
use crate::perception::process_perceptions;
use crate::world::{AgentId, World};
use folkways_index::IndexError;
use rand::{rngs::SmallRng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors surfaced by the tick pipeline. Configuration and invariant
/// violations are fatal; absent-but-expected inputs never reach here.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Static configuration for a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Distance at which agents perceive others.
    pub perception_radius: f32,
    /// Optional RNG seed for reproducible runs.
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            perception_radius: 10.0,
            rng_seed: None,
        }
    }
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), SimulationError> {
        if !self.perception_radius.is_finite() || self.perception_radius <= 0.0 {
            return Err(SimulationError::InvalidConfig(
                "perception_radius must be positive",
            ));
        }
        Ok(())
    }

    /// Returns the configured RNG, seeding from entropy when no seed is set.
    fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        }
    }
}

/// Per-agent update tuning shared across the population.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NpcUpdateParams {
    pub drive_params: DriveParameters,
    pub familiarity_preference: f32,
    pub social_preference: f32,
    pub randomness: f32,
    pub significance_threshold: f32,
    pub max_sequence_gap: u64,
    pub min_sequence_length: usize,
}

impl Default for NpcUpdateParams {
    fn default() -> Self {
        Self {
            drive_params: DriveParameters::default(),
            familiarity_preference: 0.5,
            social_preference: 0.5,
            randomness: 0.2,
            significance_threshold: 0.3,
            max_sequence_gap: 5,
            min_sequence_length: 2,
        }
    }
}

/// Summary of one processed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub generation: u32,
    pub generation_rolled: bool,
}

/// A running simulation: the world plus tuning, RNG, and the event sink.
pub struct Simulation {
    config: SimulationConfig,
    params: NpcUpdateParams,
    world: World,
    rng: SmallRng,
    sink: Box<dyn TraceSink>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("tick", &self.world.clock().current_tick)
            .field("agent_count", &self.world.agent_count())
            .field("object_count", &self.world.object_count())
            .finish()
    }
}

impl Simulation {
    /// Assemble a simulation with a silent sink.
    pub fn new(
        world: World,
        config: SimulationConfig,
        params: NpcUpdateParams,
    ) -> Result<Self, SimulationError> {
        Self::with_sink(world, config, params, Box::new(NullTraceSink))
    }

    /// Assemble a simulation with the provided trace sink.
    pub fn with_sink(
        world: World,
        config: SimulationConfig,
        params: NpcUpdateParams,
        sink: Box<dyn TraceSink>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let rng = config.seeded_rng();
        Ok(Self {
            config,
            params,
            world,
            rng,
            sink,
        })
    }

    /// Current world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world (for setup and tests).
    #[must_use]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Simulation configuration.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Per-agent update tuning.
    #[must_use]
    pub fn params(&self) -> &NpcUpdateParams {
        &self.params
    }

    /// Replace the trace sink.
    pub fn set_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.sink = sink;
    }

    /// Give the final world back to the caller.
    #[must_use]
    pub fn into_world(self) -> World {
        self.world
    }

    /// Execute one atomic tick: per-agent update, action execution, the
    /// perception sweep, and the clock advance.
    pub fn step(&mut self) -> Result<TickReport, SimulationError> {
        let clock = self.world.clock();
        let current_time = clock.current_tick;
        debug!(tick = current_time, "processing tick");

        self.sink.record(TraceEvent::TickStart {
            tick_number: current_time,
            generation: clock.current_generation,
        });

        // Every agent updates against the same tick-start snapshot; staged
        // replacements are committed only after the whole phase.
        let handles: Vec<AgentId> = self.world.agents().iter_handles().collect();
        let mut staged: Vec<Agent> = Vec::with_capacity(handles.len());
        for agent in self.world.agents().agents() {
            let grown = agent.with_advanced_drives(&self.params.drive_params, 1);
            let remembered = form_episodic_memories(
                &grown,
                current_time,
                self.params.significance_threshold,
                self.params.max_sequence_gap,
                self.params.min_sequence_length,
            )?;
            let criteria = SelectionCriteria {
                current_drives: &remembered.drives,
                familiarity_preference: self.params.familiarity_preference,
                social_preference: self.params.social_preference,
                randomness: self.params.randomness,
            };
            staged.push(select_next_action(
                &remembered,
                &self.world,
                &criteria,
                &mut self.rng,
            ));
        }
        for (&id, agent) in handles.iter().zip(staged) {
            self.world.agents_mut().replace(id, agent);
        }

        // Execution reads only the acting agent and the target snapshots
        // captured at selection.
        for &id in &handles {
            let Some(agent) = self.world.agents().get(id) else {
                continue;
            };
            let event = agent.identity.current_action.map(|action| {
                TraceEvent::ActionExecution {
                    entity_id: agent.id().to_owned(),
                    action_type: action.name().to_owned(),
                    target_id: agent.identity.target.target_id().map(str::to_owned),
                }
            });
            let executed = execute_action(agent, &mut self.rng);
            if let Some(event) = event {
                self.sink.record(event);
            }
            self.world.agents_mut().replace(id, executed);
        }

        process_perceptions(&mut self.world, self.config.perception_radius)?;

        for agent in self.world.agents().iter() {
            self.sink.record(agent_update_event(agent));
        }
        for object in self.world.objects() {
            self.sink.record(object_update_event(object));
        }
        self.sink.record(TraceEvent::TickEnd {
            tick_number: current_time,
            generation: clock.current_generation,
            npc_count: self.world.agent_count(),
            object_count: self.world.object_count(),
        });

        let advanced = clock.advanced();
        let generation_rolled = advanced.current_generation != clock.current_generation;
        self.world.set_clock(advanced);
        if generation_rolled {
            info!(
                tick = advanced.current_tick,
                generation = advanced.current_generation,
                "generation advanced"
            );
        }

        Ok(TickReport {
            tick: advanced.current_tick,
            generation: advanced.current_generation,
            generation_rolled,
        })
    }

    /// Run `ticks` steps bracketed by the simulation start and end events.
    pub fn run(&mut self, ticks: u64) -> Result<(), SimulationError> {
        info!(
            ticks,
            npcs = self.world.agent_count(),
            objects = self.world.object_count(),
            "starting simulation"
        );

        let mut entities: Vec<_> = self
            .world
            .agents()
            .iter()
            .map(agent_entity_record)
            .collect();
        entities.extend(self.world.objects().iter().map(|o| object_entity_record(o)));
        self.sink.record(TraceEvent::SimulationStart {
            npc_count: self.world.agent_count(),
            object_count: self.world.object_count(),
            world_size: WORLD_SIZE,
            entities,
        });

        for _ in 0..ticks {
            self.step()?;
        }

        self.sink.record(TraceEvent::SimulationEnd {
            total_ticks: ticks,
            final_generation: self.world.clock().current_generation,
            npc_count: self.world.agent_count(),
            object_count: self.world.object_count(),
        });
        info!(
            final_tick = self.world.clock().current_tick,
            final_generation = self.world.clock().current_generation,
            "simulation complete"
        );
        Ok(())
    }
}
