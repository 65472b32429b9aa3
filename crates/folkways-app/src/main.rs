//! Command-line shell: bootstraps a random world, runs the simulation, and
//! optionally persists the JSON event trace for the replay viewer.

use anyhow::{bail, Context, Result};
use clap::Parser;
use folkways_core::{
    Agent, AgentIdentity, Drive, DriveKind, DriveParameters, Entity, NpcUpdateParams,
    ObjectCategory, Position, Simulation, SimulationClock, SimulationConfig, World, WorldObject,
};
use folkways_trace::{finish_shared, JsonTraceWriter, SharedTraceSink, SharedTraceWriter};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "folkways", version, about = "Folkways agent-culture simulation")]
struct Cli {
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Number of agents seeded into the world.
    #[arg(long, default_value_t = 12)]
    npcs: usize,

    /// Food objects seeded into the world.
    #[arg(long, default_value_t = 6)]
    food: usize,

    /// Structure objects seeded into the world.
    #[arg(long, default_value_t = 4)]
    structures: usize,

    /// Perception radius in world units.
    #[arg(long, default_value_t = 15.0)]
    perception_radius: f32,

    /// Ticks per generation.
    #[arg(long, default_value_t = 100)]
    ticks_per_generation: u32,

    /// RNG seed for reproducible runs; omitted means entropy-seeded.
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the JSON event trace; omit to run without one.
    #[arg(long)]
    trace: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    if cli.npcs == 0 {
        bail!("at least one NPC is required to bootstrap a world");
    }

    let config = SimulationConfig {
        perception_radius: cli.perception_radius,
        rng_seed: cli.seed,
    };
    let mut bootstrap_rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => {
            let seed: u64 = rand::random();
            SmallRng::seed_from_u64(seed)
        }
    };
    let world = bootstrap_world(&cli, &mut bootstrap_rng);
    info!(
        npcs = world.agent_count(),
        objects = world.object_count(),
        ticks = cli.ticks,
        "bootstrapped world"
    );

    let trace_handle = run(world, config, &cli)?;
    if let Some(shared) = trace_handle {
        let path = finish_shared(shared).context("writing event trace")?;
        info!(path = %path.display(), "trace written");
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn run(world: World, config: SimulationConfig, cli: &Cli) -> Result<Option<SharedTraceWriter>> {
    let (mut simulation, trace_handle) = match &cli.trace {
        Some(path) => {
            let (sink, shared) = SharedTraceSink::share(JsonTraceWriter::new(path));
            let simulation = Simulation::with_sink(world, config, simulation_params(), Box::new(sink))
                .context("assembling simulation")?;
            (simulation, Some(shared))
        }
        None => {
            let simulation = Simulation::new(world, config, simulation_params())
                .context("assembling simulation")?;
            (simulation, None)
        }
    };

    simulation.run(cli.ticks).context("running simulation")?;

    let world = simulation.into_world();
    let episodes: usize = world
        .agents()
        .iter()
        .map(|agent| agent.episodic_memory.len())
        .sum();
    info!(
        final_tick = world.clock().current_tick,
        final_generation = world.clock().current_generation,
        episodes,
        "run finished"
    );
    Ok(trace_handle)
}

/// Update tuning for bootstrap runs: social, slightly adventurous agents
/// with a short memory gap.
fn simulation_params() -> NpcUpdateParams {
    NpcUpdateParams {
        drive_params: DriveParameters {
            base_growth_rate: 0.2,
            intensity_factor: 0.5,
            growth_modifiers: Vec::new(),
        },
        familiarity_preference: 0.6,
        social_preference: 0.7,
        randomness: 0.3,
        significance_threshold: 0.3,
        max_sequence_gap: 3,
        min_sequence_length: 2,
    }
}

fn random_position(rng: &mut SmallRng, min: f32, max: f32) -> Position {
    Position::new(rng.random_range(min..max), rng.random_range(min..max))
}

fn bootstrap_agent(index: usize, rng: &mut SmallRng) -> Agent {
    let entity = Arc::new(Entity::new(
        format!("npc_{index}"),
        random_position(rng, 0.0, 100.0),
    ));
    let drives = [
        DriveKind::Sustenance,
        DriveKind::Shelter,
        DriveKind::Belonging,
        DriveKind::Curiosity,
        DriveKind::Pride,
    ]
    .into_iter()
    .map(|kind| Drive::new(kind, rng.random_range(10.0..40.0)))
    .collect();
    Agent::new(AgentIdentity::idle(entity), drives)
}

fn bootstrap_world(cli: &Cli, rng: &mut SmallRng) -> World {
    let agents: Vec<Agent> = (0..cli.npcs).map(|i| bootstrap_agent(i, rng)).collect();
    let creator = Arc::clone(&agents[0].identity);

    let mut objects = Vec::with_capacity(cli.food + cli.structures);
    for i in 0..cli.food {
        objects.push(Arc::new(WorldObject::new(
            Entity::new(format!("food_{i}"), random_position(rng, 10.0, 90.0)),
            ObjectCategory::Food,
            Arc::clone(&creator),
        )));
    }
    for i in 0..cli.structures {
        objects.push(Arc::new(WorldObject::new(
            Entity::new(format!("shelter_{i}"), random_position(rng, 20.0, 80.0)),
            ObjectCategory::Structure,
            Arc::clone(&creator),
        )));
    }

    World::new(
        SimulationClock::new(0, 1, cli.ticks_per_generation),
        agents,
        objects,
    )
}
