//! Perception sweep: who sees what, and folding sightings into buffers.

use crate::action::{ActionKind, TargetRef};
use crate::memory::PerceptionEntry;
use crate::world::World;
use folkways_index::{IndexError, ProximityIndex, SparseGridIndex};
use std::sync::Arc;
use tracing::debug;

/// One observer/observed pair within perception range.
#[derive(Debug, Clone)]
pub struct PerceptionHit {
    /// Dense index of the observing agent in world order.
    pub observer_index: usize,
    /// The observed agent's entity or the observed object.
    pub observed: TargetRef,
    pub distance: f32,
}

/// Enumerate every ordered pair `(observer, observed, distance)` with the
/// observer an agent, the observed any other agent or object, and Euclidean
/// distance within `radius`. Self-pairs are excluded; output order is
/// implementation-defined. Nothing is retained between calls.
pub fn perceptible_pairs(world: &World, radius: f32) -> Result<Vec<PerceptionHit>, IndexError> {
    let agents = world.agents();
    let agent_count = agents.len();
    if agent_count == 0 {
        return Ok(Vec::new());
    }

    let mut positions: Vec<(f32, f32)> = Vec::with_capacity(agent_count + world.object_count());
    for agent in agents.iter() {
        let position = agent.position();
        positions.push((position.x, position.y));
    }
    for object in world.objects() {
        let position = object.entity.position;
        positions.push((position.x, position.y));
    }

    let mut index = SparseGridIndex::new(radius);
    index.rebuild(&positions)?;

    let radius_sq = radius * radius;
    let mut hits = Vec::new();
    for (observer_index, _) in agents.iter().enumerate() {
        index.neighbors_within(observer_index, radius_sq, &mut |other_index, dist_sq| {
            let observed = if other_index < agent_count {
                TargetRef::Entity(Arc::clone(&agents.agents()[other_index].identity.entity))
            } else {
                TargetRef::Object(Arc::clone(&world.objects()[other_index - agent_count]))
            };
            hits.push(PerceptionHit {
                observer_index,
                observed,
                distance: dist_sq.into_inner().sqrt(),
            });
        });
    }
    Ok(hits)
}

/// Run the sweep and append an observation entry to every observer's buffer,
/// all stamped with the world's current tick. Returns the number of entries
/// appended.
pub fn process_perceptions(world: &mut World, radius: f32) -> Result<usize, IndexError> {
    let current_time = world.clock().current_tick;
    let hits = perceptible_pairs(world, radius)?;
    if hits.is_empty() {
        return Ok(0);
    }

    let agent_count = world.agent_count();
    let mut grouped: Vec<Vec<Arc<PerceptionEntry>>> = vec![Vec::new(); agent_count];
    for hit in hits {
        let observer = &world.agents().agents()[hit.observer_index];
        grouped[hit.observer_index].push(Arc::new(PerceptionEntry::new(
            current_time,
            Arc::clone(&observer.identity),
            ActionKind::Observe,
            hit.observed,
        )));
    }

    let mut appended = 0;
    let handles: Vec<_> = world.agents().iter_handles().collect();
    for (index, entries) in grouped.into_iter().enumerate() {
        if entries.is_empty() {
            continue;
        }
        appended += entries.len();
        if let Some(agent) = world.agents_mut().get_mut(handles[index]) {
            agent.perception = agent.perception.extended(entries);
        }
    }

    debug!(tick = current_time, appended, "perception sweep");
    Ok(appended)
}
