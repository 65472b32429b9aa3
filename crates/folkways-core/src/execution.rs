//! Applies chosen actions to the world; only movement has effects here.

use crate::action::{ActionKind, TargetRef};
use crate::agent::{Agent, AgentIdentity};
use crate::entity::Position;
use rand::{rngs::SmallRng, Rng};
use std::sync::Arc;

/// Side length of the square world; wandering is clamped inside it.
pub const WORLD_SIZE: f32 = 1000.0;
/// Maximum distance covered per tick when moving toward a target.
pub const MOVE_SPEED: f32 = 30.0;
/// Targets closer than this are considered reached.
pub const ARRIVAL_DISTANCE: f32 = 10.0;
/// Speed range for untargeted wandering.
pub const WANDER_SPEED_MIN: f32 = 5.0;
pub const WANDER_SPEED_MAX: f32 = 20.0;

/// Execute the agent's current action. `Move` and `Follow` update position;
/// every other kind passes the agent through unchanged.
#[must_use]
pub fn execute_action(agent: &Agent, rng: &mut SmallRng) -> Agent {
    match agent.identity.current_action {
        Some(ActionKind::Move | ActionKind::Follow) => {
            if let TargetRef::Entity(target) = &agent.identity.target {
                move_toward(agent, target.position)
            } else {
                wander(agent, rng)
            }
        }
        _ => agent.clone(),
    }
}

/// Step toward the target position captured at selection time. Within
/// arrival distance nothing moves.
fn move_toward(agent: &Agent, target: Position) -> Agent {
    let position = agent.position();
    let dx = target.x - position.x;
    let dy = target.y - position.y;
    let distance = dx.mul_add(dx, dy * dy).sqrt();
    if distance < ARRIVAL_DISTANCE {
        return agent.clone();
    }
    let step = MOVE_SPEED.min(distance);
    let next = Position::new(
        position.x + dx / distance * step,
        position.y + dy / distance * step,
    );
    reposition(agent, next)
}

/// Random walk for untargeted movement: uniform direction, uniform speed,
/// clamped to the world bounds.
fn wander(agent: &Agent, rng: &mut SmallRng) -> Agent {
    let mut dx: f32 = rng.random_range(-1.0..1.0);
    let mut dy: f32 = rng.random_range(-1.0..1.0);
    let speed: f32 = rng.random_range(WANDER_SPEED_MIN..WANDER_SPEED_MAX);

    let length = dx.mul_add(dx, dy * dy).sqrt();
    if length > 0.0 {
        dx /= length;
        dy /= length;
    }

    let position = agent.position();
    let next = Position::new(
        (position.x + dx * speed).clamp(0.0, WORLD_SIZE),
        (position.y + dy * speed).clamp(0.0, WORLD_SIZE),
    );
    reposition(agent, next)
}

/// Rebuild the entity, identity, and agent records around a new position,
/// preserving the current action and target.
fn reposition(agent: &Agent, position: Position) -> Agent {
    let entity = Arc::new(agent.identity.entity.moved_to(position));
    agent.with_identity(AgentIdentity {
        entity,
        current_action: agent.identity.current_action,
        target: agent.identity.target.clone(),
    })
}
