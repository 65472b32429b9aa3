//! Evaluates how an observed action lands on an observer's drives.

use crate::action::{ActionKind, TargetRef};
use crate::agent::Agent;
use crate::drive::{Drive, DriveKind};
use crate::entity::Position;
use crate::memory::PerceptionEntry;

/// Context for evaluating the drive impact of one observed action.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub observer: &'a Agent,
    pub memory: &'a PerceptionEntry,
    pub current_time: u64,
}

impl<'a> ActionContext<'a> {
    /// Construct an evaluation context.
    #[must_use]
    pub fn new(observer: &'a Agent, memory: &'a PerceptionEntry, current_time: u64) -> Self {
        Self {
            observer,
            memory,
            current_time,
        }
    }

    /// Familiarity with the acting identity's entity.
    fn actor_familiarity(&self) -> f32 {
        self.observer
            .entity_familiarity(&self.memory.actor.entity.id)
    }

    /// Familiarity with the place the action happened: the target entity's
    /// position, or the actor's own position when the target is not an
    /// entity.
    fn location_familiarity(&self) -> f32 {
        let position = self.action_position();
        self.observer.location_familiarity(&position)
    }

    fn action_position(&self) -> Position {
        match &self.memory.target {
            TargetRef::Entity(entity) => entity.position,
            _ => self.memory.actor.entity.position,
        }
    }
}

/// Base per-action deltas before amplification. Negative means relief.
fn base_impacts(context: &ActionContext<'_>) -> Vec<Drive> {
    match context.memory.action {
        ActionKind::Observe => {
            // Less familiar things satisfy curiosity more.
            let actor_familiarity = context.actor_familiarity();
            let location_familiarity = context.location_familiarity();
            let familiarity_factor = 1.0 - (actor_familiarity + location_familiarity) / 2.0;
            vec![Drive::new(
                DriveKind::Curiosity,
                -0.1 * (1.0 + familiarity_factor),
            )]
        }
        ActionKind::Follow => {
            // More familiar company satisfies belonging more.
            let actor_familiarity = context.actor_familiarity();
            vec![Drive::new(
                DriveKind::Belonging,
                -0.2 * (1.0 + actor_familiarity),
            )]
        }
        ActionKind::Rest => {
            let location_familiarity = context.location_familiarity();
            let mut impacts = vec![Drive::new(
                DriveKind::Sustenance,
                -0.3 * (1.0 + location_familiarity),
            )];
            // Well-known places double as shelter.
            if location_familiarity > 0.3 {
                impacts.push(Drive::new(DriveKind::Shelter, -0.2 * location_familiarity));
            }
            impacts
        }
        _ => Vec::new(),
    }
}

/// Scale each delta by the observer's current pressure on the matching
/// drive; deltas for drives the observer does not carry pass through.
fn amplify_by_current_drives(impacts: Vec<Drive>, current_drives: &[Drive]) -> Vec<Drive> {
    impacts
        .into_iter()
        .map(|impact| {
            match current_drives
                .iter()
                .find(|drive| drive.kind == impact.kind)
            {
                Some(drive) => Drive::new(
                    impact.kind,
                    impact.intensity * (1.0 + drive.intensity / 100.0),
                ),
                None => impact,
            }
        })
        .collect()
}

/// Evaluate the full impact of an observation on the observer's drives.
#[must_use]
pub fn evaluate_impact(context: &ActionContext<'_>) -> Vec<Drive> {
    amplify_by_current_drives(base_impacts(context), &context.observer.drives)
}

/// Whether a set of per-entry impact vectors is worth remembering: the mean
/// absolute delta across every impact must reach the threshold. No impacts
/// at all means nothing to remember.
#[must_use]
pub fn has_emotional_significance(impact_sets: &[Vec<Drive>], significance_threshold: f32) -> bool {
    let mut total_magnitude = 0.0_f32;
    let mut total_impacts = 0_usize;
    for impacts in impact_sets {
        for impact in impacts {
            total_magnitude += impact.intensity.abs();
            total_impacts += 1;
        }
    }
    if total_impacts == 0 {
        return false;
    }
    total_magnitude / total_impacts as f32 >= significance_threshold
}
