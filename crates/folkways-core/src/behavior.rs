//! Action-selection: option generation, scoring, and the choice itself.

use crate::action::{ActionKind, TargetRef};
use crate::agent::{Agent, AgentIdentity};
use crate::drive::{Drive, DriveKind};
use crate::object::ObjectCategory;
use crate::world::World;
use ordered_float::OrderedFloat;
use rand::{rngs::SmallRng, Rng};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::debug;

/// Other agents within this range yield social primitive options.
pub const SOCIAL_RADIUS: f32 = 10.0;
/// Objects within this range yield object primitive options.
pub const OBJECT_RADIUS: f32 = 5.0;

/// Drives below this magnitude are ignored when scoring options.
const DRIVE_SCORE_FLOOR: f32 = 0.1;
/// Score weight of the familiarity preference for memory-derived options.
const FAMILIARITY_WEIGHT: f32 = 10.0;
/// Score weight of the social preference for entity-targeted options.
const SOCIAL_WEIGHT: f32 = 5.0;

/// A candidate action with its targets and expected drive deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOption {
    pub action: ActionKind,
    pub target: TargetRef,
    pub expected_impacts: Vec<Drive>,
    pub from_memory: bool,
}

impl ActionOption {
    /// Primitive option produced from spatial context.
    #[must_use]
    pub fn primitive(action: ActionKind, target: TargetRef, expected_impacts: Vec<Drive>) -> Self {
        Self {
            action,
            target,
            expected_impacts,
            from_memory: false,
        }
    }

    /// Option replayed from a remembered episode.
    #[must_use]
    pub fn remembered(action: ActionKind, target: TargetRef, expected_impacts: Vec<Drive>) -> Self {
        Self {
            action,
            target,
            expected_impacts,
            from_memory: true,
        }
    }
}

/// Weights steering the choice among scored options.
#[derive(Debug, Clone, Copy)]
pub struct SelectionCriteria<'a> {
    pub current_drives: &'a [Drive],
    /// Preference for remembered over novel actions, in `[0, 1]`.
    pub familiarity_preference: f32,
    /// Preference for social over solitary actions, in `[0, 1]`.
    pub social_preference: f32,
    /// Width of the stochastic choice window, in `[0, 1]`.
    pub randomness: f32,
}

/// Generate candidate actions from spatial context alone, in a fixed order:
/// nearby agents (world order), nearby objects (world order), then the
/// untargeted fallbacks. Downstream tie-breaking relies on this order.
#[must_use]
pub fn generate_primitive_options(agent: &Agent, world: &World) -> Vec<ActionOption> {
    let mut options = Vec::new();
    let own_position = agent.position();

    for other in world.agents().iter() {
        if other.id() == agent.id() {
            continue;
        }
        let entity = Arc::clone(&other.identity.entity);
        if own_position.distance_to(&entity.position) > SOCIAL_RADIUS {
            continue;
        }
        options.push(ActionOption::primitive(
            ActionKind::Follow,
            TargetRef::Entity(Arc::clone(&entity)),
            vec![Drive::new(DriveKind::Belonging, -0.3)],
        ));
        options.push(ActionOption::primitive(
            ActionKind::Observe,
            TargetRef::Entity(entity),
            vec![Drive::new(DriveKind::Curiosity, -0.2)],
        ));
    }

    for object in world.objects() {
        if own_position.distance_to(&object.entity.position) > OBJECT_RADIUS {
            continue;
        }
        options.push(ActionOption::primitive(
            ActionKind::Observe,
            TargetRef::Object(Arc::clone(object)),
            vec![Drive::new(DriveKind::Curiosity, -0.2)],
        ));
        match object.category {
            ObjectCategory::Food => {
                options.push(ActionOption::primitive(
                    ActionKind::Take,
                    TargetRef::Object(Arc::clone(object)),
                    vec![Drive::new(DriveKind::Sustenance, -0.5)],
                ));
            }
            ObjectCategory::Structure => {
                options.push(ActionOption::primitive(
                    ActionKind::Rest,
                    TargetRef::Object(Arc::clone(object)),
                    vec![
                        Drive::new(DriveKind::Shelter, -0.4),
                        Drive::new(DriveKind::Sustenance, -0.3),
                    ],
                ));
            }
            _ => {}
        }
    }

    options.push(ActionOption::primitive(
        ActionKind::Move,
        TargetRef::None,
        vec![Drive::new(DriveKind::Curiosity, -0.2)],
    ));
    options.push(ActionOption::primitive(
        ActionKind::Build,
        TargetRef::None,
        vec![
            Drive::new(DriveKind::Shelter, -0.3),
            Drive::new(DriveKind::Pride, -0.2),
        ],
    ));
    options.push(ActionOption::primitive(
        ActionKind::Gesture,
        TargetRef::None,
        vec![Drive::new(DriveKind::Pride, -0.3)],
    ));

    options
}

/// Replay the opening step of every sufficiently reinforced episode whose
/// target still resolves in the current world.
#[must_use]
pub fn generate_memory_options(agent: &Agent, world: &World) -> Vec<ActionOption> {
    let mut options = Vec::new();

    for episode in &agent.episodic_memory {
        if episode.repetition_count < 2 {
            continue;
        }
        let Some(first_step) = episode.sequence.steps.first() else {
            continue;
        };
        let entry = &first_step.entry;

        let target_resolves = match &entry.target {
            TargetRef::None => true,
            TargetRef::Entity(entity) => world.has_agent_with_id(&entity.id),
            TargetRef::Object(object) => world.has_object_with_id(&object.entity.id),
        };
        if !target_resolves {
            continue;
        }

        options.push(ActionOption::remembered(
            entry.action,
            entry.target.clone(),
            episode.drive_impacts.clone(),
        ));
    }

    options
}

/// How well an option's expected relief lines up with current drive
/// pressure: a more negative impact on a more intense drive scores higher.
#[must_use]
pub fn drive_score(option: &ActionOption, current_drives: &[Drive]) -> f32 {
    let mut total = 0.0_f32;
    for drive in current_drives {
        if drive.intensity.abs() < DRIVE_SCORE_FLOOR {
            continue;
        }
        for impact in &option.expected_impacts {
            if impact.kind == drive.kind {
                total += -impact.intensity * drive.intensity;
            }
        }
    }
    total
}

/// Fixed bonuses for remembered and social options.
#[must_use]
pub fn preference_score(option: &ActionOption, criteria: &SelectionCriteria<'_>) -> f32 {
    let mut score = 0.0_f32;
    if option.from_memory {
        score += criteria.familiarity_preference * FAMILIARITY_WEIGHT;
    }
    if option.target.is_entity() {
        score += criteria.social_preference * SOCIAL_WEIGHT;
    }
    score
}

/// Score all options and pick one. With positive randomness the pick is
/// uniform among the top `1 + floor(randomness * 10)`; otherwise the best
/// option wins, with ties broken by generation order (stable sort).
#[must_use]
pub fn select_action<'a>(
    options: &'a [ActionOption],
    criteria: &SelectionCriteria<'_>,
    rng: &mut SmallRng,
) -> Option<&'a ActionOption> {
    if options.is_empty() {
        return None;
    }

    let mut scored: Vec<(usize, f32)> = options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            (
                index,
                drive_score(option, criteria.current_drives) + preference_score(option, criteria),
            )
        })
        .collect();
    scored.sort_by_key(|&(_, score)| Reverse(OrderedFloat(score)));

    let pick = if criteria.randomness > 0.0 && scored.len() > 1 {
        let top_n = scored
            .len()
            .min(1 + (criteria.randomness * 10.0).floor() as usize);
        rng.random_range(0..top_n)
    } else {
        0
    };
    Some(&options[scored[pick].0])
}

/// Choose the agent's next action against the provided world snapshot,
/// producing a replacement agent whose identity carries the new intent.
/// Drives and memory are untouched; with no options the agent is returned
/// unchanged.
#[must_use]
pub fn select_next_action(
    agent: &Agent,
    world: &World,
    criteria: &SelectionCriteria<'_>,
    rng: &mut SmallRng,
) -> Agent {
    let mut options = generate_primitive_options(agent, world);
    options.extend(generate_memory_options(agent, world));

    let Some(selected) = select_action(&options, criteria, rng) else {
        return agent.clone();
    };

    debug!(
        agent = agent.id(),
        action = selected.action.name(),
        target = selected.target.target_id().unwrap_or("-"),
        from_memory = selected.from_memory,
        "selected action"
    );

    agent.with_identity(AgentIdentity::acting(
        Arc::clone(&agent.identity.entity),
        selected.action,
        selected.target.clone(),
    ))
}

/// Apply an option's expected impacts to an agent's drive levels, scaled by
/// `effectiveness` and clamped to `[0, 100]`. Provided for callers that
/// settle actions outside the tick pipeline; the pipeline itself leaves
/// drive reduction to future work and only grows drives over time.
#[must_use]
pub fn apply_action_impacts(agent: &Agent, option: &ActionOption, effectiveness: f32) -> Agent {
    let drives = agent
        .drives
        .iter()
        .map(|drive| {
            match option
                .expected_impacts
                .iter()
                .find(|impact| impact.kind == drive.kind)
            {
                Some(impact) => Drive::new(
                    drive.kind,
                    (drive.intensity + impact.intensity * effectiveness).clamp(0.0, 100.0),
                ),
                None => *drive,
            }
        })
        .collect();
    Agent {
        drives,
        ..agent.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, Position};
    use crate::episode::{build_action_sequence, combine_impacts};
    use crate::memory::{MemoryEpisode, PerceptionEntry};
    use crate::object::{ObjectCategory, WorldObject};
    use crate::world::SimulationClock;
    use rand::SeedableRng;

    fn agent_at(id: &str, x: f32, y: f32, drives: Vec<Drive>) -> Agent {
        Agent::new(
            AgentIdentity::idle(Arc::new(Entity::new(id, Position::new(x, y)))),
            drives,
        )
    }

    fn object_at(id: &str, x: f32, y: f32, category: ObjectCategory) -> Arc<WorldObject> {
        let creator = Arc::new(AgentIdentity::idle(Arc::new(Entity::new(
            "npc_creator",
            Position::new(0.0, 0.0),
        ))));
        Arc::new(WorldObject::new(
            Entity::new(id, Position::new(x, y)),
            category,
            creator,
        ))
    }

    fn no_rng() -> SmallRng {
        SmallRng::seed_from_u64(0)
    }

    #[test]
    fn primitive_options_follow_the_fixed_order() {
        let chooser = agent_at("npc_me", 0.0, 0.0, Vec::new());
        let world = World::new(
            SimulationClock::default(),
            vec![
                chooser.clone(),
                agent_at("npc_near", 6.0, 0.0, Vec::new()),
                agent_at("npc_far", 50.0, 0.0, Vec::new()),
            ],
            vec![
                object_at("food_1", 3.0, 0.0, ObjectCategory::Food),
                object_at("shelter_1", 0.0, 4.0, ObjectCategory::Structure),
                object_at("marker_1", 2.0, 2.0, ObjectCategory::Marker),
                object_at("food_far", 100.0, 0.0, ObjectCategory::Food),
            ],
        );

        let options = generate_primitive_options(&chooser, &world);
        let kinds: Vec<ActionKind> = options.iter().map(|o| o.action).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::Follow,
                ActionKind::Observe,
                ActionKind::Observe,
                ActionKind::Take,
                ActionKind::Observe,
                ActionKind::Rest,
                ActionKind::Observe,
                ActionKind::Move,
                ActionKind::Build,
                ActionKind::Gesture,
            ]
        );
        assert_eq!(options[0].target.target_id(), Some("npc_near"));
        assert_eq!(options[3].target.target_id(), Some("food_1"));
        assert_eq!(options[5].target.target_id(), Some("shelter_1"));
        assert_eq!(options[6].target.target_id(), Some("marker_1"));
        assert!(options.iter().all(|o| !o.from_memory));
    }

    #[test]
    fn untargeted_options_always_exist() {
        let lonely = agent_at("npc_me", 500.0, 500.0, Vec::new());
        let world = World::new(SimulationClock::default(), vec![lonely.clone()], Vec::new());
        let options = generate_primitive_options(&lonely, &world);
        let kinds: Vec<ActionKind> = options.iter().map(|o| o.action).collect();
        assert_eq!(
            kinds,
            vec![ActionKind::Move, ActionKind::Build, ActionKind::Gesture]
        );
    }

    fn remembered_episode(target: TargetRef, repetition_count: u32) -> Arc<MemoryEpisode> {
        let actor = Arc::new(AgentIdentity::idle(Arc::new(Entity::new(
            "npc_performer",
            Position::new(1.0, 1.0),
        ))));
        let entries = vec![
            Arc::new(PerceptionEntry::new(
                10,
                Arc::clone(&actor),
                ActionKind::Observe,
                target,
            )),
            Arc::new(PerceptionEntry::new(
                12,
                actor,
                ActionKind::Observe,
                TargetRef::None,
            )),
        ];
        let sequence = Arc::new(build_action_sequence(&entries, "seq_12_2").expect("sequence"));
        let impacts = combine_impacts(&[vec![Drive::new(DriveKind::Curiosity, -0.4)]]);
        let mut episode = MemoryEpisode::new(sequence, impacts, 1);
        episode.repetition_count = repetition_count;
        Arc::new(episode)
    }

    #[test]
    fn memory_options_require_repetition_and_live_targets() {
        let mut chooser = agent_at("npc_me", 0.0, 0.0, Vec::new());
        let live = TargetRef::Entity(Arc::new(Entity::new("npc_alive", Position::new(2.0, 0.0))));
        let dead = TargetRef::Entity(Arc::new(Entity::new("npc_gone", Position::new(3.0, 0.0))));
        chooser.episodic_memory = vec![
            remembered_episode(live.clone(), 2),
            remembered_episode(dead, 2),
            remembered_episode(live, 1),
        ];

        let world = World::new(
            SimulationClock::default(),
            vec![
                chooser.clone(),
                agent_at("npc_alive", 2.0, 0.0, Vec::new()),
            ],
            Vec::new(),
        );

        let options = generate_memory_options(&chooser, &world);
        assert_eq!(options.len(), 1);
        assert!(options[0].from_memory);
        assert_eq!(options[0].action, ActionKind::Observe);
        assert_eq!(options[0].target.target_id(), Some("npc_alive"));
        assert!((options[0].expected_impacts[0].intensity - (-0.4)).abs() < 1e-6);
    }

    #[test]
    fn relief_on_pressing_drives_wins() {
        let drives = [
            Drive::new(DriveKind::Sustenance, 90.0),
            Drive::new(DriveKind::Curiosity, 10.0),
        ];
        let take = ActionOption::primitive(
            ActionKind::Take,
            TargetRef::None,
            vec![Drive::new(DriveKind::Sustenance, -0.5)],
        );
        let observe = ActionOption::primitive(
            ActionKind::Observe,
            TargetRef::Entity(Arc::new(Entity::new("npc_x", Position::new(0.0, 0.0)))),
            vec![Drive::new(DriveKind::Curiosity, -0.2)],
        );

        assert!((drive_score(&take, &drives) - 45.0).abs() < 1e-4);
        assert!((drive_score(&observe, &drives) - 2.0).abs() < 1e-4);

        let options = vec![take, observe];
        // At social_preference 8.6 the totals tie exactly; generation order
        // keeps the first option on top.
        let criteria = SelectionCriteria {
            current_drives: &drives,
            familiarity_preference: 0.0,
            social_preference: 8.6,
            randomness: 0.0,
        };
        let chosen = select_action(&options, &criteria, &mut no_rng()).expect("option");
        assert_eq!(chosen.action, ActionKind::Take);

        let criteria = SelectionCriteria {
            social_preference: 9.0,
            ..criteria
        };
        let chosen = select_action(&options, &criteria, &mut no_rng()).expect("option");
        assert_eq!(chosen.action, ActionKind::Observe);
    }

    #[test]
    fn faint_drives_are_ignored_by_scoring() {
        let drives = [Drive::new(DriveKind::Curiosity, 0.05)];
        let option = ActionOption::primitive(
            ActionKind::Observe,
            TargetRef::None,
            vec![Drive::new(DriveKind::Curiosity, -10.0)],
        );
        assert_eq!(drive_score(&option, &drives), 0.0);
    }

    #[test]
    fn memory_options_get_the_familiarity_bonus() {
        let option = ActionOption::remembered(ActionKind::Gesture, TargetRef::None, Vec::new());
        let criteria = SelectionCriteria {
            current_drives: &[],
            familiarity_preference: 0.6,
            social_preference: 0.7,
            randomness: 0.0,
        };
        assert!((preference_score(&option, &criteria) - 6.0).abs() < 1e-6);

        let social = ActionOption::primitive(
            ActionKind::Follow,
            TargetRef::Entity(Arc::new(Entity::new("npc_x", Position::new(0.0, 0.0)))),
            Vec::new(),
        );
        assert!((preference_score(&social, &criteria) - 3.5).abs() < 1e-6);
    }

    #[test]
    fn no_options_returns_none() {
        let criteria = SelectionCriteria {
            current_drives: &[],
            familiarity_preference: 0.0,
            social_preference: 0.0,
            randomness: 0.0,
        };
        assert!(select_action(&[], &criteria, &mut no_rng()).is_none());
    }

    #[test]
    fn zero_randomness_is_deterministic_across_runs() {
        let drives = [Drive::new(DriveKind::Pride, 40.0)];
        let chooser = agent_at("npc_me", 0.0, 0.0, drives.to_vec());
        let world = World::new(SimulationClock::default(), vec![chooser.clone()], Vec::new());
        let criteria = SelectionCriteria {
            current_drives: &drives,
            familiarity_preference: 0.0,
            social_preference: 0.0,
            randomness: 0.0,
        };

        let first = select_next_action(&chooser, &world, &criteria, &mut no_rng());
        let second = select_next_action(&chooser, &world, &criteria, &mut no_rng());
        assert_eq!(
            first.identity.current_action,
            second.identity.current_action
        );
        // Gesture relieves pride the most among the untargeted fallbacks.
        assert_eq!(first.identity.current_action, Some(ActionKind::Gesture));
    }

    #[test]
    fn randomness_stays_within_the_top_window() {
        let drives = [Drive::new(DriveKind::Sustenance, 100.0)];
        let strong = ActionOption::primitive(
            ActionKind::Take,
            TargetRef::None,
            vec![Drive::new(DriveKind::Sustenance, -1.0)],
        );
        let weak = ActionOption::primitive(ActionKind::Gesture, TargetRef::None, Vec::new());
        let options = vec![weak, strong];
        let criteria = SelectionCriteria {
            current_drives: &drives,
            familiarity_preference: 0.0,
            social_preference: 0.0,
            randomness: 0.05,
        };

        // floor(0.05 * 10) = 0, so the window is exactly the top option.
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..20 {
            let chosen = select_action(&options, &criteria, &mut rng).expect("option");
            assert_eq!(chosen.action, ActionKind::Take);
        }
    }

    #[test]
    fn selection_updates_identity_only() {
        let drives = vec![Drive::new(DriveKind::Belonging, 80.0)];
        let chooser = agent_at("npc_me", 0.0, 0.0, drives.clone());
        let world = World::new(
            SimulationClock::default(),
            vec![chooser.clone(), agent_at("npc_pal", 5.0, 0.0, Vec::new())],
            Vec::new(),
        );
        let criteria = SelectionCriteria {
            current_drives: &drives,
            familiarity_preference: 0.0,
            social_preference: 0.0,
            randomness: 0.0,
        };

        let updated = select_next_action(&chooser, &world, &criteria, &mut no_rng());
        assert_eq!(updated.identity.current_action, Some(ActionKind::Follow));
        assert_eq!(updated.identity.target.target_id(), Some("npc_pal"));
        assert_eq!(updated.drives, chooser.drives);
        assert_eq!(updated.episodic_memory, chooser.episodic_memory);
        assert_eq!(chooser.identity.current_action, None);
    }

    #[test]
    fn applied_impacts_clamp_to_bounds() {
        let agent = agent_at(
            "npc_me",
            0.0,
            0.0,
            vec![
                Drive::new(DriveKind::Sustenance, 0.2),
                Drive::new(DriveKind::Pride, 50.0),
            ],
        );
        let option = ActionOption::primitive(
            ActionKind::Take,
            TargetRef::None,
            vec![Drive::new(DriveKind::Sustenance, -0.5)],
        );
        let updated = apply_action_impacts(&agent, &option, 1.0);
        assert_eq!(updated.drives[0].intensity, 0.0);
        assert_eq!(updated.drives[1].intensity, 50.0);
    }
}
