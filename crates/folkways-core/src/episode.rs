//! Crystallises perception-buffer contents into episodic memories.

use crate::agent::Agent;
use crate::drive::Drive;
use crate::impact::{evaluate_impact, has_emotional_significance, ActionContext};
use crate::memory::{ActionSequence, ActionStep, MemoryEpisode, MemoryError, PerceptionBuffer, PerceptionEntry};
use std::sync::Arc;
use tracing::debug;

/// Group buffer entries into candidate sequences: sorted by timestamp, split
/// where the gap to the previous entry exceeds `max_sequence_gap`, keeping
/// groups of at least `min_sequence_length` entries (trailing group
/// included).
#[must_use]
pub fn identify_action_sequences(
    buffer: &PerceptionBuffer,
    max_sequence_gap: u64,
    min_sequence_length: usize,
) -> Vec<Vec<Arc<PerceptionEntry>>> {
    let mut sorted: Vec<Arc<PerceptionEntry>> = buffer.iter().cloned().collect();
    sorted.sort_by_key(|entry| entry.timestamp);

    let mut sequences = Vec::new();
    let mut current: Vec<Arc<PerceptionEntry>> = Vec::new();

    for entry in sorted {
        let extends_group = match current.last() {
            None => true,
            Some(last) => entry.timestamp - last.timestamp <= max_sequence_gap,
        };
        if !extends_group {
            if current.len() >= min_sequence_length {
                sequences.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
        current.push(entry);
    }
    if !current.is_empty() && current.len() >= min_sequence_length {
        sequences.push(current);
    }
    sequences
}

/// Build an `ActionSequence` whose steps mirror `entries`: first delay 0,
/// then the timestamp difference from the predecessor.
pub fn build_action_sequence(
    entries: &[Arc<PerceptionEntry>],
    id: impl Into<String>,
) -> Result<ActionSequence, MemoryError> {
    let mut steps = Vec::with_capacity(entries.len());
    let mut previous: Option<u64> = None;
    for entry in entries {
        let delay = match previous {
            None => 0,
            Some(prev) => (entry.timestamp - prev) as u32,
        };
        previous = Some(entry.timestamp);
        steps.push(ActionStep {
            entry: Arc::clone(entry),
            delay_after_previous: delay,
        });
    }
    ActionSequence::new(id, steps)
}

/// Fold per-entry impact vectors into one combined vector: a novel drive
/// kind adds its delta, a repeated kind replaces the running delta with
/// `(running + new) * 0.6`. Recurrence weighs heavier than a plain average.
#[must_use]
pub fn combine_impacts(impact_sets: &[Vec<Drive>]) -> Vec<Drive> {
    let mut combined: Vec<Drive> = Vec::new();
    for impacts in impact_sets {
        for impact in impacts {
            match combined.iter_mut().find(|running| running.kind == impact.kind) {
                Some(running) => {
                    running.intensity = (running.intensity + impact.intensity) * 0.6;
                }
                None => combined.push(*impact),
            }
        }
    }
    combined
}

/// Look up an episode similar to `sequence` in existing memory.
///
/// Similarity compares step counts only: sequences of equal length count as
/// the same behaviour. TODO: structural comparison of the actual actions.
#[must_use]
pub fn find_similar_episode<'a>(
    episodes: &'a [Arc<MemoryEpisode>],
    sequence: &ActionSequence,
) -> Option<&'a Arc<MemoryEpisode>> {
    episodes
        .iter()
        .find(|episode| episode.sequence.steps.len() == sequence.steps.len())
}

/// Extend an agent's episodic memory with new or reinforced episodes derived
/// from its current perception buffer. Returns the agent unchanged when no
/// significant candidate forms.
pub fn form_episodic_memories(
    agent: &Agent,
    current_time: u64,
    significance_threshold: f32,
    max_sequence_gap: u64,
    min_sequence_length: usize,
) -> Result<Agent, MemoryError> {
    let candidates =
        identify_action_sequences(&agent.perception, max_sequence_gap, min_sequence_length);
    if candidates.is_empty() {
        return Ok(agent.clone());
    }

    let mut new_episodes: Vec<Arc<MemoryEpisode>> = Vec::new();

    for entries in &candidates {
        let impact_sets: Vec<Vec<Drive>> = entries
            .iter()
            .map(|entry| evaluate_impact(&ActionContext::new(agent, entry, current_time)))
            .collect();

        if !has_emotional_significance(&impact_sets, significance_threshold) {
            continue;
        }

        let sequence_id = format!("seq_{}_{}", current_time, entries.len());
        let sequence = Arc::new(build_action_sequence(entries, sequence_id)?);

        match find_similar_episode(&agent.episodic_memory, &sequence) {
            Some(similar) => {
                // Reinforcement appends a replacement record; the prior entry
                // coexists and memory grows on repetition.
                new_episodes.push(Arc::new(similar.reinforced()));
            }
            None => {
                let impacts = combine_impacts(&impact_sets);
                new_episodes.push(Arc::new(MemoryEpisode::new(sequence, impacts, 1)));
            }
        }
    }

    if new_episodes.is_empty() {
        return Ok(agent.clone());
    }

    debug!(
        agent = agent.id(),
        formed = new_episodes.len(),
        "formed episodic memories"
    );

    let mut episodic_memory = agent.episodic_memory.clone();
    episodic_memory.extend(new_episodes);
    Ok(Agent {
        episodic_memory,
        ..agent.clone()
    })
}
