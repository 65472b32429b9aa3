//! Short-term perception and long-term episodic memory records.

use crate::action::{ActionKind, TargetRef};
use crate::agent::AgentIdentity;
use crate::drive::{Drive, DriveKind};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

/// Maximum number of entries a perception buffer retains.
pub const MAX_BUFFER: usize = 20;

/// Sequence id reserved by an earlier sentinel scheme; construction rejects
/// it so "no match" is always expressed with `Option`.
pub const RESERVED_SEQUENCE_ID: &str = "__dummy__";

/// Errors raised when constructing memory records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("action sequence must contain at least one step")]
    EmptySequence,
    #[error("sequence id \"__dummy__\" is reserved")]
    ReservedSequenceId,
}

/// A single observed action event, timestamped in ticks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerceptionEntry {
    pub timestamp: u64,
    pub actor: Arc<AgentIdentity>,
    pub action: ActionKind,
    pub target: TargetRef,
}

impl PerceptionEntry {
    /// Construct a new observation record.
    #[must_use]
    pub fn new(timestamp: u64, actor: Arc<AgentIdentity>, action: ActionKind, target: TargetRef) -> Self {
        Self {
            timestamp,
            actor,
            action,
            target,
        }
    }
}

/// Bounded short-term window of observed events, oldest trimmed first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerceptionBuffer {
    entries: VecDeque<Arc<PerceptionEntry>>,
}

impl PerceptionBuffer {
    /// Build a buffer from existing entries, trimming to capacity.
    #[must_use]
    pub fn from_entries(entries: Vec<Arc<PerceptionEntry>>) -> Self {
        let mut buffer = Self {
            entries: entries.into(),
        };
        buffer.trim();
        buffer
    }

    /// Replacement buffer with `new_entries` appended and the oldest entries
    /// trimmed to `MAX_BUFFER`.
    #[must_use]
    pub fn extended(&self, new_entries: impl IntoIterator<Item = Arc<PerceptionEntry>>) -> Self {
        let mut updated = self.clone();
        updated.entries.extend(new_entries);
        updated.trim();
        updated
    }

    fn trim(&mut self) {
        while self.entries.len() > MAX_BUFFER {
            self.entries.pop_front();
        }
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in observation order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<PerceptionEntry>> {
        self.entries.iter()
    }
}

/// One step of a remembered action sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionStep {
    pub entry: Arc<PerceptionEntry>,
    /// Ticks since the previous step; 0 for the first step.
    pub delay_after_previous: u32,
}

/// An ordered, non-empty sequence of observed action steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionSequence {
    pub id: String,
    pub steps: Vec<ActionStep>,
}

impl ActionSequence {
    /// Construct a sequence, rejecting empty step lists and the reserved id.
    pub fn new(id: impl Into<String>, steps: Vec<ActionStep>) -> Result<Self, MemoryError> {
        let id = id.into();
        if steps.is_empty() {
            return Err(MemoryError::EmptySequence);
        }
        if id == RESERVED_SEQUENCE_ID {
            return Err(MemoryError::ReservedSequenceId);
        }
        Ok(Self { id, steps })
    }

    /// Timestamp of the first step.
    #[must_use]
    pub fn start_time(&self) -> u64 {
        self.steps[0].entry.timestamp
    }

    /// Timestamp of the last step.
    #[must_use]
    pub fn end_time(&self) -> u64 {
        self.steps[self.steps.len() - 1].entry.timestamp
    }
}

/// A reinforced, emotionally significant sequence retained in long-term
/// memory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryEpisode {
    pub start_time: u64,
    pub end_time: u64,
    pub sequence: Arc<ActionSequence>,
    pub drive_impacts: Vec<Drive>,
    pub repetition_count: u32,
}

impl MemoryEpisode {
    /// Construct an episode spanning its sequence's time range.
    #[must_use]
    pub fn new(sequence: Arc<ActionSequence>, drive_impacts: Vec<Drive>, repetition_count: u32) -> Self {
        Self {
            start_time: sequence.start_time(),
            end_time: sequence.end_time(),
            sequence,
            drive_impacts,
            repetition_count,
        }
    }

    /// Replacement episode acknowledging one more repetition.
    #[must_use]
    pub fn reinforced(&self) -> Self {
        Self {
            start_time: self.start_time,
            end_time: self.end_time,
            sequence: Arc::clone(&self.sequence),
            drive_impacts: self.drive_impacts.clone(),
            repetition_count: self.repetition_count + 1,
        }
    }
}

/// A sequence witnessed being performed by another agent, with its observed
/// per-drive effectiveness. Carried by agents as a forward-compatible slot;
/// the tick pipeline never produces these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WitnessedSequence {
    pub sequence: Arc<ActionSequence>,
    pub performer: Arc<AgentIdentity>,
    pub observation_count: u32,
    pub effectiveness: Vec<(DriveKind, f32)>,
}
