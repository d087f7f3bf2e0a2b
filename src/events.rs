//! Lifecycle notifications raised by the swarm.
//!
//! The swarm queues events while it ticks; owners drain them afterwards.
//! Events derive [`bevy::prelude::Event`] so the plugin can trigger them on
//! observers unchanged.
use bevy::prelude::Event;

use crate::agent::AgentId;
use crate::moves::{MoveError, StepResult};

/// Why an agent left the swarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// Its hit points ran out.
    Killed,
    /// It spawned inside another agent's position or reservation.
    SpawnConflict,
    /// An owner removed it directly.
    Despawned,
}

/// How a step ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The agent moved.
    Moved,
    /// The move gave up.
    Aborted(MoveError),
}

impl StepOutcome {
    /// Maps a finished move result; `None` while the move is still running.
    #[must_use]
    pub const fn from_result(result: StepResult) -> Option<Self> {
        match result {
            StepResult::InProgress => None,
            StepResult::Completed => Some(Self::Moved),
            StepResult::Aborted(err) => Some(Self::Aborted(err)),
        }
    }
}

/// Notification emitted by [`crate::swarm::Swarm`].
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum SwarmEvent {
    /// The agent survived its spawn grace period.
    FinishedSpawning(AgentId),
    /// One roll or jump ended.
    StepFinished {
        /// Agent that stepped.
        id: AgentId,
        /// Result of the step.
        outcome: StepOutcome,
    },
    /// The agent lost hit points but is still alive.
    HitPointsChanged {
        /// Agent that was hit.
        id: AgentId,
        /// Hit points left.
        current: u32,
        /// Starting hit points.
        max: u32,
    },
    /// The agent was destroyed. Emitted exactly once per agent.
    Removed {
        /// Agent that was destroyed.
        id: AgentId,
        /// Why it was destroyed.
        cause: RemovalCause,
    },
}

impl SwarmEvent {
    /// The agent this event concerns.
    #[must_use]
    pub const fn agent(&self) -> AgentId {
        match *self {
            Self::FinishedSpawning(id)
            | Self::StepFinished { id, .. }
            | Self::HitPointsChanged { id, .. }
            | Self::Removed { id, .. } => id,
        }
    }
}
