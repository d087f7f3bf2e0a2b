//! Per-agent membership of nearby agents.
//!
//! Membership is keyed by generational [`AgentId`] handles, so a removed
//! agent's id can never alias a newer one even if a removal notice is missed.
use hashbrown::HashSet;

use crate::agent::AgentId;

/// Agents within interaction range of one owner.
///
/// Membership tests go through a hash set; iteration walks a vector so that
/// the neighbour order is stable between two polls of the same tick.
#[derive(Debug, Clone, Default)]
pub struct NeighborSet {
    radius: f32,
    members: Vec<AgentId>,
    index: HashSet<AgentId>,
}

impl NeighborSet {
    /// Creates an empty set tracking agents within `radius`.
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    /// Radius of the owner's trigger volume.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Records that `other` entered range. Returns `false` if it was already tracked.
    pub fn on_enter_range(&mut self, other: AgentId) -> bool {
        if !self.index.insert(other) {
            return false;
        }
        self.members.push(other);
        true
    }

    /// Forgets `other` after it left range. Returns `false` if it was not tracked.
    pub fn on_exit_range(&mut self, other: AgentId) -> bool {
        if !self.index.remove(&other) {
            return false;
        }
        self.members.retain(|id| *id != other);
        true
    }

    /// Forgets `other` after it was destroyed.
    pub fn on_other_removed(&mut self, other: AgentId) -> bool {
        self.on_exit_range(other)
    }

    /// Whether `other` is currently tracked.
    #[must_use]
    pub fn contains(&self, other: AgentId) -> bool {
        self.index.contains(&other)
    }

    /// Current neighbours. No ordering guarantee beyond stability between mutations.
    pub fn neighbors(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.members.iter().copied()
    }

    /// Number of tracked neighbours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no neighbour is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
