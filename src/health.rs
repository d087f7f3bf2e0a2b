//! Hit points and buffered hits awaiting the next tick.

use crate::agent::AgentId;

/// Current and starting hit points of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    current: u32,
    max: u32,
}

/// What a single hit did to an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// The hit had no effect.
    Ignored,
    /// Hit points dropped but remain above zero.
    Damaged {
        /// Hit points left.
        current: u32,
    },
    /// This hit took the last hit point.
    Depleted,
}

impl Health {
    /// Full health of `max` points.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Starting hit points.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Whether no hit point is left.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Fraction of hit points left, in `[0, 1]`.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "Hit point totals stay far below f32 precision limits."
    )]
    pub fn ratio(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }

    /// Applies `damage`, saturating at zero.
    ///
    /// Zero damage and hits on depleted health are ignored, so
    /// [`HitOutcome::Depleted`] is reported at most once.
    pub fn hit(&mut self, damage: u32) -> HitOutcome {
        if damage == 0 || self.is_depleted() {
            return HitOutcome::Ignored;
        }
        self.current = self.current.saturating_sub(damage);
        if self.is_depleted() {
            HitOutcome::Depleted
        } else {
            HitOutcome::Damaged {
                current: self.current,
            }
        }
    }
}

/// A hit reported by the damage subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Agent that was struck.
    pub target: AgentId,
    /// Hit points to remove.
    pub damage: u32,
}

/// Hits buffered until the swarm applies them at the start of its next tick.
#[derive(Debug, Default)]
pub struct HitInbox {
    hits: Vec<Hit>,
}

impl HitInbox {
    /// Queues one hit.
    pub fn push(&mut self, hit: Hit) {
        self.hits.push(hit);
    }

    /// Removes and yields every queued hit in arrival order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Hit> {
        self.hits.drain(..)
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
