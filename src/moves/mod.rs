//! Atomic moves and the clearance polling they share.
//!
//! A move is an explicit state machine advanced by [`Move::step`]. It waits
//! for its candidate path to clear, commits it, animates the agent and then
//! withdraws the reservation.
use glam::Vec3;
use log::debug;
use thiserror::Error;

use crate::geometry::Pose;
use crate::reservation::Clearance;

pub mod jump;
pub mod roll;

pub use jump::{JumpMove, Trajectory};
pub use roll::{RollDirection, RollMove};

/// Why a move ended without moving the agent.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MoveError {
    /// The candidate path stayed contested for the whole timeout.
    #[error("path stayed blocked for {waited:.2}s")]
    ClearanceTimeout {
        /// Seconds spent waiting before giving up.
        waited: f32,
    },
}

/// Outcome of advancing a move by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepResult {
    /// Still waiting or still animating.
    InProgress,
    /// The agent arrived; the reservation has been withdrawn.
    Completed,
    /// The move gave up without touching the agent or its reservation.
    Aborted(MoveError),
}

impl StepResult {
    /// Whether the move is over, successfully or not.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Either kind of atomic move.
#[derive(Debug, Clone)]
pub enum Move {
    /// A 90-degree roll over one edge.
    Roll(RollMove),
    /// A ballistic jump.
    Jump(JumpMove),
}

impl Move {
    /// Advances whichever move is wrapped.
    pub fn step(&mut self, pose: &mut Pose, clearance: &mut dyn Clearance, dt: f32) -> StepResult {
        match self {
            Self::Roll(roll) => roll.step(pose, clearance, dt),
            Self::Jump(jump) => jump.step(pose, clearance, dt),
        }
    }

    /// Whether no move is in flight.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        match self {
            Self::Roll(roll) => roll.is_idle(),
            Self::Jump(jump) => jump.is_idle(),
        }
    }
}

/// Result of one [`ClearancePoll::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PollOutcome {
    /// The path was free and is now committed.
    Granted,
    /// Keep waiting.
    Pending,
    /// The timeout elapsed; nothing was committed.
    TimedOut(MoveError),
}

/// Re-checks a candidate path on a fixed interval until it clears.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClearancePoll {
    interval: f32,
    timeout: Option<f32>,
    since_poll: f32,
    waited: f32,
}

impl ClearancePoll {
    pub(crate) const fn new(interval: f32, timeout: Option<f32>) -> Self {
        Self {
            interval,
            timeout,
            since_poll: 0.0,
            waited: 0.0,
        }
    }

    /// Checks `candidate` once and commits it when free.
    pub(crate) fn poll_now(candidate: &[Vec3], clearance: &mut dyn Clearance) -> bool {
        if clearance.is_path_free(candidate) {
            clearance.commit(candidate.to_vec());
            true
        } else {
            false
        }
    }

    /// Accumulates `dt` and performs every poll that fell due.
    pub(crate) fn advance(
        &mut self,
        dt: f32,
        candidate: &[Vec3],
        clearance: &mut dyn Clearance,
    ) -> PollOutcome {
        self.since_poll += dt;
        while self.since_poll >= self.interval {
            self.since_poll -= self.interval;
            self.waited += self.interval;
            if Self::poll_now(candidate, clearance) {
                return PollOutcome::Granted;
            }
            // The poll at the deadline still counts.
            if let Some(timeout) = self.timeout {
                if self.waited >= timeout {
                    debug!("clearance timed out after {:.2}s", self.waited);
                    return PollOutcome::TimedOut(MoveError::ClearanceTimeout {
                        waited: self.waited,
                    });
                }
            }
        }
        PollOutcome::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservation::MockClearance;
    use mockall::Sequence;
    use rstest::rstest;

    #[rstest]
    fn poll_waits_for_interval_before_rechecking() {
        let mut clearance = MockClearance::new();
        let mut seq = Sequence::new();
        clearance
            .expect_is_path_free()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(false);
        clearance
            .expect_is_path_free()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(true);
        clearance
            .expect_commit()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let mut poll = ClearancePoll::new(0.25, None);
        let path = [Vec3::ZERO];
        assert_eq!(
            poll.advance(0.125, &path, &mut clearance),
            PollOutcome::Pending
        );
        assert_eq!(
            poll.advance(0.125, &path, &mut clearance),
            PollOutcome::Pending
        );
        assert_eq!(
            poll.advance(0.25, &path, &mut clearance),
            PollOutcome::Granted
        );
    }

    #[rstest]
    fn grant_at_the_deadline_is_taken() {
        let mut clearance = MockClearance::new();
        let mut seq = Sequence::new();
        clearance
            .expect_is_path_free()
            .times(3)
            .in_sequence(&mut seq)
            .return_const(false);
        clearance
            .expect_is_path_free()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(true);
        clearance
            .expect_commit()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let mut poll = ClearancePoll::new(0.25, Some(1.0));
        let path = [Vec3::ZERO];
        assert_eq!(
            poll.advance(0.75, &path, &mut clearance),
            PollOutcome::Pending
        );
        assert_eq!(
            poll.advance(0.25, &path, &mut clearance),
            PollOutcome::Granted
        );
    }

    #[rstest]
    fn poll_times_out_without_committing() {
        let mut clearance = MockClearance::new();
        clearance.expect_is_path_free().return_const(false);
        clearance.expect_commit().never();

        let mut poll = ClearancePoll::new(0.25, Some(1.0));
        let outcome = poll.advance(1.0, &[Vec3::ZERO], &mut clearance);
        assert!(matches!(
            outcome,
            PollOutcome::TimedOut(MoveError::ClearanceTimeout { .. })
        ));
    }
}
