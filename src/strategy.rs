//! Decides which move an agent attempts next.
//!
//! A strategy keeps exactly one move in flight. When that move finishes,
//! successfully or not, the strategy reports it and picks the next one on
//! the following step.
use glam::Vec3;
use rand::{Rng, RngCore};

use crate::config::{EnemyType, MoveProfile, SwarmSettings};
use crate::constants::LEFT_ROLL_SHARE;
use crate::geometry::{distance_squared, Pose};
use crate::moves::{JumpMove, Move, RollDirection, RollMove, StepResult};
use crate::reservation::Clearance;

/// Rolls forward, occasionally drifting sideways. Never rolls back.
#[derive(Debug, Clone)]
pub struct RollStrategy {
    roll: RollMove,
    direction: RollDirection,
    side_roll_chance: f32,
}

impl RollStrategy {
    /// Creates a strategy whose first roll goes forward.
    #[must_use]
    pub fn new(profile: &MoveProfile, settings: &SwarmSettings) -> Self {
        Self {
            roll: RollMove::new(profile, settings),
            direction: RollDirection::Forward,
            side_roll_chance: profile.side_roll_chance,
        }
    }

    /// Direction of the next (or current) roll.
    #[must_use]
    pub const fn direction(&self) -> RollDirection {
        self.direction
    }

    /// Largest distance one step covers.
    #[must_use]
    pub const fn max_step_distance(&self) -> f32 {
        self.roll.max_step_distance()
    }

    /// Starts a roll when idle, advances it, and re-draws the direction once
    /// it finishes.
    pub fn step(
        &mut self,
        pose: &mut Pose,
        clearance: &mut dyn Clearance,
        rng: &mut dyn RngCore,
        dt: f32,
    ) -> StepResult {
        if self.roll.is_idle() {
            self.roll.start(self.direction, pose, clearance);
        }
        let result = self.roll.step(pose, clearance, dt);
        if result.is_finished() {
            self.direction = self.next_direction(rng);
        }
        result
    }

    fn next_direction(&self, rng: &mut dyn RngCore) -> RollDirection {
        if rng.random::<f32>() < self.side_roll_chance {
            if rng.random::<f32>() < LEFT_ROLL_SHARE {
                RollDirection::Left
            } else {
                RollDirection::Right
            }
        } else {
            RollDirection::Forward
        }
    }
}

/// Jumps towards the target point while it is out of reach, rolls forward
/// otherwise.
#[derive(Debug, Clone)]
pub struct JumpStrategy {
    active: Move,
    parked: Move,
    jump_chance: f32,
    max_jump_distance: f32,
    target_point: Vec3,
}

impl JumpStrategy {
    /// Creates a strategy holding one jump and one forward roll.
    #[must_use]
    pub fn new(profile: &MoveProfile, settings: &SwarmSettings) -> Self {
        let jump = JumpMove::new(profile, settings);
        Self {
            max_jump_distance: jump.max_jump_distance(),
            active: Move::Roll(RollMove::new(profile, settings)),
            parked: Move::Jump(jump),
            jump_chance: profile.jump_chance,
            target_point: settings.target_point,
        }
    }

    /// Largest distance one step covers.
    #[must_use]
    pub const fn max_step_distance(&self) -> f32 {
        self.max_jump_distance
    }

    /// Whether an agent at `position` is far enough away to jump, and the
    /// dice agree.
    pub fn should_jump(&self, position: Vec3, rng: &mut dyn RngCore) -> bool {
        distance_squared(position, self.target_point) > self.max_jump_distance.powi(2)
            && rng.random::<f32>() < self.jump_chance
    }

    /// Whether the move in flight (or the last one) is a jump.
    #[must_use]
    pub const fn is_jumping(&self) -> bool {
        matches!(self.active, Move::Jump(_))
    }

    /// Picks and starts a move when idle, then advances it.
    pub fn step(
        &mut self,
        pose: &mut Pose,
        clearance: &mut dyn Clearance,
        rng: &mut dyn RngCore,
        dt: f32,
    ) -> StepResult {
        if self.active.is_idle() {
            let wants_jump = self.should_jump(pose.position, rng);
            if wants_jump != self.is_jumping() {
                std::mem::swap(&mut self.active, &mut self.parked);
            }
            match &mut self.active {
                Move::Jump(jump) => jump.start(pose, clearance),
                Move::Roll(roll) => roll.start(RollDirection::Forward, pose, clearance),
            }
        }
        self.active.step(pose, clearance, dt)
    }
}

/// Movement behaviour of one agent.
#[derive(Debug, Clone)]
pub enum MovementStrategy {
    /// Rolling only.
    Roll(RollStrategy),
    /// Jumping when far, rolling when near.
    Jump(JumpStrategy),
}

impl MovementStrategy {
    /// Strategy used by enemies of `kind`.
    #[must_use]
    pub fn for_kind(kind: EnemyType, profile: &MoveProfile, settings: &SwarmSettings) -> Self {
        match kind {
            EnemyType::Simple | EnemyType::Zigzag => {
                Self::Roll(RollStrategy::new(profile, settings))
            }
            EnemyType::Jumper => Self::Jump(JumpStrategy::new(profile, settings)),
        }
    }

    /// Largest distance one step covers; sizes the neighbour radius.
    #[must_use]
    pub const fn max_step_distance(&self) -> f32 {
        match self {
            Self::Roll(strategy) => strategy.max_step_distance(),
            Self::Jump(strategy) => strategy.max_step_distance(),
        }
    }

    /// Advances the agent by one frame.
    pub fn step(
        &mut self,
        pose: &mut Pose,
        clearance: &mut dyn Clearance,
        rng: &mut dyn RngCore,
        dt: f32,
    ) -> StepResult {
        match self {
            Self::Roll(strategy) => strategy.step(pose, clearance, rng, dt),
            Self::Jump(strategy) => strategy.step(pose, clearance, rng, dt),
        }
    }
}
