//! Rolling a cube over one of its bottom edges.
//!
//! The roll rotates the cube centre about the pivot edge in fixed physics
//! ticks. Leftover frame time carries over to the next frame, so the angular
//! rate depends on the tick length rather than the frame rate.
use glam::{Quat, Vec3};

use super::{ClearancePoll, PollOutcome, StepResult};
use crate::config::{MoveProfile, SwarmSettings};
use crate::constants::{ROLL_ANGLE_DEGREES, ROLL_ANGLE_EPSILON};
use crate::geometry::{rotate_about_pivot, Pose};
use crate::reservation::Clearance;

/// Direction of a roll relative to the agent's body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RollDirection {
    /// Along local `+Z`.
    Forward,
    /// Along local `-Z`.
    Back,
    /// Along local `-X`.
    Left,
    /// Along local `+X`.
    Right,
}

impl RollDirection {
    /// Whether the roll pivots about the forward axis.
    #[must_use]
    pub const fn is_lateral(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// World-space unit vector of this direction for `pose`.
    #[must_use]
    pub fn world_vector(self, pose: &Pose) -> Vec3 {
        match self {
            Self::Forward => pose.forward(),
            Self::Back => -pose.forward(),
            Self::Left => -pose.right(),
            Self::Right => pose.right(),
        }
    }

    /// Pivot geometry of the roll: vector from the pivot edge to the centre,
    /// world rotation axis, sign of the rotation and local mesh axis.
    fn pivot(self, pose: &Pose, half_size: f32) -> (Vec3, Vec3, f32, Vec3) {
        let up = Vec3::Y * half_size;
        let forward = pose.forward();
        let right = pose.right();
        match self {
            Self::Forward => (up - forward * half_size, right, 1.0, Vec3::X),
            Self::Back => (up + forward * half_size, right, -1.0, Vec3::X),
            Self::Left => (up + right * half_size, forward, 1.0, Vec3::Z),
            Self::Right => (up - right * half_size, forward, -1.0, Vec3::Z),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Rotation {
    target: Vec3,
    pivot_offset: Vec3,
    axis: Vec3,
    sign: f32,
    mesh_axis: Vec3,
    remaining: f32,
    elapsed: f32,
    lateral: bool,
}

impl Rotation {
    fn new(direction: RollDirection, pose: &Pose, path: &[Vec3], half_size: f32) -> Self {
        let (pivot_offset, axis, sign, mesh_axis) = direction.pivot(pose, half_size);
        Self {
            target: path.first().copied().unwrap_or(pose.position),
            pivot_offset,
            axis,
            sign,
            mesh_axis,
            remaining: ROLL_ANGLE_DEGREES,
            elapsed: 0.0,
            lateral: direction.is_lateral(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum RollPhase {
    Idle,
    WaitingForClearance {
        direction: RollDirection,
        path: Vec<Vec3>,
        poll: ClearancePoll,
    },
    Rotating(Rotation),
}

/// A single 90-degree roll.
#[derive(Debug, Clone, PartialEq)]
pub struct RollMove {
    edge_size: f32,
    half_size: f32,
    angle_per_tick: f32,
    fixed_timestep: f32,
    poll_interval: f32,
    timeout: f32,
    target_point: Vec3,
    phase: RollPhase,
}

impl RollMove {
    /// Creates an idle roll for an agent with `profile`.
    #[must_use]
    pub fn new(profile: &MoveProfile, settings: &SwarmSettings) -> Self {
        Self {
            edge_size: profile.edge_size,
            half_size: profile.half_size,
            angle_per_tick: profile.roll_angle_per_tick,
            fixed_timestep: settings.fixed_timestep,
            poll_interval: settings.path_check_interval,
            timeout: settings.roll_clearance_timeout,
            target_point: settings.target_point,
            phase: RollPhase::Idle,
        }
    }

    /// Whether no roll is in flight.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, RollPhase::Idle)
    }

    /// Whether the cube is currently turning over.
    #[must_use]
    pub const fn is_rotating(&self) -> bool {
        matches!(self.phase, RollPhase::Rotating(_))
    }

    /// Largest distance a single roll covers.
    #[must_use]
    pub const fn max_step_distance(&self) -> f32 {
        self.edge_size
    }

    /// Single-point candidate path of a roll in `direction`.
    #[must_use]
    pub fn candidate_path(&self, direction: RollDirection, pose: &Pose) -> Vec<Vec3> {
        vec![pose.position + direction.world_vector(pose) * self.edge_size]
    }

    /// Starts a roll in `direction` and checks its path straight away.
    ///
    /// Does nothing when a roll is already in flight.
    pub fn start(&mut self, direction: RollDirection, pose: &Pose, clearance: &mut dyn Clearance) {
        if !self.is_idle() {
            return;
        }
        let path = self.candidate_path(direction, pose);
        self.phase = if ClearancePoll::poll_now(&path, clearance) {
            RollPhase::Rotating(Rotation::new(direction, pose, &path, self.half_size))
        } else {
            RollPhase::WaitingForClearance {
                direction,
                path,
                poll: ClearancePoll::new(self.poll_interval, Some(self.timeout)),
            }
        };
    }

    /// Advances the roll by `dt` seconds of frame time.
    ///
    /// Stepping an idle roll reports [`StepResult::Completed`].
    pub fn step(&mut self, pose: &mut Pose, clearance: &mut dyn Clearance, dt: f32) -> StepResult {
        match &mut self.phase {
            RollPhase::Idle => StepResult::Completed,
            RollPhase::WaitingForClearance {
                direction,
                path,
                poll,
            } => match poll.advance(dt, path, clearance) {
                PollOutcome::Pending => StepResult::InProgress,
                PollOutcome::TimedOut(err) => {
                    self.phase = RollPhase::Idle;
                    StepResult::Aborted(err)
                }
                PollOutcome::Granted => {
                    let rotation = Rotation::new(*direction, pose, path, self.half_size);
                    self.phase = RollPhase::Rotating(rotation);
                    StepResult::InProgress
                }
            },
            RollPhase::Rotating(rotation) => {
                let done = advance_rotation(
                    rotation,
                    pose,
                    dt,
                    self.fixed_timestep,
                    self.angle_per_tick,
                );
                let face = self.target_point.with_y(self.half_size);
                if rotation.lateral {
                    pose.yaw_towards(face);
                }
                if !done {
                    return StepResult::InProgress;
                }
                pose.position = rotation.target.with_y(self.half_size);
                if rotation.lateral {
                    pose.yaw_towards(face);
                }
                clearance.clear();
                self.phase = RollPhase::Idle;
                StepResult::Completed
            }
        }
    }
}

/// Runs every fixed tick that fits into the accumulated frame time. Returns
/// `true` once the full quarter turn has been applied.
fn advance_rotation(
    rotation: &mut Rotation,
    pose: &mut Pose,
    dt: f32,
    fixed_timestep: f32,
    angle_per_tick: f32,
) -> bool {
    rotation.elapsed += dt;
    while rotation.elapsed > fixed_timestep && rotation.remaining > ROLL_ANGLE_EPSILON {
        rotation.elapsed -= fixed_timestep;
        // The final tick is shortened so the total is exactly a quarter turn.
        let step = angle_per_tick.min(rotation.remaining);
        rotation.remaining -= step;
        let signed = step * rotation.sign;

        let (position, offset) =
            rotate_about_pivot(pose.position, rotation.pivot_offset, rotation.axis, signed);
        pose.position = position;
        rotation.pivot_offset = offset;
        pose.mesh_rotation = (Quat::from_axis_angle(rotation.mesh_axis, signed.to_radians())
            * pose.mesh_rotation)
            .normalize();
    }
    rotation.remaining <= ROLL_ANGLE_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnemyConfig;
    use crate::moves::MoveError;
    use crate::reservation::MockClearance;
    use approx::assert_relative_eq;
    use mockall::Sequence;
    use rstest::{fixture, rstest};

    #[fixture]
    fn unit_roll() -> RollMove {
        let settings = SwarmSettings::default();
        let profile = MoveProfile::new(&EnemyConfig::default(), &settings);
        RollMove::new(&profile, &settings)
    }

    fn free_clearance() -> MockClearance {
        let mut clearance = MockClearance::new();
        clearance.expect_is_path_free().return_const(true);
        clearance.expect_commit().return_const(());
        clearance.expect_clear().return_const(());
        clearance
    }

    fn run_to_end(
        roll: &mut RollMove,
        pose: &mut Pose,
        clearance: &mut MockClearance,
    ) -> StepResult {
        for _ in 0..10_000 {
            let result = roll.step(pose, clearance, 1.0 / 60.0);
            if result.is_finished() {
                return result;
            }
        }
        panic!("roll did not finish");
    }

    #[rstest]
    #[case(RollDirection::Forward, Vec3::new(0.0, 0.0, 1.0))]
    #[case(RollDirection::Back, Vec3::new(0.0, 0.0, -1.0))]
    #[case(RollDirection::Left, Vec3::new(-1.0, 0.0, 0.0))]
    #[case(RollDirection::Right, Vec3::new(1.0, 0.0, 0.0))]
    fn roll_moves_one_edge(
        mut unit_roll: RollMove,
        #[case] direction: RollDirection,
        #[case] offset: Vec3,
    ) {
        let start = Vec3::new(0.0, 0.5, -10.0);
        let mut pose = Pose::looking_along(start, Vec3::Z);
        let mut clearance = free_clearance();
        unit_roll.start(direction, &pose, &mut clearance);
        assert!(unit_roll.is_rotating());
        assert_eq!(
            run_to_end(&mut unit_roll, &mut pose, &mut clearance),
            StepResult::Completed
        );
        let moved = pose.position - start;
        assert_relative_eq!(moved.x, offset.x, epsilon = 1e-5);
        assert_relative_eq!(moved.z, offset.z, epsilon = 1e-5);
        assert_eq!(pose.position.y, 0.5);
        assert!(unit_roll.is_idle());
    }

    #[rstest]
    fn forward_roll_turns_mesh_a_quarter(mut unit_roll: RollMove) {
        let mut pose = Pose::looking_along(Vec3::new(0.0, 0.5, -5.0), Vec3::Z);
        let mut clearance = free_clearance();
        unit_roll.start(RollDirection::Forward, &pose, &mut clearance);
        run_to_end(&mut unit_roll, &mut pose, &mut clearance);
        let expected = Quat::from_rotation_x(90_f32.to_radians());
        assert!(pose.mesh_rotation.angle_between(expected) < 1e-3);
    }

    #[rstest]
    fn lateral_roll_faces_target_point(mut unit_roll: RollMove) {
        let mut pose = Pose::looking_along(Vec3::new(0.0, 0.5, -5.0), Vec3::Z);
        let mut clearance = free_clearance();
        unit_roll.start(RollDirection::Right, &pose, &mut clearance);
        run_to_end(&mut unit_roll, &mut pose, &mut clearance);
        let to_target = (Vec3::new(0.0, 0.5, 0.0) - pose.position).normalize();
        assert!((pose.forward() - to_target).length() < 1e-4);
    }

    #[rstest]
    fn blocked_roll_times_out_untouched(mut unit_roll: RollMove) {
        let start = Vec3::new(0.0, 0.5, -5.0);
        let mut pose = Pose::looking_along(start, Vec3::Z);
        let mut clearance = MockClearance::new();
        clearance.expect_is_path_free().return_const(false);
        clearance.expect_commit().never();
        clearance.expect_clear().never();

        unit_roll.start(RollDirection::Forward, &pose, &mut clearance);
        let result = run_to_end(&mut unit_roll, &mut pose, &mut clearance);
        assert!(matches!(
            result,
            StepResult::Aborted(MoveError::ClearanceTimeout { .. })
        ));
        assert_eq!(pose.position, start);
        assert!(unit_roll.is_idle());
    }

    #[rstest]
    fn reservation_is_committed_then_cleared_once(mut unit_roll: RollMove) {
        let mut pose = Pose::looking_along(Vec3::new(0.0, 0.5, -5.0), Vec3::Z);
        let mut clearance = MockClearance::new();
        let mut seq = Sequence::new();
        clearance
            .expect_is_path_free()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(true);
        clearance
            .expect_commit()
            .withf(|path| path.len() == 1 && (path[0] - Vec3::new(0.0, 0.5, -4.0)).length() < 1e-5)
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        clearance
            .expect_clear()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        unit_roll.start(RollDirection::Forward, &pose, &mut clearance);
        run_to_end(&mut unit_roll, &mut pose, &mut clearance);
    }

    #[rstest]
    #[case(1.0 / 30.0)]
    #[case(1.0 / 144.0)]
    fn overshoot_is_clamped_at_any_frame_rate(mut unit_roll: RollMove, #[case] dt: f32) {
        let mut pose = Pose::looking_along(Vec3::new(0.0, 0.5, 0.0), Vec3::X);
        let mut clearance = free_clearance();
        unit_roll.start(RollDirection::Forward, &pose, &mut clearance);
        let mut peak = 0.0_f32;
        while !unit_roll.step(&mut pose, &mut clearance, dt).is_finished() {
            peak = peak.max(pose.position.x);
        }
        assert!(peak <= 1.0 + 1e-4);
        assert_relative_eq!(pose.position.x, 1.0, epsilon = 1e-5);
    }
}
