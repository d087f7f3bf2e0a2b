//! Ballistic jumps.
//!
//! Flight is integrated analytically from the launch velocity, so the
//! landing point is independent of the frame rate. The reservation shrinks
//! as waypoints are passed, releasing airspace the jumper has left.
use glam::{Quat, Vec3};

use super::{ClearancePoll, PollOutcome, StepResult};
use crate::config::{MoveProfile, SwarmSettings};
use crate::constants::TRAJECTORY_WAYPOINT_COUNT;
use crate::geometry::Pose;
use crate::reservation::Clearance;

#[expect(clippy::cast_precision_loss, reason = "The waypoint count is tiny.")]
pub(crate) const WAYPOINT_COUNT: f32 = TRAJECTORY_WAYPOINT_COUNT as f32;

/// Horizontal distance of a forward launch at `angle_degrees` with speed
/// `force` under vertical acceleration `gravity`.
///
/// # Examples
/// ```
/// use rollcubes::moves::jump::max_jump_distance;
///
/// let d = max_jump_distance(10.0, 45.0, -10.0);
/// assert!((d - 10.0).abs() < 1e-4);
/// ```
#[must_use]
pub fn max_jump_distance(force: f32, angle_degrees: f32, gravity: f32) -> f32 {
    let velocity = Quat::from_axis_angle(Vec3::X, (-angle_degrees).to_radians()) * Vec3::Z * force;
    -2.0 * velocity.y * velocity.z / gravity
}

/// Precomputed flight of one jump.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    start: Vec3,
    velocity: Vec3,
    gravity: f32,
    duration: f32,
    waypoints: Vec<Vec3>,
    landing: Vec3,
}

impl Trajectory {
    /// Plans a jump from `pose`.
    ///
    /// A forward launch pitches the body's forward axis up by
    /// `angle_degrees`; a backward launch mirrors it behind the agent.
    #[must_use]
    pub fn plan(
        pose: &Pose,
        force: f32,
        angle_degrees: f32,
        gravity: f32,
        launch_forward: bool,
    ) -> Self {
        let pitch = if launch_forward {
            -angle_degrees
        } else {
            180.0 + angle_degrees
        };
        let direction = Quat::from_axis_angle(pose.right(), pitch.to_radians()) * pose.forward();
        let velocity = direction * force;
        let duration = -2.0 * velocity.y / gravity;
        let start = pose.position;

        let mut trajectory = Self {
            start,
            velocity,
            gravity,
            duration,
            waypoints: Vec::with_capacity(TRAJECTORY_WAYPOINT_COUNT),
            landing: start + Vec3::new(velocity.x * duration, 0.0, velocity.z * duration),
        };
        let interval = duration / WAYPOINT_COUNT;
        trajectory.waypoints = (1..=TRAJECTORY_WAYPOINT_COUNT)
            .map(|i| {
                #[expect(
                    clippy::cast_precision_loss,
                    reason = "Waypoint indices are tiny."
                )]
                let t = interval * i as f32;
                trajectory.position_at(t)
            })
            .collect();
        trajectory
    }

    /// Position `t` seconds after launch.
    #[must_use]
    pub fn position_at(&self, t: f32) -> Vec3 {
        self.start
            + Vec3::new(
                self.velocity.x * t,
                self.velocity.y * t + self.gravity * t * t / 2.0,
                self.velocity.z * t,
            )
    }

    /// Total flight time.
    #[must_use]
    pub const fn duration(&self) -> f32 {
        self.duration
    }

    /// Launch velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Sampled points after launch; the last one is the landing point.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    /// Exact landing point, at launch height.
    #[must_use]
    pub const fn landing(&self) -> Vec3 {
        self.landing
    }

    /// Time between two waypoints.
    #[must_use]
    pub fn waypoint_interval(&self) -> f32 {
        self.duration / WAYPOINT_COUNT
    }

    /// Number of waypoints not yet passed `elapsed` seconds into the flight.
    #[must_use]
    pub fn remaining_waypoints(&self, elapsed: f32) -> usize {
        let interval = self.waypoint_interval();
        if interval <= 0.0 || elapsed >= self.duration {
            return 0;
        }
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "The quotient is clamped to the waypoint count first."
        )]
        let passed = (elapsed / interval)
            .floor()
            .clamp(0.0, WAYPOINT_COUNT) as usize;
        TRAJECTORY_WAYPOINT_COUNT - passed
    }

    fn unvisited(&self, remaining: usize) -> Vec<Vec3> {
        let passed = self.waypoints.len().saturating_sub(remaining);
        self.waypoints
            .get(passed..)
            .map(<[Vec3]>::to_vec)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum JumpPhase {
    Idle,
    WaitingForClearance {
        trajectory: Trajectory,
        poll: ClearancePoll,
    },
    Airborne {
        trajectory: Trajectory,
        elapsed: f32,
        remaining: usize,
    },
}

/// A ballistic jump.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpMove {
    force: f32,
    angle: f32,
    gravity: f32,
    poll_interval: f32,
    alternate: bool,
    launch_forward: bool,
    max_distance: f32,
    phase: JumpPhase,
}

impl JumpMove {
    /// Creates an idle jump for an agent with `profile`.
    #[must_use]
    pub fn new(profile: &MoveProfile, settings: &SwarmSettings) -> Self {
        Self {
            force: profile.jump_force,
            angle: profile.jump_angle,
            gravity: settings.gravity,
            poll_interval: settings.path_check_interval,
            alternate: settings.alternate_jump_direction,
            launch_forward: true,
            max_distance: profile.max_jump_distance,
            phase: JumpPhase::Idle,
        }
    }

    /// Whether no jump is in flight.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, JumpPhase::Idle)
    }

    /// Whether the agent is in the air.
    #[must_use]
    pub const fn is_airborne(&self) -> bool {
        matches!(self.phase, JumpPhase::Airborne { .. })
    }

    /// Whether the next launch faces forward.
    #[must_use]
    pub const fn launches_forward(&self) -> bool {
        self.launch_forward
    }

    /// Horizontal distance of a forward jump.
    #[must_use]
    pub const fn max_jump_distance(&self) -> f32 {
        self.max_distance
    }

    /// Plans the next jump from `pose` and checks its path straight away.
    ///
    /// Does nothing when a jump is already in flight.
    pub fn start(&mut self, pose: &Pose, clearance: &mut dyn Clearance) {
        if !self.is_idle() {
            return;
        }
        let trajectory = Trajectory::plan(
            pose,
            self.force,
            self.angle,
            self.gravity,
            self.launch_forward,
        );
        self.phase = if ClearancePoll::poll_now(trajectory.waypoints(), clearance) {
            Self::airborne(trajectory)
        } else {
            JumpPhase::WaitingForClearance {
                trajectory,
                poll: ClearancePoll::new(self.poll_interval, None),
            }
        };
    }

    const fn airborne(trajectory: Trajectory) -> JumpPhase {
        JumpPhase::Airborne {
            trajectory,
            elapsed: 0.0,
            remaining: TRAJECTORY_WAYPOINT_COUNT,
        }
    }

    /// Advances the jump by `dt` seconds of frame time.
    ///
    /// Jumps wait for clearance indefinitely, so they never abort. Stepping
    /// an idle jump reports [`StepResult::Completed`].
    pub fn step(&mut self, pose: &mut Pose, clearance: &mut dyn Clearance, dt: f32) -> StepResult {
        match &mut self.phase {
            JumpPhase::Idle => StepResult::Completed,
            JumpPhase::WaitingForClearance { trajectory, poll } => {
                let outcome = poll.advance(dt, trajectory.waypoints(), clearance);
                if outcome == PollOutcome::Granted {
                    if let JumpPhase::WaitingForClearance { trajectory, .. } =
                        std::mem::replace(&mut self.phase, JumpPhase::Idle)
                    {
                        self.phase = Self::airborne(trajectory);
                    }
                }
                StepResult::InProgress
            }
            JumpPhase::Airborne {
                trajectory,
                elapsed,
                remaining,
            } => {
                *elapsed += dt;
                let t = elapsed.min(trajectory.duration());
                let fraction = if trajectory.duration() > 0.0 {
                    t / trajectory.duration()
                } else {
                    1.0
                };
                let sign = if self.launch_forward { 1.0 } else { -1.0 };
                pose.position = trajectory.position_at(t);
                pose.mesh_rotation = Quat::from_rotation_x((90.0 * sign * fraction).to_radians());

                let left = trajectory.remaining_waypoints(*elapsed);
                if left != *remaining {
                    *remaining = left;
                    clearance.commit(trajectory.unvisited(left));
                }

                if *elapsed < trajectory.duration() {
                    return StepResult::InProgress;
                }
                pose.position = trajectory.landing();
                clearance.clear();
                if self.alternate {
                    self.launch_forward = !self.launch_forward;
                }
                self.phase = JumpPhase::Idle;
                StepResult::Completed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnemyConfig;
    use crate::reservation::MockClearance;
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn settings() -> SwarmSettings {
        SwarmSettings::default()
    }

    fn jumper(settings: &SwarmSettings) -> JumpMove {
        let config = EnemyConfig {
            jump_force: 6.0,
            jump_angle: 45.0,
            ..EnemyConfig::default()
        };
        JumpMove::new(&MoveProfile::new(&config, settings), settings)
    }

    fn free_clearance() -> MockClearance {
        let mut clearance = MockClearance::new();
        clearance.expect_is_path_free().return_const(true);
        clearance.expect_commit().return_const(());
        clearance.expect_clear().return_const(());
        clearance
    }

    fn fly(jump: &mut JumpMove, pose: &mut Pose, dt: f32) {
        let mut clearance = free_clearance();
        jump.start(pose, &mut clearance);
        for _ in 0..100_000 {
            if jump.step(pose, &mut clearance, dt).is_finished() {
                return;
            }
        }
        panic!("jump did not land");
    }

    #[rstest]
    fn trajectory_samples_sixteen_points_after_launch(settings: SwarmSettings) {
        let pose = Pose::looking_along(Vec3::new(0.0, 0.5, -20.0), Vec3::Z);
        let trajectory = Trajectory::plan(&pose, 6.0, 45.0, settings.gravity, true);
        assert_eq!(trajectory.waypoints().len(), TRAJECTORY_WAYPOINT_COUNT);
        assert_ne!(trajectory.waypoints()[0], pose.position);
        let last = trajectory.waypoints()[TRAJECTORY_WAYPOINT_COUNT - 1];
        assert!((last - trajectory.landing()).length() < 1e-4);
        assert!(trajectory.velocity().y > 0.0);
    }

    #[rstest]
    fn landing_matches_closed_form(settings: SwarmSettings) {
        let pose = Pose::looking_along(Vec3::new(0.0, 0.5, -20.0), Vec3::Z);
        let trajectory = Trajectory::plan(&pose, 6.0, 45.0, settings.gravity, true);
        let v = trajectory.velocity();
        let t = -2.0 * v.y / settings.gravity;
        let expected = pose.position + Vec3::new(v.x * t, 0.0, v.z * t);
        assert_eq!(trajectory.landing(), expected);
        assert_relative_eq!(
            trajectory.landing().z - pose.position.z,
            max_jump_distance(6.0, 45.0, settings.gravity),
            epsilon = 1e-4
        );
    }

    #[rstest]
    #[case(1.0 / 20.0)]
    #[case(1.0 / 60.0)]
    #[case(1.0 / 240.0)]
    #[case(0.37)]
    fn landing_is_independent_of_frame_rate(settings: SwarmSettings, #[case] dt: f32) {
        let start = Vec3::new(2.0, 0.5, -20.0);
        let mut pose = Pose::looking_along(start, Vec3::Z);
        let expected = Trajectory::plan(&pose, 6.0, 45.0, settings.gravity, true).landing();
        let mut jump = jumper(&settings);
        fly(&mut jump, &mut pose, dt);
        assert_eq!(pose.position, expected);
    }

    #[rstest]
    fn jumps_alternate_launch_direction(settings: SwarmSettings) {
        let start = Vec3::new(0.0, 0.5, -20.0);
        let mut pose = Pose::looking_along(start, Vec3::Z);
        let mut jump = jumper(&settings);
        fly(&mut jump, &mut pose, 1.0 / 60.0);
        assert!(pose.position.z > start.z);
        assert!(!jump.launches_forward());
        fly(&mut jump, &mut pose, 1.0 / 60.0);
        assert_relative_eq!(pose.position.z, start.z, epsilon = 1e-4);
    }

    #[rstest]
    fn reservation_shrinks_as_waypoints_pass(settings: SwarmSettings) {
        let pose0 = Pose::looking_along(Vec3::new(0.0, 0.5, -20.0), Vec3::Z);
        let mut pose = pose0;
        let mut jump = jumper(&settings);
        let mut clearance = MockClearance::new();
        clearance.expect_is_path_free().return_const(true);
        let commits = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = std::sync::Arc::clone(&commits);
        clearance
            .expect_commit()
            .returning(move |path| sink.lock().expect("lock").push(path.len()));
        clearance.expect_clear().times(1).return_const(());

        jump.start(&pose, &mut clearance);
        assert!(jump.is_airborne());
        let dt = 1.0 / 120.0;
        while !jump.step(&mut pose, &mut clearance, dt).is_finished() {}

        let lens = commits.lock().expect("lock").clone();
        assert_eq!(lens.first(), Some(&TRAJECTORY_WAYPOINT_COUNT));
        assert!(lens.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(lens.last(), Some(&0));
    }

    #[rstest]
    fn blocked_jump_waits_without_timeout(settings: SwarmSettings) {
        let start = Vec3::new(0.0, 0.5, -20.0);
        let mut pose = Pose::looking_along(start, Vec3::Z);
        let mut jump = jumper(&settings);
        let mut clearance = MockClearance::new();
        clearance.expect_is_path_free().return_const(false);
        clearance.expect_commit().never();
        jump.start(&pose, &mut clearance);
        for _ in 0..600 {
            assert_eq!(
                jump.step(&mut pose, &mut clearance, 0.05),
                StepResult::InProgress
            );
        }
        assert_eq!(pose.position, start);
    }
}
