//! Roll moves driven against explicit neighbourhoods.
//!
//! Each test owns the mover's reservation surface and a list of neighbours,
//! so the clearance a roll sees can be changed between frames.

use approx::assert_relative_eq;
use glam::Vec3;
use rollcubes::{
    EnemyConfig, MoveError, MoveProfile, NeighborView, NeighborhoodClearance, Pose,
    ReservationSurface, RollDirection, RollMove, StepResult, SwarmSettings,
};
use rstest::{fixture, rstest};
use test_utils::{assert_vec3_near, fixtures::straight_roller, fixtures::unit_pose};

const DT: f32 = 1.0 / 60.0;

struct Mover {
    roll: RollMove,
    pose: Pose,
    surface: ReservationSurface,
}

impl Mover {
    fn new(config: &EnemyConfig, pose: Pose) -> Self {
        let settings = SwarmSettings::default();
        let profile = MoveProfile::new(config, &settings);
        Self {
            roll: RollMove::new(&profile, &settings),
            pose,
            surface: ReservationSurface::new(profile.size),
        }
    }

    fn start(&mut self, direction: RollDirection, others: &[(Vec3, ReservationSurface)]) {
        let mut clearance = NeighborhoodClearance::new(&mut self.surface, views(others));
        self.roll.start(direction, &self.pose, &mut clearance);
    }

    fn step(&mut self, others: &[(Vec3, ReservationSurface)]) -> StepResult {
        let mut clearance = NeighborhoodClearance::new(&mut self.surface, views(others));
        self.roll.step(&mut self.pose, &mut clearance, DT)
    }

    fn finish(&mut self, others: &[(Vec3, ReservationSurface)]) -> StepResult {
        for _ in 0..1_000 {
            let result = self.step(others);
            if result.is_finished() {
                return result;
            }
        }
        panic!("roll did not finish within 1000 frames");
    }
}

fn views(others: &[(Vec3, ReservationSurface)]) -> Vec<NeighborView<'_>> {
    others
        .iter()
        .map(|(position, surface)| NeighborView {
            position: *position,
            surface,
        })
        .collect()
}

fn unit_blocker(z: f32) -> (Vec3, ReservationSurface) {
    let size = EnemyConfig::default().half_body_diagonal();
    (Vec3::new(0.0, 0.5, z), ReservationSurface::new(size))
}

#[fixture]
fn mover() -> Mover {
    Mover::new(&straight_roller(), unit_pose(0.0, 0.0))
}

#[rstest]
fn clear_path_forward_roll_lands_one_edge_ahead(mut mover: Mover) {
    mover.start(RollDirection::Forward, &[]);
    assert_eq!(mover.finish(&[]), StepResult::Completed);
    assert_vec3_near(mover.pose.position, Vec3::new(0.0, 0.5, 1.0), 1e-5);
    assert_eq!(mover.pose.position.y, 0.5);
}

#[rstest]
#[case(RollDirection::Forward, Vec3::new(0.0, 1.0, 2.0))]
#[case(RollDirection::Back, Vec3::new(0.0, 1.0, -2.0))]
fn larger_cubes_roll_a_full_edge(#[case] direction: RollDirection, #[case] expected: Vec3) {
    let config = EnemyConfig {
        edge_size: 2.0,
        ..straight_roller()
    };
    let pose = Pose::looking_along(Vec3::new(0.0, 1.0, 0.0), Vec3::Z);
    let mut mover = Mover::new(&config, pose);
    mover.start(direction, &[]);
    assert_eq!(mover.finish(&[]), StepResult::Completed);
    assert_vec3_near(mover.pose.position, expected, 1e-5);
    assert_eq!(mover.pose.position.y, 1.0);
}

#[rstest]
fn reservation_is_held_only_while_rolling(mut mover: Mover) {
    assert!(!mover.surface.is_reserved());
    mover.start(RollDirection::Forward, &[]);
    assert_eq!(mover.surface.committed_path(), &[Vec3::new(0.0, 0.5, 1.0)]);

    while mover.step(&[]) == StepResult::InProgress {
        assert!(mover.surface.is_reserved());
    }
    assert!(!mover.surface.is_reserved());
}

#[rstest]
fn blocked_roll_times_out_in_place(mut mover: Mover) {
    let blockers = [unit_blocker(1.0)];
    mover.start(RollDirection::Forward, &blockers);
    assert!(!mover.surface.is_reserved());

    let result = mover.finish(&blockers);
    let StepResult::Aborted(MoveError::ClearanceTimeout { waited }) = result else {
        panic!("expected a clearance timeout, got {result:?}");
    };
    assert!(waited >= 2.0);
    assert_eq!(mover.pose.position, Vec3::new(0.0, 0.5, 0.0));
    assert!(!mover.surface.is_reserved());
    assert_eq!(
        mover.surface.provisional_path(),
        &[Vec3::new(0.0, 0.5, 1.0)]
    );
    assert!(mover.roll.is_idle());
}

#[rstest]
fn blocked_roll_proceeds_once_blocker_leaves(mut mover: Mover) {
    let mut blockers = [unit_blocker(1.0)];
    mover.start(RollDirection::Forward, &blockers);
    for _ in 0..30 {
        assert_eq!(mover.step(&blockers), StepResult::InProgress);
    }
    assert!(!mover.roll.is_rotating());
    assert_eq!(mover.pose.position, Vec3::new(0.0, 0.5, 0.0));

    blockers[0].0 = Vec3::new(0.0, 0.5, 5.0);
    for _ in 0..16 {
        mover.step(&blockers);
    }
    assert!(mover.roll.is_rotating());
    assert!(mover.surface.is_reserved());

    assert_eq!(mover.finish(&blockers), StepResult::Completed);
    assert_vec3_near(mover.pose.position, Vec3::new(0.0, 0.5, 1.0), 1e-5);
}

#[rstest]
fn committed_neighbour_path_blocks_like_a_body(mut mover: Mover) {
    let (_, mut surface) = unit_blocker(0.0);
    surface.commit(vec![Vec3::new(0.0, 0.5, 1.0)]);
    let blockers = [(Vec3::new(3.0, 0.5, 1.0), surface)];

    mover.start(RollDirection::Forward, &blockers);
    assert!(!mover.roll.is_rotating());
    assert_relative_eq!(mover.pose.position.z, 0.0);
}

#[rstest]
fn lateral_roll_keeps_facing_the_target() {
    let config = straight_roller();
    let pose = Pose::looking_along(Vec3::new(4.0, 0.5, -6.0), Vec3::new(-4.0, 0.0, 6.0));
    let mut mover = Mover::new(&config, pose);
    mover.start(RollDirection::Left, &[]);
    assert_eq!(mover.finish(&[]), StepResult::Completed);

    let to_target = (Vec3::new(0.0, 0.5, 0.0) - mover.pose.position).normalize();
    assert_vec3_near(mover.pose.forward(), to_target, 1e-4);
}
