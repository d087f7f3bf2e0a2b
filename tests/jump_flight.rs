//! Jump flights and the jump-or-roll decision.

use approx::assert_relative_eq;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rollcubes::{
    JumpMove, JumpStrategy, MoveProfile, NeighborView, NeighborhoodClearance, Pose,
    ReservationSurface, StepResult, SwarmSettings, Trajectory,
};
use rstest::{fixture, rstest};
use test_utils::{assert_vec3_near, fixtures::eager_jumper, fixtures::unit_pose};

#[fixture]
fn settings() -> SwarmSettings {
    SwarmSettings::default()
}

#[fixture]
fn profile(settings: SwarmSettings) -> MoveProfile {
    MoveProfile::new(&eager_jumper(), &settings)
}

fn fly(jump: &mut JumpMove, pose: &mut Pose, surface: &mut ReservationSurface, dt: f32) {
    let mut clearance = NeighborhoodClearance::new(surface, Vec::new());
    jump.start(pose, &mut clearance);
    for _ in 0..100_000 {
        if jump.step(pose, &mut clearance, dt) == StepResult::Completed {
            return;
        }
    }
    panic!("jump did not land");
}

#[rstest]
fn landing_matches_closed_form(profile: MoveProfile, settings: SwarmSettings) {
    let pose = unit_pose(0.0, -20.0);
    let trajectory = Trajectory::plan(
        &pose,
        profile.jump_force,
        profile.jump_angle,
        settings.gravity,
        true,
    );
    let angle = profile.jump_angle.to_radians();
    let vy = profile.jump_force * angle.sin();
    let vz = profile.jump_force * angle.cos();
    let duration = -2.0 * vy / settings.gravity;

    assert_relative_eq!(trajectory.duration(), duration, epsilon = 1e-5);
    assert_vec3_near(
        trajectory.landing(),
        pose.position + Vec3::new(0.0, 0.0, vz * duration),
        1e-4,
    );
    assert_relative_eq!(
        trajectory.landing().z - pose.position.z,
        profile.max_jump_distance,
        epsilon = 1e-4
    );
}

#[rstest]
fn landing_is_independent_of_frame_rate(profile: MoveProfile, settings: SwarmSettings) {
    let landings: Vec<Vec3> = [1.0 / 15.0, 1.0 / 60.0, 1.0 / 144.0, 0.4]
        .into_iter()
        .map(|dt| {
            let mut jump = JumpMove::new(&profile, &settings);
            let mut pose = unit_pose(0.0, -20.0);
            let mut surface = ReservationSurface::new(profile.size);
            fly(&mut jump, &mut pose, &mut surface, dt);
            assert!(!surface.is_reserved());
            pose.position
        })
        .collect();
    let first = landings[0];
    for landing in &landings {
        assert_vec3_near(*landing, first, 1e-5);
    }
    assert_relative_eq!(first.y, 0.5);
}

#[rstest]
fn blocked_landing_delays_the_jump(profile: MoveProfile, settings: SwarmSettings) {
    let mut jump = JumpMove::new(&profile, &settings);
    let mut pose = unit_pose(0.0, -20.0);
    let mut surface = ReservationSurface::new(profile.size);
    let landing = Trajectory::plan(
        &pose,
        profile.jump_force,
        profile.jump_angle,
        settings.gravity,
        true,
    )
    .landing();
    let blocker = ReservationSurface::new(profile.size);

    {
        let views = vec![NeighborView {
            position: landing,
            surface: &blocker,
        }];
        let mut clearance = NeighborhoodClearance::new(&mut surface, views);
        jump.start(&pose, &mut clearance);
        for _ in 0..600 {
            assert_eq!(
                jump.step(&mut pose, &mut clearance, 1.0 / 60.0),
                StepResult::InProgress
            );
        }
    }
    assert!(!jump.is_airborne());
    assert_eq!(pose.position, Vec3::new(0.0, 0.5, -20.0));

    let mut clearance = NeighborhoodClearance::new(&mut surface, Vec::new());
    for _ in 0..20 {
        jump.step(&mut pose, &mut clearance, 1.0 / 60.0);
    }
    assert!(jump.is_airborne());
}

#[rstest]
fn jumper_never_jumps_within_reach(profile: MoveProfile, settings: SwarmSettings) {
    let strategy = JumpStrategy::new(&profile, &settings);
    let mut rng = SmallRng::seed_from_u64(3);
    let reach = strategy.max_step_distance();
    for position in [
        Vec3::new(0.0, 0.5, -reach * 0.9),
        Vec3::new(reach * 0.5, 0.5, reach * 0.5),
        Vec3::new(0.0, 0.5, 0.0),
    ] {
        for _ in 0..100 {
            assert!(!strategy.should_jump(position, &mut rng));
        }
    }
}

#[rstest]
fn jumper_beyond_reach_jumps_on_next_decision(profile: MoveProfile, settings: SwarmSettings) {
    let strategy = JumpStrategy::new(&profile, &settings);
    let mut rng = SmallRng::seed_from_u64(3);
    let far = Vec3::new(0.0, 0.5, -strategy.max_step_distance() * 1.1);
    for _ in 0..100 {
        assert!(strategy.should_jump(far, &mut rng));
    }
}
