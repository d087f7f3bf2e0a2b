//! Convenience constructors for configurations and populated swarms.

use glam::Vec3;
use rollcubes::{AgentId, EnemyConfig, EnemyType, Pose, Swarm, SwarmSettings};

/// Unit cube rolling one edge per second that never drifts sideways.
///
/// # Examples
/// ```
/// use test_utils::fixtures::straight_roller;
/// let config = straight_roller();
/// assert_eq!(config.side_roll_chance, 0.0);
/// ```
pub fn straight_roller() -> EnemyConfig {
    EnemyConfig {
        side_roll_chance: 0.0,
        ..EnemyConfig::for_kind(EnemyType::Simple)
    }
}

/// Jumper that always jumps when its target is out of reach.
pub fn eager_jumper() -> EnemyConfig {
    EnemyConfig {
        jump_chance: 1.0,
        ..EnemyConfig::for_kind(EnemyType::Jumper)
    }
}

/// Default settings with a fixed seed.
pub fn seeded_settings(seed: u64) -> SwarmSettings {
    SwarmSettings {
        seed,
        ..SwarmSettings::default()
    }
}

/// Empty swarm with default settings and seed `0`.
pub fn empty_swarm() -> Swarm {
    Swarm::new(seeded_settings(0))
}

/// Resting pose of a unit cube at `(x, z)` facing `+Z`.
pub fn unit_pose(x: f32, z: f32) -> Pose {
    Pose::looking_along(Vec3::new(x, 0.5, z), Vec3::Z)
}

/// Spawns `count` agents in single file along `+Z`, `spacing` apart, all
/// facing `+Z`. The first id is the leader.
pub fn spawn_column(
    swarm: &mut Swarm,
    config: &EnemyConfig,
    leader: Vec3,
    spacing: f32,
    count: usize,
) -> Vec<AgentId> {
    let mut position = leader;
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        ids.push(swarm.spawn_facing(config, position, Vec3::Z));
        position.z -= spacing;
    }
    ids
}
