//! Simulation constants shared by the movement and spawning systems.
//!
//! Anything a level designer is expected to tweak is also exposed through
//! [`crate::config::SwarmSettings`], which uses these as its defaults.

/// Vertical gravitational acceleration in units per second squared.
pub const GRAVITY: f32 = -9.81;
/// Duration of one physics tick in seconds. Roll rotation advances in these steps.
pub const FIXED_TIMESTEP: f32 = 0.02;
/// Interval between two clearance polls of a pending move.
pub const PATH_CHECK_INTERVAL_SECONDS: f32 = 0.25;
/// A roll gives up when its path stays contested for this long.
pub const ROLL_CLEARANCE_TIMEOUT_SECONDS: f32 = 2.0;
/// Number of sampled waypoints along a jump trajectory.
pub const TRAJECTORY_WAYPOINT_COUNT: usize = 16;
/// Total rotation of a single roll, in degrees.
pub const ROLL_ANGLE_DEGREES: f32 = 90.0;
/// Remaining roll angle below which the rotation counts as finished.
pub const ROLL_ANGLE_EPSILON: f32 = 1e-4;
/// Neighbour tracking radius as a multiple of the largest single step.
pub const NEIGHBOR_RADIUS_FACTOR: f32 = 3.0;
/// Delay between spawning and validating the spawn position.
pub const SPAWN_GRACE_SECONDS: f32 = 0.5;
/// Probability of picking `Left` once a sideways roll has been chosen.
pub const LEFT_ROLL_SHARE: f32 = 0.5;

/// Lower bound of a cube edge.
pub const MIN_EDGE_SIZE: f32 = 0.2;
/// Upper bound of a cube edge.
pub const MAX_EDGE_SIZE: f32 = 10.0;
/// Lower bound of the rolling speed in units per second.
pub const MIN_SPEED: f32 = 0.2;
/// Upper bound of the rolling speed in units per second.
pub const MAX_SPEED: f32 = 5.0;
/// Lower bound of the jump launch angle in degrees.
pub const MIN_JUMP_ANGLE: f32 = 10.0;
/// Upper bound of the jump launch angle in degrees.
pub const MAX_JUMP_ANGLE: f32 = 90.0;

/// Smallest interval allowed between two spawns.
pub const MIN_SPAWN_INTERVAL: f32 = 0.01;
/// Cap on spawns attempted within a single tick.
pub const MAX_SPAWN_COUNT_PER_TICK: f32 = 12.0;
/// Ring positions tried before a spawn attempt is abandoned.
pub const SPAWN_POSITION_ATTEMPTS: usize = 8;
/// Extra spacing required around a fresh spawn.
pub const SPAWN_CLEARANCE_MARGIN: f32 = 0.1;
