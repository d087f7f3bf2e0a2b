//! Enemy, wave and swarm configuration.
//!
//! Configuration arrives as JSON and is validated once at load time. Values
//! outside their design range are clamped with a warning, while values that
//! cannot be repaired (non-finite numbers, non-positive forces) are rejected
//! with a [`ConfigError`].
use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    FIXED_TIMESTEP, GRAVITY, MAX_EDGE_SIZE, MAX_JUMP_ANGLE, MAX_SPEED, MIN_EDGE_SIZE,
    MIN_JUMP_ANGLE, MIN_SPAWN_INTERVAL, MIN_SPEED, NEIGHBOR_RADIUS_FACTOR,
    PATH_CHECK_INTERVAL_SECONDS, ROLL_ANGLE_DEGREES, ROLL_CLEARANCE_TIMEOUT_SECONDS,
    SPAWN_GRACE_SECONDS,
};
use crate::moves::jump::{max_jump_distance, WAYPOINT_COUNT};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric field held NaN or infinity.
    #[error("`{field}` must be a finite number")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A field that must be strictly positive was not.
    #[error("`{field}` must be positive, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// Gravity must pull downwards for jumps to land.
    #[error("gravity must be negative, got {0}")]
    UpwardGravity(f32),
    /// Enemies need at least one hit point.
    #[error("hit points must be at least one")]
    NoHitPoints,
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file was not valid JSON for [`GameConfig`].
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// File that was requested.
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
}

fn finite(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

fn positive(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    let value = finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn clamped(field: &'static str, value: f32, min: f32, max: f32) -> Result<f32, ConfigError> {
    let value = finite(field, value)?;
    let result = value.clamp(min, max);
    if (result - value).abs() > f32::EPSILON {
        warn!("`{field}` = {value} is outside [{min}, {max}]; using {result}");
    }
    Ok(result)
}

/// Behavioural family of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnemyType {
    /// Rolls forward, occasionally drifting sideways.
    #[default]
    Simple,
    /// Jumps when far from the target, rolls otherwise.
    Jumper,
    /// Rolls with frequent sideways drift.
    Zigzag,
}

impl EnemyType {
    /// Every spawnable enemy type in spawn-table order.
    pub const ALL: [Self; 3] = [Self::Simple, Self::Jumper, Self::Zigzag];
}

/// Per-type enemy parameters as authored by designers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Behaviour family.
    pub kind: EnemyType,
    /// Cube edge length in world units.
    pub edge_size: f32,
    /// Rolling speed in world units per second.
    pub speed_units_per_second: f32,
    /// Launch speed of a jump.
    pub jump_force: f32,
    /// Launch elevation of a jump in degrees.
    pub jump_angle: f32,
    /// Probability of jumping when the target is out of reach.
    pub jump_chance: f32,
    /// Probability of drifting sideways after a roll.
    pub side_roll_chance: f32,
    /// Starting hit points.
    pub hit_points: u32,
    /// Multiplier applied to the rolling speed at setup.
    pub speed_multiplier: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            kind: EnemyType::Simple,
            edge_size: 1.0,
            speed_units_per_second: 1.0,
            jump_force: 6.0,
            jump_angle: 45.0,
            jump_chance: 0.5,
            side_roll_chance: 0.0,
            hit_points: 100,
            speed_multiplier: 1.0,
        }
    }
}

impl EnemyConfig {
    /// Default parameters for `kind`.
    #[must_use]
    pub fn for_kind(kind: EnemyType) -> Self {
        match kind {
            EnemyType::Simple => Self::default(),
            EnemyType::Jumper => Self {
                kind,
                jump_chance: 0.5,
                hit_points: 80,
                ..Self::default()
            },
            EnemyType::Zigzag => Self {
                kind,
                side_roll_chance: 0.4,
                speed_units_per_second: 1.5,
                hit_points: 60,
                ..Self::default()
            },
        }
    }

    /// Checks every field and clamps the ranged ones into their design range.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for non-finite values, a non-positive jump
    /// force or speed multiplier, or zero hit points.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.hit_points == 0 {
            return Err(ConfigError::NoHitPoints);
        }
        Ok(Self {
            kind: self.kind,
            edge_size: clamped("edge_size", self.edge_size, MIN_EDGE_SIZE, MAX_EDGE_SIZE)?,
            speed_units_per_second: clamped(
                "speed_units_per_second",
                self.speed_units_per_second,
                MIN_SPEED,
                MAX_SPEED,
            )?,
            jump_force: positive("jump_force", self.jump_force)?,
            jump_angle: clamped("jump_angle", self.jump_angle, MIN_JUMP_ANGLE, MAX_JUMP_ANGLE)?,
            jump_chance: clamped("jump_chance", self.jump_chance, 0.0, 1.0)?,
            side_roll_chance: clamped("side_roll_chance", self.side_roll_chance, 0.0, 1.0)?,
            hit_points: self.hit_points,
            speed_multiplier: positive("speed_multiplier", self.speed_multiplier)?,
        })
    }

    /// Half of the cube's body diagonal; the radius of its bounding sphere.
    #[must_use]
    pub fn half_body_diagonal(&self) -> f32 {
        3.0_f32.sqrt() * self.edge_size / 2.0
    }
}

/// Movement parameters derived once when an agent is set up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveProfile {
    /// Cube edge length.
    pub edge_size: f32,
    /// Half the edge length; the resting centre height.
    pub half_size: f32,
    /// Bounding-sphere radius used by every overlap test.
    pub size: f32,
    /// Effective rolling speed after the multiplier.
    pub speed: f32,
    /// Degrees rotated per fixed physics tick while rolling.
    pub roll_angle_per_tick: f32,
    /// Launch speed of a jump.
    pub jump_force: f32,
    /// Launch elevation of a jump in degrees.
    pub jump_angle: f32,
    /// Probability of jumping when the target is out of reach.
    pub jump_chance: f32,
    /// Probability of drifting sideways after a roll.
    pub side_roll_chance: f32,
    /// Horizontal distance covered by a forward jump.
    pub max_jump_distance: f32,
    /// Upper bound on the distance flown between two jump waypoints: the
    /// launch speed times the waypoint interval.
    pub waypoint_spacing: f32,
}

impl MoveProfile {
    /// Derives the profile of `config` under the physics of `settings`.
    #[must_use]
    pub fn new(config: &EnemyConfig, settings: &SwarmSettings) -> Self {
        let speed = config.speed_units_per_second * config.speed_multiplier;
        let flight_time =
            -2.0 * config.jump_force * config.jump_angle.to_radians().sin() / settings.gravity;
        Self {
            edge_size: config.edge_size,
            half_size: config.edge_size / 2.0,
            size: config.half_body_diagonal(),
            speed,
            roll_angle_per_tick: speed / config.edge_size
                * ROLL_ANGLE_DEGREES
                * settings.fixed_timestep,
            jump_force: config.jump_force,
            jump_angle: config.jump_angle,
            jump_chance: config.jump_chance,
            side_roll_chance: config.side_roll_chance,
            max_jump_distance: max_jump_distance(
                config.jump_force,
                config.jump_angle,
                settings.gravity,
            ),
            waypoint_spacing: config.jump_force * flight_time / WAYPOINT_COUNT,
        }
    }
}

/// Simulation-wide tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmSettings {
    /// Vertical acceleration applied to jumps.
    pub gravity: f32,
    /// Length of one physics tick in seconds.
    pub fixed_timestep: f32,
    /// Interval between clearance polls of a pending move.
    pub path_check_interval: f32,
    /// How long a roll waits for clearance before giving up.
    pub roll_clearance_timeout: f32,
    /// Neighbour radius as a multiple of the largest step.
    pub neighbor_radius_factor: f32,
    /// Delay before a fresh spawn validates its position.
    pub spawn_grace: f32,
    /// Point every agent advances towards.
    pub target_point: Vec3,
    /// Alternate forward and backward jump launches.
    pub alternate_jump_direction: bool,
    /// Seed of the swarm's random source.
    pub seed: u64,
}

impl Default for SwarmSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            fixed_timestep: FIXED_TIMESTEP,
            path_check_interval: PATH_CHECK_INTERVAL_SECONDS,
            roll_clearance_timeout: ROLL_CLEARANCE_TIMEOUT_SECONDS,
            neighbor_radius_factor: NEIGHBOR_RADIUS_FACTOR,
            spawn_grace: SPAWN_GRACE_SECONDS,
            target_point: Vec3::ZERO,
            alternate_jump_direction: true,
            seed: 0,
        }
    }
}

impl SwarmSettings {
    /// Rejects settings that would stall or destabilise the simulation.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a duration or factor is not positive, a
    /// value is not finite, or gravity does not point down.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let gravity = finite("gravity", self.gravity)?;
        if gravity >= 0.0 {
            return Err(ConfigError::UpwardGravity(gravity));
        }
        positive("fixed_timestep", self.fixed_timestep)?;
        positive("path_check_interval", self.path_check_interval)?;
        positive("roll_clearance_timeout", self.roll_clearance_timeout)?;
        positive("neighbor_radius_factor", self.neighbor_radius_factor)?;
        finite("spawn_grace", self.spawn_grace)?;
        if !self.target_point.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "target_point",
            });
        }
        Ok(self)
    }
}

/// Timing, population and placement rules of one spawn wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Human-readable wave identifier.
    pub id: String,
    /// Seconds between consecutive spawns.
    pub spawn_interval_seconds: f32,
    /// Upper bound on simultaneously live enemies.
    pub max_live_count: u32,
    /// Relative weight of [`EnemyType::Simple`].
    pub spawn_chance_simple: f32,
    /// Relative weight of [`EnemyType::Jumper`].
    pub spawn_chance_jumper: f32,
    /// Relative weight of [`EnemyType::Zigzag`].
    pub spawn_chance_zigzag: f32,
    /// Inner radius of the spawn ring around the target point.
    pub min_spawn_distance: f32,
    /// Outer radius of the spawn ring around the target point.
    pub max_spawn_distance: f32,
    /// Speed multiplier applied to every enemy of this wave.
    pub speed_multiplier: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            id: "wave-1".to_owned(),
            spawn_interval_seconds: 0.5,
            max_live_count: 40,
            spawn_chance_simple: 0.6,
            spawn_chance_jumper: 0.2,
            spawn_chance_zigzag: 0.2,
            min_spawn_distance: 15.0,
            max_spawn_distance: 25.0,
            speed_multiplier: 1.0,
        }
    }
}

impl WaveConfig {
    /// Weight assigned to `kind`.
    #[must_use]
    pub const fn spawn_chance(&self, kind: EnemyType) -> f32 {
        match kind {
            EnemyType::Simple => self.spawn_chance_simple,
            EnemyType::Jumper => self.spawn_chance_jumper,
            EnemyType::Zigzag => self.spawn_chance_zigzag,
        }
    }

    /// Normalises the wave: clamps weights and the interval, and lifts the
    /// outer spawn radius to at least the inner one.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for non-finite values or a non-positive
    /// spawn distance or speed multiplier.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let min_spawn_distance = positive("min_spawn_distance", self.min_spawn_distance)?;
        let max_spawn_distance =
            finite("max_spawn_distance", self.max_spawn_distance)?.max(min_spawn_distance);
        Ok(Self {
            spawn_interval_seconds: finite("spawn_interval_seconds", self.spawn_interval_seconds)?
                .max(MIN_SPAWN_INTERVAL),
            spawn_chance_simple: clamped(
                "spawn_chance_simple",
                self.spawn_chance_simple,
                0.0,
                1.0,
            )?,
            spawn_chance_jumper: clamped(
                "spawn_chance_jumper",
                self.spawn_chance_jumper,
                0.0,
                1.0,
            )?,
            spawn_chance_zigzag: clamped(
                "spawn_chance_zigzag",
                self.spawn_chance_zigzag,
                0.0,
                1.0,
            )?,
            min_spawn_distance,
            max_spawn_distance,
            speed_multiplier: positive("speed_multiplier", self.speed_multiplier)?,
            ..self
        })
    }
}

/// Everything the headless runner needs, loadable from one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Simulation tunables.
    pub settings: SwarmSettings,
    /// One entry per enemy type; later duplicates win.
    pub enemies: Vec<EnemyConfig>,
    /// Waves in play order.
    pub waves: Vec<WaveConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            settings: SwarmSettings::default(),
            enemies: EnemyType::ALL
                .into_iter()
                .map(EnemyConfig::for_kind)
                .collect(),
            waves: vec![WaveConfig::default()],
        }
    }
}

impl GameConfig {
    /// Reads and validates a JSON configuration file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`] when the file
    /// cannot be read or decoded, and any validation error of its parts.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validated()
    }

    /// Validates the settings, every enemy and every wave.
    ///
    /// # Errors
    /// Propagates the first [`ConfigError`] found.
    pub fn validated(self) -> Result<Self, ConfigError> {
        Ok(Self {
            settings: self.settings.validated()?,
            enemies: self
                .enemies
                .into_iter()
                .map(EnemyConfig::validated)
                .collect::<Result<_, _>>()?,
            waves: self
                .waves
                .into_iter()
                .map(WaveConfig::validated)
                .collect::<Result<_, _>>()?,
        })
    }

    /// Configuration for `kind`, if one was provided.
    #[must_use]
    pub fn enemy(&self, kind: EnemyType) -> Option<&EnemyConfig> {
        self.enemies.iter().rev().find(|config| config.kind == kind)
    }
}
