#![cfg_attr(docsrs, feature(doc_cfg))]
//! Cube enemies that roll and jump towards a target point without colliding.
//!
//! Agents reserve the space their next move sweeps through and only start
//! moving once no neighbour's body or reservation overlaps it. The
//! [`Swarm`] owns every agent and advances them once per frame; the
//! [`SpawnDirector`] keeps a wave populated and [`SwarmPlugin`] hooks both
//! into a Bevy app.
pub mod agent;
pub mod config;
pub mod constants;
pub mod events;
pub mod geometry;
pub mod health;
pub mod logging;
pub mod moves;
pub mod neighbors;
pub mod plugin;
pub mod proximity;
pub mod reservation;
pub mod spawner;
pub mod strategy;
pub mod swarm;

pub use agent::{Agent, AgentId, AgentPhase};
pub use config::{
    ConfigError, EnemyConfig, EnemyType, GameConfig, MoveProfile, SwarmSettings, WaveConfig,
};
pub use events::{RemovalCause, StepOutcome, SwarmEvent};
pub use geometry::Pose;
pub use health::{Health, HitOutcome};
pub use logging::init as init_logging;
pub use moves::{JumpMove, Move, MoveError, RollDirection, RollMove, StepResult, Trajectory};
pub use neighbors::NeighborSet;
pub use plugin::SwarmPlugin;
pub use reservation::{Clearance, NeighborView, NeighborhoodClearance, ReservationSurface};
pub use spawner::{SpawnDirector, SpawnTable};
pub use strategy::{JumpStrategy, MovementStrategy, RollStrategy};
pub use swarm::{SeparationViolation, Swarm, SwarmError};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use rollcubes::prelude::*;
    //! ```

    pub use crate::config::{EnemyConfig, EnemyType, SwarmSettings};
    pub use crate::events::SwarmEvent;
    pub use crate::geometry::Pose;
    pub use crate::spawner::SpawnDirector;
    pub use crate::swarm::Swarm;
    pub use crate::SwarmPlugin;
}
