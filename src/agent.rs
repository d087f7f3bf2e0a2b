//! The cube agent record owned by the swarm arena.
use glam::Vec3;
use slotmap::new_key_type;

use crate::config::{EnemyConfig, EnemyType, MoveProfile, SwarmSettings};
use crate::geometry::Pose;
use crate::health::Health;
use crate::neighbors::NeighborSet;
use crate::reservation::ReservationSurface;
use crate::strategy::MovementStrategy;

new_key_type! {
    /// Generational handle of an agent. Stale handles never alias new agents.
    pub struct AgentId;
}

/// Lifecycle phase of an agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentPhase {
    /// Freshly spawned; the position is validated once the grace runs out.
    Spawning {
        /// Seconds of grace left.
        remaining: f32,
    },
    /// Moving under its strategy.
    Active,
}

/// One cube enemy.
#[derive(Debug, Clone)]
pub struct Agent {
    pub(crate) kind: EnemyType,
    pub(crate) pose: Pose,
    pub(crate) profile: MoveProfile,
    pub(crate) reservation: ReservationSurface,
    pub(crate) neighbors: NeighborSet,
    pub(crate) health: Health,
    pub(crate) phase: AgentPhase,
    /// Taken out while the agent is being stepped.
    pub(crate) strategy: Option<MovementStrategy>,
}

impl Agent {
    /// Sets an agent up from its validated configuration.
    ///
    /// The neighbour radius is sized from the strategy's largest step before
    /// the agent is handed to the swarm, so it is never visible unsized.
    pub(crate) fn new(config: &EnemyConfig, mut pose: Pose, settings: &SwarmSettings) -> Self {
        let profile = MoveProfile::new(config, settings);
        let strategy = MovementStrategy::for_kind(config.kind, &profile, settings);
        pose.position.y = profile.half_size;
        Self {
            kind: config.kind,
            pose,
            reservation: ReservationSurface::new(profile.size),
            neighbors: NeighborSet::new(
                strategy.max_step_distance() * settings.neighbor_radius_factor,
            ),
            health: Health::new(config.hit_points),
            phase: AgentPhase::Spawning {
                remaining: settings.spawn_grace,
            },
            strategy: Some(strategy),
            profile,
        }
    }

    /// Behaviour family.
    #[must_use]
    pub const fn kind(&self) -> EnemyType {
        self.kind
    }

    /// Placement and orientation.
    #[must_use]
    pub const fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Centre of the cube.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.pose.position
    }

    /// Bounding-sphere radius.
    #[must_use]
    pub const fn size(&self) -> f32 {
        self.profile.size
    }

    /// Derived movement parameters.
    #[must_use]
    pub const fn profile(&self) -> &MoveProfile {
        &self.profile
    }

    /// Reservations published to neighbours.
    #[must_use]
    pub const fn reservation(&self) -> &ReservationSurface {
        &self.reservation
    }

    /// Agents currently within range.
    #[must_use]
    pub const fn neighbors(&self) -> &NeighborSet {
        &self.neighbors
    }

    /// Hit points.
    #[must_use]
    pub const fn health(&self) -> &Health {
        &self.health
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> AgentPhase {
        self.phase
    }

    /// Whether the spawn grace is over.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.phase, AgentPhase::Active)
    }

    /// Whether a move is in flight, i.e. the agent holds a reservation.
    #[must_use]
    pub fn is_in_motion(&self) -> bool {
        self.reservation.is_reserved()
    }

    /// Largest distance between two consecutive points the agent occupies
    /// or reserves: one edge for a roll, one waypoint spacing for a jump.
    #[must_use]
    pub fn sweep_gap(&self) -> f32 {
        match self.kind {
            EnemyType::Jumper => self.profile.edge_size.max(self.profile.waypoint_spacing),
            EnemyType::Simple | EnemyType::Zigzag => self.profile.edge_size,
        }
    }

    /// Movement behaviour.
    #[must_use]
    pub const fn strategy(&self) -> Option<&MovementStrategy> {
        self.strategy.as_ref()
    }
}
