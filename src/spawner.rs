//! Wave-driven enemy spawning on a ring around the target point.
use std::f32::consts::TAU;

use glam::Vec3;
use hashbrown::HashSet;
use log::{debug, warn};
use rand::{Rng, RngCore};

use crate::agent::AgentId;
use crate::config::{EnemyConfig, EnemyType, WaveConfig};
use crate::constants::{MAX_SPAWN_COUNT_PER_TICK, SPAWN_CLEARANCE_MARGIN, SPAWN_POSITION_ATTEMPTS};
use crate::events::{RemovalCause, SwarmEvent};
use crate::geometry::distance_squared;
use crate::swarm::Swarm;

/// Enemy types of a wave with their running spawn-chance totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnTable {
    entries: Vec<(f32, EnemyType)>,
}

impl SpawnTable {
    /// Builds the cumulative table for `wave`. Types with no chance are left
    /// out.
    #[must_use]
    pub fn from_wave(wave: &WaveConfig) -> Self {
        Self::from_chances(EnemyType::ALL.map(|kind| (kind, wave.spawn_chance(kind))))
    }

    /// Builds the cumulative table from `(type, chance)` pairs in order.
    #[must_use]
    pub fn from_chances<I>(chances: I) -> Self
    where
        I: IntoIterator<Item = (EnemyType, f32)>,
    {
        let mut total = 0.0;
        let entries = chances
            .into_iter()
            .filter(|(_, chance)| *chance > 0.0)
            .map(|(kind, chance)| {
                total += chance;
                (total, kind)
            })
            .collect();
        Self { entries }
    }

    /// Sum of every chance in the table.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.entries.last().map_or(0.0, |(total, _)| *total)
    }

    /// Whether no type can be spawned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First type whose cumulative chance reaches `roll`.
    ///
    /// Rolls past the end of the table, and empty tables, yield
    /// [`EnemyType::Simple`].
    #[must_use]
    pub fn pick(&self, roll: f32) -> EnemyType {
        self.entries
            .iter()
            .find(|(cumulative, _)| *cumulative >= roll)
            .map_or(EnemyType::Simple, |(_, kind)| *kind)
    }

    /// Picks a type with a uniform roll over the table total.
    pub fn pick_random(&self, rng: &mut dyn RngCore) -> EnemyType {
        if self.is_empty() {
            return EnemyType::Simple;
        }
        self.pick(rng.random_range(0.0..self.total()))
    }
}

/// Keeps a wave populated by spawning enemies on a timer.
#[derive(Debug, Clone)]
pub struct SpawnDirector {
    wave: WaveConfig,
    table: SpawnTable,
    enemies: Vec<EnemyConfig>,
    elapsed_since_last_spawn: f32,
    spawned: HashSet<AgentId>,
    eliminated: u32,
}

impl SpawnDirector {
    /// Creates a director for `wave` drawing enemy parameters from
    /// `enemies`. Later entries of the same type win.
    #[must_use]
    pub fn new(wave: WaveConfig, enemies: &[EnemyConfig]) -> Self {
        Self {
            table: SpawnTable::from_wave(&wave),
            wave,
            enemies: enemies.to_vec(),
            elapsed_since_last_spawn: 0.0,
            spawned: HashSet::new(),
            eliminated: 0,
        }
    }

    /// The wave being played.
    #[must_use]
    pub const fn wave(&self) -> &WaveConfig {
        &self.wave
    }

    /// Enemies spawned by this director that are still live.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.spawned.len()
    }

    /// Enemies spawned by this director that were killed.
    #[must_use]
    pub const fn eliminated_count(&self) -> u32 {
        self.eliminated
    }

    /// Accumulates `dt` and spawns as many enemies as the elapsed time pays
    /// for, capped per tick and by the wave's live limit. Returns the number
    /// spawned.
    pub fn update(&mut self, swarm: &mut Swarm, dt: f32, rng: &mut dyn RngCore) -> usize {
        let interval = self.wave.spawn_interval_seconds;
        self.elapsed_since_last_spawn += dt;
        let ideal = (self.elapsed_since_last_spawn / interval).min(MAX_SPAWN_COUNT_PER_TICK);
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "The attempt count is clamped to a small non-negative value."
        )]
        let attempts = ideal.max(0.0).floor() as usize;

        let mut count = 0;
        for _ in 0..attempts {
            if !self.below_live_limit() {
                break;
            }
            if self.try_spawn(swarm, rng).is_some() {
                self.elapsed_since_last_spawn -= interval;
                count += 1;
            }
        }
        count
    }

    /// Updates the live and eliminated counters from a swarm event.
    pub fn observe(&mut self, event: &SwarmEvent) {
        if let SwarmEvent::Removed { id, cause } = *event {
            if self.spawned.remove(&id) && cause == RemovalCause::Killed {
                self.eliminated += 1;
            }
        }
    }

    /// Attempts one spawn: picks a type, then a free position on the ring.
    pub fn try_spawn(&mut self, swarm: &mut Swarm, rng: &mut dyn RngCore) -> Option<AgentId> {
        let kind = self.table.pick_random(rng);
        let Some(mut config) = self.enemy(kind).cloned() else {
            warn!("wave {} has no configuration for {kind:?}", self.wave.id);
            return None;
        };
        config.speed_multiplier *= self.wave.speed_multiplier;
        let Some(position) = self.pick_position(swarm, &config, rng) else {
            warn!("no free spawn position for {kind:?} in wave {}", self.wave.id);
            return None;
        };
        let id = swarm.spawn(&config, position);
        debug!("wave {} spawned {kind:?} {id:?}", self.wave.id);
        self.spawned.insert(id);
        Some(id)
    }

    fn below_live_limit(&self) -> bool {
        u32::try_from(self.spawned.len())
            .is_ok_and(|live| live < self.wave.max_live_count)
    }

    fn enemy(&self, kind: EnemyType) -> Option<&EnemyConfig> {
        self.enemies.iter().rev().find(|config| config.kind == kind)
    }

    fn pick_position(
        &self,
        swarm: &Swarm,
        config: &EnemyConfig,
        rng: &mut dyn RngCore,
    ) -> Option<Vec3> {
        let centre = swarm.settings().target_point;
        let height = config.edge_size / 2.0;
        let size = config.half_body_diagonal();
        for _ in 0..SPAWN_POSITION_ATTEMPTS {
            let distance =
                rng.random_range(self.wave.min_spawn_distance..=self.wave.max_spawn_distance);
            let angle = rng.random_range(0.0..TAU);
            let found = ring_candidates(centre, distance, angle, height)
                .into_iter()
                .find(|&candidate| is_clear(swarm, candidate, size));
            if found.is_some() {
                return found;
            }
        }
        None
    }
}

/// A ring point at `angle` and its three quarter-turn rotations about
/// `centre`.
#[must_use]
pub fn ring_candidates(centre: Vec3, distance: f32, angle: f32, height: f32) -> [Vec3; 4] {
    let (sin, cos) = angle.sin_cos();
    let (sin, cos) = (sin * distance, cos * distance);
    [
        Vec3::new(cos, 0.0, sin),
        Vec3::new(sin, 0.0, -cos),
        Vec3::new(-cos, 0.0, -sin),
        Vec3::new(-sin, 0.0, cos),
    ]
    .map(|offset| Vec3::new(centre.x + offset.x, height, centre.z + offset.z))
}

fn is_clear(swarm: &Swarm, position: Vec3, size: f32) -> bool {
    swarm.agents().all(|(_, agent)| {
        let limit = size + agent.size() + SPAWN_CLEARANCE_MARGIN;
        distance_squared(position, agent.position()) > limit * limit
    })
}
