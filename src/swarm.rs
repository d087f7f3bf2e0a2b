//! The agent arena and its per-frame driver.
//!
//! [`Swarm::tick`] advances every agent once, in arena order:
//!
//! 1. hits buffered since the last tick are applied;
//! 2. trigger volumes are re-bucketed and neighbour sets updated;
//! 3. spawning agents count down their grace and validate their position;
//! 4. active agents advance their strategy by one frame.
//!
//! Agents talk to each other only through the reservation protocol. Each one
//! sees its neighbours' positions and reservations as they stand when its
//! turn comes, so earlier agents in the arena commit first.
use std::mem;

use bevy::prelude::Resource;
use glam::Vec3;
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use slotmap::SlotMap;
use thiserror::Error;

use crate::agent::{Agent, AgentId, AgentPhase};
use crate::config::{EnemyConfig, SwarmSettings};
use crate::events::{RemovalCause, StepOutcome, SwarmEvent};
use crate::geometry::{distance_squared, Pose};
use crate::health::{Hit, HitInbox, HitOutcome};
use crate::proximity::{ProximityGrid, TriggerVolume};
use crate::reservation::{swept_clearance, Clearance, NeighborView};

/// Errors raised by swarm operations addressed to a single agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SwarmError {
    /// The id does not name a live agent.
    #[error("agent {0:?} is not part of the swarm")]
    UnknownAgent(AgentId),
}

/// A pair of active agents closer than their combined bounding radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeparationViolation {
    /// First agent.
    pub a: AgentId,
    /// Second agent.
    pub b: AgentId,
    /// Distance between their centres.
    pub distance: f32,
}

/// Every live agent plus the shared collaborators they are stepped with.
#[derive(Resource, Debug)]
pub struct Swarm {
    settings: SwarmSettings,
    agents: SlotMap<AgentId, Agent>,
    proximity: ProximityGrid,
    hits: HitInbox,
    events: Vec<SwarmEvent>,
    rng: SmallRng,
}

impl Default for Swarm {
    fn default() -> Self {
        Self::new(SwarmSettings::default())
    }
}

impl Swarm {
    /// Creates an empty swarm. `settings` are expected to be validated.
    #[must_use]
    pub fn new(settings: SwarmSettings) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(settings.seed),
            settings,
            agents: SlotMap::with_key(),
            proximity: ProximityGrid::new(),
            hits: HitInbox::default(),
            events: Vec::new(),
        }
    }

    /// Simulation tunables in use.
    #[must_use]
    pub const fn settings(&self) -> &SwarmSettings {
        &self.settings
    }

    /// Spawns an agent at `position`, facing the target point.
    ///
    /// The height is replaced by the resting height of the cube.
    pub fn spawn(&mut self, config: &EnemyConfig, position: Vec3) -> AgentId {
        let mut forward = self.settings.target_point - position;
        forward.y = 0.0;
        self.spawn_facing(config, position, forward)
    }

    /// Spawns an agent at `position` facing along `forward`.
    ///
    /// Falls back to `+Z` when `forward` has no horizontal component.
    pub fn spawn_facing(&mut self, config: &EnemyConfig, position: Vec3, forward: Vec3) -> AgentId {
        let pose = Pose::looking_along(position, forward);
        let agent = Agent::new(config, pose, &self.settings);
        let id = self.agents.insert(agent);
        debug!("spawned {:?} {id:?} at {position}", config.kind);
        id
    }

    /// Queues a hit; it is applied at the start of the next tick.
    ///
    /// # Errors
    /// Returns [`SwarmError::UnknownAgent`] when `id` is not live.
    pub fn report_hit(&mut self, id: AgentId, damage: u32) -> Result<(), SwarmError> {
        if !self.agents.contains_key(id) {
            return Err(SwarmError::UnknownAgent(id));
        }
        self.hits.push(Hit { target: id, damage });
        Ok(())
    }

    /// Removes an agent immediately.
    ///
    /// # Errors
    /// Returns [`SwarmError::UnknownAgent`] when `id` is not live.
    pub fn despawn(&mut self, id: AgentId) -> Result<(), SwarmError> {
        if self.remove(id, RemovalCause::Despawned) {
            Ok(())
        } else {
            Err(SwarmError::UnknownAgent(id))
        }
    }

    /// The agent named by `id`, if it is live.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Whether `id` names a live agent.
    #[must_use]
    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(id)
    }

    /// Every live agent in arena order.
    pub fn agents(&self) -> impl Iterator<Item = (AgentId, &Agent)> {
        self.agents.iter()
    }

    /// Number of live agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether no agent is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Removes and yields every event raised since the last drain.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, SwarmEvent> {
        self.events.drain(..)
    }

    /// Advances the whole swarm by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.apply_hits();
        self.refresh_proximity();
        let ids: Vec<AgentId> = self.agents.keys().collect();
        for id in ids {
            match self.agents.get(id).map(Agent::phase) {
                Some(AgentPhase::Spawning { remaining }) => self.advance_grace(id, remaining - dt),
                Some(AgentPhase::Active) => self.step_agent(id, dt),
                None => {}
            }
        }
    }

    /// Pairs of active agents whose bounding spheres intersect.
    #[must_use]
    pub fn separation_violations(&self) -> Vec<SeparationViolation> {
        let active: Vec<(AgentId, &Agent)> =
            self.agents.iter().filter(|(_, a)| a.is_active()).collect();
        let mut violations = Vec::new();
        for (i, (a, agent_a)) in active.iter().enumerate() {
            for (b, agent_b) in active.iter().skip(i + 1) {
                let limit = agent_a.size() + agent_b.size();
                let dist_sq = distance_squared(agent_a.position(), agent_b.position());
                if dist_sq < limit * limit {
                    violations.push(SeparationViolation {
                        a: *a,
                        b: *b,
                        distance: dist_sq.sqrt(),
                    });
                }
            }
        }
        violations
    }

    /// Overlaps that break the separation rule: any overlap between agents
    /// at rest, or one deeper than [`swept_clearance`] allows while either
    /// agent is moving.
    #[must_use]
    pub fn separation_breaches(&self) -> Vec<SeparationViolation> {
        self.separation_violations()
            .into_iter()
            .filter(|violation| {
                let (Some(a), Some(b)) =
                    (self.agents.get(violation.a), self.agents.get(violation.b))
                else {
                    return false;
                };
                let gap = [a, b]
                    .into_iter()
                    .filter(|agent| agent.is_in_motion())
                    .map(Agent::sweep_gap)
                    .fold(0.0, f32::max);
                violation.distance < swept_clearance(a.size() + b.size(), gap)
            })
            .collect()
    }

    fn apply_hits(&mut self) {
        if self.hits.is_empty() {
            return;
        }
        let hits: Vec<Hit> = self.hits.drain().collect();
        for Hit { target, damage } in hits {
            let Some(agent) = self.agents.get_mut(target) else {
                debug!("dropping hit for departed agent {target:?}");
                continue;
            };
            let max = agent.health.max();
            match agent.health.hit(damage) {
                HitOutcome::Ignored => {}
                HitOutcome::Damaged { current } => {
                    self.events.push(SwarmEvent::HitPointsChanged {
                        id: target,
                        current,
                        max,
                    });
                }
                HitOutcome::Depleted => {
                    self.events.push(SwarmEvent::HitPointsChanged {
                        id: target,
                        current: 0,
                        max,
                    });
                    self.remove(target, RemovalCause::Killed);
                }
            }
        }
    }

    fn refresh_proximity(&mut self) {
        let volumes: Vec<TriggerVolume> = self
            .agents
            .iter()
            .map(|(id, agent)| TriggerVolume {
                id,
                position: agent.position(),
                radius: agent.neighbors.radius(),
            })
            .collect();
        let changes = self.proximity.update(&volumes);
        for pair in changes.entered {
            let (a, b) = pair.members();
            if let Some(agent) = self.agents.get_mut(a) {
                agent.neighbors.on_enter_range(b);
            }
            if let Some(agent) = self.agents.get_mut(b) {
                agent.neighbors.on_enter_range(a);
            }
        }
        for pair in changes.exited {
            let (a, b) = pair.members();
            if let Some(agent) = self.agents.get_mut(a) {
                agent.neighbors.on_exit_range(b);
            }
            if let Some(agent) = self.agents.get_mut(b) {
                agent.neighbors.on_exit_range(a);
            }
        }
    }

    fn advance_grace(&mut self, id: AgentId, remaining: f32) {
        if remaining > 0.0 {
            if let Some(agent) = self.agents.get_mut(id) {
                agent.phase = AgentPhase::Spawning { remaining };
            }
            return;
        }
        if let Some(other) = self.spawn_conflict(id) {
            debug!("{id:?} spawned inside {other:?}; removing it");
            self.remove(id, RemovalCause::SpawnConflict);
            return;
        }
        if let Some(agent) = self.agents.get_mut(id) {
            agent.phase = AgentPhase::Active;
            self.events.push(SwarmEvent::FinishedSpawning(id));
        }
    }

    /// First neighbour whose position or reservation covers `id`'s position.
    fn spawn_conflict(&self, id: AgentId) -> Option<AgentId> {
        let me = self.agents.get(id)?;
        let footprint = [me.position()];
        me.neighbors.neighbors().find(|other| {
            self.agents.get(*other).is_some_and(|o| {
                o.reservation
                    .overlaps_any_of_positions(o.position(), &footprint, me.size())
            })
        })
    }

    fn step_agent(&mut self, id: AgentId, dt: f32) {
        let Some(agent) = self.agents.get_mut(id) else {
            return;
        };
        let Some(mut strategy) = agent.strategy.take() else {
            return;
        };
        let mut pose = agent.pose;
        let result = {
            let mut clearance = SwarmClearance {
                agents: &mut self.agents,
                id,
            };
            strategy.step(&mut pose, &mut clearance, &mut self.rng, dt)
        };
        if let Some(agent) = self.agents.get_mut(id) {
            agent.pose = pose;
            agent.strategy = Some(strategy);
        }
        if let Some(outcome) = StepOutcome::from_result(result) {
            if let StepOutcome::Aborted(err) = outcome {
                debug!("{id:?} abandoned its step: {err}");
            }
            self.events.push(SwarmEvent::StepFinished { id, outcome });
        }
    }

    /// Destroys `id`, prunes it from every neighbour set and reports it.
    fn remove(&mut self, id: AgentId, cause: RemovalCause) -> bool {
        let Some(agent) = self.agents.remove(id) else {
            return false;
        };
        for other in agent.neighbors.neighbors() {
            if let Some(neighbor) = self.agents.get_mut(other) {
                neighbor.neighbors.on_other_removed(id);
            }
        }
        self.proximity.forget(id);
        info!("{:?} {id:?} removed: {cause:?}", agent.kind);
        self.events.push(SwarmEvent::Removed { id, cause });
        true
    }
}

/// [`Clearance`] for the agent being stepped, backed by the arena.
struct SwarmClearance<'a> {
    agents: &'a mut SlotMap<AgentId, Agent>,
    id: AgentId,
}

impl Clearance for SwarmClearance<'_> {
    fn is_path_free(&mut self, candidate: &[Vec3]) -> bool {
        let Some(me) = self.agents.get_mut(self.id) else {
            return false;
        };
        let mut surface = mem::take(&mut me.reservation);
        let free = self.agents.get(self.id).is_some_and(|me| {
            let views = me.neighbors.neighbors().filter_map(|other| {
                self.agents.get(other).map(|o| NeighborView {
                    position: o.position(),
                    surface: &o.reservation,
                })
            });
            surface.is_path_free(candidate, views)
        });
        if let Some(me) = self.agents.get_mut(self.id) {
            me.reservation = surface;
        }
        free
    }

    fn commit(&mut self, path: Vec<Vec3>) {
        if let Some(me) = self.agents.get_mut(self.id) {
            me.reservation.commit(path);
        }
    }

    fn clear(&mut self) {
        if let Some(me) = self.agents.get_mut(self.id) {
            me.reservation.clear();
        }
    }
}
