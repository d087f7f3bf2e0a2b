//! Trigger-volume overlap detection.
//!
//! Each agent carries a spherical trigger whose radius is its neighbour
//! radius. Every tick the swarm hands the current triggers to a
//! [`ProximityGrid`], which buckets them into a uniform grid on the ground
//! plane and reports which pairs started or stopped overlapping.
use glam::Vec3;
use hashbrown::{HashMap, HashSet};

use crate::agent::AgentId;

/// Spherical trigger volume of one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerVolume {
    /// Owner of the volume.
    pub id: AgentId,
    /// Centre of the sphere.
    pub position: Vec3,
    /// Radius of the sphere.
    pub radius: f32,
}

impl TriggerVolume {
    fn overlaps(&self, other: &Self) -> bool {
        (self.position - other.position).length_squared() <= (self.radius + other.radius).powi(2)
    }
}

/// Unordered pair of agents, stored with the smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentPair(AgentId, AgentId);

impl AgentPair {
    /// Normalises `(a, b)` so that the pair compares equal in either order.
    #[must_use]
    pub fn new(a: AgentId, b: AgentId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// Both members of the pair.
    #[must_use]
    pub const fn members(self) -> (AgentId, AgentId) {
        (self.0, self.1)
    }

    fn involves(self, id: AgentId) -> bool {
        self.0 == id || self.1 == id
    }
}

/// Pairs whose overlap state changed during one update.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProximityChanges {
    /// Pairs whose volumes started overlapping.
    pub entered: Vec<AgentPair>,
    /// Pairs whose volumes stopped overlapping.
    pub exited: Vec<AgentPair>,
}

type Cell = (i32, i32);

/// Broad-phase overlap tracker over a uniform XZ grid.
#[derive(Debug, Default)]
pub struct ProximityGrid {
    tracked: HashSet<AgentPair>,
    cells: HashMap<Cell, Vec<TriggerVolume>>,
}

impl ProximityGrid {
    /// Creates a grid with no tracked pairs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-buckets `volumes` and diffs the overlapping pairs against the
    /// previous update.
    pub fn update(&mut self, volumes: &[TriggerVolume]) -> ProximityChanges {
        let cell_size = volumes
            .iter()
            .map(|v| v.radius * 2.0)
            .fold(f32::EPSILON, f32::max);

        self.cells.values_mut().for_each(Vec::clear);
        for volume in volumes {
            self.cells
                .entry(cell_of(volume.position, cell_size))
                .or_default()
                .push(*volume);
        }
        self.cells.retain(|_, bucket| !bucket.is_empty());

        let mut current = HashSet::with_capacity(self.tracked.len());
        for volume in volumes {
            let (cx, cz) = cell_of(volume.position, cell_size);
            for dx in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.cells.get(&(cx + dx, cz + dz)) else {
                        continue;
                    };
                    current.extend(
                        bucket
                            .iter()
                            .filter(|other| volume.id < other.id && volume.overlaps(other))
                            .map(|other| AgentPair::new(volume.id, other.id)),
                    );
                }
            }
        }

        let changes = ProximityChanges {
            entered: current.difference(&self.tracked).copied().collect(),
            exited: self.tracked.difference(&current).copied().collect(),
        };
        self.tracked = current;
        changes
    }

    /// Drops every tracked pair involving `id` without reporting an exit.
    pub fn forget(&mut self, id: AgentId) {
        self.tracked.retain(|pair| !pair.involves(id));
    }

    /// Whether the volumes of `a` and `b` overlapped at the last update.
    #[must_use]
    pub fn is_tracked(&self, a: AgentId, b: AgentId) -> bool {
        self.tracked.contains(&AgentPair::new(a, b))
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "Grid coordinates of any reachable position fit in i32."
)]
fn cell_of(position: Vec3, cell_size: f32) -> Cell {
    (
        (position.x / cell_size).floor() as i32,
        (position.z / cell_size).floor() as i32,
    )
}
