//! Path reservations and the overlap test between agents.
//!
//! Every agent owns one [`ReservationSurface`]. Only the owner writes to it;
//! neighbours read it through [`ReservationSurface::overlaps_any_of_positions`].
//!
//! Checking a path and committing it are separate calls. Two agents polling
//! in the same tick may both see a contested cell as free before either
//! commits. This gap is accepted: in the single-threaded tick the agents poll
//! and commit in turn, so it only opens when a caller interleaves checks by
//! hand.
//!
//! The threshold only holds strictly between agents at rest. A moving agent
//! sweeps between reserved points that each cleared every neighbour, but
//! the stretch in between can pass closer than either end: a rolling cube's
//! centre crosses the floor in a straight line (while rising) from its start
//! to its target. When both ends of a straight sweep of length `gap` clear
//! `limit`, no point of it comes nearer than [`swept_clearance`], and the
//! same holds when both agents sweep at once. A roll sweeps one edge; a jump
//! sweeps at most its launch speed times the waypoint interval between
//! waypoints. For unit cubes the bound is `sqrt(3 - 0.25) ≈ 1.658` against a
//! resting threshold of `sqrt(3) ≈ 1.732`.
use glam::Vec3;

use crate::geometry::distance_squared;

/// Reserved and proposed positions of one agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationSurface {
    size: f32,
    committed: Vec<Vec3>,
    provisional: Vec<Vec3>,
}

impl ReservationSurface {
    /// Creates an idle surface for an agent with bounding radius `size`.
    #[must_use]
    pub const fn new(size: f32) -> Self {
        Self {
            size,
            committed: Vec::new(),
            provisional: Vec::new(),
        }
    }

    /// Bounding radius of the owner.
    #[must_use]
    pub const fn size(&self) -> f32 {
        self.size
    }

    /// Positions the owner currently occupies or is about to.
    #[must_use]
    pub fn committed_path(&self) -> &[Vec3] {
        &self.committed
    }

    /// Last path the owner proposed. Kept for inspection only.
    #[must_use]
    pub fn provisional_path(&self) -> &[Vec3] {
        &self.provisional
    }

    /// Whether a move is in flight.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        !self.committed.is_empty()
    }

    /// Tests whether any of `positions`, swept by a sphere of `other_size`,
    /// touches the owner standing at `my_position` or any committed point.
    #[must_use]
    pub fn overlaps_any_of_positions(
        &self,
        my_position: Vec3,
        positions: &[Vec3],
        other_size: f32,
    ) -> bool {
        let limit = (self.size + other_size).powi(2);
        positions.iter().any(|&p| {
            distance_squared(my_position, p) <= limit
                || self
                    .committed
                    .iter()
                    .any(|&q| distance_squared(q, p) <= limit)
        })
    }

    /// Records `candidate` as provisional and asks every neighbour whether it
    /// overlaps. Stops at the first overlap.
    pub fn is_path_free<'a, I>(&mut self, candidate: &[Vec3], neighbors: I) -> bool
    where
        I: IntoIterator<Item = NeighborView<'a>>,
    {
        self.provisional.clear();
        self.provisional.extend_from_slice(candidate);
        !neighbors
            .into_iter()
            .any(|n| n.surface.overlaps_any_of_positions(n.position, candidate, self.size))
    }

    /// Publishes `path` to neighbours.
    pub fn commit(&mut self, path: Vec<Vec3>) {
        self.committed = path;
    }

    /// Withdraws the current reservation.
    pub fn clear(&mut self) {
        self.committed.clear();
    }
}

/// Closest approach permitted while an agent sweeps between reserved points
/// `gap` apart, when the resting threshold is `limit`.
///
/// # Examples
/// ```
/// use rollcubes::reservation::swept_clearance;
///
/// let limit = 3.0_f32.sqrt();
/// assert!((swept_clearance(limit, 1.0) - 2.75_f32.sqrt()).abs() < 1e-6);
/// assert!((swept_clearance(limit, 0.0) - limit).abs() < 1e-6);
/// ```
#[must_use]
pub fn swept_clearance(limit: f32, gap: f32) -> f32 {
    (limit * limit - gap * gap / 4.0).max(0.0).sqrt()
}

/// Read-only view of a neighbour as seen by an overlap query.
#[derive(Debug, Clone, Copy)]
pub struct NeighborView<'a> {
    /// Where the neighbour currently stands.
    pub position: Vec3,
    /// The neighbour's reservations.
    pub surface: &'a ReservationSurface,
}

/// Reservation operations a move needs from its owner.
///
/// The swarm implements this over its arena; [`NeighborhoodClearance`] does
/// so over an explicit neighbour list.
#[cfg_attr(test, mockall::automock)]
pub trait Clearance {
    /// Whether `candidate` is clear of every neighbour. Records it as provisional.
    fn is_path_free(&mut self, candidate: &[Vec3]) -> bool;
    /// Publishes `path` as the owner's reservation.
    fn commit(&mut self, path: Vec<Vec3>);
    /// Withdraws the owner's reservation.
    fn clear(&mut self);
}

/// [`Clearance`] over one surface and a fixed set of neighbours.
#[derive(Debug)]
pub struct NeighborhoodClearance<'a> {
    /// The owner's surface.
    pub surface: &'a mut ReservationSurface,
    /// Neighbours consulted by every check.
    pub neighbors: Vec<NeighborView<'a>>,
}

impl<'a> NeighborhoodClearance<'a> {
    /// Wraps `surface` with the given neighbours.
    #[must_use]
    pub fn new(surface: &'a mut ReservationSurface, neighbors: Vec<NeighborView<'a>>) -> Self {
        Self { surface, neighbors }
    }
}

impl Clearance for NeighborhoodClearance<'_> {
    fn is_path_free(&mut self, candidate: &[Vec3]) -> bool {
        self.surface
            .is_path_free(candidate, self.neighbors.iter().copied())
    }

    fn commit(&mut self, path: Vec<Vec3>) {
        self.surface.commit(path);
    }

    fn clear(&mut self) {
        self.surface.clear();
    }
}
