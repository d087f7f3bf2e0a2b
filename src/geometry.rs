//! Poses and rotation helpers for cube kinematics.
//!
//! Agents use a `Y`-up basis where local `+Z` is forward and local `+X` is
//! right. Rotations are plain `glam` quaternions, so the right-hand rule
//! applies about every axis.
use glam::{Mat3, Quat, Vec3};

/// Directions shorter than this are treated as degenerate.
const DIRECTION_EPSILON: f32 = 1e-6;

/// World-space placement of an agent plus the orientation of its visual mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Centre of the cube.
    pub position: Vec3,
    /// Body orientation; determines `forward` and `right`.
    pub rotation: Quat,
    /// Mesh orientation relative to the body. Purely visual.
    pub mesh_rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

impl Pose {
    /// Creates a pose with an unrotated mesh.
    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            mesh_rotation: Quat::IDENTITY,
        }
    }

    /// Creates a pose at `position` whose forward axis points along `forward`.
    ///
    /// Falls back to the identity orientation when `forward` is degenerate.
    ///
    /// # Examples
    /// ```
    /// use glam::Vec3;
    /// use rollcubes::geometry::Pose;
    ///
    /// let pose = Pose::looking_along(Vec3::new(0.0, 0.5, -4.0), Vec3::Z);
    /// assert!((pose.forward() - Vec3::Z).length() < 1e-6);
    /// assert!((pose.right() - Vec3::X).length() < 1e-6);
    /// ```
    #[must_use]
    pub fn looking_along(position: Vec3, forward: Vec3) -> Self {
        Self::new(position, look_rotation(forward).unwrap_or(Quat::IDENTITY))
    }

    /// Unit vector the agent considers "forward".
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Unit vector the agent considers "right".
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Turns the body about the vertical axis so that it faces `target`.
    ///
    /// The height difference is ignored, so the body never pitches. Leaves
    /// the rotation untouched when the agent stands directly above or below
    /// the target.
    pub fn yaw_towards(&mut self, target: Vec3) {
        let mut flat = target - self.position;
        flat.y = 0.0;
        if let Some(rotation) = look_rotation(flat) {
            self.rotation = rotation;
        }
    }
}

/// Builds the rotation whose forward (`+Z`) axis points along `forward` with
/// `+Y` kept as close to up as possible.
///
/// Returns `None` for zero, non-finite or vertical directions.
#[must_use]
pub fn look_rotation(forward: Vec3) -> Option<Quat> {
    let forward = forward.try_normalize()?;
    let right = Vec3::Y.cross(forward);
    if right.length_squared() < DIRECTION_EPSILON {
        return None;
    }
    let right = right.normalize();
    let up = forward.cross(right);
    let basis = Mat3::from_cols(right, up, forward);
    Some(Quat::from_mat3(&basis).normalize())
}

/// Rotates the pivot-to-centre offset of a rolling cube and returns the new
/// centre.
///
/// `centre` is the current cube centre and `pivot_offset` the vector from the
/// pivot edge to that centre. The pivot stays fixed while the offset turns
/// by `angle_degrees` about `axis`. Returns the new centre and the rotated
/// offset so that successive calls never accumulate Euler drift.
#[must_use]
pub fn rotate_about_pivot(
    centre: Vec3,
    pivot_offset: Vec3,
    axis: Vec3,
    angle_degrees: f32,
) -> (Vec3, Vec3) {
    let pivot = centre - pivot_offset;
    let rotated = Quat::from_axis_angle(axis, angle_degrees.to_radians()) * pivot_offset;
    (pivot + rotated, rotated)
}

/// Squared distance between two points.
#[must_use]
pub fn distance_squared(a: Vec3, b: Vec3) -> f32 {
    (a - b).length_squared()
}
