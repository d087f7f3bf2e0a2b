//! Utility helpers for tests.
pub mod driver;
pub mod fixtures;

pub use driver::TickDriver;

use glam::Vec3;
use rollcubes::Swarm;

/// Assert that `actual` lies within `tolerance` of `expected` on every axis.
///
/// # Panics
/// Panics with both vectors in the message when any component differs by
/// more than `tolerance`.
pub fn assert_vec3_near(actual: Vec3, expected: Vec3, tolerance: f32) {
    let delta = (actual - expected).abs();
    assert!(
        delta.max_element() <= tolerance,
        "expected {expected}, got {actual} (tolerance {tolerance})"
    );
}

/// Assert that no two active agents of `swarm` overlap.
///
/// # Panics
/// Panics listing the offending pairs.
pub fn assert_separated(swarm: &Swarm) {
    let violations = swarm.separation_violations();
    assert!(violations.is_empty(), "overlapping agents: {violations:?}");
}

/// Assert that `swarm` keeps the separation rule: agents at rest never
/// overlap, and moving agents stay within the swept clearance.
///
/// # Panics
/// Panics listing the offending pairs.
pub fn assert_swept_separation(swarm: &Swarm) {
    let breaches = swarm.separation_breaches();
    assert!(breaches.is_empty(), "separation breached: {breaches:?}");
}
