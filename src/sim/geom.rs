//! Vector and force utilities
//!
//! Distance helpers, segment distance for beams/bolts, and the radial
//! push/pull falloff every area hazard builds on.

use glam::Vec2;

use crate::consts::MIN_FORCE_DISTANCE;
use crate::{cartesian_to_polar, polar_to_cartesian};

/// Direction of a radial force relative to its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMode {
    /// Away from the source
    Push,
    /// Toward the source
    Pull,
}

/// Distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Angle (radians) of the direction from `from` toward `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    cartesian_to_polar(to - from).1
}

/// Closest point on segment `a`-`b` to `p`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Distance from `p` to segment `a`-`b` (degenerate segments collapse to a point)
#[inline]
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    (p - closest_point_on_segment(p, a, b)).length()
}

/// Distance from `p` to the nearest segment of a polyline
pub fn point_polyline_distance(p: Vec2, points: &[Vec2]) -> f32 {
    match points {
        [] => f32::INFINITY,
        [only] => (p - *only).length(),
        _ => points
            .windows(2)
            .map(|w| point_segment_distance(p, w[0], w[1]))
            .fold(f32::INFINITY, f32::min),
    }
}

/// Linear falloff: 1 at the source, 0 at (and beyond) `radius`
#[inline]
pub fn falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / radius).clamp(0.0, 1.0)
}

/// Radial force on `target` from a source at `source`.
///
/// Magnitude is `force * (1 - d/radius)`. Returns zero outside the radius and
/// when the two points coincide (no defined direction).
pub fn radial_force(source: Vec2, target: Vec2, radius: f32, force: f32, mode: ForceMode) -> Vec2 {
    let offset = target - source;
    let dist = offset.length();
    if !dist.is_finite() || dist < MIN_FORCE_DISTANCE || dist >= radius {
        return Vec2::ZERO;
    }
    let dir = offset / dist;
    let magnitude = force * falloff(dist, radius);
    match mode {
        ForceMode::Push => dir * magnitude,
        ForceMode::Pull => -dir * magnitude,
    }
}

/// Unit vector for an angle
#[inline]
pub fn unit(angle: f32) -> Vec2 {
    polar_to_cartesian(1.0, angle)
}

/// Clamp a point into the rectangle `[0, size]`
#[inline]
pub fn clamp_to_field(p: Vec2, size: Vec2) -> Vec2 {
    p.clamp(Vec2::ZERO, size)
}
