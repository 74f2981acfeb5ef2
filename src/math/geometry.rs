//! Scalar and vector geometry used by handle hit-testing and drag stepping.
//!
//! Everything here is pure: no engine state, no scene access. Distances are
//! world-space, angles are degrees (the engine's snap increments and speed
//! factors are calibrated in degrees).

use cgmath::{InnerSpace, Quaternion, Vector3, Zero};

use super::Ray;

/// Tolerance for parallel/degenerate checks.
pub const EPSILON: f32 = 1e-6;

/// Magnitude below which a vector normalizes to zero instead of exploding.
const NORMALIZE_EPSILON: f32 = 1e-5;

/// Normalize, returning the zero vector for near-zero input.
pub fn normalized_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    let mag = v.magnitude();
    if mag < NORMALIZE_EPSILON {
        Vector3::zero()
    } else {
        v / mag
    }
}

/// Intersect an infinite line with an infinite plane.
///
/// Returns `None` when the line is parallel to the plane (no single
/// intersection point exists).
pub fn line_plane_intersect(
    line_point: Vector3<f32>,
    line_direction: Vector3<f32>,
    plane_point: Vector3<f32>,
    plane_normal: Vector3<f32>,
) -> Option<Vector3<f32>> {
    let denominator = line_direction.dot(plane_normal);
    if denominator.abs() < EPSILON {
        return None;
    }

    let t = (plane_point - line_point).dot(plane_normal) / denominator;
    Some(line_point + line_direction * t)
}

/// Distance along a ray to a plane, or `None` if the ray is parallel to the
/// plane or the plane lies behind the ray origin.
pub fn ray_plane_distance(
    ray: &Ray,
    plane_point: Vector3<f32>,
    plane_normal: Vector3<f32>,
) -> Option<f32> {
    let denominator = ray.direction.dot(plane_normal);
    if denominator.abs() < EPSILON {
        return None;
    }

    let t = (plane_point - ray.origin).dot(plane_normal) / denominator;
    if t > 0.0 {
        Some(t)
    } else {
        None
    }
}

/// Closest points between a finite segment and an infinite line.
///
/// Returns `(point_on_segment, point_on_line)`. Parallel and degenerate
/// configurations collapse to the segment start, which still yields the
/// correct perpendicular distance.
pub fn closest_points_segment_line(
    segment_start: Vector3<f32>,
    segment_end: Vector3<f32>,
    line_point: Vector3<f32>,
    line_direction: Vector3<f32>,
) -> (Vector3<f32>, Vector3<f32>) {
    let d1 = segment_end - segment_start;
    let d2 = line_direction;
    let r = segment_start - line_point;

    let a = d1.dot(d1);
    let e = d2.dot(d2);
    let f = d2.dot(r);

    if e < EPSILON {
        // Degenerate line direction; nothing sensible to measure against.
        return (segment_start, line_point);
    }

    let s = if a < EPSILON {
        0.0
    } else {
        let c = d1.dot(r);
        let b = d1.dot(d2);
        let denominator = a * e - b * b;
        if denominator.abs() > EPSILON {
            ((b * f - c * e) / denominator).clamp(0.0, 1.0)
        } else {
            0.0
        }
    };

    let b = d1.dot(d2);
    let t = (b * s + f) / e;

    (segment_start + d1 * s, line_point + d2 * t)
}

/// Shortest distance between a finite segment and a ray treated as an
/// infinite line.
pub fn segment_ray_distance(
    segment_start: Vector3<f32>,
    segment_end: Vector3<f32>,
    ray: &Ray,
) -> f32 {
    let (on_segment, on_line) =
        closest_points_segment_line(segment_start, segment_end, ray.origin, ray.direction);
    (on_segment - on_line).magnitude()
}

/// Signed length of `v` along `direction` (which need not be normalized).
pub fn magnitude_in_direction(v: Vector3<f32>, direction: Vector3<f32>) -> f32 {
    v.dot(normalized_or_zero(direction))
}

/// Remove the component of `v` along `plane_normal`.
pub fn project_on_plane(v: Vector3<f32>, plane_normal: Vector3<f32>) -> Vector3<f32> {
    let sqr_mag = plane_normal.magnitude2();
    if sqr_mag < EPSILON {
        return v;
    }
    v - plane_normal * (v.dot(plane_normal) / sqr_mag)
}

/// Signed angle in degrees from `from` to `to` around `axis`.
pub fn signed_angle_deg(from: Vector3<f32>, to: Vector3<f32>, axis: Vector3<f32>) -> f32 {
    let from_n = normalized_or_zero(from);
    let to_n = normalized_or_zero(to);
    let unsigned = from_n.dot(to_n).clamp(-1.0, 1.0).acos().to_degrees();
    let sign = if axis.dot(from.cross(to)) < 0.0 {
        -1.0
    } else {
        1.0
    };
    unsigned * sign
}

/// Whether two directions are (anti-)parallel within tolerance.
pub fn is_parallel(a: Vector3<f32>, b: Vector3<f32>) -> bool {
    normalized_or_zero(a).dot(normalized_or_zero(b)).abs() > 0.9999
}

/// A unit vector perpendicular to `v`, chosen stably.
pub fn any_perpendicular(v: Vector3<f32>) -> Vector3<f32> {
    let reference = if v.x.abs() < 0.9 {
        Vector3::unit_x()
    } else {
        Vector3::unit_y()
    };
    normalized_or_zero(v.cross(reference))
}

/// Decompose a unit quaternion into (angle in degrees, rotation axis).
///
/// The identity rotation reports a zero angle about +X.
pub fn to_angle_axis(q: Quaternion<f32>) -> (f32, Vector3<f32>) {
    let w = q.s.clamp(-1.0, 1.0);
    let sin_half = (1.0 - w * w).sqrt();
    if sin_half < NORMALIZE_EPSILON {
        (0.0, Vector3::unit_x())
    } else {
        (2.0 * w.acos().to_degrees(), q.v / sin_half)
    }
}
