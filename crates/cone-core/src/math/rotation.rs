//! Quaternion construction and interpolation.
//!
//! glam provides the value types; these functions pin down the behavior the
//! animation relies on: exact endpoints, shortest-arc interpolation and a
//! deterministic axis for opposite vectors.

use core::f32::consts::PI;
use glam::{Mat4, Quat, Vec3, Vec4};

/// Above this dot product two rotations are interpolated linearly.
const SLERP_LINEAR_THRESHOLD: f32 = 0.9995;

/// Tolerance for treating two unit vectors as parallel or opposite.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Rotation of `angle` radians about `axis`. A zero axis yields identity.
pub fn from_axis_angle(axis: Vec3, angle: f32) -> Quat {
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_axis_angle(axis, angle)
}

/// Shortest-arc rotation taking direction `from` onto direction `to`.
///
/// Inputs need not be normalized. Opposite directions rotate half a turn
/// about [`orthogonal_axis`]`(from)`. A zero vector yields identity.
pub fn from_vectors(from: Vec3, to: Vec3) -> Quat {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    if from == Vec3::ZERO || to == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let dot = from.dot(to);
    if dot >= 1.0 - PARALLEL_EPSILON {
        return Quat::IDENTITY;
    }
    if dot <= -1.0 + PARALLEL_EPSILON {
        return Quat::from_axis_angle(orthogonal_axis(from), PI);
    }

    // Half-way quaternion: (from x to, 1 + from . to), normalized.
    let axis = from.cross(to);
    Quat::from_xyzw(axis.x, axis.y, axis.z, 1.0 + dot).normalize()
}

/// Unit axis orthogonal to `v`: `v x X`, or `v x Y` when `v` lies along X.
pub fn orthogonal_axis(v: Vec3) -> Vec3 {
    let axis = v.cross(Vec3::X);
    if axis.length_squared() > PARALLEL_EPSILON {
        axis.normalize()
    } else {
        v.cross(Vec3::Y).normalize()
    }
}

/// Spherical linear interpolation from `start` to `end`.
///
/// Returns `start` unchanged for `t <= 0` and `end` unchanged for `t >= 1`.
/// In between the shorter of the two arcs is followed, and the result is
/// renormalized.
pub fn slerp(start: Quat, end: Quat, t: f32) -> Quat {
    if t <= 0.0 {
        return start;
    }
    if t >= 1.0 {
        return end;
    }

    let a = Vec4::from(start);
    let mut b = Vec4::from(end);
    let mut dot = a.dot(b);
    if dot < 0.0 {
        b = -b;
        dot = -dot;
    }

    if dot > SLERP_LINEAR_THRESHOLD {
        return Quat::from_vec4(a.lerp(b, t)).normalize();
    }

    let theta = dot.min(1.0).acos();
    let sin_theta = theta.sin();
    let wa = ((1.0 - t) * theta).sin() / sin_theta;
    let wb = (t * theta).sin() / sin_theta;
    Quat::from_vec4(a * wa + b * wb).normalize()
}

/// 4x4 rotation matrix for `q`, column-major, ready for GPU upload.
pub fn to_matrix(q: Quat) -> Mat4 {
    Mat4::from_quat(q)
}
