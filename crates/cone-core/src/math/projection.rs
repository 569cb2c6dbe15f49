//! Projection and camera matrices.

use crate::error::ConfigError;
use glam::{Mat4, Vec3, Vec4};

/// Perspective frustum bounds at the near plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let planes = [self.left, self.right, self.bottom, self.top, self.near, self.far];
        if planes.iter().any(|p| !p.is_finite()) {
            return Err(ConfigError::InvalidFrustum("planes must be finite"));
        }
        if self.left >= self.right {
            return Err(ConfigError::InvalidFrustum("left must be less than right"));
        }
        if self.bottom >= self.top {
            return Err(ConfigError::InvalidFrustum("bottom must be less than top"));
        }
        if self.near <= 0.0 || self.near >= self.far {
            return Err(ConfigError::InvalidFrustum("planes must satisfy 0 < near < far"));
        }
        Ok(())
    }

    pub fn to_matrix(&self) -> Mat4 {
        frustum(self.left, self.right, self.bottom, self.top, self.near, self.far)
    }
}

/// Perspective projection with `glFrustum` semantics: right-handed eye space
/// looking down -Z, clip-space depth in [-w, w].
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let a = 2.0 * near / (right - left);
    let b = 2.0 * near / (top - bottom);
    let c = (right + left) / (right - left);
    let d = (top + bottom) / (top - bottom);
    let e = -(far + near) / (far - near);
    let f = -2.0 * far * near / (far - near);

    Mat4::from_cols(
        Vec4::new(a, 0.0, 0.0, 0.0),
        Vec4::new(0.0, b, 0.0, 0.0),
        Vec4::new(c, d, e, -1.0),
        Vec4::new(0.0, 0.0, f, 0.0),
    )
}

/// Translation by `(x, y, z)`.
pub fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}
