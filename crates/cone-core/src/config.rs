//! Explicit configuration values for the mesh, the animation and the scene.

use crate::error::ConfigError;
use crate::math::projection::Frustum;
use glam::Vec3;

/// Cone tessellation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConeConfig {
    pub radius: f32,
    pub height: f32,
    /// Number of vertical slices around the cone axis.
    pub slices: u32,
}

impl Default for ConeConfig {
    fn default() -> Self {
        Self {
            radius: 0.5,
            height: 1.866,
            slices: 40,
        }
    }
}

impl ConeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slices == 0 {
            return Err(ConfigError::ZeroSlices);
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ConfigError::InvalidRadius(self.radius));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(ConfigError::InvalidHeight(self.height));
        }
        Ok(())
    }
}

/// Orientation animation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationConfig {
    /// Length of one orientation transition, in seconds.
    pub duration: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self { duration: 0.25 }
    }
}

impl AnimationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ConfigError::InvalidDuration(self.duration));
        }
        Ok(())
    }
}

/// Camera, projection and clear color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    pub clear_color: [f32; 4],
    /// Translation applied after the scene rotation.
    pub camera_offset: Vec3,
    pub frustum: Frustum,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.5, 0.5, 0.5, 1.0],
            camera_offset: Vec3::new(0.0, 0.0, -7.0),
            frustum: Frustum {
                left: -1.6,
                right: 1.6,
                bottom: -2.4,
                top: 2.4,
                near: 5.0,
                far: 10.0,
            },
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.frustum.validate()
    }
}

/// Everything a [`crate::Renderer`] needs besides its backend.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RendererConfig {
    pub cone: ConeConfig,
    pub animation: AnimationConfig,
    pub scene: SceneConfig,
}

impl RendererConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cone.validate()?;
        self.animation.validate()?;
        self.scene.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(RendererConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_slices() {
        let cone = ConeConfig {
            slices: 0,
            ..ConeConfig::default()
        };
        assert_eq!(cone.validate(), Err(ConfigError::ZeroSlices));
    }

    #[test]
    fn rejects_non_finite_values() {
        let cone = ConeConfig {
            radius: f32::NAN,
            ..ConeConfig::default()
        };
        assert!(matches!(cone.validate(), Err(ConfigError::InvalidRadius(_))));

        let cone = ConeConfig {
            height: -1.0,
            ..ConeConfig::default()
        };
        assert_eq!(cone.validate(), Err(ConfigError::InvalidHeight(-1.0)));

        let animation = AnimationConfig { duration: 0.0 };
        assert_eq!(animation.validate(), Err(ConfigError::InvalidDuration(0.0)));
    }

    #[test]
    fn rejects_inverted_frustum() {
        let mut scene = SceneConfig::default();
        scene.frustum.near = 12.0;
        assert!(matches!(scene.validate(), Err(ConfigError::InvalidFrustum(_))));
    }
}
