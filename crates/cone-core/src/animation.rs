//! Orientation animation state machine.
//!
//! The scene is idle while `current == end`. An orientation change starts a
//! transition from wherever the scene currently is; `update` advances it
//! with slerp and snaps exactly onto `end` once the duration has elapsed.

use crate::config::AnimationConfig;
use crate::math::rotation;
use cone_hal::DeviceOrientation;
use glam::{Quat, Vec3};

/// Direction the scene's +Y axis should point to for `orientation`.
pub fn up_vector(orientation: DeviceOrientation) -> Vec3 {
    match orientation {
        DeviceOrientation::Unknown | DeviceOrientation::Portrait => Vec3::Y,
        DeviceOrientation::PortraitUpsideDown => Vec3::NEG_Y,
        DeviceOrientation::FaceDown => Vec3::NEG_Z,
        DeviceOrientation::FaceUp => Vec3::Z,
        DeviceOrientation::LandscapeLeft => Vec3::X,
        DeviceOrientation::LandscapeRight => Vec3::NEG_X,
    }
}

/// Target rotation for `orientation`.
pub fn target_rotation(orientation: DeviceOrientation) -> Quat {
    rotation::from_vectors(Vec3::Y, up_vector(orientation))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    start: Quat,
    end: Quat,
    current: Quat,
    elapsed: f32,
    duration: f32,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(&AnimationConfig::default())
    }
}

impl Animation {
    /// Idle animation at identity.
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            start: Quat::IDENTITY,
            end: Quat::IDENTITY,
            current: Quat::IDENTITY,
            elapsed: 0.0,
            duration: config.duration,
        }
    }

    /// Start a transition towards `orientation` from the current rotation.
    ///
    /// Always restarts the clock, even when the target does not change.
    pub fn on_rotate(&mut self, orientation: DeviceOrientation) {
        log::debug!("orientation changed to {}", orientation.name());
        self.retarget(target_rotation(orientation));
    }

    /// Start a transition towards `end` from the current rotation.
    pub fn retarget(&mut self, end: Quat) {
        self.start = self.current;
        self.end = end;
        self.elapsed = 0.0;
    }

    /// Advance the transition by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.is_idle() {
            return;
        }

        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            log::warn!("ignoring invalid animation time step {dt}");
            0.0
        };

        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.current = self.end;
        } else {
            let mu = self.elapsed / self.duration;
            self.current = rotation::slerp(self.start, self.end, mu);
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current == self.end
    }

    /// Fraction of the transition completed, 1.0 when idle.
    pub fn progress(&self) -> f32 {
        if self.is_idle() {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn start(&self) -> Quat {
        self.start
    }

    pub fn end(&self) -> Quat {
        self.end
    }

    pub fn current(&self) -> Quat {
        self.current
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}
