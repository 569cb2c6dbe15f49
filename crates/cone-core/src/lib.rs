//! Platform-agnostic core of the cone renderer.
//!
//! Builds the cone and disk meshes once, animates the scene orientation with
//! quaternion slerp when the device orientation changes, and renders each
//! frame through a [`render::Backend`] generic over the traits in `cone-hal`.

pub mod animation;
pub mod config;
pub mod error;
pub mod math;
pub mod mesh;
pub mod render;

pub use animation::Animation;
pub use config::{AnimationConfig, ConeConfig, RendererConfig, SceneConfig};
pub use error::{ConfigError, RenderError};
pub use mesh::{Mesh, Vertex};
pub use render::{Backend, FixedFunctionBackend, Renderer, ShaderBackend};
