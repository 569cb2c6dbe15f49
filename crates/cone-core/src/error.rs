//! Error types for configuration and rendering.

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("cone needs at least one slice")]
    ZeroSlices,

    #[error("cone radius must be finite and positive, got {0}")]
    InvalidRadius(f32),

    #[error("cone height must be finite and positive, got {0}")]
    InvalidHeight(f32),

    #[error("animation duration must be finite and positive, got {0}")]
    InvalidDuration(f32),

    /// Frustum planes must satisfy left < right, bottom < top, 0 < near < far.
    #[error("invalid frustum: {0}")]
    InvalidFrustum(&'static str),
}

/// Errors raised while initializing or rendering, generic over the
/// graphics device error.
#[derive(Debug, thiserror::Error)]
pub enum RenderError<E: core::fmt::Debug> {
    /// `render()` was called before `initialize()`.
    #[error("renderer used before initialize()")]
    NotInitialized,

    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    /// The shader pair failed to compile or link. The device error carries
    /// the driver diagnostic.
    #[error("shader program failed to build: {0:?}")]
    Shader(E),

    /// A linked program is missing an attribute or uniform the renderer binds.
    #[error("`{0}` not found in shader program")]
    MissingLocation(&'static str),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("graphics device error: {0:?}")]
    Device(E),
}
