//! Renderer orchestration over an interchangeable graphics backend.
//!
//! [`Renderer`] owns the mesh and the animation. Each frame it converts the
//! current orientation into a rotation matrix and hands it to a [`Backend`],
//! which binds it the way its pipeline generation requires:
//!
//! - [`FixedFunctionBackend`] pushes the model-view stack and multiplies the
//!   rotation onto the camera translation loaded at initialization.
//! - [`ShaderBackend`] uploads `camera * rotation` as the `Modelview` uniform.

pub mod fixed_function;
pub mod shader;
pub mod shaders;

pub use fixed_function::FixedFunctionBackend;
pub use shader::ShaderBackend;

use crate::animation::Animation;
use crate::config::RendererConfig;
use crate::error::{ConfigError, RenderError};
use crate::math::{projection, rotation};
use crate::mesh::{Mesh, Vertex};
use cone_hal::{DeviceOrientation, FramebufferHandle, GraphicsDevice, Topology};
use glam::Mat4;

/// Error type of the device behind backend `B`.
pub type DeviceError<B> = <<B as Backend>::Device as GraphicsDevice>::Error;

/// Result of a renderer operation.
pub type RenderResult<T, B> = Result<T, RenderError<DeviceError<B>>>;

/// Result of a backend operation on device `D`.
pub type BackendResult<D> = Result<(), RenderError<<D as GraphicsDevice>::Error>>;

/// Pipeline-specific binding of transforms and vertex data.
pub trait Backend {
    type Device: GraphicsDevice;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn device(&self) -> &Self::Device;

    fn device_mut(&mut self) -> &mut Self::Device;

    /// Configure the pipeline once: install `projection` and the fixed
    /// `view` (camera) transform.
    fn bind_projection(&mut self, projection: &Mat4, view: &Mat4) -> BackendResult<Self::Device>;

    /// Bind the per-frame `model` transform and enable vertex inputs.
    fn begin_frame(&mut self, model: &Mat4) -> BackendResult<Self::Device>;

    /// Bind `vertices` as interleaved position + color data and draw them.
    fn draw(&mut self, topology: Topology, vertices: &[Vertex]) -> BackendResult<Self::Device>;

    /// Undo everything `begin_frame` enabled or pushed.
    fn end_frame(&mut self) -> BackendResult<Self::Device>;
}

/// Render targets created by [`Renderer::initialize`].
#[derive(Clone, Copy, Debug)]
struct Viewport {
    width: u32,
    height: u32,
    framebuffer: FramebufferHandle,
}

/// Cone scene renderer, generic over the graphics backend.
pub struct Renderer<B: Backend> {
    backend: B,
    config: RendererConfig,
    mesh: Mesh,
    animation: Animation,
    viewport: Option<Viewport>,
}

impl<B: Backend> Renderer<B> {
    /// Validate `config` and build the mesh. No device calls are made until
    /// [`Renderer::initialize`].
    pub fn new(backend: B, config: RendererConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mesh = Mesh::build(&config.cone)?;
        let animation = Animation::new(&config.animation);
        Ok(Self {
            backend,
            config,
            mesh,
            animation,
            viewport: None,
        })
    }

    /// Create the render targets for a `width x height` surface, enable
    /// depth testing and install the projection.
    pub fn initialize(&mut self, width: u32, height: u32) -> RenderResult<(), B> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidViewport { width, height });
        }

        let device = self.backend.device_mut();
        let color = device.create_color_target().map_err(RenderError::Device)?;
        let depth = device
            .create_depth_target(width, height)
            .map_err(RenderError::Device)?;
        let framebuffer = device
            .create_framebuffer(color, depth)
            .map_err(RenderError::Device)?;
        device
            .bind_framebuffer(framebuffer)
            .map_err(RenderError::Device)?;
        device.set_viewport(0, 0, width, height);
        device.enable_depth_test();

        let scene = &self.config.scene;
        let projection = scene.frustum.to_matrix();
        let offset = scene.camera_offset;
        let view = projection::translate(offset.x, offset.y, offset.z);
        self.backend.bind_projection(&projection, &view)?;

        self.viewport = Some(Viewport {
            width,
            height,
            framebuffer,
        });
        log::info!(
            "{} renderer initialized: {}x{}, cone {} vertices, disk {} vertices",
            self.backend.name(),
            width,
            height,
            self.mesh.cone().len(),
            self.mesh.disk().len()
        );
        Ok(())
    }

    /// Draw one frame at the current animation orientation.
    ///
    /// Only device state changes; the mesh and animation are read-only here.
    /// Vertex inputs and pushed transforms are released even when a draw
    /// fails.
    pub fn render(&mut self) -> RenderResult<(), B> {
        if self.viewport.is_none() {
            return Err(RenderError::NotInitialized);
        }

        self.backend
            .device_mut()
            .clear(self.config.scene.clear_color, true);

        let model = rotation::to_matrix(self.animation.current());
        self.backend.begin_frame(&model)?;

        let drawn = self
            .backend
            .draw(Topology::TriangleStrip, self.mesh.cone())
            .and_then(|()| self.backend.draw(Topology::TriangleFan, self.mesh.disk()));
        let ended = self.backend.end_frame();

        drawn?;
        ended
    }

    /// Advance the orientation animation by `dt` seconds.
    pub fn update_animation(&mut self, dt: f32) {
        self.animation.update(dt);
    }

    /// Start rotating the scene towards `orientation`.
    pub fn on_rotate(&mut self, orientation: DeviceOrientation) {
        self.animation.on_rotate(orientation);
    }

    pub fn is_initialized(&self) -> bool {
        self.viewport.is_some()
    }

    /// Surface size passed to [`Renderer::initialize`].
    pub fn size(&self) -> Option<(u32, u32)> {
        self.viewport.map(|v| (v.width, v.height))
    }

    pub fn framebuffer(&self) -> Option<FramebufferHandle> {
        self.viewport.map(|v| v.framebuffer)
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
