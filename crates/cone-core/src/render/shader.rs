//! Backend for the programmable pipeline.

use super::shaders;
use super::{Backend, BackendResult};
use crate::error::RenderError;
use crate::mesh::{as_floats, Vertex};
use cone_hal::{AttribLocation, ProgramHandle, ShaderPipeline, Topology, UniformLocation};
use glam::Mat4;

/// Locations resolved once after linking.
#[derive(Clone, Copy, Debug)]
struct ProgramBindings {
    program: ProgramHandle,
    position: AttribLocation,
    color: AttribLocation,
    modelview: UniformLocation,
    view: Mat4,
}

/// Binds transforms as uniforms of a linked vertex + fragment program.
///
/// The projection is uploaded once; the model-view uniform is recomputed as
/// `view * model` every frame.
pub struct ShaderBackend<D: ShaderPipeline> {
    device: D,
    vertex_source: &'static str,
    fragment_source: &'static str,
    bindings: Option<ProgramBindings>,
}

impl<D: ShaderPipeline> ShaderBackend<D> {
    /// Backend using the built-in shader pair.
    pub fn new(device: D) -> Self {
        Self::with_sources(
            device,
            shaders::SIMPLE_VERTEX_SHADER,
            shaders::SIMPLE_FRAGMENT_SHADER,
        )
    }

    /// Backend using a custom shader pair. The sources must declare the
    /// attributes and uniforms named in [`shaders`].
    pub fn with_sources(
        device: D,
        vertex_source: &'static str,
        fragment_source: &'static str,
    ) -> Self {
        Self {
            device,
            vertex_source,
            fragment_source,
            bindings: None,
        }
    }

    /// Linked program, once [`Backend::bind_projection`] has succeeded.
    pub fn program(&self) -> Option<ProgramHandle> {
        self.bindings.map(|b| b.program)
    }

    pub fn into_device(self) -> D {
        self.device
    }

    fn bindings(&self) -> Result<ProgramBindings, RenderError<D::Error>> {
        self.bindings.ok_or(RenderError::NotInitialized)
    }
}

impl<D: ShaderPipeline> Backend for ShaderBackend<D> {
    type Device = D;

    fn name(&self) -> &'static str {
        "shader"
    }

    fn device(&self) -> &D {
        &self.device
    }

    fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    fn bind_projection(&mut self, projection: &Mat4, view: &Mat4) -> BackendResult<D> {
        let program = self
            .device
            .compile_program(self.vertex_source, self.fragment_source)
            .map_err(RenderError::Shader)?;
        self.device
            .use_program(program)
            .map_err(RenderError::Device)?;

        let position = self
            .device
            .attrib_location(program, shaders::POSITION_ATTRIB)
            .ok_or(RenderError::MissingLocation(shaders::POSITION_ATTRIB))?;
        let color = self
            .device
            .attrib_location(program, shaders::COLOR_ATTRIB)
            .ok_or(RenderError::MissingLocation(shaders::COLOR_ATTRIB))?;
        let projection_uniform = self
            .device
            .uniform_location(program, shaders::PROJECTION_UNIFORM)
            .ok_or(RenderError::MissingLocation(shaders::PROJECTION_UNIFORM))?;
        let modelview = self
            .device
            .uniform_location(program, shaders::MODELVIEW_UNIFORM)
            .ok_or(RenderError::MissingLocation(shaders::MODELVIEW_UNIFORM))?;

        self.device
            .uniform_matrix4(projection_uniform, &projection.to_cols_array())
            .map_err(RenderError::Device)?;

        self.bindings = Some(ProgramBindings {
            program,
            position,
            color,
            modelview,
            view: *view,
        });
        log::debug!("shader program {:?} linked", program);
        Ok(())
    }

    fn begin_frame(&mut self, model: &Mat4) -> BackendResult<D> {
        let bindings = self.bindings()?;
        let modelview = bindings.view * *model;
        self.device
            .uniform_matrix4(bindings.modelview, &modelview.to_cols_array())
            .map_err(RenderError::Device)?;
        self.device.enable_attrib(bindings.position);
        self.device.enable_attrib(bindings.color);
        Ok(())
    }

    fn draw(&mut self, topology: Topology, vertices: &[Vertex]) -> BackendResult<D> {
        let bindings = self.bindings()?;
        self.device.attrib_pointer(
            bindings.position,
            Vertex::POSITION_COMPONENTS,
            Vertex::STRIDE,
            Vertex::POSITION_OFFSET,
        );
        self.device.attrib_pointer(
            bindings.color,
            Vertex::COLOR_COMPONENTS,
            Vertex::STRIDE,
            Vertex::COLOR_OFFSET,
        );
        self.device
            .draw_arrays(topology, as_floats(vertices))
            .map_err(RenderError::Device)
    }

    fn end_frame(&mut self) -> BackendResult<D> {
        let bindings = self.bindings()?;
        self.device.disable_attrib(bindings.position);
        self.device.disable_attrib(bindings.color);
        Ok(())
    }
}
