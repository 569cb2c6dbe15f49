//! Backend for the fixed-function pipeline.

use super::{Backend, BackendResult};
use crate::error::RenderError;
use crate::mesh::{as_floats, Vertex};
use cone_hal::{ClientArray, MatrixMode, MatrixStack, Topology};
use glam::Mat4;

/// Binds transforms through the global projection / model-view stacks.
///
/// The camera translation stays loaded on the model-view stack; each frame
/// pushes it, multiplies the rotation on top and pops it again.
pub struct FixedFunctionBackend<D: MatrixStack> {
    device: D,
}

impl<D: MatrixStack> FixedFunctionBackend<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    pub fn into_device(self) -> D {
        self.device
    }
}

impl<D: MatrixStack> Backend for FixedFunctionBackend<D> {
    type Device = D;

    fn name(&self) -> &'static str {
        "fixed-function"
    }

    fn device(&self) -> &D {
        &self.device
    }

    fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    fn bind_projection(&mut self, projection: &Mat4, view: &Mat4) -> BackendResult<D> {
        self.device.matrix_mode(MatrixMode::Projection);
        self.device.load_identity();
        self.device.mult_matrix(&projection.to_cols_array());

        self.device.matrix_mode(MatrixMode::ModelView);
        self.device.load_identity();
        self.device.mult_matrix(&view.to_cols_array());
        Ok(())
    }

    fn begin_frame(&mut self, model: &Mat4) -> BackendResult<D> {
        self.device.push_matrix().map_err(RenderError::Device)?;
        self.device.enable_array(ClientArray::Vertex);
        self.device.enable_array(ClientArray::Color);
        self.device.mult_matrix(&model.to_cols_array());
        Ok(())
    }

    fn draw(&mut self, topology: Topology, vertices: &[Vertex]) -> BackendResult<D> {
        self.device.vertex_pointer(
            Vertex::POSITION_COMPONENTS,
            Vertex::STRIDE,
            Vertex::POSITION_OFFSET,
        );
        self.device
            .color_pointer(Vertex::COLOR_COMPONENTS, Vertex::STRIDE, Vertex::COLOR_OFFSET);
        self.device
            .draw_arrays(topology, as_floats(vertices))
            .map_err(RenderError::Device)
    }

    fn end_frame(&mut self) -> BackendResult<D> {
        self.device.disable_array(ClientArray::Vertex);
        self.device.disable_array(ClientArray::Color);
        self.device.pop_matrix().map_err(RenderError::Device)
    }
}
