//! [`SoftwareDevice`]: render targets, both pipelines and frame readback.

use crate::error::DeviceError;
use crate::framebuffer::Framebuffer;
use crate::program::Program;
use crate::raster::{self, FrameStats, Viewport};
use cone_hal::{
    AttribLocation, ClientArray, FramebufferHandle, GraphicsDevice, MatrixMode, MatrixStack,
    ProgramHandle, ShaderPipeline, TargetHandle, Topology, UniformLocation,
};
use glam::{Mat4, Vec4};
use image::{ImageFormat, RgbaImage};
use std::path::Path;

/// Deepest a matrix stack may grow, matching the minimum GL guarantees.
pub const MAX_STACK_DEPTH: usize = 32;

/// Generic vertex attribute slots.
pub const MAX_VERTEX_ATTRIBS: usize = 8;

const WHITE: Vec4 = Vec4::ONE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    /// Sized when first attached.
    Color(Option<(u32, u32)>),
    Depth(u32, u32),
}

/// Layout of one vertex input inside interleaved float data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pointer {
    components: usize,
    stride: usize,
    offset: usize,
}

impl Pointer {
    /// Gather this input from `data`, filling missing components from
    /// `(0, 0, 0, 1)`.
    fn fetch(&self, data: &[f32]) -> Result<Vec<Vec4>, DeviceError> {
        let misaligned = DeviceError::MisalignedData {
            len: data.len(),
            stride: self.stride,
        };
        if self.stride == 0
            || self.components == 0
            || self.components > 4
            || self.offset + self.components > self.stride
            || data.len() % self.stride != 0
        {
            return Err(misaligned);
        }
        Ok(data
            .chunks_exact(self.stride)
            .map(|vertex| {
                let mut v = [0.0, 0.0, 0.0, 1.0];
                v[..self.components]
                    .copy_from_slice(&vertex[self.offset..self.offset + self.components]);
                Vec4::from_array(v)
            })
            .collect())
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct ArrayState {
    enabled: bool,
    pointer: Option<Pointer>,
}

impl ArrayState {
    fn active(&self) -> Option<Pointer> {
        self.pointer.filter(|_| self.enabled)
    }
}

/// CPU implementation of every `cone-hal` device trait.
#[derive(Debug)]
pub struct SoftwareDevice {
    targets: Vec<Target>,
    framebuffers: Vec<Framebuffer>,
    bound: Option<usize>,
    viewport: Option<Viewport>,
    depth_test: bool,

    mode: MatrixMode,
    projection: Vec<Mat4>,
    modelview: Vec<Mat4>,
    vertex_array: ArrayState,
    color_array: ArrayState,

    programs: Vec<Program>,
    current_program: Option<usize>,
    attribs: [ArrayState; MAX_VERTEX_ATTRIBS],

    stats: FrameStats,
    total_draw_calls: u64,
}

impl Default for SoftwareDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareDevice {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            framebuffers: Vec::new(),
            bound: None,
            viewport: None,
            depth_test: false,
            mode: MatrixMode::ModelView,
            projection: vec![Mat4::IDENTITY],
            modelview: vec![Mat4::IDENTITY],
            vertex_array: ArrayState::default(),
            color_array: ArrayState::default(),
            programs: Vec::new(),
            current_program: None,
            attribs: [ArrayState::default(); MAX_VERTEX_ATTRIBS],
            stats: FrameStats::default(),
            total_draw_calls: 0,
        }
    }

    /// The bound framebuffer, if any.
    pub fn framebuffer(&self) -> Option<&Framebuffer> {
        self.bound.map(|i| &self.framebuffers[i])
    }

    /// Pixel of the bound framebuffer; row 0 is the top of the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.framebuffer()?.pixel(x, y)
    }

    /// Copy of the bound framebuffer's color buffer.
    pub fn snapshot(&self) -> Option<RgbaImage> {
        self.framebuffer().map(Framebuffer::to_image)
    }

    /// Write the bound framebuffer's color buffer as a PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), DeviceError> {
        let image = self.snapshot().ok_or(DeviceError::NoFramebuffer)?;
        image.save_with_format(path.as_ref(), ImageFormat::Png)?;
        log::info!("Wrote {}", path.as_ref().display());
        Ok(())
    }

    /// Counters since the last color clear.
    pub fn frame_stats(&self) -> FrameStats {
        self.stats
    }

    /// Draw calls since the device was created.
    pub fn draw_call_count(&self) -> u64 {
        self.total_draw_calls
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn depth_test_enabled(&self) -> bool {
        self.depth_test
    }

    pub fn matrix_depth(&self, mode: MatrixMode) -> usize {
        match mode {
            MatrixMode::Projection => self.projection.len(),
            MatrixMode::ModelView => self.modelview.len(),
        }
    }

    /// Top of the given matrix stack.
    pub fn matrix(&self, mode: MatrixMode) -> Mat4 {
        let stack = match mode {
            MatrixMode::Projection => &self.projection,
            MatrixMode::ModelView => &self.modelview,
        };
        stack.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    fn stack_mut(&mut self) -> &mut Vec<Mat4> {
        match self.mode {
            MatrixMode::Projection => &mut self.projection,
            MatrixMode::ModelView => &mut self.modelview,
        }
    }

    fn top_mut(&mut self) -> &mut Mat4 {
        let stack = self.stack_mut();
        if stack.is_empty() {
            stack.push(Mat4::IDENTITY);
        }
        let last = stack.len() - 1;
        &mut stack[last]
    }

    fn target(&self, handle: TargetHandle) -> Result<(usize, Target), DeviceError> {
        let index = (handle.0 as usize).wrapping_sub(1);
        self.targets
            .get(index)
            .map(|t| (index, *t))
            .ok_or(DeviceError::UnknownHandle {
                kind: "target",
                id: handle.0,
            })
    }

    fn program(&self, handle: ProgramHandle) -> Option<&Program> {
        self.programs.get((handle.0 as usize).wrapping_sub(1))
    }

    fn attrib_slot(&mut self, location: AttribLocation) -> Option<&mut ArrayState> {
        self.attribs.get_mut(location.0 as usize)
    }

    /// Transform, assemble and rasterize one draw into the bound framebuffer.
    fn rasterize(
        &mut self,
        topology: Topology,
        mvp: Mat4,
        positions: &[Vec4],
        colors: &[Vec4],
    ) -> Result<(), DeviceError> {
        let index = self.bound.ok_or(DeviceError::NoFramebuffer)?;
        let fb = &mut self.framebuffers[index];
        let viewport = self.viewport.unwrap_or(Viewport {
            x: 0,
            y: 0,
            width: fb.width(),
            height: fb.height(),
        });

        let vertices = raster::transform(&mvp, positions, colors);
        let triangles = raster::assemble(topology, vertices.len());
        log::trace!(
            "draw {:?}: {} vertices, {} triangles",
            topology,
            vertices.len(),
            triangles.len()
        );
        raster::draw_triangles(
            fb,
            &viewport,
            &vertices,
            &triangles,
            self.depth_test,
            &mut self.stats,
        );
        self.stats.draw_calls += 1;
        self.total_draw_calls += 1;
        Ok(())
    }
}

impl GraphicsDevice for SoftwareDevice {
    type Error = DeviceError;

    fn create_color_target(&mut self) -> Result<TargetHandle, DeviceError> {
        self.targets.push(Target::Color(None));
        Ok(TargetHandle(self.targets.len() as u32))
    }

    fn create_depth_target(&mut self, width: u32, height: u32) -> Result<TargetHandle, DeviceError> {
        self.targets.push(Target::Depth(width, height));
        Ok(TargetHandle(self.targets.len() as u32))
    }

    fn create_framebuffer(
        &mut self,
        color: TargetHandle,
        depth: TargetHandle,
    ) -> Result<FramebufferHandle, DeviceError> {
        let (color_index, color_target) = self.target(color)?;
        let (_, depth_target) = self.target(depth)?;

        let Target::Depth(width, height) = depth_target else {
            return Err(DeviceError::IncompleteFramebuffer(
                "depth attachment is not a depth target",
            ));
        };
        if width == 0 || height == 0 {
            return Err(DeviceError::IncompleteFramebuffer("zero-sized attachment"));
        }
        match color_target {
            Target::Color(None) => {
                self.targets[color_index] = Target::Color(Some((width, height)));
            }
            Target::Color(Some(size)) if size == (width, height) => {}
            Target::Color(Some(_)) => {
                return Err(DeviceError::IncompleteFramebuffer(
                    "color and depth attachments differ in size",
                ))
            }
            Target::Depth(..) => {
                return Err(DeviceError::IncompleteFramebuffer(
                    "color attachment is not a color target",
                ))
            }
        }

        self.framebuffers.push(Framebuffer::new(width, height));
        log::debug!("Created {}x{} framebuffer", width, height);
        Ok(FramebufferHandle(self.framebuffers.len() as u32))
    }

    fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle) -> Result<(), DeviceError> {
        let index = (framebuffer.0 as usize).wrapping_sub(1);
        if index >= self.framebuffers.len() {
            return Err(DeviceError::UnknownHandle {
                kind: "framebuffer",
                id: framebuffer.0,
            });
        }
        self.bound = Some(index);
        Ok(())
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewport = Some(Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn enable_depth_test(&mut self) {
        self.depth_test = true;
    }

    fn clear(&mut self, color: [f32; 4], depth: bool) {
        let Some(index) = self.bound else {
            log::warn!("clear with no framebuffer bound");
            return;
        };
        let fb = &mut self.framebuffers[index];
        fb.clear_color(color);
        if depth {
            fb.clear_depth();
        }
        self.stats = FrameStats::default();
    }
}

impl MatrixStack for SoftwareDevice {
    fn matrix_mode(&mut self, mode: MatrixMode) {
        self.mode = mode;
    }

    fn load_identity(&mut self) {
        *self.top_mut() = Mat4::IDENTITY;
    }

    fn load_matrix(&mut self, matrix: &[f32; 16]) {
        *self.top_mut() = Mat4::from_cols_array(matrix);
    }

    fn mult_matrix(&mut self, matrix: &[f32; 16]) {
        let top = self.top_mut();
        *top *= Mat4::from_cols_array(matrix);
    }

    fn push_matrix(&mut self) -> Result<(), DeviceError> {
        let stack = self.stack_mut();
        if stack.len() >= MAX_STACK_DEPTH {
            return Err(DeviceError::StackOverflow);
        }
        let top = stack.last().copied().unwrap_or(Mat4::IDENTITY);
        stack.push(top);
        Ok(())
    }

    fn pop_matrix(&mut self) -> Result<(), DeviceError> {
        let stack = self.stack_mut();
        if stack.len() <= 1 {
            return Err(DeviceError::StackUnderflow);
        }
        stack.pop();
        Ok(())
    }

    fn enable_array(&mut self, array: ClientArray) {
        match array {
            ClientArray::Vertex => self.vertex_array.enabled = true,
            ClientArray::Color => self.color_array.enabled = true,
        }
    }

    fn disable_array(&mut self, array: ClientArray) {
        match array {
            ClientArray::Vertex => self.vertex_array.enabled = false,
            ClientArray::Color => self.color_array.enabled = false,
        }
    }

    fn vertex_pointer(&mut self, components: usize, stride: usize, offset: usize) {
        self.vertex_array.pointer = Some(Pointer {
            components,
            stride,
            offset,
        });
    }

    fn color_pointer(&mut self, components: usize, stride: usize, offset: usize) {
        self.color_array.pointer = Some(Pointer {
            components,
            stride,
            offset,
        });
    }

    fn draw_arrays(&mut self, topology: Topology, data: &[f32]) -> Result<(), DeviceError> {
        let positions = self
            .vertex_array
            .active()
            .ok_or_else(|| DeviceError::MissingAttribute("vertex array".to_string()))?
            .fetch(data)?;
        let colors = match self.color_array.active() {
            Some(pointer) => pointer.fetch(data)?,
            None => vec![WHITE; positions.len()],
        };
        if colors.len() != positions.len() {
            return Err(DeviceError::MisalignedData {
                len: data.len(),
                stride: self.color_array.pointer.map_or(0, |p| p.stride),
            });
        }

        let mvp = self.matrix(MatrixMode::Projection) * self.matrix(MatrixMode::ModelView);
        self.rasterize(topology, mvp, &positions, &colors)
    }
}

impl ShaderPipeline for SoftwareDevice {
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, DeviceError> {
        let program = Program::build(vertex_source, fragment_source)?;
        self.programs.push(program);
        let handle = ProgramHandle(self.programs.len() as u32);
        log::debug!("Linked program {}", handle.0);
        Ok(handle)
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<(), DeviceError> {
        if self.program(program).is_none() {
            return Err(DeviceError::UnknownHandle {
                kind: "program",
                id: program.0,
            });
        }
        self.current_program = Some(program.0 as usize - 1);
        Ok(())
    }

    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<AttribLocation> {
        self.program(program)?
            .attrib_index(name)
            .filter(|&i| i < MAX_VERTEX_ATTRIBS)
            .map(|i| AttribLocation(i as u32))
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.program(program)?
            .uniform_index(name)
            .map(|i| UniformLocation(i as u32))
    }

    fn uniform_matrix4(
        &mut self,
        location: UniformLocation,
        matrix: &[f32; 16],
    ) -> Result<(), DeviceError> {
        let index = self.current_program.ok_or(DeviceError::NoProgram)?;
        if self.programs[index].set_uniform(location.0 as usize, Mat4::from_cols_array(matrix)) {
            Ok(())
        } else {
            Err(DeviceError::UnknownHandle {
                kind: "uniform",
                id: location.0,
            })
        }
    }

    fn enable_attrib(&mut self, location: AttribLocation) {
        if let Some(slot) = self.attrib_slot(location) {
            slot.enabled = true;
        }
    }

    fn disable_attrib(&mut self, location: AttribLocation) {
        if let Some(slot) = self.attrib_slot(location) {
            slot.enabled = false;
        }
    }

    fn attrib_pointer(
        &mut self,
        location: AttribLocation,
        components: usize,
        stride: usize,
        offset: usize,
    ) {
        if let Some(slot) = self.attrib_slot(location) {
            slot.pointer = Some(Pointer {
                components,
                stride,
                offset,
            });
        }
    }

    fn draw_arrays(&mut self, topology: Topology, data: &[f32]) -> Result<(), DeviceError> {
        let index = self.current_program.ok_or(DeviceError::NoProgram)?;
        let program = &self.programs[index];
        let mvp = program.transform()?;

        let input = |attrib: usize| -> Result<Pointer, DeviceError> {
            self.attribs
                .get(attrib)
                .and_then(ArrayState::active)
                .ok_or_else(|| {
                    DeviceError::MissingAttribute(program.attribute_name(attrib).to_string())
                })
        };
        let positions = input(program.position_attrib())?.fetch(data)?;
        let color_pointer = input(program.color_attrib())?;
        let colors = color_pointer.fetch(data)?;
        if colors.len() != positions.len() {
            return Err(DeviceError::MisalignedData {
                len: data.len(),
                stride: color_pointer.stride,
            });
        }

        self.rasterize(topology, mvp, &positions, &colors)
    }
}
