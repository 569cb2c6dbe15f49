#![no_std]

//! Graphics API and platform abstraction traits.
//!
//! The renderer in `cone-core` never talks to a concrete graphics binding.
//! It drives one of the two pipeline traits below, both of which extend the
//! render-target management in [`GraphicsDevice`]:
//!
//! - [`MatrixStack`]: a legacy fixed-function pipeline with a global
//!   projection / model-view matrix stack and client-side vertex arrays.
//! - [`ShaderPipeline`]: a programmable pipeline where the projection and
//!   model-view transforms are uploaded as uniforms of a linked program.

/// Handle to color or depth storage owned by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetHandle(pub u32);

/// Handle to a framebuffer object combining a color and a depth target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferHandle(pub u32);

/// Handle to a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Location of a vertex attribute inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttribLocation(pub u32);

/// Location of a uniform inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// How an ordered vertex sequence decomposes into triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Vertex `i` forms a triangle with vertices `i-1` and `i-2`.
    TriangleStrip,
    /// Vertex `i` forms a triangle with vertex `i-1` and vertex 0.
    TriangleFan,
}

impl Topology {
    /// Number of triangles produced by `vertex_count` vertices.
    pub fn triangle_count(&self, vertex_count: usize) -> usize {
        vertex_count.saturating_sub(2)
    }
}

/// Shader stage, used to tag compile diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl core::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Render-target management shared by both pipeline generations.
pub trait GraphicsDevice {
    type Error: core::fmt::Debug;

    /// Allocate color storage. Its size is fixed when it is attached to a
    /// framebuffer (the display surface decides it on real hardware).
    fn create_color_target(&mut self) -> Result<TargetHandle, Self::Error>;

    /// Allocate `width x height` depth storage.
    fn create_depth_target(&mut self, width: u32, height: u32)
        -> Result<TargetHandle, Self::Error>;

    /// Create a framebuffer with the given color and depth attachments.
    fn create_framebuffer(
        &mut self,
        color: TargetHandle,
        depth: TargetHandle,
    ) -> Result<FramebufferHandle, Self::Error>;

    /// Make `framebuffer` the destination of subsequent clears and draws.
    fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle) -> Result<(), Self::Error>;

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    fn enable_depth_test(&mut self);

    /// Clear the bound framebuffer to `color`, and the depth buffer to the
    /// far plane when `depth` is set.
    fn clear(&mut self, color: [f32; 4], depth: bool);
}

/// Matrix stack selected by [`MatrixStack::matrix_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixMode {
    Projection,
    ModelView,
}

/// Client-side vertex arrays of the fixed-function pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientArray {
    Vertex,
    Color,
}

/// Fixed-function pipeline: global transform stacks and client arrays.
///
/// Matrices are column-major, 16 floats.
pub trait MatrixStack: GraphicsDevice {
    fn matrix_mode(&mut self, mode: MatrixMode);

    fn load_identity(&mut self);

    fn load_matrix(&mut self, matrix: &[f32; 16]);

    /// Post-multiply the top of the current stack by `matrix`.
    fn mult_matrix(&mut self, matrix: &[f32; 16]);

    fn push_matrix(&mut self) -> Result<(), Self::Error>;

    fn pop_matrix(&mut self) -> Result<(), Self::Error>;

    fn enable_array(&mut self, array: ClientArray);

    fn disable_array(&mut self, array: ClientArray);

    /// Describe where positions live inside the interleaved float data.
    /// `stride` and `offset` are counted in floats.
    fn vertex_pointer(&mut self, components: usize, stride: usize, offset: usize);

    /// Describe where colors live inside the interleaved float data.
    fn color_pointer(&mut self, components: usize, stride: usize, offset: usize);

    /// Draw every vertex in `data` using the current pointers.
    fn draw_arrays(&mut self, topology: Topology, data: &[f32]) -> Result<(), Self::Error>;
}

/// Programmable pipeline: linked programs, uniforms and vertex attributes.
pub trait ShaderPipeline: GraphicsDevice {
    /// Compile both stages and link them. Errors carry the driver's
    /// diagnostic text.
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, Self::Error>;

    fn use_program(&mut self, program: ProgramHandle) -> Result<(), Self::Error>;

    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<AttribLocation>;

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Upload a column-major 4x4 matrix to a uniform of the current program.
    fn uniform_matrix4(
        &mut self,
        location: UniformLocation,
        matrix: &[f32; 16],
    ) -> Result<(), Self::Error>;

    fn enable_attrib(&mut self, location: AttribLocation);

    fn disable_attrib(&mut self, location: AttribLocation);

    /// Bind an attribute to a slice of the interleaved float data.
    /// `stride` and `offset` are counted in floats.
    fn attrib_pointer(
        &mut self,
        location: AttribLocation,
        components: usize,
        stride: usize,
        offset: usize,
    );

    /// Draw every vertex in `data` using the current program and attributes.
    fn draw_arrays(&mut self, topology: Topology, data: &[f32]) -> Result<(), Self::Error>;
}

/// Physical orientation reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceOrientation {
    #[default]
    Unknown,
    Portrait,
    PortraitUpsideDown,
    FaceDown,
    FaceUp,
    LandscapeLeft,
    LandscapeRight,
}

impl DeviceOrientation {
    pub const ALL: [DeviceOrientation; 7] = [
        DeviceOrientation::Unknown,
        DeviceOrientation::Portrait,
        DeviceOrientation::PortraitUpsideDown,
        DeviceOrientation::FaceDown,
        DeviceOrientation::FaceUp,
        DeviceOrientation::LandscapeLeft,
        DeviceOrientation::LandscapeRight,
    ];

    /// Kebab-case name, as used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            DeviceOrientation::Unknown => "unknown",
            DeviceOrientation::Portrait => "portrait",
            DeviceOrientation::PortraitUpsideDown => "portrait-upside-down",
            DeviceOrientation::FaceDown => "face-down",
            DeviceOrientation::FaceUp => "face-up",
            DeviceOrientation::LandscapeLeft => "landscape-left",
            DeviceOrientation::LandscapeRight => "landscape-right",
        }
    }

    /// Inverse of [`DeviceOrientation::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.name() == name)
    }
}

/// Source of orientation-change notifications.
pub trait OrientationSource {
    /// Initialize the source.
    fn init(&mut self);

    /// Poll for an orientation change. Non-blocking.
    fn poll(&mut self) -> Option<DeviceOrientation>;
}
