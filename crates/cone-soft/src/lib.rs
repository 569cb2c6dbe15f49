//! CPU reference device for the cone renderer.
//!
//! [`SoftwareDevice`] implements every trait in `cone-hal`: render targets,
//! the fixed-function matrix stack and a shader pipeline that interprets the
//! small GLSL subset the built-in program uses. Both pipelines feed the same
//! rasterizer, so frames drawn through either backend can be compared pixel
//! for pixel.

pub mod device;
pub mod error;
pub mod framebuffer;
pub mod program;
pub mod raster;

pub use device::SoftwareDevice;
pub use error::DeviceError;
pub use framebuffer::Framebuffer;
pub use raster::FrameStats;
