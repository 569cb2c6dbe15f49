//! Cone and disk tessellation.
//!
//! Both vertex lists are generated once and never modified afterwards. The
//! renderer only changes the transform they are drawn with.

use crate::config::ConeConfig;
use crate::error::ConfigError;
use core::f32::consts::TAU;
use glam::{Vec3, Vec4};

/// Flat gray shared by every disk vertex.
pub const DISK_COLOR: [f32; 4] = [0.75, 0.75, 0.75, 1.0];

/// Interleaved position + color vertex, laid out as 7 consecutive floats.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    /// Floats per vertex.
    pub const STRIDE: usize = 7;
    pub const POSITION_OFFSET: usize = 0;
    pub const POSITION_COMPONENTS: usize = 3;
    pub const COLOR_OFFSET: usize = 3;
    pub const COLOR_COMPONENTS: usize = 4;

    pub fn new(position: Vec3, color: Vec4) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn color(&self) -> Vec4 {
        Vec4::from_array(self.color)
    }
}

/// View a vertex slice as the interleaved float data handed to the device.
pub fn as_floats(vertices: &[Vertex]) -> &[f32] {
    bytemuck::cast_slice(vertices)
}

/// The two vertex lists making up the scene.
#[derive(Clone, Debug)]
pub struct Mesh {
    cone: Vec<Vertex>,
    disk: Vec<Vertex>,
}

impl Mesh {
    pub fn build(config: &ConeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            cone: build_cone(config),
            disk: build_disk(config),
        })
    }

    /// Cone body, triangle-strip order, `2 * (slices + 1)` vertices.
    pub fn cone(&self) -> &[Vertex] {
        &self.cone
    }

    /// Base disk, triangle-fan order, `slices + 2` vertices.
    pub fn disk(&self) -> &[Vertex] {
        &self.disk
    }
}

/// Point on the base circle at angle `theta`.
fn base_point(config: &ConeConfig, theta: f32) -> Vec3 {
    Vec3::new(
        config.radius * theta.cos(),
        1.0 - config.height,
        config.radius * theta.sin(),
    )
}

/// Base disk as a triangle fan: the center, then `slices + 1` rim points
/// (the last one closes the loop at 2π).
pub fn build_disk(config: &ConeConfig) -> Vec<Vertex> {
    let slices = config.slices as usize;
    let dtheta = TAU / config.slices as f32;
    let color = Vec4::from_array(DISK_COLOR);

    let mut disk = Vec::with_capacity(slices + 2);
    disk.push(Vertex::new(Vec3::new(0.0, 1.0 - config.height, 0.0), color));
    for i in 0..=slices {
        let theta = i as f32 * dtheta;
        disk.push(Vertex::new(base_point(config, theta), color));
    }
    disk
}

/// Cone body as a triangle strip alternating apex and rim points.
///
/// Each apex/rim pair shares the baked brightness `|sin θ|`.
pub fn build_cone(config: &ConeConfig) -> Vec<Vertex> {
    let slices = config.slices as usize;
    let dtheta = TAU / config.slices as f32;
    let apex = Vec3::new(0.0, 1.0, 0.0);

    let mut cone = Vec::with_capacity(2 * (slices + 1));
    for i in 0..=slices {
        let theta = i as f32 * dtheta;
        let brightness = theta.sin().abs();
        let color = Vec4::new(brightness, brightness, brightness, 1.0);

        cone.push(Vertex::new(apex, color));
        cone.push(Vertex::new(base_point(config, theta), color));
    }
    cone
}
