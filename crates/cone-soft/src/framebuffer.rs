//! Color + depth storage of one framebuffer object.

use image::RgbaImage;

/// RGBA8 color buffer and f32 depth buffer, rows stored top to bottom.
#[derive(Clone, Debug)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<u8>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            color: vec![0; pixels * 4],
            depth: vec![1.0; pixels],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear_color(&mut self, color: [f32; 4]) {
        let rgba = to_rgba8(color);
        for pixel in self.color.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }

    /// Reset depth to the far plane.
    pub fn clear_depth(&mut self) {
        self.depth.fill(1.0);
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Color at column `x`, row `y` (row 0 is the top of the image).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.index(x, y)? * 4;
        Some([
            self.color[i],
            self.color[i + 1],
            self.color[i + 2],
            self.color[i + 3],
        ])
    }

    pub fn depth(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Write a fragment, optionally behind a `LESS` depth test.
    /// Returns whether the fragment was kept.
    pub(crate) fn write(&mut self, x: u32, y: u32, z: f32, color: [f32; 4], depth_test: bool) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        if depth_test {
            if z >= self.depth[i] {
                return false;
            }
            self.depth[i] = z;
        }
        self.color[i * 4..i * 4 + 4].copy_from_slice(&to_rgba8(color));
        true
    }

    /// Copy of the color buffer as an image.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.color.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

/// Convert a float color to RGBA8, clamping each channel to [0, 1].
pub fn to_rgba8(color: [f32; 4]) -> [u8; 4] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}
