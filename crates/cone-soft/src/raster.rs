//! Vertex transform, primitive assembly and triangle rasterization.
//!
//! Clip-space vertices go through perspective divide and viewport mapping,
//! then each triangle is scan-converted with edge functions. Colors are
//! interpolated perspective-correctly; depth is interpolated in window space.

use crate::framebuffer::Framebuffer;
use cone_hal::Topology;
use glam::{Mat4, Vec4};

/// Vertices with `w` at or below this are behind the eye; their triangles
/// are dropped instead of clipped.
const MIN_CLIP_W: f32 = 1e-6;

/// Viewport rectangle in window coordinates (origin bottom-left).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Counters for the current frame, reset by a color clear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub triangles: u32,
    /// Triangles dropped as degenerate or behind the eye.
    pub triangles_culled: u32,
    pub fragments: u32,
}

/// Vertex after the vertex stage.
#[derive(Clone, Copy, Debug)]
pub struct ClipVertex {
    pub position: Vec4,
    pub color: Vec4,
}

/// Vertex in window space, ready for scan conversion.
#[derive(Clone, Copy, Debug)]
struct WindowVertex {
    x: f32,
    y: f32,
    z: f32,
    inv_w: f32,
    /// Color pre-divided by clip `w`.
    color_w: Vec4,
}

/// Run `mvp` over positions and pass colors through.
pub fn transform(mvp: &Mat4, positions: &[Vec4], colors: &[Vec4]) -> Vec<ClipVertex> {
    positions
        .iter()
        .zip(colors)
        .map(|(p, c)| ClipVertex {
            position: *mvp * *p,
            color: *c,
        })
        .collect()
}

/// Perspective divide and viewport mapping. `None` for vertices behind the eye.
fn to_window(v: &ClipVertex, viewport: &Viewport) -> Option<WindowVertex> {
    let w = v.position.w;
    if w <= MIN_CLIP_W {
        return None;
    }
    let inv_w = 1.0 / w;
    let ndc_x = v.position.x * inv_w;
    let ndc_y = v.position.y * inv_w;
    let ndc_z = v.position.z * inv_w;

    Some(WindowVertex {
        x: viewport.x as f32 + (ndc_x + 1.0) * 0.5 * viewport.width as f32,
        y: viewport.y as f32 + (ndc_y + 1.0) * 0.5 * viewport.height as f32,
        z: (ndc_z + 1.0) * 0.5,
        inv_w,
        color_w: v.color * inv_w,
    })
}

/// Vertex index triples for `count` vertices in `topology`.
///
/// Odd strip triangles swap their first two vertices so every triangle keeps
/// the winding of the first one.
pub fn assemble(topology: Topology, count: usize) -> Vec<[usize; 3]> {
    (2..count)
        .map(|i| match topology {
            Topology::TriangleStrip if i % 2 == 0 => [i - 2, i - 1, i],
            Topology::TriangleStrip => [i - 1, i - 2, i],
            Topology::TriangleFan => [0, i - 1, i],
        })
        .collect()
}

/// Signed doubled area of (a, b, p).
fn edge(ax: f32, ay: f32, bx: f32, by: f32, px: f32, py: f32) -> f32 {
    (bx - ax) * (py - ay) - (by - ay) * (px - ax)
}

/// Rasterize assembled triangles into `fb`.
pub fn draw_triangles(
    fb: &mut Framebuffer,
    viewport: &Viewport,
    vertices: &[ClipVertex],
    triangles: &[[usize; 3]],
    depth_test: bool,
    stats: &mut FrameStats,
) {
    let window: Vec<Option<WindowVertex>> =
        vertices.iter().map(|v| to_window(v, viewport)).collect();

    for &[i0, i1, i2] in triangles {
        stats.triangles += 1;
        match (window[i0], window[i1], window[i2]) {
            (Some(v0), Some(v1), Some(v2)) => {
                if !rasterize_triangle(fb, viewport, [&v0, &v1, &v2], depth_test, stats) {
                    stats.triangles_culled += 1;
                }
            }
            _ => stats.triangles_culled += 1,
        }
    }
}

/// Top-left fill rule: a pixel center exactly on an edge belongs to the
/// triangle only if the edge is a top or left edge. `ccw` is the winding
/// in window space (y up).
fn owns_edge(a: &WindowVertex, b: &WindowVertex, ccw: bool) -> bool {
    let (a, b) = if ccw { (a, b) } else { (b, a) };
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dy < 0.0 || (dy == 0.0 && dx < 0.0)
}

/// Returns false when the triangle has no area.
fn rasterize_triangle(
    fb: &mut Framebuffer,
    viewport: &Viewport,
    [v0, v1, v2]: [&WindowVertex; 3],
    depth_test: bool,
    stats: &mut FrameStats,
) -> bool {
    let area = edge(v0.x, v0.y, v1.x, v1.y, v2.x, v2.y);
    if area == 0.0 || !area.is_finite() {
        return false;
    }
    let inv_area = 1.0 / area;
    let ccw = area > 0.0;
    let owns = [
        owns_edge(v1, v2, ccw),
        owns_edge(v2, v0, ccw),
        owns_edge(v0, v1, ccw),
    ];

    // Bounding box clamped to both the viewport and the framebuffer.
    let fb_h = fb.height() as f32;
    let min_x = v0.x.min(v1.x).min(v2.x).max(viewport.x as f32).max(0.0);
    let max_x = v0
        .x
        .max(v1.x)
        .max(v2.x)
        .min((viewport.x + viewport.width as i32) as f32)
        .min(fb.width() as f32);
    let min_y = v0.y.min(v1.y).min(v2.y).max(viewport.y as f32).max(0.0);
    let max_y = v0
        .y
        .max(v1.y)
        .max(v2.y)
        .min((viewport.y + viewport.height as i32) as f32)
        .min(fb_h);
    if min_x >= max_x || min_y >= max_y {
        return true;
    }

    let x_start = min_x.floor() as u32;
    let x_end = max_x.ceil() as u32;
    let y_start = min_y.floor() as u32;
    let y_end = max_y.ceil() as u32;

    for wy in y_start..y_end {
        let py = wy as f32 + 0.5;
        for wx in x_start..x_end {
            let px = wx as f32 + 0.5;
            let b0 = edge(v1.x, v1.y, v2.x, v2.y, px, py) * inv_area;
            let b1 = edge(v2.x, v2.y, v0.x, v0.y, px, py) * inv_area;
            let b2 = edge(v0.x, v0.y, v1.x, v1.y, px, py) * inv_area;
            let covered = [b0, b1, b2]
                .iter()
                .zip(owns)
                .all(|(&b, owned)| b > 0.0 || (b == 0.0 && owned));
            if !covered {
                continue;
            }

            let z = b0 * v0.z + b1 * v1.z + b2 * v2.z;
            if !(0.0..=1.0).contains(&z) {
                continue;
            }

            let inv_w = b0 * v0.inv_w + b1 * v1.inv_w + b2 * v2.inv_w;
            let color = (v0.color_w * b0 + v1.color_w * b1 + v2.color_w * b2) / inv_w;

            // Window y grows upwards; framebuffer rows grow downwards.
            let row = fb.height() - 1 - wy;
            if fb.write(wx, row, z, color.to_array(), depth_test) {
                stats.fragments += 1;
            }
        }
    }
    true
}
