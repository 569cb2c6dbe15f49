//! Both backends driven through the software device must produce the same
//! frame for the same animation state.

use cone_core::config::RendererConfig;
use cone_core::{Backend, FixedFunctionBackend, Renderer, ShaderBackend};
use cone_hal::{DeviceOrientation, MatrixMode};
use cone_soft::SoftwareDevice;
use image::RgbaImage;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 480;
const BACKGROUND: [u8; 4] = [128, 128, 128, 255];

fn fixed_renderer() -> Renderer<FixedFunctionBackend<SoftwareDevice>> {
    let mut renderer = Renderer::new(
        FixedFunctionBackend::new(SoftwareDevice::new()),
        RendererConfig::default(),
    )
    .unwrap();
    renderer.initialize(WIDTH, HEIGHT).unwrap();
    renderer
}

fn shader_renderer() -> Renderer<ShaderBackend<SoftwareDevice>> {
    let mut renderer = Renderer::new(
        ShaderBackend::new(SoftwareDevice::new()),
        RendererConfig::default(),
    )
    .unwrap();
    renderer.initialize(WIDTH, HEIGHT).unwrap();
    renderer
}

fn frame<B: Backend<Device = SoftwareDevice>>(renderer: &mut Renderer<B>) -> RgbaImage {
    renderer.render().unwrap();
    renderer.backend().device().snapshot().unwrap()
}

fn differing_pixels(a: &RgbaImage, b: &RgbaImage) -> usize {
    a.pixels().zip(b.pixels()).filter(|(p, q)| p != q).count()
}

// ============================================================================
// Single frames
// ============================================================================

mod frames {
    use super::*;

    #[test]
    fn corner_shows_clear_color() {
        let mut renderer = shader_renderer();
        let image = frame(&mut renderer);
        assert_eq!(image.get_pixel(0, 0).0, BACKGROUND);
        assert_eq!(image.get_pixel(WIDTH - 1, HEIGHT - 1).0, BACKGROUND);
    }

    #[test]
    fn center_shows_cone() {
        let mut renderer = fixed_renderer();
        let image = frame(&mut renderer);
        assert_ne!(image.get_pixel(WIDTH / 2, HEIGHT / 2).0, BACKGROUND);
    }

    #[test]
    fn identity_frames_match() {
        let fixed = frame(&mut fixed_renderer());
        let shader = frame(&mut shader_renderer());
        assert_eq!(differing_pixels(&fixed, &shader), 0);
    }

    #[test]
    fn stats_count_both_draws() {
        let mut renderer = fixed_renderer();
        renderer.render().unwrap();
        let stats = renderer.backend().device().frame_stats();
        let slices = renderer.config().cone.slices;
        assert_eq!(stats.draw_calls, 2);
        // Strip of 2(n+1) vertices plus fan of n+2 vertices.
        assert_eq!(stats.triangles, 2 * slices + slices);
        assert!(stats.fragments > 0);
    }

    #[test]
    fn fixed_frame_leaves_stacks_balanced() {
        let mut renderer = fixed_renderer();
        for _ in 0..3 {
            renderer.render().unwrap();
        }
        let device = renderer.backend().device();
        assert_eq!(device.matrix_depth(MatrixMode::ModelView), 1);
        assert_eq!(device.matrix_depth(MatrixMode::Projection), 1);
    }
}

// ============================================================================
// Animated frames
// ============================================================================

mod animation {
    use super::*;

    fn rotate_both(
        fixed: &mut Renderer<FixedFunctionBackend<SoftwareDevice>>,
        shader: &mut Renderer<ShaderBackend<SoftwareDevice>>,
        orientation: DeviceOrientation,
    ) {
        fixed.on_rotate(orientation);
        shader.on_rotate(orientation);
    }

    #[test]
    fn frames_match_through_rotation() {
        let mut fixed = fixed_renderer();
        let mut shader = shader_renderer();

        for orientation in [
            DeviceOrientation::LandscapeLeft,
            DeviceOrientation::FaceUp,
            DeviceOrientation::PortraitUpsideDown,
        ] {
            rotate_both(&mut fixed, &mut shader, orientation);
            for _ in 0..4 {
                fixed.update_animation(0.1);
                shader.update_animation(0.1);
                let a = frame(&mut fixed);
                let b = frame(&mut shader);
                assert_eq!(differing_pixels(&a, &b), 0, "{orientation:?}");
            }
        }
    }

    #[test]
    fn rotation_changes_the_frame() {
        let mut renderer = shader_renderer();
        let before = frame(&mut renderer);
        renderer.on_rotate(DeviceOrientation::LandscapeLeft);
        renderer.update_animation(1.0);
        let after = frame(&mut renderer);
        assert!(differing_pixels(&before, &after) > 0);
        // The background around the cone is untouched.
        assert_eq!(after.get_pixel(0, 0).0, BACKGROUND);
    }
}

// ============================================================================
// Readback
// ============================================================================

mod readback {
    use super::*;

    #[test]
    fn save_png_round_trips() {
        let mut renderer = shader_renderer();
        let expected = frame(&mut renderer);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cone.png");
        renderer.backend().device().save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (WIDTH, HEIGHT));
        assert_eq!(differing_pixels(&expected, &loaded), 0);
    }

    #[test]
    fn save_png_without_framebuffer_fails() {
        let device = SoftwareDevice::new();
        let dir = tempfile::tempdir().unwrap();
        assert!(device.save_png(dir.path().join("none.png")).is_err());
    }
}
