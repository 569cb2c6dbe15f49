//! Tests for cone and disk tessellation.

use cone_core::config::ConeConfig;
use cone_core::error::ConfigError;
use cone_core::mesh::{as_floats, build_cone, build_disk, Mesh, Vertex, DISK_COLOR};
use glam::Vec3;

fn default_mesh() -> Mesh {
    Mesh::build(&ConeConfig::default()).expect("default config should build")
}

mod vertex_counts {
    use super::*;

    #[test]
    fn default_counts() {
        let mesh = default_mesh();
        assert_eq!(mesh.disk().len(), 42);
        assert_eq!(mesh.cone().len(), 82);
    }

    #[test]
    fn counts_hold_for_many_slice_counts() {
        // Index-bounded stepping: no extra or missing iteration from float drift.
        for slices in [1, 2, 3, 7, 10, 40, 97, 360, 1000, 4099] {
            let config = ConeConfig {
                slices,
                ..ConeConfig::default()
            };
            let slices = slices as usize;
            assert_eq!(build_disk(&config).len(), slices + 2, "disk, slices={slices}");
            assert_eq!(build_cone(&config).len(), 2 * (slices + 1), "cone, slices={slices}");
        }
    }

    #[test]
    fn zero_slices_is_rejected() {
        let config = ConeConfig {
            slices: 0,
            ..ConeConfig::default()
        };
        assert_eq!(Mesh::build(&config).unwrap_err(), ConfigError::ZeroSlices);
    }
}

mod disk_geometry {
    use super::*;

    #[test]
    fn all_vertices_share_base_height() {
        let mesh = default_mesh();
        let y = 1.0 - 1.866;
        for v in mesh.disk() {
            assert!((v.position[1] - y).abs() < 1e-6);
            assert_eq!(v.color, DISK_COLOR);
        }
    }

    #[test]
    fn center_then_rim() {
        let mesh = default_mesh();
        let center = mesh.disk()[0].position();
        assert_eq!(center.x, 0.0);
        assert_eq!(center.z, 0.0);

        for v in &mesh.disk()[1..] {
            let p = v.position();
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!((r - 0.5).abs() < 1e-5, "rim radius {r}");
        }
    }

    #[test]
    fn rim_closes_the_loop() {
        let mesh = default_mesh();
        let first = mesh.disk()[1].position();
        let last = mesh.disk()[mesh.disk().len() - 1].position();
        assert!((first - last).length() < 1e-5);
    }
}

mod cone_geometry {
    use super::*;

    #[test]
    fn apex_vertices_are_at_top() {
        let mesh = default_mesh();
        for apex in mesh.cone().iter().step_by(2) {
            assert_eq!(apex.position(), Vec3::new(0.0, 1.0, 0.0));
        }
    }

    #[test]
    fn rim_vertices_are_on_base_circle() {
        let mesh = default_mesh();
        for rim in mesh.cone().iter().skip(1).step_by(2) {
            let p = rim.position();
            assert!((p.y - (1.0 - 1.866)).abs() < 1e-6);
            assert!(((p.x * p.x + p.z * p.z).sqrt() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn pairs_share_baked_brightness() {
        let config = ConeConfig::default();
        let cone = build_cone(&config);
        let dtheta = core::f32::consts::TAU / config.slices as f32;
        for (i, pair) in cone.chunks(2).enumerate() {
            assert_eq!(pair[0].color, pair[1].color);
            let expected = (i as f32 * dtheta).sin().abs();
            let [r, g, b, a] = pair[0].color;
            assert!((r - expected).abs() < 1e-6);
            assert_eq!(r, g);
            assert_eq!(g, b);
            assert_eq!(a, 1.0);
        }
    }
}

mod interleaving {
    use super::*;

    #[test]
    fn vertex_is_seven_packed_floats() {
        assert_eq!(core::mem::size_of::<Vertex>(), Vertex::STRIDE * 4);
    }

    #[test]
    fn float_view_is_interleaved() {
        let mesh = default_mesh();
        let floats = as_floats(mesh.cone());
        assert_eq!(floats.len(), mesh.cone().len() * Vertex::STRIDE);
        let second = &floats[Vertex::STRIDE..2 * Vertex::STRIDE];
        assert_eq!(&second[..3], &mesh.cone()[1].position);
        assert_eq!(&second[3..], &mesh.cone()[1].color);
    }
}
