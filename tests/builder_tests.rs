use std::sync::Arc;

use glam::{DVec3, Vec3, Vec4};
use globe_view::builder::{color_image, Builder, GeometryInfo, GeometryType, Image, MeshData, Shape};
use globe_view::core::{GpuContext, ResourceCache};

fn gpu_builder(max_textures: u32) -> Option<Builder> {
    let gpu = pollster::block_on(GpuContext::new()).ok()?;
    Some(Builder::new(gpu, wgpu::TextureFormat::Rgba8Unorm, max_textures))
}

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn test_geometry_info_keys_build_once() {
        let mut cache: ResourceCache<GeometryInfo, Arc<MeshData>> = ResourceCache::new("mesh data");
        let mut builds = 0;

        let infos = [
            GeometryInfo::new(DVec3::ZERO, Vec3::ONE),
            GeometryInfo::new(DVec3::ZERO, Vec3::ONE),
            GeometryInfo::new(DVec3::ZERO, Vec3::ONE).with_color(Vec4::new(0.0, 0.0, 1.0, 1.0)),
            GeometryInfo::new(DVec3::ZERO, Vec3::splat(2.0)),
        ];

        for info in &infos {
            cache.get_or_insert_with(info.clone(), |info| {
                builds += 1;
                Arc::new(MeshData::cuboid(info))
            });
        }

        assert_eq!(builds, 3);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_cuboid_winding_covers_every_vertex() {
        let mesh = MeshData::cuboid(&GeometryInfo::new(DVec3::ZERO, Vec3::new(1.0, 2.0, 3.0)));
        let mut used = vec![false; mesh.vertices.len()];
        for &index in &mesh.indices {
            used[index as usize] = true;
        }
        assert!(used.into_iter().all(|u| u));
    }

    #[test]
    fn test_quad_expansion_matches_indices() {
        let mesh = MeshData::quad(&GeometryInfo::new(DVec3::ZERO, Vec3::new(4.0, 3.0, 0.0)));
        let expanded = mesh.expanded();
        for (vertex, &index) in expanded.iter().zip(&mesh.indices) {
            assert_eq!(*vertex, mesh.vertices[index as usize]);
        }
    }

    #[test]
    fn test_placeholder_texture_per_color() {
        let white = color_image(Vec4::ONE);
        let black = color_image(Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_ne!(white, black);
        assert_eq!(white.get(0, 0), black.get(0, 0));
        assert_eq!(white.get(1, 1), black.get(1, 1));
    }

    #[test]
    fn test_builder_reuses_meshes_on_gpu() {
        // Skipped on machines without a GPU adapter
        let Some(mut builder) = gpu_builder(4) else {
            return;
        };
        builder.set_verbose(true);

        let info = GeometryInfo::new(DVec3::new(10.0, 0.0, 0.0), Vec3::ONE);
        let a = builder.create(Shape::Box, &info).unwrap();
        let b = builder.create(Shape::Sphere, &info).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        builder.geometry_type = GeometryType::Draw;
        let quad = builder.create(Shape::Quad, &info).unwrap();
        assert!(!quad.is_indexed());

        // Box and quad share the placeholder texture for the same colour
        assert!(Arc::ptr_eq(a.texture(), quad.texture()));
        assert_eq!(builder.allocated_textures(), 1);
        assert_eq!(builder.mesh_count(), 2);
        assert!(builder.compile().is_ok());
    }

    #[test]
    fn test_builder_rejects_empty_image() {
        let Some(mut builder) = gpu_builder(4) else {
            return;
        };
        let empty = Arc::new(Image::new(0, 0, Vec4::ONE));
        let result = builder.create_box(&GeometryInfo::default().with_image(empty));
        assert!(result.is_err());
        assert_eq!(builder.allocated_textures(), 0);
    }
}
