use glam::{Vec2, Vec3, Vec4};

use super::geometry::{GeometryInfo, Image};

/// Interleaved vertex fed to the builder's pipeline
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4, 2 => Float32x2];

    pub fn new(position: Vec3, color: Vec4, tex_coord: Vec2) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
            tex_coord: tex_coord.to_array(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// CPU-side triangle list
///
/// Positions are relative to `GeometryInfo::position`. The GPU mesh keeps that origin in
/// `f64` and folds it into the model-view, so only the small local offsets are `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

const T00: Vec2 = Vec2::new(0.0, 0.0);
const T10: Vec2 = Vec2::new(1.0, 0.0);
const T11: Vec2 = Vec2::new(1.0, 1.0);
const T01: Vec2 = Vec2::new(0.0, 1.0);

impl MeshData {
    /// Axis-aligned box: 6 faces of 4 vertices each, white, every face mapping the full texture
    pub fn cuboid(info: &GeometryInfo) -> Self {
        let d = info.dimensions;
        let v000 = Vec3::ZERO;
        let v100 = Vec3::new(d.x, 0.0, 0.0);
        let v110 = Vec3::new(d.x, d.y, 0.0);
        let v010 = Vec3::new(0.0, d.y, 0.0);
        let v001 = Vec3::new(0.0, 0.0, d.z);
        let v101 = Vec3::new(d.x, 0.0, d.z);
        let v111 = d;
        let v011 = Vec3::new(0.0, d.y, d.z);

        let faces = [
            [v000, v100, v101, v001],
            [v100, v110, v111, v101],
            [v110, v010, v011, v111],
            [v010, v000, v001, v011],
            [v010, v110, v100, v000],
            [v001, v101, v111, v011],
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (face, corners) in faces.iter().enumerate() {
            let base = (face * 4) as u16;
            for (corner, tex_coord) in corners.iter().zip([T00, T10, T11, T01]) {
                vertices.push(Vertex::new(*corner, Vec4::ONE, tex_coord));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self { vertices, indices }
    }

    /// Quad in the xy plane with red, green, blue and white corners
    pub fn quad(info: &GeometryInfo) -> Self {
        let d = info.dimensions;
        let vertices = vec![
            Vertex::new(Vec3::ZERO, Vec4::new(1.0, 0.0, 0.0, 1.0), T00),
            Vertex::new(Vec3::new(d.x, 0.0, 0.0), Vec4::new(0.0, 1.0, 0.0, 1.0), T10),
            Vertex::new(Vec3::new(d.x, d.y, 0.0), Vec4::new(0.0, 0.0, 1.0, 1.0), T11),
            Vertex::new(Vec3::new(0.0, d.y, 0.0), Vec4::ONE, T01),
        ];

        Self {
            vertices,
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }

    /// One vertex per index, for drawing without an index buffer
    pub fn expanded(&self) -> Vec<Vertex> {
        self.indices
            .iter()
            .map(|&i| self.vertices[usize::from(i)])
            .collect()
    }
}

/// 2x2 placeholder texture tinted with `color`, with two marker texels so orientation is visible
pub fn color_image(color: Vec4) -> Image {
    let mut image = Image::new(2, 2, color);
    image.set(0, 0, Vec4::new(0.0, 1.0, 1.0, 1.0));
    image.set(1, 1, Vec4::new(0.0, 0.0, 1.0, 1.0));
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn test_cuboid_counts() {
        let mesh = MeshData::cuboid(&GeometryInfo::default());
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_cuboid_spans_dimensions() {
        let info = GeometryInfo::new(DVec3::new(100.0, 0.0, 0.0), Vec3::new(2.0, 3.0, 4.0));
        let mesh = MeshData::cuboid(&info);

        let max = mesh
            .vertices
            .iter()
            .fold(Vec3::splat(f32::MIN), |acc, v| acc.max(Vec3::from_array(v.position)));
        let min = mesh
            .vertices
            .iter()
            .fold(Vec3::splat(f32::MAX), |acc, v| acc.min(Vec3::from_array(v.position)));

        assert_eq!(min, Vec3::ZERO);
        assert_eq!(max, Vec3::new(2.0, 3.0, 4.0));
        assert!(mesh.vertices.iter().all(|v| v.color == [1.0; 4]));
    }

    #[test]
    fn test_cuboid_face_tex_coords() {
        let mesh = MeshData::cuboid(&GeometryInfo::default());
        for face in mesh.vertices.chunks(4) {
            let coords: Vec<[f32; 2]> = face.iter().map(|v| v.tex_coord).collect();
            assert_eq!(coords, vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        }
    }

    #[test]
    fn test_quad() {
        let mesh = MeshData::quad(&GeometryInfo::new(DVec3::ZERO, Vec3::new(2.0, 1.0, 0.0)));
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 3, 0]);
        assert_eq!(mesh.vertices[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mesh.vertices[2].position, [2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_expanded_quad() {
        let mesh = MeshData::quad(&GeometryInfo::default());
        let expanded = mesh.expanded();
        assert_eq!(expanded.len(), 6);
        assert_eq!(expanded[3], mesh.vertices[2]);
        assert_eq!(expanded[5], mesh.vertices[0]);
    }

    #[test]
    fn test_color_image_markers() {
        let color = Vec4::new(0.5, 0.25, 0.0, 1.0);
        let image = color_image(color);
        assert_eq!((image.width(), image.height()), (2, 2));
        assert_eq!(image.get(0, 0), Some(Vec4::new(0.0, 1.0, 1.0, 1.0)));
        assert_eq!(image.get(1, 1), Some(Vec4::new(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(image.get(1, 0), Some(color));
        assert_eq!(image.get(0, 1), Some(color));
    }

    #[test]
    fn test_vertex_layout_stride() {
        assert_eq!(Vertex::layout().array_stride, 36);
    }
}
