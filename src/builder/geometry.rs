use std::hash::{Hash, Hasher};
use std::sync::Arc;

use glam::{DVec3, Vec3, Vec4};

/// 2D RGBA image with 32-bit float channels, uploaded as `Rgba32Float`
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    texels: Vec<[f32; 4]>,
}

impl Image {
    /// Image with every texel set to `fill`
    pub fn new(width: u32, height: u32, fill: Vec4) -> Self {
        Self {
            width,
            height,
            texels: vec![fill.to_array(); (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Vec4> {
        self.index(x, y).map(|i| Vec4::from_array(self.texels[i]))
    }

    /// Returns false when (x, y) lies outside the image
    pub fn set(&mut self, x: u32, y: u32, value: Vec4) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.texels[i] = value.to_array();
                true
            }
            None => false,
        }
    }

    /// Row-major texel bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * std::mem::size_of::<[f32; 4]>() as u32
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y as usize) * (self.width as usize) + x as usize)
        } else {
            None
        }
    }
}

/// Draw path used for quads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GeometryType {
    /// Non-indexed draw over vertices expanded from the index list
    Draw,
    /// Indexed draw over the shared vertices
    #[default]
    DrawIndexed,
}

/// Primitive requested from the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Box,
    Quad,
    Capsule,
    Cone,
    Cylinder,
    Sphere,
}

/// Parameters of a primitive; equal parameters yield the same cached mesh.
///
/// Floats compare by bit pattern and the image by identity, so `-0.0` and `0.0` are
/// distinct keys and two equal-looking images are distinct textures.
#[derive(Debug, Clone)]
pub struct GeometryInfo {
    /// Corner of the primitive; other corners extend along +x, +y and +z
    pub position: DVec3,
    pub dimensions: Vec3,
    /// Colour of the placeholder texture when no image is given
    pub color: Vec4,
    pub image: Option<Arc<Image>>,
}

impl GeometryInfo {
    pub fn new(position: DVec3, dimensions: Vec3) -> Self {
        Self {
            position,
            dimensions,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn with_image(mut self, image: Arc<Image>) -> Self {
        self.image = Some(image);
        self
    }

    fn key(&self) -> ([u64; 3], [u32; 3], [u32; 4], Option<*const Image>) {
        (
            self.position.to_array().map(f64::to_bits),
            self.dimensions.to_array().map(f32::to_bits),
            self.color.to_array().map(f32::to_bits),
            self.image.as_ref().map(Arc::as_ptr),
        )
    }
}

impl Default for GeometryInfo {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            dimensions: Vec3::ONE,
            color: Vec4::ONE,
            image: None,
        }
    }
}

impl PartialEq for GeometryInfo {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for GeometryInfo {}

impl Hash for GeometryInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Hashable colour for keying placeholder textures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorKey([u32; 4]);

impl From<Vec4> for ColorKey {
    fn from(color: Vec4) -> Self {
        ColorKey(color.to_array().map(f32::to_bits))
    }
}
