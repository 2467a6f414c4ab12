//! Cached construction of renderable primitives.
//!
//! The builder owns one graphics pipeline, a texture per distinct image (colour placeholders
//! are generated and shared per colour) and a mesh per distinct `GeometryInfo`. Asking twice
//! for the same primitive returns the same `Arc<Mesh>`.

pub mod geometry;
pub mod mesh;

use std::sync::Arc;

use anyhow::{bail, Result};
use glam::{DMat4, DVec3};
use log::{debug, info};
use wgpu::util::DeviceExt;

use crate::core::cache::ResourceCache;
use crate::core::gpu_context::GpuContext;

pub use geometry::{ColorKey, GeometryInfo, GeometryType, Image, Shape};
pub use mesh::{color_image, MeshData, Vertex};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Per-mesh uniform: projection and model-view, both computed in f64 on the CPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct TransformUniform {
    projection: [[f32; 4]; 4],
    model_view: [[f32; 4]; 4],
}

impl TransformUniform {
    fn new(projection: DMat4, model_view: DMat4) -> Self {
        Self {
            projection: projection.as_mat4().to_cols_array_2d(),
            model_view: model_view.as_mat4().to_cols_array_2d(),
        }
    }
}

/// Pipeline and the layouts every mesh binds against
struct PipelineState {
    pipeline: wgpu::RenderPipeline,
    transform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

/// Uploaded texture and its bind group
pub struct TextureBinding {
    image: Arc<Image>,
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl TextureBinding {
    pub fn image(&self) -> &Arc<Image> {
        &self.image
    }
}

/// GPU-resident primitive ready to draw
pub struct Mesh {
    origin: DVec3,
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    element_count: u32,
    transform_buffer: wgpu::Buffer,
    transform_bind_group: wgpu::BindGroup,
    texture: Arc<TextureBinding>,
    pipeline: Arc<PipelineState>,
}

impl Mesh {
    /// World position of the mesh's local origin
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    /// Vertices drawn, or indices when indexed
    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    pub fn texture(&self) -> &Arc<TextureBinding> {
        &self.texture
    }

    /// Write this frame's transform; `view` is the camera's world -> eye matrix
    pub fn update_transform(&self, queue: &wgpu::Queue, projection: DMat4, view: DMat4) {
        let model_view = view * DMat4::from_translation(self.origin);
        let uniform = TransformUniform::new(projection, model_view);
        queue.write_buffer(&self.transform_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline.pipeline);
        pass.set_bind_group(0, &self.transform_bind_group, &[]);
        pass.set_bind_group(1, &self.texture.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        match &self.index_buffer {
            Some(index_buffer) => {
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.element_count, 0, 0..1);
            }
            None => pass.draw(0..self.element_count, 0..1),
        }
    }
}

/// Cache key for meshes; quads also key on their draw path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MeshKey {
    Box(GeometryInfo),
    Quad(GeometryInfo, GeometryType),
}

/// Device objects shared by every mesh the builder creates
struct GpuResources {
    gpu: GpuContext,
    color_format: wgpu::TextureFormat,
    pipeline: Option<Arc<PipelineState>>,
    color_images: ResourceCache<ColorKey, Arc<Image>>,
    textures: ResourceCache<usize, Arc<TextureBinding>>,
    allocated_textures: u32,
    max_textures: u32,
    verbose: bool,
}

impl GpuResources {
    fn pipeline(&mut self) -> Arc<PipelineState> {
        if let Some(pipeline) = &self.pipeline {
            return pipeline.clone();
        }

        info!("Creating builder graphics pipeline ({:?})", self.color_format);
        let pipeline = Arc::new(create_pipeline(self.gpu.device(), self.color_format));
        self.pipeline = Some(pipeline.clone());
        pipeline
    }

    /// Texture for the info's image, or for a shared placeholder of its colour
    fn texture(&mut self, info: &GeometryInfo) -> Result<Arc<TextureBinding>> {
        let image = match &info.image {
            Some(image) => image.clone(),
            None => self
                .color_images
                .get_or_insert_with(ColorKey::from(info.color), |_| Arc::new(color_image(info.color))),
        };

        let pipeline = self.pipeline();
        let gpu = &self.gpu;
        let allocated = &mut self.allocated_textures;
        let max_textures = self.max_textures;

        self.textures.get_or_try_insert_with(Arc::as_ptr(&image) as usize, |_| {
            if *allocated >= max_textures {
                bail!("Texture budget of {} exhausted", max_textures);
            }
            let binding = upload_texture(gpu, &pipeline, image)?;
            *allocated += 1;
            Ok(Arc::new(binding))
        })
    }

    fn upload_mesh(&mut self, info: &GeometryInfo, data: &MeshData, geometry_type: GeometryType) -> Result<Mesh> {
        let texture = self.texture(info)?;
        let pipeline = self.pipeline();
        let device = self.gpu.device();

        let (vertex_buffer, index_buffer, element_count) = match geometry_type {
            GeometryType::DrawIndexed => {
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Builder Vertex Buffer"),
                    contents: bytemuck::cast_slice(&data.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Builder Index Buffer"),
                    contents: bytemuck::cast_slice(&data.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                (vertex_buffer, Some(index_buffer), data.indices.len() as u32)
            }
            GeometryType::Draw => {
                let expanded = data.expanded();
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Builder Expanded Vertex Buffer"),
                    contents: bytemuck::cast_slice(&expanded),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                (vertex_buffer, None, expanded.len() as u32)
            }
        };

        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Builder Transform Buffer"),
            contents: bytemuck::cast_slice(&[TransformUniform::new(DMat4::IDENTITY, DMat4::IDENTITY)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Builder Transform Bind Group"),
            layout: &pipeline.transform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        Ok(Mesh {
            origin: info.position,
            vertex_buffer,
            index_buffer,
            element_count,
            transform_buffer,
            transform_bind_group,
            texture,
            pipeline,
        })
    }

    /// Flush pending uploads and wait for the device
    fn compile(&self) -> Result<()> {
        if self.verbose {
            info!("Builder::compile, {} textures allocated", self.allocated_textures);
        }
        self.gpu.queue().submit(std::iter::empty::<wgpu::CommandBuffer>());
        self.gpu.wait_idle()
    }
}

/// Memoizing factory for meshes, textures and the shared pipeline
pub struct Builder {
    resources: GpuResources,
    meshes: ResourceCache<MeshKey, Arc<Mesh>>,
    /// Draw path for quads created from now on
    pub geometry_type: GeometryType,
}

impl Builder {
    /// `color_format` is the render target the pipeline draws into; at most `max_textures`
    /// distinct textures will be allocated
    pub fn new(gpu: GpuContext, color_format: wgpu::TextureFormat, max_textures: u32) -> Self {
        Self {
            resources: GpuResources {
                gpu,
                color_format,
                pipeline: None,
                color_images: ResourceCache::new("color image"),
                textures: ResourceCache::new("texture"),
                allocated_textures: 0,
                max_textures,
                verbose: false,
            },
            meshes: ResourceCache::new("mesh"),
            geometry_type: GeometryType::default(),
        }
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.resources.verbose = verbose;
    }

    pub fn verbose(&self) -> bool {
        self.resources.verbose
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.resources.gpu
    }

    pub fn allocated_textures(&self) -> u32 {
        self.resources.allocated_textures
    }

    pub fn max_textures(&self) -> u32 {
        self.resources.max_textures
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn has_pipeline(&self) -> bool {
        self.resources.pipeline.is_some()
    }

    pub fn compile(&self) -> Result<()> {
        self.resources.compile()
    }

    pub fn create(&mut self, shape: Shape, info: &GeometryInfo) -> Result<Arc<Mesh>> {
        match shape {
            Shape::Box => self.create_box(info),
            Shape::Quad => self.create_quad(info),
            Shape::Capsule => self.create_capsule(info),
            Shape::Cone => self.create_cone(info),
            Shape::Cylinder => self.create_cylinder(info),
            Shape::Sphere => self.create_sphere(info),
        }
    }

    /// Create each primitive in order; a failure only affects its own entry
    pub fn create_each(&mut self, items: &[(Shape, GeometryInfo)]) -> Vec<Result<Arc<Mesh>>> {
        items.iter().map(|(shape, info)| self.create(*shape, info)).collect()
    }

    pub fn create_box(&mut self, info: &GeometryInfo) -> Result<Arc<Mesh>> {
        let resources = &mut self.resources;
        self.meshes.get_or_try_insert_with(MeshKey::Box(info.clone()), |_| {
            let data = MeshData::cuboid(info);
            let mesh = resources.upload_mesh(info, &data, GeometryType::DrawIndexed)?;
            resources.compile()?;
            Ok(Arc::new(mesh))
        })
    }

    pub fn create_quad(&mut self, info: &GeometryInfo) -> Result<Arc<Mesh>> {
        let geometry_type = self.geometry_type;
        let resources = &mut self.resources;
        self.meshes.get_or_try_insert_with(MeshKey::Quad(info.clone(), geometry_type), |_| {
            let data = MeshData::quad(info);
            let mesh = resources.upload_mesh(info, &data, geometry_type)?;
            resources.compile()?;
            Ok(Arc::new(mesh))
        })
    }

    /// Not tessellated yet; builds a box
    pub fn create_capsule(&mut self, info: &GeometryInfo) -> Result<Arc<Mesh>> {
        debug!("capsule falls back to box");
        self.create_box(info)
    }

    /// Not tessellated yet; builds a box
    pub fn create_cone(&mut self, info: &GeometryInfo) -> Result<Arc<Mesh>> {
        debug!("cone falls back to box");
        self.create_box(info)
    }

    /// Not tessellated yet; builds a box
    pub fn create_cylinder(&mut self, info: &GeometryInfo) -> Result<Arc<Mesh>> {
        debug!("cylinder falls back to box");
        self.create_box(info)
    }

    /// Not tessellated yet; builds a box
    pub fn create_sphere(&mut self, info: &GeometryInfo) -> Result<Arc<Mesh>> {
        debug!("sphere falls back to box");
        self.create_box(info)
    }
}

fn upload_texture(gpu: &GpuContext, pipeline: &PipelineState, image: Arc<Image>) -> Result<TextureBinding> {
    if image.width() == 0 || image.height() == 0 {
        bail!("Cannot create a texture from an empty {}x{} image", image.width(), image.height());
    }

    let size = wgpu::Extent3d {
        width: image.width(),
        height: image.height(),
        depth_or_array_layers: 1,
    };

    let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("Builder Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba32Float,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    gpu.queue().write_texture(
        texture.as_image_copy(),
        image.as_bytes(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.bytes_per_row()),
            rows_per_image: Some(image.height()),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Builder Texture Bind Group"),
        layout: &pipeline.texture_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&pipeline.sampler),
            },
        ],
    });

    Ok(TextureBinding {
        image,
        _texture: texture,
        bind_group,
    })
}

fn create_pipeline(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> PipelineState {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Builder Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    });

    let transform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("builder_transform_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    // Rgba32Float is not filterable without an optional feature
    let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("builder_texture_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                count: None,
            },
        ],
    });

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Builder Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Builder Pipeline Layout"),
        bind_group_layouts: &[&transform_layout, &texture_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Builder Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    });

    PipelineState {
        pipeline,
        transform_layout,
        texture_layout,
        sampler,
    }
}
