use std::f64::consts::TAU;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use glam::{DVec3, Vec3, Vec4};
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use globe_view::builder::{Builder, GeometryInfo, Mesh, Shape, DEPTH_FORMAT};
use globe_view::cli::Cli;
use globe_view::config::ViewerConfig;
use globe_view::core::{Camera, GlobeTrackball, GpuContext, InputEvent, WinitInput};
use globe_view::frame::FrameClock;
use globe_view::math::{Ellipsoid, EllipsoidModel, Geodetic, LookAt, RenderArea};
use globe_view::traits::CameraController;

/// Spacing of marker boxes, in degrees on the globe and length units in flat mode
const MARKER_RING_DEGREES: f64 = 0.05;
const FLAT_MARKER_SPACING: f64 = 2_000.0;
const MARKER_SIZE: f32 = 400.0;

const MARKER_COLORS: [Vec4; 4] = [
    Vec4::new(1.0, 0.3, 0.3, 1.0),
    Vec4::new(0.3, 1.0, 0.3, 1.0),
    Vec4::new(0.3, 0.5, 1.0, 1.0),
    Vec4::new(1.0, 1.0, 0.4, 1.0),
];

const MARKER_SHAPES: [Shape; 6] = [
    Shape::Box,
    Shape::Quad,
    Shape::Capsule,
    Shape::Cone,
    Shape::Cylinder,
    Shape::Sphere,
];

/// Marker primitives scattered around the home location
fn marker_geometry(config: &ViewerConfig, ellipsoid: Option<&dyn EllipsoidModel>) -> Vec<(Shape, GeometryInfo)> {
    let [latitude, longitude, _] = config.home_location;
    let count = config.marker_count as usize;

    (0..count)
        .map(|i| {
            let angle = i as f64 / count.max(1) as f64 * TAU;
            let position = match ellipsoid {
                Some(ellipsoid) => ellipsoid.to_ecef(Geodetic::from_degrees(
                    latitude + MARKER_RING_DEGREES * angle.sin(),
                    longitude + MARKER_RING_DEGREES * angle.cos(),
                    0.0,
                )),
                None => DVec3::new(angle.cos(), angle.sin(), 0.0) * FLAT_MARKER_SPACING,
            };

            let info = GeometryInfo::new(position, Vec3::splat(MARKER_SIZE))
                .with_color(MARKER_COLORS[i % MARKER_COLORS.len()]);
            (MARKER_SHAPES[i % MARKER_SHAPES.len()], info)
        })
        .collect()
}

/// Starting look-at: straight down onto the home location, north up
fn home_look_at(config: &ViewerConfig, ellipsoid: Option<&dyn EllipsoidModel>) -> LookAt {
    let [latitude, longitude, altitude] = config.home_location;
    match ellipsoid {
        Some(ellipsoid) => {
            let eye = ellipsoid.to_ecef(Geodetic::from_degrees(latitude, longitude, altitude));
            let center = ellipsoid.to_ecef(Geodetic::from_degrees(latitude, longitude, 0.0));
            let north = ellipsoid.to_ecef(Geodetic::from_degrees(latitude + 0.01, longitude, 0.0));
            LookAt::new(eye, center, (north - center).normalize())
        }
        None => LookAt::new(DVec3::new(0.0, 0.0, altitude), DVec3::ZERO, DVec3::Y),
    }
}

// === Renderer ===

struct Renderer {
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    builder: Builder,
    markers: Vec<Arc<Mesh>>,
}

impl Renderer {
    async fn new(window: Arc<Window>, config: &ViewerConfig, verbose: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = GpuContext::create_instance();
        let surface = instance.create_surface(window)?;
        let gpu = GpuContext::new_with_surface(instance, &surface).await?;

        let surface_config = Self::create_surface_config(&surface, gpu.adapter(), size);
        surface.configure(gpu.device(), &surface_config);
        let depth_view = Self::create_depth_view(gpu.device(), size.width, size.height);

        let mut builder = Builder::new(gpu.clone(), surface_config.format, config.max_textures);
        builder.set_verbose(verbose);

        Ok(Self {
            gpu,
            surface,
            surface_config,
            depth_view,
            builder,
            markers: Vec::new(),
        })
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Build every marker it can; returns how many failed
    fn build_markers(&mut self, geometry: &[(Shape, GeometryInfo)]) -> usize {
        let mut failed = 0;
        let results = self.builder.create_each(geometry);
        for (index, ((shape, _), result)) in geometry.iter().zip(results).enumerate() {
            match result {
                Ok(mesh) => self.markers.push(mesh),
                Err(e) => {
                    warn!("Marker {} ({:?}) could not be built: {:#}", index, shape, e);
                    failed += 1;
                }
            }
        }
        info!(
            "Built {} markers ({} meshes, {} textures)",
            self.markers.len(),
            self.builder.mesh_count(),
            self.builder.allocated_textures()
        );
        failed
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(self.gpu.device(), &self.surface_config);
        self.depth_view = Self::create_depth_view(self.gpu.device(), width, height);
    }

    fn reconfigure(&mut self) {
        self.surface.configure(self.gpu.device(), &self.surface_config);
    }

    fn render(&self, camera: &Camera) -> std::result::Result<(), wgpu::SurfaceError> {
        let projection = camera.projection_matrix();
        let view = camera.view_matrix();
        for mesh in &self.markers {
            mesh.update_transform(self.gpu.queue(), projection, view);
        }

        let output = self.surface.get_current_texture()?;
        let output_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Globe Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Globe Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &output_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.03,
                            b: 0.08,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for mesh in &self.markers {
                mesh.draw(&mut render_pass);
            }
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

// === Application ===

struct App {
    config: ViewerConfig,
    verbose: bool,
    ellipsoid: Option<Arc<Ellipsoid>>,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    trackball: Option<GlobeTrackball>,
    input: WinitInput,
    clock: FrameClock,
}

impl App {
    fn new(config: ViewerConfig, verbose: bool) -> Self {
        let ellipsoid = (!config.flat).then(|| Arc::new(Ellipsoid::wgs84()));
        Self {
            config,
            verbose,
            ellipsoid,
            window: None,
            renderer: None,
            trackball: None,
            input: WinitInput::new(),
            clock: FrameClock::new(),
        }
    }

    fn ellipsoid_model(&self) -> Option<&dyn EllipsoidModel> {
        self.ellipsoid.as_deref().map(|e| e as &dyn EllipsoidModel)
    }

    fn create_trackball(&self, width: u32, height: u32) -> GlobeTrackball {
        let look_at = home_look_at(&self.config, self.ellipsoid_model());
        let camera = Camera::from_look_at(look_at, RenderArea::from_size(width, height));
        let ellipsoid = self
            .ellipsoid
            .clone()
            .map(|e| e as Arc<dyn EllipsoidModel>);
        GlobeTrackball::new(camera, ellipsoid, self.config.trackball)
    }

    fn dispatch(&mut self, mut event: InputEvent) {
        if let Some(trackball) = &mut self.trackball {
            event.dispatch(trackball);
        }
    }

    fn redraw(&mut self) {
        let frame = self.clock.tick();
        self.dispatch(InputEvent::Frame(frame));

        let (Some(renderer), Some(trackball)) = (&mut self.renderer, &self.trackball) else {
            return;
        };

        match renderer.render(trackball.camera()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(e) => error!("Render error: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Globe View")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.window_width,
                    self.config.window_height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let mut renderer = match pollster::block_on(Renderer::new(window.clone(), &self.config, self.verbose)) {
            Ok(renderer) => renderer,
            Err(e) => {
                error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let geometry = marker_geometry(&self.config, self.ellipsoid_model());
        let failed = renderer.build_markers(&geometry);
        if failed > 0 {
            warn!("{} of {} markers could not be built", failed, geometry.len());
        }

        let size = window.inner_size();
        self.trackball = Some(self.create_trackball(size.width, size.height));
        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
                if let Some(trackball) = &mut self.trackball {
                    trackball
                        .camera_mut()
                        .set_render_area(RenderArea::from_size(size.width, size.height));
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            other => {
                if let Some(input) = self.input.process_event(&other) {
                    self.dispatch(input);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, cli.verbose);

    println!(
        "Globe View - Left drag: rotate, middle drag: pan, right drag / wheel: zoom, {:?}: home, Escape to quit",
        app.config.trackball.home_key
    );
    event_loop.run_app(&mut app)?;

    Ok(())
}
