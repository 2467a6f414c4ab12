use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use wgpu::{Adapter, Device, DeviceDescriptor, Instance, Queue, Surface};

/// Shared GPU device and queue.
///
/// Cloning is cheap (Arc); the builder and the window renderer hold clones of the same context.
#[derive(Clone)]
pub struct GpuContext {
    instance: Arc<Instance>,
    adapter: Arc<Adapter>,
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl GpuContext {
    /// Headless context for offscreen work and tests
    pub async fn new() -> Result<Self> {
        let instance = Self::create_instance();
        let adapter = Self::request_adapter(&instance, None).await?;
        Self::from_adapter(instance, adapter).await
    }

    /// Context whose adapter can present to `surface`; the surface must come from `instance`
    pub async fn new_with_surface(instance: Instance, surface: &Surface<'_>) -> Result<Self> {
        let adapter = Self::request_adapter(&instance, Some(surface)).await?;
        Self::from_adapter(instance, adapter).await
    }

    pub fn create_instance() -> Instance {
        Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        })
    }

    async fn from_adapter(instance: Instance, adapter: Adapter) -> Result<Self> {
        let info = adapter.get_info();
        info!("Using GPU adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = Self::request_device(&adapter).await?;

        Ok(Self {
            instance: Arc::new(instance),
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Block until all submitted work has completed
    pub fn wait_idle(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| anyhow!("Device poll failed: {:?}", e))?;
        Ok(())
    }

    async fn request_adapter(instance: &Instance, surface: Option<&Surface<'_>>) -> Result<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find appropriate adapter")
    }

    async fn request_device(adapter: &Adapter) -> Result<(Device, Queue)> {
        debug!("Requesting device with downlevel limits");
        adapter
            .request_device(&DeviceDescriptor {
                label: Some("Globe View Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")
    }
}
