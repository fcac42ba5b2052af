//! GPU context management using wgpu

use std::sync::Arc;
use winit::window::Window;
use crate::core::error::Error;

/// GPU rendering context for one window surface
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Create new GPU context from window
    pub async fn new(window: Arc<Window>) -> Result<Self, Error> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())
            .map_err(|e| Error::Gpu(e.to_string()))?;

        // A white canvas with one circle; the integrated GPU is plenty
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::Gpu(format!("No suitable adapter found: {:?}", e)))?;

        let device_desc = wgpu::DeviceDescriptor {
            label: Some("autoshade_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            experimental_features: Default::default(),
            trace: Default::default(),
        };

        let (device, queue) = adapter
            .request_device(&device_desc)
            .await
            .map_err(|e| Error::Gpu(e.to_string()))?;

        let size = window.inner_size();
        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| Error::Gpu("Surface reports no texture formats".into()))?;
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        log::info!("GPU: {} ({:?}), surface {}x{} {:?}",
            adapter.get_info().name, adapter.get_info().backend,
            config.width, config.height, config.format);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            config,
        })
    }

    /// Resize the surface. Zero sizes (minimised window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Configure the surface again with the current settings
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Get current surface texture for rendering
    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, Error> {
        self.surface
            .get_current_texture()
            .map_err(|e| Error::Gpu(e.to_string()))
    }

    /// Get surface size
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Get surface format
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }
}
