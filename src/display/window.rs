//! Window management using winit

use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window as WinitWindow, WindowAttributes, WindowId},
};

use crate::config::DisplayConfig;
use crate::core::error::Error;
use crate::core::time::TickTimer;
use crate::driver::ShadeLoop;
use crate::sensor::SensorFeed;
use super::{DisplaySurface, GpuContext, SpotFrame, SpotPipeline, SpotUniform};

/// Window configuration
#[derive(Clone, Debug)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::from(&DisplayConfig::default())
    }
}

impl From<&DisplayConfig> for WindowConfig {
    fn from(display: &DisplayConfig) -> Self {
        Self {
            title: display.title.clone(),
            width: display.width,
            height: display.height,
            fullscreen: display.fullscreen,
        }
    }
}

impl WindowConfig {
    pub fn attributes(&self) -> WindowAttributes {
        let attributes = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(self.width, self.height));
        if self.fullscreen {
            attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
        } else {
            attributes
        }
    }
}

/// A winit window drawn with the spot pipeline
pub struct ShadeWindow {
    window: Arc<WinitWindow>,
    gpu: GpuContext,
    pipeline: SpotPipeline,
    last_frame: Option<SpotFrame>,
}

impl ShadeWindow {
    pub fn new(window: Arc<WinitWindow>) -> Result<Self, Error> {
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;
        let pipeline = SpotPipeline::new(&gpu.device, gpu.format());
        Ok(Self {
            window,
            gpu,
            pipeline,
            last_frame: None,
        })
    }

    pub fn window(&self) -> &Arc<WinitWindow> {
        &self.window
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        log::debug!("Surface resized to {}x{}", width, height);
    }

    /// Draw the most recent frame again (blank before the first one)
    pub fn redraw(&mut self) -> Result<(), Error> {
        let uniform = match &self.last_frame {
            Some(frame) => SpotUniform::from_frame(frame, self.gpu.size()),
            None => SpotUniform::default(),
        };
        self.pipeline.update(&self.gpu.queue, &uniform);

        let output = match self.gpu.get_current_texture() {
            Ok(output) => output,
            Err(e) => {
                // Lost or outdated surface; the next frame gets a fresh one
                self.gpu.reconfigure();
                return Err(e);
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("spot_encoder"),
        });
        self.pipeline.render(&mut encoder, &view);
        self.gpu.queue.submit(std::iter::once(encoder.finish()));

        self.window.pre_present_notify();
        output.present();
        Ok(())
    }
}

impl DisplaySurface for ShadeWindow {
    fn dimensions(&self) -> (u32, u32) {
        self.gpu.size()
    }

    fn render(&mut self, frame: &SpotFrame) -> crate::core::Result<()> {
        self.last_frame = Some(*frame);
        self.redraw()
    }
}

/// Application handler driving a [`ShadeLoop`] on the tick period
struct App<F: SensorFeed> {
    config: WindowConfig,
    shade_loop: ShadeLoop<F>,
    timer: TickTimer,
    window: Option<ShadeWindow>,
    error: Option<Error>,
}

impl<F: SensorFeed> ApplicationHandler for App<F> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let created = event_loop
            .create_window(self.config.attributes())
            .map_err(|e| Error::Window(format!("Failed to create window: {}", e)))
            .and_then(|window| ShadeWindow::new(Arc::new(window)));

        match created {
            Ok(window) => {
                let (width, height) = window.dimensions();
                log::info!("Window created: {}x{}", width, height);
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("{}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(window) = &mut self.window {
                    window.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(window) = &mut self.window {
                    if let Err(e) = window.redraw() {
                        log::warn!("Redraw failed: {}", e);
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &mut self.window {
            if self.timer.poll(Instant::now()) {
                self.shade_loop.step(window);
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.timer.next_deadline()));
    }
}

/// Creates an event loop and runs `shade_loop` in a window until it is
/// closed or Escape is pressed.
pub fn run<F: SensorFeed>(config: WindowConfig, shade_loop: ShadeLoop<F>, timer: TickTimer) -> Result<(), Error> {
    let event_loop = EventLoop::new()
        .map_err(|e| Error::Window(format!("Failed to create event loop: {}", e)))?;

    event_loop.set_control_flow(ControlFlow::WaitUntil(timer.next_deadline()));

    let mut app = App {
        config,
        shade_loop,
        timer,
        window: None,
        error: None,
    };

    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Window(format!("Event loop error: {}", e)))?;

    let stats = app.timer.stats();
    log::info!(
        "Stopped after {} ticks (avg interval {:.1} ms, max {:.1} ms)",
        app.timer.tick_count(),
        stats.avg_interval_ms,
        stats.max_interval_ms
    );

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
