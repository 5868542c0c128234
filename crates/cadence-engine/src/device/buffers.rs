use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::render::{BufferStrategy, BufferUnavailable, Canvas};

use super::blit::Blit;
use super::surface::{self, SurfaceFault, SurfaceSize};
use super::GpuInit;

/// Window-backed `BufferStrategy`.
///
/// Frames are drawn into CPU canvases of a fixed size; `show` uploads the
/// back canvas and stretches it over the window's swapchain. The surface
/// owns an `Arc<Window>`, so the presenter can move to the simulation thread
/// while the platform thread keeps the window.
///
/// Invalidation maps onto the retry protocol:
/// - the window resized between `acquire` and `dispose`: contents restored
/// - the swapchain was lost, outdated or timed out: contents lost
/// - a zero-sized window: buffers unavailable
pub struct GpuBuffers {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    blit: Blit,
    window_size: SurfaceSize,
    canvases: Vec<Canvas>,
    back: usize,
    acquired_size: PhysicalSize<u32>,
    restored: bool,
    lost: bool,
}

impl GpuBuffers {
    /// Creates the device and swapchain for `window`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu; callers
    /// typically drive it with `pollster::block_on`.
    pub async fn new(
        window: Arc<Window>,
        init: GpuInit,
        canvas_size: (u32, u32),
        buffers: usize,
    ) -> Result<Self> {
        let size = window.inner_size();
        let window_size = SurfaceSize::new(size);

        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            power_preference,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
            smooth_scaling,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("cadence device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps.formats, prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = surface::choose_alpha_mode(&caps.alpha_modes, alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };
        if size.width > 0 && size.height > 0 {
            surface.configure(&device, &config);
        }

        let (width, height) = (canvas_size.0.max(1), canvas_size.1.max(1));
        let blit = Blit::new(&device, format, (width, height), smooth_scaling);
        let canvases = (0..buffers.max(1))
            .map(|_| Canvas::new(width, height))
            .collect();

        log::info!(
            "gpu presenter ready: adapter={}, format={format:?}, canvas={width}x{height}, buffers={}",
            adapter.get_info().name,
            buffers.max(1)
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            blit,
            window_size,
            canvases,
            back: 0,
            acquired_size: size,
            restored: false,
            lost: false,
        })
    }

    /// Handle the platform thread uses to report window resizes.
    pub fn window_size(&self) -> SurfaceSize {
        self.window_size.clone()
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn reconfigure(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        log::debug!("surface reconfigured to {}x{}", size.width, size.height);
    }
}

impl BufferStrategy for GpuBuffers {
    fn size(&self) -> (u32, u32) {
        self.canvases[self.back].size()
    }

    fn acquire(&mut self) -> Result<(), BufferUnavailable> {
        let size = self.window_size.get();
        if size.width == 0 || size.height == 0 {
            return Err(BufferUnavailable);
        }

        if (size.width, size.height) != (self.config.width, self.config.height) {
            self.reconfigure(size);
        }

        self.acquired_size = size;
        self.restored = false;
        self.lost = false;
        Ok(())
    }

    fn back_buffer(&self) -> &Canvas {
        &self.canvases[self.back]
    }

    fn back_buffer_mut(&mut self) -> &mut Canvas {
        &mut self.canvases[self.back]
    }

    fn dispose(&mut self) {
        if self.window_size.get() != self.acquired_size {
            self.restored = true;
        }
    }

    fn show(&mut self) -> Result<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                return match surface::classify(&err) {
                    SurfaceFault::Reconfigure => {
                        log::debug!("surface {err}; reconfiguring");
                        self.reconfigure(self.window_size.get());
                        self.lost = true;
                        Ok(())
                    }
                    SurfaceFault::Skip => {
                        log::debug!("surface {err}; frame dropped");
                        self.lost = true;
                        Ok(())
                    }
                    SurfaceFault::Fatal => {
                        log::error!("fatal surface error: {err}");
                        Err(anyhow!("fatal surface error: {err}"))
                    }
                };
            }
        };

        self.blit.upload(&self.queue, &self.canvases[self.back]);

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("cadence blit encoder"),
            });
        self.blit.draw(&mut encoder, &view);
        self.queue.submit(std::iter::once(encoder.finish()));

        let suboptimal = frame.suboptimal;
        frame.present();
        if suboptimal {
            self.reconfigure(self.window_size.get());
        }

        self.back = (self.back + 1) % self.canvases.len();
        Ok(())
    }

    fn contents_restored(&mut self) -> bool {
        self.restored
    }

    fn contents_lost(&mut self) -> bool {
        self.lost
    }
}
