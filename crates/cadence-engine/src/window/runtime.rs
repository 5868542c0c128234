use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

use crate::core::{App, ApplicationLoop, LoopConfig};
use crate::device::{GpuBuffers, GpuInit, SurfaceSize};
use crate::input::platform::forward_window_event;
use crate::input::InputQueue;
use crate::render::Font;

/// Events the simulation thread posts back to the platform loop.
#[derive(Debug, Clone, Copy)]
enum HostEvent {
    /// The simulation thread exited on its own.
    LoopExited,
}

/// Entry point for the windowed runtime.
pub struct Runtime;

impl Runtime {
    /// Opens a window and runs `app` on a simulation thread until the window
    /// closes or the application exits.
    ///
    /// Blocks the calling thread, which becomes the platform event thread.
    /// Returns the error that ended the application, if any.
    pub fn run<A: App>(config: LoopConfig, gpu_init: GpuInit, app: A) -> Result<()> {
        let event_loop = EventLoop::<HostEvent>::with_user_event()
            .build()
            .context("failed to create winit EventLoop")?;

        let font = Font::system().map(Arc::new);
        let app_loop = ApplicationLoop::new(config, app).with_font(font);
        let mut host = Host::new(app_loop, gpu_init, event_loop.create_proxy());

        event_loop
            .run_app(&mut host)
            .context("winit event loop terminated with error")?;

        host.finish()
    }
}

struct Host<A: App> {
    app_loop: ApplicationLoop<A>,
    gpu_init: GpuInit,
    proxy: EventLoopProxy<HostEvent>,
    input: InputQueue,

    window: Option<Arc<Window>>,
    window_size: Option<SurfaceSize>,
    outcome: Option<Result<()>>,
}

impl<A: App> Host<A> {
    fn new(app_loop: ApplicationLoop<A>, gpu_init: GpuInit, proxy: EventLoopProxy<HostEvent>) -> Self {
        let input = app_loop.input_queue();
        Self {
            app_loop,
            gpu_init,
            proxy,
            input,
            window: None,
            window_size: None,
            outcome: None,
        }
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let config = self.app_loop.config();
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height));
        let canvas_size = (config.width, config.height);
        let buffers = config.buffers;

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = pollster::block_on(GpuBuffers::new(
            window.clone(),
            self.gpu_init.clone(),
            canvas_size,
            buffers,
        ))
        .context("GPU initialization failed")?;

        self.window_size = Some(gpu.window_size());
        self.window = Some(window);

        let proxy = self.proxy.clone();
        self.app_loop.on_exit(move || {
            // The event loop may already be gone during shutdown.
            let _ = proxy.send_event(HostEvent::LoopExited);
        });
        self.app_loop.start(gpu)
    }

    /// Stops the simulation thread once and leaves the event loop.
    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        if self.outcome.is_none() {
            self.app_loop.request_close();
            let result = self.app_loop.stop();
            if let Err(e) = &result {
                log::error!("application loop ended with error: {e:#}");
            }
            self.outcome = Some(result);
        }
        event_loop.exit();
    }

    fn finish(mut self) -> Result<()> {
        match self.outcome.take() {
            Some(result) => result,
            None => self.app_loop.stop(),
        }
    }
}

impl<A: App> ApplicationHandler<HostEvent> for Host<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.outcome.is_some() {
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        if let Err(e) = self.open(event_loop) {
            log::error!("failed to start application: {e:#}");
            self.outcome = Some(Err(e));
            event_loop.exit();
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: HostEvent) {
        match event {
            HostEvent::LoopExited => {
                log::debug!("simulation thread exited; closing window");
                self.shut_down(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                log::info!("window close requested");
                self.shut_down(event_loop);
            }

            WindowEvent::Resized(size) => {
                if let Some(cell) = &self.window_size {
                    cell.set(*size);
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(cell), Some(window)) = (&self.window_size, &self.window) {
                    cell.set(window.inner_size());
                }
            }

            _ => {
                forward_window_event(&self.input, &event);
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.outcome.is_none() {
            self.app_loop.request_close();
        }
    }
}
