use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle, Thread};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};

use crate::input::{InputAggregator, InputQueue};
use crate::render::{BufferStrategy, Font, RenderSurface};
use crate::time::FrameClock;

use super::app::{App, AppControl};
use super::config::{LoopConfig, Timestep};
use super::state::{LoopState, LoopStateCell};

type ExitCallback = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable handle that asks a running loop to shut down.
///
/// Safe to use from any thread, including from inside the loop's own phases.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    state: LoopStateCell,
    sim_thread: Arc<OnceLock<Thread>>,
}

impl CloseHandle {
    /// Moves the loop to `ShuttingDown` and wakes it if it is pacing.
    ///
    /// The frame in progress completes; no further frame begins.
    pub fn request_close(&self) {
        if self.state.shut_down() == LoopState::Running {
            log::info!("application loop close requested");
        }
        if let Some(thread) = self.sim_thread.get() {
            thread.unpark();
        }
    }

    pub fn state(&self) -> LoopState {
        self.state.get()
    }
}

/// Owns the simulation thread and the application it drives.
///
/// `start` moves the application and the render surface onto a dedicated
/// thread which runs `process_input -> update_objects -> render` until a
/// close is requested. The thread owning the loop stays free to pump
/// platform events into the `InputQueue`.
pub struct ApplicationLoop<A: App> {
    config: LoopConfig,
    app: Option<A>,
    font: Option<Arc<Font>>,
    input: InputQueue,
    close: CloseHandle,
    on_exit: Option<ExitCallback>,
    handle: Option<JoinHandle<Result<()>>>,
}

impl<A: App> ApplicationLoop<A> {
    pub fn new(config: LoopConfig, app: A) -> Self {
        Self {
            config,
            app: Some(app),
            font: None,
            input: InputQueue::new(),
            close: CloseHandle {
                state: LoopStateCell::default(),
                sim_thread: Arc::new(OnceLock::new()),
            },
            on_exit: None,
            handle: None,
        }
    }

    /// Font installed on every canvas; without one the rate label is skipped.
    pub fn with_font(mut self, font: Option<Arc<Font>>) -> Self {
        self.font = font;
        self
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Producer handle for platform input.
    pub fn input_queue(&self) -> InputQueue {
        self.input.clone()
    }

    pub fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }

    pub fn state(&self) -> LoopState {
        self.close.state()
    }

    /// Runs on the simulation thread right before it exits, whatever the
    /// reason. Hosts use it to notice a loop that ended on its own.
    pub fn on_exit(&mut self, callback: impl FnOnce() + Send + 'static) {
        self.on_exit = Some(Box::new(callback));
    }

    /// Spawns the simulation thread. Fails unless the loop is `Stopped`.
    pub fn start<S>(&mut self, strategy: S) -> Result<()>
    where
        S: BufferStrategy + 'static,
    {
        self.close.state.start()?;

        let Some(app) = self.app.take() else {
            self.close.state.shut_down();
            return Err(anyhow!("application already consumed"));
        };

        let surface = RenderSurface::new(strategy)
            .with_background(self.config.background)
            .with_overlay(self.config.overlay.clone())
            .with_font(self.font.clone())
            .with_buffer_wait(self.config.buffer_wait);

        let mut clock = FrameClock::new();
        if let Some(max) = self.config.max_delta {
            clock = clock.with_max_delta(max);
        }

        let sim = Simulation {
            app,
            surface,
            input: InputAggregator::new(self.input.clone()),
            clock,
            timestep: self.config.timestep,
            accumulator: Duration::ZERO,
            pacing: self.config.pacing,
            close: self.close.clone(),
            frames: 0,
        };
        let on_exit = self.on_exit.take();

        let spawned = thread::Builder::new()
            .name("cadence-sim".to_string())
            .spawn(move || sim.run(on_exit));

        match spawned {
            Ok(handle) => {
                let cfg = &self.config;
                log::info!(
                    "application loop started: title={:?}, size={}x{}, pacing={:?}, timestep={:?}, buffers={}",
                    cfg.title,
                    cfg.width,
                    cfg.height,
                    cfg.pacing,
                    cfg.timestep,
                    cfg.buffers
                );
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.close.state.shut_down();
                Err(e).context("failed to spawn simulation thread")
            }
        }
    }

    pub fn request_close(&self) {
        self.close.request_close();
    }

    /// Requests a close and joins the simulation thread.
    ///
    /// Returns the error that ended the loop, if any; a panic on the
    /// simulation thread is reported as an error. Calling it again, or on a
    /// loop that never started, is a no-op.
    pub fn stop(&mut self) -> Result<()> {
        self.request_close();

        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        match handle.join() {
            Ok(result) => {
                log::info!("application loop joined");
                result
            }
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                log::error!("simulation thread panicked: {msg}");
                Err(anyhow!("simulation thread panicked: {msg}"))
            }
        }
    }

    /// `true` once the simulation thread has exited, or if it never ran.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

impl<A: App> Drop for ApplicationLoop<A> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.stop() {
                log::error!("application loop ended with error: {e:#}");
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Everything confined to the simulation thread.
struct Simulation<A: App, S: BufferStrategy> {
    app: A,
    surface: RenderSurface<S>,
    input: InputAggregator,
    clock: FrameClock,
    timestep: Timestep,
    accumulator: Duration,
    pacing: Duration,
    close: CloseHandle,
    frames: u64,
}

impl<A: App, S: BufferStrategy> Simulation<A, S> {
    fn run(mut self, on_exit: Option<ExitCallback>) -> Result<()> {
        let _ = self.close.sim_thread.set(thread::current());

        // A panicking phase still goes through shutdown; the panic is
        // re-raised afterwards so `stop()` reports it at join.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_frames()));
        match &outcome {
            Ok(Err(e)) => log::error!("application loop aborted: {e:#}"),
            Err(payload) => log::error!(
                "application loop aborted by panic: {}",
                panic_message(&**payload)
            ),
            Ok(Ok(())) => {}
        }

        self.close.state.shut_down();
        self.app.terminate();
        log::info!("simulation thread exiting after {} frames", self.frames);

        if let Some(callback) = on_exit {
            callback();
        }

        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn run_frames(&mut self) -> Result<()> {
        self.surface.initialize();
        self.app
            .initialize(self.surface.size())
            .context("application initialize failed")?;
        self.clock.reset();

        while self.close.state.is_running() {
            self.frame()?;
            self.frames += 1;
            pace(&self.close.state, self.pacing);
        }
        Ok(())
    }

    fn frame(&mut self) -> Result<()> {
        let time = self.clock.tick();

        let snapshot = self.input.process();
        if self.app.process_input(snapshot, time.dt)? == AppControl::Exit {
            log::info!("application requested exit");
            self.close.state.shut_down();
        }

        self.update(time.delta)?;

        let state = &self.close.state;
        let app = &mut self.app;
        self.surface
            .present(|| state.is_running(), |canvas| app.render(canvas))?;
        Ok(())
    }

    fn update(&mut self, delta: Duration) -> Result<()> {
        match self.timestep {
            Timestep::Variable => self.app.update_objects(delta.as_secs_f32()),
            Timestep::Fixed { step, .. } if step.is_zero() => {
                self.app.update_objects(delta.as_secs_f32())
            }
            Timestep::Fixed { step, max_steps } => {
                self.accumulator += delta;

                let mut steps = 0;
                while self.accumulator >= step && steps < max_steps {
                    self.app.update_objects(step.as_secs_f32())?;
                    self.accumulator -= step;
                    steps += 1;
                }

                if self.accumulator >= step {
                    log::debug!("dropping {:?} of simulation backlog", self.accumulator);
                    let rem = self.accumulator.as_nanos() % step.as_nanos();
                    self.accumulator = Duration::from_nanos(rem as u64);
                }
                Ok(())
            }
        }
    }
}

/// Sleeps for `pacing`, returning early once the loop stops running.
fn pace(state: &LoopStateCell, pacing: Duration) {
    let deadline = Instant::now() + pacing;
    while state.is_running() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::park_timeout(deadline - now);
    }
}
