use std::collections::HashSet;
use std::error::Error;
use std::time::{Duration, Instant};

use pixels::{PixelsBuilder, SurfaceTexture};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::clock::FrameClock;
use crate::graphics::Renderer2d;
use crate::pixels_renderer::PixelsPresenter;
use crate::surface::{Surface, SurfaceSize};

pub struct AppConfig {
    pub title: String,
    pub desired_size: PhysicalSize<u32>,
    pub clamp_to_monitor: bool,
    pub vsync: bool,
    /// Upper bound on the `dt` handed to [`GameApp::update`].
    pub max_step: Duration,
}

pub struct AppContext {
    pub window: Window,
    pub presenter: PixelsPresenter,
}

impl AppContext {
    pub fn surface_size(&self) -> SurfaceSize {
        self.presenter.size()
    }
}

/// Keyboard state for one redraw.
///
/// `keys_pressed` only holds down-edges: OS auto-repeat "Pressed" events for a key that is
/// already held do not show up again until it is released.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub keys_down: HashSet<VirtualKeyCode>,
    pub keys_pressed: HashSet<VirtualKeyCode>,
    pub keys_released: HashSet<VirtualKeyCode>,
    pub resized: Option<SurfaceSize>,
}

impl InputFrame {
    pub fn on_key(&mut self, key: VirtualKeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.keys_down.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => {
                if self.keys_down.remove(&key) {
                    self.keys_released.insert(key);
                }
            }
        }
    }

    pub fn was_pressed(&self, key: VirtualKeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Clears the per-frame edge sets; held keys stay held.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.resized = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppFlow {
    Continue,
    Exit,
}

pub trait GameApp {
    type State;

    fn init_state(&mut self, ctx: &mut AppContext) -> Self::State;

    fn update(
        &mut self,
        state: &mut Self::State,
        input: &InputFrame,
        dt: Duration,
        now: Instant,
        ctx: &mut AppContext,
    ) -> AppFlow;

    fn render(&mut self, state: &Self::State, renderer: &mut dyn Renderer2d);

    fn on_exit(&mut self, _state: &mut Self::State) {}
}

pub fn run_game<G: GameApp + 'static>(
    config: AppConfig,
    mut game: G,
) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new();
    let monitor_size = if config.clamp_to_monitor {
        event_loop.primary_monitor().map(|m| m.size())
    } else {
        None
    };
    let initial_size = match monitor_size {
        Some(monitor) => PhysicalSize::new(
            config.desired_size.width.min(monitor.width),
            config.desired_size.height.min(monitor.height),
        ),
        None => config.desired_size,
    };
    let window = WindowBuilder::new()
        .with_title(config.title)
        .with_inner_size(initial_size)
        .build(&event_loop)?;

    let window_size = window.inner_size();
    let surface_size = SurfaceSize::new(window_size.width.max(1), window_size.height.max(1));
    let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, &window);
    let pixels = PixelsBuilder::new(surface_size.width, surface_size.height, surface_texture)
        .enable_vsync(config.vsync)
        .build()?;
    let presenter = PixelsPresenter::new(pixels, surface_size)?;

    let mut ctx = AppContext { window, presenter };
    let mut state = game.init_state(&mut ctx);
    let mut input = InputFrame::default();
    let mut clock = FrameClock::new(config.max_step);
    let mut exited = false;

    log::info!(
        "window ready at {}x{}",
        surface_size.width,
        surface_size.height
    );

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    let new_size = SurfaceSize::new(size.width, size.height);
                    if let Err(err) = ctx.presenter.resize(new_size) {
                        log::warn!("resize failed: {err}");
                    }
                    input.resized = Some(new_size);
                    ctx.window.request_redraw();
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: key_state,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => {
                    input.on_key(key, key_state);
                }
                WindowEvent::Focused(false) => {
                    // Releases are lost while unfocused; don't leave keys stuck down.
                    input.keys_down.clear();
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                let now = Instant::now();
                let dt = clock.tick(now);

                let flow = game.update(&mut state, &input, dt, now, &mut ctx);
                ctx.presenter.draw_frame(|gfx| game.render(&state, gfx));
                if let Err(err) = ctx.presenter.present() {
                    log::warn!("present failed: {err}");
                }
                input.end_frame();

                if flow == AppFlow::Exit {
                    *control_flow = ControlFlow::Exit;
                }
            }
            Event::MainEventsCleared => {
                ctx.window.request_redraw();
            }
            Event::LoopDestroyed => {
                if !exited {
                    exited = true;
                    game.on_exit(&mut state);
                }
            }
            _ => {}
        }
    });
}
