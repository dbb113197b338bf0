//! Pixel Typo - an interactive generative typography canvas
//!
//! Type text, watch it synthesize into pixel glyphs, then pull the pixels
//! apart: cells detach into physics particles, a pointer vortex warps the
//! composition, and snapshots play back as eased sequences.

mod app;
mod audio;
mod config;
mod field;
mod font;
mod glyph;
mod layout;
mod params;
mod persistence;
mod renderer;
mod sequencer;
mod simulation;
mod theme;

use app::App;
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use std::ffi::CString;
use std::num::NonZeroU32;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

fn main() {
    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut handler = AppHandler::new();
    event_loop.run_app(&mut handler).expect("Event loop failed");
}

struct AppHandler {
    state: Option<AppState>,
    modifiers: ModifiersState,
    mouse_position: (f64, f64),
    last_click_time: Option<Instant>,
    last_click_pos: Option<(f64, f64)>,
}

struct AppState {
    window: Window,
    gl_context: PossiblyCurrentContext,
    gl_surface: Surface<WindowSurface>,
    app: App,
}

impl AppHandler {
    fn new() -> Self {
        Self {
            state: None,
            modifiers: ModifiersState::default(),
            mouse_position: (0.0, 0.0),
            last_click_time: None,
            last_click_pos: None,
        }
    }
}

impl AppState {
    fn save_and_exit(&self, event_loop: &ActiveEventLoop) {
        self.app.save();
        let size = self.window.inner_size();
        let position = self
            .window
            .outer_position()
            .unwrap_or(PhysicalPosition::new(0, 0));
        let _ = persistence::save_window_state(persistence::WindowState {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        });
        event_loop.exit();
    }
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let (width, height) = persistence::load_window_state()
            .map(|s| (s.width as f64, s.height as f64))
            .unwrap_or((1100.0, 700.0));

        let window_attrs = WindowAttributes::default()
            .with_title("Pixel Typo")
            .with_inner_size(LogicalSize::new(width, height));

        // 4x MSAA keeps rotated cells and scaled particles crisp
        let config_template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_multisampling(4);

        let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attrs));

        let (window, gl_config) = display_builder
            .build(event_loop, config_template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .expect("No GL configs found")
            })
            .expect("Failed to create window");

        let window = window.expect("Window not created");
        let gl_display = gl_config.display();

        let context_attrs = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(None))
            .build(Some(
                window
                    .window_handle()
                    .expect("Failed to get window handle")
                    .as_raw(),
            ));

        let gl_context = unsafe {
            gl_display
                .create_context(&gl_config, &context_attrs)
                .expect("Failed to create GL context")
        };

        let size = window.inner_size();
        let surface_attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            window
                .window_handle()
                .expect("Failed to get window handle")
                .as_raw(),
            NonZeroU32::new(size.width.max(1)).unwrap(),
            NonZeroU32::new(size.height.max(1)).unwrap(),
        );

        let gl_surface = unsafe {
            gl_display
                .create_window_surface(&gl_config, &surface_attrs)
                .expect("Failed to create surface")
        };

        let gl_context = gl_context
            .make_current(&gl_surface)
            .expect("Failed to make context current");

        let renderer = unsafe {
            femtovg::renderer::OpenGl::new_from_function_cstr(|name| {
                let cstr = CString::new(name.to_bytes()).unwrap();
                gl_display.get_proc_address(&cstr) as *const _
            })
            .expect("Failed to create renderer")
        };

        let scale = window.scale_factor() as f32;
        let app = App::new(renderer, size.width as f32, size.height as f32, scale);

        self.state = Some(AppState {
            window,
            gl_context,
            gl_surface,
            app,
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(s) => s,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                state.save_and_exit(event_loop);
            }

            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    state.gl_surface.resize(
                        &state.gl_context,
                        NonZeroU32::new(size.width).unwrap(),
                        NonZeroU32::new(size.height).unwrap(),
                    );
                    let scale = state.window.scale_factor() as f32;
                    state
                        .app
                        .resize(size.width as f32, size.height as f32, scale);
                    state.window.request_redraw();
                }
            }

            WindowEvent::ModifiersChanged(mods) => {
                self.modifiers = mods.state();
                state.app.set_shift(self.modifiers.shift_key());
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    let ctrl = self.modifiers.control_key();
                    let alt = self.modifiers.alt_key();

                    let result = match &event.logical_key {
                        Key::Named(NamedKey::Escape) => {
                            state.save_and_exit(event_loop);
                            return;
                        }
                        Key::Named(NamedKey::Tab) => state.app.toggle_canvas_mode(),
                        Key::Named(NamedKey::Backspace) => state.app.handle_backspace(),
                        Key::Named(NamedKey::Enter) => state.app.handle_return(),
                        Key::Named(NamedKey::Space) => state.app.handle_char(' '),
                        Key::Named(NamedKey::Home) => state.app.return_particles(),
                        Key::Character(c) if ctrl => match c.as_str() {
                            "s" => {
                                state.app.save();
                                crate::app::AppResult::Ok
                            }
                            "a" => state.app.select_all(),
                            "e" => state.app.cycle_tool(),
                            "f" => state.app.toggle_field(),
                            "m" => state.app.toggle_interaction_mode(),
                            "r" => state.app.toggle_rainbow(),
                            "t" => state.app.toggle_theme(),
                            "d" => state.app.toggle_mic(),
                            "k" => state.app.capture_snapshot(),
                            "p" => state.app.toggle_sequence(),
                            "x" => state.app.delete_last_snapshot(),
                            "l" => state.app.cycle_align(),
                            "u" => state.app.cycle_valign(),
                            "0" => state.app.reset_canvas(),
                            "=" | "+" => state.app.adjust_cell_size(2.0),
                            "-" => state.app.adjust_cell_size(-2.0),
                            d if d.len() == 1 && d.chars().all(|c| c.is_ascii_digit()) => {
                                let index = d.parse::<usize>().unwrap_or(0);
                                if index > 0 {
                                    state.app.restore_snapshot(index - 1)
                                } else {
                                    crate::app::AppResult::Ok
                                }
                            }
                            _ => crate::app::AppResult::Ok,
                        },
                        Key::Character(c) => {
                            if !ctrl && !alt {
                                state.app.handle_char(c.chars().next().unwrap_or('\0'))
                            } else {
                                crate::app::AppResult::Ok
                            }
                        }
                        _ => crate::app::AppResult::Ok,
                    };

                    if result.needs_redraw() {
                        state.window.request_redraw();
                    }
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / 24.0) as f32,
                };

                let result = if self.modifiers.shift_key() {
                    state.app.adjust_line_spacing(steps * 0.25)
                } else {
                    state.app.adjust_cell_size(steps * 2.0)
                };
                if result.needs_redraw() {
                    state.window.request_redraw();
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_position = (position.x, position.y);
                if state
                    .app
                    .handle_mouse_move(self.mouse_position.0 as f32, self.mouse_position.1 as f32)
                    .needs_redraw()
                {
                    state.window.request_redraw();
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                if button == MouseButton::Left {
                    if button_state == ElementState::Pressed {
                        let now = Instant::now();
                        let mut is_double_click = false;

                        if let Some(last_time) = self.last_click_time {
                            if now.duration_since(last_time).as_millis() < 500 {
                                if let Some((last_x, last_y)) = self.last_click_pos {
                                    let dist = ((self.mouse_position.0 - last_x).powi(2)
                                        + (self.mouse_position.1 - last_y).powi(2))
                                    .sqrt();
                                    if dist < 5.0 {
                                        is_double_click = true;
                                    }
                                }
                            }
                        }

                        let result = if is_double_click {
                            // Double-click sends every particle home
                            let r = state.app.return_particles();
                            self.last_click_time = None;
                            r
                        } else {
                            let r = state.app.click_at(
                                self.mouse_position.0 as f32,
                                self.mouse_position.1 as f32,
                            );
                            self.last_click_time = Some(now);
                            self.last_click_pos = Some(self.mouse_position);
                            r
                        };

                        if result.needs_redraw() {
                            state.window.request_redraw();
                        }
                    } else {
                        state.app.end_drag();
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                state.app.render();
                state
                    .gl_surface
                    .swap_buffers(&state.gl_context)
                    .expect("Failed to swap buffers");
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            if state.app.tick().needs_redraw() {
                state.window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::Poll);
    }
}
