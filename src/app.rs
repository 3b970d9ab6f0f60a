//! Application shell: window, event loop and per-frame orchestration
//!
//! Frame order: UI panel first (it edits weights, lighting and the rotate
//! toggle), then camera movement, then the renderer. Keyboard input feeds
//! the camera only while egui does not claim the keyboard.

use winit::{
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::asset::TextureData;
use crate::error::{ViewerError, ViewerResult};
use crate::morph::MorphEngine;
use crate::renderer::{ModelTransform, Renderer};
use crate::scene::{Camera, CameraInput, Lighting};
use crate::ui::{UiLayer, UiState};
use crate::window::Window;

/// Top-level viewer settings.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Uniform scale applied to the model before the camera transforms.
    pub model_scale: f32,
    /// Start with the model slowly spinning around Y.
    pub auto_rotate: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "morphview".to_string(),
            width: 1280,
            height: 720,
            model_scale: 1.0,
            auto_rotate: false,
        }
    }
}

/// Open the window and run the viewer until the user closes it.
pub fn run(
    config: ViewerConfig,
    mut engine: MorphEngine,
    texture: Option<TextureData>,
) -> ViewerResult<()> {
    let event_loop =
        EventLoop::new().map_err(|e| ViewerError::EventLoopFailed(e.to_string()))?;
    let mut window = Window::new(&event_loop, &config.title, config.width, config.height)?;

    let transform = ModelTransform {
        scale: config.model_scale,
        ..Default::default()
    };
    let mut renderer = Renderer::new(window.window_arc(), &engine, texture.as_ref(), transform)?;
    renderer.auto_rotate = config.auto_rotate;

    let mut ui = UiLayer::new(&renderer, window.window());
    let mut camera = Camera::new(config.width as f32 / config.height as f32);
    let mut lighting = Lighting::default();
    let mut input = CameraInput::new();

    let target_names: Vec<String> = engine
        .deltas()
        .iter()
        .map(|d| d.name().to_string())
        .collect();

    log::info!("Viewer running with {} morph targets", target_names.len());

    event_loop
        .run(move |event, elwt: &EventLoopWindowTarget<()>| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => {
                    let consumed = ui.on_window_event(window.window(), &event);

                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(size) => {
                            window.set_dimensions(size.width, size.height);
                            renderer.resize(size.width, size.height);
                            camera.set_aspect(size.width as f32, size.height as f32);
                        }
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    physical_key: PhysicalKey::Code(code),
                                    state,
                                    ..
                                },
                            ..
                        } if !consumed => {
                            if ui.wants_keyboard_input() {
                                input = CameraInput::new();
                            } else {
                                handle_key(&mut input, code, state, elwt);
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            let mut auto_rotate = renderer.auto_rotate;
                            let mut state = UiState {
                                target_names: &target_names,
                                weights: engine.weights_mut(),
                                lighting: &mut lighting,
                                auto_rotate: &mut auto_rotate,
                            };
                            ui.run(window.window(), &mut state);
                            renderer.auto_rotate = auto_rotate;

                            camera.update(&input);
                            renderer.update();

                            match renderer.begin_frame() {
                                Ok(()) => {
                                    renderer.draw_scene(&camera, &lighting, engine.weights());
                                    ui.render(&mut renderer);
                                    renderer.end_frame();
                                }
                                Err(ViewerError::SurfaceLost) => {
                                    log::warn!("Surface lost, reconfiguring");
                                    renderer.recover_surface();
                                }
                                Err(ViewerError::OutOfMemory) => {
                                    log::error!("Out of GPU memory, exiting");
                                    elwt.exit();
                                }
                                Err(e) => log::warn!("Skipping frame: {}", e),
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => window.request_redraw(),
                _ => {}
            }
        })
        .map_err(|e| ViewerError::EventLoopFailed(e.to_string()))
}

fn handle_key(
    input: &mut CameraInput,
    code: KeyCode,
    state: ElementState,
    elwt: &EventLoopWindowTarget<()>,
) {
    let pressed = state == ElementState::Pressed;
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => input.forward = pressed,
        KeyCode::KeyS | KeyCode::ArrowDown => input.backward = pressed,
        KeyCode::KeyA | KeyCode::ArrowLeft => input.left = pressed,
        KeyCode::KeyD | KeyCode::ArrowRight => input.right = pressed,
        KeyCode::Escape if pressed => elwt.exit(),
        _ => {}
    }
}
