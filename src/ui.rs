//! egui slider panel
//!
//! Bridges winit events into egui and draws the control panel: one weight
//! slider per morph target, the lighting scalars and the auto-rotate
//! toggle. The panel writes straight into the state the renderer reads, so
//! there is no separate synchronization step.

use egui::ViewportId;
use egui_wgpu::ScreenDescriptor;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::renderer::Renderer;
use crate::scene::Lighting;

/// Mutable viewer state the panel edits in place.
pub struct UiState<'a> {
    pub target_names: &'a [String],
    pub weights: &'a mut [f32],
    pub lighting: &'a mut Lighting,
    pub auto_rotate: &'a mut bool,
}

pub struct UiLayer {
    ctx: egui::Context,
    winit_state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    paint_jobs: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
}

impl UiLayer {
    pub fn new(renderer: &Renderer, window: &Window) -> Self {
        let ctx = egui::Context::default();

        let winit_state = egui_winit::State::new(
            ctx.clone(),
            ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
        );

        let egui_renderer =
            egui_wgpu::Renderer::new(renderer.device(), renderer.surface_format(), None, 1);

        Self {
            ctx,
            winit_state,
            renderer: egui_renderer,
            paint_jobs: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
        }
    }

    /// Feed a winit event to egui. Returns true when egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    /// Whether typing should go to egui instead of camera movement.
    pub fn wants_keyboard_input(&self) -> bool {
        self.ctx.wants_keyboard_input()
    }

    /// Run one UI frame: gather input, lay out the panel, tessellate.
    pub fn run(&mut self, window: &Window, state: &mut UiState<'_>) {
        let raw_input = self.winit_state.take_egui_input(window);
        self.ctx.begin_frame(raw_input);

        egui::Window::new("Blendshapes")
            .default_width(260.0)
            .show(&self.ctx, |ui| {
                if state.weights.is_empty() {
                    ui.label("No morph targets loaded");
                }
                for (weight, name) in state.weights.iter_mut().zip(state.target_names) {
                    ui.add(egui::Slider::new(weight, 0.0..=1.0).text(name));
                }

                ui.separator();
                ui.heading("Lighting");
                ui.add(
                    egui::Slider::new(&mut state.lighting.ambient, 0.0..=1.0).text("Ambient"),
                );
                ui.add(
                    egui::Slider::new(&mut state.lighting.diffuse, 0.0..=1.0).text("Diffuse"),
                );
                ui.add(
                    egui::Slider::new(&mut state.lighting.specular, 0.0..=1.0).text("Specular"),
                );
                ui.add(
                    egui::Slider::new(&mut state.lighting.shininess, 1.0..=128.0)
                        .text("Shininess"),
                );

                ui.separator();
                ui.checkbox(state.auto_rotate, "Auto-rotate");
                ui.label("WASD moves the camera");
            });

        let full_output = self.ctx.end_frame();
        self.winit_state
            .handle_platform_output(window, full_output.platform_output);

        self.paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        self.textures_delta = full_output.textures_delta;
    }

    /// Upload egui buffers and paint the panel over the current frame.
    pub fn render(&mut self, renderer: &mut Renderer) {
        let (width, height) = renderer.surface_size();
        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: self.ctx.pixels_per_point(),
        };

        let (device, queue, encoder) = renderer.device_queue_encoder();

        for (id, image_delta) in &self.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        if let Some(encoder) = encoder {
            self.renderer.update_buffers(
                device,
                queue,
                encoder,
                &self.paint_jobs,
                &screen_descriptor,
            );
        }

        renderer.render_egui(&self.renderer, &self.paint_jobs, &screen_descriptor);

        for id in &self.textures_delta.free {
            self.renderer.free_texture(id);
        }
        self.textures_delta = egui::TexturesDelta::default();
    }
}
