//! wgpu frame renderer
//!
//! Owns the surface, device, pipeline and all GPU buffers for the morphing
//! mesh. The base mesh rides in three vertex buffers (positions, normals,
//! texcoords); morph deltas ride in two storage buffers with every target
//! concatenated, and the vertex shader recombines them against the weight
//! vector uploaded in the scene uniform each frame.
//!
//! Frame protocol: `begin_frame`, `draw_scene`, optionally `render_egui`,
//! `end_frame`. The command encoder lives inside the renderer between the
//! begin and end calls.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};
use wgpu::util::DeviceExt;

use crate::asset::TextureData;
use crate::error::{ViewerError, ViewerResult};
use crate::morph::MorphEngine;
use crate::scene::{Camera, Lighting};

/// Capacity of the weight array in the scene uniform. Targets beyond this
/// are loaded but never blended.
pub const MAX_BLENDSHAPES: usize = 16;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.08,
    g: 0.08,
    b: 0.1,
    a: 1.0,
};

/// Per-frame shader inputs. Layout mirrors `SceneUniform` in morph.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SceneUniform {
    m2w: Mat4,
    w2v: Mat4,
    persp: Mat4,
    eyepos: Vec4,
    light: Vec4,
    /// x = ambient, y = diffuse, z = specular, w = shininess
    shading: Vec4,
    /// x = has_texture, y = has_normals, z = target_count, w = vertex_count
    flags: [u32; 4],
    /// Target weights, packed four per vec4.
    weights: [[f32; 4]; 4],
}

/// Static model placement applied before the camera transforms.
#[derive(Debug, Clone, Copy)]
pub struct ModelTransform {
    pub scale: f32,
    /// Rotation advance around Y per frame while auto-rotate is on.
    pub rotation_step: f32,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_step: 1.0f32.to_radians(),
        }
    }
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,

    pipeline: wgpu::RenderPipeline,
    scene_bind_group: wgpu::BindGroup,
    delta_bind_group: wgpu::BindGroup,
    scene_uniform_buffer: wgpu::Buffer,

    position_buffer: wgpu::Buffer,
    normal_buffer: wgpu::Buffer,
    texcoord_buffer: wgpu::Buffer,

    depth_view: wgpu::TextureView,

    vertex_count: u32,
    blended_target_count: u32,
    has_texture: bool,
    has_normals: bool,

    transform: ModelTransform,
    rotation: f32,
    pub auto_rotate: bool,

    // In-flight frame state, populated between begin_frame and end_frame.
    current_texture: Option<wgpu::SurfaceTexture>,
    current_view: Option<wgpu::TextureView>,
    encoder: Option<wgpu::CommandEncoder>,
}

impl Renderer {
    /// Synchronous wrapper around [`Renderer::new_async`].
    pub fn new(
        window: Arc<winit::window::Window>,
        engine: &MorphEngine,
        texture: Option<&TextureData>,
        transform: ModelTransform,
    ) -> ViewerResult<Self> {
        pollster::block_on(Self::new_async(window, engine, texture, transform))
    }

    pub async fn new_async(
        window: Arc<winit::window::Window>,
        engine: &MorphEngine,
        texture: Option<&TextureData>,
        transform: ModelTransform,
    ) -> ViewerResult<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| ViewerError::SurfaceCreationFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ViewerError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?} backend)",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|e| ViewerError::DeviceCreationFailed(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let max_size = device.limits().max_texture_dimension_2d;
        let (width, height) = clamp_surface_size(size.width, size.height, max_size);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, width, height);

        // Base mesh vertex streams. Absent attributes get zero-filled
        // buffers so the pipeline layout never changes.
        let buffers = engine.render_buffers();
        let vertex_count = buffers.positions.len() as u32;

        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Positions"),
            contents: bytemuck::cast_slice(buffers.positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let normal_data: Vec<Vec3> = match buffers.normals {
            Some(normals) => normals.to_vec(),
            None => vec![Vec3::ZERO; vertex_count as usize],
        };
        let normal_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Normals"),
            contents: bytemuck::cast_slice(&normal_data),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let texcoord_data: Vec<Vec2> = match buffers.texcoords {
            Some(texcoords) => texcoords.to_vec(),
            None => vec![Vec2::ZERO; vertex_count as usize],
        };
        let texcoord_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Texcoords"),
            contents: bytemuck::cast_slice(&texcoord_data),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Concatenated delta storage. Targets past the uniform capacity
        // stay resident but are excluded from the blend loop.
        let target_count = engine.target_count();
        let blended_target_count = if target_count > MAX_BLENDSHAPES {
            log::warn!(
                "{} morph targets exceed the blend capacity of {}, extra targets are ignored",
                target_count,
                MAX_BLENDSHAPES
            );
            MAX_BLENDSHAPES as u32
        } else {
            target_count as u32
        };

        let (delta_positions, delta_normals) =
            concat_deltas(engine, blended_target_count as usize);

        let delta_position_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Delta Positions"),
                contents: bytemuck::cast_slice(&delta_positions),
                usage: wgpu::BufferUsages::STORAGE,
            });
        let delta_normal_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Delta Normals"),
                contents: bytemuck::cast_slice(&delta_normals),
                usage: wgpu::BufferUsages::STORAGE,
            });

        let scene_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Texture upload, falling back to a 1x1 white pixel.
        let has_texture = texture.is_some();
        let white = TextureData::white();
        let tex_data = texture.unwrap_or(&white);
        let gpu_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(tex_data.name.as_str()),
            size: wgpu::Extent3d {
                width: tex_data.width,
                height: tex_data.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &gpu_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &tex_data.data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(tex_data.width * 4),
                rows_per_image: Some(tex_data.height),
            },
            wgpu::Extent3d {
                width: tex_data.width,
                height: tex_data.height,
                depth_or_array_layers: 1,
            },
        );
        let texture_view = gpu_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Base Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // Bind group 0: scene uniform + texture. Bind group 1: deltas.
        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let delta_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Delta Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: scene_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        let delta_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Delta Bind Group"),
            layout: &delta_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: delta_position_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: delta_normal_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Morph Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/morph.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Morph Pipeline Layout"),
            bind_group_layouts: &[&scene_layout, &delta_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Morph Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: 12,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        }],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: 12,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 1,
                        }],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: 8,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 0,
                            shader_location: 2,
                        }],
                    },
                ],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            pipeline,
            scene_bind_group,
            delta_bind_group,
            scene_uniform_buffer,
            position_buffer,
            normal_buffer,
            texcoord_buffer,
            depth_view,
            vertex_count,
            blended_target_count,
            has_texture,
            has_normals: buffers.normals.is_some(),
            transform,
            rotation: 0.0,
            auto_rotate: transform.rotation_step != 0.0,
            current_texture: None,
            current_view: None,
            encoder: None,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let max_size = self.device.limits().max_texture_dimension_2d;
        let (width, height) = clamp_surface_size(width, height, max_size);
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    /// Reconfigure the surface at its current size after a lost surface.
    pub fn recover_surface(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Advance per-frame model animation.
    pub fn update(&mut self) {
        if self.auto_rotate {
            self.rotation =
                (self.rotation + self.transform.rotation_step) % std::f32::consts::TAU;
        }
    }

    pub fn begin_frame(&mut self) -> ViewerResult<()> {
        let output = self.surface.get_current_texture().map_err(|e| match e {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => ViewerError::SurfaceLost,
            wgpu::SurfaceError::OutOfMemory => ViewerError::OutOfMemory,
            other => ViewerError::AcquireImageFailed(other.to_string()),
        })?;

        self.current_view = Some(
            output
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
        );
        self.current_texture = Some(output);
        self.encoder = Some(
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                }),
        );
        Ok(())
    }

    /// Record the scene pass: clear, bind everything, one draw call.
    pub fn draw_scene(&mut self, camera: &Camera, lighting: &Lighting, weights: &[f32]) {
        let uniform = self.scene_uniform(camera, lighting, weights);
        self.queue
            .write_buffer(&self.scene_uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        let (Some(view), Some(encoder)) = (self.current_view.as_ref(), self.encoder.as_mut())
        else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.scene_bind_group, &[]);
        pass.set_bind_group(1, &self.delta_bind_group, &[]);
        pass.set_vertex_buffer(0, self.position_buffer.slice(..));
        pass.set_vertex_buffer(1, self.normal_buffer.slice(..));
        pass.set_vertex_buffer(2, self.texcoord_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }

    /// Paint egui over the scene in a second pass that preserves content.
    pub fn render_egui(
        &mut self,
        renderer: &egui_wgpu::Renderer,
        paint_jobs: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        let (Some(view), Some(encoder)) = (self.current_view.as_ref(), self.encoder.as_mut())
        else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("egui Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        renderer.render(&mut pass, paint_jobs, screen_descriptor);
    }

    /// Device, queue and frame encoder together, for callers that need all
    /// three at once without fighting the borrow checker.
    pub fn device_queue_encoder(
        &mut self,
    ) -> (&wgpu::Device, &wgpu::Queue, Option<&mut wgpu::CommandEncoder>) {
        (&self.device, &self.queue, self.encoder.as_mut())
    }

    pub fn end_frame(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.queue.submit(std::iter::once(encoder.finish()));
        }
        self.current_view = None;
        if let Some(texture) = self.current_texture.take() {
            texture.present();
        }
    }

    fn scene_uniform(&self, camera: &Camera, lighting: &Lighting, weights: &[f32]) -> SceneUniform {
        let m2w = Mat4::from_rotation_y(self.rotation)
            * Mat4::from_scale(Vec3::splat(self.transform.scale));

        SceneUniform {
            m2w,
            w2v: camera.view_matrix(),
            persp: camera.projection_matrix(),
            eyepos: camera.position.extend(1.0),
            light: lighting.light_direction().extend(0.0),
            shading: Vec4::new(
                lighting.ambient,
                lighting.diffuse,
                lighting.specular,
                lighting.shininess,
            ),
            flags: [
                self.has_texture as u32,
                self.has_normals as u32,
                self.blended_target_count.min(weights.len() as u32),
                self.vertex_count,
            ],
            weights: pack_weights(weights),
        }
    }
}

/// Clamp to the device texture limit while maintaining aspect ratio.
fn clamp_surface_size(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    if width > max_size || height > max_size {
        let scale = (max_size as f32 / width as f32).min(max_size as f32 / height as f32);
        (
            ((width as f32 * scale) as u32).max(1),
            ((height as f32 * scale) as u32).max(1),
        )
    } else {
        (width.max(1), height.max(1))
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Buffer"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Concatenate delta streams into tightly packed f32 arrays: component c of
/// vertex i in target k lands at `3 * (k * vertex_count + i) + c`.
fn concat_deltas(engine: &MorphEngine, target_count: usize) -> (Vec<f32>, Vec<f32>) {
    let vertex_count = engine.base().vertex_count();
    let floats = (target_count * vertex_count * 3).max(3);

    let mut positions = Vec::with_capacity(floats);
    let mut normals = Vec::with_capacity(floats);
    for delta in engine.deltas().iter().take(target_count) {
        for d in delta.positions() {
            positions.extend_from_slice(&d.to_array());
        }
        for d in delta.normals() {
            normals.extend_from_slice(&d.to_array());
        }
    }

    // Storage bindings reject empty buffers, keep a zeroed placeholder.
    if positions.is_empty() {
        positions.resize(3, 0.0);
        normals.resize(3, 0.0);
    }
    (positions, normals)
}

fn pack_weights(weights: &[f32]) -> [[f32; 4]; 4] {
    let mut packed = [[0.0f32; 4]; 4];
    for (k, &w) in weights.iter().take(MAX_BLENDSHAPES).enumerate() {
        packed[k / 4][k % 4] = w;
    }
    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshAsset;

    #[test]
    fn test_scene_uniform_layout_size() {
        // Three mat4, three vec4, one uvec4, four weight vec4s.
        assert_eq!(std::mem::size_of::<SceneUniform>(), 320);
    }

    #[test]
    fn test_pack_weights_row_major_quads() {
        let weights: Vec<f32> = (0..6).map(|i| i as f32).collect();
        let packed = pack_weights(&weights);
        assert_eq!(packed[0], [0.0, 1.0, 2.0, 3.0]);
        assert_eq!(packed[1][0], 4.0);
        assert_eq!(packed[1][1], 5.0);
        assert_eq!(packed[1][2], 0.0);
    }

    #[test]
    fn test_pack_weights_drops_excess() {
        let weights = vec![1.0f32; MAX_BLENDSHAPES + 4];
        let packed = pack_weights(&weights);
        let total: f32 = packed.iter().flatten().sum();
        assert_eq!(total, MAX_BLENDSHAPES as f32);
    }

    #[test]
    fn test_clamp_surface_size_preserves_aspect() {
        let (w, h) = clamp_surface_size(16384, 8192, 8192);
        assert_eq!((w, h), (8192, 4096));
        assert_eq!(clamp_surface_size(800, 600, 8192), (800, 600));
        assert_eq!(clamp_surface_size(0, 600, 8192), (1, 600));
    }

    #[test]
    fn test_concat_deltas_layout() {
        let base = MeshAsset::new(
            "base",
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            None,
            None,
        )
        .unwrap();
        let t0 = MeshAsset::new(
            "t0",
            vec![Vec3::splat(1.0), Vec3::X + Vec3::splat(1.0), Vec3::Y + Vec3::splat(1.0)],
            None,
            None,
        )
        .unwrap();
        let t1 = MeshAsset::new(
            "t1",
            vec![Vec3::splat(2.0), Vec3::X + Vec3::splat(2.0), Vec3::Y + Vec3::splat(2.0)],
            None,
            None,
        )
        .unwrap();

        let engine = MorphEngine::new(base, &[t0, t1]).unwrap();
        let (positions, normals) = concat_deltas(&engine, 2);

        assert_eq!(positions.len(), 2 * 3 * 3);
        assert_eq!(normals.len(), 2 * 3 * 3);
        // Vertex 1 of target 1 starts at 3 * (1 * 3 + 1).
        let at = 3 * (3 + 1);
        assert_eq!(&positions[at..at + 3], &[2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_concat_deltas_placeholder_when_no_targets() {
        let base =
            MeshAsset::new("base", vec![Vec3::ZERO; 3], None, None).unwrap();
        let engine = MorphEngine::new(base, &[]).unwrap();
        let (positions, normals) = concat_deltas(&engine, 0);
        assert_eq!(positions, vec![0.0; 3]);
        assert_eq!(normals, vec![0.0; 3]);
    }
}
