//! Main renderer managing wgpu state and rendering.

use crate::{
    camera::Camera,
    gltf_loader::ModelData,
    mesh::{Mesh, Model, ModelPart, ObjectUniform},
    pipeline::{
        create_frame_bind_group_layout, create_object_bind_group_layout,
        create_overlay_bind_group_layout, create_overlay_pipeline, create_scene_pipeline,
        create_texture_bind_group_layout,
    },
    texture::Texture,
    vertex::OverlayVertex,
};
use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use engine_core::WorldSpotLight;
use glam::{Mat4, Vec3};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Per-frame camera and lighting data. Layout matches `Frame` in scene.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    /// xyz = position, w = range (0 = unbounded)
    pub spot_position: [f32; 4],
    /// xyz = unit direction, w = cos(outer angle)
    pub spot_direction: [f32; 4],
    /// rgb = color, w = intensity
    pub spot_color: [f32; 4],
    /// x = cos(inner angle), y = decay, z = enabled
    pub spot_params: [f32; 4],
}

impl FrameUniform {
    /// Build from the camera, the first spotlight (if any) and an ambient color.
    pub fn new(camera: &Camera, spot: Option<&WorldSpotLight>, ambient: Vec3) -> Self {
        let pos = camera.position();
        let mut uniform = Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: [pos.x, pos.y, pos.z, 1.0],
            ambient: [ambient.x, ambient.y, ambient.z, 1.0],
            spot_position: [0.0; 4],
            spot_direction: [0.0, -1.0, 0.0, 0.0],
            spot_color: [0.0; 4],
            spot_params: [1.0, 0.0, 0.0, 0.0],
        };
        if let Some(spot) = spot {
            let light = &spot.light;
            let cos_outer = light.cos_outer();
            // smoothstep needs edge0 < edge1
            let cos_inner = light.cos_inner().max(cos_outer + 1e-4);
            uniform.spot_position = [spot.position.x, spot.position.y, spot.position.z, light.distance];
            uniform.spot_direction = [spot.direction.x, spot.direction.y, spot.direction.z, cos_outer];
            uniform.spot_color = [light.color.x, light.color.y, light.color.z, light.intensity];
            uniform.spot_params = [cos_inner, light.decay, 1.0, 0.0];
        }
        uniform
    }
}

/// One model draw with its world transform.
pub struct SceneDraw<'a> {
    pub model: &'a Model,
    pub world: Mat4,
    pub unlit: bool,
}

pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    // Pipelines
    scene_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,

    // Bind groups and layouts
    object_bind_group_layout: wgpu::BindGroupLayout,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    default_texture_bind_group: wgpu::BindGroup,
    overlay_bind_group: wgpu::BindGroup,

    // Depth buffer
    depth_texture: Texture,

    /// Background behind the skybox.
    pub clear_color: wgpu::Color,
}

impl Renderer {
    /// Create a new renderer for the given window.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface reports no supported formats"))?;

        // Mailbox when vsync is wanted (presents the newest frame at vblank), otherwise
        // Immediate if the platform has it.
        let wanted = if vsync {
            wgpu::PresentMode::Mailbox
        } else {
            wgpu::PresentMode::Immediate
        };
        let present_mode = surface_caps
            .present_modes
            .iter()
            .find(|m| **m == wanted)
            .copied()
            .unwrap_or(wgpu::PresentMode::AutoVsync);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);

        // Bind group layouts
        let frame_bind_group_layout = create_frame_bind_group_layout(&device);
        let object_bind_group_layout = create_object_bind_group_layout(&device);
        let texture_bind_group_layout = create_texture_bind_group_layout(&device);

        let frame_uniform = FrameUniform::new(&Camera::default(), None, Vec3::ZERO);
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Buffer"),
            contents: bytemuck::cast_slice(&[frame_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        // Default white texture for untextured materials
        let default_texture = Texture::white_pixel(&device, &queue);
        let default_texture_bind_group =
            texture_bind_group(&device, &texture_bind_group_layout, &default_texture, "Default Texture Bind Group");

        let depth_texture =
            Texture::create_depth_texture(&device, config.width, config.height, "Depth Texture");

        let scene_pipeline = create_scene_pipeline(
            &device,
            &config,
            &frame_bind_group_layout,
            &object_bind_group_layout,
            &texture_bind_group_layout,
        );

        // --- Overlay (text) pipeline ---
        let overlay_bind_group_layout = create_overlay_bind_group_layout(&device);
        let overlay_pipeline = create_overlay_pipeline(&device, &config, &overlay_bind_group_layout);

        // Generate bitmap font atlas and upload as a texture
        let (font_pixels, font_w, font_h) = crate::vertex::generate_font_atlas();
        let font_texture = device.create_texture_with_data(
            &queue,
            &wgpu::TextureDescriptor {
                label: Some("Font Atlas"),
                size: wgpu::Extent3d {
                    width: font_w,
                    height: font_h,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::R8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &font_pixels,
        );
        let font_view = font_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let font_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let overlay_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Bind Group"),
            layout: &overlay_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&font_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&font_sampler),
                },
            ],
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            scene_pipeline,
            overlay_pipeline,
            object_bind_group_layout,
            texture_bind_group_layout,
            frame_buffer,
            frame_bind_group,
            default_texture_bind_group,
            overlay_bind_group,
            depth_texture,
            clear_color: wgpu::Color::BLACK,
        })
    }

    /// Handle window resize.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Texture::create_depth_texture(
                &self.device,
                self.config.width,
                self.config.height,
                "Depth Texture",
            );
        }
    }

    /// Upload decoded model data: one mesh per primitive, one bind group per
    /// decoded image and a fresh object uniform.
    pub fn upload_model(&self, data: &ModelData) -> Model {
        let mut textures = Vec::new();
        // glTF image index -> slot in `textures`
        let mut slots = Vec::with_capacity(data.images.len());
        for (index, image) in data.images.iter().enumerate() {
            let slot = image.as_ref().map(|image| {
                let label = format!("{} image {}", data.name, index);
                let texture =
                    Texture::from_rgba8(&self.device, &self.queue, &image.rgba, image.width, image.height, &label);
                textures.push(texture_bind_group(
                    &self.device,
                    &self.texture_bind_group_layout,
                    &texture,
                    &label,
                ));
                textures.len() - 1
            });
            slots.push(slot);
        }

        let parts = data
            .primitives
            .iter()
            .map(|primitive| ModelPart {
                mesh: Mesh::new(&self.device, &primitive.vertices, &primitive.indices),
                texture: primitive.texture.and_then(|i| slots.get(i).copied().flatten()),
            })
            .collect();

        let object_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Buffer"),
            contents: bytemuck::cast_slice(&[ObjectUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let object_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout: &self.object_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: object_buffer.as_entire_binding(),
            }],
        });

        let model = Model {
            name: data.name.clone(),
            parts,
            textures,
            object_buffer,
            object_bind_group,
        };
        log::info!(
            "Uploaded model '{}': {} parts, {} textures, {} triangles",
            model.name,
            model.parts.len(),
            model.textures.len(),
            model.triangle_count()
        );
        model
    }

    /// Update the frame uniform. Only the first spotlight is lit.
    pub fn update_frame(&mut self, camera: &Camera, spot_lights: &[WorldSpotLight], ambient: Vec3) {
        let uniform = FrameUniform::new(camera, spot_lights.first(), ambient);
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Begin a new frame. Returns `None` when the surface had to be
    /// reconfigured or timed out; skip drawing this frame.
    pub fn begin_frame(&mut self) -> Result<Option<(wgpu::SurfaceTexture, wgpu::CommandEncoder)>> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(None);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface acquire timed out");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        Ok(Some((output, encoder)))
    }

    /// Clear and draw every model with depth testing.
    pub fn render_scene(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, draws: &[SceneDraw]) {
        for draw in draws {
            draw.model.set_transform(&self.queue, draw.world, draw.unlit);
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.scene_pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for draw in draws {
            render_pass.set_bind_group(1, &draw.model.object_bind_group, &[]);
            for part in &draw.model.parts {
                let texture = part
                    .texture
                    .and_then(|i| draw.model.textures.get(i))
                    .unwrap_or(&self.default_texture_bind_group);
                render_pass.set_bind_group(2, texture, &[]);
                render_pass.set_vertex_buffer(0, part.mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(part.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..part.mesh.num_indices, 0, 0..1);
            }
        }
    }

    /// Render screen-space text overlay. Call as the very last pass before end_frame.
    /// Takes pre-built overlay vertices and indices from an `OverlayTextBuilder`.
    pub fn render_overlay(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        vertices: &[OverlayVertex],
        indices: &[u32],
    ) {
        if vertices.is_empty() || indices.is_empty() {
            return;
        }

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
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

        render_pass.set_pipeline(&self.overlay_pipeline);
        render_pass.set_bind_group(0, &self.overlay_bind_group, &[]);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..indices.len() as u32, 0, 0..1);
    }

    /// End frame and present.
    pub fn end_frame(&self, output: wgpu::SurfaceTexture, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    /// Get window dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}
