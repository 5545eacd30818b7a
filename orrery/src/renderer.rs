//! Rendering system for the orrery

use std::collections::HashMap;
use std::path::Path;

use common::{Camera3D, CameraUniform, GraphicsContext};
use glam::Mat4;

use crate::config::{srgb_to_linear, LightingConfig};
use crate::geometry::{self, MeshData};
use crate::scene::{Geometry, Material, Renderable, Scene};
use crate::scene_graph::NodeId;
use crate::solar_system::SystemSpec;
use crate::texture::{self, Texture};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Ambient and point light parameters
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub ambient: [f32; 4],
    pub point_position: [f32; 4],
    pub point_color: [f32; 4],
    pub point_params: [f32; 4],
}

impl LightUniform {
    pub fn from_config(lighting: &LightingConfig) -> Self {
        let scale = |rgb: [f32; 3], intensity: f32| {
            let [r, g, b] = rgb.map(|c| srgb_to_linear(c) * intensity);
            [r, g, b, 1.0]
        };
        Self {
            ambient: scale(lighting.ambient_color, lighting.ambient_intensity),
            // The point light sits at the sun's centre
            point_position: [0.0, 0.0, 0.0, 1.0],
            point_color: scale(lighting.point_color, lighting.point_intensity),
            point_params: [lighting.point_range.max(0.0), lighting.point_decay, 0.0, 0.0],
        }
    }
}

/// Per-mesh transform and material flags
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub params: [f32; 4],
}

impl ModelUniform {
    pub fn new(model: Mat4, material: Material) -> Self {
        let lit = match material {
            Material::Basic => 0.0,
            Material::Standard => 1.0,
        };
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
            params: [lit, 0.0, 0.0, 0.0],
        }
    }
}

/// Build the CPU mesh for a renderable's geometry
pub fn mesh_data(geometry: &Geometry) -> MeshData {
    match *geometry {
        Geometry::Sphere { radius, segments } => geometry::sphere(radius, segments.width, segments.height),
        Geometry::Ring {
            inner_radius,
            outer_radius,
            theta_segments,
        } => geometry::ring(inner_radius, outer_radius, theta_segments),
    }
}

fn depth_state(write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn depth_extent(width: u32, height: u32) -> Option<wgpu::Extent3d> {
    (width > 0 && height > 0).then_some(wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    })
}

struct GpuMesh {
    node: NodeId,
    material: Material,
    double_sided: bool,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    model_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct Renderer {
    mesh_pipeline: wgpu::RenderPipeline,
    ring_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: wgpu::RenderPipeline,

    camera_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    sky_bind_group: wgpu::BindGroup,

    meshes: Vec<GpuMesh>,
    depth_texture: wgpu::TextureView,
}

impl Renderer {
    pub fn new(
        ctx: &GraphicsContext,
        system: &SystemSpec,
        scene: &Scene,
        lighting: &LightingConfig,
        asset_dir: &Path,
    ) -> Self {
        let device = &ctx.device;
        let queue = &ctx.queue;

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });
        let skybox_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skybox Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/skybox.wgsl").into()),
        });

        // Uniform buffers
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_buffer =
            common::create_uniform_buffer(device, "Light Buffer", &LightUniform::from_config(lighting));

        // Bind group layouts
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });

        let mesh_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Bind Group Layout"),
            entries: &[
                uniform_entry(0),
                texture_entry(1, wgpu::TextureViewDimension::D2),
                sampler_entry(2),
            ],
        });

        let sky_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Skybox Bind Group Layout"),
            entries: &[texture_entry(0, wgpu::TextureViewDimension::Cube), sampler_entry(1)],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let mesh_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &mesh_layout],
            push_constant_ranges: &[],
        });
        let sky_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skybox Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &sky_layout],
            push_constant_ranges: &[],
        });

        // Depth texture, sized from the configured surface
        let extent = depth_extent(ctx.config.width, ctx.config.height).unwrap_or(wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        });
        let depth_texture = Self::create_depth_texture(device, extent);

        // Opaque spheres
        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&mesh_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &mesh_shader,
                entry_point: Some("vs_mesh"),
                buffers: &[common::MeshVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &mesh_shader,
                entry_point: Some("fs_mesh"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(depth_state(true)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // Double-sided, alpha blended rings
        let ring_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Ring Pipeline"),
            layout: Some(&mesh_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &mesh_shader,
                entry_point: Some("vs_mesh"),
                buffers: &[common::MeshVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &mesh_shader,
                entry_point: Some("fs_mesh"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            // Rings test against the spheres but never hide what is blended after them
            depth_stencil: Some(depth_state(false)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // Skybox pipeline
        let skybox_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Skybox Pipeline"),
            layout: Some(&sky_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &skybox_shader,
                entry_point: Some("vs_skybox"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &skybox_shader,
                entry_point: Some("fs_skybox"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // Star field
        let stars = texture::load_or_tint(asset_dir, system.background, system.background_tint);
        let sky = Texture::cube_from_image(device, queue, stars, "Skybox Texture");
        let sky_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Skybox Bind Group"),
            layout: &sky_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&sky.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sky.sampler),
                },
            ],
        });

        // Meshes, sharing textures by file name
        let world = scene.graph.world_matrices();
        let mut textures: HashMap<&'static str, Texture> = HashMap::new();
        let mut meshes = Vec::with_capacity(scene.renderables.len());
        for renderable in &scene.renderables {
            let name = &scene.graph.node(renderable.node).name;
            let texture = textures.entry(renderable.texture).or_insert_with(|| {
                let image = texture::load_or_tint(asset_dir, renderable.texture, renderable.tint);
                Texture::from_image(device, queue, &image, renderable.texture)
            });
            meshes.push(Self::upload_mesh(
                device,
                &mesh_layout,
                renderable,
                name,
                texture,
                world[renderable.node.index()],
            ));
        }

        log::info!(
            "Renderer ready: {} meshes, {} textures",
            meshes.len(),
            textures.len()
        );

        Self {
            mesh_pipeline,
            ring_pipeline,
            skybox_pipeline,
            camera_buffer,
            frame_bind_group,
            sky_bind_group,
            meshes,
            depth_texture,
        }
    }

    fn upload_mesh(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        renderable: &Renderable,
        name: &str,
        texture: &Texture,
        world: Mat4,
    ) -> GpuMesh {
        let data = mesh_data(&renderable.geometry);
        let vertex_buffer = common::create_vertex_buffer(device, &format!("{name} Vertices"), &data.vertices);
        let index_buffer = common::create_index_buffer(device, &format!("{name} Indices"), &data.indices);
        let model_buffer = common::create_uniform_buffer(
            device,
            &format!("{name} Model"),
            &ModelUniform::new(world, renderable.material),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(name),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        GpuMesh {
            node: renderable.node,
            material: renderable.material,
            double_sided: renderable.double_sided,
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            model_buffer,
            bind_group,
        }
    }

    fn create_depth_texture(device: &wgpu::Device, size: wgpu::Extent3d) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Rebuild the depth buffer for a reconfigured surface. A zero size keeps
    /// the current buffer, since the surface keeps its old size too.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if let Some(extent) = depth_extent(width, height) {
            self.depth_texture = Self::create_depth_texture(device, extent);
        }
    }

    /// Upload the camera and every mesh's current world transform
    pub fn update(&self, queue: &wgpu::Queue, camera: &Camera3D, scene: &Scene) {
        let camera_uniform = CameraUniform::from_camera_3d(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera_uniform]));

        let world = scene.graph.world_matrices();
        for mesh in &self.meshes {
            let uniform = ModelUniform::new(world[mesh.node.index()], mesh.material);
            queue.write_buffer(&mesh.model_buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
    }

    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        // Skybox pass
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Skybox Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.skybox_pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            pass.set_bind_group(1, &self.sky_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        // Main 3D pass
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            // Blended rings go after every opaque sphere
            for double_sided in [false, true] {
                let pipeline = if double_sided {
                    &self.ring_pipeline
                } else {
                    &self.mesh_pipeline
                };
                pass.set_pipeline(pipeline);
                for mesh in self.meshes.iter().filter(|m| m.double_sided == double_sided) {
                    pass.set_bind_group(1, &mesh.bind_group, &[]);
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }
        }
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}
