use thiserror::Error;

use crate::math::mesh::{ParametricSurfaceMesh, SurfaceMesh, TriangleMesh};
use crate::renderer::camera::{Camera, CameraUniform};
use crate::renderer::point_cloud::{SamplePointBuffer, point_3d_layout};

const MAX_SURFACE_VERTICES: usize = 10_000;
const MAX_SURFACE_INDICES: usize = 60_000;
const MAX_CONTOUR_VERTICES: usize = 200_000;
const MAX_GRID_VERTICES: usize = 2_000;

const SCENE_SHADER: &str = concat!(
    include_str!("shaders/colormap.wgsl"),
    include_str!("shaders/scene.wgsl")
);
const MAP_SHADER: &str = concat!(
    include_str!("shaders/colormap.wgsl"),
    include_str!("shaders/map.wgsl")
);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create window surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("window surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u32)]
pub enum ColorMap {
    Viridis = 0,
    Plasma = 1,
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceUniforms {
    pub height_min: f32,
    pub height_max: f32,
    pub colormap: u32,
    pub opacity: f32,
}

/// Places the `[-1, 1]²` domain map as a centred square inside a viewport
/// rectangle given in physical pixels.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MapUniforms {
    pub scale: [f32; 2],
    pub offset: [f32; 2],
    pub bands: f32,
    pub colormap: u32,
    pub _pad: [f32; 2],
}

impl MapUniforms {
    pub fn fit(window: (f32, f32), rect_min: (f32, f32), rect_size: (f32, f32), bands: u32) -> Self {
        let (w, h) = (window.0.max(1.0), window.1.max(1.0));
        let side = rect_size.0.min(rect_size.1).max(1.0);
        let center = (rect_min.0 + rect_size.0 / 2.0, rect_min.1 + rect_size.1 / 2.0);

        Self {
            scale: [side / w, side / h],
            offset: [2.0 * center.0 / w - 1.0, 1.0 - 2.0 * center.1 / h],
            bands: bands.max(1) as f32,
            colormap: ColorMap::Viridis as u32,
            _pad: [0.0; 2],
        }
    }
}

pub struct MathBuffers {
    pub surface_vertex_buffer: wgpu::Buffer,
    pub surface_normal_buffer: wgpu::Buffer,
    pub surface_index_buffer: wgpu::Buffer,
    pub surface_index_count: u32,
    pub surface_uniform_buffer: wgpu::Buffer,

    pub heatmap_buffer: wgpu::Buffer,
    pub heatmap_index_count: u32,
    pub contour_buffer: wgpu::Buffer,
    pub contour_vertex_count: u32,
    pub map_uniform_buffer: wgpu::Buffer,

    pub grid_vertex_buffer: wgpu::Buffer,
    pub grid_vertex_count: u32,

    pub samples: SamplePointBuffer,
}

fn vertex_buffer(device: &wgpu::Device, label: &str, bytes: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: bytes as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn uniform_buffer(device: &wgpu::Device, label: &str, bytes: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: bytes as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl MathBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        let surface_index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Surface Index Buffer"),
            size: (MAX_SURFACE_INDICES * 4) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            surface_vertex_buffer: vertex_buffer(device, "Surface Vertex Buffer", MAX_SURFACE_VERTICES * 3 * 4),
            surface_normal_buffer: vertex_buffer(device, "Surface Normal Buffer", MAX_SURFACE_VERTICES * 3 * 4),
            surface_index_buffer,
            surface_index_count: 0,
            surface_uniform_buffer: uniform_buffer(
                device,
                "Surface Uniform Buffer",
                std::mem::size_of::<SurfaceUniforms>(),
            ),
            heatmap_buffer: vertex_buffer(device, "Heatmap Buffer", MAX_SURFACE_VERTICES * 3 * 4),
            heatmap_index_count: 0,
            contour_buffer: vertex_buffer(device, "Contour Buffer", MAX_CONTOUR_VERTICES * 2 * 4),
            contour_vertex_count: 0,
            map_uniform_buffer: uniform_buffer(device, "Map Uniform Buffer", std::mem::size_of::<MapUniforms>()),
            grid_vertex_buffer: vertex_buffer(device, "Grid Vertex Buffer", MAX_GRID_VERTICES * 3 * 4),
            grid_vertex_count: 0,
            samples: SamplePointBuffer::new(device),
        }
    }

    fn upload_triangles(&mut self, queue: &wgpu::Queue, mesh: &TriangleMesh) {
        let vertex_count = mesh.vertices.len().min(MAX_SURFACE_VERTICES * 3);
        let index_count = mesh.indices.len().min(MAX_SURFACE_INDICES);
        if vertex_count < mesh.vertices.len() || index_count < mesh.indices.len() {
            log::warn!(
                "mesh truncated to {} vertices / {} indices",
                vertex_count / 3,
                index_count
            );
        }

        queue.write_buffer(
            &self.surface_vertex_buffer,
            0,
            bytemuck::cast_slice(&mesh.vertices[..vertex_count]),
        );
        queue.write_buffer(
            &self.surface_normal_buffer,
            0,
            bytemuck::cast_slice(&mesh.normals[..vertex_count]),
        );
        queue.write_buffer(
            &self.surface_index_buffer,
            0,
            bytemuck::cast_slice(&mesh.indices[..index_count]),
        );
        self.surface_index_count = index_count as u32;
    }

    fn write_surface_uniforms(&self, queue: &wgpu::Queue, uniforms: SurfaceUniforms) {
        queue.write_buffer(
            &self.surface_uniform_buffer,
            0,
            bytemuck::cast_slice(&[uniforms]),
        );
    }

    pub fn upload_surface(&mut self, queue: &wgpu::Queue, mesh: &SurfaceMesh) {
        self.upload_triangles(queue, &mesh.mesh);
        self.write_surface_uniforms(
            queue,
            SurfaceUniforms {
                height_min: mesh.scene_height.0,
                height_max: mesh.scene_height.1,
                colormap: ColorMap::Viridis as u32,
                opacity: 1.0,
            },
        );
        self.samples.clear();
    }

    pub fn upload_level_surface(&mut self, queue: &wgpu::Queue, mesh: &ParametricSurfaceMesh, points: &[f32]) {
        self.upload_triangles(queue, &mesh.mesh);
        self.write_surface_uniforms(
            queue,
            SurfaceUniforms {
                height_min: mesh.scene_height.0,
                height_max: mesh.scene_height.1,
                colormap: ColorMap::Plasma as u32,
                opacity: 0.8,
            },
        );
        self.samples.upload(queue, points);
        self.heatmap_index_count = 0;
        self.contour_vertex_count = 0;
    }

    /// The heatmap shares vertex order, and therefore the index buffer,
    /// with the surface uploaded by `upload_surface`.
    pub fn upload_map(&mut self, queue: &wgpu::Queue, heatmap: &[f32], contours: &[f32]) {
        let heat_count = heatmap.len().min(MAX_SURFACE_VERTICES * 3);
        queue.write_buffer(&self.heatmap_buffer, 0, bytemuck::cast_slice(&heatmap[..heat_count]));
        self.heatmap_index_count = self.surface_index_count;

        let contour_count = contours.len().min(MAX_CONTOUR_VERTICES * 2);
        if contour_count > 0 {
            queue.write_buffer(&self.contour_buffer, 0, bytemuck::cast_slice(&contours[..contour_count]));
        }
        self.contour_vertex_count = (contour_count / 2) as u32;
    }

    pub fn write_map_uniforms(&self, queue: &wgpu::Queue, uniforms: MapUniforms) {
        queue.write_buffer(&self.map_uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    pub fn upload_grid(&mut self, queue: &wgpu::Queue, vertices: &[f32]) {
        let vertex_count = vertices.len().min(MAX_GRID_VERTICES * 3);
        queue.write_buffer(
            &self.grid_vertex_buffer,
            0,
            bytemuck::cast_slice(&vertices[..vertex_count]),
        );
        self.grid_vertex_count = (vertex_count / 3) as u32;
    }
}

/// Layers drawn by `GpuState::render_scene`.
#[derive(Clone, Copy, Default)]
pub struct SceneLayers {
    pub grid: bool,
    pub surface: bool,
    pub samples: bool,
}

pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,

    pub pipeline_surface: wgpu::RenderPipeline,
    pub pipeline_grid: wgpu::RenderPipeline,
    pub pipeline_points: wgpu::RenderPipeline,
    pub pipeline_heatmap: wgpu::RenderPipeline,
    pub pipeline_contour: wgpu::RenderPipeline,

    pub camera_buffer: wgpu::Buffer,
    pub math_bind_group: wgpu::BindGroup,
    pub map_bind_group: wgpu::BindGroup,

    pub math_buffers: MathBuffers,

    pub depth_texture: wgpu::TextureView,
}

fn float3_layout(location: u32) -> wgpu::VertexBufferLayout<'static> {
    let attributes: &'static [wgpu::VertexAttribute] = match location {
        0 => &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
        _ => &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        }],
    };
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

fn heatmap_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32,
            },
        ],
    }
}

fn contour_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 8,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x2,
        }],
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

struct PipelineSpec<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    module: &'a wgpu::ShaderModule,
    vs: &'a str,
    fs: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    depth: bool,
}

fn create_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    spec: PipelineSpec,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(spec.layout),
        vertex: wgpu::VertexState {
            module: spec.module,
            entry_point: Some(spec.vs),
            buffers: spec.buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: spec.module,
            entry_point: Some(spec.fs),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: spec.topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: spec.depth.then(|| wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

impl GpuState {
    pub async fn new(window: std::sync::Arc<winit::window::Window>) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_SHADER.into()),
        });
        let map_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Map Shader"),
            source: wgpu::ShaderSource::Wgsl(MAP_SHADER.into()),
        });

        let camera_buffer = uniform_buffer(&device, "Camera Buffer", std::mem::size_of::<CameraUniform>());
        let math_buffers = MathBuffers::new(&device);

        let math_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Math Bind Group Layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });

        let math_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Math Bind Group"),
            layout: &math_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: math_buffers.surface_uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let map_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Map Bind Group Layout"),
            entries: &[uniform_entry(0)],
        });

        let map_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Map Bind Group"),
            layout: &map_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: math_buffers.map_uniform_buffer.as_entire_binding(),
            }],
        });

        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&math_bind_group_layout],
            push_constant_ranges: &[],
        });

        let map_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Map Pipeline Layout"),
            bind_group_layouts: &[&map_bind_group_layout],
            push_constant_ranges: &[],
        });

        let format = config.format;

        let pipeline_surface = create_pipeline(
            &device,
            format,
            PipelineSpec {
                label: "Surface Render Pipeline",
                layout: &scene_layout,
                module: &scene_shader,
                vs: "vs_surface_main",
                fs: "fs_surface_main",
                buffers: &[float3_layout(0), float3_layout(1)],
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth: true,
            },
        );

        let pipeline_grid = create_pipeline(
            &device,
            format,
            PipelineSpec {
                label: "Grid Render Pipeline",
                layout: &scene_layout,
                module: &scene_shader,
                vs: "vs_grid_main",
                fs: "fs_grid_main",
                buffers: &[float3_layout(0)],
                topology: wgpu::PrimitiveTopology::LineList,
                depth: true,
            },
        );

        let pipeline_points = create_pipeline(
            &device,
            format,
            PipelineSpec {
                label: "Sample Point Pipeline",
                layout: &scene_layout,
                module: &scene_shader,
                vs: "vs_points_main",
                fs: "fs_points_main",
                buffers: &[point_3d_layout()],
                topology: wgpu::PrimitiveTopology::PointList,
                depth: true,
            },
        );

        let pipeline_heatmap = create_pipeline(
            &device,
            format,
            PipelineSpec {
                label: "Heatmap Pipeline",
                layout: &map_layout,
                module: &map_shader,
                vs: "vs_heatmap_main",
                fs: "fs_heatmap_main",
                buffers: &[heatmap_vertex_layout()],
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth: false,
            },
        );

        let pipeline_contour = create_pipeline(
            &device,
            format,
            PipelineSpec {
                label: "Contour Pipeline",
                layout: &map_layout,
                module: &map_shader,
                vs: "vs_contour_main",
                fs: "fs_contour_main",
                buffers: &[contour_vertex_layout()],
                topology: wgpu::PrimitiveTopology::LineList,
                depth: false,
            },
        );

        let depth_texture = Self::create_depth_texture(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            pipeline_surface,
            pipeline_grid,
            pipeline_points,
            pipeline_heatmap,
            pipeline_contour,
            camera_buffer,
            math_bind_group,
            map_bind_group,
            math_buffers,
            depth_texture,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Self::create_depth_texture(&self.device, &self.config);
        }
    }

    pub fn update_camera(&self, camera: &Camera) {
        let uniform = CameraUniform::from_camera(camera);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.config.present_mode = if enabled {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        self.surface.configure(&self.device, &self.config);
    }

    pub fn render_scene(
        &self,
        view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
        layers: SceneLayers,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
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

        let buffers = &self.math_buffers;
        render_pass.set_bind_group(0, &self.math_bind_group, &[]);

        if layers.grid && buffers.grid_vertex_count > 0 {
            render_pass.set_pipeline(&self.pipeline_grid);
            render_pass.set_vertex_buffer(0, buffers.grid_vertex_buffer.slice(..));
            render_pass.draw(0..buffers.grid_vertex_count, 0..1);
        }

        if layers.samples && buffers.samples.count() > 0 {
            render_pass.set_pipeline(&self.pipeline_points);
            render_pass.set_vertex_buffer(0, buffers.samples.buffer().slice(..));
            render_pass.draw(0..buffers.samples.count(), 0..1);
        }

        if layers.surface && buffers.surface_index_count > 0 {
            render_pass.set_pipeline(&self.pipeline_surface);
            render_pass.set_vertex_buffer(0, buffers.surface_vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, buffers.surface_normal_buffer.slice(..));
            render_pass.set_index_buffer(
                buffers.surface_index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            render_pass.draw_indexed(0..buffers.surface_index_count, 0, 0..1);
        }
    }

    /// Filled bands plus level-curve lines of the current height field.
    pub fn render_map(&self, view: &wgpu::TextureView, encoder: &mut wgpu::CommandEncoder) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Map Render Pass"),
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

        let buffers = &self.math_buffers;
        render_pass.set_bind_group(0, &self.map_bind_group, &[]);

        if buffers.heatmap_index_count > 0 {
            render_pass.set_pipeline(&self.pipeline_heatmap);
            render_pass.set_vertex_buffer(0, buffers.heatmap_buffer.slice(..));
            render_pass.set_index_buffer(
                buffers.surface_index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            render_pass.draw_indexed(0..buffers.heatmap_index_count, 0, 0..1);
        }

        if buffers.contour_vertex_count > 0 {
            render_pass.set_pipeline(&self.pipeline_contour);
            render_pass.set_vertex_buffer(0, buffers.contour_buffer.slice(..));
            render_pass.draw(0..buffers.contour_vertex_count, 0..1);
        }
    }
}

/// Floor grid at height `y` plus the three axes through the origin.
pub fn generate_grid_vertices(size: f32, divisions: u32, y: f32) -> Vec<f32> {
    let mut vertices = Vec::with_capacity(((divisions as usize + 1) * 4 + 6) * 3);
    let step = size * 2.0 / divisions as f32;
    let half = size;

    for i in 0..=divisions {
        let pos = -half + i as f32 * step;
        vertices.extend_from_slice(&[pos, y, -half, pos, y, half]);
        vertices.extend_from_slice(&[-half, y, pos, half, y, pos]);
    }

    vertices.extend_from_slice(&[-half, 0.0, 0.0, half, 0.0, 0.0]);
    vertices.extend_from_slice(&[0.0, 0.0, -half, 0.0, 0.0, half]);
    vertices.extend_from_slice(&[0.0, -half, 0.0, 0.0, half, 0.0]);

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn uniform_layouts_match_wgsl() {
        assert_eq!(std::mem::size_of::<SurfaceUniforms>(), 16);
        assert_eq!(std::mem::size_of::<MapUniforms>(), 32);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
    }

    #[test]
    fn map_fits_square_in_left_region() {
        // 1600 x 900 window with a 400 px panel on the right
        let u = MapUniforms::fit((1600.0, 900.0), (0.0, 0.0), (1200.0, 900.0), 21);
        assert_abs_diff_eq!(u.scale[0], 900.0 / 1600.0);
        assert_abs_diff_eq!(u.scale[1], 1.0);
        assert_abs_diff_eq!(u.offset[0], -0.25);
        assert_abs_diff_eq!(u.offset[1], 0.0);
        assert_eq!(u.bands, 21.0);

        // the map's right edge stays left of the panel
        let right = u.scale[0] + u.offset[0];
        assert!(right <= 0.5 + 1e-6);
    }

    #[test]
    fn grid_has_two_lines_per_division_plus_axes() {
        let v = generate_grid_vertices(120.0, 12, -100.0);
        assert_eq!(v.len(), ((12 + 1) * 4 + 6) * 3);
        assert_eq!(v[1], -100.0);
    }
}
