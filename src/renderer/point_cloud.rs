use bytemuck::{Pod, Zeroable};

/// Upper bound of overlay points, well above the 30 x 30 angular grid.
const MAX_POINTS: usize = 16_384;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct Point3D {
    pub position: [f32; 3],
}

/// Vertex buffer for the raw level-surface samples drawn over the mesh.
pub struct SamplePointBuffer {
    buffer: wgpu::Buffer,
    count: usize,
}

impl SamplePointBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sample Point Buffer"),
            size: (MAX_POINTS * std::mem::size_of::<Point3D>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self { buffer, count: 0 }
    }

    /// `points` holds packed xyz triples.
    pub fn upload(&mut self, queue: &wgpu::Queue, points: &[f32]) {
        let count = (points.len() / 3).min(MAX_POINTS);
        if count > 0 {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&points[..count * 3]));
        }
        self.count = count;
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn count(&self) -> u32 {
        self.count as u32
    }
}

pub fn point_3d_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Point3D>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}
