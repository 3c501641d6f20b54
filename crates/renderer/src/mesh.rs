//! GPU meshes and uploaded models.

use crate::vertex::Vertex;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

/// A GPU mesh with vertex and index buffers.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    /// Create a mesh from vertex and index data.
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }
}

/// Per-object uniform: model matrix, normal matrix, flags.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    /// x = unlit
    pub params: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: Mat4, unlit: bool) -> Self {
        // Inverse-transpose keeps normals perpendicular under non-uniform scale.
        let normal = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
            params: [if unlit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

impl Default for ObjectUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, false)
    }
}

/// One primitive of a model.
pub struct ModelPart {
    pub mesh: Mesh,
    /// Index into [`Model::textures`]; `None` samples the white fallback.
    pub texture: Option<usize>,
}

/// An uploaded model. Each model owns one object uniform, so it is drawn at
/// most once per frame.
pub struct Model {
    pub name: String,
    pub parts: Vec<ModelPart>,
    /// Base color bind groups (group 2).
    pub textures: Vec<wgpu::BindGroup>,
    pub object_buffer: wgpu::Buffer,
    pub object_bind_group: wgpu::BindGroup,
}

impl Model {
    pub fn triangle_count(&self) -> u32 {
        self.parts.iter().map(|p| p.mesh.num_indices / 3).sum()
    }

    /// Write this frame's transform.
    pub fn set_transform(&self, queue: &wgpu::Queue, model: Mat4, unlit: bool) {
        queue.write_buffer(
            &self.object_buffer,
            0,
            bytemuck::cast_slice(&[ObjectUniform::new(model, unlit)]),
        );
    }
}
