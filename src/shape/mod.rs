//! Shape model: icosphere geometry, WGSL material and the uniform set it reads.

mod material;
mod mesh;

// Re-export public types
pub use material::{validate_shader, ShaderError, ShapeUniforms, UniformSet, SHADER_SOURCE};
pub use mesh::IcosphereMesh;

use bytemuck::{Pod, Zeroable};

/// Vertex data for the shape mesh (position + outward normal)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}
