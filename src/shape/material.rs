//! Shader material: WGSL source, uniform layout and offline validation.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use thiserror::Error;

use crate::params::ShapeParams;

/// WGSL source for the shape's vertex and fragment stages
pub const SHADER_SOURCE: &str = include_str!("shape.wgsl");

/// Shader rejected before reaching the GPU
#[derive(Error, Debug)]
pub enum ShaderError {
    #[error("WGSL parse error:\n{0}")]
    Parse(String),

    #[error("WGSL validation error:\n{0}")]
    Validation(String),

    #[error("Shader is missing entry point `{0}`")]
    MissingEntryPoint(&'static str),
}

/// Values the shader reads once per draw call
///
/// `time` and `frequency` change every tick; the colour channels are fixed
/// at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformSet {
    pub time: f32,
    pub frequency: f32,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl UniformSet {
    pub fn new(params: &ShapeParams) -> Self {
        let [red, green, blue] = params.color;
        Self {
            time: 0.0,
            frequency: 0.0,
            red,
            green,
            blue,
        }
    }

    /// Overwrite the two dynamic values
    pub fn update_uniforms(&mut self, time: f32, frequency: f32) {
        self.time = time;
        self.frequency = frequency;
    }

    /// Distance every vertex moves along its normal (CPU mirror of `vs_main`)
    pub fn displacement(&self, frequency_scale: f32) -> f32 {
        (self.time + self.frequency * frequency_scale).sin()
    }

    /// Displaced vertex position (CPU mirror of `vs_main`)
    pub fn displace(&self, position: Vec3, normal: Vec3, frequency_scale: f32) -> Vec3 {
        position + normal * self.displacement(frequency_scale)
    }

    /// Fragment colour before the target clamps it (CPU mirror of `fs_main`)
    pub fn fragment_color(&self, displaced: Vec3) -> [f32; 4] {
        [
            displaced.x * self.red,
            displaced.y * self.green,
            displaced.z * self.blue,
            1.0,
        ]
    }
}

/// GPU uniform buffer layout (matches `ShapeUniforms` in shape.wgsl)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ShapeUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub time: f32,
    pub frequency: f32,
    pub frequency_scale: f32,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub _padding: [f32; 2], // Pad to a 16-byte multiple
}

impl ShapeUniforms {
    pub fn new(view_proj: Mat4, uniforms: &UniformSet, frequency_scale: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            time: uniforms.time,
            frequency: uniforms.frequency,
            frequency_scale,
            red: uniforms.red,
            green: uniforms.green,
            blue: uniforms.blue,
            _padding: [0.0; 2],
        }
    }
}

/// Parse and validate WGSL with naga, and check both entry points exist
pub fn validate_shader(source: &str) -> Result<(), ShaderError> {
    log::debug!("Validating shape shader with naga");

    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ShaderError::Parse(e.emit_to_string(source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    validator
        .validate(&module)
        .map_err(|e| ShaderError::Validation(e.emit_to_string(source)))?;

    for (name, stage) in [
        ("vs_main", naga::ShaderStage::Vertex),
        ("fs_main", naga::ShaderStage::Fragment),
    ] {
        if !module
            .entry_points
            .iter()
            .any(|ep| ep.name == name && ep.stage == stage)
        {
            return Err(ShaderError::MissingEntryPoint(name));
        }
    }

    Ok(())
}
