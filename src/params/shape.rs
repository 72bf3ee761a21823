//! Shape model parameters: geometry, colour and animation rate.

/// Icosphere geometry and shader constants
#[derive(Debug, Clone)]
pub struct ShapeParams {
    /// Sphere radius (world units)
    pub radius: f32,

    /// Subdivision detail (each icosahedron edge is split into detail + 1 segments)
    pub detail: u32,

    /// Fragment colour multipliers (red, green, blue)
    pub color: [f32; 3],

    /// Time added per animation tick (not per second)
    pub time_step: f32,

    /// Frequency contribution to the displacement phase
    /// Formula: offset = sin(time + frequency * frequency_scale)
    pub frequency_scale: f32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            radius: 10.0,
            detail: 30,
            color: [0.5, 0.5, 1.0],
            time_step: 0.05,
            frequency_scale: 0.1,
        }
    }
}
