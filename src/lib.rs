//! icopulse library - Audio-reactive wireframe icosphere

pub mod audio;
pub mod camera;
pub mod cli;
pub mod driver;
pub mod params;
pub mod rendering;
pub mod shape;
