//! Perspective camera and viewport tracking.

use glam::{Mat4, Vec3};

use crate::params::RenderConfig;

/// Draw surface size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Apply a resize event
    ///
    /// Returns false (and leaves the viewport untouched) for zero-sized
    /// surfaces, which winit reports while a window is minimised.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }
}

/// Perspective camera fixed on the +Z axis, looking toward the origin
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    /// Create a camera from render configuration and an initial aspect ratio
    pub fn new(config: &RenderConfig, aspect: f32) -> Self {
        let mut camera = Self {
            fov_degrees: config.fov_degrees,
            aspect,
            near: config.near_plane,
            far: config.far_plane,
            position: Vec3::new(0.0, 0.0, config.camera_distance),
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Change the aspect ratio and rebuild the projection
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    /// Recompute the cached projection from fov/aspect/near/far
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// View matrix (camera has no rotation, so it looks down -Z)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    pub fn view_proj_matrix(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

/// Viewport and camera kept in step across resizes
#[derive(Debug, Clone)]
pub struct SceneView {
    pub viewport: Viewport,
    pub camera: PerspectiveCamera,
}

impl SceneView {
    pub fn new(config: &RenderConfig, width: u32, height: u32) -> Self {
        let viewport = Viewport::new(width.max(1), height.max(1));
        let camera = PerspectiveCamera::new(config, viewport.aspect_ratio());
        Self { viewport, camera }
    }

    /// Apply a resize; returns true if the draw surface must be reconfigured
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !self.viewport.resize(width, height) {
            return false;
        }
        self.camera.set_aspect(self.viewport.aspect_ratio());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let config = RenderConfig::default();
        let camera = PerspectiveCamera::new(&config, config.aspect_ratio());

        assert_eq!(camera.fov_degrees, 75.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 30.0));
    }

    #[test]
    fn test_resize_updates_aspect() {
        let config = RenderConfig::default();
        let mut viewport = Viewport::new(1024, 768);
        let mut camera = PerspectiveCamera::new(&config, viewport.aspect_ratio());
        assert!((camera.aspect - 1.3333).abs() < 1e-3);

        assert!(viewport.resize(800, 600));
        camera.set_aspect(viewport.aspect_ratio());

        assert_eq!(viewport, Viewport::new(800, 600));
        assert_eq!(camera.aspect, 800.0 / 600.0);
        assert!((camera.aspect - 1.3333).abs() < 1e-3);
    }

    #[test]
    fn test_resize_rebuilds_projection() {
        let config = RenderConfig::default();
        let mut camera = PerspectiveCamera::new(&config, 1.0);
        let before = camera.projection_matrix();

        camera.set_aspect(2.0);
        let after = camera.projection_matrix();

        assert_ne!(before, after);
        // x scale is inversely proportional to aspect
        assert!((before.x_axis.x / after.x_axis.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_scene_view_resize() {
        let config = RenderConfig::default();
        let mut scene = SceneView::new(&config, 1024, 768);

        assert!(scene.resize(1920, 1080));
        assert_eq!(scene.viewport, Viewport::new(1920, 1080));
        assert_eq!(scene.camera.aspect, 1920.0 / 1080.0);

        assert!(!scene.resize(0, 0));
        assert_eq!(scene.viewport, Viewport::new(1920, 1080));
    }

    #[test]
    fn test_zero_sized_resize_is_ignored() {
        let mut viewport = Viewport::new(640, 480);
        assert!(!viewport.resize(640, 0));
        assert!(!viewport.resize(0, 480));
        assert_eq!(viewport, Viewport::new(640, 480));
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let config = RenderConfig::default();
        let camera = PerspectiveCamera::new(&config, config.aspect_ratio());

        let clip = camera.view_proj_matrix() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;

        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
