use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Camera with a fixed eye, looking straight down -Z onto the grid plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCamera {
    pub eye: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl FixedCamera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            eye: config.eye,
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
        }
    }

    pub fn target(&self) -> Vec3 {
        Vec3::new(self.eye.x, self.eye.y, 0.0)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target(), Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }
}

/// Width over height, unguarded: a zero height yields an infinite aspect.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height as f32
}

/// Matrices uploaded every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub projection: Mat4,
    /// Always identity; kept so a per-sprite transform has somewhere to go.
    pub model: Mat4,
    pub view: Mat4,
}

impl Transforms {
    pub fn compute(camera: &FixedCamera, aspect: f32) -> Self {
        Self {
            projection: camera.projection_matrix(aspect),
            model: Mat4::IDENTITY,
            view: camera.view_matrix(),
        }
    }

    pub fn clip_from_local(&self) -> Mat4 {
        self.projection * self.view * self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4Swizzles;

    #[test]
    fn default_camera_centres_the_grid() {
        let cam = FixedCamera::default();
        let t = Transforms::compute(&cam, 1.0);
        let centre = t.clip_from_local() * Vec3::new(1.5, 1.5, 0.0).extend(1.0);
        let ndc = centre.xyz() / centre.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5, "{ndc}");
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn centre_tile_is_in_view() {
        let t = Transforms::compute(&FixedCamera::default(), 4.0 / 3.0);
        for corner in [
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(2.0, 2.0, 0.0),
        ] {
            let clip = t.clip_from_local() * corner.extend(1.0);
            let ndc = clip.xyz() / clip.w;
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "{corner} -> {ndc}");
        }
    }

    #[test]
    fn model_is_identity() {
        let t = Transforms::compute(&FixedCamera::default(), 1.0);
        assert_eq!(t.model, Mat4::IDENTITY);
    }

    #[test]
    fn projection_follows_aspect() {
        let cam = FixedCamera::default();
        let wide = Transforms::compute(&cam, aspect_ratio(800, 400));
        let square = Transforms::compute(&cam, aspect_ratio(400, 400));
        assert!(wide.projection.x_axis.x < square.projection.x_axis.x);
        assert_eq!(wide.view, square.view);
    }

    #[test]
    fn zero_height_aspect_is_not_guarded() {
        assert!(aspect_ratio(640, 0).is_infinite());
    }
}
