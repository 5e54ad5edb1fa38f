use crate::camera::{CameraPose, ZOOM_MAX, ZOOM_MIN};
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};
use winit::dpi::PhysicalSize;

/// Perspective camera. Zoom narrows the field of view rather than moving the pose, so the pose
/// stays interchangeable with the orthographic camera.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub pose: CameraPose,
    pub fov_y_radians: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov_y_radians: f32, viewport: PhysicalSize<u32>) -> Self {
        let mut camera =
            Self { pose: CameraPose::default(), fov_y_radians, aspect: 1.0, near: 0.1, far: 20_000.0 };
        camera.resize(viewport);
        camera
    }

    pub fn resize(&mut self, viewport: PhysicalSize<u32>) {
        self.aspect =
            if viewport.height > 0 { viewport.width.max(1) as f32 / viewport.height as f32 } else { 1.0 };
    }

    pub fn effective_fov(&self, zoom: f32) -> f32 {
        let zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        2.0 * ((self.fov_y_radians * 0.5).tan() / zoom).atan()
    }

    pub fn projection_matrix(&self, zoom: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.effective_fov(zoom), self.aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, zoom: f32) -> Mat4 {
        self.projection_matrix(zoom) * self.pose.view_matrix()
    }

    /// Left and right eye view-projections for anaglyph stereo, offset along the camera's right
    /// vector by half the separation each.
    pub fn stereo_view_projections(&self, zoom: f32, eye_separation: f32) -> [Mat4; 2] {
        let offset = self.pose.right() * (eye_separation * 0.5);
        let proj = self.projection_matrix(zoom);
        let eye = |shift: Vec3| {
            let pose = CameraPose { position: self.pose.position + shift, rotation: self.pose.rotation };
            proj * pose.view_matrix()
        };
        [eye(-offset), eye(offset)]
    }

    /// Generates a world-space ray from the camera through a normalised device coordinate.
    pub fn screen_ray(&self, ndc: Vec2, zoom: f32) -> Option<(Vec3, Vec3)> {
        let clip = Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let inv_view_proj = self.view_projection(zoom).inverse();
        let world = inv_view_proj * clip;
        if world.w.abs() < f32::EPSILON {
            return None;
        }
        let dir = (world.truncate() / world.w) - self.pose.position;
        if dir.length_squared() <= f32::EPSILON {
            return None;
        }
        Some((self.pose.position, dir.normalize()))
    }

    /// Camera distance at which the viewport height spans `extent` world units at zoom 1.
    pub fn framing_distance(&self, extent: f32) -> f32 {
        (extent * 0.5) / (self.fov_y_radians * 0.5).tan().max(0.0001)
    }
}

/// Yaw/pitch applied to the pivot that wraps every cell, rotating the grid about its centre
/// instead of moving the camera.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PivotRotation {
    pub yaw_radians: f32,
    pub pitch_radians: f32,
}

impl PivotRotation {
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw_radians = crate::wrap_angle(self.yaw_radians + delta.x);
        self.pitch_radians = (self.pitch_radians + delta.y)
            .clamp(-std::f32::consts::FRAC_PI_2 + 0.01, std::f32::consts::FRAC_PI_2 - 0.01);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw_radians, self.pitch_radians, 0.0)
    }

    /// Grid-local to world transform, rotating about `center`.
    pub fn matrix(&self, center: Vec3) -> Mat4 {
        Mat4::from_translation(center) * Mat4::from_quat(self.quat()) * Mat4::from_translation(-center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_projection_is_finite() {
        let camera = PerspectiveCamera::new(45f32.to_radians(), PhysicalSize::new(1280, 720));
        let vp = camera.view_projection(1.0);
        assert!(!vp.to_cols_array().iter().any(|v| v.is_nan() || v.is_infinite()));
    }

    #[test]
    fn zoom_narrows_the_field_of_view() {
        let camera = PerspectiveCamera::new(45f32.to_radians(), PhysicalSize::new(1280, 720));
        assert!(camera.effective_fov(2.0) < camera.effective_fov(1.0));
        assert!((camera.effective_fov(1.0) - camera.fov_y_radians).abs() < 1e-5);
    }

    #[test]
    fn center_ray_points_forward() {
        let camera = PerspectiveCamera::new(60f32.to_radians(), PhysicalSize::new(800, 600));
        let (origin, dir) = camera.screen_ray(Vec2::ZERO, 1.0).expect("ray");
        assert_eq!(origin, camera.pose.position);
        assert!((dir - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn stereo_eyes_differ() {
        let camera = PerspectiveCamera::new(45f32.to_radians(), PhysicalSize::new(800, 600));
        let [left, right] = camera.stereo_view_projections(1.0, 6.0);
        assert_ne!(left, right);
    }

    #[test]
    fn pivot_pitch_is_clamped_and_center_is_fixed() {
        let mut pivot = PivotRotation::default();
        pivot.rotate(Vec2::new(0.5, 10.0));
        assert!(pivot.pitch_radians < std::f32::consts::FRAC_PI_2);
        let center = Vec3::new(400.0, -200.0, -80.0);
        let moved = pivot.matrix(center).transform_point3(center);
        assert!(moved.distance(center) < 1e-3);
    }
}
