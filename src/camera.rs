use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use winit::dpi::PhysicalSize;

pub const ZOOM_MIN: f32 = 0.1;
pub const ZOOM_MAX: f32 = 5.0;

/// Position and orientation shared by every projection; copied across on mode switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self { position: Vec3::new(0.0, 0.0, 1000.0), rotation: Quat::IDENTITY }
    }
}

impl CameraPose {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }
}

/// Orthographic camera whose frustum is symmetric around the pose, sized one world unit per
/// pixel at zoom 1.
#[derive(Debug, Clone)]
pub struct OrthoCamera {
    pub pose: CameraPose,
    half_width: f32,
    half_height: f32,
    near: f32,
    far: f32,
}

impl OrthoCamera {
    pub fn new(viewport: PhysicalSize<u32>) -> Self {
        let mut camera =
            Self { pose: CameraPose::default(), half_width: 1.0, half_height: 1.0, near: 0.1, far: 10_000.0 };
        camera.resize(viewport);
        camera
    }

    pub fn resize(&mut self, viewport: PhysicalSize<u32>) {
        self.half_width = viewport.width.max(1) as f32 * 0.5;
        self.half_height = viewport.height.max(1) as f32 * 0.5;
    }

    /// (left, right, bottom, top) at the given zoom.
    pub fn extents(&self, zoom: f32) -> (f32, f32, f32, f32) {
        let zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        let hw = self.half_width / zoom;
        let hh = self.half_height / zoom;
        (-hw, hw, -hh, hh)
    }

    pub fn projection_matrix(&self, zoom: f32) -> Mat4 {
        let (left, right, bottom, top) = self.extents(zoom);
        Mat4::orthographic_rh_gl(left, right, bottom, top, self.near, self.far)
    }

    pub fn view_projection(&self, zoom: f32) -> Mat4 {
        self.projection_matrix(zoom) * self.pose.view_matrix()
    }

    /// Ray through a normalised device coordinate; parallel to the view direction.
    pub fn screen_ray(&self, ndc: Vec2, zoom: f32) -> Option<(Vec3, Vec3)> {
        let inv = self.view_projection(zoom).inverse();
        let near = inv * Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        if near.w.abs() <= f32::EPSILON {
            return None;
        }
        Some((near.truncate() / near.w, self.pose.forward()))
    }

    pub fn world_to_screen_pixels(&self, world: Vec3, zoom: f32, viewport: PhysicalSize<u32>) -> Option<Vec2> {
        if viewport.width == 0 || viewport.height == 0 {
            return None;
        }
        let clip = self.view_projection(zoom) * world.extend(1.0);
        if clip.w.abs() <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let x = (ndc.x + 1.0) * 0.5 * viewport.width as f32;
        let y = (1.0 - ndc.y) * 0.5 * viewport.height as f32;
        Some(Vec2::new(x, y))
    }
}

/// Pixel position to normalised device coordinates (y up).
pub fn pixels_to_ndc(screen: Vec2, viewport: PhysicalSize<u32>) -> Option<Vec2> {
    if viewport.width == 0 || viewport.height == 0 {
        return None;
    }
    let x = (screen.x / viewport.width as f32) * 2.0 - 1.0;
    let y = 1.0 - (screen.y / viewport.height as f32) * 2.0;
    Some(Vec2::new(x, y))
}
