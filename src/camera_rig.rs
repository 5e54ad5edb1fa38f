use crate::camera::{CameraPose, OrthoCamera, ZOOM_MAX, ZOOM_MIN};
use crate::camera3d::{PerspectiveCamera, PivotRotation};
use crate::config::CameraConfig;
use glam::{Mat4, Vec2, Vec3};
use winit::dpi::PhysicalSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    #[default]
    Orthographic,
    /// Anaglyph stereo.
    Perspective,
    /// 4D mode.
    ExtremePerspective,
}

impl ProjectionMode {
    pub fn label(self) -> &'static str {
        match self {
            ProjectionMode::Orthographic => "Orthographic",
            ProjectionMode::Perspective => "Perspective (anaglyph)",
            ProjectionMode::ExtremePerspective => "Extreme perspective (4D)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSwitch {
    pub from: ProjectionMode,
    pub to: ProjectionMode,
}

impl ModeSwitch {
    pub fn left_hyper(&self) -> bool {
        self.from == ProjectionMode::ExtremePerspective && self.to != ProjectionMode::ExtremePerspective
    }

    pub fn entered_hyper(&self) -> bool {
        self.to == ProjectionMode::ExtremePerspective && self.from != ProjectionMode::ExtremePerspective
    }
}

/// What the renderer needs from the active camera for one frame.
#[derive(Debug, Clone, Copy)]
pub struct CameraFrame {
    pub mode: ProjectionMode,
    pub view_projection: Mat4,
    /// Left/right eye matrices, present only for anaglyph stereo.
    pub stereo: Option<[Mat4; 2]>,
    pub pivot: Mat4,
    pub zoom: f32,
}

/// The three projections, exactly one of which is active. Toggles are last-toggled-wins: the
/// anaglyph and 4D modes can never be on together.
#[derive(Debug, Clone)]
pub struct CameraRig {
    mode: ProjectionMode,
    /// Mode to return to when 4D is toggled off.
    before_hyper: ProjectionMode,
    ortho: OrthoCamera,
    perspective: PerspectiveCamera,
    extreme: PerspectiveCamera,
    zoom: f32,
    zoom_limits: (f32, f32),
    pivot: PivotRotation,
    pivot_center: Vec3,
    viewport: PhysicalSize<u32>,
    rotate_sensitivity: f32,
    wheel_zoom_step: f32,
    eye_separation: f32,
}

impl CameraRig {
    pub fn new(config: &CameraConfig, viewport: PhysicalSize<u32>, grid_center: Vec3) -> Self {
        let min = config.zoom_min.max(ZOOM_MIN);
        let max = config.zoom_max.min(ZOOM_MAX).max(min);
        let mut rig = Self {
            mode: ProjectionMode::Orthographic,
            before_hyper: ProjectionMode::Orthographic,
            ortho: OrthoCamera::new(viewport),
            perspective: PerspectiveCamera::new(config.perspective_fov_degrees.to_radians(), viewport),
            extreme: PerspectiveCamera::new(config.extreme_fov_degrees.to_radians(), viewport),
            zoom: 1.0_f32.clamp(min, max),
            zoom_limits: (min, max),
            pivot: PivotRotation::default(),
            pivot_center: grid_center,
            viewport,
            rotate_sensitivity: config.rotate_sensitivity,
            wheel_zoom_step: config.wheel_zoom_step,
            eye_separation: config.eye_separation,
        };
        rig.frame_grid(grid_center);
        rig
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pivot(&self) -> &PivotRotation {
        &self.pivot
    }

    pub fn yaw(&self) -> f32 {
        self.pivot.yaw_radians
    }

    pub fn pose(&self) -> CameraPose {
        self.pose_of(self.mode)
    }

    pub fn viewport(&self) -> PhysicalSize<u32> {
        self.viewport
    }

    fn pose_of(&self, mode: ProjectionMode) -> CameraPose {
        match mode {
            ProjectionMode::Orthographic => self.ortho.pose,
            ProjectionMode::Perspective => self.perspective.pose,
            ProjectionMode::ExtremePerspective => self.extreme.pose,
        }
    }

    fn pose_mut(&mut self, mode: ProjectionMode) -> &mut CameraPose {
        match mode {
            ProjectionMode::Orthographic => &mut self.ortho.pose,
            ProjectionMode::Perspective => &mut self.perspective.pose,
            ProjectionMode::ExtremePerspective => &mut self.extreme.pose,
        }
    }

    fn switch_to(&mut self, to: ProjectionMode) -> ModeSwitch {
        let from = self.mode;
        let pose = self.pose_of(from);
        *self.pose_mut(to) = pose;
        if to == ProjectionMode::ExtremePerspective && from != ProjectionMode::ExtremePerspective {
            self.before_hyper = from;
        }
        self.mode = to;
        log::info!("[camera] {} -> {}", from.label(), to.label());
        ModeSwitch { from, to }
    }

    pub fn toggle_anaglyph(&mut self) -> ModeSwitch {
        let to = if self.mode == ProjectionMode::Perspective {
            ProjectionMode::Orthographic
        } else {
            ProjectionMode::Perspective
        };
        self.switch_to(to)
    }

    pub fn toggle_hyper(&mut self) -> ModeSwitch {
        let to = if self.mode == ProjectionMode::ExtremePerspective {
            self.before_hyper
        } else {
            ProjectionMode::ExtremePerspective
        };
        self.switch_to(to)
    }

    /// Recomputes every projection for the new viewport and recentres on the grid.
    pub fn resize(&mut self, viewport: PhysicalSize<u32>, grid_center: Vec3) {
        self.viewport = viewport;
        self.ortho.resize(viewport);
        self.perspective.resize(viewport);
        self.extreme.resize(viewport);
        self.pivot_center = grid_center;
        let pose = self.pose_mut(self.mode);
        pose.position.x = grid_center.x;
        pose.position.y = grid_center.y;
    }

    /// Puts every camera square in front of the grid centre, far enough for the perspective
    /// camera to frame the viewport height.
    pub fn frame_grid(&mut self, grid_center: Vec3) {
        self.pivot_center = grid_center;
        let distance = self.perspective.framing_distance(self.viewport.height.max(1) as f32);
        let pose = CameraPose {
            position: Vec3::new(grid_center.x, grid_center.y, grid_center.z + distance),
            rotation: glam::Quat::IDENTITY,
        };
        self.ortho.pose = pose;
        self.perspective.pose = pose;
        self.extreme.pose = pose;
    }

    pub fn reset_view(&mut self, grid_center: Vec3) {
        self.zoom = 1.0_f32.clamp(self.zoom_limits.0, self.zoom_limits.1);
        self.pivot.reset();
        self.frame_grid(grid_center);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(self.zoom_limits.0, self.zoom_limits.1);
    }

    /// Wheel delta in lines; positive scrolls zoom in.
    pub fn apply_wheel(&mut self, delta: f32) {
        let multiplier = (delta * self.wheel_zoom_step).exp();
        self.set_zoom(self.zoom * multiplier);
    }

    /// Two-finger distance change, as a fraction (0.1 = fingers 10% further apart).
    pub fn apply_pinch(&mut self, delta: f32) {
        self.set_zoom(self.zoom * (1.0 + delta).max(0.01));
    }

    /// Moves the active camera against a pointer drag in pixels, scaled by 1/zoom.
    pub fn pan(&mut self, delta_pixels: Vec2) {
        let zoom = self.zoom;
        let pose = self.pose_mut(self.mode);
        pose.position.x -= delta_pixels.x / zoom;
        pose.position.y += delta_pixels.y / zoom;
    }

    pub fn rotate(&mut self, delta_pixels: Vec2) {
        self.pivot.rotate(delta_pixels * self.rotate_sensitivity);
    }

    pub fn pivot_matrix(&self) -> Mat4 {
        self.pivot.matrix(self.pivot_center)
    }

    pub fn view_projection(&self) -> Mat4 {
        match self.mode {
            ProjectionMode::Orthographic => self.ortho.view_projection(self.zoom),
            ProjectionMode::Perspective => self.perspective.view_projection(self.zoom),
            ProjectionMode::ExtremePerspective => self.extreme.view_projection(self.zoom),
        }
    }

    /// World-space ray through a normalised device coordinate for the active camera.
    pub fn screen_ray(&self, ndc: Vec2) -> Option<(Vec3, Vec3)> {
        match self.mode {
            ProjectionMode::Orthographic => self.ortho.screen_ray(ndc, self.zoom),
            ProjectionMode::Perspective => self.perspective.screen_ray(ndc, self.zoom),
            ProjectionMode::ExtremePerspective => self.extreme.screen_ray(ndc, self.zoom),
        }
    }

    pub fn frame(&self) -> CameraFrame {
        let stereo = (self.mode == ProjectionMode::Perspective)
            .then(|| self.perspective.stereo_view_projections(self.zoom, self.eye_separation));
        CameraFrame {
            mode: self.mode,
            view_projection: self.view_projection(),
            stereo,
            pivot: self.pivot_matrix(),
            zoom: self.zoom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> CameraRig {
        CameraRig::new(&CameraConfig::default(), PhysicalSize::new(1280, 720), Vec3::new(600.0, -380.0, -80.0))
    }

    #[test]
    fn anaglyph_toggle_flips_and_copies_the_pose() {
        let mut rig = rig();
        rig.pan(Vec2::new(40.0, 0.0));
        let before = rig.pose();
        let switch = rig.toggle_anaglyph();
        assert_eq!(switch, ModeSwitch { from: ProjectionMode::Orthographic, to: ProjectionMode::Perspective });
        assert_eq!(rig.pose(), before);
        assert!(rig.frame().stereo.is_some());
        rig.toggle_anaglyph();
        assert_eq!(rig.mode(), ProjectionMode::Orthographic);
        assert!(rig.frame().stereo.is_none());
    }

    #[test]
    fn hyper_toggle_returns_to_the_previous_mode() {
        let mut rig = rig();
        rig.toggle_anaglyph();
        let enter = rig.toggle_hyper();
        assert!(enter.entered_hyper());
        let exit = rig.toggle_hyper();
        assert!(exit.left_hyper());
        assert_eq!(rig.mode(), ProjectionMode::Perspective);
    }

    #[test]
    fn last_toggle_wins() {
        let mut rig = rig();
        rig.toggle_hyper();
        let switch = rig.toggle_anaglyph();
        assert!(switch.left_hyper());
        assert_eq!(rig.mode(), ProjectionMode::Perspective);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut rig = rig();
        for _ in 0..200 {
            rig.apply_wheel(5.0);
        }
        assert_eq!(rig.zoom(), ZOOM_MAX);
        for _ in 0..200 {
            rig.apply_pinch(-0.9);
        }
        assert_eq!(rig.zoom(), ZOOM_MIN);
    }

    #[test]
    fn pan_is_scaled_by_inverse_zoom() {
        let mut rig = rig();
        rig.set_zoom(2.0);
        let x = rig.pose().position.x;
        rig.pan(Vec2::new(100.0, 0.0));
        assert!((rig.pose().position.x - (x - 50.0)).abs() < 1e-3);
    }
}
