use crate::config::HyperConfig;
use glam::{Vec3, Vec4};

/// Continuous rotation through the fourth axis. Each cell is lifted into 4-space with `w = 0`,
/// rotated in the XW and ZW planes by the current phase, then projected back with a perspective
/// divide on `w` and a radial fisheye push.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperRotation {
    phase: f32,
    phase_step: f32,
    distortion: f32,
    projection_distance: f32,
}

impl HyperRotation {
    pub fn new(config: &HyperConfig) -> Self {
        Self {
            phase: 0.0,
            phase_step: config.phase_step,
            distortion: config.distortion,
            projection_distance: config.projection_distance.max(2.0),
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn advance(&mut self) {
        self.phase = crate::wrap_angle(self.phase + self.phase_step);
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Projects `point` (relative to `center`, normalised by `scale`) through the rotated 4-space
    /// and back. At phase zero the result equals the input apart from the fisheye term. Points
    /// within `scale` of the centre never reach the pole of the divide.
    pub fn project(&self, point: Vec3, center: Vec3, scale: f32) -> Vec3 {
        if scale <= f32::EPSILON {
            return point;
        }
        let local = (point - center) / scale;
        let lifted = Vec4::new(local.x, local.y, local.z, 0.0);
        let rotated = rotate_zw(rotate_xw(lifted, self.phase), self.phase * 0.5);
        let divide = self.projection_distance / (self.projection_distance - rotated.w);
        let projected = rotated.truncate() * divide;
        let radius = projected.length();
        let fisheye = 1.0 + self.distortion * radius * radius / (1.0 + radius * radius);
        center + projected * fisheye * scale
    }
}

fn rotate_xw(v: Vec4, angle: f32) -> Vec4 {
    let (s, c) = angle.sin_cos();
    Vec4::new(v.x * c - v.w * s, v.y, v.z, v.x * s + v.w * c)
}

fn rotate_zw(v: Vec4, angle: f32) -> Vec4 {
    let (s, c) = angle.sin_cos();
    Vec4::new(v.x, v.y, v.z * c - v.w * s, v.z * s + v.w * c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HyperConfig {
        HyperConfig { phase_step: 0.1, distortion: 0.35, projection_distance: 4.0 }
    }

    #[test]
    fn center_is_a_fixed_point() {
        let mut hyper = HyperRotation::new(&config());
        for _ in 0..7 {
            hyper.advance();
        }
        let center = Vec3::new(10.0, -5.0, -20.0);
        assert!(hyper.project(center, center, 100.0).distance(center) < 1e-4);
    }

    #[test]
    fn rotation_distorts_off_center_points() {
        let mut hyper = HyperRotation::new(&config());
        let point = Vec3::new(150.0, 0.0, 0.0);
        let at_rest = hyper.project(point, Vec3::ZERO, 100.0);
        for _ in 0..5 {
            hyper.advance();
        }
        let moved = hyper.project(point, Vec3::ZERO, 100.0);
        assert!(at_rest.distance(moved) > 1.0);
        assert!(moved.is_finite());
        hyper.reset();
        assert_eq!(hyper.phase(), 0.0);
    }

    #[test]
    fn unit_radius_points_never_cross_the_pole() {
        let mut hyper = HyperRotation::new(&HyperConfig { projection_distance: 0.5, ..config() });
        let points = [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z, Vec3::new(0.6, 0.0, -0.8)];
        for _ in 0..700 {
            hyper.advance();
            for point in points {
                let projected = hyper.project(point * 300.0, Vec3::ZERO, 300.0);
                assert!(projected.is_finite());
                assert!(projected.length() <= 300.0 * 3.0, "{point} went to {projected}");
            }
        }
    }
}
