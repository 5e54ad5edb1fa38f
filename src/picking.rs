use crate::cell::CellCoord;
use crate::placement::CellPlacements;
use glam::{Mat4, Vec3};

pub fn ray_aabb_intersection(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_min: f32 = 0.0;
    let mut t_max: f32 = f32::INFINITY;
    let origin_arr = origin.to_array();
    let dir_arr = dir.to_array();
    let min_arr = min.to_array();
    let max_arr = max.to_array();
    for i in 0..3 {
        let o = origin_arr[i];
        let d = dir_arr[i];
        if d.abs() < 1e-6 {
            if o < min_arr[i] || o > max_arr[i] {
                return None;
            }
        } else {
            let inv_d = 1.0 / d;
            let mut t1 = (min_arr[i] - o) * inv_d;
            let mut t2 = (max_arr[i] - o) * inv_d;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
    }
    if t_max < 0.0 {
        return None;
    }
    let t_hit = if t_min >= 0.0 { t_min } else { t_max };
    Some((t_hit, origin + dir * t_hit))
}

/// Nearest cell hit by a world-space ray. The ray is taken into grid-local space through the
/// inverse pivot, then tested against every placed cell box.
pub fn pick_cell(
    origin: Vec3,
    dir: Vec3,
    pivot: Mat4,
    placements: &CellPlacements,
    cell_extent: Vec3,
) -> Option<CellCoord> {
    let inv = pivot.inverse();
    let local_origin = inv.transform_point3(origin);
    let local_dir = inv.transform_vector3(dir);
    if !local_origin.is_finite() || local_dir.length_squared() <= f32::EPSILON {
        return None;
    }
    let half = cell_extent * 0.5;
    let mut best: Option<(f32, CellCoord)> = None;
    for (coord, center) in placements.iter() {
        if let Some((t, _)) = ray_aabb_intersection(local_origin, local_dir, center - half, center + half) {
            // Ties go to the lower coordinate so picks are stable across hash orderings.
            let better = match best {
                None => true,
                Some((best_t, best_coord)) => t < best_t || (t == best_t && coord < best_coord),
            };
            if better {
                best = Some((t, coord));
            }
        }
    }
    best.map(|(_, coord)| coord)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_box_in_front() {
        let hit = ray_aabb_intersection(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::splat(-1.0), Vec3::splat(1.0));
        let (t, point) = hit.expect("box is hit");
        assert!((t - 4.0).abs() < 1e-5);
        assert!((point.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ray_misses_box_behind() {
        assert!(ray_aabb_intersection(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, Vec3::splat(-1.0), Vec3::splat(1.0))
            .is_none());
        assert!(ray_aabb_intersection(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::splat(-1.0), Vec3::splat(1.0))
            .is_none());
    }
}
