//! Catmull-Rom interpolation used by cubic keyframe paths.

use glam::Vec3;

/// Catmull-Rom spline interpolation between `p1` and `p2`, with `p0` and
/// `p3` as the outer neighbours. `t` runs from 0 (at `p1`) to 1 (at `p2`).
pub fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_passes_through_inner_points() {
        let p0 = Vec3::new(-1.0, 0.0, 0.0);
        let p1 = Vec3::new(0.0, 1.0, 0.0);
        let p2 = Vec3::new(2.0, 1.0, 3.0);
        let p3 = Vec3::new(4.0, 0.0, 0.0);
        assert!((catmull_rom(p0, p1, p2, p3, 0.0) - p1).length() < 1e-6);
        assert!((catmull_rom(p0, p1, p2, p3, 1.0) - p2).length() < 1e-5);
    }

    #[test]
    fn collinear_evenly_spaced_points_interpolate_linearly() {
        let v = catmull_rom(
            Vec3::ZERO,
            Vec3::X,
            Vec3::X * 2.0,
            Vec3::X * 3.0,
            0.5,
        );
        assert!((v - Vec3::X * 1.5).length() < 1e-6);
    }
}
