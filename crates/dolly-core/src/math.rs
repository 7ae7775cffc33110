//! Look-at and Euler-angle helpers shared by the path model and the editor.
//!
//! Conventions: a camera basis is a `Mat3` whose columns are right, up and
//! forward (forward points from the eye toward the target). Euler angles are
//! `(yaw, pitch, roll)` composed as `Ry(yaw) * Rx(pitch) * Rz(roll)`, and
//! extraction uses that same order so the two round-trip.

use glam::{EulerRot, Mat3, Quat, Vec3};

/// Build the right/up/forward basis of an eye at `position` looking at `target`.
///
/// Returns `None` when `target == position` or when `up` is parallel to the
/// view direction.
pub fn look_at_basis(position: Vec3, target: Vec3, up: Vec3) -> Option<Mat3> {
    let forward = (target - position).try_normalize()?;
    let right = up.cross(forward).try_normalize()?;
    let up = forward.cross(right);
    Some(Mat3::from_cols(right, up, forward))
}

/// Extract `(yaw, pitch, roll)` in radians from a look-at pose.
pub fn euler_from_look_at(position: Vec3, target: Vec3, up: Vec3) -> Option<Vec3> {
    let basis = look_at_basis(position, target, up)?;
    let (yaw, pitch, roll) = Quat::from_mat3(&basis).to_euler(EulerRot::YXZ);
    Some(Vec3::new(yaw, pitch, roll))
}

/// Rotation matrix for yaw (Y), then pitch (X), then roll (Z). Radians.
pub fn yaw_pitch_roll(yaw: f32, pitch: f32, roll: f32) -> Mat3 {
    Mat3::from_euler(EulerRot::YXZ, yaw, pitch, roll)
}

/// Component-wise radians to degrees.
pub fn degrees(v: Vec3) -> Vec3 {
    Vec3::new(v.x.to_degrees(), v.y.to_degrees(), v.z.to_degrees())
}

/// Component-wise degrees to radians.
pub fn radians(v: Vec3) -> Vec3 {
    Vec3::new(v.x.to_radians(), v.y.to_radians(), v.z.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn identity_pose_has_canonical_basis() {
        let basis = look_at_basis(Vec3::ZERO, Vec3::Z, Vec3::Y).unwrap();
        assert!(approx(basis.x_axis, Vec3::X));
        assert!(approx(basis.y_axis, Vec3::Y));
        assert!(approx(basis.z_axis, Vec3::Z));
        assert!(approx(
            euler_from_look_at(Vec3::ZERO, Vec3::Z, Vec3::Y).unwrap(),
            Vec3::ZERO
        ));
    }

    #[test]
    fn degenerate_poses_have_no_basis() {
        assert!(look_at_basis(Vec3::ONE, Vec3::ONE, Vec3::Y).is_none());
        assert!(look_at_basis(Vec3::ZERO, Vec3::Y, Vec3::Y).is_none());
    }

    #[test]
    fn basis_is_orthonormal_for_skewed_up() {
        let basis = look_at_basis(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.0, 0.5, 8.0),
            Vec3::new(0.2, 1.0, 0.1),
        )
        .unwrap();
        assert!((basis.determinant() - 1.0).abs() < 1e-4);
        assert!(basis.x_axis.dot(basis.y_axis).abs() < 1e-5);
        assert!(basis.y_axis.dot(basis.z_axis).abs() < 1e-5);
    }

    #[test]
    fn yaw_pitch_roll_round_trips_through_look_at() {
        let angles = Vec3::new(0.7, -0.3, 0.25);
        let rot = yaw_pitch_roll(angles.x, angles.y, angles.z);
        let position = Vec3::new(3.0, 1.0, -2.0);

        let extracted =
            euler_from_look_at(position, position + rot.z_axis, rot.y_axis).unwrap();
        assert!(approx(extracted, angles), "got {extracted:?}");
    }

    #[test]
    fn yaw_turns_forward_toward_positive_x() {
        let rot = yaw_pitch_roll(std::f32::consts::FRAC_PI_2, 0.0, 0.0);
        assert!(approx(rot.z_axis, Vec3::X));
        assert!(approx(rot.y_axis, Vec3::Y));
    }

    #[test]
    fn degree_conversion_is_component_wise() {
        let v = Vec3::new(180.0, -90.0, 45.0);
        assert!(approx(degrees(radians(v)), v));
        assert!((radians(v).x - std::f32::consts::PI).abs() < 1e-6);
    }
}
