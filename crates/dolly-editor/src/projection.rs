//! World-to-screen projection and keyframe picking for the viewport overlay.

use dolly_core::Vec3;
use dolly_path::{Camera, ObjectPath};

/// Project a world-space point into `viewport` (egui points).
/// Returns None if the point is behind the camera or the projection is not finite.
pub fn world_to_screen(camera: &Camera, viewport: egui::Rect, pos: Vec3) -> Option<egui::Pos2> {
    let clip = camera.view_projection_matrix() * pos.extend(1.0);
    if !clip.is_finite() || clip.w <= 0.001 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;

    Some(egui::pos2(
        viewport.min.x + (ndc_x + 1.0) * 0.5 * viewport.width(),
        viewport.min.y + (1.0 - ndc_y) * 0.5 * viewport.height(),
    ))
}

/// Index of the keyframe whose marker is closest to `pointer`, within `radius` points.
pub fn pick_keyframe(
    camera: &Camera,
    viewport: egui::Rect,
    path: &ObjectPath,
    pointer: egui::Pos2,
    radius: f32,
) -> Option<usize> {
    path.key_frames()
        .iter()
        .enumerate()
        .filter_map(|(i, frame)| {
            let screen = world_to_screen(camera, viewport, frame.position)?;
            let dist = screen.distance(pointer);
            (dist <= radius).then_some((i, dist))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1600.0, 900.0))
    }

    fn front_camera() -> Camera {
        let mut camera = Camera::new();
        camera.aspect = 1600.0 / 900.0;
        camera.look_from(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        camera
    }

    #[test]
    fn target_lands_in_viewport_center() {
        let screen = world_to_screen(&front_camera(), viewport(), Vec3::ZERO).unwrap();
        assert!((screen.x - 800.0).abs() < 0.01);
        assert!((screen.y - 450.0).abs() < 0.01);
    }

    #[test]
    fn points_behind_camera_are_culled() {
        assert!(world_to_screen(&front_camera(), viewport(), Vec3::new(0.0, 0.0, 20.0)).is_none());
    }

    #[test]
    fn up_is_toward_top_of_screen() {
        let screen = world_to_screen(&front_camera(), viewport(), Vec3::Y).unwrap();
        assert!(screen.y < 450.0);
    }

    #[test]
    fn picks_nearest_marker_in_radius() {
        let mut path = ObjectPath::new("pick");
        path.add_key_frame(0.0, Vec3::ZERO, Vec3::Z, Vec3::Y);
        path.add_key_frame(1.0, Vec3::new(3.0, 0.0, 0.0), Vec3::Z, Vec3::Y);
        let camera = front_camera();

        let center = egui::pos2(802.0, 449.0);
        assert_eq!(pick_keyframe(&camera, viewport(), &path, center, 8.0), Some(0));
        assert_eq!(
            pick_keyframe(&camera, viewport(), &path, egui::pos2(10.0, 10.0), 8.0),
            None
        );
    }

    #[test]
    fn degenerate_camera_projects_nothing() {
        let mut path = ObjectPath::new("pick");
        path.add_key_frame(0.0, Vec3::ZERO, Vec3::Z, Vec3::Y);

        // Eye on the target: the view matrix is all NaN
        let mut camera = front_camera();
        camera.position = Vec3::new(1.0, 2.0, 3.0);
        camera.target = camera.position;

        assert!(world_to_screen(&camera, viewport(), Vec3::ZERO).is_none());
        assert_eq!(
            pick_keyframe(&camera, viewport(), &path, egui::pos2(800.0, 450.0), 1.0e6),
            None
        );
    }
}
