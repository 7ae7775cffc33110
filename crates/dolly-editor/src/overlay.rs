//! Viewport overlay: the sampled path, keyframe markers and look directions.

use crate::projection::world_to_screen;
use dolly_core::Vec3;
use dolly_path::{Camera, ObjectPath};

const PATH_COLOR: egui::Color32 = egui::Color32::from_rgb(90, 170, 255);
const FRAME_COLOR: egui::Color32 = egui::Color32::from_rgb(230, 230, 230);
const SELECTED_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 210, 60);
const PLAYHEAD_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 90, 90);

/// Cached polyline through the path, rebuilt when keyframes change.
#[derive(Default)]
pub struct PathOverlay {
    points: Vec<Vec3>,
}

impl PathOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-sample the path into `samples` segments.
    pub fn rebuild(&mut self, path: &ObjectPath, samples: usize) {
        self.points.clear();
        let frames = path.key_frames();
        let (Some(first), Some(last)) = (frames.first(), frames.last()) else {
            return;
        };
        if frames.len() < 2 {
            self.points.push(first.position);
            return;
        }

        let samples = samples.max(frames.len());
        let span = last.time - first.time;
        for i in 0..samples {
            let t = first.time + span * i as f32 / samples as f32;
            if let Some(frame) = path.frame_at(t) {
                self.points.push(frame.position);
            }
        }
        // frame_at wraps at the end of a looping path, so add the end explicitly
        self.points.push(last.position);
    }

    pub fn sample_count(&self) -> usize {
        self.points.len()
    }

    pub fn draw(
        &self,
        painter: &egui::Painter,
        camera: &Camera,
        viewport: egui::Rect,
        path: &ObjectPath,
        selected: Option<usize>,
        playhead: Option<Vec3>,
    ) {
        let stroke = egui::Stroke::new(2.0, PATH_COLOR);
        for pair in self.points.windows(2) {
            if let (Some(a), Some(b)) = (
                world_to_screen(camera, viewport, pair[0]),
                world_to_screen(camera, viewport, pair[1]),
            ) {
                painter.line_segment([a, b], stroke);
            }
        }

        for (i, frame) in path.key_frames().iter().enumerate() {
            let Some(pos) = world_to_screen(camera, viewport, frame.position) else {
                continue;
            };
            let is_selected = selected == Some(i);
            let color = if is_selected { SELECTED_COLOR } else { FRAME_COLOR };

            let look = frame.position + (frame.target - frame.position).normalize_or_zero();
            if let Some(tip) = world_to_screen(camera, viewport, look) {
                painter.line_segment([pos, tip], egui::Stroke::new(1.5, color));
            }

            painter.circle_filled(pos, if is_selected { 7.0 } else { 5.0 }, color);
            painter.text(
                pos + egui::vec2(8.0, -8.0),
                egui::Align2::LEFT_BOTTOM,
                format!("{} ({:.2}s)", i, frame.time),
                egui::FontId::proportional(12.0),
                color,
            );
        }

        if let Some(head) = playhead.and_then(|p| world_to_screen(camera, viewport, p)) {
            painter.circle_stroke(head, 6.0, egui::Stroke::new(2.0, PLAYHEAD_COLOR));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuild_covers_both_ends() {
        let mut path = ObjectPath::new("line");
        path.add_key_frame(0.0, Vec3::ZERO, Vec3::Z, Vec3::Y);
        path.add_key_frame(2.0, Vec3::new(8.0, 0.0, 0.0), Vec3::Z, Vec3::Y);
        path.set_animation_repeat(true);

        let mut overlay = PathOverlay::new();
        overlay.rebuild(&path, 16);
        assert_eq!(overlay.sample_count(), 17);
        assert_eq!(overlay.points.first(), Some(&Vec3::ZERO));
        assert_eq!(overlay.points.last(), Some(&Vec3::new(8.0, 0.0, 0.0)));
    }

    #[test]
    fn rebuild_handles_short_paths() {
        let mut path = ObjectPath::new("short");
        let mut overlay = PathOverlay::new();
        overlay.rebuild(&path, 16);
        assert_eq!(overlay.sample_count(), 0);

        path.add_key_frame(1.0, Vec3::ONE, Vec3::Z, Vec3::Y);
        overlay.rebuild(&path, 16);
        assert_eq!(overlay.sample_count(), 1);
    }
}
