//! Playback panel: previews the path by driving the viewer camera

use dolly_path::{Interpolation, Keyframe, ObjectPath};

/// Actions returned by the panel that the app must handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackAction {
    /// The time slider moved; the camera should jump to the new pose
    Scrubbed,
    /// Interpolation mode changed; overlays need re-sampling
    InterpolationChanged,
}

/// Preview transport state
pub struct PlaybackPanel {
    pub playing: bool,
    pub time: f32,
    pub speed: f32,
    /// Snap the camera to the selected keyframe whenever it changes
    pub view_selected: bool,
}

impl PlaybackPanel {
    pub fn new(speed: f32) -> Self {
        Self {
            playing: false,
            time: 0.0,
            speed,
            view_selected: false,
        }
    }

    /// Step the preview clock. Returns the pose to show while playing.
    pub fn advance(&mut self, path: &ObjectPath, dt: f32) -> Option<Keyframe> {
        if !self.playing {
            return None;
        }
        let (Some(first), Some(last)) = (path.key_frames().first(), path.key_frames().last())
        else {
            self.playing = false;
            return None;
        };

        self.time += dt * self.speed;
        let span = last.time - first.time;
        if path.is_repeat_on() && span > 0.0 {
            self.time = first.time + (self.time - first.time).rem_euclid(span);
        } else if self.time >= last.time {
            self.time = last.time;
            self.playing = false;
        }
        path.frame_at(self.time)
    }

    pub fn toggle_play(&mut self, path: &ObjectPath) {
        if self.playing {
            self.playing = false;
            return;
        }
        // Restart from the beginning once a non-looping path has finished
        if let (Some(first), Some(last)) = (path.key_frames().first(), path.key_frames().last()) {
            if !path.is_repeat_on() && self.time >= last.time {
                self.time = first.time;
            }
            self.playing = true;
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, path: &mut ObjectPath) -> Vec<PlaybackAction> {
        let mut actions = Vec::new();

        ui.heading("Playback");
        ui.separator();

        ui.label(format!("Keyframes: {}", path.key_frame_count()));
        ui.label(format!("Duration: {:.2}s", path.duration()));

        let mut interpolation = path.interpolation();
        egui::ComboBox::from_label("Interpolation")
            .selected_text(interpolation.label())
            .show_ui(ui, |ui| {
                for mode in Interpolation::ALL {
                    ui.selectable_value(&mut interpolation, mode, mode.label());
                }
            });
        if interpolation != path.interpolation() {
            path.set_interpolation(interpolation);
            actions.push(PlaybackAction::InterpolationChanged);
        }

        ui.separator();

        if let (Some(first), Some(last)) = (
            path.key_frames().first().map(|k| k.time),
            path.key_frames().last().map(|k| k.time),
        ) {
            ui.horizontal(|ui| {
                let label = if self.playing { "\u{23f8} Pause" } else { "\u{25b6} Play" };
                if ui.button(label).clicked() {
                    self.toggle_play(path);
                }
                if ui.button("\u{23ee} Rewind").clicked() {
                    self.time = first;
                    actions.push(PlaybackAction::Scrubbed);
                }
            });

            if ui
                .add(egui::Slider::new(&mut self.time, first..=last).text("Time"))
                .changed()
            {
                actions.push(PlaybackAction::Scrubbed);
            }
        } else {
            ui.label("Add a keyframe to preview the path.");
        }

        ui.horizontal(|ui| {
            ui.label("Speed:");
            ui.add(egui::DragValue::new(&mut self.speed).speed(0.05).range(0.05..=10.0));
        });

        ui.checkbox(&mut self.view_selected, "View selected frame");

        ui.separator();

        ui.collapsing("Controls", |ui| {
            ui.label("Left-click: select keyframe");
            ui.label("Middle-drag: orbit camera");
            ui.label("Right-drag: pan camera");
            ui.label("Scroll: zoom");
            ui.label("Space: play/pause");
            ui.label("Ctrl+S: save");
        });

        actions
    }
}
