//! egui panel for editing the keyframes of a camera path.
//!
//! The panel never owns the path or the camera: both are borrowed for one
//! `show` call. It keeps only the selection and a few scratch values, and
//! reports what happened through `PathEditorEvent`s.

use crate::widgets::vec3_drag;
use dolly_core::math::{degrees, euler_from_look_at, radians, yaw_pitch_roll};
use dolly_core::Vec3;
use dolly_path::{Camera, ObjectPath};

/// Notifications for the application that owns the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEditorEvent {
    /// Pose or selection of the active keyframe changed
    FrameChanged,
    /// Keyframes were added, removed or re-ordered
    KeyframesChanged,
    /// The user closed the editor
    EditComplete,
}

/// Keyframe rows changed during one frame
#[derive(Debug, Default, Clone, Copy)]
struct PropertyEdits {
    position: Option<Vec3>,
    target: Option<Vec3>,
    up: Option<Vec3>,
    /// Yaw, pitch, roll in degrees
    rotation: Option<Vec3>,
}

const PRESERVE_ROTATION_TIP: &str =
    "If checked, the target will also be updated when position is changed.";

/// Keyframe editor state for one editing session
pub struct PathEditor {
    active_frame: usize,
    frame_time: f32,
    /// Yaw, pitch, roll of the active frame in degrees
    active_frame_rot: Vec3,
    preserve_rotation: bool,
    drag_speed: f32,
    events: Vec<PathEditorEvent>,
}

impl PathEditor {
    pub fn new(path: &ObjectPath) -> Self {
        let mut editor = Self {
            active_frame: 0,
            frame_time: path.key_frame(0).map(|k| k.time).unwrap_or(0.0),
            active_frame_rot: Vec3::ZERO,
            preserve_rotation: false,
            drag_speed: 0.05,
            events: Vec::new(),
        };
        editor.update_active_frame_rotation_angles(path);
        editor
    }

    pub fn with_drag_speed(mut self, speed: f32) -> Self {
        self.drag_speed = speed;
        self
    }

    pub fn active_frame(&self) -> usize {
        self.active_frame
    }

    pub fn frame_time(&self) -> f32 {
        self.frame_time
    }

    pub fn set_frame_time(&mut self, time: f32) {
        self.frame_time = time.max(0.0);
    }

    /// Rotation of the active frame as (yaw, pitch, roll) degrees
    pub fn rotation_angles(&self) -> Vec3 {
        self.active_frame_rot
    }

    pub fn preserve_rotation(&self) -> bool {
        self.preserve_rotation
    }

    pub fn set_preserve_rotation(&mut self, preserve: bool) {
        self.preserve_rotation = preserve;
    }

    /// Drain notifications raised by direct operation calls.
    pub fn take_events(&mut self) -> Vec<PathEditorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Re-validate the selection after the path was replaced underneath the
    /// editor (e.g. reloaded from disk). Does not raise events.
    pub fn sync_to_path(&mut self, path: &ObjectPath) {
        self.clamp_active_frame(path);
        if let Some(frame) = path.key_frame(self.active_frame) {
            self.frame_time = frame.time;
        }
        self.update_active_frame_rotation_angles(path);
    }

    // --- Operations ---

    pub fn set_active_frame(&mut self, path: &ObjectPath, id: usize) {
        self.active_frame = id;
        if let Some(frame) = path.key_frame(id) {
            self.frame_time = frame.time;
        }
        self.update_active_frame_rotation_angles(path);
        self.events.push(PathEditorEvent::FrameChanged);
    }

    /// Add a keyframe at the scratch time, copying the active frame's pose
    /// (or a default pose on an empty path), and select it.
    pub fn add_frame(&mut self, path: &mut ObjectPath) {
        let index = match path.key_frame(self.active_frame).copied() {
            Some(current) => {
                path.add_key_frame(self.frame_time, current.position, current.target, current.up)
            }
            None => path.add_key_frame(self.frame_time, Vec3::ZERO, Vec3::Z, Vec3::Y),
        };
        tracing::debug!(index, time = self.frame_time, "added keyframe");
        self.events.push(PathEditorEvent::KeyframesChanged);
        self.set_active_frame(path, index);
    }

    /// Remove the active keyframe and select its neighbour.
    pub fn delete_frame(&mut self, path: &mut ObjectPath) {
        if path.key_frame_count() == 0 {
            return;
        }
        if path.remove_key_frame(self.active_frame).is_some() {
            tracing::debug!(index = self.active_frame, "removed keyframe");
        }
        self.events.push(PathEditorEvent::KeyframesChanged);

        self.active_frame = self
            .active_frame
            .min(path.key_frame_count().saturating_sub(1));
        if path.key_frame_count() > 0 {
            self.set_active_frame(path, self.active_frame);
        }
    }

    /// Move the active keyframe to the scratch time and follow it to its new index.
    pub fn update_frame_time(&mut self, path: &mut ObjectPath) {
        if path.key_frame_count() == 0 {
            return;
        }
        match path.set_frame_time(self.active_frame, self.frame_time) {
            Ok(index) => {
                self.events.push(PathEditorEvent::KeyframesChanged);
                self.set_active_frame(path, index);
            }
            Err(e) => tracing::warn!("Failed to update frame time: {}", e),
        }
    }

    /// Copy the camera pose into the active keyframe.
    pub fn move_to_camera(&mut self, path: &mut ObjectPath, camera: &Camera) {
        if path.key_frame_count() == 0 {
            return;
        }
        let i = self.active_frame;
        let result = path
            .set_frame_position(i, camera.position)
            .and_then(|_| path.set_frame_target(i, camera.target))
            .and_then(|_| path.set_frame_up(i, camera.up));
        match result {
            Ok(()) => {
                self.update_active_frame_rotation_angles(path);
                self.events.push(PathEditorEvent::FrameChanged);
            }
            Err(e) => tracing::warn!("Failed to move frame to camera: {}", e),
        }
    }

    pub fn set_position(&mut self, path: &mut ObjectPath, position: Vec3) {
        if self.apply_position(path, position) {
            self.events.push(PathEditorEvent::FrameChanged);
        }
    }

    pub fn set_target(&mut self, path: &mut ObjectPath, target: Vec3) {
        if self.apply_target(path, target) {
            self.update_active_frame_rotation_angles(path);
            self.events.push(PathEditorEvent::FrameChanged);
        }
    }

    pub fn set_up(&mut self, path: &mut ObjectPath, up: Vec3) {
        if self.apply_up(path, up) {
            self.update_active_frame_rotation_angles(path);
            self.events.push(PathEditorEvent::FrameChanged);
        }
    }

    /// Orient the active frame from (yaw, pitch, roll) degrees.
    pub fn set_rotation(&mut self, path: &mut ObjectPath, angles: Vec3) {
        self.active_frame_rot = angles;
        if self.apply_rotation(path) {
            self.events.push(PathEditorEvent::FrameChanged);
        }
    }

    pub fn set_path_name(&mut self, path: &mut ObjectPath, name: impl Into<String>) {
        path.set_name(name);
    }

    pub fn set_loop(&mut self, path: &mut ObjectPath, repeat: bool) {
        path.set_animation_repeat(repeat);
    }

    pub fn close(&mut self) {
        self.events.push(PathEditorEvent::EditComplete);
    }

    // --- Drawing ---

    /// Draw the editor window. Returns the notifications raised this frame.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        path: &mut ObjectPath,
        camera: &Camera,
    ) -> Vec<PathEditorEvent> {
        egui::Window::new("Path Editor")
            .default_pos([350.0, 400.0])
            .default_size([440.0, 400.0])
            .show(ctx, |ui| self.ui(ui, path, camera));
        self.take_events()
    }

    /// Draw the editor contents into an existing `Ui`.
    pub fn ui(&mut self, ui: &mut egui::Ui, path: &mut ObjectPath, camera: &Camera) {
        self.clamp_active_frame(path);

        if ui.button("Close Editor").clicked() {
            self.close();
            return;
        }
        ui.separator();

        self.edit_path_name(ui, path);
        self.edit_path_loop(ui, path);
        self.edit_active_frame_id(ui, path);

        ui.horizontal(|ui| {
            if ui.button("Add Frame").clicked() {
                self.add_frame(path);
            }
            if path.key_frame_count() > 0 && ui.button("Remove Frame").clicked() {
                self.delete_frame(path);
            }
        });
        ui.separator();

        self.edit_frame_time(ui);
        if path.key_frame_count() > 0 && ui.button("Update Current Frame Time").clicked() {
            self.update_frame_time(path);
        }
        ui.separator();

        self.edit_keyframe_properties(ui, path);
        if path.key_frame_count() > 0 && ui.button("Move Frame to Camera").clicked() {
            self.move_to_camera(path, camera);
        }
    }

    fn edit_path_name(&mut self, ui: &mut egui::Ui, path: &mut ObjectPath) {
        let mut name = path.name().to_string();
        ui.horizontal(|ui| {
            ui.label("Path Name");
            if ui.text_edit_singleline(&mut name).changed() {
                self.set_path_name(path, name);
            }
        });
    }

    fn edit_path_loop(&mut self, ui: &mut egui::Ui, path: &mut ObjectPath) {
        let mut repeat = path.is_repeat_on();
        if ui.checkbox(&mut repeat, "Loop Path").changed() {
            self.set_loop(path, repeat);
        }
    }

    fn edit_active_frame_id(&mut self, ui: &mut egui::Ui, path: &ObjectPath) {
        let count = path.key_frame_count();
        if count == 0 {
            return;
        }
        let mut id = self.active_frame;
        ui.horizontal(|ui| {
            ui.label("Selected Frame");
            if ui
                .add(egui::DragValue::new(&mut id).range(0..=count - 1))
                .changed()
            {
                self.set_active_frame(path, id);
            }
        });
    }

    fn edit_frame_time(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Frame Time");
            ui.add(
                egui::DragValue::new(&mut self.frame_time)
                    .speed(0.01)
                    .range(0.0..=f32::MAX)
                    .suffix(" s"),
            );
        });
    }

    fn edit_keyframe_properties(&mut self, ui: &mut egui::Ui, path: &mut ObjectPath) {
        let Some(frame) = path.key_frame(self.active_frame).copied() else {
            return;
        };

        let mut p = frame.position;
        let mut t = frame.target;
        let mut u = frame.up;
        let mut r = self.active_frame_rot;
        let mut edits = PropertyEdits::default();

        ui.checkbox(&mut self.preserve_rotation, "Preserve Rotation")
            .on_hover_text(PRESERVE_ROTATION_TIP);

        let speed = self.drag_speed as f64;
        if vec3_drag(ui, "Position", &mut p, speed, None) {
            edits.position = Some(p);
        }
        if vec3_drag(ui, "Target", &mut t, speed, None) {
            edits.target = Some(t);
        }
        if vec3_drag(ui, "Up", &mut u, speed, None) {
            edits.up = Some(u);
        }
        // Yaw-pitch-roll editing, handy for paths that don't drive a camera
        if vec3_drag(ui, "Rotation", &mut r, 0.1, Some(-360.0..=360.0)) {
            edits.rotation = Some(r);
        }

        self.apply_property_edits(path, edits);
    }

    /// Apply everything edited in one frame, raising at most one `FrameChanged`.
    fn apply_property_edits(&mut self, path: &mut ObjectPath, edits: PropertyEdits) {
        let mut dirty = false;
        let mut rotation_changed = false;

        if let Some(position) = edits.position {
            rotation_changed |= !self.preserve_rotation;
            dirty |= self.apply_position(path, position);
        }
        if let Some(target) = edits.target {
            rotation_changed = true;
            dirty |= self.apply_target(path, target);
        }
        if let Some(up) = edits.up {
            rotation_changed = true;
            dirty |= self.apply_up(path, up);
        }
        if rotation_changed {
            self.update_active_frame_rotation_angles(path);
        }
        if let Some(angles) = edits.rotation {
            self.active_frame_rot = angles;
            dirty |= self.apply_rotation(path);
        }

        if dirty {
            self.events.push(PathEditorEvent::FrameChanged);
        }
    }

    // --- Helpers ---

    fn apply_position(&mut self, path: &mut ObjectPath, position: Vec3) -> bool {
        let Some(frame) = path.key_frame(self.active_frame).copied() else {
            return false;
        };
        let i = self.active_frame;
        if self.preserve_rotation {
            // Offset measured from the pose before this edit
            let to_target = frame.target - frame.position;
            if let Err(e) = path.set_frame_target(i, position + to_target) {
                tracing::warn!("Failed to move target with position: {}", e);
            }
        }
        if let Err(e) = path.set_frame_position(i, position) {
            tracing::warn!("Failed to set frame position: {}", e);
            return false;
        }
        if !self.preserve_rotation {
            self.update_active_frame_rotation_angles(path);
        }
        true
    }

    fn apply_target(&mut self, path: &mut ObjectPath, target: Vec3) -> bool {
        match path.set_frame_target(self.active_frame, target) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to set frame target: {}", e);
                false
            }
        }
    }

    fn apply_up(&mut self, path: &mut ObjectPath, up: Vec3) -> bool {
        match path.set_frame_up(self.active_frame, up) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to set frame up: {}", e);
                false
            }
        }
    }

    fn apply_rotation(&mut self, path: &mut ObjectPath) -> bool {
        let Some(frame) = path.key_frame(self.active_frame).copied() else {
            return false;
        };
        let r = radians(self.active_frame_rot);
        let rot = yaw_pitch_roll(r.x, r.y, r.z);
        let i = self.active_frame;
        path.set_frame_up(i, rot.y_axis)
            .and_then(|_| path.set_frame_target(i, frame.position + rot.z_axis))
            .map_err(|e| tracing::warn!("Failed to apply rotation: {}", e))
            .is_ok()
    }

    fn update_active_frame_rotation_angles(&mut self, path: &ObjectPath) {
        let Some(frame) = path.key_frame(self.active_frame) else {
            return;
        };
        // Degenerate poses (target on the eye, up along the view) keep the last angles
        if let Some(angles) = euler_from_look_at(frame.position, frame.target, frame.up) {
            self.active_frame_rot = degrees(angles);
        }
    }

    fn clamp_active_frame(&mut self, path: &ObjectPath) {
        let count = path.key_frame_count();
        if self.active_frame >= count {
            self.active_frame = count.saturating_sub(1);
        }
    }
}
