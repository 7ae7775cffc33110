//! Editor host: a winit window running the egui panels over a 3D path preview.

use crate::config::DollyConfig;
use crate::context::RenderContext;
use crate::overlay::PathOverlay;
use crate::panels::{PathEditor, PathEditorEvent, PlaybackAction, PlaybackPanel};
use crate::projection::pick_keyframe;
use anyhow::{Context, Result};
use dolly_core::Vec3;
use dolly_path::{load_path, save_path, Camera, ObjectPath};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::{Window, WindowId};

/// Screen-space radius for clicking a keyframe marker, in points
const PICK_RADIUS: f32 = 10.0;
const STATUS_DURATION: Duration = Duration::from_secs(3);
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.08,
    g: 0.08,
    b: 0.1,
    a: 1.0,
};

/// Open the editor on `path_file`. A missing file starts an empty path that
/// is written on the first save.
pub fn run(path_file: &Path, watch: bool, config: DollyConfig) -> Result<()> {
    let path = if path_file.exists() {
        load_path(path_file)
            .with_context(|| format!("Failed to load path file {}", path_file.display()))?
    } else {
        let name = path_file
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.trim_end_matches(".path"))
            .unwrap_or("path");
        tracing::info!(
            "{} does not exist yet, starting an empty path",
            path_file.display()
        );
        ObjectPath::new(name)
    };

    tracing::info!(
        "Loaded path '{}' ({} keyframes)",
        path.name(),
        path.key_frame_count()
    );

    let reload = Arc::new(AtomicBool::new(false));
    let _watcher = if watch {
        let debouncer = watch_path_file(path_file, Arc::clone(&reload))?;
        tracing::info!("Watching {} for changes", path_file.display());
        Some(debouncer)
    } else {
        None
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = EditorApp::new(path_file.to_path_buf(), path, config, reload);
    event_loop.run_app(&mut app)?;

    Ok(())
}

/// Set `reload` whenever the file changes on disk.
///
/// The parent directory is watched rather than the file itself so that
/// editors which save by rename, and files created after startup, are seen.
fn watch_path_file(
    path_file: &Path,
    reload: Arc<AtomicBool>,
) -> Result<Debouncer<RecommendedWatcher>> {
    let file_name = path_file
        .file_name()
        .context("Path file has no file name")?
        .to_os_string();
    let dir = path_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;
    debouncer
        .watcher()
        .watch(dir, RecursiveMode::NonRecursive)?;

    std::thread::spawn(move || {
        for result in rx {
            match result {
                Ok(events) => {
                    if events
                        .iter()
                        .any(|e| e.path.file_name() == Some(file_name.as_os_str()))
                    {
                        reload.store(true, Ordering::SeqCst);
                    }
                }
                Err(e) => {
                    tracing::warn!("Watch error: {:?}", e);
                }
            }
        }
    });

    Ok(debouncer)
}

/// What the UI pass produced, applied once egui has released its borrows.
#[derive(Default)]
struct FrameOutput {
    editor_events: Vec<PathEditorEvent>,
    playback_actions: Vec<PlaybackAction>,
    picked: Option<usize>,
}

pub struct EditorApp {
    window: Option<Arc<Window>>,
    render_context: Option<RenderContext>,
    egui_ctx: egui::Context,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,

    config: DollyConfig,
    path_file: PathBuf,
    path: ObjectPath,
    /// Path as last loaded or saved; the path is modified when it differs
    saved: ObjectPath,
    camera: Camera,
    editor: PathEditor,
    playback: PlaybackPanel,
    overlay: PathOverlay,

    reload: Arc<AtomicBool>,
    modifiers: ModifiersState,
    last_frame_time: Instant,
    status_message: Option<(String, Instant)>,
    exit_requested: bool,
}

impl EditorApp {
    fn new(
        path_file: PathBuf,
        path: ObjectPath,
        config: DollyConfig,
        reload: Arc<AtomicBool>,
    ) -> Self {
        let editor = PathEditor::new(&path).with_drag_speed(config.viewer.drag_speed);
        let playback = PlaybackPanel::new(config.playback.speed);
        let mut overlay = PathOverlay::new();
        overlay.rebuild(&path, config.viewer.overlay_samples);

        Self {
            window: None,
            render_context: None,
            egui_ctx: egui::Context::default(),
            egui_winit: None,
            egui_renderer: None,
            config,
            path_file,
            saved: path.clone(),
            path,
            camera: Camera::new(),
            editor,
            playback,
            overlay,
            reload,
            modifiers: ModifiersState::empty(),
            last_frame_time: Instant::now(),
            status_message: None,
            exit_requested: false,
        }
    }

    fn is_modified(&self) -> bool {
        self.path != self.saved
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let file_label = self
            .path_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let window_attrs = Window::default_attributes()
            .with_title(format!("Dolly Path Editor - {}", file_label))
            .with_inner_size(PhysicalSize::new(
                self.config.viewer.window_width,
                self.config.viewer.window_height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("Failed to create editor window")?,
        );
        self.window = Some(window.clone());

        let render_context = pollster::block_on(RenderContext::new(window.clone()))
            .context("Failed to initialize editor render context")?;

        self.frame_path();

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &render_context.device,
            render_context.config.format,
            None,
            1,
            false,
        );

        self.render_context = Some(render_context);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        Ok(())
    }

    /// Point the orbit camera at the middle of the keyframes.
    fn frame_path(&mut self) {
        let frames = self.path.key_frames();
        if frames.is_empty() {
            self.camera.update_orbit();
            return;
        }
        let (min, max) = frames.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), k| (min.min(k.position), max.max(k.position)),
        );
        self.camera.target = (min + max) * 0.5;
        self.camera.distance = ((max - min).length() * 1.5).clamp(10.0, 500.0);
        self.camera.update_orbit();
    }

    fn render(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame_time).as_secs_f32().min(0.1);
        self.last_frame_time = now;

        if let Some(frame) = self.playback.advance(&self.path, dt) {
            self.camera.apply_keyframe(&frame);
        }

        let Some(window) = self.window.clone() else {
            return;
        };
        let Some(output) = self.acquire_frame() else {
            return;
        };
        let Some((full_output, frame)) = self.run_ui(&window) else {
            return;
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.paint(&window, &view, full_output);
        output.present();

        self.handle_frame_output(frame);
    }

    fn acquire_frame(&self) -> Option<wgpu::SurfaceTexture> {
        let context = self.render_context.as_ref()?;
        match context.surface.get_current_texture() {
            Ok(output) => Some(output),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                context.reconfigure();
                None
            }
            Err(e) => {
                tracing::error!("Surface error: {:?}", e);
                None
            }
        }
    }

    fn run_ui(&mut self, window: &Window) -> Option<(egui::FullOutput, FrameOutput)> {
        let status = self.status_line();
        let egui_winit = self.egui_winit.as_mut()?;
        let raw_input = egui_winit.take_egui_input(window);

        // Split borrows so the UI closure can hold them all at once
        let path = &mut self.path;
        let editor = &mut self.editor;
        let playback = &mut self.playback;
        let overlay = &self.overlay;
        let camera = &mut self.camera;
        let viewer = &self.config.viewer;
        let mut frame = FrameOutput::default();

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::SidePanel::left("playback_panel")
                .default_width(240.0)
                .resizable(true)
                .show(ctx, |ui| {
                    frame.playback_actions = playback.ui(ui, path);
                });

            egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(&status);
                    ui.separator();
                    ui.label(format!("{} keyframes", path.key_frame_count()));
                    ui.separator();
                    ui.label(format!("t = {:.2}s", playback.time));
                });
            });

            egui::CentralPanel::default()
                .frame(egui::Frame::none())
                .show(ctx, |ui| {
                    let rect = ui.max_rect();
                    if rect.height() > 0.0 {
                        camera.aspect = rect.width() / rect.height();
                    }

                    let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
                    if response.clicked() {
                        if let Some(pointer) = response.interact_pointer_pos() {
                            frame.picked = pick_keyframe(camera, rect, path, pointer, PICK_RADIUS);
                        }
                    }
                    if response.dragged_by(egui::PointerButton::Middle) {
                        let delta = response.drag_delta();
                        camera.orbit_horizontal(-delta.x * viewer.orbit_sensitivity);
                        camera.orbit_vertical(-delta.y * viewer.orbit_sensitivity);
                    }
                    if response.dragged_by(egui::PointerButton::Secondary) {
                        let delta = response.drag_delta();
                        camera.pan(
                            -delta.x * viewer.pan_sensitivity,
                            delta.y * viewer.pan_sensitivity,
                        );
                    }
                    if response.hovered() {
                        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
                        if scroll != 0.0 {
                            camera.zoom(scroll / 50.0);
                        }
                    }

                    let selected =
                        (path.key_frame_count() > 0).then_some(editor.active_frame());
                    let playhead = path.frame_at(playback.time).map(|k| k.position);
                    overlay.draw(
                        &ui.painter_at(rect),
                        camera,
                        rect,
                        path,
                        selected,
                        playhead,
                    );
                });

            frame.editor_events = editor.show(ctx, path, camera);
        });

        Some((full_output, frame))
    }

    fn paint(&mut self, window: &Window, target_view: &wgpu::TextureView, full_output: egui::FullOutput) {
        let (Some(context), Some(egui_winit), Some(egui_renderer)) = (
            self.render_context.as_ref(),
            self.egui_winit.as_mut(),
            self.egui_renderer.as_mut(),
        ) else {
            return;
        };

        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [context.config.width, context.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui Encoder"),
            });

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(&context.device, &context.queue, *id, image_delta);
        }

        egui_renderer.update_buffers(
            &context.device,
            &context.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        context.queue.submit(std::iter::once(encoder.finish()));

        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }
    }

    fn handle_frame_output(&mut self, frame: FrameOutput) {
        let mut rebuild_overlay = false;

        for action in frame.playback_actions {
            match action {
                PlaybackAction::Scrubbed => {
                    if let Some(pose) = self.path.frame_at(self.playback.time) {
                        self.camera.apply_keyframe(&pose);
                    }
                }
                PlaybackAction::InterpolationChanged => rebuild_overlay = true,
            }
        }

        let mut events = frame.editor_events;
        if let Some(index) = frame.picked {
            self.editor.set_active_frame(&self.path, index);
            events.extend(self.editor.take_events());
        }

        for event in events {
            match event {
                PathEditorEvent::FrameChanged => {
                    rebuild_overlay = true;
                    if self.playback.view_selected {
                        if let Some(frame) = self.path.key_frame(self.editor.active_frame()) {
                            self.camera.apply_keyframe(frame);
                        }
                    }
                }
                PathEditorEvent::KeyframesChanged => rebuild_overlay = true,
                PathEditorEvent::EditComplete => {
                    // A failed save keeps the window open with the error in the status bar
                    if !self.is_modified() || self.save() {
                        tracing::info!("Path editor closed");
                        self.exit_requested = true;
                    }
                }
            }
        }

        if rebuild_overlay {
            self.overlay
                .rebuild(&self.path, self.config.viewer.overlay_samples);
        }
    }

    /// Write the path to its file. Returns false if the write failed.
    fn save(&mut self) -> bool {
        match save_path(&self.path_file, &self.path) {
            Ok(()) => {
                tracing::info!("Saved path: {}", self.path_file.display());
                self.saved = self.path.clone();
                self.set_status("Saved!");
                true
            }
            Err(e) => {
                tracing::error!("Save failed: {}", e);
                self.set_status(format!("Save failed: {}", e));
                false
            }
        }
    }

    fn check_reload(&mut self) {
        if !self.reload.swap(false, Ordering::SeqCst) {
            return;
        }
        if self.is_modified() {
            tracing::warn!(
                "{} changed on disk, keeping unsaved edits",
                self.path_file.display()
            );
            self.set_status("File changed on disk (unsaved edits kept)");
            return;
        }

        match load_path(&self.path_file) {
            Ok(path) if path == self.path => {}
            Ok(path) => {
                tracing::info!("Reloaded path: {}", self.path_file.display());
                self.path = path;
                self.saved = self.path.clone();
                self.editor.sync_to_path(&self.path);
                self.overlay
                    .rebuild(&self.path, self.config.viewer.overlay_samples);
                self.set_status("Reloaded");
            }
            Err(e) => {
                tracing::warn!("Failed to reload path: {}", e);
            }
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    fn status_line(&self) -> String {
        let mut line = self.path_file.display().to_string();
        if self.is_modified() {
            line.push_str(" *");
        }
        if let Some((message, at)) = &self.status_message {
            if at.elapsed() < STATUS_DURATION {
                line.push_str("  ");
                line.push_str(message);
            }
        }
        line
    }

    /// Global shortcuts. Returns true if the key was handled.
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::KeyS if self.modifiers.control_key() => {
                self.save();
                true
            }
            // Leave Space to focused text fields
            KeyCode::Space if !self.egui_ctx.wants_keyboard_input() => {
                self.playback.toggle_play(&self.path);
                true
            }
            _ => false,
        }
    }
}

impl ApplicationHandler for EditorApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.initialize(event_loop) {
                tracing::error!("Failed to initialize editor: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::ModifiersChanged(mods) = &event {
            self.modifiers = mods.state();
        }

        if let WindowEvent::KeyboardInput {
            event: ref key_event,
            ..
        } = event
        {
            if key_event.state == ElementState::Pressed && !key_event.repeat {
                if let PhysicalKey::Code(code) = key_event.physical_key {
                    if self.handle_key(code) {
                        return;
                    }
                }
            }
        }

        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                if self.is_modified() {
                    tracing::warn!("Closing with unsaved changes to {}", self.path_file.display());
                }
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(context) = &mut self.render_context {
                    context.resize(new_size);
                }
            }

            WindowEvent::RedrawRequested => {
                self.check_reload();
                self.render();
                if self.exit_requested {
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_frames() -> EditorApp {
        let mut path = ObjectPath::new("orbit");
        path.add_key_frame(0.0, Vec3::new(-10.0, 2.0, 0.0), Vec3::ZERO, Vec3::Y);
        path.add_key_frame(4.0, Vec3::new(10.0, 2.0, 0.0), Vec3::ZERO, Vec3::Y);
        let file = std::env::temp_dir()
            .join(format!("dolly_app_test_{}", uuid::Uuid::new_v4()))
            .join("orbit.path.toml");
        EditorApp::new(
            file,
            path,
            DollyConfig::default(),
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn modified_tracks_difference_from_saved() {
        let mut app = app_with_frames();
        assert!(!app.is_modified());
        app.path.set_name("renamed");
        assert!(app.is_modified());
        assert!(app.status_line().ends_with(" *"));
    }

    #[test]
    fn picking_selects_frame_and_snaps_camera_when_following() {
        let mut app = app_with_frames();
        app.playback.view_selected = true;
        app.handle_frame_output(FrameOutput {
            picked: Some(1),
            ..Default::default()
        });

        assert_eq!(app.editor.active_frame(), 1);
        assert_eq!(app.camera.position, Vec3::new(10.0, 2.0, 0.0));
        assert_eq!(app.camera.target, Vec3::ZERO);
        assert!(!app.exit_requested);
    }

    #[test]
    fn following_degenerate_frame_keeps_camera() {
        let mut app = app_with_frames();
        let eye = Vec3::new(0.0, 3.0, 0.0);
        app.path.add_key_frame(6.0, eye, eye, Vec3::Y);
        app.playback.view_selected = true;
        let before = app.camera.clone();

        app.handle_frame_output(FrameOutput {
            picked: Some(2),
            ..Default::default()
        });

        assert_eq!(app.editor.active_frame(), 2);
        assert_eq!(app.camera, before);
        assert!(app.camera.view_projection_matrix().is_finite());
    }

    #[test]
    fn edit_complete_saves_modified_path_and_exits() {
        let mut app = app_with_frames();
        let dir = app.path_file.parent().unwrap().to_path_buf();
        std::fs::create_dir_all(&dir).unwrap();

        app.path.set_animation_repeat(true);
        app.handle_frame_output(FrameOutput {
            editor_events: vec![PathEditorEvent::EditComplete],
            ..Default::default()
        });

        assert!(app.exit_requested);
        assert!(!app.is_modified());
        let reloaded = load_path(&app.path_file).unwrap();
        assert!(reloaded.is_repeat_on());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn failed_save_keeps_editor_open() {
        let mut app = app_with_frames();
        // The temp directory is never created, so the write fails
        assert!(!app.path_file.parent().unwrap().exists());

        app.path.set_name("edited");
        app.handle_frame_output(FrameOutput {
            editor_events: vec![PathEditorEvent::EditComplete],
            ..Default::default()
        });

        assert!(!app.exit_requested);
        assert!(app.is_modified());
        assert!(app.status_line().contains("Save failed"));
    }

    #[test]
    fn closing_unmodified_path_exits_without_writing() {
        let mut app = app_with_frames();
        app.handle_frame_output(FrameOutput {
            editor_events: vec![PathEditorEvent::EditComplete],
            ..Default::default()
        });

        assert!(app.exit_requested);
        assert!(!app.path_file.exists());
    }

    #[test]
    fn reload_replaces_unmodified_path() {
        let mut app = app_with_frames();
        let dir = app.path_file.parent().unwrap().to_path_buf();
        std::fs::create_dir_all(&dir).unwrap();

        let mut on_disk = app.path.clone();
        on_disk.add_key_frame(8.0, Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO, Vec3::Y);
        save_path(&app.path_file, &on_disk).unwrap();

        app.reload.store(true, Ordering::SeqCst);
        app.check_reload();
        assert_eq!(app.path.key_frame_count(), 3);
        assert!(!app.is_modified());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn reload_keeps_unsaved_edits() {
        let mut app = app_with_frames();
        app.path.set_name("edited");

        app.reload.store(true, Ordering::SeqCst);
        app.check_reload();
        assert_eq!(app.path.name(), "edited");
        assert!(!app.reload.load(Ordering::SeqCst));
    }
}
