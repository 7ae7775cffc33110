//! Dolly Editor - interactive keyframe editing for camera paths
//!
//! The `PathEditor` panel edits an `ObjectPath` through egui widgets and
//! reports what changed as `PathEditorEvent`s. `app::run` hosts it in a
//! winit/wgpu window with a playback panel and a viewport overlay.

pub mod app;
pub mod config;
pub mod context;
pub mod overlay;
pub mod panels;
pub mod projection;
pub mod widgets;

pub use config::DollyConfig;
pub use panels::{PathEditor, PathEditorEvent, PlaybackAction, PlaybackPanel};
