//! GUI panels for the path editor

pub mod path_editor;
mod playback;

pub use path_editor::{PathEditor, PathEditorEvent};
pub use playback::{PlaybackAction, PlaybackPanel};
