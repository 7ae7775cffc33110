//! Dolly Path - the data the path editor works on
//!
//! - `ObjectPath` / `Keyframe` - a time-ordered list of camera poses
//! - `Camera` - orbit camera exposing position / target / up
//! - Path files - TOML load and save

pub mod camera;
mod format;
mod loader;
pub mod path;

pub use camera::Camera;
pub use format::{PathFile, PathMetadata};
pub use loader::{load_path, load_path_string, save_path, save_path_string};
pub use path::{Interpolation, Keyframe, ObjectPath};
