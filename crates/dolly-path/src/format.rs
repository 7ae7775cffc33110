//! Path file format definitions

use crate::path::{Interpolation, Keyframe, ObjectPath};
use serde::{Deserialize, Serialize};

/// Root structure of a path TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathFile {
    pub path: PathMetadata,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

/// Path-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathMetadata {
    pub name: String,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl PathFile {
    /// Build an `ObjectPath`, re-sorting keyframes. When two frames share a
    /// time the later entry wins.
    pub fn into_path(self) -> ObjectPath {
        let mut path = ObjectPath::new(self.path.name);
        path.set_animation_repeat(self.path.repeat);
        path.set_interpolation(self.path.interpolation);
        for frame in self.keyframes {
            path.add_key_frame(frame.time, frame.position, frame.target, frame.up);
        }
        path
    }
}

impl From<&ObjectPath> for PathFile {
    fn from(path: &ObjectPath) -> Self {
        Self {
            path: PathMetadata {
                name: path.name().to_string(),
                repeat: path.is_repeat_on(),
                interpolation: path.interpolation(),
            },
            keyframes: path.key_frames().to_vec(),
        }
    }
}
