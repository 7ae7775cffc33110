//! Path loading and saving (TOML)

use crate::format::PathFile;
use crate::path::ObjectPath;
use dolly_core::{DollyError, Result};
use std::fs;
use std::path::Path;

/// Load a path from a TOML file
pub fn load_path<P: AsRef<Path>>(file: P) -> Result<ObjectPath> {
    let content = fs::read_to_string(file.as_ref())?;
    let path = load_path_string(&content)?;
    tracing::debug!(
        file = %file.as_ref().display(),
        keyframes = path.key_frame_count(),
        "loaded path"
    );
    Ok(path)
}

/// Load a path from a TOML string
pub fn load_path_string(content: &str) -> Result<ObjectPath> {
    let file: PathFile = toml::from_str(content)?;

    for (i, frame) in file.keyframes.iter().enumerate() {
        let finite = frame.time.is_finite()
            && frame.position.is_finite()
            && frame.target.is_finite()
            && frame.up.is_finite();
        if !finite {
            return Err(DollyError::InvalidPathFile(format!(
                "keyframe {} has a non-finite value",
                i
            )));
        }
        if frame.time < 0.0 {
            return Err(DollyError::InvalidPathFile(format!(
                "keyframe {} has negative time {}",
                i, frame.time
            )));
        }
    }

    Ok(file.into_path())
}

/// Save a path to a TOML file
pub fn save_path<P: AsRef<Path>>(file: P, path: &ObjectPath) -> Result<()> {
    let content = save_path_string(path)?;
    fs::write(file.as_ref(), content)?;
    tracing::debug!(file = %file.as_ref().display(), "saved path");
    Ok(())
}

/// Save a path to a TOML string
pub fn save_path_string(path: &ObjectPath) -> Result<String> {
    let content = toml::to_string_pretty(&PathFile::from(path))?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Interpolation;
    use dolly_core::Vec3;

    const SAMPLE: &str = r#"
[path]
name = "flyby"
repeat = true
interpolation = "cubic_spline"

[[keyframes]]
time = 4.0
position = [10.0, 2.0, 0.0]
target = [0.0, 0.0, 0.0]
up = [0.0, 1.0, 0.0]

[[keyframes]]
time = 0.0
position = [0.0, 2.0, 10.0]
target = [0.0, 0.0, 0.0]
up = [0.0, 1.0, 0.0]
"#;

    #[test]
    fn load_sorts_keyframes_and_reads_settings() {
        let path = load_path_string(SAMPLE).unwrap();
        assert_eq!(path.name(), "flyby");
        assert!(path.is_repeat_on());
        assert_eq!(path.interpolation(), Interpolation::CubicSpline);
        assert_eq!(path.key_frame_count(), 2);
        assert_eq!(path.key_frame(0).unwrap().position, Vec3::new(0.0, 2.0, 10.0));
    }

    #[test]
    fn metadata_defaults_apply() {
        let path = load_path_string("[path]\nname = \"bare\"\n").unwrap();
        assert!(!path.is_repeat_on());
        assert_eq!(path.interpolation(), Interpolation::Linear);
        assert_eq!(path.key_frame_count(), 0);
    }

    #[test]
    fn negative_time_is_rejected() {
        let content = SAMPLE.replace("time = 4.0", "time = -1.0");
        assert!(matches!(
            load_path_string(&content),
            Err(DollyError::InvalidPathFile(_))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            load_path_string("[path"),
            Err(DollyError::TomlParseError(_))
        ));
    }

    #[test]
    fn save_and_reload_file() {
        let original = load_path_string(SAMPLE).unwrap();
        let dir = std::env::temp_dir().join(format!("dolly_path_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("flyby.path.toml");

        save_path(&file, &original).unwrap();
        let reloaded = load_path(&file).unwrap();
        assert_eq!(reloaded, original);

        std::fs::remove_dir_all(&dir).ok();
    }
}
