//! Path file commands

use anyhow::{Context, Result};
use clap::Subcommand;
use dolly_core::Vec3;
use dolly_path::{load_path, save_path, Keyframe, ObjectPath};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum PathCommands {
    /// Create a new, empty path file
    Create {
        /// Path file to create
        file: String,

        /// Path name (defaults to filename)
        #[arg(long)]
        name: Option<String>,
    },

    /// Show path information and its keyframes
    Info {
        /// Path file
        file: PathBuf,
    },

    /// Add a keyframe (replaces an existing keyframe at the same time)
    AddFrame {
        /// Path file
        file: PathBuf,

        /// Keyframe time in seconds
        #[arg(long)]
        time: f32,

        /// Camera position (comma-separated x,y,z)
        #[arg(long, value_parser = crate::parse_vec3)]
        position: [f32; 3],

        /// Look-at target (comma-separated x,y,z)
        #[arg(long, value_parser = crate::parse_vec3)]
        target: [f32; 3],

        /// Up vector (comma-separated x,y,z)
        #[arg(long, value_parser = crate::parse_vec3, default_value = "0,1,0")]
        up: [f32; 3],
    },

    /// Remove the keyframe at an index
    RemoveFrame {
        /// Path file
        file: PathBuf,

        /// Keyframe index (as listed by `path info`)
        index: usize,
    },

    /// Print the interpolated camera pose at a time
    Sample {
        /// Path file
        file: PathBuf,

        /// Time in seconds
        #[arg(long)]
        time: f32,
    },
}

pub fn run(cmd: PathCommands) -> Result<()> {
    match cmd {
        PathCommands::Create { file, name } => {
            let created = create(&file, name.as_deref())?;
            println!("Created path: {}", created.display());
            Ok(())
        }
        PathCommands::Info { file } => info(&file),
        PathCommands::AddFrame {
            file,
            time,
            position,
            target,
            up,
        } => {
            let frame = Keyframe::new(
                time,
                Vec3::from_array(position),
                Vec3::from_array(target),
                Vec3::from_array(up),
            );
            let index = add_frame(&file, frame)?;
            println!("Added keyframe {} at t={:.3}", index, time);
            Ok(())
        }
        PathCommands::RemoveFrame { file, index } => {
            let removed = remove_frame(&file, index)?;
            println!("Removed keyframe {} (t={:.3})", index, removed.time);
            Ok(())
        }
        PathCommands::Sample { file, time } => sample(&file, time),
    }
}

fn create(file: &str, name: Option<&str>) -> Result<PathBuf> {
    let file = if file.ends_with(".toml") {
        PathBuf::from(file)
    } else {
        PathBuf::from(format!("{}.path.toml", file))
    };

    if file.exists() {
        anyhow::bail!("Path file already exists: {}", file.display());
    }

    let path_name = name.map(String::from).unwrap_or_else(|| {
        file.file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.trim_end_matches(".path"))
            .unwrap_or("Untitled")
            .to_string()
    });

    if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    save_path(&file, &ObjectPath::new(path_name))
        .with_context(|| format!("Failed to write {}", file.display()))?;

    Ok(file)
}

fn load(file: &Path) -> Result<ObjectPath> {
    load_path(file).with_context(|| format!("Failed to load path file {}", file.display()))
}

fn info(file: &Path) -> Result<()> {
    let path = load(file)?;

    println!("Path: {}", path.name());
    println!("File: {}", file.display());
    println!("Repeat: {}", if path.is_repeat_on() { "on" } else { "off" });
    println!("Interpolation: {}", path.interpolation().label());
    println!("Keyframes: {}", path.key_frame_count());
    println!("Duration: {:.3}s", path.duration());

    for (i, frame) in path.key_frames().iter().enumerate() {
        println!(
            "  [{}] t={:.3}  position={}  target={}  up={}",
            i,
            frame.time,
            fmt_vec3(frame.position),
            fmt_vec3(frame.target),
            fmt_vec3(frame.up)
        );
    }

    Ok(())
}

fn add_frame(file: &Path, frame: Keyframe) -> Result<usize> {
    if !frame.time.is_finite() || frame.time < 0.0 {
        anyhow::bail!("Keyframe time must be a non-negative number, got {}", frame.time);
    }

    let mut path = load(file)?;
    let index = path.add_key_frame(frame.time, frame.position, frame.target, frame.up);
    save_path(file, &path).with_context(|| format!("Failed to write {}", file.display()))?;

    tracing::debug!(index, count = path.key_frame_count(), "keyframe added");
    Ok(index)
}

fn remove_frame(file: &Path, index: usize) -> Result<Keyframe> {
    let mut path = load(file)?;
    let count = path.key_frame_count();
    let removed = path
        .remove_key_frame(index)
        .ok_or(dolly_core::DollyError::KeyframeOutOfRange { index, count })?;
    save_path(file, &path).with_context(|| format!("Failed to write {}", file.display()))?;

    Ok(removed)
}

fn sample(file: &Path, time: f32) -> Result<()> {
    let path = load(file)?;
    let frame = path
        .frame_at(time)
        .with_context(|| format!("Path '{}' has no keyframes", path.name()))?;

    println!("t={:.3}", frame.time);
    println!("position: {}", fmt_vec3(frame.position));
    println!("target:   {}", fmt_vec3(frame.target));
    println!("up:       {}", fmt_vec3(frame.up));

    Ok(())
}

fn fmt_vec3(v: Vec3) -> String {
    format!("{:.3},{:.3},{:.3}", v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dolly_cli_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn create_appends_extension_and_derives_name() {
        let dir = temp_dir();
        let base = dir.join("flyby");
        let file = create(base.to_str().unwrap(), None).unwrap();

        assert!(file.ends_with("flyby.path.toml"));
        let path = load_path(&file).unwrap();
        assert_eq!(path.name(), "flyby");
        assert_eq!(path.key_frame_count(), 0);

        // A second create must not clobber the file
        assert!(create(file.to_str().unwrap(), Some("other")).is_err());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn add_and_remove_frames() {
        let dir = temp_dir();
        let file = create(dir.join("shot.toml").to_str().unwrap(), Some("Shot")).unwrap();

        let late = Keyframe::new(2.0, Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let early = Keyframe::new(0.5, Vec3::new(5.0, 1.0, 0.0), Vec3::ZERO, Vec3::Y);
        assert_eq!(add_frame(&file, late).unwrap(), 0);
        assert_eq!(add_frame(&file, early).unwrap(), 0);

        let path = load_path(&file).unwrap();
        assert_eq!(path.name(), "Shot");
        assert_eq!(path.key_frame_count(), 2);
        assert_eq!(path.key_frame(1).unwrap().time, 2.0);

        let removed = remove_frame(&file, 0).unwrap();
        assert_eq!(removed.time, 0.5);
        assert!(remove_frame(&file, 5).is_err());
        assert_eq!(load_path(&file).unwrap().key_frame_count(), 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn add_frame_rejects_negative_time() {
        let dir = temp_dir();
        let file = create(dir.join("bad.toml").to_str().unwrap(), None).unwrap();
        let frame = Keyframe::new(-1.0, Vec3::ZERO, Vec3::Z, Vec3::Y);
        assert!(add_frame(&file, frame).is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn sample_requires_keyframes() {
        let dir = temp_dir();
        let file = create(dir.join("empty.toml").to_str().unwrap(), None).unwrap();
        assert!(sample(&file, 0.0).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
