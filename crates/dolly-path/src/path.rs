//! Keyframed camera paths: ordered poses plus time-based sampling

use dolly_core::spline::catmull_rom;
use dolly_core::{DollyError, Result, Vec3};
use serde::{Deserialize, Serialize};

/// A camera pose at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Time in seconds from path start
    pub time: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Keyframe {
    pub fn new(time: f32, position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            time,
            position,
            target,
            up,
        }
    }
}

/// How poses are blended between keyframes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
    /// Catmull-Rom through the keyframe positions and targets
    CubicSpline,
}

impl Interpolation {
    pub const ALL: [Interpolation; 2] = [Interpolation::Linear, Interpolation::CubicSpline];

    pub fn label(self) -> &'static str {
        match self {
            Interpolation::Linear => "Linear",
            Interpolation::CubicSpline => "Cubic spline",
        }
    }
}

/// A named, optionally looping sequence of keyframes kept sorted by time.
///
/// No two keyframes share a time: adding a frame at an existing time
/// replaces the frame that was there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPath {
    name: String,
    repeat: bool,
    interpolation: Interpolation,
    keyframes: Vec<Keyframe>,
}

impl ObjectPath {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_repeat_on(&self) -> bool {
        self.repeat
    }

    pub fn set_animation_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    pub fn key_frame_count(&self) -> usize {
        self.keyframes.len()
    }

    pub fn key_frame(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    pub fn key_frames(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Insert a keyframe in time order and return its index.
    pub fn add_key_frame(&mut self, time: f32, position: Vec3, target: Vec3, up: Vec3) -> usize {
        self.insert_frame(Keyframe::new(time, position, target, up))
    }

    pub fn remove_key_frame(&mut self, index: usize) -> Option<Keyframe> {
        if index < self.keyframes.len() {
            Some(self.keyframes.remove(index))
        } else {
            None
        }
    }

    pub fn set_frame_position(&mut self, index: usize, position: Vec3) -> Result<()> {
        self.frame_mut(index)?.position = position;
        Ok(())
    }

    pub fn set_frame_target(&mut self, index: usize, target: Vec3) -> Result<()> {
        self.frame_mut(index)?.target = target;
        Ok(())
    }

    pub fn set_frame_up(&mut self, index: usize, up: Vec3) -> Result<()> {
        self.frame_mut(index)?.up = up;
        Ok(())
    }

    /// Move a keyframe to a new time. Returns the frame's index after re-sorting.
    pub fn set_frame_time(&mut self, index: usize, time: f32) -> Result<usize> {
        let mut frame = self
            .remove_key_frame(index)
            .ok_or(DollyError::KeyframeOutOfRange {
                index,
                count: self.keyframes.len(),
            })?;
        frame.time = time;
        Ok(self.insert_frame(frame))
    }

    /// Time between the first and last keyframe.
    pub fn duration(&self) -> f32 {
        match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    /// Sample the path at `time`.
    ///
    /// Outside the keyframe range the pose clamps to the nearest end, or
    /// wraps around the path's span when repeat is on.
    pub fn frame_at(&self, time: f32) -> Option<Keyframe> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;
        let span = last.time - first.time;

        let local = if self.repeat && span > 0.0 {
            first.time + (time - first.time).rem_euclid(span)
        } else {
            time.clamp(first.time, last.time)
        };

        // First frame strictly after `local`
        let next = self.keyframes.partition_point(|k| k.time <= local);
        if next == 0 || next == self.keyframes.len() {
            let frame = if next == 0 { first } else { last };
            return Some(Keyframe { time: local, ..*frame });
        }

        let seg = next - 1;
        let a = &self.keyframes[seg];
        let b = &self.keyframes[next];
        let t = (local - a.time) / (b.time - a.time);

        let (position, target, up) = match self.interpolation {
            Interpolation::Linear => (
                a.position.lerp(b.position, t),
                a.target.lerp(b.target, t),
                a.up.lerp(b.up, t),
            ),
            Interpolation::CubicSpline => {
                let [i0, i1, i2, i3] = self.neighbours(seg);
                let k = &self.keyframes;
                (
                    catmull_rom(k[i0].position, k[i1].position, k[i2].position, k[i3].position, t),
                    catmull_rom(k[i0].target, k[i1].target, k[i2].target, k[i3].target, t),
                    catmull_rom(k[i0].up, k[i1].up, k[i2].up, k[i3].up, t),
                )
            }
        };

        Some(Keyframe {
            time: local,
            position,
            target,
            up: up.try_normalize().unwrap_or(a.up),
        })
    }

    /// Control-point indices around segment `seg` (between `seg` and `seg + 1`).
    ///
    /// A repeating path treats its last frame as coinciding with its first,
    /// so the neighbours across the seam skip that duplicate.
    fn neighbours(&self, seg: usize) -> [usize; 4] {
        let n = self.keyframes.len();
        let wrap = self.repeat && n > 2;
        let before = match seg {
            0 if wrap => n - 2,
            0 => 0,
            s => s - 1,
        };
        let after = if seg + 2 < n {
            seg + 2
        } else if wrap {
            1
        } else {
            n - 1
        };
        [before, seg, seg + 1, after]
    }

    fn insert_frame(&mut self, frame: Keyframe) -> usize {
        match self
            .keyframes
            .binary_search_by(|k| k.time.total_cmp(&frame.time))
        {
            Ok(i) => {
                self.keyframes[i] = frame;
                i
            }
            Err(i) => {
                self.keyframes.insert(i, frame);
                i
            }
        }
    }

    fn frame_mut(&mut self, index: usize) -> Result<&mut Keyframe> {
        let count = self.keyframes.len();
        self.keyframes
            .get_mut(index)
            .ok_or(DollyError::KeyframeOutOfRange { index, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn three_frame_path() -> ObjectPath {
        let mut path = ObjectPath::new("flyby");
        path.add_key_frame(0.0, Vec3::ZERO, Vec3::Z, Vec3::Y);
        path.add_key_frame(2.0, Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 1.0), Vec3::Y);
        path.add_key_frame(4.0, Vec3::new(10.0, 0.0, 10.0), Vec3::new(11.0, 0.0, 10.0), Vec3::Y);
        path
    }

    #[test]
    fn add_keeps_frames_sorted_and_returns_index() {
        let mut path = ObjectPath::new("p");
        assert_eq!(path.add_key_frame(5.0, Vec3::ZERO, Vec3::Z, Vec3::Y), 0);
        assert_eq!(path.add_key_frame(1.0, Vec3::X, Vec3::Z, Vec3::Y), 0);
        assert_eq!(path.add_key_frame(3.0, Vec3::Y, Vec3::Z, Vec3::Y), 1);
        assert_eq!(path.add_key_frame(9.0, Vec3::ONE, Vec3::Z, Vec3::Y), 3);

        let times: Vec<f32> = path.key_frames().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![1.0, 3.0, 5.0, 9.0]);
    }

    #[test]
    fn add_at_existing_time_replaces_frame() {
        let mut path = three_frame_path();
        let idx = path.add_key_frame(2.0, Vec3::ONE, Vec3::Z, Vec3::Y);
        assert_eq!(idx, 1);
        assert_eq!(path.key_frame_count(), 3);
        assert_eq!(path.key_frame(1).unwrap().position, Vec3::ONE);
    }

    #[test]
    fn set_frame_time_reorders() {
        let mut path = three_frame_path();
        let moved = path.key_frame(0).copied().unwrap();
        let idx = path.set_frame_time(0, 3.0).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(path.key_frame(1).unwrap().position, moved.position);
        assert_eq!(path.key_frame(1).unwrap().time, 3.0);
        assert!(path
            .key_frames()
            .windows(2)
            .all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn setters_reject_bad_index() {
        let mut path = three_frame_path();
        assert!(matches!(
            path.set_frame_position(7, Vec3::ONE),
            Err(DollyError::KeyframeOutOfRange { index: 7, count: 3 })
        ));
        assert!(path.set_frame_time(3, 1.0).is_err());
        assert_eq!(path.key_frame_count(), 3);
        assert!(path.remove_key_frame(3).is_none());
    }

    #[test]
    fn linear_sampling_blends_between_frames() {
        let path = three_frame_path();
        let mid = path.frame_at(1.0).unwrap();
        assert!(approx(mid.position, Vec3::new(5.0, 0.0, 0.0)));
        assert!(approx(mid.up, Vec3::Y));
        assert_eq!(path.frame_at(2.0).unwrap().position, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn sampling_clamps_without_repeat() {
        let path = three_frame_path();
        assert_eq!(path.frame_at(-3.0).unwrap().position, Vec3::ZERO);
        assert_eq!(
            path.frame_at(100.0).unwrap().position,
            Vec3::new(10.0, 0.0, 10.0)
        );
    }

    #[test]
    fn sampling_wraps_with_repeat() {
        let mut path = three_frame_path();
        path.set_animation_repeat(true);
        assert_eq!(path.duration(), 4.0);
        let wrapped = path.frame_at(5.0).unwrap();
        assert!(approx(wrapped.position, Vec3::new(5.0, 0.0, 0.0)));
        assert!((wrapped.time - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cubic_sampling_hits_keyframes() {
        let mut path = three_frame_path();
        path.set_interpolation(Interpolation::CubicSpline);
        for frame in path.key_frames().to_vec() {
            let sampled = path.frame_at(frame.time).unwrap();
            assert!(approx(sampled.position, frame.position));
            assert!(approx(sampled.target, frame.target));
        }
        // Off the straight line between frames 0 and 1
        let mid = path.frame_at(1.0).unwrap();
        assert!(mid.position.z.abs() > 1e-3);
    }

    #[test]
    fn empty_and_single_frame_paths() {
        let mut path = ObjectPath::new("empty");
        assert!(path.frame_at(0.0).is_none());
        assert_eq!(path.duration(), 0.0);

        path.add_key_frame(2.0, Vec3::X, Vec3::Z, Vec3::Y);
        path.set_animation_repeat(true);
        let only = path.frame_at(10.0).unwrap();
        assert_eq!(only.position, Vec3::X);
    }
}
