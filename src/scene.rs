use serde::{Deserialize, Serialize};

/// Library default for the minimum scene length, in seconds.
pub const DEFAULT_MIN_DURATION_SECS: f64 = 10.0;

/// A contiguous time range of the source video, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub start: f64,
    pub end: f64,
}

impl Scene {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl std::fmt::Display for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s - {:.3}s ({:.1}s)", self.start, self.end, self.duration())
    }
}

/// Keep scenes lasting at least `min_duration` seconds. Order is preserved.
///
/// ```
/// use storycut::scene::{filter_scenes, Scene, DEFAULT_MIN_DURATION_SECS};
///
/// let scenes = [
///     Scene::new(0.0, 4.0),
///     Scene::new(4.0, 14.0),
///     Scene::new(14.0, 60.0),
/// ];
/// let kept = filter_scenes(&scenes, DEFAULT_MIN_DURATION_SECS);
/// assert_eq!(kept, vec![Scene::new(4.0, 14.0), Scene::new(14.0, 60.0)]);
/// ```
pub fn filter_scenes(scenes: &[Scene], min_duration: f64) -> Vec<Scene> {
    scenes
        .iter()
        .filter(|scene| scene.duration() >= min_duration)
        .copied()
        .collect()
}

/// Turn cut timestamps into contiguous scenes covering `[0, duration)`.
///
/// Cuts are sorted first. A cut closer than `min_scene_len` to the previous
/// boundary, or not strictly inside the video, is dropped. With no usable
/// cut the result is empty unless `start_in_scene` is set, in which case the
/// whole video is one scene.
pub fn scenes_from_cuts(
    cuts: &[f64],
    duration: f64,
    min_scene_len: f64,
    start_in_scene: bool,
) -> Vec<Scene> {
    let mut sorted: Vec<f64> = cuts.iter().copied().filter(|c| c.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut boundaries = vec![0.0];
    for cut in sorted {
        let last = *boundaries.last().unwrap_or(&0.0);
        if cut <= 0.0 || cut >= duration {
            continue;
        }
        if cut - last < min_scene_len {
            continue;
        }
        boundaries.push(cut);
    }

    if boundaries.len() == 1 && !start_in_scene {
        return Vec::new();
    }
    if duration <= 0.0 {
        return Vec::new();
    }
    boundaries.push(duration);

    boundaries
        .windows(2)
        .map(|pair| Scene::new(pair[0], pair[1]))
        .collect()
}
