// Scene detection through ffmpeg's scene-change score.
//
// `select='gt(scene,T)'` keeps only frames whose content differs from the
// previous frame by more than T, and `showinfo` prints their timestamps to
// stderr. The container duration from ffprobe closes the last scene.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::{FfmpegConfig, SceneConfig};
use crate::media::transcoder::{run_tool, tool_command};
use crate::media::MediaError;
use crate::scene::{scenes_from_cuts, Scene};

/// Splits a video into ordered, contiguous scenes.
pub trait SceneDetector {
    fn detect(&self, video: &Path) -> Result<Vec<Scene>, MediaError>;
}

pub struct FfmpegSceneDetector {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    threshold: f64,
    min_scene_len: f64,
    start_in_scene: bool,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl FfmpegSceneDetector {
    pub fn new(ffmpeg: &FfmpegConfig, scenes: &SceneConfig) -> Self {
        Self {
            ffmpeg: ffmpeg.ffmpeg_path.clone(),
            ffprobe: ffmpeg.ffprobe_path.clone(),
            threshold: scenes.threshold,
            min_scene_len: scenes.min_scene_len_secs,
            start_in_scene: scenes.start_in_scene,
        }
    }

    fn probe_duration(&self, video: &Path) -> Result<f64, MediaError> {
        let mut cmd = tool_command(&self.ffprobe);
        cmd.args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(video);
        let output = run_tool(&self.ffprobe, &mut cmd)?;
        parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
    }

    fn detect_cuts(&self, video: &Path) -> Result<Vec<f64>, MediaError> {
        let filter = format!("select='gt(scene,{})',showinfo", self.threshold);
        let mut cmd = tool_command(&self.ffmpeg);
        cmd.args(["-hide_banner", "-nostats", "-i"])
            .arg(video)
            .args(["-an", "-filter:v", &filter, "-f", "null", "-"]);
        let output = run_tool(&self.ffmpeg, &mut cmd)?;
        Ok(parse_showinfo_cuts(&String::from_utf8_lossy(&output.stderr)))
    }
}

impl SceneDetector for FfmpegSceneDetector {
    fn detect(&self, video: &Path) -> Result<Vec<Scene>, MediaError> {
        let duration = self.probe_duration(video)?;
        tracing::debug!("Video duration: {:.2}s", duration);

        let cuts = self.detect_cuts(video)?;
        tracing::debug!("ffmpeg reported {} scene cuts", cuts.len());

        Ok(scenes_from_cuts(
            &cuts,
            duration,
            self.min_scene_len,
            self.start_in_scene,
        ))
    }
}

/// Extract the `pts_time:` of every frame line printed by `showinfo`.
fn parse_showinfo_cuts(stderr: &str) -> Vec<f64> {
    stderr
        .lines()
        .filter(|line| line.contains("Parsed_showinfo"))
        .filter_map(|line| {
            let rest = line.split("pts_time:").nth(1)?;
            rest.split_whitespace().next()?.parse::<f64>().ok()
        })
        .collect()
}

fn parse_probe_duration(json: &str) -> Result<f64, MediaError> {
    let parsed: ProbeOutput =
        serde_json::from_str(json).map_err(|e| MediaError::Probe(e.to_string()))?;
    let raw = parsed
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| MediaError::Probe("no duration in ffprobe output".to_string()))?;
    let duration: f64 = raw
        .parse()
        .map_err(|_| MediaError::Probe(format!("invalid duration: {}", raw)))?;
    if !duration.is_finite() || duration < 0.0 {
        return Err(MediaError::Probe(format!("invalid duration: {}", raw)));
    }
    Ok(duration)
}
