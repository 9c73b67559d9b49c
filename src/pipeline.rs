// detect -> filter -> classify -> extract, strictly in that order.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use thiserror::Error;

use crate::config::Config;
use crate::dialogue::{DialogueClassifier, DialogueVerdict};
use crate::extract::SegmentExtractor;
use crate::media::{SceneDetector, Transcoder};
use crate::scene::{filter_scenes, Scene};
use crate::transcribe::backend::TranscriptionBackend;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input video not found: {0}")]
    InputMissing(PathBuf),
    #[error("interrupted")]
    Interrupted,
}

/// The external collaborators a run is wired to.
pub struct Stages<'a> {
    pub detector: &'a dyn SceneDetector,
    pub transcoder: &'a dyn Transcoder,
    pub backend: &'a dyn TranscriptionBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneReport {
    /// 1-based position among the filtered scenes.
    pub index: usize,
    pub scene: Scene,
    #[serde(flatten)]
    pub verdict: DialogueVerdict,
}

/// Summary of one run, written with `--report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub video: PathBuf,
    pub generated_at: String,
    pub detected_scenes: usize,
    pub min_duration: f64,
    pub scenes: Vec<SceneReport>,
    pub clips: Vec<PathBuf>,
}

impl RunReport {
    pub fn final_scenes(&self) -> Vec<Scene> {
        self.scenes
            .iter()
            .filter(|s| s.verdict.is_dialogue())
            .map(|s| s.scene)
            .collect()
    }

    pub fn unavailable_count(&self) -> usize {
        self.scenes
            .iter()
            .filter(|s| matches!(s.verdict, DialogueVerdict::RecognitionUnavailable { .. }))
            .count()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing report {}", path.display()))?;
        Ok(())
    }
}

enum WorkDir {
    Temp(TempDir),
    Kept(PathBuf),
}

impl WorkDir {
    fn prepare(configured: Option<&Path>) -> Result<Self> {
        match configured {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating work directory {}", dir.display()))?;
                Ok(Self::Kept(dir.to_path_buf()))
            }
            None => Ok(Self::Temp(
                tempfile::Builder::new()
                    .prefix("storycut-")
                    .tempdir()
                    .context("creating temporary work directory")?,
            )),
        }
    }

    fn path(&self) -> &Path {
        match self {
            Self::Temp(dir) => dir.path(),
            Self::Kept(dir) => dir.as_path(),
        }
    }
}

/// Run the whole pipeline over `video`.
///
/// Recognition failures only skip the affected scene. Detection, audio
/// extraction and clip extraction failures end the run.
pub fn run_pipeline(
    video: &Path,
    config: &Config,
    stages: &Stages<'_>,
    cancel: &AtomicBool,
) -> Result<RunReport> {
    if !video.is_file() {
        return Err(PipelineError::InputMissing(video.to_path_buf()).into());
    }

    // Step 1: scene detection
    let detected = stages
        .detector
        .detect(video)
        .with_context(|| format!("detecting scenes in {}", video.display()))?;
    tracing::info!("Detected {} scenes in the video.", detected.len());

    // Step 2: drop short scenes
    let min_duration = config.scenes.min_duration;
    let filtered = filter_scenes(&detected, min_duration);
    tracing::info!(
        "Filtered to {} scenes longer than {} seconds.",
        filtered.len(),
        min_duration
    );

    // Step 3: dialogue check
    let work_dir = WorkDir::prepare(config.work.directory.as_deref())?;
    let classifier = DialogueClassifier::new(
        stages.transcoder,
        stages.backend,
        work_dir.path(),
        config.dialogue.min_transcript_chars,
    );
    let verdicts = classifier.classify_all(video, &filtered, config.dialogue.jobs, cancel)?;

    let scenes: Vec<SceneReport> = filtered
        .iter()
        .zip(verdicts)
        .enumerate()
        .map(|(i, (scene, verdict))| SceneReport {
            index: i + 1,
            scene: *scene,
            verdict,
        })
        .collect();

    let mut report = RunReport {
        video: video.to_path_buf(),
        generated_at: chrono::Local::now().to_rfc3339(),
        detected_scenes: detected.len(),
        min_duration,
        scenes,
        clips: Vec::new(),
    };

    let unavailable = report.unavailable_count();
    if unavailable > 0 {
        tracing::warn!(
            "{} scene(s) skipped because speech recognition failed",
            unavailable
        );
    }

    // Step 4: write clips
    if cancel.load(Ordering::Relaxed) {
        return Err(PipelineError::Interrupted.into());
    }
    let extractor = SegmentExtractor::new(stages.transcoder, &config.output);
    report.clips = extractor.extract_all(video, &report.final_scenes(), cancel)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaError, TrimKind};
    use crate::transcribe::backend::Transcript;

    struct NoScenes;

    impl SceneDetector for NoScenes {
        fn detect(&self, _video: &Path) -> Result<Vec<Scene>, MediaError> {
            Ok(Vec::new())
        }
    }

    struct Unreadable;

    impl SceneDetector for Unreadable {
        fn detect(&self, _video: &Path) -> Result<Vec<Scene>, MediaError> {
            Err(MediaError::Probe("moov atom not found".to_string()))
        }
    }

    struct Touch;

    impl Transcoder for Touch {
        fn trim(&self, _input: &Path, _scene: &Scene, output: &Path, _kind: TrimKind) -> Result<(), MediaError> {
            std::fs::write(output, b"")?;
            Ok(())
        }
    }

    struct Silent;

    impl TranscriptionBackend for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        fn transcribe(&self, audio_path: &Path) -> anyhow::Result<Transcript> {
            Ok(Transcript {
                file: audio_path.display().to_string(),
                duration_secs: 0.0,
                text: String::new(),
            })
        }
    }

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.output.directory = dir.join("clips");
        config
    }

    fn video_in(dir: &Path) -> PathBuf {
        let video = dir.join("movie.mp4");
        std::fs::write(&video, b"not really a video").unwrap();
        video
    }

    #[test]
    fn test_missing_video_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let stages = Stages {
            detector: &NoScenes,
            transcoder: &Touch,
            backend: &Silent,
        };
        let err = run_pipeline(
            &tmp.path().join("missing.mp4"),
            &config_in(tmp.path()),
            &stages,
            &AtomicBool::new(false),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InputMissing(_))
        ));
    }

    #[test]
    fn test_zero_scenes_produces_no_clips() {
        let tmp = tempfile::TempDir::new().unwrap();
        let video = video_in(tmp.path());
        let stages = Stages {
            detector: &NoScenes,
            transcoder: &Touch,
            backend: &Silent,
        };
        let report = run_pipeline(&video, &config_in(tmp.path()), &stages, &AtomicBool::new(false))
            .unwrap();
        assert_eq!(report.detected_scenes, 0);
        assert!(report.scenes.is_empty());
        assert!(report.clips.is_empty());
        assert!(!tmp.path().join("clips").exists());
    }

    #[test]
    fn test_detection_failure_is_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let video = video_in(tmp.path());
        let stages = Stages {
            detector: &Unreadable,
            transcoder: &Touch,
            backend: &Silent,
        };
        let err = run_pipeline(&video, &config_in(tmp.path()), &stages, &AtomicBool::new(false))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("moov atom not found"));
    }

    #[test]
    fn test_configured_work_dir_keeps_audio() {
        struct OneScene;
        impl SceneDetector for OneScene {
            fn detect(&self, _video: &Path) -> Result<Vec<Scene>, MediaError> {
                Ok(vec![Scene::new(0.0, 45.0)])
            }
        }

        let tmp = tempfile::TempDir::new().unwrap();
        let video = video_in(tmp.path());
        let mut config = config_in(tmp.path());
        config.work.directory = Some(tmp.path().join("work"));
        let stages = Stages {
            detector: &OneScene,
            transcoder: &Touch,
            backend: &Silent,
        };

        let report = run_pipeline(&video, &config, &stages, &AtomicBool::new(false)).unwrap();
        assert_eq!(report.scenes.len(), 1);
        assert!(report.clips.is_empty());
        assert!(tmp.path().join("work").join("scene_0001.wav").exists());
    }

    #[test]
    fn test_report_roundtrip_through_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let report = RunReport {
            video: PathBuf::from("movie.mp4"),
            generated_at: "2026-01-01T00:00:00+00:00".to_string(),
            detected_scenes: 3,
            min_duration: 30.0,
            scenes: vec![SceneReport {
                index: 1,
                scene: Scene::new(5.0, 40.0),
                verdict: DialogueVerdict::Dialogue {
                    transcript: "Hello there, welcome to the story".to_string(),
                },
            }],
            clips: vec![PathBuf::from("story_segment_1.mp4")],
        };
        let path = tmp.path().join("report.json");
        report.write(&path).unwrap();

        let loaded: RunReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.final_scenes(), vec![Scene::new(5.0, 40.0)]);
        assert_eq!(loaded.unavailable_count(), 0);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains(r#""verdict": "dialogue""#));
    }
}
