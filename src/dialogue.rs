// Dialogue classification: scene audio -> transcript -> verdict.
//
// Each scene's audio goes to its own working file (`scene_<index>.wav`), so
// scenes can be classified in parallel without clobbering each other.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::media::{MediaError, TrimKind, Transcoder};
use crate::pipeline::PipelineError;
use crate::scene::Scene;
use crate::transcribe::backend::TranscriptionBackend;

/// Outcome of checking one scene for speech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum DialogueVerdict {
    Dialogue { transcript: String },
    NoDialogue { transcript: String },
    /// The recognizer failed. The scene is skipped like `NoDialogue`, but the
    /// reason is kept so a rerun can be considered.
    RecognitionUnavailable { reason: String },
}

impl DialogueVerdict {
    pub fn is_dialogue(&self) -> bool {
        matches!(self, Self::Dialogue { .. })
    }
}

/// `Dialogue` when the transcript has more than `min_chars` characters.
pub fn classify_transcript(text: &str, min_chars: usize) -> DialogueVerdict {
    if text.chars().count() > min_chars {
        DialogueVerdict::Dialogue {
            transcript: text.to_string(),
        }
    } else {
        DialogueVerdict::NoDialogue {
            transcript: text.to_string(),
        }
    }
}

pub struct DialogueClassifier<'a> {
    transcoder: &'a dyn Transcoder,
    backend: &'a dyn TranscriptionBackend,
    work_dir: PathBuf,
    min_chars: usize,
}

impl<'a> DialogueClassifier<'a> {
    pub fn new(
        transcoder: &'a dyn Transcoder,
        backend: &'a dyn TranscriptionBackend,
        work_dir: &Path,
        min_chars: usize,
    ) -> Self {
        Self {
            transcoder,
            backend,
            work_dir: work_dir.to_path_buf(),
            min_chars,
        }
    }

    /// Working file for the scene at 1-based `index`.
    pub fn audio_path(&self, index: usize) -> PathBuf {
        self.work_dir.join(format!("scene_{:04}.wav", index))
    }

    /// Classify one scene. Audio extraction errors propagate; recognition
    /// errors become `RecognitionUnavailable`.
    pub fn classify(&self, video: &Path, index: usize, scene: &Scene) -> Result<DialogueVerdict, MediaError> {
        let audio = self.audio_path(index);
        self.transcoder.trim(video, scene, &audio, TrimKind::Audio)?;

        let verdict = match self.backend.transcribe(&audio) {
            Ok(transcript) => {
                tracing::debug!(
                    "Scene {} transcript ({:.1}s audio): {:?}",
                    index,
                    transcript.duration_secs,
                    transcript.text
                );
                classify_transcript(&transcript.text, self.min_chars)
            }
            Err(e) => {
                tracing::warn!(
                    "Speech recognition ({}) failed for scene {}: {:#}",
                    self.backend.name(),
                    index,
                    e
                );
                DialogueVerdict::RecognitionUnavailable {
                    reason: format!("{:#}", e),
                }
            }
        };
        Ok(verdict)
    }

    /// Classify every scene, in order. With `jobs > 1` scenes are processed on
    /// a dedicated thread pool of that size. `cancel` is checked before each scene.
    pub fn classify_all(
        &self,
        video: &Path,
        scenes: &[Scene],
        jobs: usize,
        cancel: &AtomicBool,
    ) -> Result<Vec<DialogueVerdict>> {
        let classify_one = |(i, scene): (usize, &Scene)| -> Result<DialogueVerdict> {
            if cancel.load(Ordering::Relaxed) {
                return Err(PipelineError::Interrupted.into());
            }
            let index = i + 1;
            tracing::info!(
                "Processing Scene {}: Start {:.3} / End {:.3}",
                index,
                scene.start,
                scene.end
            );
            let verdict = self
                .classify(video, index, scene)
                .with_context(|| format!("extracting audio for scene {}", index))?;
            if verdict.is_dialogue() {
                tracing::info!("Dialogue detected in Scene {}. Adding to final list.", index);
            } else {
                tracing::info!("No dialogue in Scene {}. Skipping.", index);
            }
            Ok(verdict)
        };

        if jobs <= 1 {
            return scenes.iter().enumerate().map(classify_one).collect();
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("building classifier thread pool")?;
        pool.install(|| scenes.par_iter().enumerate().map(classify_one).collect())
    }
}
