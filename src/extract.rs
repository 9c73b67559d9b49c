use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

use crate::config::OutputConfig;
use crate::media::{TrimKind, Transcoder};
use crate::pipeline::PipelineError;
use crate::scene::Scene;

/// Writes final scenes as numbered clips.
pub struct SegmentExtractor<'a> {
    transcoder: &'a dyn Transcoder,
    directory: PathBuf,
    prefix: String,
    extension: String,
}

impl<'a> SegmentExtractor<'a> {
    pub fn new(transcoder: &'a dyn Transcoder, output: &OutputConfig) -> Self {
        Self {
            transcoder,
            directory: output.directory.clone(),
            prefix: output.prefix.clone(),
            extension: output.extension.trim_start_matches('.').to_string(),
        }
    }

    /// Path of the clip with 1-based number `n`.
    pub fn clip_path(&self, n: usize) -> PathBuf {
        self.directory
            .join(format!("{}_{}.{}", self.prefix, n, self.extension))
    }

    /// Extract every scene in order. Stops at the first failure, or before the
    /// next clip once `cancel` is set; clips already written stay on disk.
    pub fn extract_all(
        &self,
        video: &Path,
        scenes: &[Scene],
        cancel: &AtomicBool,
    ) -> Result<Vec<PathBuf>> {
        if scenes.is_empty() {
            return Ok(Vec::new());
        }
        std::fs::create_dir_all(&self.directory).with_context(|| {
            format!("creating output directory {}", self.directory.display())
        })?;

        let mut written = Vec::with_capacity(scenes.len());
        for (i, scene) in scenes.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                tracing::info!("Stopped after {} of {} story segments", i, scenes.len());
                return Err(PipelineError::Interrupted.into());
            }
            let n = i + 1;
            let clip = self.clip_path(n);
            self.transcoder
                .trim(video, scene, &clip, TrimKind::Clip)
                .with_context(|| format!("extracting story segment {} ({})", n, scene))?;
            tracing::info!("Extracted story segment {}: {}", n, clip.display());
            written.push(clip);
        }
        Ok(written)
    }
}
