use std::path::{Path, PathBuf};

use anyhow::Result;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::transcribe::backend::{
    file_name, read_speech_samples, Transcript, TranscriptionBackend, SPEECH_SAMPLE_RATE,
};

pub struct WhisperLocal {
    ctx: WhisperContext,
    language: String,
}

/// Map a model name like `base.en` to `<data dir>/storycut/models/ggml-base.en.bin`.
/// Anything that already looks like a path is used as is.
pub fn resolve_model_path(model: &str) -> PathBuf {
    let as_path = Path::new(model);
    if as_path.extension().map(|e| e == "bin").unwrap_or(false) || as_path.is_absolute() {
        return as_path.to_path_buf();
    }
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("storycut")
        .join("models")
        .join(format!("ggml-{}.bin", model))
}

impl WhisperLocal {
    pub fn new(model_path: &Path, language: &str) -> Result<Self> {
        let model = model_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("model path is not UTF-8: {}", model_path.display()))?;
        let ctx = WhisperContext::new_with_params(model, WhisperContextParameters::default())
            .map_err(|e| anyhow::anyhow!("Failed to load Whisper model {}: {:?}", model, e))?;
        Ok(Self {
            ctx,
            language: language.to_string(),
        })
    }

    fn recognize(&self, samples: &[f32]) -> Result<String> {
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| anyhow::anyhow!("Failed to create whisper state: {:?}", e))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(&self.language));
        params.set_print_progress(false);
        state
            .full(params, samples)
            .map_err(|e| anyhow::anyhow!("Transcription failed: {:?}", e))?;

        let segments: Vec<String> = (0..state.full_n_segments())
            .filter_map(|i| state.get_segment(i))
            .filter_map(|segment| segment.to_str_lossy().ok().map(|t| t.trim().to_string()))
            .filter(|t| !t.is_empty())
            .collect();
        Ok(segments.join(" "))
    }
}

impl TranscriptionBackend for WhisperLocal {
    fn name(&self) -> &str {
        "whisper-local"
    }

    fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        let samples = read_speech_samples(audio_path)?;
        Ok(Transcript {
            file: file_name(audio_path)?,
            duration_secs: samples.len() as f64 / SPEECH_SAMPLE_RATE as f64,
            text: self.recognize(&samples)?,
        })
    }
}
