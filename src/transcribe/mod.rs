pub mod azure_openai;
pub mod backend;
#[cfg(feature = "whisper")]
pub mod whisper_local;

use anyhow::Result;

use crate::config::TranscriptionConfig;
use crate::transcribe::backend::TranscriptionBackend;

/// Build the configured speech-to-text backend.
pub fn build_backend(
    config: &TranscriptionConfig,
    backend_override: Option<&str>,
) -> Result<Box<dyn TranscriptionBackend>> {
    let backend_name = backend_override.unwrap_or(&config.backend);

    match backend_name {
        "local" => {
            #[cfg(feature = "whisper")]
            {
                use crate::transcribe::whisper_local::WhisperLocal;
                Ok(Box::new(WhisperLocal::new(
                    &whisper_local::resolve_model_path(&config.model),
                    &config.language,
                )?))
            }
            #[cfg(not(feature = "whisper"))]
            {
                anyhow::bail!("Local whisper backend requires building with --features whisper")
            }
        }
        "azure" => {
            use crate::transcribe::azure_openai::AzureOpenAIBackend;
            Ok(Box::new(AzureOpenAIBackend::new(&config.azure)?))
        }
        other => anyhow::bail!("Unknown transcription backend: {}", other),
    }
}
