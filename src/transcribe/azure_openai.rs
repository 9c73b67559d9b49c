use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::multipart;
use serde::Deserialize;

use crate::config::AzureConfig;
use crate::transcribe::backend::{file_name, wav_duration_secs, Transcript, TranscriptionBackend};

const API_VERSION: &str = "2024-06-01";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

pub struct AzureOpenAIBackend {
    endpoint: String,
    api_key: String,
    deployment: String,
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for AzureOpenAIBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAIBackend")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("deployment", &self.deployment)
            .finish()
    }
}

impl AzureOpenAIBackend {
    pub fn new(config: &AzureConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            anyhow::bail!(
                "Azure OpenAI endpoint not configured. \
                 Set [transcription.azure] endpoint in storycut.toml"
            );
        }
        if config.deployment.is_empty() {
            anyhow::bail!(
                "Azure OpenAI deployment not configured. \
                 Set [transcription.azure] deployment in storycut.toml"
            );
        }

        let api_key = if config.api_key.is_empty() {
            std::env::var("STORYCUT_AZURE_KEY").context(
                "Azure API key not configured. Set [transcription.azure] api_key or STORYCUT_AZURE_KEY",
            )?
        } else {
            config.api_key.clone()
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            deployment: config.deployment.clone(),
            client,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/audio/transcriptions?api-version={}",
            self.endpoint, self.deployment, API_VERSION
        )
    }
}

impl TranscriptionBackend for AzureOpenAIBackend {
    fn name(&self) -> &str {
        "azure-openai"
    }

    fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        let file_bytes = std::fs::read(audio_path)
            .with_context(|| format!("reading {}", audio_path.display()))?;
        let filename = file_name(audio_path)?;

        let form = multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(file_bytes)
                    .file_name(filename.clone())
                    .mime_str("audio/wav")?,
            )
            .text("response_format", "json");

        let response = self
            .client
            .post(self.url())
            .header("api-key", &self.api_key)
            .multipart(form)
            .send()?
            .error_for_status()?;
        let body: TranscriptionResponse = response.json()?;

        Ok(Transcript {
            duration_secs: wav_duration_secs(audio_path)?,
            file: filename,
            text: body.text.trim().to_string(),
        })
    }
}
