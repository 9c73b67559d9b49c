use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scenes: SceneConfig,
    pub ffmpeg: FfmpegConfig,
    pub dialogue: DialogueConfig,
    pub output: OutputConfig,
    pub work: WorkConfig,
    pub transcription: TranscriptionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// ffmpeg scene-change score above which a frame starts a new scene (0.0 to 1.0).
    pub threshold: f64,
    /// Scenes shorter than this many seconds are dropped before classification.
    pub min_duration: f64,
    /// Cuts closer than this to the previous cut are ignored.
    pub min_scene_len_secs: f64,
    /// Treat the whole video as one scene when no cut is found.
    pub start_in_scene: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub video_codec: String,
    pub audio_codec: String,
    /// Copy streams instead of re-encoding clips. Cuts snap to keyframes.
    pub stream_copy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// A transcript needs more than this many characters to count as dialogue.
    pub min_transcript_chars: usize,
    /// Scenes classified concurrently. 1 keeps the run sequential.
    pub jobs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub prefix: String,
    pub extension: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkConfig {
    /// Where per-scene audio is written. A temporary directory is used when unset.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub backend: String,
    pub model: String,
    pub language: String,
    pub azure: AzureConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for AzureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("deployment", &self.deployment)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// --- Default implementations ---

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            min_duration: 30.0,
            min_scene_len_secs: 0.5,
            start_in_scene: false,
        }
    }
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            stream_copy: false,
        }
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            min_transcript_chars: 10,
            jobs: 1,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            prefix: "story_segment".to_string(),
            extension: "mp4".to_string(),
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            backend: "azure".to_string(),
            model: "base.en".to_string(),
            language: "en".to_string(),
            azure: AzureConfig::default(),
        }
    }
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: String::new(),
            timeout_secs: 300,
        }
    }
}

// --- Config loading ---

impl Config {
    /// Load config and return the resolved file path (if any).
    pub fn load_with_path(path: Option<&Path>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        // 1. Check explicit path
        if let Some(p) = path {
            let content = std::fs::read_to_string(p).map_err(|e| {
                anyhow::anyhow!("Failed to read config file {}: {}", p.display(), e)
            })?;
            let config: Config = toml::from_str(&content)?;
            return Ok((config, Some(p.to_path_buf())));
        }

        // 2. Check beside the executable
        if let Ok(exe_path) = std::env::current_exe() {
            let beside_exe = exe_path.parent().map(|p| p.join("storycut.toml"));
            if let Some(p) = beside_exe {
                if p.exists() {
                    let content = std::fs::read_to_string(&p)?;
                    let config: Config = toml::from_str(&content)?;
                    return Ok((config, Some(p)));
                }
            }
        }

        // 3. Check platform config directory (e.g. ~/.config/storycut/config.toml)
        if let Some(platform_config) = Self::platform_path() {
            if platform_config.exists() {
                let content = std::fs::read_to_string(&platform_config)?;
                let config: Config = toml::from_str(&content)?;
                return Ok((config, Some(platform_config)));
            }
        }

        // 4. Fall back to defaults
        tracing::info!("No config file found, using defaults");
        Ok((Config::default(), None))
    }

    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_with_path(path).map(|(config, _)| config)
    }

    /// Default location written by `storycut init-config`.
    pub fn platform_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("storycut").join("config.toml"))
    }

    /// Generate a default config file with all fields and inline documentation.
    pub fn generate_default_commented() -> String {
        r#"# storycut configuration

[scenes]
# ffmpeg scene-change score (0.0 to 1.0) above which a new scene starts.
# Lower = more cuts, higher = only hard cuts.
threshold = 0.3
# Scenes shorter than this many seconds are skipped.
min_duration = 30.0
# Cuts closer together than this many seconds are merged.
min_scene_len_secs = 0.5
# Treat the whole video as a single scene when no cut is detected.
start_in_scene = false

[ffmpeg]
# Executables, resolved through PATH unless absolute.
ffmpeg_path = "ffmpeg"
ffprobe_path = "ffprobe"
# Codecs used when re-encoding clips.
video_codec = "libx264"
audio_codec = "aac"
# Copy streams instead of re-encoding. Faster, but cuts snap to keyframes.
stream_copy = false

[dialogue]
# A scene counts as dialogue when its transcript is longer than this.
min_transcript_chars = 10
# Number of scenes transcribed in parallel (1 = sequential).
jobs = 1

[output]
# Directory for extracted clips, named <prefix>_<n>.<extension>.
directory = "."
prefix = "story_segment"
extension = "mp4"

[work]
# Directory for per-scene audio. Uses a temporary directory when unset.
# directory = "/tmp/storycut"

[transcription]
# Speech-to-text backend: "azure" (cloud API) or "local" (whisper.cpp,
# requires the `whisper` build feature).
backend = "azure"
# Whisper model name or path to a ggml .bin file (local backend).
model = "base.en"
# Spoken language hint.
language = "en"

[transcription.azure]
# Azure OpenAI Whisper endpoint URL.
# endpoint = "https://your-resource.openai.azure.com"
# API key (or set STORYCUT_AZURE_KEY environment variable).
# api_key = ""
# Deployment name for the Whisper model.
# deployment = "whisper"
# Request timeout in seconds.
timeout_secs = 300
"#
        .to_string()
    }
}
