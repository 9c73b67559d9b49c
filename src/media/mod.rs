pub mod error;
pub mod scenes;
pub mod transcoder;

pub use error::MediaError;
pub use scenes::{FfmpegSceneDetector, SceneDetector};
pub use transcoder::{FfmpegTranscoder, TrimKind, Transcoder};
