// Transcoding through the ffmpeg executable.
//
// Every trim is one blocking ffmpeg invocation. Input-side seeking (`-ss`/`-to`
// before `-i`) keeps long videos fast.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::config::FfmpegConfig;
use crate::media::MediaError;
use crate::scene::Scene;

/// What a trim should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimKind {
    /// 16 kHz mono PCM WAV, the input format of the speech backends.
    Audio,
    /// Audio and video clip.
    Clip,
}

/// Cuts a time range of a media file into a new file.
pub trait Transcoder: Send + Sync {
    fn trim(
        &self,
        input: &Path,
        scene: &Scene,
        output: &Path,
        kind: TrimKind,
    ) -> Result<(), MediaError>;
}

pub struct FfmpegTranscoder {
    ffmpeg: PathBuf,
    video_codec: String,
    audio_codec: String,
    stream_copy: bool,
}

impl FfmpegTranscoder {
    pub fn new(config: &FfmpegConfig) -> Self {
        Self {
            ffmpeg: config.ffmpeg_path.clone(),
            video_codec: config.video_codec.clone(),
            audio_codec: config.audio_codec.clone(),
            stream_copy: config.stream_copy,
        }
    }

    fn args(&self, input: &Path, scene: &Scene, output: &Path, kind: TrimKind) -> Vec<OsString> {
        let start = format_seconds(scene.start);
        let end = format_seconds(scene.end);
        let head: [&str; 9] = [
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-ss",
            &start,
            "-to",
            &end,
            "-i",
        ];
        let mut args: Vec<OsString> = head.into_iter().map(OsString::from).collect();
        args.push(input.as_os_str().to_owned());

        let tail: Vec<&str> = match kind {
            TrimKind::Audio => vec!["-vn", "-ac", "1", "-ar", "16000", "-c:a", "pcm_s16le"],
            TrimKind::Clip if self.stream_copy => vec!["-c", "copy"],
            TrimKind::Clip => vec!["-c:v", &self.video_codec, "-c:a", &self.audio_codec],
        };
        args.extend(tail.into_iter().map(OsString::from));
        args.push(output.as_os_str().to_owned());
        args
    }
}

impl Transcoder for FfmpegTranscoder {
    fn trim(
        &self,
        input: &Path,
        scene: &Scene,
        output: &Path,
        kind: TrimKind,
    ) -> Result<(), MediaError> {
        let mut cmd = tool_command(&self.ffmpeg);
        cmd.args(self.args(input, scene, output, kind));
        run_tool(&self.ffmpeg, &mut cmd)?;
        Ok(())
    }
}

/// A command for an external tool, detached from the terminal's process group
/// on unix so Ctrl-C reaches only storycut and the tool can finish its step.
pub(crate) fn tool_command(tool: &Path) -> Command {
    let mut cmd = Command::new(tool);
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }
    cmd
}

/// Run an external tool to completion, turning a non-zero exit into an error.
pub(crate) fn run_tool(tool: &Path, cmd: &mut Command) -> Result<Output, MediaError> {
    tracing::debug!("Running {:?}", cmd);
    let output = cmd.output().map_err(|source| MediaError::Spawn {
        tool: tool.to_path_buf(),
        source,
    })?;

    if !output.status.success() {
        return Err(MediaError::Failed {
            tool: tool.to_path_buf(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

fn format_seconds(secs: f64) -> String {
    format!("{:.3}", secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcoder(stream_copy: bool) -> FfmpegTranscoder {
        FfmpegTranscoder::new(&FfmpegConfig {
            stream_copy,
            ..FfmpegConfig::default()
        })
    }

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_audio_args() {
        let args = strings(transcoder(false).args(
            Path::new("movie.mkv"),
            &Scene::new(12.5, 47.25),
            Path::new("work/scene_0001.wav"),
            TrimKind::Audio,
        ));
        assert_eq!(
            args,
            vec![
                "-y", "-hide_banner", "-loglevel", "error", "-ss", "12.500", "-to", "47.250",
                "-i", "movie.mkv", "-vn", "-ac", "1", "-ar", "16000", "-c:a", "pcm_s16le",
                "work/scene_0001.wav"
            ]
        );
    }

    #[test]
    fn test_clip_args_reencode() {
        let args = strings(transcoder(false).args(
            Path::new("movie.mkv"),
            &Scene::new(0.0, 30.0),
            Path::new("story_segment_1.mp4"),
            TrimKind::Clip,
        ));
        assert!(args.windows(2).any(|w| w == ["-c:v", "libx264"]));
        assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
        assert_eq!(args.last().map(String::as_str), Some("story_segment_1.mp4"));
    }

    #[test]
    fn test_clip_args_stream_copy() {
        let args = strings(transcoder(true).args(
            Path::new("movie.mkv"),
            &Scene::new(0.0, 30.0),
            Path::new("out.mp4"),
            TrimKind::Clip,
        ));
        assert!(args.windows(2).any(|w| w == ["-c", "copy"]));
        assert!(!args.iter().any(|a| a == "libx264"));
    }

    #[test]
    fn test_missing_tool_is_spawn_error() {
        let t = FfmpegTranscoder::new(&FfmpegConfig {
            ffmpeg_path: PathBuf::from("/nonexistent/bin/ffmpeg"),
            ..FfmpegConfig::default()
        });
        let tmp = tempfile::TempDir::new().unwrap();
        let err = t
            .trim(
                Path::new("in.mp4"),
                &Scene::new(0.0, 1.0),
                &tmp.path().join("out.wav"),
                TrimKind::Audio,
            )
            .unwrap_err();
        assert!(matches!(err, MediaError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_runs_outside_our_process_group() {
        // `kill 0` signals the caller's own process group. Reaching this
        // test's assertions at all means the signal missed the test runner.
        let sh = Path::new("sh");
        let mut cmd = tool_command(sh);
        cmd.args(["-c", "kill -INT 0; sleep 5"]);
        let err = run_tool(sh, &mut cmd).unwrap_err();
        assert!(matches!(err, MediaError::Failed { .. }));
    }
}
