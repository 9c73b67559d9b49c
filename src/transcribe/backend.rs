use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub file: String,
    pub duration_secs: f64,
    pub text: String,
}

/// A speech-to-text engine. Shared across classifier threads, hence `Sync`.
pub trait TranscriptionBackend: Send + Sync {
    fn name(&self) -> &str;
    fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// Duration of a WAV file from its header.
pub fn wav_duration_secs(audio_path: &Path) -> Result<f64> {
    let reader = hound::WavReader::open(audio_path)?;
    let spec = reader.spec();
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Sample rate of the working audio produced for recognition.
pub const SPEECH_SAMPLE_RATE: u32 = 16_000;

/// Load a 16 kHz mono 16-bit WAV as samples normalized to [-1.0, 1.0).
pub fn read_speech_samples(audio_path: &Path) -> Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(audio_path)?;
    let spec = reader.spec();
    if spec.sample_rate != SPEECH_SAMPLE_RATE || spec.channels != 1 || spec.bits_per_sample != 16 {
        anyhow::bail!(
            "expected 16 kHz mono 16-bit audio in {}, got {} Hz, {} channel(s), {} bits",
            audio_path.display(),
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample
        );
    }
    reader
        .samples::<i16>()
        .map(|s| Ok(s? as f32 / 32768.0))
        .collect()
}

pub(crate) fn file_name(audio_path: &Path) -> Result<String> {
    Ok(audio_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("audio path has no filename: {}", audio_path.display()))?
        .to_string_lossy()
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_wav_duration() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("scene_0001.wav");
        write_wav(&path, 1, 16000, &[0; 8000]);

        let duration = wav_duration_secs(&path).unwrap();
        assert!((duration - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_wav_duration_rejects_non_wav() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.wav");
        std::fs::write(&path, "hello").unwrap();
        assert!(wav_duration_secs(&path).is_err());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name(Path::new("/tmp/work/scene_0003.wav")).unwrap(),
            "scene_0003.wav"
        );
        assert!(file_name(Path::new("/")).is_err());
    }

    #[test]
    fn test_read_speech_samples_normalizes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("scene_0002.wav");
        write_wav(&path, 1, 16000, &[0, 16384, -32768]);

        let samples = read_speech_samples(&path).unwrap();
        assert_eq!(samples, vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn test_read_speech_samples_rejects_other_formats() {
        let tmp = TempDir::new().unwrap();
        let stereo = tmp.path().join("stereo.wav");
        write_wav(&stereo, 2, 16000, &[0, 0]);
        let cd_rate = tmp.path().join("cd.wav");
        write_wav(&cd_rate, 1, 44100, &[0]);

        let err = read_speech_samples(&stereo).unwrap_err();
        assert!(err.to_string().contains("2 channel(s)"));
        assert!(read_speech_samples(&cd_rate).is_err());
    }
}
