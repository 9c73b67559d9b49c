use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::RunArgs;
use crate::config::Config;
use crate::media::{FfmpegSceneDetector, FfmpegTranscoder, SceneDetector};
use crate::pipeline::{run_pipeline, Stages};
use crate::scene::{filter_scenes, Scene};
use crate::transcribe::build_backend;

/// Ask for the input video on the terminal.
pub fn prompt_video_path(input: &mut impl BufRead, output: &mut impl Write) -> Result<PathBuf> {
    write!(output, "Please enter the video path: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    // Paths dropped into a terminal often arrive quoted.
    let trimmed = line.trim().trim_matches(|c: char| c == '"' || c == '\'');
    if trimmed.is_empty() {
        anyhow::bail!("No video path given");
    }
    Ok(PathBuf::from(trimmed))
}

fn resolve_video(video: Option<PathBuf>) -> Result<PathBuf> {
    match video {
        Some(path) => Ok(path),
        None => {
            let stdin = std::io::stdin();
            prompt_video_path(&mut stdin.lock(), &mut std::io::stdout())
        }
    }
}

pub fn apply_run_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(min) = args.min_duration {
        config.scenes.min_duration = min;
    }
    if let Some(dir) = &args.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(jobs) = args.jobs {
        config.dialogue.jobs = jobs.max(1);
    }
}

/// Full pipeline run.
pub fn run(mut config: Config, args: RunArgs) -> Result<()> {
    apply_run_overrides(&mut config, &args);
    let video = resolve_video(args.video.clone())?;

    let detector = FfmpegSceneDetector::new(&config.ffmpeg, &config.scenes);
    let transcoder = FfmpegTranscoder::new(&config.ffmpeg);
    let backend = build_backend(&config.transcription, args.backend.as_deref())?;
    tracing::info!("Using {} speech recognition", backend.name());

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || {
        tracing::info!("Interrupt received, stopping after the current step");
        cancel_handler.store(true, Ordering::Relaxed);
    })?;

    let stages = Stages {
        detector: &detector,
        transcoder: &transcoder,
        backend: backend.as_ref(),
    };
    let report = run_pipeline(&video, &config, &stages, &cancel)?;

    if let Some(path) = &args.report {
        report.write(path)?;
        tracing::info!("Wrote report to {}", path.display());
    }

    println!(
        "Extracted {} story segment(s) from {} detected scenes",
        report.clips.len(),
        report.detected_scenes
    );
    for clip in &report.clips {
        println!("  {}", clip.display());
    }
    Ok(())
}

/// Print detected scenes and whether each passes the duration filter.
pub fn list_scenes(mut config: Config, video: Option<PathBuf>, min_duration: Option<f64>) -> Result<()> {
    if let Some(min) = min_duration {
        config.scenes.min_duration = min;
    }
    let video = resolve_video(video)?;
    let detector = FfmpegSceneDetector::new(&config.ffmpeg, &config.scenes);
    let scenes = detector
        .detect(&video)
        .with_context(|| format!("detecting scenes in {}", video.display()))?;
    print!("{}", format_scene_table(&scenes, config.scenes.min_duration));
    Ok(())
}

fn format_scene_table(scenes: &[Scene], min_duration: f64) -> String {
    let kept = filter_scenes(scenes, min_duration);
    let mut out = format!(
        "{} scenes detected, {} at least {}s long\n",
        scenes.len(),
        kept.len(),
        min_duration
    );
    for (i, scene) in scenes.iter().enumerate() {
        let mark = if scene.duration() >= min_duration {
            "keep"
        } else {
            "skip"
        };
        out.push_str(&format!(
            "  {:>3}. {:>10.3} {:>10.3} {:>8.1}s  {}\n",
            i + 1,
            scene.start,
            scene.end,
            scene.duration(),
            mark
        ));
    }
    out
}

/// Write the commented default config.
pub fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => Config::platform_path()
            .ok_or_else(|| anyhow::anyhow!("Could not find a config directory; pass --path"))?,
    };
    write_default_config(&target, force)?;
    println!("Wrote default config: {}", target.display());
    Ok(())
}

fn write_default_config(target: &Path, force: bool) -> Result<()> {
    if target.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            target.display()
        );
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, Config::generate_default_commented())
        .with_context(|| format!("writing {}", target.display()))?;
    Ok(())
}
