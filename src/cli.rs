use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "storycut",
    version,
    about = "Cut a video into dialogue scenes using scene detection and speech-to-text"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect, filter, classify and extract scenes (default if no subcommand)
    Run(RunArgs),

    /// Detect and filter scenes without transcribing or extracting anything
    Scenes {
        /// Input video (prompted for when omitted)
        video: Option<PathBuf>,

        /// Minimum scene length in seconds
        #[arg(long)]
        min_duration: Option<f64>,
    },

    /// Write a commented default config file
    InitConfig {
        /// Where to write it (defaults to the platform config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Input video (prompted for when omitted)
    pub video: Option<PathBuf>,

    /// Minimum scene length in seconds
    #[arg(long)]
    pub min_duration: Option<f64>,

    /// Force a specific backend (local or azure)
    #[arg(long)]
    pub backend: Option<String>,

    /// Directory for extracted clips
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Number of scenes transcribed in parallel
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Write a JSON report of the run to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}
