use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to launch {}: {source}", tool.display())]
    Spawn {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} exited with {status}: {stderr}", tool.display())]
    Failed {
        tool: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("could not read media info: {0}")]
    Probe(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
