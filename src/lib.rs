pub mod cli;
pub mod commands;
pub mod config;
pub mod dialogue;
pub mod extract;
pub mod media;
pub mod pipeline;
pub mod scene;
pub mod transcribe;
