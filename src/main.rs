use clap::Parser;
use storycut::cli::{Cli, Commands, RunArgs};
use storycut::config::Config;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storycut=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => storycut::commands::run(config, args),
        Commands::Scenes {
            video,
            min_duration,
        } => storycut::commands::list_scenes(config, video, min_duration),
        Commands::InitConfig { path, force } => {
            storycut::commands::init_config(path.as_deref(), force)
        }
    }
}
