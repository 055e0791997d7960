//! Frameline CLI
//!
//! Command-line interface for Frameline animation projects.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use frameline::cli::{commands, Cli, Commands};
use frameline::EditorConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Frameline v{}", env!("CARGO_PKG_VERSION"));

    let config = EditorConfig::load_or_default(cli.config.as_deref())
        .context("failed to load editor configuration")?;

    match cli.command {
        Some(cmd) => handle_command(cmd, &config),
        None => {
            println!("Frameline v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, config: &EditorConfig) -> anyhow::Result<()> {
    let result = match cmd {
        Commands::New { path } => commands::new_project(&path, config),
        Commands::Info { path } => commands::show_info(&path),
        Commands::Print { path } => commands::print_project(&path),
        Commands::Resolve { path, layer, time } => commands::resolve(&path, layer, time),
        Commands::Frames {
            path,
            layer,
            from,
            to,
        } => commands::frames(&path, layer, from, to),
        Commands::Upgrade { path, output } => commands::upgrade(&path, output.as_deref()),
        Commands::InsertKeyframe {
            path,
            layer,
            time,
            current_pose,
        } => commands::insert_keyframe(&path, layer, time, current_pose, config),
        Commands::RemoveKeyframe { path, layer, time } => {
            commands::remove_keyframe(&path, layer, time, config)
        }
    };

    result.map_err(|e| match e.recovery_suggestion() {
        Some(hint) => anyhow::anyhow!("[{}] {}\n  hint: {}", e.error_code(), e, hint),
        None => anyhow::anyhow!("[{}] {}", e.error_code(), e),
    })
}
