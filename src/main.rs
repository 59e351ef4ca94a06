// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

mod cli;

use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::cli::{render::RenderCommand, split::SplitCommand, watch::WatchCommand};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Render a conversation file to an HTML page.
    #[command(visible_alias = "r")]
    Render(RenderCommand),

    /// Print how every question and answer splits into text and math.
    #[command()]
    Split(SplitCommand),

    /// Render a conversation file and re-render it on changes.
    #[command(visible_alias = "w")]
    Watch(WatchCommand),
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Command::Render(command) => crate::cli::render::render(command)?,
        Command::Split(command) => crate::cli::split::split(command)?,
        Command::Watch(command) => crate::cli::watch::watch(command)?,
    };
    Ok(())
}
