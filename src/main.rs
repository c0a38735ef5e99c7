// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "qrscan")]
#[command(about = "Read the QR code in a camera capture or image file")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Print results as plain lines instead of a terminal dialog
    #[arg(long, global = true)]
    plain: bool,

    /// Use this configuration file instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive terminal scanner (default)
    Terminal,

    /// Capture an image with the configured camera command and decode it
    Camera,

    /// Pick an image file and decode it
    Gallery {
        /// Use this file instead of opening the file picker
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Decode an image file
    Decode {
        /// Image file to read
        file: PathBuf,
    },

    /// Show the configuration file location and effective values
    Config {
        /// Write the effective configuration to the file
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=qrscan=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_deref());

    match cli.command {
        Some(Commands::Terminal) | None => qrscan::terminal::run(&config),
        Some(Commands::Camera) => cli::camera(&config, cli.plain),
        Some(Commands::Gallery { path }) => cli::gallery(&config, path, cli.plain),
        Some(Commands::Decode { file }) => cli::gallery(&config, Some(file), cli.plain),
        Some(Commands::Config { write }) => cli::show_config(&config, cli.config.as_deref(), write),
    }
}
