//! aitk CLI - resolve image generation configs without generating images.
//!
//! Turns prompts with inline directives and job files into fully resolved
//! generation settings and the output paths they would write to.
//!
//! # Usage
//!
//! ```bash
//! # Resolve a single prompt
//! aitk resolve "a cat --w 768 --seed 42" --output-folder ./samples --count 4
//!
//! # Expand a job file's sample prompts
//! aitk sample job.toml --output-folder ./samples
//!
//! # View configuration
//! aitk config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// aitk - configuration tooling for image generation and fine-tuning jobs.
#[derive(Parser, Debug)]
#[command(name = "aitk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve one prompt into a generation config and its output paths
    Resolve(cli::resolve::ResolveArgs),

    /// Resolve every sample prompt of a job file
    Sample(cli::sample::SampleArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match aitk_core::JobConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `aitk config path`."
            );
            aitk_core::JobConfig::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("aitk v{}", aitk_core::VERSION);

    match cli.command {
        Commands::Resolve(args) => cli::resolve::execute(args),
        Commands::Sample(args) => cli::sample::execute(args),
        Commands::Config(args) => cli::config::execute(args),
    }
}
