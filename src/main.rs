//! readalong CLI entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "readalong")]
#[command(author, version)]
#[command(about = "Keep audio playback in sync with the paragraphs of an article")]
#[command(long_about = "Keep audio playback in sync with the paragraphs of an article.

Paragraph timings are estimated from character counts: each paragraph gets a
share of the audio duration proportional to its length. Listening positions
are remembered per article and the playback speed is remembered globally.

Set RUST_LOG (e.g. RUST_LOG=readalong=debug) for diagnostic output.")]
struct Cli {
    /// State file for positions and rate (overrides storage.path)
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the estimated time span of every paragraph
    #[command(long_about = "Print the estimated time span of every paragraph.

EXAMPLE:
    readalong boundaries article.txt --duration 312.5")]
    Boundaries {
        /// Article text file (paragraphs separated by blank lines)
        file: PathBuf,
        /// Audio duration in seconds
        #[arg(long)]
        duration: f64,
    },

    /// Show which paragraph is read at the given timestamps
    Resolve {
        /// Article text file
        file: PathBuf,
        /// Audio duration in seconds
        #[arg(long)]
        duration: f64,
        /// Timestamps in seconds
        #[arg(long = "at", required = true, num_args = 1..)]
        at: Vec<f64>,
    },

    /// Play the article against a virtual clock and print highlight changes
    #[command(long_about = "Play the article against a virtual clock and print highlight changes.

The saved position for the article is restored first and updated as the
simulation runs, so a run stopped with --stop-at resumes where it left off.

EXAMPLES:
    readalong simulate article.txt --duration 120
    readalong simulate article.txt --duration 120 --rate 1.5 --stop-at 40")]
    Simulate {
        /// Article text file
        file: PathBuf,
        /// Audio duration in seconds
        #[arg(long)]
        duration: f64,
        /// Position key (defaults to the file path)
        #[arg(long)]
        key: Option<String>,
        /// Switch to this playback rate before starting
        #[arg(long)]
        rate: Option<f64>,
        /// Virtual seconds per tick
        #[arg(long, default_value_t = 0.25)]
        step: f64,
        /// Pause once playback reaches this position
        #[arg(long, value_name = "SECONDS")]
        stop_at: Option<f64>,
        /// Keep state in memory only
        #[arg(long)]
        ephemeral: bool,
    },

    /// Interactive read-along in the terminal
    #[command(long_about = "Interactive read-along in the terminal.

Shows the active paragraph with a progress bar (click to seek) and runs a
real-time clock. Press ? for keyboard shortcuts.")]
    Listen {
        /// Article text file
        file: PathBuf,
        /// Audio duration in seconds
        #[arg(long)]
        duration: f64,
        /// Position key (defaults to the file path)
        #[arg(long)]
        key: Option<String>,
    },

    /// Show or clear the saved position for an article
    Position {
        /// Position key
        key: String,
        /// Forget the saved position
        #[arg(long)]
        clear: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print the config file location
    Path,
    /// Write a config file with default settings
    Init,
}

#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = cli.store.as_deref();

    match cli.command {
        Commands::Boundaries { file, duration } => {
            commands::boundaries::handle_boundaries(&file, duration)
        }
        Commands::Resolve { file, duration, at } => {
            commands::boundaries::handle_resolve(&file, duration, &at)
        }
        Commands::Simulate {
            file,
            duration,
            key,
            rate,
            step,
            stop_at,
            ephemeral,
        } => commands::simulate::handle(
            &file,
            commands::simulate::SimulateArgs {
                duration,
                key,
                rate,
                step,
                stop_at,
                ephemeral,
            },
            store,
        ),
        Commands::Listen {
            file,
            duration,
            key,
        } => commands::listen::handle(&file, duration, key, store),
        Commands::Position { key, clear } => commands::position::handle(&key, clear, store),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(),
            ConfigCommands::Path => commands::config::handle_path(),
            ConfigCommands::Init => commands::config::handle_init(),
        },
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "readalong",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
