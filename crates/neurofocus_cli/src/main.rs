mod commands;
mod output;

use clap::{Parser, Subcommand};
use miette::Result;
use neurofocus_core::config;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "neurofocus-cli")]
#[command(about = "NeuroFocus ADHD productivity advisor")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the prompt a request would send
    Prompt {
        /// Advisory request JSON file
        request: PathBuf,
    },
    /// Ask the model for advice, falling back to local heuristics
    Advise {
        /// Advisory request JSON file
        request: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Model to use (e.g. gemini-1.5-flash, gpt-4o-mini)
        #[arg(long)]
        model: Option<String>,
    },
    /// Compute the local heuristic result without calling a model
    Fallback {
        /// Advisory request JSON file
        request: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show sample insights
    Demo,
    /// Configuration management
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Save current configuration to file
    Save {
        /// Path to save configuration
        #[arg(default_value = "neurofocus.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .rgb_colors(miette::RgbColors::Preferred)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))?;
    miette::set_panic_hook();
    let cli = Cli::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if cli.debug {
        EnvFilter::new("neurofocus_core=debug,neurofocus_cli=debug")
    } else {
        // Show info level for neurofocus crates, warn for everything else
        EnvFilter::new("neurofocus_core=info,neurofocus_cli=info,warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut config = if let Some(config_path) = &cli.config {
        info!("Loading config from: {:?}", config_path);
        config::load_config(config_path).await?
    } else {
        config::load_config_from_standard_locations().await?
    };

    match &cli.command {
        Commands::Prompt { request } => commands::advise::prompt(request).await?,
        Commands::Advise {
            request,
            json,
            model,
        } => {
            if let Some(model) = model {
                info!("Overriding model with: {}", model);
                config.model.model = Some(model.clone());
            }
            commands::advise::advise(request, *json, &config).await?
        }
        Commands::Fallback { request, json } => {
            commands::advise::fallback(request, *json).await?
        }
        Commands::Demo => commands::advise::demo().await?,
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => commands::config::show(&config).await?,
            ConfigCommands::Save { path } => commands::config::save(&config, path).await?,
        },
    }

    Ok(())
}
