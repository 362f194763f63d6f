//! GraphLens CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;

use config::{AppConfig, DEFAULT_CONFIG_FILE};

#[derive(Parser)]
#[command(name = "graphlens")]
#[command(about = "Load, query, edit and render labeled graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./graphlens.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Queries applied in order: every search, then every filter.
#[derive(clap::Args, Debug, Default)]
pub struct QueryArgs {
    /// Case-insensitive text search (repeatable)
    #[arg(short, long)]
    search: Vec<String>,

    /// Filter expression such as "age > 30" (repeatable)
    #[arg(short, long)]
    filter: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Loader for a workspace opened at startup
        #[arg(long, requires = "data")]
        loader: Option<String>,

        /// Data file for the startup workspace
        #[arg(long, requires = "loader")]
        data: Option<PathBuf>,

        /// Directory that workspace loads requested over HTTP are confined to
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Load a graph, apply queries and print the result as JSON
    Show {
        loader: String,
        path: PathBuf,
        #[command(flatten)]
        queries: QueryArgs,
    },
    /// Load a graph, apply queries and print rendered markup
    Render {
        loader: String,
        path: PathBuf,
        /// Renderer key, e.g. simple, block, tree or bird
        #[arg(long)]
        visualizer: Option<String>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        #[command(flatten)]
        queries: QueryArgs,
    },
    /// List registered loaders and renderers
    Plugins,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // Initialize logging; RUST_LOG wins over --verbose
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "graphlens={log_level},graphlens_core={log_level},graphlens_loaders={log_level},graphlens_render={log_level},graphlens_server={log_level}"
        ))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = AppConfig::load(&config_path, cli.config.is_some())?;
    config.apply_env()?;

    match cli.command {
        Commands::Serve { port, host, open, loader, data, data_dir } => {
            if let Some(dir) = data_dir {
                config.server.data_dir = dir;
            }
            let startup = loader.zip(data);
            commands::serve(config, host, port, open, startup).await
        }
        Commands::Show { loader, path, queries } => {
            commands::show(&config, &loader, &path, &queries)
        }
        Commands::Render { loader, path, visualizer, width, height, queries } => {
            let options = commands::RenderOptions { visualizer, width, height };
            commands::render(&config, &loader, &path, &queries, options)
        }
        Commands::Plugins => commands::plugins(&config),
        Commands::Version => {
            println!("GraphLens v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
