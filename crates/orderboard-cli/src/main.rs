mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, watch::WatchOptions, SelectionArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "orderboard",
    about = "Sales-order capacity board: fetch open orders and group them by delivery urgency",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: nearest orderboard.yaml above the working directory)
    #[arg(long, global = true, env = "ORDERBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default orderboard.yaml in the current directory
    Init,

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Check that the API accepts the configured credentials
    Ping,

    /// Fetch orders and print the grouped board
    Board {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Show at most N orders per group
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Export the filtered orders as CSV
    Export {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Refresh the board on an interval
    Watch {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Minutes between refreshes (default: refresh.interval_minutes)
        #[arg(long)]
        interval_minutes: Option<u64>,

        /// Bypass the fetch cache on every refresh
        #[arg(long)]
        force: bool,

        /// Refresh once and exit
        #[arg(long)]
        once: bool,

        /// Show at most N orders per group
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Watch { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let explicit = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root::init_target(explicit)),
        Commands::Config { subcommand } => {
            cmd::config::run(&root::resolve_config(explicit), subcommand, cli.json)
        }
        Commands::Ping => cmd::ping::run(&root::resolve_config(explicit), cli.json),
        Commands::Board { selection, limit } => {
            cmd::board::run(&root::resolve_config(explicit), &selection, limit, cli.json)
        }
        Commands::Export { selection, output } => {
            cmd::export::run(&root::resolve_config(explicit), &selection, output, cli.json)
        }
        Commands::Watch {
            selection,
            interval_minutes,
            force,
            once,
            limit,
        } => cmd::watch::run(
            &root::resolve_config(explicit),
            &selection,
            WatchOptions {
                interval_minutes,
                force,
                once,
                limit,
            },
            cli.json,
        ),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
