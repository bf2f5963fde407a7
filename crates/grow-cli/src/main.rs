mod client;
mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    assess::AssessSubcommand, catalog::CatalogSubcommand, config::ConfigSubcommand,
    leads::LeadsSubcommand, user::UserSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "grow",
    about = "Growth-coaching assessments, lead intake and marketplace",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .grow/)
    #[arg(long, global = true, env = "GROW_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Base URL of a running grow server, used by `assess take --submit` and `assess sync`
    #[arg(
        long,
        global = true,
        env = "GROW_API_URL",
        default_value = "http://localhost:3141"
    )]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .grow/, write a default config and seed the catalog
    Init,

    /// Run the HTTP server and marketing site
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,

        /// Don't open the browser
        #[arg(long)]
        no_open: bool,
    },

    /// Take, score and inspect assessments
    Assess {
        #[command(subcommand)]
        subcommand: AssessSubcommand,
    },

    /// Inspect form submissions
    Leads {
        #[command(subcommand)]
        subcommand: LeadsSubcommand,
    },

    /// List products and coaches
    Catalog {
        #[command(subcommand)]
        subcommand: CatalogSubcommand,
    },

    /// Manage site accounts
    User {
        #[command(subcommand)]
        subcommand: UserSubcommand,
    },

    /// Show or validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Serve { port, no_open } => cmd::serve::run(&root, port, no_open),
        Commands::Assess { subcommand } => cmd::assess::run(&root, subcommand, &cli.server, cli.json),
        Commands::Leads { subcommand } => cmd::leads::run(&root, subcommand, cli.json),
        Commands::Catalog { subcommand } => cmd::catalog::run(&root, subcommand, cli.json),
        Commands::User { subcommand } => cmd::user::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
