mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{
    category::CategorySubcommand, config::ConfigSubcommand, library::LibrarySubcommand,
    part::PartSubcommand, Context,
};
use partsdb_core::config::{Config, DEFAULT_CONFIG_FILE, DSN_ENV};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "partsdb",
    about = "KiCad HTTP parts library backed by PostgreSQL",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (missing file = built-in defaults)
    #[arg(long, global = true, env = "PARTSDB_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// PostgreSQL connection URL (overrides the config file and DB_DSN)
    #[arg(long, global = true)]
    dsn: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the KiCad HTTP library API
    Serve {
        /// Interface to bind (default from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default from config)
        #[arg(long)]
        port: Option<u16>,
        /// Serve a seeded in-memory store instead of PostgreSQL
        #[arg(long)]
        memory: bool,
    },

    /// Create tables, indexes and the part guard trigger
    InitDb {
        /// Skip installing the rename guard / updated_at trigger
        #[arg(long)]
        no_triggers: bool,
    },

    /// Initialise the schema and load sample data (container default command)
    Bootstrap,

    /// List categories
    Categories {
        /// Include inactive categories
        #[arg(long)]
        all: bool,
    },

    /// List the active parts of a category
    Parts { category_id: i32 },

    /// Show a part as KiCad receives it
    Show { part_id: i32 },

    /// Add, retire or restore categories
    Category {
        #[command(subcommand)]
        subcommand: CategorySubcommand,
    },

    /// Add, edit, retire or restore parts
    Part {
        #[command(subcommand)]
        subcommand: PartSubcommand,
    },

    /// Per-library tables for KiCad database libraries
    Library {
        #[command(subcommand)]
        subcommand: LibrarySubcommand,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } | Commands::Bootstrap | Commands::InitDb { .. } => {
            tracing::Level::INFO
        }
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = Config::load(&cli.config)
        .map_err(anyhow::Error::from)
        .map(|c| c.with_overrides(std::env::var(DSN_ENV).ok(), cli.dsn.clone()))
        .and_then(|config| {
            let ctx = Context {
                config,
                config_path: cli.config.clone(),
                json: cli.json,
            };
            dispatch(&ctx, cli.command)
        });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn dispatch(ctx: &Context, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port, memory } => cmd::serve::run(ctx, host, port, memory),
        Commands::InitDb { no_triggers } => cmd::db::init(ctx, !no_triggers),
        Commands::Bootstrap => cmd::db::bootstrap(ctx),
        Commands::Categories { all } => cmd::query::categories(ctx, all),
        Commands::Parts { category_id } => cmd::query::parts(ctx, category_id),
        Commands::Show { part_id } => cmd::query::show(ctx, part_id),
        Commands::Category { subcommand } => cmd::category::run(ctx, subcommand),
        Commands::Part { subcommand } => cmd::part::run(ctx, subcommand),
        Commands::Library { subcommand } => cmd::library::run(ctx, subcommand),
        Commands::Config { subcommand } => cmd::config::run(ctx, subcommand),
    }
}
