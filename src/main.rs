use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use qfilter::config::Config;
use qfilter::Dialect;

mod cli;

#[derive(Parser)]
#[command(name = "qf")]
#[command(author, version, about = "qfilter - compile tagged filters into SQL")]
struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config file (and optionally an example filter)
    Init {
        /// Also write an example filter to this path
        #[arg(long)]
        example: Option<PathBuf>,
    },

    /// Compile a filter file into SQL
    Compile {
        /// Filter definition (YAML or JSON)
        file: PathBuf,

        /// SQL dialect (mysql or pgsql); defaults to the database's driver
        #[arg(long)]
        dialect: Option<Dialect>,

        /// Database whose driver picks the dialect
        #[arg(long)]
        database: Option<String>,

        /// Page number, starting at 1
        #[arg(long)]
        page: Option<u64>,

        /// Rows per page
        #[arg(long, default_value_t = 20)]
        page_size: u64,

        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Run a filter against a configured SQLite database
    Run {
        /// Filter definition (YAML or JSON)
        file: PathBuf,

        /// Configured database name
        #[arg(long)]
        database: Option<String>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u64,

        /// Rows per page
        #[arg(long, default_value_t = 20)]
        page_size: u64,
    },

    /// Compile every filter file under a directory
    Check {
        /// Directory to scan
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Validate an `order[column]=direction` expression
    Order {
        expr: String,
    },
}

fn init_logging() {
    let filter = std::env::var("QFILTER_LOG")
        .ok()
        .and_then(|level| EnvFilter::try_new(level).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    if let Commands::Init { example } = &cli.command {
        return cli::commands::init(cli.config.as_deref(), example.as_deref());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Compile {
            file,
            dialect,
            database,
            page,
            page_size,
            json,
        } => {
            let dialect = dialect.unwrap_or_else(|| config.driver(database.as_deref()));
            let paging = page.map(|index| (page_size, index));
            cli::commands::compile(&config, &file, dialect, paging, json)
        }
        Commands::Run {
            file,
            database,
            page,
            page_size,
        } => cli::commands::run(&config, &file, database.as_deref(), (page_size, page)),
        Commands::Check { dir } => cli::commands::check(&config, &dir),
        Commands::Order { expr } => cli::commands::order(&expr),
    }
}
