use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, info};

use finfolio_cli::config::{FileConfig, Overrides, Settings};
use finfolio_cli::tui::{self, FormSession};
use finfolio_cli::utils::parse_decimal;
use finfolio_cli::{app, logging};
use finfolio_core::InvestmentRepository;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Tracks fixed-income investments and their realized returns.
#[derive(Debug, Parser)]
#[command(name = "finfolio", version)]
struct Cli {
    /// Storage backend ("sqlite" or "memory"). Default: sqlite.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Connection string. For SQLite a file path (e.g. `finfolio.db`) or
    /// `:memory:`. Default: finfolio.db.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Config file. Default: finfolio.toml in the working directory, if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log level or EnvFilter directive. Default: info.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record a new investment through an interactive form.
    Add,

    /// Supply the realized gross return and tax of an investment.
    Settle {
        id: i64,

        #[arg(long, value_parser = parse_decimal)]
        gross_return: Decimal,

        #[arg(long, value_parser = parse_decimal)]
        tax: Decimal,
    },

    /// Print one investment.
    Show { id: i64 },

    /// Print every investment and portfolio totals.
    List,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            backend: self.backend.clone(),
            db: self.db.clone(),
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_default_logging();

    let cli = Cli::parse();

    let file = FileConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(file, cli.overrides());

    // RUST_LOG wins over the config file, but not over an explicit flag.
    if cli.log_level.is_some() || std::env::var_os("RUST_LOG").is_none() {
        logging::set_log_level(&settings.log_level)?;
    }
    if let Some(path) = &settings.log_file {
        logging::enable_file_logging(path)?;
    }

    debug!(?settings, "resolved settings");
    let repo = app::open_repository(&settings.db).await?;

    let result = run(cli.command, repo.as_ref()).await;

    repo.close().await;
    logging::disable_file_logging();
    result
}

async fn run(
    command: Command,
    repo: &dyn InvestmentRepository,
) -> Result<()> {
    let mut out = io::stdout();

    match command {
        Command::Add => match tui::run_add_form().context("investment form failed")? {
            FormSession::Submitted(draft) => app::record(repo, draft, &mut out).await,
            FormSession::Cancelled => {
                info!("nothing recorded");
                Ok(())
            }
        },
        Command::Settle {
            id,
            gross_return,
            tax,
        } => app::settle(repo, id, gross_return, tax, &mut out).await,
        Command::Show { id } => app::show(repo, id, &mut out).await,
        Command::List => app::list(repo, &mut out).await,
    }
}
