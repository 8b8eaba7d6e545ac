use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ledgerize", about = "Normalize, dedupe and categorize bank exports")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a directory of CSV exports into a SQLite database plus flat exports
    Import {
        input_dir: PathBuf,
        /// TOML ruleset (ordered rules + optional default_category)
        #[arg(long)]
        rules: PathBuf,
        /// TOML account-mapping config
        #[arg(long)]
        accounts: PathBuf,
        /// Output directory for the database and exports
        #[arg(long)]
        out: PathBuf,
        /// Drop records dated before this day (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,
        /// Currency for sources without a currency column
        #[arg(long, default_value = "EUR")]
        currency: String,
        /// Merge into an existing database instead of starting fresh
        #[arg(long)]
        merge: bool,
        /// Skip files with malformed records instead of failing the run
        #[arg(long)]
        skip_bad_files: bool,
        /// Also pack the output directory into this tar.gz archive
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Preview the first N normalized rows of one CSV file
    Preview {
        csv_file: PathBuf,
        #[arg(long)]
        rules: PathBuf,
        #[arg(long)]
        accounts: PathBuf,
        #[arg(long, default_value_t = 20)]
        n: usize,
    },
    /// Show which rule categorized a stored transaction
    Explain {
        /// Database file produced by `import`
        #[arg(long)]
        db: PathBuf,
        /// Transaction id or description fragment
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Command::Import {
            input_dir,
            rules,
            accounts,
            out,
            since,
            currency,
            merge,
            skip_bad_files,
            snapshot,
        } => {
            commands::import(commands::ImportArgs {
                input_dir,
                rules,
                accounts,
                out,
                since,
                currency,
                merge,
                skip_bad_files,
                snapshot,
            })
            .await
        }
        Command::Preview {
            csv_file,
            rules,
            accounts,
            n,
        } => commands::preview(&csv_file, &rules, &accounts, n),
        Command::Explain { db, query } => commands::explain(&db, &query).await,
    }
}
