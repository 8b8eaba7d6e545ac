use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use ledgerize_core::{explain as explain_rule, process, RuleEngine, SourceBatch};
use ledgerize_import::{collect_csv_files, read_file, AccountMap};

pub struct ImportArgs {
    pub input_dir: PathBuf,
    pub rules: PathBuf,
    pub accounts: PathBuf,
    pub out: PathBuf,
    pub since: Option<NaiveDate>,
    pub currency: String,
    pub merge: bool,
    pub skip_bad_files: bool,
    pub snapshot: Option<PathBuf>,
}

fn load_rules(path: &Path) -> anyhow::Result<RuleEngine> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading ruleset {}", path.display()))?;
    RuleEngine::from_toml(&content)
        .with_context(|| format!("loading ruleset {}", path.display()))
}

fn load_accounts(path: &Path) -> anyhow::Result<AccountMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading account map {}", path.display()))?;
    AccountMap::from_toml(&content)
        .with_context(|| format!("loading account map {}", path.display()))
}

/// Gather source batches from a directory. With `skip_bad_files`, a file
/// with malformed records is logged and dropped; otherwise it fails the run.
fn read_batches(
    input_dir: &Path,
    accounts: &AccountMap,
    currency: &str,
    skip_bad_files: bool,
) -> anyhow::Result<Vec<SourceBatch>> {
    let mut batches = Vec::new();
    for path in collect_csv_files(input_dir)? {
        match read_file(&path, Some(input_dir), accounts, currency) {
            Ok(batch) => batches.push(batch),
            Err(err) if skip_bad_files => {
                tracing::warn!(file = %path.display(), error = %err, "skipping source file");
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("importing {}", path.display()));
            }
        }
    }
    Ok(batches)
}

pub async fn import(args: ImportArgs) -> anyhow::Result<()> {
    let engine = load_rules(&args.rules)?;
    let accounts = load_accounts(&args.accounts)?;

    std::fs::create_dir_all(&args.out)?;
    let db_path = args.out.join("ledgerize.db");
    if !args.merge && db_path.exists() {
        std::fs::remove_file(&db_path)?;
    }

    let mut batches = read_batches(
        &args.input_dir,
        &accounts,
        &args.currency,
        args.skip_bad_files,
    )?;
    if let Some(since) = args.since {
        for batch in &mut batches {
            batch.records.retain(|r| r.date >= since);
        }
    }

    let transactions = process(batches, &engine);

    let pool = ledgerize_storage::create_db(&db_path).await?;
    let inserted = ledgerize_storage::merge_transactions(&pool, &transactions).await?;
    ledgerize_storage::export_all(&transactions, &args.out)?;

    tracing::info!(
        normalized = transactions.len(),
        inserted,
        out = %args.out.display(),
        "import complete"
    );

    if let Some(archive) = &args.snapshot {
        ledgerize_storage::pack(&args.out, archive)?;
        tracing::info!(archive = %archive.display(), "snapshot written");
    }

    Ok(())
}

pub fn preview(
    csv_file: &Path,
    rules: &Path,
    accounts: &Path,
    n: usize,
) -> anyhow::Result<()> {
    let engine = load_rules(rules)?;
    let accounts = load_accounts(accounts)?;

    let batch = read_file(csv_file, None, &accounts, "EUR")?;
    let transactions = process(vec![batch], &engine);

    for tx in transactions.iter().take(n) {
        let amount = format!("{:.2}", tx.amount);
        println!(
            "{}  {:>10} {}  {:<12}  {:<16}  {}",
            tx.date,
            amount,
            tx.currency,
            tx.account,
            tx.category.as_deref().unwrap_or("-"),
            tx.description,
        );
    }
    Ok(())
}

pub async fn explain(db: &Path, query: &str) -> anyhow::Result<()> {
    // `create_db` creates a fresh file, which would silently turn a typoed
    // path into an empty database and a misleading "not found" answer.
    anyhow::ensure!(db.exists(), "database not found: {}", db.display());
    let pool = ledgerize_storage::create_db(db).await?;
    match ledgerize_storage::find_transaction(&pool, query).await? {
        Some(tx) => {
            let out = serde_json::json!({
                "transaction": tx,
                "rule": explain_rule(&tx),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        None => println!("Transaction not found"),
    }
    Ok(())
}
