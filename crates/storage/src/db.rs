use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use ledgerize_core::NormalizedTransaction;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use thiserror::Error;

pub type DbPool = Pool<Sqlite>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("corrupt row {id}: bad {field} value '{value}'")]
    Corrupt {
        id: String,
        field: &'static str,
        value: String,
    },
}

pub async fn create_db(path: &Path) -> Result<DbPool, StorageError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            account TEXT NOT NULL,
            date TEXT NOT NULL,
            amount TEXT NOT NULL,
            currency TEXT NOT NULL,
            description TEXT NOT NULL,
            norm_desc TEXT NOT NULL,
            category TEXT,
            counterparty TEXT,
            rule_id TEXT,
            raw_source TEXT NOT NULL,
            raw_rownum INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Merge a batch into storage, keyed by fingerprint id. A transaction whose
/// id is already present is left untouched, so re-importing overlapping
/// exports never duplicates or rewrites rows. Returns how many rows were
/// actually inserted.
pub async fn merge_transactions(
    pool: &DbPool,
    transactions: &[NormalizedTransaction],
) -> Result<u64, StorageError> {
    let mut inserted = 0u64;
    for tx in transactions {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO transactions
                (id, account, date, amount, currency, description, norm_desc,
                 category, counterparty, rule_id, raw_source, raw_rownum)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tx.id)
        .bind(&tx.account)
        .bind(tx.date.format("%Y-%m-%d").to_string())
        .bind(format!("{:.2}", tx.amount))
        .bind(&tx.currency)
        .bind(&tx.description)
        .bind(&tx.norm_desc)
        .bind(&tx.category)
        .bind(&tx.counterparty)
        .bind(&tx.rule_id)
        .bind(&tx.raw_source)
        .bind(tx.raw_rownum as i64)
        .execute(pool)
        .await?;
        inserted += result.rows_affected();
    }

    tracing::debug!(batch = transactions.len(), inserted, "merged batch");
    Ok(inserted)
}

type TransactionRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    i64,
);

const SELECT_COLUMNS: &str = "id, account, date, amount, currency, description, norm_desc, \
     category, counterparty, rule_id, raw_source, raw_rownum";

fn from_row(row: TransactionRow) -> Result<NormalizedTransaction, StorageError> {
    let date = NaiveDate::parse_from_str(&row.2, "%Y-%m-%d").map_err(|_| StorageError::Corrupt {
        id: row.0.clone(),
        field: "date",
        value: row.2.clone(),
    })?;
    let amount = Decimal::from_str(&row.3).map_err(|_| StorageError::Corrupt {
        id: row.0.clone(),
        field: "amount",
        value: row.3.clone(),
    })?;

    Ok(NormalizedTransaction {
        id: row.0,
        account: row.1,
        date,
        amount,
        currency: row.4,
        description: row.5,
        norm_desc: row.6,
        category: row.7,
        counterparty: row.8,
        rule_id: row.9,
        raw_source: row.10,
        raw_rownum: row.11 as usize,
    })
}

pub async fn read_transactions(
    pool: &DbPool,
    limit: i64,
) -> Result<Vec<NormalizedTransaction>, StorageError> {
    let rows = sqlx::query_as::<_, TransactionRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM transactions ORDER BY date DESC, id LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(from_row).collect()
}

/// Audit lookup: find one transaction by exact id or description substring.
pub async fn find_transaction(
    pool: &DbPool,
    query: &str,
) -> Result<Option<NormalizedTransaction>, StorageError> {
    let row = sqlx::query_as::<_, TransactionRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM transactions WHERE id = ? OR description LIKE ? LIMIT 1"
    ))
    .bind(query)
    .bind(format!("%{query}%"))
    .fetch_optional(pool)
    .await?;

    row.map(from_row).transpose()
}

pub async fn count_transactions(pool: &DbPool) -> Result<i64, StorageError> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
