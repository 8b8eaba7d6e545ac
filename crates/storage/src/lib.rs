pub mod db;
pub mod export;
pub mod snapshot;

pub use db::{
    count_transactions, create_db, find_transaction, merge_transactions, read_transactions,
    DbPool, StorageError,
};
pub use export::{export_all, export_csv, export_jsonl, ExportError};
pub use snapshot::{pack, unpack, SnapshotError};
