use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::transaction::NormalizedTransaction;
use crate::util::levenshtein;

/// Edit-distance ceiling under which two descriptions sharing an
/// `(account, date, amount)` bucket are treated as the same transaction.
const NEAR_DUP_MAX_EDITS: usize = 2;

type BucketKey = (String, NaiveDate, Decimal);

/// Collapse duplicates within one batch, in input order.
///
/// Two passes folded into one:
/// - exact duplicates: a second record with an already-seen `id` is dropped;
///   the first occurrence wins.
/// - near duplicates: per `(account, date, amount)` bucket, a record whose
///   `norm_desc` is within [`NEAR_DUP_MAX_EDITS`] edits of the most recently
///   kept record in that bucket is dropped; otherwise it is kept and becomes
///   the bucket's new reference.
///
/// Input order is part of the contract: the caller must present records in a
/// deterministic order or dedup outcomes will differ between runs. Note a
/// candidate is only compared against the latest kept record per bucket, not
/// all of them, so a description drifting one edit per row can survive as
/// several rows.
pub fn dedupe(transactions: Vec<NormalizedTransaction>) -> Vec<NormalizedTransaction> {
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut last_kept: HashMap<BucketKey, String> = HashMap::new();
    let mut kept = Vec::with_capacity(transactions.len());

    for tx in transactions {
        if !seen_ids.insert(tx.id.clone()) {
            tracing::debug!(id = %tx.id, source = %tx.raw_source, row = tx.raw_rownum,
                "dropping exact duplicate");
            continue;
        }

        let key = (tx.account.clone(), tx.date, tx.amount);
        if let Some(reference) = last_kept.get(&key) {
            if levenshtein(reference, &tx.norm_desc) <= NEAR_DUP_MAX_EDITS {
                tracing::debug!(description = %tx.description, source = %tx.raw_source,
                    row = tx.raw_rownum, "dropping near duplicate");
                continue;
            }
        }

        last_kept.insert(key, tx.norm_desc.clone());
        kept.push(tx);
    }

    kept
}
