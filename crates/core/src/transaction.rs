use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row as it came out of a source file, after the per-bank reader has
/// mapped its columns and canonicalized the account name. Consumed by the
/// pipeline; never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub account: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub source: String,
    pub rownum: usize,
}

/// The canonical transaction entity.
///
/// `id` is a pure function of `(account, date, amount to 2 decimals,
/// currency, norm_desc)` — re-importing the same logical transaction always
/// produces the same `id`, which storage uses as its merge key.
///
/// Only the rule engine mutates a transaction after construction, and only
/// the `category`, `counterparty` and `rule_id` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    pub id: String,
    pub account: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub currency: String,
    /// Original description, preserved verbatim for audit.
    pub description: String,
    /// Canonical comparable form of the description.
    pub norm_desc: String,
    pub category: Option<String>,
    pub counterparty: Option<String>,
    /// Id of the last rule that matched, if any. Absent when the category
    /// came from the ruleset's default or was never assigned.
    pub rule_id: Option<String>,
    pub raw_source: String,
    pub raw_rownum: usize,
}
