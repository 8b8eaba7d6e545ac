pub mod dedupe;
pub mod fingerprint;
pub mod normalize;
pub mod pipeline;
pub mod rules;
pub mod transaction;
pub(crate) mod util;

pub use dedupe::dedupe;
pub use fingerprint::fingerprint;
pub use normalize::normalize_description;
pub use pipeline::{normalize_record, process, SourceBatch};
pub use rules::{
    explain, Assignments, Predicate, Rule, RuleConfigError, RuleEngine, RuleSet, FALLBACK_RULE,
};
pub use transaction::{NormalizedTransaction, RawRecord};
