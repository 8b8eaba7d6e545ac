use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transaction::NormalizedTransaction;

/// Sentinel returned by [`explain`] when a category came from
/// `default_category` or was never assigned at all.
pub const FALLBACK_RULE: &str = "fallback";

/// Closed predicate tree evaluated against one transaction. Leaves test the
/// raw description or the signed amount; `any`/`all` compose sub-predicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Unanchored regex search against the raw description.
    Regex(String),
    /// Case-insensitive substring test against the raw description.
    Contains(String),
    /// Strict `amount > value`.
    AmountGt(Decimal),
    /// Strict `amount < value`.
    AmountLt(Decimal),
    Any(Vec<Predicate>),
    All(Vec<Predicate>),
}

/// Field assignments a rule applies on match. Unknown field names are
/// rejected at load time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Assignments {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub when: Predicate,
    #[serde(default)]
    pub set: Assignments,
}

/// Ordered rule list plus optional fallback category. Read-only for the
/// duration of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_category: Option<String>,
}

#[derive(Debug, Error)]
pub enum RuleConfigError {
    #[error("failed to parse rule config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("rule '{rule_id}': invalid regex '{pattern}': {source}")]
    InvalidRegex {
        rule_id: String,
        pattern: String,
        source: regex::Error,
    },
}

enum CompiledPredicate {
    Regex(regex::Regex),
    /// Needle stored uppercased once instead of per transaction.
    Contains(String),
    AmountGt(Decimal),
    AmountLt(Decimal),
    Any(Vec<CompiledPredicate>),
    All(Vec<CompiledPredicate>),
}

struct CompiledRule {
    id: String,
    when: CompiledPredicate,
    set: Assignments,
}

/// Rule engine with every regex compiled up front, so a malformed ruleset
/// fails before any record is processed.
///
/// Precedence contract: rules run in list order and **the last matching rule
/// wins** for every field it sets. Configuration authors rely on this to let
/// late catch-all rules override earlier specific ones (or the reverse,
/// depending on authoring order) — it is not an accident of iteration.
pub struct RuleEngine {
    rules: Vec<CompiledRule>,
    default_category: Option<String>,
}

impl RuleEngine {
    pub fn new(ruleset: RuleSet) -> Result<Self, RuleConfigError> {
        let rules = ruleset
            .rules
            .into_iter()
            .map(|rule| {
                Ok(CompiledRule {
                    when: compile(&rule.id, rule.when)?,
                    id: rule.id,
                    set: rule.set,
                })
            })
            .collect::<Result<Vec<_>, RuleConfigError>>()?;

        Ok(Self {
            rules,
            default_category: ruleset.default_category,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, RuleConfigError> {
        let ruleset: RuleSet = toml::from_str(content)?;
        Self::new(ruleset)
    }

    /// Evaluate every rule against every transaction, in rule-list order.
    /// Each match applies the rule's assignments (overwriting anything set by
    /// earlier rules) and records the rule id. Afterwards, transactions with
    /// no category receive `default_category`, with no rule id recorded.
    pub fn apply(&self, transactions: &mut [NormalizedTransaction]) {
        for rule in &self.rules {
            for tx in transactions.iter_mut() {
                if eval(&rule.when, tx) {
                    if let Some(category) = &rule.set.category {
                        tx.category = Some(category.clone());
                    }
                    if let Some(counterparty) = &rule.set.counterparty {
                        tx.counterparty = Some(counterparty.clone());
                    }
                    tx.rule_id = Some(rule.id.clone());
                }
            }
        }

        if let Some(default) = &self.default_category {
            for tx in transactions.iter_mut().filter(|tx| tx.category.is_none()) {
                tx.category = Some(default.clone());
            }
        }
    }
}

fn compile(rule_id: &str, predicate: Predicate) -> Result<CompiledPredicate, RuleConfigError> {
    Ok(match predicate {
        Predicate::Regex(pattern) => {
            let regex = regex::Regex::new(&pattern).map_err(|source| {
                RuleConfigError::InvalidRegex {
                    rule_id: rule_id.to_string(),
                    pattern,
                    source,
                }
            })?;
            CompiledPredicate::Regex(regex)
        }
        Predicate::Contains(needle) => CompiledPredicate::Contains(needle.to_uppercase()),
        Predicate::AmountGt(limit) => CompiledPredicate::AmountGt(limit),
        Predicate::AmountLt(limit) => CompiledPredicate::AmountLt(limit),
        Predicate::Any(preds) => CompiledPredicate::Any(compile_all(rule_id, preds)?),
        Predicate::All(preds) => CompiledPredicate::All(compile_all(rule_id, preds)?),
    })
}

fn compile_all(
    rule_id: &str,
    predicates: Vec<Predicate>,
) -> Result<Vec<CompiledPredicate>, RuleConfigError> {
    predicates
        .into_iter()
        .map(|p| compile(rule_id, p))
        .collect()
}

fn eval(predicate: &CompiledPredicate, tx: &NormalizedTransaction) -> bool {
    match predicate {
        CompiledPredicate::Regex(regex) => regex.is_match(&tx.description),
        CompiledPredicate::Contains(needle) => tx.description.to_uppercase().contains(needle),
        CompiledPredicate::AmountGt(limit) => tx.amount > *limit,
        CompiledPredicate::AmountLt(limit) => tx.amount < *limit,
        CompiledPredicate::Any(preds) => preds.iter().any(|p| eval(p, tx)),
        CompiledPredicate::All(preds) => preds.iter().all(|p| eval(p, tx)),
    }
}

/// Audit lookup: the id of the rule that categorized a stored transaction,
/// or [`FALLBACK_RULE`] when the category came from the default (or nothing
/// ever matched).
pub fn explain(tx: &NormalizedTransaction) -> &str {
    tx.rule_id.as_deref().unwrap_or(FALLBACK_RULE)
}
