use serde::{Deserialize, Serialize};

/// One account-mapping entry: any raw account string containing `pattern`
/// maps to the canonical `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMapping {
    #[serde(rename = "match")]
    pub pattern: String,
    pub name: String,
}

/// Canonicalizes raw account strings before they reach the engine, so that
/// "N26 Hauptkonto" and "N26 Main" can both fingerprint as the same account.
/// First matching entry wins; unmapped accounts pass through unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountMap {
    #[serde(default)]
    pub accounts: Vec<AccountMapping>,
}

impl AccountMap {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn canonical(&self, raw: &str) -> String {
        self.accounts
            .iter()
            .find(|m| raw.contains(&m.pattern))
            .map(|m| m.name.clone())
            .unwrap_or_else(|| raw.to_string())
    }
}
