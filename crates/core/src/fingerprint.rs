use chrono::NaiveDate;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

/// Derive the content-addressed identifier for a transaction from its stable
/// fields: canonical account, ISO date, amount formatted to exactly two
/// decimals, currency code and normalized description.
///
/// A `|` separator byte is fed to the hasher after every field, including the
/// last, so different field splits can never concatenate to the same digest
/// input. The result is a lowercase hex SHA-256 string and serves as the
/// primary key and merge-join key downstream.
pub fn fingerprint(
    account: &str,
    date: NaiveDate,
    amount: Decimal,
    currency: &str,
    norm_desc: &str,
) -> String {
    let date = date.format("%Y-%m-%d").to_string();
    let amount = format!("{:.2}", amount);

    let mut hasher = Sha256::new();
    for part in [account, date.as_str(), amount.as_str(), currency, norm_desc] {
        hasher.update(part.as_bytes());
        hasher.update(b"|");
    }
    let digest: [u8; 32] = hasher.finalize().into();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
