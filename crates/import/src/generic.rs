use std::io::Read;
use std::path::Path;

use ledgerize_core::RawRecord;

use crate::accounts::AccountMap;
use crate::parse::{parse_amount, parse_date};
use crate::{open_reader, ImportError, SourceReader};

/// Header-driven reader for the common export shape: named `date`, `amount`
/// and `description` columns, with optional `currency` and `account`.
/// Handles any bank that exports plain comma-separated CSV.
pub struct GenericReader;

impl SourceReader for GenericReader {
    fn read(
        &self,
        path: &Path,
        label: &str,
        accounts: &AccountMap,
        currency: &str,
    ) -> Result<Vec<RawRecord>, ImportError> {
        let reader = open_reader(path, label, b',')?;
        parse_generic(reader, label, accounts, currency)
    }
}

pub fn parse_generic<R: Read>(
    mut reader: csv::Reader<R>,
    file: &str,
    accounts: &AccountMap,
    currency: &str,
) -> Result<Vec<RawRecord>, ImportError> {
    let headers = reader.headers().map_err(|source| ImportError::Csv {
        file: file.to_string(),
        source,
    })?;

    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let date_col = find("date").ok_or_else(|| ImportError::missing_column(file, "date"))?;
    let amount_col = find("amount").ok_or_else(|| ImportError::missing_column(file, "amount"))?;
    let desc_col =
        find("description").ok_or_else(|| ImportError::missing_column(file, "description"))?;
    let currency_col = find("currency");
    let account_col = find("account");

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let record = result.map_err(|source| ImportError::Csv {
            file: file.to_string(),
            source,
        })?;
        if record.is_empty() {
            continue;
        }

        let date_field = record.get(date_col).unwrap_or_default();
        let date = parse_date(date_field)
            .ok_or_else(|| ImportError::invalid_date(file, row, date_field))?;

        let amount_field = record.get(amount_col).unwrap_or_default();
        let amount = parse_amount(amount_field)
            .ok_or_else(|| ImportError::invalid_amount(file, row, amount_field))?;

        let description = record.get(desc_col).unwrap_or_default().to_string();
        let currency = currency_col
            .and_then(|c| record.get(c))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(currency)
            .to_string();
        let account = account_col
            .and_then(|c| record.get(c))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("UNKNOWN");

        records.push(RawRecord {
            account: accounts.canonical(account),
            date,
            amount,
            currency,
            description,
            source: file.to_string(),
            rownum: row,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn parse(data: &[u8]) -> Result<Vec<RawRecord>, ImportError> {
        let reader = csv::ReaderBuilder::new().from_reader(data);
        parse_generic(reader, "test.csv", &AccountMap::default(), "EUR")
    }

    #[test]
    fn parses_basic_rows() {
        let data = b"date,description,amount\n2024-01-05,Carrefour Market,-12.50\n2024-01-06,Loyer,-800\n";
        let records = parse(data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "Carrefour Market");
        assert_eq!(records[0].amount, Decimal::from_str("-12.50").unwrap());
        assert_eq!(records[0].currency, "EUR");
        assert_eq!(records[0].account, "UNKNOWN");
        assert_eq!(records[0].rownum, 1);
        assert_eq!(records[1].rownum, 2);
    }

    #[test]
    fn currency_and_account_columns_override_defaults() {
        let data = b"date,description,amount,currency,account\n2024-01-05,X,-1.00,USD,CompteA\n";
        let records = parse(data).unwrap();
        assert_eq!(records[0].currency, "USD");
        assert_eq!(records[0].account, "CompteA");
    }

    #[test]
    fn account_is_canonicalized() {
        let accounts = AccountMap::from_toml(
            "[[accounts]]\nmatch = \"N26\"\nname = \"CompteN26\"\n",
        )
        .unwrap();
        let data = b"date,description,amount,account\n2024-01-05,X,-1.00,N26 Hauptkonto\n";
        let reader = csv::ReaderBuilder::new().from_reader(data.as_ref());
        let records = parse_generic(reader, "test.csv", &accounts, "EUR").unwrap();
        assert_eq!(records[0].account, "CompteN26");
    }

    #[test]
    fn missing_required_column() {
        let data = b"date,description\n2024-01-05,X\n";
        assert!(matches!(
            parse(data),
            Err(ImportError::MissingColumn { column, .. }) if column == "amount"
        ));
    }

    #[test]
    fn malformed_date_reports_file_and_row() {
        let data = b"date,description,amount\n2024-01-05,OK,-1.00\nbogus,BAD,-2.00\n";
        match parse(data) {
            Err(ImportError::InvalidDate { file, row, value }) => {
                assert_eq!(file, "test.csv");
                assert_eq!(row, 2);
                assert_eq!(value, "bogus");
            }
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn malformed_amount_reports_file_and_row() {
        let data = b"date,description,amount\n2024-01-05,BAD,oops\n";
        assert!(matches!(
            parse(data),
            Err(ImportError::InvalidAmount { row: 1, .. })
        ));
    }

    #[test]
    fn empty_file_yields_no_records() {
        let data = b"date,description,amount\n";
        assert!(parse(data).unwrap().is_empty());
    }
}
