use std::io::Read;
use std::path::Path;

use ledgerize_core::RawRecord;

use crate::accounts::AccountMap;
use crate::parse::{parse_amount, parse_date};
use crate::{open_reader, ImportError, SourceReader};

/// Reader for the N26 export dialect: semicolon-delimited with `Date`,
/// `Payee`, `Amount`, `Currency` and `Account` columns.
pub struct N26Reader;

impl SourceReader for N26Reader {
    fn read(
        &self,
        path: &Path,
        label: &str,
        accounts: &AccountMap,
        _currency: &str,
    ) -> Result<Vec<RawRecord>, ImportError> {
        let reader = open_reader(path, label, b';')?;
        parse_n26(reader, label, accounts)
    }
}

pub fn parse_n26<R: Read>(
    mut reader: csv::Reader<R>,
    file: &str,
    accounts: &AccountMap,
) -> Result<Vec<RawRecord>, ImportError> {
    let headers = reader.headers().map_err(|source| ImportError::Csv {
        file: file.to_string(),
        source,
    })?;

    let find = |name: &str| headers.iter().position(|h| h.trim() == name);
    let date_col = find("Date").ok_or_else(|| ImportError::missing_column(file, "Date"))?;
    let payee_col = find("Payee").ok_or_else(|| ImportError::missing_column(file, "Payee"))?;
    let amount_col = find("Amount").ok_or_else(|| ImportError::missing_column(file, "Amount"))?;
    let currency_col =
        find("Currency").ok_or_else(|| ImportError::missing_column(file, "Currency"))?;
    let account_col =
        find("Account").ok_or_else(|| ImportError::missing_column(file, "Account"))?;

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

        records.push(RawRecord {
            account: accounts.canonical(record.get(account_col).unwrap_or_default()),
            date,
            amount,
            currency: record.get(currency_col).unwrap_or_default().to_string(),
            description: record.get(payee_col).unwrap_or_default().to_string(),
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
        let reader = csv::ReaderBuilder::new().delimiter(b';').from_reader(data);
        parse_n26(reader, "n26-2024.csv", &AccountMap::default())
    }

    #[test]
    fn parses_semicolon_dialect() {
        let data = b"Date;Payee;Amount;Currency;Account\n05.01.2024;REWE Markt;-23,40;EUR;N26 Hauptkonto\n";
        let records = parse(data).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "REWE Markt");
        assert_eq!(records[0].amount, Decimal::from_str("-23.40").unwrap());
        assert_eq!(records[0].currency, "EUR");
        assert_eq!(records[0].account, "N26 Hauptkonto");
    }

    #[test]
    fn missing_column_is_reported() {
        let data = b"Date;Payee;Amount;Currency\n05.01.2024;X;-1,00;EUR\n";
        assert!(matches!(
            parse(data),
            Err(ImportError::MissingColumn { column, .. }) if column == "Account"
        ));
    }

    #[test]
    fn malformed_amount_reports_row() {
        let data =
            b"Date;Payee;Amount;Currency;Account\n05.01.2024;X;nope;EUR;N26\n";
        assert!(matches!(
            parse(data),
            Err(ImportError::InvalidAmount { row: 1, .. })
        ));
    }
}
