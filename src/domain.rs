use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use thiserror::Error;

/// Column layout of the input statement: date, client, client type,
/// transaction type, amount, currency.
pub const STATEMENT_COLUMNS: usize = 6;

pub type ClientId = u32;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("expected 6 columns, found {0}")]
    ColumnCount(usize),
    #[error("unknown client type: {0}")]
    UnknownClientType(String),
    #[error("unknown transaction type: {0}")]
    UnknownTransactionType(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid client id: {0}")]
    InvalidClientId(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("amount must not be negative: {0}")]
    NegativeAmount(Decimal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    Private,
    Business,
}

impl FromStr for ClientType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "private" => Ok(ClientType::Private),
            "business" => Ok(ClientType::Business),
            other => Err(RecordError::UnknownClientType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Deposit,
    Withdraw,
}

impl FromStr for TransactionType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "deposit" => Ok(TransactionType::Deposit),
            "withdraw" => Ok(TransactionType::Withdraw),
            other => Err(RecordError::UnknownTransactionType(other.to_string())),
        }
    }
}

/// One line of the statement exactly as it appears in the CSV. Kept as raw
/// strings so the output can echo the original columns back, with rows that
/// fail validation annotated instead of dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub date: String,
    pub client: String,
    pub client_type: String,
    pub transaction_type: String,
    pub amount: String,
    pub currency: String,
}

impl CsvRow {
    pub fn from_record(record: &StringRecord) -> Result<Self, RecordError> {
        if record.len() != STATEMENT_COLUMNS {
            return Err(RecordError::ColumnCount(record.len()));
        }
        Ok(CsvRow {
            date: record[0].to_string(),
            client: record[1].to_string(),
            client_type: record[2].to_string(),
            transaction_type: record[3].to_string(),
            amount: record[4].to_string(),
            currency: record[5].to_string(),
        })
    }

    pub fn columns(&self) -> [&str; STATEMENT_COLUMNS] {
        [
            &self.date,
            &self.client,
            &self.client_type,
            &self.transaction_type,
            &self.amount,
            &self.currency,
        ]
    }
}

/// A validated transaction, the only shape the commission engine accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub client_id: ClientId,
    pub client_type: ClientType,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub currency: String,
}

impl TryFrom<&CsvRow> for TransactionRecord {
    type Error = RecordError;

    fn try_from(row: &CsvRow) -> Result<Self, Self::Error> {
        let client_type = row.client_type.parse::<ClientType>()?;
        let transaction_type = row.transaction_type.parse::<TransactionType>()?;
        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
            .map_err(|_| RecordError::InvalidDate(row.date.clone()))?;
        let client_id = row
            .client
            .trim()
            .parse::<ClientId>()
            .map_err(|_| RecordError::InvalidClientId(row.client.clone()))?;
        let amount = row
            .amount
            .trim()
            .parse::<Decimal>()
            .map_err(|_| RecordError::InvalidAmount(row.amount.clone()))?;
        if amount.is_sign_negative() {
            return Err(RecordError::NegativeAmount(amount));
        }

        Ok(TransactionRecord {
            date,
            client_id,
            client_type,
            transaction_type,
            amount,
            currency: row.currency.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn sample_row() -> CsvRow {
        CsvRow {
            date: "2016-01-05".to_string(),
            client: "1".to_string(),
            client_type: "private".to_string(),
            transaction_type: "deposit".to_string(),
            amount: "200.00".to_string(),
            currency: "EUR".to_string(),
        }
    }

    #[test]
    fn validates_a_well_formed_row() {
        let record = TransactionRecord::try_from(&sample_row()).unwrap();

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2016, 1, 5).unwrap());
        assert_eq!(record.client_id, 1);
        assert_eq!(record.client_type, ClientType::Private);
        assert_eq!(record.transaction_type, TransactionType::Deposit);
        assert_eq!(record.amount, dec!(200.00));
        assert_eq!(record.currency, "EUR");
    }

    #[test]
    fn rejects_unknown_enum_values() {
        let mut row = sample_row();
        row.client_type = "corporate".to_string();
        assert_eq!(
            TransactionRecord::try_from(&row),
            Err(RecordError::UnknownClientType("corporate".to_string()))
        );

        let mut row = sample_row();
        row.transaction_type = "transfer".to_string();
        assert_eq!(
            TransactionRecord::try_from(&row),
            Err(RecordError::UnknownTransactionType("transfer".to_string()))
        );
    }

    #[test]
    fn enum_matching_is_case_sensitive_like_the_upstream_validator() {
        let mut row = sample_row();
        row.client_type = "Private".to_string();
        assert!(TransactionRecord::try_from(&row).is_err());
    }

    #[test]
    fn rejects_bad_dates_amounts_and_ids() {
        let mut row = sample_row();
        row.date = "05/01/2016".to_string();
        assert!(matches!(
            TransactionRecord::try_from(&row),
            Err(RecordError::InvalidDate(_))
        ));

        let mut row = sample_row();
        row.amount = "two hundred".to_string();
        assert!(matches!(
            TransactionRecord::try_from(&row),
            Err(RecordError::InvalidAmount(_))
        ));

        let mut row = sample_row();
        row.amount = "-5.00".to_string();
        assert_eq!(
            TransactionRecord::try_from(&row),
            Err(RecordError::NegativeAmount(dec!(-5.00)))
        );

        let mut row = sample_row();
        row.client = "-3".to_string();
        assert!(matches!(
            TransactionRecord::try_from(&row),
            Err(RecordError::InvalidClientId(_))
        ));
    }

    #[test]
    fn short_csv_records_are_reported_with_their_column_count() {
        let record = StringRecord::from(vec!["2016-01-05", "1", "private"]);
        assert_eq!(
            CsvRow::from_record(&record),
            Err(RecordError::ColumnCount(3))
        );
    }
}
