//! Commission fee engine for banking-style deposit/withdraw statements:
//! per-client weekly free-withdrawal allowance, EUR-normalized accounting,
//! and ceiling-based monetary rounding.

pub mod batch_processor;
pub mod commission_engine;
pub mod converter;
pub mod csv_reader;
pub mod domain;
pub mod money;
pub mod rates;
pub mod report;
pub mod weekly_ledger;

pub use batch_processor::{BatchProcessor, ProcessedRow, INVALID_DATA_SENTINEL};
pub use commission_engine::{CommissionEngine, CommissionError};
pub use converter::CurrencyConverter;
pub use csv_reader::{read_csv, CsvReadError, Statement};
pub use domain::{ClientType, CsvRow, RecordError, TransactionRecord, TransactionType};
pub use rates::{
    reference_rates, HttpRateSource, NullRateSource, RateError, RateSource, StaticRates,
};
pub use report::write_report;
pub use weekly_ledger::{WeekKey, WeeklyBucket, WeeklyLedger};
