use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;
use tracing::debug;

use crate::converter::CurrencyConverter;
use crate::domain::{ClientType, RecordError, TransactionRecord, TransactionType};
use crate::money::round_up;
use crate::rates::RateError;
use crate::weekly_ledger::{WeekKey, WeeklyLedger};

pub const DEPOSIT_COMMISSION_RATE: Decimal = dec!(0.0003);
pub const WITHDRAW_COMMISSION_PRIVATE: Decimal = dec!(0.003);
pub const WITHDRAW_COMMISSION_BUSINESS: Decimal = dec!(0.005);

/// All internal bucket accounting is normalized into this currency.
pub const REFERENCE_CURRENCY: &str = "EUR";

#[derive(Error, Debug)]
pub enum CommissionError {
    #[error("conversion unavailable: no {base}->{target} rate")]
    ConversionUnavailable { base: String, target: String },
    #[error("conversion transport failure: {0}")]
    ConversionTransport(String),
    #[error("invalid transaction kind: {0}")]
    InvalidTransactionKind(#[from] RecordError),
}

impl From<RateError> for CommissionError {
    fn from(err: RateError) -> Self {
        match err {
            RateError::MissingRate { base, target } => {
                CommissionError::ConversionUnavailable { base, target }
            }
            other => CommissionError::ConversionTransport(other.to_string()),
        }
    }
}

/// Stateful commission rule evaluator. Stateless across calls except for the
/// weekly ledger it owns; one engine instance per batch run.
pub struct CommissionEngine {
    converter: CurrencyConverter,
    ledger: WeeklyLedger,
}

impl CommissionEngine {
    pub fn new(converter: CurrencyConverter) -> Self {
        CommissionEngine {
            converter,
            ledger: WeeklyLedger::new(),
        }
    }

    /// Computes the fee for one validated transaction, in the transaction's
    /// own currency, rounded up to 2 decimals. Mutates the weekly ledger for
    /// private withdrawals.
    pub async fn compute_commission(
        &self,
        record: &TransactionRecord,
    ) -> Result<Decimal, CommissionError> {
        let fee = match (record.transaction_type, record.client_type) {
            (TransactionType::Deposit, _) => round_up(record.amount * DEPOSIT_COMMISSION_RATE),
            (TransactionType::Withdraw, ClientType::Business) => {
                round_up(record.amount * WITHDRAW_COMMISSION_BUSINESS)
            }
            (TransactionType::Withdraw, ClientType::Private) => {
                self.private_withdraw_commission(record).await?
            }
        };
        Ok(fee)
    }

    async fn private_withdraw_commission(
        &self,
        record: &TransactionRecord,
    ) -> Result<Decimal, CommissionError> {
        let amount_eur = self
            .converter
            .convert(record.amount, &record.currency, REFERENCE_CURRENCY)
            .await?;

        let key = WeekKey::for_transaction(record.client_id, record.date);
        let excess_eur = self.ledger.record_and_classify(key, amount_eur).await;
        let fee_eur = excess_eur * WITHDRAW_COMMISSION_PRIVATE;
        debug!(
            client = record.client_id,
            iso_year = key.iso_year,
            iso_week = key.iso_week,
            %amount_eur,
            %excess_eur,
            "classified private withdrawal"
        );

        // A zero fee is zero in every currency; skip the needless lookup.
        let fee = if fee_eur.is_zero() {
            fee_eur
        } else {
            self.converter
                .convert(fee_eur, REFERENCE_CURRENCY, &record.currency)
                .await?
        };
        Ok(round_up(fee))
    }
}
