use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;

use crate::domain::ClientId;

/// Private clients withdraw up to this EUR total per ISO week free of charge.
pub const FREE_WITHDRAW_LIMIT_EUR: Decimal = dec!(1000.00);
/// Only the first this-many withdrawals per ISO week can be free.
pub const FREE_WITHDRAW_COUNT: u32 = 3;

/// One weekly accumulation bucket per client. ISO-8601 week-of-year, so a week
/// straddling a year boundary belongs to the year owning most of its days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekKey {
    pub client_id: ClientId,
    pub iso_year: i32,
    pub iso_week: u32,
}

impl WeekKey {
    pub fn for_transaction(client_id: ClientId, date: NaiveDate) -> Self {
        let week = date.iso_week();
        WeekKey {
            client_id,
            iso_year: week.year(),
            iso_week: week.week(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyBucket {
    pub total_withdrawn_eur: Decimal,
    pub withdrawal_count: u32,
}

/// Per-client, per-week withdrawal accumulator. The only mutable state in the
/// system; owned by the engine and kept for the life of a batch run. Buckets
/// are created lazily and only ever grow.
#[derive(Debug, Default)]
pub struct WeeklyLedger {
    buckets: RwLock<HashMap<WeekKey, WeeklyBucket>>,
}

impl WeeklyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies a private withdrawal against the weekly allowance and
    /// returns the fee-liable excess in EUR.
    ///
    /// The count/limit gate is checked against the bucket's pre-update state;
    /// the bucket is then advanced exactly once, whether or not the amount was
    /// taxed. The count keeps rising past the free quota and is never reset
    /// mid-week.
    pub async fn record_and_classify(&self, key: WeekKey, amount_eur: Decimal) -> Decimal {
        let mut buckets = self.buckets.write().await;
        let bucket = buckets.entry(key).or_default();

        let excess = if bucket.withdrawal_count < FREE_WITHDRAW_COUNT
            && bucket.total_withdrawn_eur + amount_eur <= FREE_WITHDRAW_LIMIT_EUR
        {
            Decimal::ZERO
        } else if bucket.total_withdrawn_eur < FREE_WITHDRAW_LIMIT_EUR {
            // Part of the allowance is still unused; only the portion pushing
            // the running total past the ceiling is taxable.
            (bucket.total_withdrawn_eur + amount_eur - FREE_WITHDRAW_LIMIT_EUR).max(Decimal::ZERO)
        } else {
            amount_eur
        };

        bucket.withdrawal_count += 1;
        bucket.total_withdrawn_eur += amount_eur;

        excess
    }

    pub async fn bucket(&self, key: WeekKey) -> Option<WeeklyBucket> {
        self.buckets.read().await.get(&key).cloned()
    }
}
