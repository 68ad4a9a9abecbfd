use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::rates::{RateError, RateSource};

/// Converts amounts between currency codes against a rate-lookup capability.
/// Same-currency conversions are the identity and never touch the source.
/// An injected override table takes precedence over the live lookup, which is
/// how the historical reference rates are reproduced deterministically.
pub struct CurrencyConverter {
    source: Arc<dyn RateSource>,
    overrides: HashMap<(String, String), Decimal>,
}

impl CurrencyConverter {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        CurrencyConverter {
            source,
            overrides: HashMap::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: HashMap<(String, String), Decimal>) -> Self {
        self.overrides = overrides;
        self
    }

    pub async fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<Decimal, RateError> {
        if from == to {
            return Ok(amount);
        }

        if let Some(rate) = self.overrides.get(&(from.to_string(), to.to_string())) {
            debug!(from, to, %rate, "using override rate");
            return Ok(amount * *rate);
        }

        let targets = [to.to_string()];
        let rates = self.source.rates(from, &targets).await?;
        match rates.get(to) {
            Some(rate) => Ok(amount * *rate),
            None => Err(RateError::MissingRate {
                base: from.to_string(),
                target: to.to_string(),
            }),
        }
    }
}
