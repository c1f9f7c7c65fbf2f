use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::money::{Currency, CurrencyError};

/// Ceiling on the amount a single transfer may move, per currency.
///
/// Read-only once built. Currencies without a ceiling cannot be transferred.
#[derive(Debug, Clone)]
pub struct TransferLimitPolicy {
    limits: HashMap<Currency, Decimal>,
}

impl TransferLimitPolicy {
    pub fn new(limits: impl IntoIterator<Item = (Currency, Decimal)>) -> Self {
        Self {
            limits: limits.into_iter().collect(),
        }
    }

    pub fn limit_for(&self, currency: Currency) -> Result<Decimal, CurrencyError> {
        self.limits
            .get(&currency)
            .copied()
            .ok_or(CurrencyError::UnsupportedCurrency { currency })
    }
}

impl Default for TransferLimitPolicy {
    fn default() -> Self {
        Self::new([
            (Currency::Eur, Decimal::from(10_000)),
            (Currency::Ron, Decimal::from(50_000)),
        ])
    }
}
