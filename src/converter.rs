use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::money::{Currency, CurrencyError, Money};

/// Scale every converted amount is rounded to. Trailing zeros are dropped.
pub const CONVERSION_SCALE: u32 = 2;

pub trait CurrencyConverter {
    /// Returns `value` expressed in `target`. Must be deterministic.
    fn convert(&self, value: Money, target: Currency) -> Result<Money, CurrencyError>;
}

/// Fixed rates, each being the price of one unit of a currency in RON.
#[derive(Debug, Clone)]
pub struct RateTable {
    rates: HashMap<Currency, Decimal>,
}

impl RateTable {
    /// Non-positive rates are dropped, so their currency is unsupported.
    pub fn new(rates: impl IntoIterator<Item = (Currency, Decimal)>) -> Self {
        Self {
            rates: rates
                .into_iter()
                .filter(|(_, rate)| *rate > Decimal::ZERO)
                .collect(),
        }
    }

    fn rate_of(&self, currency: Currency) -> Result<Decimal, CurrencyError> {
        self.rates
            .get(&currency)
            .copied()
            .ok_or(CurrencyError::UnsupportedCurrency { currency })
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::new([
            (Currency::Ron, Decimal::ONE),
            (Currency::Eur, Decimal::new(497, 2)),
            (Currency::Usd, Decimal::new(457, 2)),
        ])
    }
}

impl CurrencyConverter for RateTable {
    fn convert(&self, value: Money, target: Currency) -> Result<Money, CurrencyError> {
        let source_rate = self.rate_of(value.currency())?;
        let target_rate = self.rate_of(target)?;
        if value.currency() == target {
            return Ok(value);
        }
        let amount = value
            .amount()
            .checked_mul(source_rate)
            .and_then(|amount| amount.checked_div(target_rate))
            .ok_or(CurrencyError::ConversionOverflow { value, target })?
            .round_dp_with_strategy(CONVERSION_SCALE, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        Ok(Money::new(amount, target))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn convert_between_currencies() {
        let table = RateTable::default();

        let ron = table
            .convert(Money::new(dec!(100), Currency::Eur), Currency::Ron)
            .unwrap();
        assert_eq!(ron, Money::new(dec!(497), Currency::Ron));

        let eur = table
            .convert(Money::new(dec!(497), Currency::Ron), Currency::Eur)
            .unwrap();
        assert_eq!(eur, Money::new(dec!(100), Currency::Eur));

        // 10 * 4.97 / 4.57 = 10.8752...
        let usd = table
            .convert(Money::new(dec!(10), Currency::Eur), Currency::Usd)
            .unwrap();
        assert_eq!(usd, Money::new(dec!(10.88), Currency::Usd));
    }

    #[test]
    fn same_currency_is_identity() {
        let table = RateTable::default();
        let value = Money::new(dec!(12.345), Currency::Ron);
        assert_eq!(table.convert(value, Currency::Ron).unwrap(), value);
    }

    #[test]
    fn rounds_midpoint_away_from_zero() {
        let table = RateTable::new([(Currency::Ron, dec!(1)), (Currency::Eur, dec!(2))]);
        let eur = table
            .convert(Money::new(dec!(0.05), Currency::Ron), Currency::Eur)
            .unwrap();
        assert_eq!(eur.amount(), dec!(0.03));
    }

    #[test]
    fn out_of_range_conversion() {
        let table = RateTable::default();
        let value = Money::new(Decimal::MAX, Currency::Eur);
        let err = table.convert(value, Currency::Ron).unwrap_err();
        assert_eq!(
            err,
            CurrencyError::ConversionOverflow {
                value,
                target: Currency::Ron
            }
        );

        // converting down stays in range
        let eur = table
            .convert(Money::new(Decimal::MAX, Currency::Ron), Currency::Eur)
            .unwrap();
        assert!(eur.amount() < Decimal::MAX);
    }

    #[test]
    fn missing_rate_is_unsupported() {
        let table = RateTable::new([(Currency::Ron, dec!(1)), (Currency::Usd, dec!(0))]);

        let err = table
            .convert(Money::new(dec!(1), Currency::Eur), Currency::Ron)
            .unwrap_err();
        assert_eq!(
            err,
            CurrencyError::UnsupportedCurrency {
                currency: Currency::Eur
            }
        );

        // zero rate is dropped
        let err = table
            .convert(Money::new(dec!(1), Currency::Ron), Currency::Usd)
            .unwrap_err();
        assert_eq!(
            err,
            CurrencyError::UnsupportedCurrency {
                currency: Currency::Usd
            }
        );
    }
}
