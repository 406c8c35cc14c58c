//! Fixed-point monetary value with embedded currency.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::DomainError;

/// Largest accepted amount (exclusive): fits the widest storage column.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Currencies accepted by the payment system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    BRL,
    USD,
    EUR,
    GBP,
    INR,
}

impl Currency {
    /// All supported currencies, in display order.
    pub const ALL: [Currency; 5] = [
        Currency::BRL,
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::INR,
    ];

    /// Returns the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::BRL | Currency::USD | Currency::EUR | Currency::GBP | Currency::INR => 2,
        }
    }

    /// Returns the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::BRL => "R$",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::INR => "₹",
        }
    }

    /// ISO-4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::BRL => "BRL",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::INR => "INR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Codes are matched exactly; `"brl"` is not a currency.
impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| DomainError::UnsupportedCurrency(s.to_string()))
    }
}

/// Positive amount of money in a single currency.
///
/// Amounts are decimal (not floating point) so `100.50` stays `100.50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value.
    ///
    /// # Validation
    /// - Amount must be strictly positive
    /// - Amount must be below [`MAX_AMOUNT`]
    /// - Amount cannot carry more decimal places than the currency allows
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, DomainError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::NonPositiveAmount);
        }

        if amount >= MAX_AMOUNT {
            return Err(DomainError::AmountTooLarge(MAX_AMOUNT));
        }

        let max_places = currency.decimal_places();
        if amount.normalize().scale() > max_places {
            return Err(DomainError::AmountPrecision {
                currency,
                max_places,
            });
        }

        Ok(Self { amount, currency })
    }

    /// Returns the decimal amount.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = self.currency.decimal_places();
        write!(
            f,
            "{}{:.*}",
            self.currency.symbol(),
            places as usize,
            self.amount
        )
    }
}
