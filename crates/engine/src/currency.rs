use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currency a wallet is pinned to.
///
/// The set is fixed: the primary fiat (`EUR`), bitcoin (`BTC`) and its
/// satoshi-denominated unit (`SAT`). A wallet's currency is immutable once
/// created, and aggregates are always partitioned by it.
///
/// ## Minor units
///
/// Monetary values are stored as an `i64` number of **minor units** (see
/// `MoneyMinor`). `minor_units()` returns how many decimal digits are used
/// when converting between:
/// - major units (human input/output, e.g. `10.50 EUR`)
/// - minor units (stored integers, e.g. `1050`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Btc,
    Sat,
}

impl Currency {
    /// Every supported currency, in report order.
    pub const ALL: [Currency; 3] = [Currency::Eur, Currency::Btc, Currency::Sat];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Btc => "BTC",
            Currency::Sat => "SAT",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    ///
    /// EUR uses cents, BTC uses satoshi (8 digits), SAT is already the
    /// smallest unit.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Eur => 2,
            Currency::Btc => 8,
            Currency::Sat => 0,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "BTC" => Ok(Currency::Btc),
            "SAT" => Ok(Currency::Sat),
            other => Err(EngineError::InvalidInput(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
