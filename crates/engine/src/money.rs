use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::{Currency, EngineError};

/// Signed money amount represented as **integer minor units**.
///
/// Use this type for all monetary values crossing the engine boundary to
/// avoid floating-point drift. How many decimal digits a minor unit carries
/// depends on the currency (`Currency::minor_units()`), so parsing and
/// formatting take the currency explicitly.
///
/// The value is signed:
/// - positive = income
/// - negative = expense
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, MoneyMinor};
///
/// let amount = MoneyMinor::parse("12.34", Currency::Eur).unwrap();
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.format(Currency::Eur), "12.34 EUR");
/// ```
///
/// Parsing accepts `.` or `,` as the decimal separator and rejects excess
/// precision for the currency:
///
/// ```rust
/// use engine::{Currency, MoneyMinor};
///
/// assert_eq!(MoneyMinor::parse("10", Currency::Eur).unwrap().minor(), 1000);
/// assert_eq!(MoneyMinor::parse("-10,5", Currency::Eur).unwrap().minor(), -1050);
/// assert!(MoneyMinor::parse("12.345", Currency::Eur).is_err());
/// assert!(MoneyMinor::parse("1.5", Currency::Sat).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyMinor(i64);

impl MoneyMinor {
    pub const ZERO: MoneyMinor = MoneyMinor(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyMinor) -> Option<MoneyMinor> {
        self.0.checked_add(rhs.0).map(MoneyMinor)
    }

    /// Parses a user-supplied amount in major units of `currency`.
    ///
    /// Accepts an optional leading `+`/`-`, and `.` or `,` as the decimal
    /// separator. Fails with `InvalidInput` on anything malformed or with
    /// more fraction digits than the currency carries.
    pub fn parse(input: &str, currency: Currency) -> Result<MoneyMinor, EngineError> {
        let raw = input.trim();
        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };

        let malformed = || EngineError::InvalidInput(format!("malformed amount: {input}"));

        let mut parts = digits.splitn(2, ['.', ',']);
        let whole = parts.next().unwrap_or("");
        let frac = parts.next().unwrap_or("");
        if whole.is_empty() && frac.is_empty() {
            return Err(malformed());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let scale = u32::from(currency.minor_units());
        if frac.len() as u32 > scale {
            return Err(EngineError::InvalidInput(format!(
                "too many decimals for {}: {input}",
                currency.code()
            )));
        }

        let whole_minor: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .ok()
                .and_then(|w| w.checked_mul(10_i64.pow(scale)))
                .ok_or_else(malformed)?
        };
        let frac_minor: i64 = if frac.is_empty() {
            0
        } else {
            let parsed = frac.parse::<i64>().map_err(|_| malformed())?;
            parsed * 10_i64.pow(scale - frac.len() as u32)
        };

        let minor = whole_minor.checked_add(frac_minor).ok_or_else(malformed)?;
        Ok(MoneyMinor(if negative { -minor } else { minor }))
    }

    /// Formats the amount in major units with the currency code appended.
    #[must_use]
    pub fn format(self, currency: Currency) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = u32::from(currency.minor_units());
        if scale == 0 {
            return format!("{sign}{abs} {}", currency.code());
        }
        let base = 10_u64.pow(scale);
        let major = abs / base;
        let frac = abs % base;
        format!(
            "{sign}{major}.{frac:0width$} {}",
            currency.code(),
            width = scale as usize
        )
    }
}

impl From<i64> for MoneyMinor {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyMinor> for i64 {
    fn from(value: MoneyMinor) -> Self {
        value.0
    }
}

impl Add for MoneyMinor {
    type Output = MoneyMinor;

    fn add(self, rhs: MoneyMinor) -> Self::Output {
        MoneyMinor(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyMinor {
    fn add_assign(&mut self, rhs: MoneyMinor) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyMinor {
    type Output = MoneyMinor;

    fn sub(self, rhs: MoneyMinor) -> Self::Output {
        MoneyMinor(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyMinor {
    fn sub_assign(&mut self, rhs: MoneyMinor) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyMinor {
    type Output = MoneyMinor;

    fn neg(self) -> Self::Output {
        MoneyMinor(-self.0)
    }
}
