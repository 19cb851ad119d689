//! Period expressions.
//!
//! A report period is written as `/`-separated components where any
//! positional component may be the wildcard `*`:
//!
//! - `2024` → the whole year 2024
//! - `3/2024` → March 2024 (`*/2024` is the whole year again)
//! - `1/3/2024` → 1 March 2024 (`*/3/2024` is the month, `*/*/2024` the year)
//!
//! Resolution yields a half-open date range `[start, end)` and a
//! granularity; anything outside the three recognized shapes, or any
//! calendrically invalid value, fails with `InvalidPeriod`.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

use crate::{EngineError, ResultEngine};

/// Time resolution a period resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Monthly,
    Yearly,
}

impl Granularity {
    /// Bucket label for a date at this granularity.
    ///
    /// Yearly `"2024"`, monthly `"03/2024"`, daily `"01/03/2024"`, matching
    /// the report output format.
    #[must_use]
    pub fn period_key(self, date: NaiveDate) -> String {
        match self {
            Granularity::Yearly => format!("{}", date.year()),
            Granularity::Monthly => format!("{:02}/{}", date.month(), date.year()),
            Granularity::Daily => {
                format!("{:02}/{:02}/{}", date.day(), date.month(), date.year())
            }
        }
    }
}

/// A resolved period: granularity plus half-open date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    pub granularity: Granularity,
    /// Inclusive.
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
}

impl Period {
    /// Resolves a textual period expression.
    ///
    /// Component shapes (after splitting on `/`):
    /// - `Y`
    /// - `M/Y`, `*/Y`
    /// - `D/M/Y`, `*/M/Y`, `*/*/Y`
    pub fn resolve(expression: &str) -> ResultEngine<Period> {
        let expression = expression.trim();
        let parts: Vec<&str> = expression.split('/').collect();

        match parts.as_slice() {
            [year] => Self::yearly(parse_component(year)?),
            ["*", year] => Self::yearly(parse_component(year)?),
            [month, year] => Self::monthly(parse_component(month)?, parse_component(year)?),
            ["*", "*", year] => Self::yearly(parse_component(year)?),
            ["*", month, year] => Self::monthly(parse_component(month)?, parse_component(year)?),
            [day, month, year] => Self::daily(
                parse_component(day)?,
                parse_component(month)?,
                parse_component(year)?,
            ),
            _ => Err(EngineError::InvalidPeriod(format!(
                "unrecognized period shape: {expression}"
            ))),
        }
    }

    fn yearly(year: i32) -> ResultEngine<Period> {
        let start = date(year, 1, 1)?;
        let end = date(year + 1, 1, 1)?;
        Ok(Period {
            granularity: Granularity::Yearly,
            start,
            end,
        })
    }

    fn monthly(month: u32, year: i32) -> ResultEngine<Period> {
        let month_i32 = i32::try_from(month)
            .map_err(|_| EngineError::InvalidPeriod(format!("invalid month: {month}")))?;
        let start = date(year, month, 1)?;
        // December rolls over to January of the next year.
        let end = if month_i32 == 12 {
            date(year + 1, 1, 1)?
        } else {
            date(year, month + 1, 1)?
        };
        Ok(Period {
            granularity: Granularity::Monthly,
            start,
            end,
        })
    }

    fn daily(day: u32, month: u32, year: i32) -> ResultEngine<Period> {
        let start = date(year, month, day)?;
        let end = start.succ_opt().ok_or_else(|| {
            EngineError::InvalidPeriod(format!("day out of range: {day}/{month}/{year}"))
        })?;
        Ok(Period {
            granularity: Granularity::Daily,
            start,
            end,
        })
    }

    /// Inclusive lower bound as a UTC instant (midnight of `start`).
    #[must_use]
    pub fn start_at(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// Exclusive upper bound as a UTC instant (midnight of `end`).
    #[must_use]
    pub fn end_at(&self) -> DateTime<Utc> {
        self.end.and_time(NaiveTime::MIN).and_utc()
    }

    /// Bucket label for an instant, at this period's granularity.
    ///
    /// Today the query window equals a single period, so every transaction it
    /// returns maps to the same key; keying per-transaction keeps the report
    /// shape stable if range-spanning periods are ever added.
    #[must_use]
    pub fn period_key(&self, at: DateTime<Utc>) -> String {
        self.granularity.period_key(at.date_naive())
    }
}

fn parse_component<T: std::str::FromStr>(raw: &str) -> ResultEngine<T> {
    raw.parse::<T>()
        .map_err(|_| EngineError::InvalidPeriod(format!("not a number: {raw}")))
}

fn date(year: i32, month: u32, day: u32) -> ResultEngine<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        EngineError::InvalidPeriod(format!("invalid date: {day:02}/{month:02}/{year}"))
    })
}
