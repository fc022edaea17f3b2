use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Recurrence interval of an obligation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Cadence {
    Monthly,
    Quarterly,
    Annually,
}

impl Cadence {
    /// Number of calendar months covered by one period.
    pub fn months(self) -> u32 {
        match self {
            Cadence::Monthly => 1,
            Cadence::Quarterly => 3,
            Cadence::Annually => 12,
        }
    }

    /// Advances `from` by exactly one period. Returns `None` only when the result
    /// falls outside the representable calendar.
    pub fn try_step(self, from: NaiveDate) -> Option<NaiveDate> {
        self.advance(from, 1)
    }

    /// Shifts `from` by `periods` whole periods. The day-of-month is clamped once,
    /// against the final target month only.
    pub fn advance(self, from: NaiveDate, periods: u32) -> Option<NaiveDate> {
        let months = i64::from(self.months()) * i64::from(periods);
        shift_month(from, months)
    }

    /// Bucket used to decide whether a payment date falls in the same period as a
    /// due date.
    pub fn period_key(self, date: NaiveDate) -> PeriodKey {
        match self {
            Cadence::Monthly | Cadence::Quarterly => PeriodKey::month_of(date),
            Cadence::Annually => PeriodKey::year_of(date),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Cadence::Monthly => "Monthly",
            Cadence::Quarterly => "Quarterly",
            Cadence::Annually => "Annually",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Cadence {
    type Err = EngineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Cadence::Monthly),
            "quarterly" => Ok(Cadence::Quarterly),
            "annually" | "annual" | "yearly" => Ok(Cadence::Annually),
            other => Err(EngineError::configuration(format!(
                "unknown cadence `{}`",
                other
            ))),
        }
    }
}

/// Advances `date` by one period of `cadence`.
///
/// Saturates at [`NaiveDate::MAX`] when the calendar runs out; use
/// [`Cadence::try_step`] to observe that case.
pub fn step(date: NaiveDate, cadence: Cadence) -> NaiveDate {
    cadence.try_step(date).unwrap_or(NaiveDate::MAX)
}

/// Cadence-specific bucket used for matching transactions to due dates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeriodKey {
    Month { year: i32, month: u32 },
    Year(i32),
}

impl PeriodKey {
    pub fn month_of(date: NaiveDate) -> PeriodKey {
        PeriodKey::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year_of(date: NaiveDate) -> PeriodKey {
        PeriodKey::Year(date.year())
    }

    /// Buckets `date` at the same granularity as `self`.
    pub fn bucket(&self, date: NaiveDate) -> PeriodKey {
        match self {
            PeriodKey::Month { .. } => PeriodKey::month_of(date),
            PeriodKey::Year(_) => PeriodKey::year_of(date),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.bucket(date) == *self
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            PeriodKey::Year(year) => write!(f, "{year:04}"),
        }
    }
}

fn shift_month(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let index = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some(first_next.pred_opt()?.day())
}
