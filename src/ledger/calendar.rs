//! Calendar-month arithmetic and the inclusive date windows every expander
//! and aggregator works against.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{DateParseError, EngineError};

/// Parses a `YYYY-MM-DD` string from its explicit year, month and day parts.
///
/// A trailing time component (`2025-03-01T00:00:00Z`) is ignored rather than
/// converted, so the calendar date written by the user is the one returned
/// regardless of any offset carried in the suffix.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = raw.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    let mut parts = date_part.splitn(3, '-');
    let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DateParseError::Malformed(raw.to_string()));
    };
    if y.len() != 4 || m.is_empty() || m.len() > 2 || d.is_empty() || d.len() > 2 {
        return Err(DateParseError::Malformed(raw.to_string()));
    }
    let parse = |s: &str| {
        if s.bytes().all(|b| b.is_ascii_digit()) {
            s.parse::<u32>().ok()
        } else {
            None
        }
    };
    let (Some(year), Some(month), Some(day)) = (parse(y), parse(m), parse(d)) else {
        return Err(DateParseError::Malformed(raw.to_string()));
    };
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .ok_or_else(|| DateParseError::OutOfRange(raw.to_string()))
}

/// Formats a date as the `YYYY-MM-DD` key used by the presentation layer.
pub fn iso_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Zero-based month count since year 0, convenient for whole-month deltas.
pub fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// Date `months` calendar months after `base`, on `day_of_month` clamped to
/// the length of the target month.
pub fn add_months_clamped(base: NaiveDate, months: i64, day_of_month: u32) -> Option<NaiveDate> {
    let target = month_index(base) + months;
    let year = i32::try_from(target.div_euclid(12)).ok()?;
    let month = target.rem_euclid(12) as u32 + 1;
    let day = day_of_month.min(days_in_month(year, month)).max(1);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Serde adapter that reads dates through [`parse_iso_date`].
pub mod serde_iso {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::iso_key(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// Optional variant of [`serde_iso`]; empty strings read as `None`.
pub mod serde_iso_opt {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&super::iso_key(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => super::parse_iso_date(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

/// Inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        if end < start {
            return Err(EngineError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The full calendar month.
    pub fn month(year: i32, month: u32) -> Result<Self, EngineError> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| EngineError::InvalidMonth(format!("{year}-{month:02}")))?;
        let end = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))
            .ok_or_else(|| EngineError::InvalidMonth(format!("{year}-{month:02}")))?;
        Ok(Self { start, end })
    }

    /// January 1st through December 31st.
    pub fn year(year: i32) -> Result<Self, EngineError> {
        Self::fiscal_year(year, 1)
    }

    /// Twelve months starting on the 1st of `start_month` in `year`.
    pub fn fiscal_year(year: i32, start_month: u32) -> Result<Self, EngineError> {
        let start = NaiveDate::from_ymd_opt(year, start_month, 1)
            .ok_or_else(|| EngineError::InvalidMonth(format!("{year}-{start_month:02}")))?;
        Self::months_from(start, 12)
    }

    /// `months` whole calendar months from `start`, ending the day before the
    /// same day-of-month `months` later.
    pub fn months_from(start: NaiveDate, months: u32) -> Result<Self, EngineError> {
        let next = add_months_clamped(start, months.max(1) as i64, start.day())
            .ok_or_else(|| EngineError::InvalidMonth(format!("{start} + {months} months")))?;
        Self::new(start, next - Duration::days(1))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Narrows the window to end no later than `end`; `None` if nothing remains.
    pub fn clamp_end(&self, end: NaiveDate) -> Option<Self> {
        let end = self.end.min(end);
        (end >= self.start).then_some(Self {
            start: self.start,
            end,
        })
    }
}
