use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar month in zero-padded `YYYY-MM` form.
///
/// Ordering is plain string ordering, which matches chronological order as
/// long as keys are zero-padded. Deserialized keys are taken as-is; only
/// [`MonthKey::parse`] validates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthKey(String);

impl MonthKey {
    /// Parse user input such as `2024-01` or `2024-1` into a normalized key.
    /// Returns `None` for anything that is not a real calendar month.
    pub fn parse(input: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d").ok()?;
        Some(Self::from_date(date))
    }

    /// Wrap a raw string without validation.
    #[cfg(test)]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn current() -> Self {
        Self(chrono::Local::now().format("%Y-%m").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Year and month number, or `None` if the key is malformed.
    pub fn year_month(&self) -> Option<(i32, u32)> {
        let (year, month) = self.0.split_once('-')?;
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        (1..=12).contains(&month).then_some((year, month))
    }

    /// The month `delta` months away, or `None` if this key is malformed.
    pub fn offset(&self, delta: i32) -> Option<Self> {
        let (year, month) = self.year_month()?;
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let shifted = if delta >= 0 {
            first.checked_add_months(Months::new(delta.unsigned_abs()))?
        } else {
            first.checked_sub_months(Months::new(delta.unsigned_abs()))?
        };
        Some(Self::from_date(shifted))
    }

    fn from_date(date: NaiveDate) -> Self {
        Self(format!("{:04}-{:02}", date.year(), date.month()))
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed number of months from `from` to `to`.
/// Malformed keys, and distances too large for an `i32`, yield 0 rather
/// than an error.
pub fn months_between(from: &MonthKey, to: &MonthKey) -> i32 {
    let (Some((fy, fm)), Some((ty, tm))) = (from.year_month(), to.year_month()) else {
        return 0;
    };
    ty.checked_sub(fy)
        .and_then(|years| years.checked_mul(12))
        .and_then(|months| months.checked_add(tm as i32 - fm as i32))
        .unwrap_or(0)
}
