//! Sample filters evaluated by the measurement store.
//!
//! A [`SampleFilter`] combines a numeric [`ValuePredicate`] with an optional
//! [`SeasonalWindow`] (months of the year and hours of the day). The store
//! counts or aggregates only the measurements the filter matches.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::measurement::Measurement;

/// Numeric predicate on a measurement value.
///
/// All comparisons are strict: a value equal to a bound matches neither
/// `Below(bound)`, `Between(.., bound)`, `Between(bound, ..)` nor `Above(bound)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuePredicate {
    /// Every sample, including ones whose value is not numeric.
    Any,
    /// `value < bound`
    Below(f64),
    /// `low < value < high`
    Between(f64, f64),
    /// `value > bound`
    Above(f64),
}

impl ValuePredicate {
    /// Evaluate the predicate against an already-parsed value.
    pub fn matches(&self, value: Option<f64>) -> bool {
        match (*self, value) {
            (ValuePredicate::Any, _) => true,
            (_, None) => false,
            (ValuePredicate::Below(bound), Some(v)) => v < bound,
            (ValuePredicate::Between(low, high), Some(v)) => low < v && v < high,
            (ValuePredicate::Above(bound), Some(v)) => v > bound,
        }
    }
}

impl fmt::Display for ValuePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuePredicate::Any => write!(f, "any"),
            ValuePredicate::Below(b) => write!(f, "v < {}", b),
            ValuePredicate::Between(a, b) => write!(f, "{} < v < {}", a, b),
            ValuePredicate::Above(b) => write!(f, "v > {}", b),
        }
    }
}

/// Parse `"a-b"` into two integers, checking both lie in `min..=max`.
fn parse_span(raw: &str, min: u32, max: u32, what: &str) -> Result<(u32, u32), String> {
    let (start, end) = raw
        .trim()
        .split_once('-')
        .ok_or_else(|| format!("Format for {} not correct. It has to be like: {}-{}", what, min, max))?;

    let parse = |part: &str| -> Result<u32, String> {
        part.trim()
            .parse::<u32>()
            .map_err(|_| format!("Format for {} not correct: '{}' is not a number", what, part))
    };
    let (start, end) = (parse(start)?, parse(end)?);

    for bound in [start, end] {
        if bound < min || bound > max {
            return Err(format!(
                "Numbers for {} not correct. The value has to be between [{}-{}], got {}",
                what, min, max, bound
            ));
        }
    }
    Ok((start, end))
}

/// Inclusive span of months (1 = January), wrapping across the year end.
///
/// `2-5` is February through May, `10-2` is October through February.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSpan {
    pub start: u32,
    pub end: u32,
}

impl MonthSpan {
    pub fn contains(&self, month: u32) -> bool {
        if self.start <= self.end {
            self.start <= month && month <= self.end
        } else {
            month >= self.start || month <= self.end
        }
    }
}

impl FromStr for MonthSpan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = parse_span(s, 1, 12, "months")?;
        Ok(Self { start, end })
    }
}

/// Span of hours of the day (UTC), start inclusive and end exclusive,
/// wrapping across midnight.
///
/// `8-16` covers 08:00 to 15:59, `22-6` covers 22:00 to 05:59, and `7-7`
/// covers the single hour 07:00 to 07:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourSpan {
    pub start: u32,
    pub end: u32,
}

impl HourSpan {
    pub fn contains(&self, hour: u32) -> bool {
        use std::cmp::Ordering;
        match self.start.cmp(&self.end) {
            Ordering::Less => self.start <= hour && hour < self.end,
            Ordering::Greater => hour >= self.start || hour < self.end,
            Ordering::Equal => hour == self.start,
        }
    }
}

impl FromStr for HourSpan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = parse_span(s, 0, 23, "hours")?;
        Ok(Self { start, end })
    }
}

/// Optional restriction on when a sample was taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalWindow {
    pub months: Option<MonthSpan>,
    pub hours: Option<HourSpan>,
}

impl SeasonalWindow {
    pub fn is_unrestricted(&self) -> bool {
        self.months.is_none() && self.hours.is_none()
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.months.map_or(true, |m| m.contains(ts.month()))
            && self.hours.map_or(true, |h| h.contains(ts.hour()))
    }
}

/// Predicate plus seasonal window, as sent to the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleFilter {
    pub value: ValuePredicate,
    #[serde(default)]
    pub window: SeasonalWindow,
}

impl SampleFilter {
    /// Filter matching every sample.
    pub fn all() -> Self {
        Self {
            value: ValuePredicate::Any,
            window: SeasonalWindow::default(),
        }
    }

    pub fn new(value: ValuePredicate, window: SeasonalWindow) -> Self {
        Self { value, window }
    }

    pub fn matches(&self, measurement: &Measurement) -> bool {
        self.window.contains(measurement.created_at) && self.value.matches(measurement.numeric_value())
    }
}

impl Default for SampleFilter {
    fn default() -> Self {
        Self::all()
    }
}
