//! Time-bucketed commit counting.

use crate::api::Commit;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use log::warn;
use std::collections::BTreeMap;
use std::str::FromStr;
use strum_macros::{AsRefStr, EnumString};

/// Commit counts keyed by period, iterated in ascending key order.
pub type FrequencyHistogram = BTreeMap<String, u64>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    /// Unknown or missing values fall back to `Day`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|value| Granularity::from_str(value).ok()).unwrap_or_default()
    }

    pub fn bucket_key(self, instant: &DateTime<Utc>) -> String {
        match self {
            Granularity::Day => instant.format("%Y-%m-%d").to_string(),
            Granularity::Week => {
                let week = instant.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Granularity::Month => instant.format("%Y-%m").to_string(),
            Granularity::Year => instant.format("%Y").to_string(),
        }
    }
}

/// Inclusive UTC time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn everything_until(now: DateTime<Utc>) -> Self {
        DateRange {
            from: DateTime::<Utc>::MIN_UTC,
            to: now,
        }
    }

    /// Absent bounds default to the earliest instant and `now`.
    /// If either given bound cannot be parsed, both bounds fall back to their defaults.
    pub fn resolve(from: Option<&str>, to: Option<&str>, now: DateTime<Utc>) -> Self {
        let defaults = Self::everything_until(now);
        let from = from.map(|value| parse_instant(value).ok_or(value)).transpose();
        let to = to.map(|value| parse_instant(value).ok_or(value)).transpose();
        match (from, to) {
            (Ok(from), Ok(to)) => DateRange {
                from: from.unwrap_or(defaults.from),
                to: to.unwrap_or(defaults.to),
            },
            (Err(value), _) | (_, Err(value)) => {
                warn!("Unparsable date bound {:?}, using the full range", value);
                defaults
            }
        }
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.from <= *instant && *instant <= self.to
    }
}

/// Date-times carrying an offset.
const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y/%m/%d %H:%M:%S%.f%z",
];

const DATE_TIME_FORMATS: [&str; 10] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
];

/// Numeric day and month are read month first, day first only when that fails.
const DATE_FORMATS: [&str; 14] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m.%d.%Y",
    "%d.%m.%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%B %d %Y",
    "%d %B %Y",
    "%Y %B %d",
    "%d-%B-%Y",
    "%a %B %d %Y",
];

/// Month without a day, resolved to its first day.
const MONTH_FORMATS: [&str; 3] = ["%Y-%m", "%Y/%m", "%B %Y"];

/// Parses a user supplied date or date-time: RFC 3339, RFC 2822, ISO-like shapes with
/// `-` `/` or `.` separators, and month names (`Feb 1, 2024`, `1 February 2024`).
/// Values without an offset are taken as UTC.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value).or_else(|_| DateTime::parse_from_rfc2822(value)) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Some(instant) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
    {
        return Some(instant.with_timezone(&Utc));
    }

    // Commas and repeated blanks carry no meaning in the human readable shapes.
    let value = value.replace(',', " ").split_whitespace().collect::<Vec<_>>().join(" ");
    if let Some(instant) = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&value, format).ok())
    {
        return Some(instant.and_utc());
    }
    // Month shapes go first, `%B %d %Y` would read "February 2024" as year 24.
    let first_day = format!("{} 1", value);
    MONTH_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&first_day, &format!("{} %d", format)).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(&value, format).ok())
        })
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|instant| instant.and_utc())
}

/// Accumulates commits into a `FrequencyHistogram`.
#[derive(Debug)]
pub struct FrequencyCounter {
    range: DateRange,
    granularity: Granularity,
    histogram: FrequencyHistogram,
}

impl FrequencyCounter {
    pub fn new(range: DateRange, granularity: Granularity) -> Self {
        FrequencyCounter {
            range,
            granularity,
            histogram: FrequencyHistogram::new(),
        }
    }

    /// Counts commits dated inside the range. Author date wins over committer date;
    /// commits without a parsable date are skipped.
    pub fn add_commits<'a>(&mut self, commits: impl IntoIterator<Item = &'a Commit>) {
        for commit in commits {
            let Some(instant) = commit_instant(commit) else {
                continue;
            };
            if !self.range.contains(&instant) {
                continue;
            }
            *self.histogram.entry(self.granularity.bucket_key(&instant)).or_insert(0) += 1;
        }
    }

    pub fn finish(self) -> FrequencyHistogram {
        self.histogram
    }
}

fn commit_instant(commit: &Commit) -> Option<DateTime<Utc>> {
    [&commit.author_date, &commit.committer_date]
        .into_iter()
        .flatten()
        .find(|date| !date.is_empty())
        .and_then(|date| parse_instant(date))
}
