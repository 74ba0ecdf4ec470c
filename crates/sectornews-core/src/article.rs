//! The persisted article shape and the calendar-day key that partitions it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CoreError;

/// A calendar day in `YYYYMMDD` form. Addresses one date bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Truncates a timestamp to its UTC calendar day.
    #[must_use]
    pub fn from_datetime(ts: &DateTime<Utc>) -> Self {
        Self(ts.date_naive())
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

impl FromStr for DateKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidDateKey(s.to_string());
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = s[0..4].parse().map_err(|_| invalid())?;
        let month: u32 = s[4..6].parse().map_err(|_| invalid())?;
        let day: u32 = s[6..8].parse().map_err(|_| invalid())?;
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One accepted news article. Never mutated once it lands in a bucket.
///
/// `url` is the exact-duplicate identity. `description` holds the anchor text
/// resolved at fetch time; lowercase normalization only happens at
/// comparison time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub date: DateKey,
    pub sector: String,
    pub keyword: String,
    /// Publishing outlet; empty when the feed entry carries no source.
    #[serde(default)]
    pub media: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    pub published: NaiveDate,
    pub scraped_at: DateTime<Utc>,
}

impl ArticleRecord {
    /// The similarity comparison scope this record belongs to.
    #[must_use]
    pub fn scope_key(&self) -> (String, String) {
        (self.sector.clone(), self.keyword.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_key_round_trips_through_display() {
        let key: DateKey = "20240229".parse().unwrap();
        assert_eq!(key.to_string(), "20240229");
        assert_eq!(key.date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn date_key_rejects_impossible_dates() {
        assert!("20230229".parse::<DateKey>().is_err());
        assert!("20241301".parse::<DateKey>().is_err());
    }

    #[test]
    fn date_key_rejects_wrong_shapes() {
        for raw in ["2024-01-01", "2024011", "202401011", "abcdefgh", ""] {
            let err = raw.parse::<DateKey>().unwrap_err();
            assert!(matches!(err, CoreError::InvalidDateKey(ref s) if s == raw));
        }
    }

    #[test]
    fn date_key_truncates_timestamp_to_utc_day() {
        let ts = DateTime::parse_from_rfc3339("2024-05-01T23:30:00-02:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(DateKey::from_datetime(&ts).to_string(), "20240502");
    }

    #[test]
    fn date_keys_order_chronologically() {
        let a: DateKey = "20231231".parse().unwrap();
        let b: DateKey = "20240101".parse().unwrap();
        assert!(a < b);
    }
}
