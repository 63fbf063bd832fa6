use std::fmt::Display;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

pub const BILL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire value for "no further billing scheduled".
pub const UNSCHEDULED_BILL_DATE: &str = "0001-01-01";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillDateError {
    #[error("expected a YYYY-MM-DD date, got {0:?}")]
    Shape(String),
    #[error(transparent)]
    Calendar(#[from] chrono::ParseError),
}

/// Date of the next billing attempt, `None` when nothing is scheduled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NextBillDate(Option<NaiveDate>);

impl NextBillDate {
    pub fn scheduled(date: NaiveDate) -> Self {
        Self(Some(date))
    }

    pub fn unscheduled() -> Self {
        Self(None)
    }

    /// Parses `YYYY-MM-DD`. The sentinel `0001-01-01` yields an unscheduled date.
    pub fn parse(raw: &str) -> Result<Self, BillDateError> {
        let bytes = raw.as_bytes();
        let well_shaped = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !well_shaped {
            return Err(BillDateError::Shape(raw.to_string()));
        }

        let date = NaiveDate::parse_from_str(raw, BILL_DATE_FORMAT)?;
        if is_unscheduled_sentinel(&date) {
            return Ok(Self::unscheduled());
        }

        Ok(Self::scheduled(date))
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.0
    }

    pub fn is_scheduled(&self) -> bool {
        self.0.is_some()
    }
}

impl From<Option<NaiveDate>> for NextBillDate {
    fn from(value: Option<NaiveDate>) -> Self {
        match value {
            Some(date) if is_unscheduled_sentinel(&date) => Self::unscheduled(),
            other => Self(other),
        }
    }
}

impl From<NextBillDate> for Option<NaiveDate> {
    fn from(value: NextBillDate) -> Self {
        value.0
    }
}

impl Display for NextBillDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(date) => write!(f, "{}", date.format(BILL_DATE_FORMAT)),
            None => f.write_str(UNSCHEDULED_BILL_DATE),
        }
    }
}

impl Serialize for NextBillDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NextBillDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NextBillDate::parse(&raw).map_err(de::Error::custom)
    }
}

fn is_unscheduled_sentinel(date: &NaiveDate) -> bool {
    date.year() == 1 && date.ordinal() == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_a_scheduled_date() {
        let date = NextBillDate::parse("2024-03-01").unwrap();

        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(date.to_string(), "2024-03-01");
    }

    #[test]
    fn sentinel_parses_as_unscheduled() {
        let date = NextBillDate::parse(UNSCHEDULED_BILL_DATE).unwrap();

        assert!(!date.is_scheduled());
        assert_eq!(date, NextBillDate::unscheduled());
        assert_eq!(date.to_string(), "0001-01-01");
    }

    #[test]
    fn rejects_dates_outside_the_fixed_format() {
        for raw in ["", "2024-3-1", "01-03-2024", "2024/03/01", " 2024-03-01", "2024-03-01T00:00"] {
            assert!(
                matches!(NextBillDate::parse(raw), Err(BillDateError::Shape(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        assert!(matches!(
            NextBillDate::parse("2023-02-30"),
            Err(BillDateError::Calendar(_))
        ));
        assert!(NextBillDate::parse("2024-13-01").is_err());
    }

    #[test]
    fn stored_sentinel_reads_back_as_unscheduled() {
        let stored = NaiveDate::from_ymd_opt(1, 1, 1);

        assert_eq!(NextBillDate::from(stored), NextBillDate::unscheduled());
        assert_eq!(NextBillDate::from(None), NextBillDate::unscheduled());
    }

    #[test]
    fn serializes_as_wire_string() {
        let json = serde_json::to_string(&NextBillDate::unscheduled()).unwrap();
        assert_eq!(json, "\"0001-01-01\"");

        let parsed: NextBillDate = serde_json::from_str("\"2025-12-31\"").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2025, 12, 31));
    }
}
