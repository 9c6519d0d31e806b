use chrono::{NaiveDate, Utc};
use std::fmt;
use std::num::ParseIntError;

pub static USER_FORMAT: &str = "%Y-%m-%d";
pub static NOW: &str = "now";

#[derive(Debug, PartialEq)]
pub enum ParseError {
    ChronoError(chrono::format::ParseError),
    NonPositiveDays(String),
    ParseIntError(ParseIntError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::ChronoError(err) => write!(f, "{}", err),
            ParseError::NonPositiveDays(msg) => write!(f, "{}", msg),
            ParseError::ParseIntError(err) => write!(f, "{}", err),
        }
    }
}

/// Serde helpers storing a `NaiveDate` as `YYYY-MM-DD`.
pub mod naive_date {
    use super::USER_FORMAT;
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(USER_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, USER_FORMAT).map_err(serde::de::Error::custom)
    }
}

pub fn parse_days_from_str(days: &str) -> Result<i64, ParseError> {
    match days.parse::<i64>() {
        Ok(res) if res >= 1 => Ok(res),
        Ok(_) => Err(ParseError::NonPositiveDays(
            "Number of days must be greater than 0!".to_string(),
        )),
        Err(err) => Err(ParseError::ParseIntError(err)),
    }
}

pub fn parse_date_from_str(date: &str) -> Result<NaiveDate, ParseError> {
    if date == NOW {
        return Ok(Utc::now().date_naive());
    }
    NaiveDate::parse_from_str(date, USER_FORMAT).map_err(ParseError::ChronoError)
}

/// Whole days from `from` to `to`, negative when `to` comes first.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(USER_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use crate::date::{
        days_between, format_date, parse_date_from_str, parse_days_from_str, ParseError, NOW,
    };
    use chrono::{NaiveDate, Utc};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_from_str() {
        assert_eq!(parse_days_from_str("3").unwrap(), 3)
    }

    #[test]
    fn test_days_from_str_below_one() {
        for days in ["0", "-1"].iter() {
            assert_eq!(
                parse_days_from_str(days).unwrap_err(),
                ParseError::NonPositiveDays("Number of days must be greater than 0!".to_string()),
            )
        }
    }

    #[test]
    fn test_days_from_str_invalid_number() -> Result<(), String> {
        match parse_days_from_str("foo") {
            Err(ParseError::ParseIntError(_)) => Ok(()),
            _ => Err("Should raise ParseError".to_string()),
        }
    }

    #[test]
    fn test_parse_date_from_str_now() {
        assert_eq!(parse_date_from_str(NOW).unwrap(), Utc::now().date_naive());
    }

    #[test]
    fn test_parse_date_from_str() {
        assert_eq!(parse_date_from_str("2018-10-21").unwrap(), ymd(2018, 10, 21));
    }

    #[test]
    fn test_parse_date_from_str_in_the_past_is_accepted() {
        assert_eq!(parse_date_from_str("2001-01-01").unwrap(), ymd(2001, 1, 1));
    }

    #[test]
    fn test_parse_date_from_str_invalid() -> Result<(), String> {
        match parse_date_from_str("foo") {
            Err(ParseError::ChronoError(_)) => Ok(()),
            _ => Err("Should fail with ParseError::ChronoError".to_string()),
        }
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(ymd(2018, 12, 30), ymd(2019, 1, 2)), 3);
        assert_eq!(days_between(ymd(2019, 1, 2), ymd(2019, 1, 2)), 0);
        assert_eq!(days_between(ymd(2019, 1, 2), ymd(2019, 1, 1)), -1);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(ymd(2019, 3, 7)), "2019-03-07");
    }
}
