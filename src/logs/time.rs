// Time flag parsing and query window resolution

use crate::error::{Result, SvcLogsError};
use crate::logs::types::{QueryOptions, QueryParameters};
use chrono::{DateTime, TimeDelta, Utc};

/// Parse an RFC 3339 time flag value.
///
/// An empty value means the flag was not set and yields `Ok(None)`.
pub fn parse_time_flag(flag: &'static str, value: &str) -> Result<Option<DateTime<Utc>>> {
    if value.is_empty() {
        return Ok(None);
    }

    DateTime::parse_from_rfc3339(value)
        .map(|t| Some(t.with_timezone(&Utc)))
        .map_err(|source| SvcLogsError::InvalidTimeFormat {
            flag,
            value: value.to_string(),
            source,
        })
}

/// Parse a duration such as `90s`, `5m`, `1h30m`, `250ms` or `-1m`.
///
/// Negative values are accepted here so that the validator can report them.
pub fn parse_duration(input: &str) -> Result<TimeDelta> {
    let invalid = || SvcLogsError::InvalidDuration(input.to_string());

    let (negative, mut rest) = match input.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total = TimeDelta::zero();
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let value: i64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "ms" => TimeDelta::try_milliseconds(value),
            "s" => TimeDelta::try_seconds(value),
            "m" => TimeDelta::try_minutes(value),
            "h" => TimeDelta::try_hours(value),
            _ => None,
        }
        .ok_or_else(invalid)?;
        rest = &rest[unit_len..];

        total = total.checked_add(&part).ok_or_else(invalid)?;
    }

    Ok(if negative { -total } else { total })
}

impl QueryParameters {
    /// Resolve the window handed to log sources.
    ///
    /// `since` is measured back from `now`; explicit bounds are used as given.
    pub fn query_options(&self, now: DateTime<Utc>) -> QueryOptions {
        let start_time = match (self.since, self.start_time) {
            (Some(since), _) => Some((now - since).timestamp_millis()),
            (None, Some(start)) => Some(start.timestamp_millis()),
            (None, None) => None,
        };

        QueryOptions {
            limit: self.limit,
            start_time,
            end_time: self.end_time.map(|t| t.timestamp_millis()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::types::OutputFormat;
    use chrono::TimeZone;

    #[test]
    fn test_parse_time_flag_empty() {
        assert_eq!(parse_time_flag("--start-time", "").unwrap(), None);
    }

    #[test]
    fn test_parse_time_flag_valid() {
        let parsed = parse_time_flag("--start-time", "1970-01-01T01:01:01+00:00")
            .unwrap()
            .unwrap();
        assert_eq!(parsed.timestamp(), 3661);
    }

    #[test]
    fn test_parse_time_flag_invalid_names_flag() {
        let err = parse_time_flag("--end-time", "badEndTime").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with(
            "invalid argument badEndTime for \"--end-time\" flag: reading time value badEndTime: "
        ));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("90s").unwrap(), TimeDelta::seconds(90));
        assert_eq!(parse_duration("1m").unwrap(), TimeDelta::minutes(1));
        assert_eq!(
            parse_duration("1h30m").unwrap(),
            TimeDelta::minutes(90)
        );
        assert_eq!(
            parse_duration("250ms").unwrap(),
            TimeDelta::milliseconds(250)
        );
        assert_eq!(parse_duration("-1m").unwrap(), TimeDelta::minutes(-1));
        assert_eq!(parse_duration("0").unwrap(), TimeDelta::zero());
    }

    #[test]
    fn test_parse_duration_invalid() {
        for input in ["", "-", "5", "m", "5d", "1h30", "abc"] {
            assert!(
                matches!(parse_duration(input), Err(SvcLogsError::InvalidDuration(_))),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_query_options_since() {
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        let params = QueryParameters {
            limit: 3,
            follow: false,
            start_time: None,
            end_time: None,
            since: Some(TimeDelta::seconds(60)),
            output_format: OutputFormat::Human,
        };

        let options = params.query_options(now);
        assert_eq!(options.limit, 3);
        assert_eq!(options.start_time, Some(940_000));
        assert_eq!(options.end_time, None);
    }

    #[test]
    fn test_query_options_explicit_window() {
        let start = Utc.timestamp_opt(10, 0).unwrap();
        let end = Utc.timestamp_opt(20, 0).unwrap();
        let params = QueryParameters {
            limit: 10,
            follow: false,
            start_time: Some(start),
            end_time: Some(end),
            since: None,
            output_format: OutputFormat::Json,
        };

        let options = params.query_options(Utc::now());
        assert_eq!(options.start_time, Some(10_000));
        assert_eq!(options.end_time, Some(20_000));
    }
}
