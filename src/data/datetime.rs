use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Name accepted in place of a chrono pattern to request RFC 3339 parsing.
pub const RFC3339_FORMAT: &str = "rfc3339";

/// All naive date formats to try. Naive values are taken as UTC.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m-%d-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%m-%d-%Y %H:%M:%S%.f",
    "%d-%m-%Y %H:%M:%S%.f",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
];

/// How the timestamp column is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampFormat {
    /// RFC 3339 / ISO 8601 with an offset, e.g. `2025-01-01T00:00:00Z`.
    Rfc3339,
    /// A chrono format string for naive date-times or dates.
    Pattern(String),
}

impl TimestampFormat {
    /// A user-supplied format: [`RFC3339_FORMAT`] (any case) or a chrono pattern.
    pub fn from_user(format: &str) -> Self {
        if format.trim().eq_ignore_ascii_case(RFC3339_FORMAT) {
            TimestampFormat::Rfc3339
        } else {
            TimestampFormat::Pattern(format.to_string())
        }
    }

    pub fn parse(&self, value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        match self {
            TimestampFormat::Rfc3339 => DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            TimestampFormat::Pattern(fmt) => parse_naive(value, fmt),
        }
    }
}

fn parse_naive(value: &str, fmt: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
        Some(dt.and_utc())
    } else if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
        Some(d.and_hms_opt(0, 0, 0)?.and_utc())
    } else {
        None
    }
}

/// Detect the most likely timestamp format from a column of raw values.
/// Returns the format with the highest parse success rate over the first 100
/// non-empty values. RFC 3339 is tried first and wins ties.
pub fn detect_date_format(values: &[&str]) -> Option<TimestampFormat> {
    let sample: Vec<&str> = values
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(100)
        .collect();

    if sample.is_empty() {
        return None;
    }

    let score = |format: &TimestampFormat| {
        let valid = sample.iter().filter(|s| format.parse(s).is_some()).count();
        valid as f64 / sample.len() as f64
    };

    let mut best_format = TimestampFormat::Rfc3339;
    let mut best_score = score(&best_format);

    for &fmt in DATE_FORMATS {
        let candidate = TimestampFormat::Pattern(fmt.to_string());
        let s = score(&candidate);
        if s > best_score {
            best_score = s;
            best_format = candidate;
        }
    }

    if best_score > 0.0 { Some(best_format) } else { None }
}

/// Format a timestamp as RFC 3339 in UTC with a `Z` suffix.
/// Fractional seconds are only shown when present.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
