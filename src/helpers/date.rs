//! Date helper functions

use chrono::{DateTime, FixedOffset, Locale, NaiveDate};
use chrono_tz::Tz;

use crate::config::SiteConfig;
use crate::error::{Error, Result};

/// Localized publication date formatting
#[derive(Debug, Clone)]
pub struct DateFormatter {
    /// chrono format string converted from the configured pattern
    pattern: String,
    locale: Locale,
    timezone: Tz,
}

impl DateFormatter {
    /// Build a formatter from a date-fns pattern, a BCP 47 / POSIX locale
    /// name and an IANA timezone name
    pub fn new(pattern: &str, locale: &str, timezone: &str) -> Result<Self> {
        let posix = locale.replace('-', "_");
        let locale = Locale::try_from(posix.as_str())
            .map_err(|_| Error::UnknownLocale(locale.to_string()))?;
        let timezone: Tz = timezone
            .parse()
            .map_err(|_| Error::UnknownTimezone(timezone.to_string()))?;

        Ok(Self {
            pattern: date_fns_to_chrono_format(pattern),
            locale,
            timezone,
        })
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Self::new(&config.date_format, &config.language, &config.timezone)
    }

    /// Format a parsed timestamp
    pub fn format(&self, date: &DateTime<FixedOffset>) -> String {
        date.with_timezone(&self.timezone)
            .format_localized(&self.pattern, self.locale)
            .to_string()
    }

    /// Format the publication date of post `id`
    pub fn format_publication(&self, id: &str, value: Option<&str>) -> Result<String> {
        let value = value
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::NullDate { id: id.to_string() })?;
        let date = parse_timestamp(value).ok_or_else(|| Error::InvalidDate {
            id: id.to_string(),
            value: value.to_string(),
        })?;
        Ok(self.format(&date))
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self {
            pattern: date_fns_to_chrono_format("dd LLL yyyy"),
            locale: Locale::pt_BR,
            timezone: Tz::UTC,
        }
    }
}

/// Parse the timestamp shapes the repository emits.
///
/// Accepts RFC 3339, `+0000` style offsets and bare dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc().fixed_offset())
        })
}

/// Convert a date-fns (Unicode TR35) pattern to a chrono format string.
///
/// Text inside single quotes is copied literally; `''` is a quote.
fn date_fns_to_chrono_format(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut result = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                result.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut result, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut result, c);
            i += 1;
            continue;
        }

        let mut run = 1;
        while chars.get(i + run) == Some(&c) {
            run += 1;
        }
        i += run;

        let directive = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M' | 'L', 1) => "%-m",
            ('M' | 'L', 2) => "%m",
            ('M' | 'L', 3) => "%b",
            ('M' | 'L', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('E', 4) => "%A",
            ('E', _) => "%a",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('a', _) => "%p",
            _ => {
                for _ in 0..run {
                    push_literal(&mut result, c);
                }
                continue;
            }
        };
        result.push_str(directive);
    }

    result
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
