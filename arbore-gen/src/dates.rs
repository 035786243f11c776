//! Date rendering in rotating textual formats, and the lenient parser used to
//! read an order date back when building a claim.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The five textual date layouts the generator writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `2024-03-05`
    Iso,
    /// `2024-03-05T00:00:00Z`
    IsoTimestampZ,
    /// `05/03/2024`
    DayMonthYearSlash,
    /// `05-03-2024`
    DayMonthYearDash,
    /// `03/05/2024`
    MonthDayYearSlash,
}

impl DateFormat {
    pub const ALL: [DateFormat; 5] = [
        DateFormat::Iso,
        DateFormat::IsoTimestampZ,
        DateFormat::DayMonthYearSlash,
        DateFormat::DayMonthYearDash,
        DateFormat::MonthDayYearSlash,
    ];

    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::Iso => "%Y-%m-%d",
            DateFormat::IsoTimestampZ => "%Y-%m-%dT%H:%M:%SZ",
            DateFormat::DayMonthYearSlash => "%d/%m/%Y",
            DateFormat::DayMonthYearDash => "%d-%m-%Y",
            DateFormat::MonthDayYearSlash => "%m/%d/%Y",
        }
    }

    pub fn render(&self, date: NaiveDate) -> String {
        match self {
            DateFormat::IsoTimestampZ => date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.format(self.pattern()).to_string())
                .unwrap_or_else(|| date.format("%Y-%m-%dT00:00:00Z").to_string()),
            _ => date.format(self.pattern()).to_string(),
        }
    }

    /// Strictly decode `text` written in this format.
    pub fn decode(&self, text: &str) -> Option<NaiveDate> {
        match self {
            DateFormat::IsoTimestampZ => NaiveDateTime::parse_from_str(text, self.pattern())
                .ok()
                .map(|dt| dt.date()),
            _ => NaiveDate::parse_from_str(text, self.pattern()).ok(),
        }
    }

    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> DateFormat {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Render `date` in a uniformly chosen format. The same date may come out
/// differently on every call.
pub fn format_date<R: Rng + ?Sized>(rng: &mut R, date: NaiveDate) -> String {
    DateFormat::pick(rng).render(date)
}

/// Uniform date in `[start, end)`. Returns `start` for an empty window.
pub fn random_date<R: Rng + ?Sized>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = (end - start).num_days();
    if span <= 0 {
        return start;
    }
    start + Duration::days(rng.gen_range(0..span))
}

/// Outcome of [`parse_order_date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "date", rename_all = "snake_case")]
pub enum ParsedDate {
    Parsed(NaiveDate),
    /// The text could not be read; the caller-supplied fallback day was used.
    Fallback(NaiveDate),
}

impl ParsedDate {
    pub fn date(&self) -> NaiveDate {
        match self {
            ParsedDate::Parsed(d) | ParsedDate::Fallback(d) => *d,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ParsedDate::Fallback(_))
    }
}

/// Read back a serialized order date without knowing its format.
///
/// The layout is guessed from the separator and the length of the first
/// token: a four-character first token means year-first, anything else means
/// day-first. A `T` in a dash-separated value selects the timestamp form.
/// Month-first slash dates are therefore read day-first: they either fail
/// (month > 12) or come back with day and month swapped. Any failure yields
/// `ParsedDate::Fallback(fallback)`.
pub fn parse_order_date(text: &str, fallback: NaiveDate) -> ParsedDate {
    let parsed = if text.contains('/') {
        let first = text.split('/').next().unwrap_or_default();
        let pattern = if first.len() == 4 { "%Y/%m/%d" } else { "%d/%m/%Y" };
        NaiveDate::parse_from_str(text, pattern).ok()
    } else if text.contains('-') {
        if text.contains('T') {
            parse_timestamp(text)
        } else {
            let first = text.split('-').next().unwrap_or_default();
            let pattern = if first.len() == 4 { "%Y-%m-%d" } else { "%d-%m-%Y" };
            NaiveDate::parse_from_str(text, pattern).ok()
        }
    } else {
        None
    };

    match parsed {
        Some(date) => ParsedDate::Parsed(date),
        None => {
            tracing::debug!(value = text, %fallback, "order date unreadable, using fallback");
            ParsedDate::Fallback(fallback)
        }
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .ok()
}
