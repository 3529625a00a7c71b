//! Timestamp helpers.
//!
//! Tiddler timestamps have minute granularity and are serialized in the compact
//! `YYYYMMDDHHMM` form (UTC).

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};

const COMPACT_FORMAT: &str = "%Y%m%d%H%M";

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub fn to_compact(date: &DateTime<Utc>) -> String {
    date.format(COMPACT_FORMAT).to_string()
}

pub fn from_compact(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.len() != 12 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(text, COMPACT_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Drop seconds and below
pub fn truncate_to_minute(date: DateTime<Utc>) -> DateTime<Utc> {
    date.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(date)
}

/// Format a date with a template such as `DDD, DD MMM YYYY`.
///
/// Tokens: `YYYY YY MMM mmm 0MM MM DDD ddd 0DD DDth DD 0hh hh 0mm mm 0ss ss am/pm`.
/// Anything else is copied through.
pub fn format_date(date: &DateTime<Utc>, template: &str) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(c) = rest.chars().next() {
        if let Some((token, value)) = match_token(date, rest) {
            out.push_str(&value);
            rest = &rest[token.len()..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    out
}

fn match_token(date: &DateTime<Utc>, rest: &str) -> Option<(&'static str, String)> {
    const TOKENS: [&str; 19] = [
        "am/pm", "AM/PM", "YYYY", "YY", "MMM", "mmm", "0MM", "MM", "DDD", "ddd", "0DD", "DDth", "DD", "0hh", "hh",
        "0mm", "mm", "0ss", "ss",
    ];

    let token = TOKENS.iter().find(|t| rest.starts_with(**t))?;
    let month = date.month0() as usize;
    let weekday = date.weekday().num_days_from_sunday() as usize;

    let value = match *token {
        "YYYY" => date.year().to_string(),
        "YY" => format!("{:02}", date.year().rem_euclid(100)),
        "MMM" => MONTHS[month].to_string(),
        "mmm" => MONTHS[month][..3].to_string(),
        "0MM" => format!("{:02}", date.month()),
        "MM" => date.month().to_string(),
        "DDD" => DAYS[weekday].to_string(),
        "ddd" => DAYS[weekday][..3].to_string(),
        "0DD" => format!("{:02}", date.day()),
        "DDth" => format!("{}{}", date.day(), day_suffix(date.day())),
        "DD" => date.day().to_string(),
        "0hh" => format!("{:02}", date.hour()),
        "hh" => date.hour().to_string(),
        "0mm" => format!("{:02}", date.minute()),
        "mm" => date.minute().to_string(),
        "0ss" => format!("{:02}", date.second()),
        "ss" => date.second().to_string(),
        "am/pm" => if date.hour() < 12 { "am" } else { "pm" }.to_string(),
        "AM/PM" => if date.hour() < 12 { "AM" } else { "PM" }.to_string(),
        _ => return None,
    };

    Some((*token, value))
}

fn day_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
