use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

/// Every formatter renders in this zone with es-CL conventions, whatever
/// the host's local settings are.
pub const REPORT_TIMEZONE: Tz = chrono_tz::America::Santiago;
pub const PLACEHOLDER: &str = "-";
pub const NATIONAL_ID_PLACEHOLDER: &str = "N/A";

static NON_ID_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9kK]").expect("national id pattern compiles"));

/// `"123456789"` becomes `"12.345.678-9"`; the last character is the check
/// digit.
pub fn format_national_id(raw: Option<&str>) -> String {
    let cleaned = match raw {
        Some(value) => NON_ID_CHARS.replace_all(value, "").to_uppercase(),
        None => return NATIONAL_ID_PLACEHOLDER.to_string(),
    };

    let Some((check_index, check_digit)) = cleaned.char_indices().last() else {
        return NATIONAL_ID_PLACEHOLDER.to_string();
    };
    // `K` is only valid as the check digit.
    let body: String = cleaned[..check_index]
        .chars()
        .filter(|ch| ch.is_ascii_digit())
        .collect();
    if body.is_empty() {
        check_digit.to_string()
    } else {
        format!("{}-{}", group_thousands(&body, '.'), check_digit)
    }
}

pub fn format_date(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|ts| ts.with_timezone(&REPORT_TIMEZONE).format("%d-%m-%Y").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn format_time(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|ts| ts.with_timezone(&REPORT_TIMEZONE).format("%H:%M").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn format_date_time(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&REPORT_TIMEZONE)
        .format("%d-%m-%Y %H:%M")
        .to_string()
}

pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Whole pesos with `.` grouping: `1000000.0` becomes `"$1.000.000"`.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(&digits, '.'))
}

/// One decimal at most, with a trailing `.0` dropped: `160.0` becomes `"160"`.
pub fn format_compact(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

pub fn format_decimal(value: f64, places: usize) -> String {
    without_negative_zero(format!("{value:.places$}"))
}

pub fn format_percent(value: f64) -> String {
    format!("{}%", without_negative_zero(format!("{value:.1}")))
}

/// `"-0.0"` becomes `"0.0"`; values that round to zero carry no sign.
fn without_negative_zero(formatted: String) -> String {
    match formatted.strip_prefix('-') {
        Some(unsigned) if unsigned.chars().all(|ch| ch == '0' || ch == '.') => unsigned.to_string(),
        _ => formatted,
    }
}

pub fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.chars().count();
    let mut grouped = String::with_capacity(len + len / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}
