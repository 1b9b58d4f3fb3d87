// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" spreadsheet cell handling so the
// rest of the code can assume clean, typed values.
use crate::types::MISSING_LABEL;
use chrono::{Datelike, NaiveDate, TimeDelta};
use num_format::{Locale, ToFormattedString};

/// Lenient numeric cell: surrounding blanks and thousands separators are
/// ignored, anything `f64::from_str` accepts (including `1.5e1`) is read,
/// and only finite results survive, so `NaN` or `inf` cells count as missing.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let cleaned = s?.trim().replace(',', "");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Like [`parse_f64_safe`] but also rejects negative amounts.
pub fn parse_amount_safe(s: Option<&str>) -> Option<f64> {
    parse_f64_safe(s).filter(|v| *v >= 0.0)
}

/// Day zero of spreadsheet date serials.
fn serial_origin() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Calendar year of a spreadsheet day serial.
///
/// The fractional part is a time of day and never moves the date, so the
/// serial is floored. Serials that land outside chrono's calendar are `None`.
pub fn year_from_serial(serial: f64) -> Option<i32> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.floor();
    if days.abs() > i32::MAX as f64 {
        return None;
    }
    let delta = TimeDelta::try_days(days as i64)?;
    let date = serial_origin()?.checked_add_signed(delta)?;
    Some(date.year())
}

pub fn parse_year_serial(s: Option<&str>) -> Option<i32> {
    year_from_serial(parse_f64_safe(s)?)
}

/// Trimmed text, or the shared placeholder when the cell is blank.
pub fn text_or_missing(s: Option<String>) -> String {
    match s {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => MISSING_LABEL.to_string(),
    }
}

/// Arithmetic mean of the values that are present.
///
/// `None` when nothing contributes; an absent mean is never reported as zero.
pub fn mean_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Fixed decimals with `en` thousands separators, e.g. `1,234,567.89`.
/// Values that round to zero carry no minus sign.
pub fn format_number(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (whole, frac) = match fixed.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = whole
        .parse::<u64>()
        .map(format_int)
        .unwrap_or_else(|_| whole.to_string());
    let sign = if n < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        "-"
    } else {
        ""
    };
    match frac {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// [`format_number`] for optional values, falling back to the placeholder.
pub fn format_optional(n: Option<f64>, decimals: usize) -> String {
    n.map(|v| format_number(v, decimals))
        .unwrap_or_else(|| MISSING_LABEL.to_string())
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_maps_to_calendar_year() {
        // 44197 is 2021-01-01.
        assert_eq!(year_from_serial(44197.0), Some(2021));
        assert_eq!(year_from_serial(44196.75), Some(2020));
        assert_eq!(year_from_serial(0.0), Some(1899));
        assert_eq!(year_from_serial(f64::NAN), None);
        assert_eq!(year_from_serial(1e18), None);
    }

    #[test]
    fn year_serial_rejects_text() {
        assert_eq!(parse_year_serial(Some("44562")), Some(2022));
        assert_eq!(parse_year_serial(Some("FY2022")), None);
        assert_eq!(parse_year_serial(Some("  ")), None);
        assert_eq!(parse_year_serial(None), None);
    }

    #[test]
    fn amounts_strip_separators_and_reject_negatives() {
        assert_eq!(parse_amount_safe(Some("1,250.5")), Some(1250.5));
        assert_eq!(parse_amount_safe(Some("-3")), None);
        assert_eq!(parse_f64_safe(Some("-3")), Some(-3.0));
    }

    #[test]
    fn scientific_notation_is_numeric_but_non_finite_is_not() {
        assert_eq!(parse_f64_safe(Some("1.5e1")), Some(15.0));
        assert_eq!(parse_f64_safe(Some(" -2.5E-1 ")), Some(-0.25));
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("inf")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("12 kV")), None);
    }

    #[test]
    fn mean_skips_missing_values() {
        assert_eq!(mean_present([Some(2.0), None, Some(4.0)]), Some(3.0));
        assert_eq!(mean_present([None, None]), None);
        assert_eq!(mean_present(Vec::<Option<f64>>::new()), None);
    }

    #[test]
    fn blank_text_becomes_placeholder() {
        assert_eq!(text_or_missing(Some("  North ".into())), "North");
        assert_eq!(text_or_missing(Some("   ".into())), MISSING_LABEL);
        assert_eq!(text_or_missing(None), MISSING_LABEL);
    }

    #[test]
    fn numbers_get_thousands_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(999.996, 2), "1,000.00");
        assert_eq!(format_optional(None, 2), MISSING_LABEL);
        assert_eq!(format_int(9855), "9,855");
    }
}
