use chrono::NaiveDate;

use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

/// Parse a statement amount cell.
///
/// Handles `(1,234.56)` accounting negatives, currency symbols, thousands
/// separators, and trailing `DR`/`CR` markers.
pub fn parse_amount(raw: &str) -> Result<f64, ParseError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(ParseError::EmptyAmount);
    }

    let mut negative = false;
    let mut s = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => {
            negative = true;
            inner.to_string()
        }
        None => s.to_string(),
    };

    s.retain(|c| !CURRENCY_SYMBOLS.contains(&c) && c != ',' && !c.is_whitespace());

    let upper = s.to_ascii_uppercase();
    if upper.ends_with("DR") {
        negative = true;
        s.truncate(s.len() - 2);
    } else if upper.ends_with("CR") {
        s.truncate(s.len() - 2);
    }

    if let Some(rest) = s.strip_prefix('-') {
        return parse_number(rest, raw).map(|v| -v);
    }
    let value = parse_number(&s, raw)?;
    Ok(if negative { -value } else { value })
}

fn parse_number(s: &str, raw: &str) -> Result<f64, ParseError> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::InvalidAmount(raw.trim().to_string())),
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum FieldOrder {
    MonthDayYear,
    YearMonthDay,
    DayMonthYear,
}

struct DatePattern {
    order: FieldOrder,
    separator: char,
    year_digits: usize,
}

/// Tried in order; the first pattern that fully parses wins, so ambiguous
/// dates like `7/3/24` resolve month-first.
const DATE_PATTERNS: &[DatePattern] = &[
    DatePattern { order: FieldOrder::MonthDayYear, separator: '/', year_digits: 4 },
    DatePattern { order: FieldOrder::MonthDayYear, separator: '/', year_digits: 2 },
    DatePattern { order: FieldOrder::YearMonthDay, separator: '-', year_digits: 4 },
    DatePattern { order: FieldOrder::DayMonthYear, separator: '/', year_digits: 4 },
    DatePattern { order: FieldOrder::DayMonthYear, separator: '/', year_digits: 2 },
];

/// Parse a statement date cell into canonical `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<String, ParseError> {
    let s = raw.trim();
    DATE_PATTERNS
        .iter()
        .find_map(|p| try_pattern(s, p))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| ParseError::InvalidDate(s.to_string()))
}

fn try_pattern(s: &str, pattern: &DatePattern) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split(pattern.separator).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let (y, m, d) = match pattern.order {
        FieldOrder::MonthDayYear => (parts[2], parts[0], parts[1]),
        FieldOrder::YearMonthDay => (parts[0], parts[1], parts[2]),
        FieldOrder::DayMonthYear => (parts[2], parts[1], parts[0]),
    };
    if y.len() != pattern.year_digits || m.len() > 2 || d.len() > 2 {
        return None;
    }
    let mut year: i32 = y.parse().ok()?;
    if pattern.year_digits == 2 {
        // POSIX pivot: 69-99 are 19xx, 00-68 are 20xx
        year += if year >= 69 { 1900 } else { 2000 };
    }
    NaiveDate::from_ymd_opt(year, m.parse().ok()?, d.parse().ok()?)
}

#[cfg(any(feature = "excel", test))]
/// `None` when the serial lands outside the representable calendar.
pub fn excel_serial_to_date(serial: f64) -> Option<String> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let offset = chrono::TimeDelta::try_days(serial as i64)?;
    let date = base.checked_add_signed(offset)?;
    Some(date.format("%Y-%m-%d").to_string())
}
