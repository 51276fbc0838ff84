use std::ops::RangeInclusive;

use crate::config::Encoding;

/// Trim whitespace and strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// `None` for cells that are empty after cleaning.
pub fn non_empty(raw: &str) -> Option<String> {
    let c = clean_str(raw);
    if c.is_empty() {
        None
    } else {
        Some(c)
    }
}

/// Numeric coercion: thousands separators and blanks are stripped before parsing.
/// Anything unparsable, NaN or infinite is treated as missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    let digits: String = clean_str(raw)
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Four-digit calendar years accepted from any source.
pub const YEARS: RangeInclusive<i32> = 1000..=9999;

/// Integer-like years: "2010" and "2010.0" both parse, "2010.5" does not.
/// Anything outside [`YEARS`] is treated as unparsable.
pub fn parse_year(raw: &str) -> Option<i32> {
    let c = clean_str(raw);
    let year = match c.parse::<i32>() {
        Ok(y) => y,
        Err(_) => {
            let f = c.parse::<f64>().ok()?;
            if !(f.is_finite() && f.fract() == 0.0) {
                return None;
            }
            // saturating cast; out-of-range values fail the check below
            f as i32
        }
    };
    YEARS.contains(&year).then_some(year)
}

/// Decode file bytes according to the configured encoding.
pub fn decode(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Header cells lose surrounding whitespace and any byte-order mark,
/// including a UTF-8 BOM that was decoded as Latin-1.
pub fn clean_header(raw: &str) -> String {
    let s = raw.trim_start_matches('\u{feff}');
    let s = s.strip_prefix("\u{ef}\u{bb}\u{bf}").unwrap_or(s);
    clean_str(s)
}
