//! Utility functions for the dispatch board

use chrono::NaiveDate;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::error::ValidationError;

// ===== STRING UTILITIES =====

/// Checks if a string is empty or contains only whitespace
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Truncates a string to a maximum display width, adding "..." if truncated
pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut width = 0;
    let mut truncated = String::new();
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if width + char_width > budget {
            break;
        }
        width += char_width;
        truncated.push(c);
    }
    format!("{}...", truncated)
}

/// Left-aligns `s` in a column of `width` terminal cells, truncating if needed
pub fn pad_column(s: &str, width: usize) -> String {
    let fitted = truncate_string(s, width);
    let padding = width.saturating_sub(fitted.width());
    format!("{}{}", fitted, " ".repeat(padding))
}

// ===== FORMATTING UTILITIES =====

/// Formats a number of minutes, dropping the fraction when it is whole
pub fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{:.0} min", minutes)
    } else {
        format!("{:.2} min", minutes)
    }
}

// ===== DATE UTILITIES =====

/// Parses a date in YYYY-MM-DD, YYYY.MM.DD or YYYY/MM/DD format
pub fn parse_date(date_str: &str) -> Result<NaiveDate, ValidationError> {
    let formats = ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];

    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_str.trim(), format).ok())
        .ok_or_else(|| ValidationError::InvalidDateFormat(date_str.to_string()))
}

// ===== VALIDATION UTILITIES =====

/// Parses a non-negative whole quantity; zero is allowed for estimates
pub fn parse_count(raw: &str) -> Result<u32, ValidationError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidQuantity(raw.to_string()))
}

/// Parses a quantity typed by the planner: a whole number greater than zero
pub fn validate_quantity(raw: &str) -> Result<u32, ValidationError> {
    match parse_count(raw)? {
        0 => Err(ValidationError::InvalidQuantity(raw.to_string())),
        quantity => Ok(quantity),
    }
}
