//! Parsing of positional-notation digit strings

use crate::error::{Result, WorkbenchError};

/// Trim `input` and return its digit values, most significant first
///
/// Only bases 2 and 10 are accepted. Signs, separators and whitespace inside
/// the string are rejected.
pub fn parse_digits(input: &str, base: u32) -> Result<Vec<u32>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(WorkbenchError::InvalidDigits { base });
    }
    trimmed
        .chars()
        .map(|c| c.to_digit(base).ok_or(WorkbenchError::InvalidDigits { base }))
        .collect()
}
