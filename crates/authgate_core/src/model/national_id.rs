//! National identity card (NIC) number format rules.
//!
//! Two formats are accepted:
//! - new: exactly 12 digits (`200012345678`)
//! - old: 9 digits followed by one ASCII letter (`123456789V`)

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static NEW_FORMAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{12}$").expect("valid regex"));
static OLD_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{9}[a-zA-Z]$").expect("valid regex"));
static ALL_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid regex"));
static NINE_DIGIT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{9}").expect("valid regex"));

/// Reason a national ID string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NationalIdError {
    Empty,
    ContainsSymbols,
    NewFormatLength,
    OldFormatSuffix,
    UnknownFormat,
}

impl Display for NationalIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::Empty => "NIC Number is required",
            Self::ContainsSymbols => "NIC cannot contain symbols or special characters",
            Self::NewFormatLength => "New NIC format must contain exactly 12 digits",
            Self::OldFormatSuffix => {
                "Old NIC format must be 9 digits followed by 1 letter (e.g., 123456789V)"
            }
            Self::UnknownFormat => {
                "Invalid NIC format. Use 12 digits (new) or 9 digits + 1 letter (old)"
            }
        };
        f.write_str(message)
    }
}

impl Error for NationalIdError {}

/// Validates `value` and returns the trimmed form on success.
///
/// Rules are checked in order; the first failing rule decides the error.
pub fn validate_national_id(value: &str) -> Result<&str, NationalIdError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(NationalIdError::Empty);
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(NationalIdError::ContainsSymbols);
    }
    if NEW_FORMAT.is_match(trimmed) || OLD_FORMAT.is_match(trimmed) {
        return Ok(trimmed);
    }
    if ALL_DIGITS.is_match(trimmed) {
        return Err(NationalIdError::NewFormatLength);
    }
    if NINE_DIGIT_PREFIX.is_match(trimmed) {
        return Err(NationalIdError::OldFormatSuffix);
    }
    Err(NationalIdError::UnknownFormat)
}

#[cfg(test)]
mod tests {
    use super::{validate_national_id, NationalIdError};

    #[test]
    fn accepts_both_formats_and_trims() {
        assert_eq!(validate_national_id(" 200012345678 "), Ok("200012345678"));
        assert_eq!(validate_national_id("123456789V"), Ok("123456789V"));
        assert_eq!(validate_national_id("123456789x"), Ok("123456789x"));
    }

    #[test]
    fn rejects_with_first_failing_rule() {
        assert_eq!(validate_national_id("   "), Err(NationalIdError::Empty));
        assert_eq!(
            validate_national_id("12345-6789V"),
            Err(NationalIdError::ContainsSymbols)
        );
        assert_eq!(
            validate_national_id("12345678901"),
            Err(NationalIdError::NewFormatLength)
        );
        assert_eq!(
            validate_national_id("1234567890123"),
            Err(NationalIdError::NewFormatLength)
        );
        assert_eq!(
            validate_national_id("123456789VX"),
            Err(NationalIdError::OldFormatSuffix)
        );
        assert_eq!(
            validate_national_id("ABC123"),
            Err(NationalIdError::UnknownFormat)
        );
    }
}
