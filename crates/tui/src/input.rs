use std::str::FromStr;

use banker_core::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:rs\.?|₹|\$)?\s*(?P<value>[-+]?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?)$")
        .expect("invalid amount regex")
});

/// Parse a typed amount such as `1500`, `1,500.50` or `Rs. 200`.
pub fn parse_amount(input: &str) -> Result<Decimal, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("valid amount"));
    }
    let invalid = || ValidationError::InvalidAmount(trimmed.to_string());
    let captures = AMOUNT_RE.captures(trimmed).ok_or_else(invalid)?;
    let digits = captures["value"].replace(',', "");
    Decimal::from_str(digits.trim_start_matches('+')).map_err(|_| invalid())
}
