use rust_decimal::Decimal;

/// Render `value` with the currency prefix and two decimals, e.g. `Rs. 1500.00`.
pub fn format_currency(symbol: &str, value: Decimal) -> String {
    let rounded = value.round_dp(2);
    if symbol.is_empty() {
        format!("{rounded:.2}")
    } else {
        format!("{symbol} {rounded:.2}")
    }
}

/// Truncate `text` to `width` characters, marking the cut with `…`.
pub fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut clipped: String = text.chars().take(width - 1).collect();
    clipped.push('…');
    clipped
}
