//! Number formatting for supply reports

const THOUSAND: f64 = 1e3;
const MILLION: f64 = 1e6;
const BILLION: f64 = 1e9;
const TRILLION: f64 = 1e12;

/// Format a supply figure with a magnitude suffix
///
/// # Examples
/// ```
/// use pegged_supply::utils::format::humanize_amount;
///
/// assert_eq!(humanize_amount(1_234_000_000.0), "1.23 B");
/// assert_eq!(humanize_amount(45_600_000.0), "45.60 M");
/// assert_eq!(humanize_amount(7_800.0), "7.80 k");
/// assert_eq!(humanize_amount(12.5), "12.50");
/// ```
pub fn humanize_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }
    let magnitude = amount.abs();
    if magnitude >= TRILLION {
        format!("{:.2} T", amount / TRILLION)
    } else if magnitude >= BILLION {
        format!("{:.2} B", amount / BILLION)
    } else if magnitude >= MILLION {
        format!("{:.2} M", amount / MILLION)
    } else if magnitude >= THOUSAND {
        format!("{:.2} k", amount / THOUSAND)
    } else {
        format!("{:.2}", amount)
    }
}

/// Format a whole amount with thousand separators
///
/// # Examples
/// ```
/// use pegged_supply::utils::format::format_with_separators;
///
/// assert_eq!(format_with_separators(1234567.891), "1,234,567.89");
/// assert_eq!(format_with_separators(-950.0), "-950.00");
/// ```
pub fn format_with_separators(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((&formatted, "00"));
    let chars: Vec<char> = whole.chars().collect();

    let mut result = String::new();
    if amount < 0.0 {
        result.push('-');
    }
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.push('.');
    result.push_str(fraction);
    result
}
