use std::fmt;

/// Money is represented as integer minor units to avoid floating-point
/// precision issues. For EUR/USD, 1 unit = 100 cents, so €50.00 = 5000 cents.
pub type Cents = i64;

/// Percentages are carried as integer basis points (1/100 of a percent),
/// so 12.34% = 1234. Floating point only appears when formatting.
pub type BasisPoints = i64;

/// Format cents as a human-readable currency string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');

    let parts: Vec<&str> = input.split('.').collect();
    match parts.len() {
        1 => {
            // No decimal point, treat as whole units
            let units: i64 = parts[0]
                .parse()
                .map_err(|_| ParseCentsError::InvalidFormat)?;
            let cents = units * 100;
            Ok(if negative { -cents } else { cents })
        }
        2 => {
            let units: i64 = if parts[0].is_empty() {
                0
            } else {
                parts[0]
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?
            };

            // Handle decimal part - pad or truncate to 2 digits
            let decimal_str = parts[1];
            let decimal_cents: i64 = match decimal_str.len() {
                0 => 0,
                1 => {
                    // Single digit like "5" means 50 cents
                    decimal_str
                        .parse::<i64>()
                        .map_err(|_| ParseCentsError::InvalidFormat)?
                        * 10
                }
                2 => decimal_str
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?,
                _ => {
                    // More than 2 decimal places - truncate
                    decimal_str[..2]
                        .parse()
                        .map_err(|_| ParseCentsError::InvalidFormat)?
                }
            };

            let cents = units * 100 + decimal_cents;
            Ok(if negative { -cents } else { cents })
        }
        _ => Err(ParseCentsError::InvalidFormat),
    }
}

/// Integer division rounded half away from zero. Returns 0 for a zero divisor
/// so aggregation code never has to guard empty inputs itself.
pub fn div_round(numerator: i64, divisor: i64) -> i64 {
    if divisor == 0 {
        return 0;
    }
    let quotient = numerator / divisor;
    let remainder = numerator % divisor;
    if 2 * remainder.abs() >= divisor.abs() {
        if (numerator < 0) != (divisor < 0) {
            quotient - 1
        } else {
            quotient + 1
        }
    } else {
        quotient
    }
}

/// Period-over-period change in basis points:
/// round(((current - previous) / |previous|) * 10000).
/// A zero baseline maps to 10000 (+100%) when the current value is positive,
/// otherwise 0.
pub fn percent_change_bps(current: i64, previous: i64) -> BasisPoints {
    if previous == 0 {
        return if current > 0 { 10_000 } else { 0 };
    }
    div_round((current - previous) * 10_000, previous.abs())
}

/// Share of a grand total in basis points. 0 when the total is 0.
pub fn share_bps(amount: Cents, total: Cents) -> BasisPoints {
    if total == 0 {
        return 0;
    }
    div_round(amount * 10_000, total)
}

/// Net margin in basis points: net profit over revenue, 0 when revenue is 0.
pub fn margin_bps(net_profit: Cents, revenue: Cents) -> BasisPoints {
    if revenue == 0 {
        return 0;
    }
    div_round(net_profit * 10_000, revenue)
}

/// Format basis points as a percent string: 1234 -> "12.3%", -500 -> "-5.0%".
/// Every display branch that shows a percentage goes through here.
pub fn format_bps(bps: BasisPoints) -> String {
    format!("{:.1}%", bps as f64 / 100.0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
        }
    }
}

impl std::error::Error for ParseCentsError {}
