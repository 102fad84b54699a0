//! Display formatting for money and probabilities.
//!
//! Amounts are EUR with Spanish grouping: no decimals, `.` as thousands
//! separator, and no grouping for four-digit amounts (`1234 €`,
//! `12.345 €`).

/// Placeholder for a card with no value.
pub const NO_VALUE: &str = "-";

/// Format a whole-euro amount, rounding half away from zero.
pub fn format_eur(amount: f64) -> String {
    if !amount.is_finite() {
        return NO_VALUE.to_string();
    }
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let grouped = if digits.len() > 4 {
        group_thousands(&digits)
    } else {
        digits
    };
    if negative {
        format!("-{grouped} €")
    } else {
        format!("{grouped} €")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Card value: a missing or zero value shows as `-`.
pub fn card_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 => format_eur(v),
        _ => NO_VALUE.to_string(),
    }
}

pub fn probability(pct: u8) -> String {
    format!("{pct}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_amounts_are_not_grouped() {
        assert_eq!(format_eur(0.0), "0 €");
        assert_eq!(format_eur(999.0), "999 €");
        assert_eq!(format_eur(1000.0), "1000 €");
        assert_eq!(format_eur(9999.0), "9999 €");
    }

    #[test]
    fn test_grouping_from_five_digits() {
        assert_eq!(format_eur(10_000.0), "10.000 €");
        assert_eq!(format_eur(125_500.0), "125.500 €");
        assert_eq!(format_eur(1_234_567.0), "1.234.567 €");
    }

    #[test]
    fn test_rounding_and_sign() {
        assert_eq!(format_eur(1499.5), "1500 €");
        assert_eq!(format_eur(12_345.4), "12.345 €");
        assert_eq!(format_eur(-25_000.0), "-25.000 €");
        assert_eq!(format_eur(f64::NAN), "-");
    }

    #[test]
    fn test_card_value_placeholder() {
        assert_eq!(card_value(None), "-");
        assert_eq!(card_value(Some(0.0)), "-");
        assert_eq!(card_value(Some(48_000.0)), "48.000 €");
        assert_eq!(probability(35), "35%");
    }
}
