//! Currency formatting and pool equity helpers.
//!
//! Stake math elsewhere in the crate runs on `f64` dollars. Rounding happens
//! only here, at display time.

/// Round a dollar amount to the nearest cent.
#[inline]
pub fn round_to_cents(dollars: f64) -> f64 {
    (dollars * 100.0).round() / 100.0
}

/// Prize pool per live entry. Zero when nobody is alive.
pub fn implied_equity(total_prize_pool: f64, live_entries: u32) -> f64 {
    if live_entries == 0 {
        return 0.0;
    }
    total_prize_pool / live_entries as f64
}

/// Whole-dollar currency: `$18,718,000`.
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }
    let whole = amount.round() as i64;
    let sign = if whole < 0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(whole.unsigned_abs()))
}

/// Currency with cents: `$1,234.56`.
pub fn format_usd_cents(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0.00".to_string();
    }
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, group_thousands(abs / 100), abs % 100)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(18_718_000.0), "$18,718,000");
        assert_eq!(format_usd(555_000.0), "$555,000");
        assert_eq!(format_usd(999.6), "$1,000");
        assert_eq!(format_usd(0.0), "$0");
        assert_eq!(format_usd(-1_250.0), "-$1,250");
        assert_eq!(format_usd(f64::NAN), "$0");
    }

    #[test]
    fn test_format_usd_cents() {
        assert_eq!(format_usd_cents(1234.567), "$1,234.57");
        assert_eq!(format_usd_cents(-45.5), "-$45.50");
        assert_eq!(format_usd_cents(0.05), "$0.05");
    }

    #[test]
    fn test_implied_equity() {
        let equity = implied_equity(18_718_000.0, 16_908);
        assert!((equity - 1107.05).abs() < 0.01);
        assert_eq!(implied_equity(555_000.0, 0), 0.0);
    }

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(1.234), 1.23);
        assert_eq!(round_to_cents(1.999), 2.00);
    }
}
