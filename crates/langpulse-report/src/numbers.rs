//! Number formatting for report cells.

/// Group digits in threes with commas.
///
/// # Examples
///
/// ```
/// use langpulse_report::numbers::thousands;
///
/// assert_eq!(thousands(0), "0");
/// assert_eq!(thousands(1234567), "1,234,567");
/// ```
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Signed integer variant of [`thousands`].
pub fn signed_thousands(n: i64) -> String {
    if n < 0 {
        format!("-{}", thousands(n.unsigned_abs()))
    } else {
        format!("+{}", thousands(n as u64))
    }
}

/// Two-decimal value.
pub fn two(value: f64) -> String {
    format!("{value:.2}")
}

/// Two-decimal value with an explicit sign.
pub fn signed(value: f64) -> String {
    format!("{value:+.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_exact_multiples_of_three() {
        assert_eq!(thousands(100), "100");
        assert_eq!(thousands(100000), "100,000");
        assert_eq!(thousands(1000), "1,000");
    }

    #[test]
    fn signs_are_explicit() {
        assert_eq!(signed_thousands(-1500), "-1,500");
        assert_eq!(signed_thousands(0), "+0");
        assert_eq!(signed(14.444), "+14.44");
        assert_eq!(signed(-0.5), "-0.50");
    }
}
