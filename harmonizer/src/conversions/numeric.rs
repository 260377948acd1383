/// Parses an integer count without failing.
///
/// Accepts surrounding whitespace, thousands separators (`1,200`) and integral decimals
/// (`150.0`). Anything else is `None`.
pub fn parse_i64_lenient(raw: &str) -> Option<i64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(value) = cleaned.parse::<i64>() {
        return Some(value);
    }

    let value = cleaned.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Parses an unsigned integer without failing.
pub fn parse_u64_lenient(raw: &str) -> Option<u64> {
    parse_i64_lenient(raw).and_then(|value| u64::try_from(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_enrollment_spellings() {
        assert_eq!(parse_i64_lenient("120"), Some(120));
        assert_eq!(parse_i64_lenient(" 1,200 "), Some(1200));
        assert_eq!(parse_i64_lenient("150.0"), Some(150));
        assert_eq!(parse_i64_lenient("-3"), Some(-3));
    }

    #[test]
    fn unparseable_values_are_none() {
        assert_eq!(parse_i64_lenient(""), None);
        assert_eq!(parse_i64_lenient("about 40"), None);
        assert_eq!(parse_i64_lenient("12.5"), None);
        assert_eq!(parse_i64_lenient("NaN"), None);
        assert_eq!(parse_u64_lenient("-3"), None);
    }
}
