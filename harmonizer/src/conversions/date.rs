use chrono::NaiveDate;

/// Full-date formats tried in order. The first one that parses wins.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%m/%d/%Y"];

/// Parses a free-text registry date.
///
/// Tries [`DATE_FORMATS`] in order, then month precision values (`2021-03`, `March 2021`),
/// which resolve to the first day of the month. Blank or unrecognized input is `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .or_else(|| parse_month_precision(trimmed))
}

fn parse_month_precision(trimmed: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{trimmed} 01"), "%B %Y %d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn parses_each_supported_format() {
        assert_eq!(parse_date("2021-01-15"), date(2021, 1, 15));
        assert_eq!(parse_date("January 15, 2021"), date(2021, 1, 15));
        assert_eq!(parse_date("01/15/2021"), date(2021, 1, 15));
    }

    #[test]
    fn month_precision_resolves_to_first_day() {
        assert_eq!(parse_date("2021-03"), date(2021, 3, 1));
        assert_eq!(parse_date("March 2021"), date(2021, 3, 1));
    }

    #[test]
    fn unparseable_dates_are_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("sometime in 2021"), None);
        assert_eq!(parse_date("2021-13-40"), None);
    }
}
