/// Tokens that read as `true`, compared case-insensitively.
pub const TRUTHY_TOKENS: &[&str] = &["yes", "true", "1"];

/// Tokens that read as `false`, compared case-insensitively.
pub const FALSY_TOKENS: &[&str] = &["no", "false", "0"];

/// Parses a registry flag such as `Study Results`.
///
/// Blank input is `None`. A truthy token is `true` and anything else is `false`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(is_truthy(trimmed))
}

/// Parses a boolean, accepting only the truthy and falsy tokens.
pub fn parse_bool(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if is_truthy(trimmed) {
        Some(true)
    } else if FALSY_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t)) {
        Some(false)
    } else {
        None
    }
}

fn is_truthy(trimmed: &str) -> bool {
    TRUTHY_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t))
}
