//! Shared identifier helpers.

/// Strips brackets `[]`, double quotes `""` and backticks from a column or
/// table identifier, returning the bare name.
pub fn unquote_identifier(ident: &str) -> &str {
    ident
        .trim()
        .trim_matches(|c| c == '[' || c == ']' || c == '"' || c == '`')
}

/// Unquoted, lowercased form used for column/attribute matching.
pub fn lookup_name(ident: &str) -> String {
    unquote_identifier(ident).to_lowercase()
}

/// Case-insensitive equality without allocating.
#[inline]
pub fn eq_ci(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
