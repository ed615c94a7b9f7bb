//! Blank and comment line suppression.

/// Leading tokens that mark a line as a comment in most C-like, shell-like
/// and SQL-like languages.
///
/// Not a comment parser: a string literal line starting with `#` is
/// treated as a comment too.
pub const COMMENT_PREFIXES: &[&str] = &["//", "#", "--", "/*", "*", "*/"];

/// Check whether a line is excluded from LOC.
///
/// A line is ignorable when it is blank after trimming or starts with one of
/// [`COMMENT_PREFIXES`]. Single-line block comments (`/* ... */`) fall under
/// the `/*` prefix.
pub fn is_ignorable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || COMMENT_PREFIXES
            .iter()
            .any(|prefix| trimmed.starts_with(prefix))
}
