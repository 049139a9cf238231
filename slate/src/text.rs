//! Whitespace helpers shared by both converters.
//!
//! Only ASCII whitespace and NUL count as blank, so a non-breaking space is
//! content and survives trimming.

pub(crate) fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r' | '\0')
}

pub(crate) fn trim(s: &str) -> &str {
    s.trim_matches(is_space)
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.chars().all(is_space)
}
