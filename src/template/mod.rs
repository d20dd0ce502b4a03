use crate::error::{FormsetError, Result};

/// Produce the markup for row `index` by substituting every occurrence of
/// `placeholder` in `template`.
///
/// A row usually names several fields (`-id`, `-image`, `-DELETE`) that must
/// all carry the same index, so the replacement is global.
pub fn render_row(template: &str, placeholder: &str, index: usize) -> Result<String> {
    if placeholder.is_empty() {
        return Err(FormsetError::EmptyPlaceholder);
    }
    Ok(template.replace(placeholder, &index.to_string()))
}

/// Non-overlapping occurrences of `needle` in `haystack`.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}
