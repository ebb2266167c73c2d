//! Sentence-readiness classifier
//!
//! Decides whether the text before the cursor ends in an unfinished sentence
//! fragment long enough to be worth continuing.

/// Characters that terminate a sentence
pub const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Default minimum length (in characters) of the trailing fragment
pub const DEFAULT_MINIMUM_FRAGMENT_LENGTH: usize = 3;

/// Return the part of `text` before the char offset `cursor_offset`
///
/// Offsets past the end are clamped to the end of the text.
pub fn text_before_cursor(text: &str, cursor_offset: usize) -> &str {
    match text.char_indices().nth(cursor_offset) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Return the trailing sentence fragment of `prefix`, trimmed
///
/// The fragment is whatever follows the last sentence terminator.
pub fn trailing_fragment(prefix: &str) -> &str {
    prefix
        .rsplit(SENTENCE_TERMINATORS)
        .next()
        .unwrap_or(prefix)
        .trim()
}

/// Check whether a suggestion should be requested at the cursor
///
/// Returns false when the text before the cursor already ends a sentence
/// (terminator, optionally followed by whitespace), or when the trailing
/// fragment is shorter than `minimum_fragment_length` characters.
pub fn is_ready(full_text: &str, cursor_offset: usize, minimum_fragment_length: usize) -> bool {
    let prefix = text_before_cursor(full_text, cursor_offset);

    if prefix.trim_end().ends_with(SENTENCE_TERMINATORS) {
        return false;
    }

    let fragment = trailing_fragment(prefix);
    let fragment_len = fragment.chars().count();
    fragment_len > 0 && fragment_len >= minimum_fragment_length
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod classifier_tests;
