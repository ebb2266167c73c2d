//! Completion prompt construction
//!
//! Both HTTP providers send the same instructions: continue the text at the
//! cursor marker and answer with the continuation only.

use crate::classifier::text_before_cursor;

/// Marker placed at the cursor in the prompt
pub const CURSOR_MARKER: &str = "<CURSOR>";

/// Longest context (in chars) sent on each side of the cursor
pub const MAX_CONTEXT_CHARS: usize = 2000;

/// System instructions shared by all providers
pub const SYSTEM_PROMPT: &str = "You are an inline writing assistant. \
The user is typing a document. Continue the text exactly at the cursor marker. \
Reply with the continuation only: no quotes, no explanations, no repetition of \
the existing text. Keep it short, at most one sentence. Start with a space if \
the continuation begins a new word. Reply with nothing if no continuation fits.";

/// Build the user message for a completion at `cursor_offset`
pub fn build_completion_prompt(text: &str, cursor_offset: usize) -> String {
    let before = text_before_cursor(text, cursor_offset);
    let after = &text[before.len()..];

    let before = tail_chars(before, MAX_CONTEXT_CHARS);
    let after = head_chars(after, MAX_CONTEXT_CHARS);

    format!(
        "Continue the document at {marker}.\n\n<document>\n{before}{marker}{after}\n</document>",
        marker = CURSOR_MARKER,
    )
}

/// Remove an echo of the text before the cursor that some models prepend
///
/// When the document already ends in whitespace and the echo drops it, the
/// continuation's own leading whitespace is dropped too so the two do not
/// stack up on insert.
pub fn strip_echo(completion: String, text: &str, cursor_offset: usize) -> String {
    let completion = completion.replace(CURSOR_MARKER, "");
    let before = text_before_cursor(text, cursor_offset);
    let trimmed_before = before.trim_end();
    if trimmed_before.is_empty() {
        return completion;
    }

    if let Some(rest) = completion.strip_prefix(before) {
        return rest.to_string();
    }
    match completion.strip_prefix(trimmed_before) {
        Some(rest) if trimmed_before.len() < before.len() => rest.trim_start().to_string(),
        Some(rest) => rest.to_string(),
        None => completion,
    }
}

fn tail_chars(s: &str, max: usize) -> &str {
    let count = s.chars().count();
    if count <= max {
        return s;
    }
    match s.char_indices().nth(count - max) {
        Some((i, _)) => &s[i..],
        None => s,
    }
}

fn head_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
