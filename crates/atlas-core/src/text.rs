//! UTF-8-safe truncation and tool-result summarization.
//!
//! Byte-index slicing panics inside multi-byte characters, so all
//! truncation here snaps to char boundaries first.

/// Longest prefix of `s` that fits in `max_bytes` without splitting a
/// character.
#[must_use]
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = 0;
    for (idx, ch) in s.char_indices() {
        if idx + ch.len_utf8() > max_bytes {
            break;
        }
        end = idx + ch.len_utf8();
    }
    &s[..end]
}

/// Truncate `s` to `max_bytes`, appending `suffix` when anything was cut.
///
/// The result (including the suffix) never exceeds `max_bytes`.
#[must_use]
pub fn truncate_with_suffix(s: &str, max_bytes: usize, suffix: &str) -> String {
    if s.len() <= max_bytes {
        return s.to_owned();
    }
    let budget = max_bytes.saturating_sub(suffix.len());
    format!("{}{suffix}", truncate_str(s, budget))
}

/// Bounded preview of a tool result: the first `max_lines` lines, capped
/// at `max_bytes` with a `...` suffix.
///
/// Trailing whitespace on the kept lines is dropped so summaries render
/// cleanly in one UI block.
#[must_use]
pub fn summarize(s: &str, max_lines: usize, max_bytes: usize) -> String {
    let head: Vec<&str> = s.lines().take(max_lines).map(str::trim_end).collect();
    let joined = head.join("\n");
    truncate_with_suffix(&joined, max_bytes, "...")
}
