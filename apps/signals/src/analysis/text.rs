//! Small text utilities shared by the extractor and the seniority classifier.
//! Regex matches report byte offsets; everything user-facing uses characters.

/// Maps byte offsets of a string to character offsets.
pub(crate) struct CharOffsets {
    byte_starts: Vec<usize>,
}

impl CharOffsets {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            byte_starts: text.char_indices().map(|(i, _)| i).collect(),
        }
    }

    /// Character offset of a byte offset that lies on a char boundary.
    pub(crate) fn char_offset(&self, byte: usize) -> usize {
        self.byte_starts.partition_point(|&b| b < byte)
    }

    pub(crate) fn char_len(&self) -> usize {
        self.byte_starts.len()
    }
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when the span `[start, end)` is not glued to a word character on either side.
pub(crate) fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Up to `radius` characters on each side of the span, whitespace collapsed,
/// capped at `max_chars`.
pub(crate) fn context_snippet(
    text: &str,
    start: usize,
    end: usize,
    radius: usize,
    max_chars: usize,
) -> String {
    let mut before: Vec<char> = text[..start].chars().rev().take(radius).collect();
    before.reverse();
    let before: String = before.into_iter().collect();
    let after: String = text[end..].chars().take(radius).collect();

    let window = format!("{before}{}{after}", &text[start..end]);
    let collapsed = window.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_chars).collect()
}

/// Counts word-bounded occurrences of a compiled phrase.
pub(crate) fn count_bounded(regex: &regex::Regex, text: &str) -> usize {
    regex
        .find_iter(text)
        .filter(|m| is_word_bounded(text, m.start(), m.end()))
        .count()
}
