//! Text segmentation

/// Split `content` into consecutive chunks of `chunk_size` characters
///
/// The last chunk may be shorter. Empty input yields no chunks. Length is
/// counted in characters, so a multi-byte character is never split. A
/// `chunk_size` of zero returns the whole text as one chunk.
///
/// # Examples
///
/// ```
/// use docagram_extractor::split_into_chunks;
///
/// assert_eq!(split_into_chunks("abcdefg", 3), vec!["abc", "def", "g"]);
/// ```
pub fn split_into_chunks(content: &str, chunk_size: usize) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    if chunk_size == 0 {
        return vec![content.to_string()];
    }

    let mut chunks = Vec::with_capacity(content.len() / chunk_size + 1);
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in content.char_indices() {
        if count == chunk_size {
            chunks.push(content[start..idx].to_string());
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(content[start..].to_string());

    chunks
}

/// Collapse every whitespace run to one space and trim the ends
///
/// Page text handed to the analyzer is flattened this way.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
