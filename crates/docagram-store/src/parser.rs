//! Line grammar for relationships in model output
//!
//! Each line may contain one relationship written as
//!
//! ```text
//! [leading text] ENTITY1 to ENTITY2 (DESCRIPTION)
//! ```
//!
//! The scanner works on paren-free segments of the line. A segment starts at
//! the beginning of the line or right after any `(` or `)` and must end at a
//! `(`. Within the first segment that matches, the separator is the first
//! whitespace-delimited `to` (any case) that leaves a non-empty entity on both
//! sides. The description runs from the `(` to the first `)` and must not be
//! empty. Only the first match on a line is used.

/// One relationship as written on a line, trimmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    /// Text before the `to` separator
    pub entity1: &'a str,
    /// Text between the separator and the `(`
    pub entity2: &'a str,
    /// Text inside the parentheses
    pub description: &'a str,
}

/// Parse every matching line of `text`, in order
pub fn parse_lines(text: &str) -> impl Iterator<Item = ParsedLine<'_>> {
    text.split('\n').filter_map(parse_line)
}

/// Parse a single line, returning `None` when it does not hold a relationship
pub fn parse_line(line: &str) -> Option<ParsedLine<'_>> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut start = 0;

    while start < chars.len() {
        let paren = chars[start..]
            .iter()
            .position(|&(_, c)| c == '(' || c == ')')
            .map(|offset| start + offset)?;

        if chars[paren].1 == '(' {
            if let Some(found) = match_segment(line, &chars, start, paren) {
                return found;
            }
        }

        start = paren + 1;
    }

    None
}

/// Try to match the segment `chars[start..open]` followed by `(DESCRIPTION)`
///
/// Returns `None` when the segment does not match, `Some(None)` when it
/// matches but leaves an empty entity, and `Some(Some(_))` on success.
fn match_segment<'a>(
    line: &'a str,
    chars: &[(usize, char)],
    start: usize,
    open: usize,
) -> Option<Option<ParsedLine<'a>>> {
    let (entity1_end, entity2_start) = find_separator(chars, start, open)?;

    let close = chars[open + 1..]
        .iter()
        .position(|&(_, c)| c == ')')
        .map(|offset| open + 1 + offset)?;
    if close == open + 1 {
        return None;
    }

    let byte_at = |idx: usize| chars.get(idx).map_or(line.len(), |&(byte, _)| byte);
    let entity1 = line[byte_at(start)..byte_at(entity1_end)].trim();
    let entity2 = line[byte_at(entity2_start)..byte_at(open)].trim();
    let description = line[byte_at(open + 1)..byte_at(close)].trim();

    if entity1.is_empty() || entity2.is_empty() {
        return Some(None);
    }

    Some(Some(ParsedLine {
        entity1,
        entity2,
        description,
    }))
}

/// Find the first `<ws>to<ws>` separator inside `chars[start..open]`
///
/// Returns the index where entity1 ends and the index just past `to`.
fn find_separator(chars: &[(usize, char)], start: usize, open: usize) -> Option<(usize, usize)> {
    let is_ws = |idx: usize| idx < open && chars[idx].1.is_whitespace();

    for ws_start in start + 1..open {
        if !is_ws(ws_start) {
            continue;
        }

        let mut to_start = ws_start;
        while is_ws(to_start) {
            to_start += 1;
        }

        let is_to = to_start + 1 < open
            && chars[to_start].1.eq_ignore_ascii_case(&'t')
            && chars[to_start + 1].1.eq_ignore_ascii_case(&'o');

        // `to`, at least one whitespace, and at least one more char before `(`
        if is_to && is_ws(to_start + 2) && to_start + 4 <= open {
            return Some((ws_start, to_start + 2));
        }
    }

    None
}
