//! Offset-to-position conversion and delimiter matching over raw source text.
//!
//! Everything here operates on plain strings. The matchers are deliberately
//! lexical: a depth counter that does not skip string literals or comments,
//! so a brace inside either will corrupt the detected range. Callers treat
//! `None` as "skip body-scoped extraction for this declaration".

use serde::{Deserialize, Serialize};

/// Byte offset plus 1-based line/column of an extracted fact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

/// Convert a byte offset into a 1-based (line, column) pair by scanning the
/// preceding text. Column counts characters since the last newline.
pub fn span_at(text: &str, offset: usize) -> Span {
    let offset = offset.min(text.len());
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    Span {
        position: offset,
        line,
        column,
    }
}

/// Find the closing `}` matching the `{` at `open`. Returns `None` when the
/// offset is not an opening brace or the text is unbalanced.
pub fn matching_brace(text: &str, open: usize) -> Option<usize> {
    matching_delimiter(text, open, b'{', b'}')
}

/// Find the closing `)` matching the `(` at `open`.
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    matching_delimiter(text, open, b'(', b')')
}

fn matching_delimiter(text: &str, open: usize, open_ch: u8, close_ch: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    if open >= bytes.len() || bytes[open] != open_ch {
        return None;
    }

    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if b == open_ch {
            depth += 1;
        } else if b == close_ch {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }

    None
}

/// Split an argument list at top-level commas. Nested parentheses, brackets
/// and braces keep their commas intact.
pub fn split_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;

    for (i, b) in args.bytes().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b',' if depth == 0 => {
                let piece = args[start..i].trim();
                if !piece.is_empty() {
                    out.push(piece.to_string());
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    let tail = args[start..].trim();
    if !tail.is_empty() {
        out.push(tail.to_string());
    }

    out
}

/// Brace depth of `offset` relative to the start of `text`. Used to keep
/// class-body extraction at depth 1 (direct members, not nested bodies).
pub fn brace_depth(text: &str, offset: usize) -> usize {
    let mut depth = 0usize;
    for &b in &text.as_bytes()[..offset.min(text.len())] {
        if b == b'{' {
            depth += 1;
        } else if b == b'}' {
            depth = depth.saturating_sub(1);
        }
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_at_first_line() {
        let span = span_at("hello world", 6);
        assert_eq!(span.line, 1);
        assert_eq!(span.column, 7);
    }

    #[test]
    fn test_span_at_later_line() {
        let text = "line one\nline two\nline three";
        let offset = text.find("three").unwrap();
        let span = span_at(text, offset);
        assert_eq!(span.line, 3);
        assert_eq!(span.column, 6);
        assert_eq!(span.position, offset);
    }

    #[test]
    fn test_matching_brace_nested() {
        let text = "fn x { a { b } c } tail";
        let open = text.find('{').unwrap();
        let close = matching_brace(text, open).unwrap();
        assert_eq!(&text[open..=close], "{ a { b } c }");
    }

    #[test]
    fn test_matching_brace_unbalanced() {
        let text = "{ { }";
        assert_eq!(matching_brace(text, 0), None);
    }

    #[test]
    fn test_matching_brace_not_an_open() {
        assert_eq!(matching_brace("abc", 1), None);
    }

    #[test]
    fn test_split_args_nested() {
        let args = split_args("a, fn(b, c), { d: 1, e: 2 }");
        assert_eq!(args, vec!["a", "fn(b, c)", "{ d: 1, e: 2 }"]);
    }

    #[test]
    fn test_split_args_empty() {
        assert!(split_args("  ").is_empty());
    }

    #[test]
    fn test_brace_depth() {
        let text = "class A { method() { x } }";
        let method_pos = text.find("method").unwrap();
        let x_pos = text.find('x').unwrap();
        assert_eq!(brace_depth(text, method_pos), 1);
        assert_eq!(brace_depth(text, x_pos), 2);
    }
}
