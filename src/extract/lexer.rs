//! Byte-level helpers over router source text: comment views, string/comment
//! classification and delimiter matching.
//!
//! Every transformation here preserves byte length so offsets into a view are
//! offsets into the original file.

use std::sync::OnceLock;

use regex::Regex;

/// Lexical class of one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// Ordinary code.
    Code,
    /// Inside a string or template literal, quotes included.
    Str,
    /// Inside a `//` or `/* */` comment.
    Comment,
}

/// `path: '...'` declaration opener.
pub(crate) fn path_decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\bpath\s*:\s*['"`]"#).expect("valid path regex"))
}

/// Router source with commented-out route blocks exposed and every other
/// comment line blanked.
#[derive(Debug, Clone)]
pub struct CommentView {
    /// Same length as the original text.
    pub text: String,
    /// Per line: was this line commented out in the original?
    pub disabled: Vec<bool>,
    /// Byte offset of each line start.
    pub line_starts: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Code,
    LineComment,
    BlockComment,
}

impl CommentView {
    /// Builds the view.
    ///
    /// Runs of `//` lines and multi-line `/* */` comments are grouped. A group
    /// mentioning a `path:` declaration has its comment markers replaced with
    /// spaces and its lines flagged disabled; any other group is blanked.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' && i + 1 < text.len() {
                line_starts.push(i + 1);
            }
        }
        let line_range = |idx: usize| {
            let start = line_starts[idx];
            let end = line_starts.get(idx + 1).map_or(text.len(), |next| next - 1);
            (start, end.max(start))
        };

        let kinds = classify_lines(text, &line_starts);
        let mut disabled = vec![false; line_starts.len()];

        let mut idx = 0;
        while idx < kinds.len() {
            let kind = kinds[idx];
            if kind == LineKind::Code {
                idx += 1;
                continue;
            }
            let mut group_end = idx + 1;
            while group_end < kinds.len()
                && kinds[group_end] == kind
                && !(kind == LineKind::BlockComment && starts_block(text, line_range(group_end)))
            {
                group_end += 1;
            }

            let (group_start_byte, _) = line_range(idx);
            let (_, group_end_byte) = line_range(group_end - 1);
            let mentions_route = path_decl_re().is_match(&text[group_start_byte..group_end_byte]);

            for line in idx..group_end {
                let (start, end) = line_range(line);
                if mentions_route {
                    disabled[line] = true;
                    strip_markers(&mut bytes, start, end, kind);
                } else {
                    blank(&mut bytes, start, end, kind);
                }
            }
            idx = group_end;
        }

        let text = String::from_utf8(bytes).unwrap_or_else(|_| text.to_string());
        Self { text, disabled, line_starts }
    }

    /// 0-based line index of a byte offset.
    #[must_use]
    pub fn line_index(&self, pos: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= pos).saturating_sub(1)
    }

    /// 1-based line number of a byte offset.
    #[must_use]
    pub fn line_number(&self, pos: usize) -> usize {
        self.line_index(pos) + 1
    }

    /// Was the line holding `pos` commented out?
    #[must_use]
    pub fn is_disabled_at(&self, pos: usize) -> bool {
        self.disabled.get(self.line_index(pos)).copied().unwrap_or(false)
    }

    /// Offset of the start of the line after the one holding `pos`.
    #[must_use]
    pub fn next_line_start(&self, pos: usize) -> usize {
        self.line_starts.get(self.line_index(pos) + 1).copied().unwrap_or(self.text.len())
    }
}

fn starts_block(text: &str, (start, end): (usize, usize)) -> bool {
    text[start..end].trim_start().starts_with("/*")
}

fn classify_lines(text: &str, line_starts: &[usize]) -> Vec<LineKind> {
    let mut kinds = Vec::with_capacity(line_starts.len());
    let mut in_block = false;
    for (idx, &start) in line_starts.iter().enumerate() {
        let end = line_starts.get(idx + 1).map_or(text.len(), |next| next - 1).max(start);
        let trimmed = text[start..end].trim_start();
        if in_block {
            kinds.push(LineKind::BlockComment);
            if trimmed.contains("*/") {
                in_block = false;
            }
        } else if trimmed.starts_with("//") {
            kinds.push(LineKind::LineComment);
        } else if let Some(rest) = trimmed.strip_prefix("/*") {
            kinds.push(LineKind::BlockComment);
            if !rest.contains("*/") {
                in_block = true;
            }
        } else {
            kinds.push(LineKind::Code);
        }
    }
    kinds
}

fn strip_markers(bytes: &mut [u8], start: usize, end: usize, kind: LineKind) {
    let first = (start..end).find(|&i| !bytes[i].is_ascii_whitespace()).unwrap_or(end);
    match kind {
        LineKind::LineComment => {
            let mut i = first;
            while i < end && bytes[i] == b'/' {
                bytes[i] = b' ';
                i += 1;
            }
        }
        LineKind::BlockComment => {
            if first + 1 < end && bytes[first] == b'/' && bytes[first + 1] == b'*' {
                bytes[first] = b' ';
                let mut i = first + 1;
                while i < end && bytes[i] == b'*' {
                    bytes[i] = b' ';
                    i += 1;
                }
            } else if first < end && bytes[first] == b'*' && bytes.get(first + 1) != Some(&b'/') {
                bytes[first] = b' ';
            }
            let close = (start..end.saturating_sub(1))
                .find(|&i| bytes[i] == b'*' && bytes[i + 1] == b'/');
            if let Some(close) = close {
                bytes[close] = b' ';
                bytes[close + 1] = b' ';
            }
        }
        LineKind::Code => {}
    }
}

fn blank(bytes: &mut [u8], start: usize, end: usize, kind: LineKind) {
    let stop = if kind == LineKind::BlockComment {
        // Code may follow the closing marker on the last line.
        (start..end.saturating_sub(1))
            .find(|&i| bytes[i] == b'*' && bytes[i + 1] == b'/')
            .map_or(end, |close| close + 2)
    } else {
        end
    };
    for b in &mut bytes[start..stop] {
        *b = b' ';
    }
}

/// Classifies every byte as code, string or comment.
#[must_use]
pub fn classify(bytes: &[u8]) -> Vec<Class> {
    let n = bytes.len();
    let mut out = vec![Class::Code; n];
    let mut i = 0;
    while i < n {
        let next = bytes.get(i + 1).copied();
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                out[i] = Class::Str;
                i += 1;
                while i < n {
                    out[i] = Class::Str;
                    if bytes[i] == b'\\' {
                        if i + 1 < n {
                            out[i + 1] = Class::Str;
                        }
                        i += 2;
                        continue;
                    }
                    let ends = bytes[i] == quote || (bytes[i] == b'\n' && quote != b'`');
                    i += 1;
                    if ends {
                        break;
                    }
                }
            }
            b'/' if next == Some(b'/') => {
                while i < n && bytes[i] != b'\n' {
                    out[i] = Class::Comment;
                    i += 1;
                }
            }
            b'/' if next == Some(b'*') => {
                out[i] = Class::Comment;
                out[i + 1] = Class::Comment;
                i += 2;
                while i < n {
                    out[i] = Class::Comment;
                    if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        out[i + 1] = Class::Comment;
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    out
}

/// Finds the delimiter closing the one at `open` (`{` or `[`), counting only
/// code bytes. Returns `None` if the balance never returns to zero.
#[must_use]
pub fn find_matching(bytes: &[u8], classes: &[Class], open: usize) -> Option<usize> {
    let (open_byte, close_byte) = match bytes.get(open)? {
        b'{' => (b'{', b'}'),
        b'[' => (b'[', b']'),
        _ => return None,
    };
    let mut depth = 0usize;
    for i in open..bytes.len() {
        if classes[i] != Class::Code {
            continue;
        }
        if bytes[i] == open_byte {
            depth += 1;
        } else if bytes[i] == close_byte {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Innermost `{` still open at `pos`.
#[must_use]
pub fn innermost_open_brace(bytes: &[u8], classes: &[Class], pos: usize) -> Option<usize> {
    let mut stack = Vec::new();
    for i in 0..pos.min(bytes.len()) {
        if classes[i] != Class::Code {
            continue;
        }
        match bytes[i] {
            b'{' => stack.push(i),
            b'}' => {
                stack.pop();
            }
            _ => {}
        }
    }
    stack.pop()
}

/// Innermost `[` still open at `pos`.
#[must_use]
pub fn innermost_open_bracket(bytes: &[u8], classes: &[Class], pos: usize) -> Option<usize> {
    let mut stack = Vec::new();
    for i in 0..pos.min(bytes.len()) {
        if classes[i] != Class::Code {
            continue;
        }
        match bytes[i] {
            b'[' => stack.push(i),
            b']' => {
                stack.pop();
            }
            _ => {}
        }
    }
    stack.pop()
}

/// Copy of `text[start..=end]` where the contents of nested delimiter pairs
/// are replaced by spaces. The nested delimiters themselves and strings at
/// the outer level survive.
#[must_use]
pub fn own_level(text: &str, classes: &[Class], start: usize, end: usize) -> String {
    let bytes = text.as_bytes();
    let mut out = bytes[start..=end].to_vec();
    let mut depth = 0usize;
    for i in start..=end {
        let is_code = classes[i] == Class::Code;
        let b = bytes[i];
        if is_code && (b == b'{' || b == b'[') {
            if depth >= 2 {
                out[i - start] = b' ';
            }
            depth += 1;
        } else if is_code && (b == b'}' || b == b']') {
            depth = depth.saturating_sub(1);
            if depth >= 2 {
                out[i - start] = b' ';
            }
        } else if depth >= 2 && b != b'\n' {
            out[i - start] = b' ';
        }
    }
    String::from_utf8(out).unwrap_or_else(|_| " ".repeat(end - start + 1))
}
