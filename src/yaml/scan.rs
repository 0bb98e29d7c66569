//! Line map of block-style YAML.
//!
//! Every frontmatter line is classified once. Byte offsets are relative to
//! the line with its terminator stripped. Lines that belong to a value
//! started on an earlier line (block scalars, multi-line plain or quoted
//! scalars, multi-line flow collections) are [`LineKind::Continuation`] and
//! are never matched as keys.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInfo {
    /// Number of leading spaces
    pub indent: usize,
    pub kind: LineKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Entry(EntryLine),
    Item(ItemLine),
    Continuation,
    Other,
}

/// A `key: value` mapping entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLine {
    /// Decoded key
    pub key: String,
    pub key_start: usize,
    pub key_end: usize,
    /// Byte offset of the mapping colon
    pub colon: usize,
    pub value_start: usize,
    pub value_end: usize,
    pub comment_start: Option<usize>,
    pub value: ValueKind,
}

impl EntryLine {
    /// Column the key starts at; children must be indented past it.
    pub fn column(&self) -> usize {
        self.key_start
    }
}

/// A `- item` sequence entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLine {
    /// Column of the dash
    pub dash: usize,
    pub content_start: usize,
    pub content_end: usize,
    pub comment_start: Option<usize>,
    /// Compact mapping started on the item line (`- name: value`)
    pub entry: Option<EntryLine>,
    pub value: ValueKind,
}

/// Shape of the inline value token following a key or a dash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Nothing but possibly a comment: children follow on later lines
    Empty,
    Scalar,
    FlowSequence,
    FlowMapping,
    /// `|` or `>` header
    BlockScalar,
    /// Anchor, alias or tag in front of the value
    Decorated,
}

impl ValueKind {
    fn of(token: &str) -> Self {
        match token.as_bytes().first() {
            None => ValueKind::Empty,
            Some(b'[') => ValueKind::FlowSequence,
            Some(b'{') => ValueKind::FlowMapping,
            Some(b'|') | Some(b'>') => ValueKind::BlockScalar,
            Some(b'&') | Some(b'*') | Some(b'!') => ValueKind::Decorated,
            _ => ValueKind::Scalar,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ValueKind::Empty => "empty value",
            ValueKind::Scalar | ValueKind::BlockScalar => "scalar",
            ValueKind::FlowSequence => "flow sequence",
            ValueKind::FlowMapping => "flow mapping",
            ValueKind::Decorated => "decorated value",
        }
    }
}

/// Strip `\n` or `\r\n`.
pub fn content(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(line)
}

pub fn scan(lines: &[String]) -> Vec<LineInfo> {
    let mut infos = Vec::with_capacity(lines.len());
    // Lines indented deeper than this column continue an inline value.
    let mut open_value: Option<usize> = None;

    for line in lines {
        let text = content(line);
        let indent = text.len() - text.trim_start_matches(' ').len();
        let trimmed = &text[indent..];

        if trimmed.trim().is_empty() {
            infos.push(LineInfo {
                indent,
                kind: LineKind::Blank,
            });
            continue;
        }

        if let Some(column) = open_value {
            if indent > column {
                infos.push(LineInfo {
                    indent,
                    kind: LineKind::Continuation,
                });
                continue;
            }
            open_value = None;
        }

        let kind = classify(text, indent);
        open_value = match &kind {
            LineKind::Entry(entry) if entry.value != ValueKind::Empty => Some(entry.column()),
            LineKind::Item(item) => match &item.entry {
                Some(entry) if entry.value != ValueKind::Empty => Some(entry.column()),
                Some(_) => None,
                None if item.value != ValueKind::Empty => Some(item.dash),
                None => None,
            },
            LineKind::Other => Some(indent),
            _ => None,
        };
        infos.push(LineInfo { indent, kind });
    }

    infos
}

fn classify(text: &str, indent: usize) -> LineKind {
    let rest = &text[indent..];
    if rest.starts_with('#') {
        return LineKind::Comment;
    }
    if rest == "-" || rest.starts_with("- ") || rest.starts_with("-\t") {
        return LineKind::Item(parse_item(text, indent));
    }
    match parse_entry(text, indent) {
        Some(entry) => LineKind::Entry(entry),
        None => LineKind::Other,
    }
}

fn parse_item(text: &str, dash: usize) -> ItemLine {
    let after_dash = dash + 1;
    let content_start = skip_blanks(text, after_dash);

    if content_start < text.len() && !text[content_start..].starts_with('#') {
        if let Some(entry) = parse_entry(text, content_start) {
            return ItemLine {
                dash,
                content_start,
                content_end: text.len(),
                comment_start: entry.comment_start,
                value: ValueKind::Empty,
                entry: Some(entry),
            };
        }
    }

    let (value_start, value_end, comment_start) = split_value(text, after_dash);
    ItemLine {
        dash,
        content_start: value_start,
        content_end: value_end,
        comment_start,
        entry: None,
        value: ValueKind::of(&text[value_start..value_end]),
    }
}

/// Parse `key: value` starting at byte `start`.
pub fn parse_entry(text: &str, start: usize) -> Option<EntryLine> {
    let rest = &text[start..];
    let first = rest.chars().next()?;
    if matches!(first, '[' | '{' | '?' | '#' | '|' | '>' | '&' | '*' | '!' | '%' | '@' | '`') {
        return None;
    }

    let (key, key_end, colon) = if first == '"' || first == '\'' {
        let (key, close) = parse_quoted(text, start)?;
        let colon = skip_blanks(text, close);
        if text.as_bytes().get(colon) != Some(&b':') {
            return None;
        }
        (key, close, colon)
    } else {
        let colon = find_plain_colon(text, start)?;
        let key_end = start + text[start..colon].trim_end().len();
        (text[start..key_end].to_string(), key_end, colon)
    };

    if key.is_empty() && first != '"' && first != '\'' {
        return None;
    }

    let (value_start, value_end, comment_start) = split_value(text, colon + 1);
    Some(EntryLine {
        key,
        key_start: start,
        key_end,
        colon,
        value_start,
        value_end,
        comment_start,
        value: ValueKind::of(&text[value_start..value_end]),
    })
}

/// Mapping colon of a plain key: a `:` followed by whitespace or end of line.
fn find_plain_colon(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut idx = start;
    while idx < bytes.len() {
        match bytes[idx] {
            b':' => {
                let next = bytes.get(idx + 1);
                if next.is_none() || next == Some(&b' ') || next == Some(&b'\t') {
                    return Some(idx);
                }
            }
            b'#' if idx > start && matches!(bytes[idx - 1], b' ' | b'\t') => return None,
            _ => {}
        }
        idx += 1;
    }
    None
}

/// Decode a quoted scalar starting at `start`; returns the value and the
/// offset just past the closing quote.
fn parse_quoted(text: &str, start: usize) -> Option<(String, usize)> {
    let quote = text[start..].chars().next()?;
    let mut value = String::new();
    let mut chars = text[start + 1..].char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        let absolute = start + 1 + offset;
        if quote == '\'' {
            if ch == '\'' {
                if let Some((_, '\'')) = chars.peek() {
                    chars.next();
                    value.push('\'');
                    continue;
                }
                return Some((value, absolute + 1));
            }
            value.push(ch);
            continue;
        }

        match ch {
            '"' => return Some((value, absolute + 1)),
            '\\' => {
                let (_, escaped) = chars.next()?;
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
            }
            other => value.push(other),
        }
    }

    None
}

/// Split the text after `from` into a trimmed value token and an optional
/// end-of-line comment.
pub fn split_value(text: &str, from: usize) -> (usize, usize, Option<usize>) {
    let value_start = skip_blanks(text, from);
    let bytes = text.as_bytes();
    let mut in_single = false;
    let mut in_double = false;
    let mut escape = false;
    let mut comment_start = None;

    let mut idx = value_start;
    while idx < bytes.len() {
        let byte = bytes[idx];
        if in_double {
            if escape {
                escape = false;
            } else if byte == b'\\' {
                escape = true;
            } else if byte == b'"' {
                in_double = false;
            }
            idx += 1;
            continue;
        }
        if in_single {
            if byte == b'\'' {
                in_single = false;
            }
            idx += 1;
            continue;
        }

        let at_token_start =
            idx == value_start || matches!(bytes[idx - 1], b' ' | b'\t' | b'[' | b'{' | b',');
        match byte {
            b'"' if at_token_start => in_double = true,
            b'\'' if at_token_start => in_single = true,
            b'#' if idx == 0 || matches!(bytes[idx - 1], b' ' | b'\t') => {
                comment_start = Some(idx);
                break;
            }
            _ => {}
        }
        idx += 1;
    }

    let end = comment_start.unwrap_or(bytes.len());
    let value_end = value_start + text[value_start..end].trim_end().len();
    (value_start, value_end, comment_start)
}

fn skip_blanks(text: &str, from: usize) -> usize {
    let bytes = text.as_bytes();
    let mut idx = from.min(bytes.len());
    while idx < bytes.len() && matches!(bytes[idx], b' ' | b'\t') {
        idx += 1;
    }
    idx
}

/// First anchor, alias or merge key found in the frontmatter, if any.
pub fn find_unsupported(lines: &[String], infos: &[LineInfo]) -> Option<(usize, String)> {
    for (idx, (line, info)) in lines.iter().zip(infos).enumerate() {
        let text = content(line);
        let (entry, value) = match &info.kind {
            LineKind::Entry(entry) => (Some(entry), None),
            LineKind::Item(item) => match &item.entry {
                Some(entry) => (Some(entry), None),
                None => (None, Some(&text[item.content_start..item.content_end])),
            },
            _ => continue,
        };

        if let Some(entry) = entry {
            if entry.key == "<<" {
                return Some((idx + 1, "merge keys (<<) are not supported".to_string()));
            }
        }
        let token = match (entry, value) {
            (Some(entry), _) => &text[entry.value_start..entry.value_end],
            (None, Some(value)) => value,
            (None, None) => continue,
        };
        if let Some(found) = anchor_or_alias(token) {
            return Some((idx + 1, format!("{found} are not supported")));
        }
    }
    None
}

fn anchor_or_alias(token: &str) -> Option<&'static str> {
    let check = |byte: u8| match byte {
        b'&' => Some("anchors"),
        b'*' => Some("aliases"),
        _ => None,
    };

    let bytes = token.as_bytes();
    let first = *bytes.first()?;
    if let Some(found) = check(first) {
        return Some(found);
    }
    if first != b'[' && first != b'{' {
        return None;
    }

    let mut in_single = false;
    let mut in_double = false;
    let mut prev = first;
    for &byte in &bytes[1..] {
        if in_double {
            if byte == b'"' && prev != b'\\' {
                in_double = false;
            }
        } else if in_single {
            if byte == b'\'' {
                in_single = false;
            }
        } else if matches!(prev, b'[' | b'{' | b',' | b' ') {
            match byte {
                b'"' => in_double = true,
                b'\'' => in_single = true,
                other => {
                    if let Some(found) = check(other) {
                        return Some(found);
                    }
                }
            }
        }
        prev = byte;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_text(text: &str) -> Vec<LineInfo> {
        let lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
        scan(&lines)
    }

    fn entry(info: &LineInfo) -> &EntryLine {
        match &info.kind {
            LineKind::Entry(entry) => entry,
            other => panic!("expected entry, got {other:?}"),
        }
    }

    #[test]
    fn classifies_entries_and_comments() {
        let infos = scan_text("on: push # trigger\n\n# note\nnetwork:\n  firewall: true\n");
        let on = entry(&infos[0]);
        assert_eq!(on.key, "on");
        assert_eq!(on.value, ValueKind::Scalar);
        assert_eq!((on.value_start, on.value_end), (4, 8));
        assert_eq!(on.comment_start, Some(9));
        assert_eq!(infos[1].kind, LineKind::Blank);
        assert_eq!(infos[2].kind, LineKind::Comment);
        assert_eq!(entry(&infos[3]).value, ValueKind::Empty);
        assert_eq!(infos[4].indent, 2);
        assert_eq!(entry(&infos[4]).key, "firewall");
    }

    #[test]
    fn quoted_keys_are_decoded() {
        let infos = scan_text("\"on\": push\n'it''s': 1\n");
        assert_eq!(entry(&infos[0]).key, "on");
        assert_eq!(entry(&infos[0]).key_end, 4);
        assert_eq!(entry(&infos[1]).key, "it's");
    }

    #[test]
    fn block_scalar_lines_are_opaque() {
        let infos = scan_text("description: |\n  not: a key\n\n  # not a comment\nnext: 1\n");
        assert_eq!(entry(&infos[0]).value, ValueKind::BlockScalar);
        assert_eq!(infos[1].kind, LineKind::Continuation);
        assert_eq!(infos[2].kind, LineKind::Blank);
        assert_eq!(infos[3].kind, LineKind::Continuation);
        assert_eq!(entry(&infos[4]).key, "next");
    }

    #[test]
    fn colon_inside_values_and_urls() {
        let infos = scan_text("url: https://example.com:8080/x # c\nkey::x: 1\n");
        let url = entry(&infos[0]);
        assert_eq!(url.key, "url");
        assert_eq!(url.value_end, 31);
        assert_eq!(entry(&infos[1]).key, "key::x");
    }

    #[test]
    fn hash_inside_quotes_is_not_a_comment() {
        let infos = scan_text("title: \"a # b\" # real\n");
        let title = entry(&infos[0]);
        assert_eq!(title.value_end, 14);
        assert_eq!(title.comment_start, Some(15));
    }

    #[test]
    fn sequence_items() {
        let infos = scan_text("allowed:\n  - a.com # c\n  - name: x\n    port: 1\n-\n");
        match &infos[1].kind {
            LineKind::Item(item) => {
                assert_eq!(item.dash, 2);
                assert_eq!((item.content_start, item.content_end), (4, 9));
                assert!(item.entry.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
        match &infos[2].kind {
            LineKind::Item(item) => assert_eq!(item.entry.as_ref().unwrap().key, "name"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(entry(&infos[3]).key, "port");
        assert!(matches!(infos[4].kind, LineKind::Item(_)));
    }

    #[test]
    fn multi_line_flow_is_continuation() {
        let infos = scan_text("allowed: [a,\n  b]\nnext: 1\n");
        assert_eq!(entry(&infos[0]).value, ValueKind::FlowSequence);
        assert_eq!(infos[1].kind, LineKind::Continuation);
        assert_eq!(entry(&infos[2]).key, "next");
    }

    #[test]
    fn crlf_lines() {
        let infos = scan_text("on: push\r\nname: x\r\n");
        assert_eq!(entry(&infos[0]).value_end, 8);
        assert_eq!(entry(&infos[1]).key, "name");
    }

    #[test]
    fn detects_anchors_aliases_and_merge_keys() {
        let text = "base: &b\n  x: 1\n";
        let lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
        let found = find_unsupported(&lines, &scan(&lines)).unwrap();
        assert_eq!(found.0, 1);
        assert!(found.1.contains("anchors"));

        for text in ["a: *b\n", "a: [x, *y]\n", "a:\n  - *y\n", "a:\n  <<: {x: 1}\n"] {
            let lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
            assert!(find_unsupported(&lines, &scan(&lines)).is_some(), "{text}");
        }

        let text = "a: 'x&y'\nb: [\"*\", c]\nc: a*b\n";
        let lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
        assert!(find_unsupported(&lines, &scan(&lines)).is_none());
    }
}
