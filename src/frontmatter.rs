//! Frontmatter handling for markdown documents.
//!
//! Two flavors live here. Articles use the gray-matter convention: a `---`
//! fence around a YAML block that serde_yaml understands. Posts use a small
//! hand-rolled subset (scalars and inline string lists) that predates the
//! article pipeline and is kept byte-stable for the repositories that already
//! contain posts written by it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("frontmatter fence opened but never closed")]
    UnterminatedFence,
    #[error("invalid yaml frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("line {0}: expected `key: value`")]
    MalformedLine(usize),
    #[error("line {0}: unterminated quoted string")]
    UnterminatedQuote(usize),
    #[error("line {0}: unterminated inline list")]
    UnterminatedList(usize),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// A markdown document split at the frontmatter fence. `matter` is the raw
/// YAML block without the fences, `None` when the document has no fence.
#[derive(Debug, PartialEq)]
pub struct Document {
    pub matter: Option<String>,
    pub body: String,
}

pub fn split(text: &str) -> Result<Document, FrontmatterError> {
    let Some(rest) = text.strip_prefix("---\n") else {
        return Ok(Document {
            matter: None,
            body: text.to_string(),
        });
    };

    let mut matter = String::new();
    let mut remaining = rest;
    loop {
        if remaining == "---" {
            remaining = "";
            break;
        }
        if let Some(after) = remaining.strip_prefix("---\n") {
            remaining = after;
            break;
        }
        let Some(newline) = remaining.find('\n') else {
            return Err(FrontmatterError::UnterminatedFence);
        };
        matter.push_str(&remaining[..=newline]);
        remaining = &remaining[newline + 1..];
    }

    // The generator leaves one blank line between the fence and the body.
    let body = remaining.strip_prefix('\n').unwrap_or(remaining);

    Ok(Document {
        matter: Some(matter),
        body: body.to_string(),
    })
}

pub fn join(matter_yaml: &str, body: &str) -> String {
    let mut out = String::with_capacity(matter_yaml.len() + body.len() + 16);
    out.push_str("---\n");
    out.push_str(matter_yaml);
    if !matter_yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n\n");
    out.push_str(body);
    out
}

/// A scalar or inline list in the hand-rolled subset.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleValue {
    Str(String),
    Bool(bool),
    Int(i64),
    List(Vec<String>),
}

impl SimpleValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SimpleValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            SimpleValue::List(items) => Some(items),
            _ => None,
        }
    }
}

fn needs_quoting(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    if s != s.trim() {
        return true;
    }
    if s == "true" || s == "false" || s.parse::<i64>().is_ok() {
        return true;
    }
    s.chars()
        .any(|c| matches!(c, ':' | '#' | '[' | ']' | '{' | '}' | ',' | '"' | '\'' | '\n'))
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn write_scalar(out: &mut String, value: &SimpleValue) {
    match value {
        SimpleValue::Str(s) => {
            if needs_quoting(s) {
                out.push_str(&quote(s));
            } else {
                out.push_str(s);
            }
        }
        SimpleValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        SimpleValue::Int(i) => out.push_str(&i.to_string()),
        SimpleValue::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if needs_quoting(item) {
                    out.push_str(&quote(item));
                } else {
                    out.push_str(item);
                }
            }
            out.push(']');
        }
    }
}

/// Serializes fields and body into a fenced document. Field order is
/// preserved, so `parse_simple(generate_simple(fields, body))` returns the
/// fields exactly as given.
pub fn generate_simple(fields: &[(String, SimpleValue)], body: &str) -> String {
    let mut matter = String::new();
    for (key, value) in fields {
        matter.push_str(key);
        matter.push_str(": ");
        write_scalar(&mut matter, value);
        matter.push('\n');
    }
    join(&matter, body)
}

fn parse_quoted(raw: &str, line_no: usize) -> Result<String, FrontmatterError> {
    let inner = &raw[1..];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    loop {
        match chars.next() {
            Some('"') => {
                if chars.next().is_some() {
                    // Trailing garbage after the closing quote.
                    return Err(FrontmatterError::MalformedLine(line_no));
                }
                return Ok(out);
            }
            Some('\\') => match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some('n') => out.push('\n'),
                _ => return Err(FrontmatterError::UnterminatedQuote(line_no)),
            },
            Some(c) => out.push(c),
            None => return Err(FrontmatterError::UnterminatedQuote(line_no)),
        }
    }
}

/// Splits an inline list body on commas outside quotes. A naive split
/// would break quoted items containing commas, which the generator emits.
fn parse_list_items(inner: &str, line_no: usize) -> Result<Vec<String>, FrontmatterError> {
    let mut items = Vec::new();
    let mut rest = inner.trim();
    if rest.is_empty() {
        return Ok(items);
    }
    loop {
        rest = rest.trim_start();
        if let Some(quoted) = rest.strip_prefix('"') {
            let mut item = String::new();
            let mut chars = quoted.char_indices();
            let mut close = None;
            while let Some((i, c)) = chars.next() {
                match c {
                    '"' => {
                        close = Some(i);
                        break;
                    }
                    '\\' => match chars.next() {
                        Some((_, '"')) => item.push('"'),
                        Some((_, '\\')) => item.push('\\'),
                        Some((_, 'n')) => item.push('\n'),
                        _ => return Err(FrontmatterError::UnterminatedQuote(line_no)),
                    },
                    _ => item.push(c),
                }
            }
            let Some(close) = close else {
                return Err(FrontmatterError::UnterminatedQuote(line_no));
            };
            items.push(item);
            rest = quoted[close + 1..].trim_start();
            if rest.is_empty() {
                break;
            }
            let Some(after) = rest.strip_prefix(',') else {
                return Err(FrontmatterError::MalformedLine(line_no));
            };
            rest = after;
        } else {
            match rest.find(',') {
                Some(pos) => {
                    items.push(rest[..pos].trim().to_string());
                    rest = &rest[pos + 1..];
                }
                None => {
                    items.push(rest.trim().to_string());
                    break;
                }
            }
        }
    }
    Ok(items)
}

fn parse_scalar(raw: &str, line_no: usize) -> Result<SimpleValue, FrontmatterError> {
    let raw = raw.trim();
    if raw.starts_with('"') {
        return Ok(SimpleValue::Str(parse_quoted(raw, line_no)?));
    }
    if let Some(inner) = raw.strip_prefix('[') {
        let Some(inner) = inner.strip_suffix(']') else {
            return Err(FrontmatterError::UnterminatedList(line_no));
        };
        return Ok(SimpleValue::List(parse_list_items(inner, line_no)?));
    }
    if raw == "true" {
        return Ok(SimpleValue::Bool(true));
    }
    if raw == "false" {
        return Ok(SimpleValue::Bool(false));
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(SimpleValue::Int(n));
    }
    Ok(SimpleValue::Str(raw.to_string()))
}

/// Parses a fenced document written by [`generate_simple`]. Documents without
/// a fence come back with no fields and the full text as body.
pub fn parse_simple(text: &str) -> Result<(Vec<(String, SimpleValue)>, String), FrontmatterError> {
    let doc = split(text)?;
    let Some(matter) = doc.matter else {
        return Ok((vec![], doc.body));
    };

    let mut fields = Vec::new();
    for (i, line) in matter.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let Some((key, raw_value)) = line.split_once(':') else {
            return Err(FrontmatterError::MalformedLine(line_no));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(FrontmatterError::MalformedLine(line_no));
        }
        fields.push((key.to_string(), parse_scalar(raw_value, line_no)?));
    }

    Ok((fields, doc.body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_without_fence_is_all_body() {
        let doc = split("just some markdown\n").unwrap();
        assert_eq!(doc.matter, None);
        assert_eq!(doc.body, "just some markdown\n");
    }

    #[test]
    fn split_and_join_round_trip() {
        let text = "---\ntitle: Hello\ntags:\n- a\n- b\n---\n\n# Heading\n\nbody text\n";
        let doc = split(text).unwrap();
        assert_eq!(doc.matter.as_deref(), Some("title: Hello\ntags:\n- a\n- b\n"));
        assert_eq!(doc.body, "# Heading\n\nbody text\n");
        assert_eq!(join(doc.matter.as_deref().unwrap(), &doc.body), text);
    }

    #[test]
    fn split_preserves_blank_lines_inside_body() {
        let text = join("title: x\n", "\n\nstarts after two blank lines\n");
        let doc = split(&text).unwrap();
        assert_eq!(doc.body, "\n\nstarts after two blank lines\n");
    }

    #[test]
    fn split_rejects_unterminated_fence() {
        let err = split("---\ntitle: x\nno closing fence").unwrap_err();
        assert!(matches!(err, FrontmatterError::UnterminatedFence));
    }

    #[test]
    fn split_accepts_fence_at_end_of_input() {
        let doc = split("---\ntitle: x\n---").unwrap();
        assert_eq!(doc.matter.as_deref(), Some("title: x\n"));
        assert_eq!(doc.body, "");
    }

    #[test]
    fn simple_round_trips_every_field() {
        let fields = vec![
            ("title".to_string(), SimpleValue::Str("Field notes: day 3".to_string())),
            ("date".to_string(), SimpleValue::Str("2026-08-24".to_string())),
            ("tags".to_string(), SimpleValue::List(vec!["rust".to_string(), "notes_2".to_string()])),
            ("pinned".to_string(), SimpleValue::Bool(false)),
            ("revision".to_string(), SimpleValue::Int(4)),
        ];
        let body = "First line.\n\nSecond paragraph.\n";
        let text = generate_simple(&fields, body);
        let (parsed, parsed_body) = parse_simple(&text).unwrap();
        assert_eq!(parsed, fields);
        assert_eq!(parsed_body, body);
    }

    #[test]
    fn simple_quotes_numeric_looking_strings() {
        let fields = vec![("title".to_string(), SimpleValue::Str("1984".to_string()))];
        let text = generate_simple(&fields, "");
        assert!(text.contains("title: \"1984\""));
        let (parsed, _) = parse_simple(&text).unwrap();
        assert_eq!(parsed, fields);
    }

    #[test]
    fn simple_round_trips_empty_list_and_empty_string() {
        let fields = vec![
            ("tags".to_string(), SimpleValue::List(vec![])),
            ("title".to_string(), SimpleValue::Str(String::new())),
        ];
        let text = generate_simple(&fields, "body\n");
        let (parsed, body) = parse_simple(&text).unwrap();
        assert_eq!(parsed, fields);
        assert_eq!(body, "body\n");
    }

    #[test]
    fn simple_escapes_quotes_and_backslashes() {
        let fields = vec![(
            "title".to_string(),
            SimpleValue::Str("she said \"no\" \\ twice".to_string()),
        )];
        let text = generate_simple(&fields, "");
        let (parsed, _) = parse_simple(&text).unwrap();
        assert_eq!(parsed, fields);
    }

    #[test]
    fn list_items_with_commas_round_trip() {
        let fields = vec![(
            "tags".to_string(),
            SimpleValue::List(vec!["a,b".to_string(), "plain".to_string(), "c, d".to_string()]),
        )];
        let text = generate_simple(&fields, "body\n");
        let (parsed, body) = parse_simple(&text).unwrap();
        assert_eq!(parsed, fields);
        assert_eq!(body, "body\n");
    }

    #[test]
    fn list_rejects_garbage_after_quoted_item() {
        let text = "---\ntags: [\"a\" b]\n---\n\n";
        let err = parse_simple(text).unwrap_err();
        assert!(matches!(err, FrontmatterError::MalformedLine(1)));
    }

    #[test]
    fn simple_rejects_malformed_lines() {
        let text = "---\nthis line has no separator\n---\n\n";
        let err = parse_simple(text).unwrap_err();
        assert!(matches!(err, FrontmatterError::MalformedLine(1)));
    }

    #[test]
    fn simple_rejects_unterminated_list() {
        let text = "---\ntags: [a, b\n---\n\n";
        let err = parse_simple(text).unwrap_err();
        assert!(matches!(err, FrontmatterError::UnterminatedList(1)));
    }

    #[test]
    fn simple_skips_comments_and_blank_lines() {
        let text = "---\n# legacy header\n\ntitle: hi\n---\n\n";
        let (parsed, _) = parse_simple(text).unwrap();
        assert_eq!(parsed, vec![("title".to_string(), SimpleValue::Str("hi".to_string()))]);
    }
}
