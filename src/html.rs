use std::collections::HashMap;

use crate::dom::{Dom, NodeId};
use crate::{Error, Result};

pub(crate) fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn decode_character_references(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }

    fn decode_numeric(value: &str) -> Option<char> {
        let codepoint = if let Some(hex) = value
            .strip_prefix('x')
            .or_else(|| value.strip_prefix('X'))
        {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            value.parse::<u32>().ok()?
        };
        char::from_u32(codepoint)
    }

    fn decode_named(value: &str) -> Option<char> {
        match value {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{00A0}'),
            _ => None,
        }
    }

    let chars: Vec<char> = src.chars().collect();
    let mut out = String::with_capacity(src.len());
    let mut i = 0usize;
    while i < chars.len() {
        if chars[i] != '&' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let mut j = i + 1;
        let mut token = String::new();
        while j < chars.len() && chars[j] != ';' && j - i <= 8 {
            token.push(chars[j]);
            j += 1;
        }
        let decoded = if chars.get(j) == Some(&';') {
            if let Some(rest) = token.strip_prefix('#') {
                decode_numeric(rest)
            } else {
                decode_named(&token)
            }
        } else {
            None
        };
        if let Some(ch) = decoded {
            out.push(ch);
            i = j + 1;
        } else {
            out.push('&');
            i += 1;
        }
    }
    out
}

/// Forgiving fragment parser: enough HTML for page fixtures. Unclosed tags
/// and stray close tags are tolerated the way browsers tolerate them.
pub(crate) fn parse_html(html: &str) -> Result<Dom> {
    let mut dom = Dom::new();
    let chars: Vec<char> = html.chars().collect();
    let mut stack: Vec<NodeId> = vec![dom.root()];
    let mut i = 0usize;

    while i < chars.len() {
        if chars[i] == '<' {
            if starts_with(&chars, i, "<!--") {
                i = skip_until(&chars, i + 4, "-->")
                    .ok_or_else(|| Error::HtmlParse("unterminated comment".into()))?;
                continue;
            }
            if starts_with(&chars, i, "<!") {
                i = skip_until(&chars, i + 2, ">")
                    .ok_or_else(|| Error::HtmlParse("unterminated declaration".into()))?;
                continue;
            }
            if starts_with(&chars, i, "</") {
                let (tag, next) = read_tag_name(&chars, i + 2);
                let next = skip_until(&chars, next, ">")
                    .ok_or_else(|| Error::HtmlParse(format!("unterminated close tag </{tag}")))?;
                if let Some(pos) = stack.iter().rposition(|node| {
                    dom.tag_name(*node)
                        .map(|t| t.eq_ignore_ascii_case(&tag))
                        .unwrap_or(false)
                }) {
                    stack.truncate(pos);
                }
                i = next;
                continue;
            }
            if chars
                .get(i + 1)
                .map(|ch| ch.is_ascii_alphabetic())
                .unwrap_or(false)
            {
                let (tag, mut j) = read_tag_name(&chars, i + 1);
                let (attrs, self_closing, next) = read_attrs(&chars, j, &tag)?;
                j = next;
                let parent = *stack.last().unwrap_or(&dom.root());
                let node = dom.create_element(parent, tag.to_ascii_lowercase(), attrs);
                if !self_closing && !is_void_tag(&tag) {
                    stack.push(node);
                }
                i = j;
                continue;
            }
            // A lone '<' in text.
            let (text, next) = read_text(&chars, i + 1);
            let parent = *stack.last().unwrap_or(&dom.root());
            let combined = format!("<{text}");
            if !combined.trim().is_empty() {
                dom.create_text(parent, decode_character_references(&combined));
            }
            i = next;
            continue;
        }

        let (text, next) = read_text(&chars, i);
        if !text.trim().is_empty() {
            let parent = *stack.last().unwrap_or(&dom.root());
            dom.create_text(parent, decode_character_references(&text));
        }
        i = next;
    }

    Ok(dom)
}

fn starts_with(chars: &[char], at: usize, pat: &str) -> bool {
    pat.chars()
        .enumerate()
        .all(|(offset, ch)| chars.get(at + offset) == Some(&ch))
}

fn skip_until(chars: &[char], mut at: usize, pat: &str) -> Option<usize> {
    while at < chars.len() {
        if starts_with(chars, at, pat) {
            return Some(at + pat.chars().count());
        }
        at += 1;
    }
    None
}

fn read_tag_name(chars: &[char], mut at: usize) -> (String, usize) {
    let mut name = String::new();
    while at < chars.len() && (chars[at].is_ascii_alphanumeric() || chars[at] == '-') {
        name.push(chars[at]);
        at += 1;
    }
    (name, at)
}

fn read_text(chars: &[char], mut at: usize) -> (String, usize) {
    let mut text = String::new();
    while at < chars.len() && chars[at] != '<' {
        text.push(chars[at]);
        at += 1;
    }
    (text, at)
}

type ParsedAttrs = (HashMap<String, String>, bool, usize);

fn read_attrs(chars: &[char], mut at: usize, tag: &str) -> Result<ParsedAttrs> {
    let mut attrs = HashMap::new();
    loop {
        while at < chars.len() && chars[at].is_whitespace() {
            at += 1;
        }
        match chars.get(at) {
            None => return Err(Error::HtmlParse(format!("unterminated open tag <{tag}"))),
            Some('>') => return Ok((attrs, false, at + 1)),
            Some('/') => {
                at += 1;
                while at < chars.len() && chars[at].is_whitespace() {
                    at += 1;
                }
                if chars.get(at) == Some(&'>') {
                    return Ok((attrs, true, at + 1));
                }
                return Err(Error::HtmlParse(format!("malformed open tag <{tag}")));
            }
            Some(_) => {
                let mut name = String::new();
                while at < chars.len()
                    && !chars[at].is_whitespace()
                    && !matches!(chars[at], '=' | '>' | '/')
                {
                    name.push(chars[at]);
                    at += 1;
                }
                if name.is_empty() {
                    return Err(Error::HtmlParse(format!("malformed open tag <{tag}")));
                }
                while at < chars.len() && chars[at].is_whitespace() {
                    at += 1;
                }
                let value = if chars.get(at) == Some(&'=') {
                    at += 1;
                    while at < chars.len() && chars[at].is_whitespace() {
                        at += 1;
                    }
                    let mut value = String::new();
                    match chars.get(at) {
                        Some('"') | Some('\'') => {
                            let quote = chars[at];
                            at += 1;
                            while at < chars.len() && chars[at] != quote {
                                value.push(chars[at]);
                                at += 1;
                            }
                            if at >= chars.len() {
                                return Err(Error::HtmlParse(format!(
                                    "unterminated attribute value in <{tag}"
                                )));
                            }
                            at += 1;
                        }
                        _ => {
                            while at < chars.len()
                                && !chars[at].is_whitespace()
                                && chars[at] != '>'
                            {
                                value.push(chars[at]);
                                at += 1;
                            }
                        }
                    }
                    decode_character_references(&value)
                } else {
                    String::new()
                };
                attrs.insert(name.to_ascii_lowercase(), value);
            }
        }
    }
}
