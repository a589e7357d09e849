//! HTML serialization and a lenient fragment parser.
//!
//! Covers the subset of HTML the editor produces and stores in undo
//! snapshots: elements with quoted or bare attributes, text with named and
//! numeric character references, void elements and comments. Unmatched close
//! tags are ignored the way browsers ignore them; an unterminated tag or
//! comment is reported as [`Error::InvalidHtml`].

// Parser keeps a uniform Result-returning shape across helpers
#![allow(clippy::unnecessary_wraps)]

use crate::dom::{Dom, NodeId, NodeKind};
use crate::error::{Error, Result};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "img", "hr", "input", "wbr", "meta", "link", "col"];

/// Whether `tag` is a void element.
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Serialize the children of `id`.
#[must_use]
pub fn serialize_children(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    for child in dom.children(id) {
        write_node(dom, *child, &mut out);
    }
    out
}

/// Serialize `id` including its own tag.
#[must_use]
pub fn serialize_node(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, id, &mut out);
    out
}

fn write_node(dom: &Dom, id: NodeId, out: &mut String) {
    match dom.kind(id) {
        Some(NodeKind::Text(text)) => escape_text(text, out),
        Some(NodeKind::Element(element)) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attribute(value, out);
                out.push('"');
            }
            out.push('>');
            if is_void_element(&element.tag) {
                return;
            }
            for child in dom.children(id) {
                write_node(dom, *child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
        None => {}
    }
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

/// Decode character references (`&amp;`, `&#8203;`, `&#x200B;` ...).
///
/// Unknown or malformed references are kept literally.
#[must_use]
pub fn decode_entities(source: &str) -> String {
    if !source.contains('&') {
        return source.to_string();
    }
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .get(1..rest.len().min(12))
            .and_then(|window| window.find(';'))
            .and_then(|semi| decode_reference(&rest[1..=semi]).map(|ch| (ch, semi + 2)));
        if let Some((ch, consumed)) = decoded {
            out.push(ch);
            rest = &rest[consumed..];
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = if let Some(hex) = digits.strip_prefix(['x', 'X']) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                digits.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn error(&self, reason: &str) -> Error {
        Error::InvalidHtml {
            position: self.pos,
            reason: reason.to_string(),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Read a run of name characters (tag or attribute name).
    fn read_name(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '=' | '>' | '/' | '<'))
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn read_attribute_value(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let rest = self.rest();
                let end = rest
                    .find(quote)
                    .ok_or_else(|| self.error("unterminated attribute value"))?;
                self.pos += end + 1;
                Ok(decode_entities(&rest[..end]))
            }
            _ => {
                let rest = self.rest();
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                self.pos += end;
                Ok(decode_entities(&rest[..end]))
            }
        }
    }

    /// Parse `<tag attr=...>` after the `<`. Returns tag, attributes and
    /// whether the tag was self-closing.
    fn read_start_tag(&mut self) -> Result<(String, Vec<(String, String)>, bool)> {
        let tag = self.read_name().to_ascii_lowercase();
        let mut attributes: Vec<(String, String)> = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error("unterminated start tag")),
                Some('>') => {
                    self.pos += 1;
                    return Ok((tag, attributes, false));
                }
                Some('/') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    if self.peek() == Some('>') {
                        self.pos += 1;
                        return Ok((tag, attributes, true));
                    }
                }
                Some('<') => return Err(self.error("unterminated start tag")),
                Some(_) => {
                    let name = self.read_name().to_ascii_lowercase();
                    if name.is_empty() {
                        // Stray '=' or similar; skip one char.
                        self.pos += self.peek().map_or(1, char::len_utf8);
                        continue;
                    }
                    self.skip_whitespace();
                    let value = if self.peek() == Some('=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        self.read_attribute_value()?
                    } else {
                        String::new()
                    };
                    if !attributes.iter().any(|(key, _)| *key == name) {
                        attributes.push((name, value));
                    }
                }
            }
        }
    }
}

/// Parse an HTML fragment into detached nodes owned by `dom`.
///
/// On error every node created so far is released again.
pub fn parse_fragment(dom: &mut Dom, source: &str) -> Result<Vec<NodeId>> {
    let mut roots: Vec<NodeId> = Vec::new();
    match parse_into(dom, source, &mut roots) {
        Ok(()) => Ok(roots),
        Err(err) => {
            for root in roots {
                dom.release(root);
            }
            Err(err)
        }
    }
}

fn parse_into(dom: &mut Dom, source: &str, roots: &mut Vec<NodeId>) -> Result<()> {
    let mut parser = Parser { source, pos: 0 };
    let mut open: Vec<NodeId> = Vec::new();

    while parser.pos < source.len() {
        let rest = parser.rest();
        if let Some(after) = rest.strip_prefix("<!--") {
            let end = after
                .find("-->")
                .ok_or_else(|| parser.error("unterminated comment"))?;
            parser.pos += 4 + end + 3;
        } else if let Some(after) = rest.strip_prefix("</") {
            let end = after
                .find('>')
                .ok_or_else(|| parser.error("unterminated end tag"))?;
            let tag = after[..end].trim().to_ascii_lowercase();
            parser.pos += 2 + end + 1;
            if let Some(index) = open.iter().rposition(|id| dom.tag(*id) == Some(tag.as_str())) {
                open.truncate(index);
            }
        } else if let Some(after) = rest.strip_prefix("<!") {
            let end = after
                .find('>')
                .ok_or_else(|| parser.error("unterminated declaration"))?;
            parser.pos += 2 + end + 1;
        } else if rest.starts_with('<')
            && rest[1..].chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        {
            parser.pos += 1;
            let (tag, attributes, self_closing) = parser.read_start_tag()?;
            let element = dom.create_element(&tag);
            for (name, value) in &attributes {
                dom.set_attribute(element, name, value)?;
            }
            attach(dom, &open, roots, element)?;
            if !self_closing && !is_void_element(&tag) {
                open.push(element);
            }
        } else {
            // Text up to the next tag opener; a lone '<' is literal text.
            let skip = usize::from(rest.starts_with('<'));
            let end = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
            let text = decode_entities(&rest[..end]);
            parser.pos += end;
            append_text(dom, &open, roots, &text)?;
        }
    }
    Ok(())
}

fn attach(dom: &mut Dom, open: &[NodeId], roots: &mut Vec<NodeId>, node: NodeId) -> Result<()> {
    match open.last() {
        Some(parent) => dom.append_child(*parent, node),
        None => {
            roots.push(node);
            Ok(())
        }
    }
}

fn append_text(dom: &mut Dom, open: &[NodeId], roots: &mut Vec<NodeId>, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    let previous = match open.last() {
        Some(parent) => dom.last_child(*parent),
        None => roots.last().copied(),
    };
    if let Some(previous) = previous {
        if let Some(existing) = dom.text(previous) {
            let merged = format!("{existing}{text}");
            return dom.set_text(previous, &merged);
        }
    }
    let node = dom.create_text(text);
    attach(dom, open, roots, node)
}
