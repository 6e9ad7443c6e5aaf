//! Markup abbreviation grammar and renderer.
//!
//! Supported syntax: element names, `#id`, `.class`, `[attr=value]`,
//! `{text}`, `*N` repeats, `( )` groups and the `>`, `+`, `^` operators.
//! `$` in names, attribute values and text is replaced by the repeat number.

use serde::Serialize;

use crate::config::{OutputOptions, SelfClosingStyle};
use crate::context::{AbbreviationContext, ActivationConfig};
use crate::error::AbbreviationError;
use crate::language;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MarkupAbbreviation {
    pub children: Vec<MarkupNode>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MarkupNode {
    /// Absent for implicit elements, text nodes and groups
    pub name: Option<String>,
    pub attributes: Vec<MarkupAttribute>,
    pub value: Option<String>,
    pub repeat: Option<usize>,
    pub children: Vec<MarkupNode>,
    /// `( )` group: children are rendered in place of the node
    pub group: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MarkupAttribute {
    pub name: String,
    pub value: Option<String>,
}

impl MarkupNode {
    fn set_attribute(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = Some(value),
            None => self.attributes.push(MarkupAttribute {
                name: name.to_string(),
                value: Some(value),
            }),
        }
    }

    fn add_class(&mut self, class: String) {
        match self.attributes.iter_mut().find(|a| a.name == "class") {
            Some(MarkupAttribute {
                value: Some(value), ..
            }) if !value.is_empty() => {
                value.push(' ');
                value.push_str(&class);
            }
            _ => self.set_attribute("class", class),
        }
    }
}

/// Upper bound on elements produced by one expansion, repeats included
pub const MAX_ELEMENTS: usize = 1000;

pub fn parse(text: &str) -> Result<MarkupAbbreviation, AbbreviationError> {
    let mut parser = Parser::new(text);
    let children = parser.sequence(false)?;
    if let Some(ch) = parser.peek() {
        return Err(AbbreviationError::unexpected(ch, parser.offset()));
    }
    if expanded_count(&children) > MAX_ELEMENTS {
        return Err(AbbreviationError::new(
            format!("Expansion exceeds {MAX_ELEMENTS} elements"),
            parser.end_offset(),
        ));
    }
    Ok(MarkupAbbreviation { children })
}

/// Number of elements rendering `nodes` would produce; groups only count
/// their children.
fn expanded_count(nodes: &[MarkupNode]) -> usize {
    nodes.iter().fold(0, |total, node| {
        let own = usize::from(!node.group).saturating_add(expanded_count(&node.children));
        total.saturating_add(own.saturating_mul(node.repeat.unwrap_or(1)))
    })
}

struct Parser {
    chars: Vec<char>,
    /// UTF-16 offset of every char, plus the end
    offsets: Vec<usize>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut offsets = Vec::with_capacity(chars.len() + 1);
        let mut unit = 0;
        for ch in &chars {
            offsets.push(unit);
            unit += ch.len_utf16();
        }
        offsets.push(unit);
        Self {
            chars,
            offsets,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn offset(&self) -> usize {
        self.offsets[self.pos.min(self.chars.len())]
    }

    fn end_offset(&self) -> usize {
        self.offsets[self.chars.len()]
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> AbbreviationError {
        match self.peek() {
            Some(ch) => AbbreviationError::unexpected(ch, self.offset()),
            None => AbbreviationError::new("Unexpected end of abbreviation", self.offset()),
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Sibling and child chain up to the end of input or a closing `)`.
    fn sequence(&mut self, in_group: bool) -> Result<Vec<MarkupNode>, AbbreviationError> {
        let mut levels: Vec<Vec<MarkupNode>> = vec![Vec::new()];
        let mut expect_item = true;

        while let Some(ch) = self.peek() {
            match ch {
                ')' if in_group => break,
                '>' | '+' if !expect_item => {
                    self.pos += 1;
                    if ch == '>' {
                        levels.push(Vec::new());
                    }
                    expect_item = true;
                }
                '^' if levels.len() > 1 || !expect_item => {
                    self.pos += 1;
                    if levels.len() > 1 {
                        close_level(&mut levels);
                    }
                    expect_item = true;
                }
                _ if expect_item => {
                    let node = self.item()?;
                    if let Some(level) = levels.last_mut() {
                        level.push(node);
                    }
                    expect_item = false;
                }
                _ => return Err(self.unexpected()),
            }
        }

        while levels.len() > 1 {
            close_level(&mut levels);
        }
        Ok(levels.pop().unwrap_or_default())
    }

    fn item(&mut self) -> Result<MarkupNode, AbbreviationError> {
        if self.eat('(') {
            let children = self.sequence(true)?;
            if !self.eat(')') {
                return Err(AbbreviationError::new("Unclosed group", self.end_offset()));
            }
            let repeat = self.repeat()?;
            return Ok(MarkupNode {
                children,
                repeat,
                group: true,
                ..MarkupNode::default()
            });
        }
        self.element()
    }

    fn element(&mut self) -> Result<MarkupNode, AbbreviationError> {
        let start = self.pos;
        let mut node = MarkupNode::default();

        if self.peek().is_some_and(|c| c.is_ascii_alphabetic() || c == '!') {
            node.name = Some(self.take_while(is_name_char));
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    let id = self.take_while(is_value_char);
                    if !id.is_empty() {
                        node.set_attribute("id", id);
                    } else if self.peek().is_some() {
                        return Err(self.unexpected());
                    }
                }
                Some('.') => {
                    self.pos += 1;
                    let class = self.take_while(is_value_char);
                    if !class.is_empty() {
                        node.add_class(class);
                    } else if self.peek().is_some() {
                        return Err(self.unexpected());
                    }
                }
                Some('[') => {
                    self.pos += 1;
                    self.attributes(&mut node)?;
                }
                Some('{') => node.value = Some(self.text()?),
                Some('*') => node.repeat = self.repeat()?,
                _ => break,
            }
        }

        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(node)
    }

    fn attributes(&mut self, node: &mut MarkupNode) -> Result<(), AbbreviationError> {
        loop {
            self.take_while(char::is_whitespace);
            match self.peek() {
                None => {
                    return Err(AbbreviationError::new(
                        "Unclosed attribute set",
                        self.end_offset(),
                    ));
                }
                Some(']') => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => {}
            }

            let name = self.take_while(is_attribute_name_char);
            if name.is_empty() {
                return Err(self.unexpected());
            }

            let value = if self.eat('=') {
                Some(match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.pos += 1;
                        let value = self.take_while(|c| c != quote);
                        if !self.eat(quote) {
                            return Err(AbbreviationError::new("Unclosed quote", self.end_offset()));
                        }
                        value
                    }
                    Some('{') => {
                        let start = self.pos;
                        self.text()?;
                        self.chars[start..self.pos].iter().collect()
                    }
                    _ => self.take_while(|c| !c.is_whitespace() && c != ']'),
                })
            } else {
                None
            };

            match node.attributes.iter_mut().find(|a| a.name == name) {
                Some(attr) => attr.value = value,
                None => node.attributes.push(MarkupAttribute { name, value }),
            }
        }
    }

    /// `{...}` with nested braces; returns the content without the outer braces
    fn text(&mut self) -> Result<String, AbbreviationError> {
        self.pos += 1;
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(ch) = self.peek() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let text = self.chars[start..self.pos].iter().collect();
                        self.pos += 1;
                        return Ok(text);
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(AbbreviationError::new("Unclosed text", self.end_offset()))
    }

    fn repeat(&mut self) -> Result<Option<usize>, AbbreviationError> {
        if !self.eat('*') {
            return Ok(None);
        }
        let start = self.offset();
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            // still being typed
            if self.peek().is_none() {
                return Ok(None);
            }
            return Err(AbbreviationError::new("Expected repeat count", self.offset()));
        }
        match digits.parse::<usize>() {
            Ok(0) => Err(AbbreviationError::new("Expected repeat count", self.offset())),
            Ok(count) if count <= MAX_ELEMENTS => Ok(Some(count)),
            _ => Err(AbbreviationError::new(
                format!("Repeat count exceeds {MAX_ELEMENTS}"),
                start,
            )),
        }
    }
}

fn close_level(levels: &mut Vec<Vec<MarkupNode>>) {
    let Some(children) = levels.pop() else {
        return;
    };
    if let Some(parent) = levels.last_mut().and_then(|level| level.last_mut()) {
        parent.children.extend(children);
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | ':' | '_' | '!' | '$' | '@')
}

fn is_value_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '.' | '#' | '[' | ']' | '{' | '}' | '*' | '>' | '+' | '^' | '(' | ')')
}

fn is_attribute_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '@' | '.' | '$')
}

/// Attributes added to elements that are useless without them
const DEFAULT_ATTRIBUTES: &[(&str, &[(&str, &str)])] = &[
    ("a", &[("href", "")]),
    ("img", &[("src", ""), ("alt", "")]),
    ("input", &[("type", "text")]),
    ("link", &[("rel", "stylesheet"), ("href", "")]),
    ("form", &[("action", "")]),
    ("label", &[("for", "")]),
    ("abbr", &[("title", "")]),
    ("iframe", &[("src", "")]),
];

fn implicit_name(parent: Option<&str>) -> &'static str {
    match parent.map(str::to_ascii_lowercase).as_deref() {
        Some("ul" | "ol") => "li",
        Some("table" | "tbody" | "thead" | "tfoot") => "tr",
        Some("tr") => "td",
        Some("select" | "optgroup") => "option",
        _ => "div",
    }
}

/// Replace each run of `$` with `number`, zero-padded to the run length.
fn numbered(text: &str, number: Option<usize>) -> String {
    let Some(number) = number else {
        return text.to_string();
    };
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        let mut width = 1;
        while chars.next_if_eq(&'$').is_some() {
            width += 1;
        }
        out.push_str(&format!("{:0width$}", number, width = width));
    }
    out
}

struct Renderer<'a> {
    options: &'a OutputOptions,
    empty_elements: &'a [String],
    jsx: bool,
    lines: Vec<String>,
}

impl Renderer<'_> {
    fn nodes(&mut self, nodes: &[MarkupNode], parent: Option<&str>, depth: usize, number: Option<usize>) {
        for node in nodes {
            let count = node.repeat.unwrap_or(1);
            for i in 0..count {
                let number = if node.repeat.is_some() { Some(i + 1) } else { number };
                if node.group {
                    self.nodes(&node.children, parent, depth, number);
                } else {
                    self.element(node, parent, depth, number);
                }
            }
        }
    }

    fn element(&mut self, node: &MarkupNode, parent: Option<&str>, depth: usize, number: Option<usize>) {
        let indent = self.options.indent.repeat(depth);
        let text = node.value.as_deref().map(|v| numbered(v, number)).unwrap_or_default();

        // bare `{text}`
        if node.name.is_none() && node.attributes.is_empty() && node.children.is_empty() && node.value.is_some() {
            self.lines.push(format!("{indent}{text}"));
            return;
        }

        let name = match &node.name {
            Some(name) => numbered(name, number),
            None => implicit_name(parent).to_string(),
        };
        let open = format!("<{}{}", name, self.attributes(&name, node, number));

        let is_void = self.empty_elements.iter().any(|e| e.eq_ignore_ascii_case(&name));
        if is_void && node.children.is_empty() && node.value.is_none() {
            let close = match self.options.self_closing {
                SelfClosingStyle::Html if !self.jsx => ">",
                SelfClosingStyle::Xhtml | SelfClosingStyle::Html => " />",
                SelfClosingStyle::Xml => "/>",
            };
            self.lines.push(format!("{indent}{open}{close}"));
            return;
        }

        if node.children.is_empty() {
            self.lines.push(format!("{indent}{open}>{text}</{name}>"));
        } else {
            self.lines.push(format!("{indent}{open}>{text}"));
            self.nodes(&node.children, Some(name.as_str()), depth + 1, number);
            self.lines.push(format!("{indent}</{name}>"));
        }
    }

    fn attributes(&self, name: &str, node: &MarkupNode, number: Option<usize>) -> String {
        let mut attrs: Vec<(String, String)> = DEFAULT_ATTRIBUTES
            .iter()
            .find(|(element, _)| element.eq_ignore_ascii_case(name))
            .map(|(_, defaults)| {
                defaults
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        for attr in &node.attributes {
            let value = attr.value.as_deref().map(|v| numbered(v, number)).unwrap_or_default();
            match attrs.iter_mut().find(|(k, _)| *k == attr.name) {
                Some(existing) => existing.1 = value,
                None => attrs.push((attr.name.clone(), value)),
            }
        }

        attrs
            .into_iter()
            .map(|(name, value)| {
                let name = if self.jsx && name == "class" {
                    "className".to_string()
                } else {
                    name
                };
                if value.starts_with('{') && value.ends_with('}') {
                    format!(" {name}={value}")
                } else {
                    format!(" {name}=\"{value}\"")
                }
            })
            .collect()
    }
}

pub fn render(
    abbreviation: &MarkupAbbreviation,
    config: &ActivationConfig,
    options: &OutputOptions,
    empty_elements: &[String],
) -> String {
    let parent = match &config.context {
        Some(AbbreviationContext::Markup { parent }) => parent.as_deref(),
        _ => None,
    };
    let mut renderer = Renderer {
        options,
        empty_elements: if language::is_xml(&config.syntax) {
            &[][..]
        } else {
            empty_elements
        },
        jsx: options.jsx || language::is_jsx(&config.syntax),
        lines: Vec::new(),
    };
    renderer.nodes(&abbreviation.children, parent, 0, None);
    renderer.lines.join(&options.newline)
}
