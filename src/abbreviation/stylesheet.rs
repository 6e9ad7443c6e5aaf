//! Stylesheet abbreviation grammar and renderer.
//!
//! `m10-auto`, `bd1-s#f`, `d:f`, `p10p!` and `+`-joined lists of them,
//! plus a handful of at-rule shortcuts (`@m`, `@i`, `@kf`, `@f`).

use serde::Serialize;

use crate::config::OutputOptions;
use crate::context::{ActivationConfig, StylesheetScope};
use crate::error::AbbreviationError;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StylesheetAbbreviation {
    pub items: Vec<CssItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CssItem {
    /// Property shorthand, or `@name` for at-rules
    pub name: String,
    /// `name:keyword` form
    pub keyword: Option<String>,
    pub values: Vec<CssValue>,
    pub important: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CssValue {
    Number { value: f64, unit: String },
    Color(String),
    Keyword(String),
}

pub fn parse(text: &str) -> Result<StylesheetAbbreviation, AbbreviationError> {
    let mut parser = Parser::new(text);
    let mut items = Vec::new();
    loop {
        items.push(parser.item()?);
        match parser.peek() {
            None => break,
            Some('+') => parser.pos += 1,
            Some(ch) => return Err(AbbreviationError::unexpected(ch, parser.offset())),
        }
    }
    Ok(StylesheetAbbreviation { items })
}

struct Parser {
    chars: Vec<char>,
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

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    fn offset(&self) -> usize {
        self.offsets[self.pos.min(self.chars.len())]
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn item(&mut self) -> Result<CssItem, AbbreviationError> {
        let mut item = CssItem::default();

        if self.peek() == Some('@') {
            self.pos += 1;
            item.name = format!("@{}", self.take_while(|c| c.is_ascii_alphabetic() || c == '-'));
        } else {
            item.name = self.name();
        }

        if self.peek() == Some(':') {
            self.pos += 1;
            let keyword = self.take_while(|c| c.is_ascii_alphanumeric() || c == '-');
            item.keyword = Some(keyword);
        }

        // `-` after a name starts a keyword, elsewhere it separates values
        let mut after_separator = true;
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) => {
                    item.values.push(self.number(false));
                    after_separator = false;
                }
                Some('-') if after_separator && self.peek_at(1).is_some_and(|n| n.is_ascii_digit() || n == '.') => {
                    self.pos += 1;
                    item.values.push(self.number(true));
                    after_separator = false;
                }
                Some('-') => {
                    self.pos += 1;
                    after_separator = true;
                }
                Some('#') => {
                    self.pos += 1;
                    let hex = self.take_while(|c| c.is_ascii_hexdigit());
                    item.values.push(CssValue::Color(hex));
                    after_separator = false;
                }
                Some(c) if c.is_ascii_alphabetic() && !item.name.is_empty() => {
                    let keyword = self.take_while(|c| c.is_ascii_alphanumeric());
                    item.values.push(CssValue::Keyword(keyword));
                    after_separator = false;
                }
                Some('!') => {
                    self.pos += 1;
                    item.important = true;
                    break;
                }
                _ => break,
            }
        }

        match self.peek() {
            None | Some('+') => Ok(item),
            Some(ch) => Err(AbbreviationError::unexpected(ch, self.offset())),
        }
    }

    /// Letters, with inner dashes kept only when a letter follows
    fn name(&mut self) -> String {
        let mut name = String::new();
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_alphabetic() => {
                    name.push(c);
                    self.pos += 1;
                }
                Some('-') if !name.is_empty() && self.peek_at(1).is_some_and(|n| n.is_ascii_alphabetic()) && self.dashed_name_follows() => {
                    name.push('-');
                    self.pos += 1;
                }
                _ => return name,
            }
        }
    }

    /// Whether the dash at the cursor joins the name instead of a keyword
    /// value: `bd-s` is border + solid, `max-width` stays whole.
    fn dashed_name_follows(&self) -> bool {
        let rest: String = self.chars[self.pos + 1..]
            .iter()
            .take_while(|c| c.is_ascii_alphabetic() || **c == '-')
            .collect();
        rest.contains('-') || rest.len() > 3
    }

    fn number(&mut self, negative: bool) -> CssValue {
        let digits = self.take_while(|c| c.is_ascii_digit() || c == '.');
        let unit = self.take_while(|c| c.is_ascii_alphabetic() || c == '%');
        let value: f64 = digits.parse().unwrap_or(0.0);
        CssValue::Number {
            value: if negative { -value } else { value },
            unit,
        }
    }
}

/// Shorthand, property, per-property keyword aliases
const PROPERTIES: &[(&str, &str, &[(&str, &str)])] = &[
    ("p", "padding", &[]),
    ("pt", "padding-top", &[]),
    ("pr", "padding-right", &[]),
    ("pb", "padding-bottom", &[]),
    ("pl", "padding-left", &[]),
    ("m", "margin", &[("a", "auto")]),
    ("mt", "margin-top", &[("a", "auto")]),
    ("mr", "margin-right", &[("a", "auto")]),
    ("mb", "margin-bottom", &[("a", "auto")]),
    ("ml", "margin-left", &[("a", "auto")]),
    ("w", "width", &[("a", "auto")]),
    ("h", "height", &[("a", "auto")]),
    ("maw", "max-width", &[("n", "none")]),
    ("mah", "max-height", &[("n", "none")]),
    ("miw", "min-width", &[]),
    ("mih", "min-height", &[]),
    ("d", "display", &[("n", "none"), ("b", "block"), ("i", "inline"), ("ib", "inline-block"), ("f", "flex"), ("if", "inline-flex"), ("g", "grid")]),
    ("pos", "position", &[("a", "absolute"), ("r", "relative"), ("f", "fixed"), ("s", "static"), ("st", "sticky")]),
    ("t", "top", &[("a", "auto")]),
    ("r", "right", &[("a", "auto")]),
    ("b", "bottom", &[("a", "auto")]),
    ("l", "left", &[("a", "auto")]),
    ("z", "z-index", &[("a", "auto")]),
    ("fz", "font-size", &[]),
    ("fw", "font-weight", &[("b", "bold"), ("n", "normal"), ("br", "bolder"), ("lr", "lighter")]),
    ("ff", "font-family", &[("s", "serif"), ("ss", "sans-serif"), ("m", "monospace")]),
    ("lh", "line-height", &[]),
    ("ta", "text-align", &[("l", "left"), ("c", "center"), ("r", "right"), ("j", "justify")]),
    ("td", "text-decoration", &[("n", "none"), ("u", "underline"), ("l", "line-through")]),
    ("c", "color", &[]),
    ("bg", "background", &[("n", "none")]),
    ("bgc", "background-color", &[("t", "transparent")]),
    ("bd", "border", &[("n", "none"), ("s", "solid"), ("d", "dashed"), ("dt", "dotted")]),
    ("bdt", "border-top", &[("n", "none"), ("s", "solid")]),
    ("bdr", "border-right", &[("n", "none"), ("s", "solid")]),
    ("bdb", "border-bottom", &[("n", "none"), ("s", "solid")]),
    ("bdl", "border-left", &[("n", "none"), ("s", "solid")]),
    ("bdrs", "border-radius", &[]),
    ("op", "opacity", &[]),
    ("ov", "overflow", &[("h", "hidden"), ("v", "visible"), ("s", "scroll"), ("a", "auto")]),
    ("cur", "cursor", &[("p", "pointer"), ("d", "default"), ("t", "text")]),
    ("fl", "float", &[("l", "left"), ("r", "right"), ("n", "none")]),
    ("cl", "clear", &[("b", "both"), ("l", "left"), ("r", "right"), ("n", "none")]),
    ("v", "visibility", &[("h", "hidden"), ("v", "visible")]),
    ("gap", "gap", &[]),
    ("jc", "justify-content", &[("c", "center"), ("sb", "space-between"), ("sa", "space-around"), ("fs", "flex-start"), ("fe", "flex-end")]),
    ("ai", "align-items", &[("c", "center"), ("s", "stretch"), ("fs", "flex-start"), ("fe", "flex-end"), ("b", "baseline")]),
    ("fxd", "flex-direction", &[("r", "row"), ("c", "column"), ("rr", "row-reverse"), ("cr", "column-reverse")]),
    ("trf", "transform", &[("n", "none")]),
    ("trs", "transition", &[("n", "none")]),
    ("bxsh", "box-shadow", &[("n", "none")]),
    ("bxz", "box-sizing", &[("bb", "border-box"), ("cb", "content-box")]),
];

const UNITLESS: &[&str] = &["z-index", "opacity", "font-weight", "flex-grow", "flex-shrink", "order", "line-height"];

fn lookup(name: &str) -> Option<(&'static str, &'static [(&'static str, &'static str)])> {
    PROPERTIES
        .iter()
        .find(|(short, long, _)| *short == name || *long == name)
        .map(|(_, long, keywords)| (*long, *keywords))
}

fn resolve_keyword(keywords: &[(&str, &str)], keyword: &str) -> String {
    keywords
        .iter()
        .find(|(short, _)| *short == keyword)
        .map_or_else(|| keyword.to_string(), |(_, long)| long.to_string())
}

fn format_number(property: &str, value: f64, unit: &str) -> String {
    let number = if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let text = format!("{value}");
        text.strip_prefix("0.").map_or_else(
            || text.replacen("-0.", "-.", 1),
            |rest| format!(".{rest}"),
        )
    };
    if value == 0.0 && unit.is_empty() {
        return "0".to_string();
    }
    let unit = match unit {
        "p" => "%",
        "e" => "em",
        "x" => "ex",
        "r" => "rem",
        "" if UNITLESS.contains(&property) => "",
        "" if value.fract() != 0.0 => "em",
        "" => "px",
        other => other,
    };
    format!("{number}{unit}")
}

fn format_color(hex: &str) -> String {
    let hex = hex.to_ascii_lowercase();
    match hex.len() {
        1 | 2 => format!("#{}", hex.repeat(3)),
        _ => format!("#{hex}"),
    }
}

fn format_values(property: &str, keywords: &[(&str, &str)], values: &[CssValue]) -> String {
    values
        .iter()
        .map(|value| match value {
            CssValue::Number { value, unit } => format_number(property, *value, unit),
            CssValue::Color(hex) => format_color(hex),
            CssValue::Keyword(keyword) => resolve_keyword(keywords, keyword),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_at_rule(name: &str, options: &OutputOptions) -> String {
    let nl = &options.newline;
    let indent = &options.indent;
    match name {
        "@m" | "@media" => format!("@media screen {{{nl}{indent}{nl}}}"),
        "@i" | "@import" => "@import url();".to_string(),
        "@kf" | "@keyframes" => format!("@keyframes identifier {{{nl}{indent}{nl}}}"),
        "@f" | "@font-face" => format!("@font-face {{{nl}{indent}font-family: ;{nl}{indent}src: url();{nl}}}"),
        other => format!("{other} {{{nl}{indent}{nl}}}"),
    }
}

fn render_value(item: &CssItem, property: &str, keywords: &[(&str, &str)]) -> String {
    let mut value = match &item.keyword {
        Some(keyword) => resolve_keyword(keywords, keyword),
        None => format_values(property, keywords, &item.values),
    };
    if item.keyword.is_some() && !item.values.is_empty() {
        value.push(' ');
        value.push_str(&format_values(property, keywords, &item.values));
    }
    if item.important {
        value.push_str(" !important");
    }
    value
}

fn render_item(item: &CssItem, scope: Option<&StylesheetScope>, options: &OutputOptions) -> String {
    if item.name.starts_with('@') {
        return render_at_rule(&item.name, options);
    }

    if let Some(StylesheetScope::Property(property)) = scope {
        // value context: the whole abbreviation is a value of `property`
        let keywords = lookup(property).map(|(_, k)| k).unwrap_or_default();
        let mut value = resolve_keyword(keywords, &item.name);
        let rest = render_value(&CssItem { name: String::new(), ..item.clone() }, property, keywords);
        if !rest.is_empty() {
            if !value.is_empty() && !rest.starts_with(' ') {
                value.push(' ');
            }
            value.push_str(&rest);
        }
        return value;
    }

    let (property, keywords): (&str, &[(&str, &str)]) = match lookup(&item.name) {
        Some(found) => found,
        None => (item.name.as_str(), &[]),
    };
    let value = render_value(item, property, keywords);
    format!(
        "{}{}{}{}",
        property, options.property_separator, value, options.property_terminator
    )
}

pub fn render(abbreviation: &StylesheetAbbreviation, config: &ActivationConfig, options: &OutputOptions) -> String {
    let scope = config.stylesheet_scope();
    let separator = if config.inline { " " } else { options.newline.as_str() };
    abbreviation
        .items
        .iter()
        .map(|item| render_item(item, scope, options))
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AbbreviationContext, AbbreviationKind};
    use rstest::rstest;

    fn expand_in(text: &str, scope: StylesheetScope) -> String {
        let abbreviation = parse(text).expect("valid abbreviation");
        let config = ActivationConfig {
            context: Some(AbbreviationContext::Stylesheet(scope)),
            ..ActivationConfig::new(AbbreviationKind::Stylesheet, "css")
        };
        render(&abbreviation, &config, &OutputOptions::default())
    }

    fn expand(text: &str) -> String {
        expand_in(text, StylesheetScope::Global)
    }

    #[rstest]
    #[case::plain_number("m10", "margin: 10px;")]
    #[case::zero("p0", "padding: 0;")]
    #[case::several_values("m10-20", "margin: 10px 20px;")]
    #[case::keyword_value("m10-a", "margin: 10px auto;")]
    #[case::negative("m-10", "margin: -10px;")]
    #[case::negative_after_separator("m10--5", "margin: 10px -5px;")]
    #[case::percent_alias("w50p", "width: 50%;")]
    #[case::em_alias("fz1.5", "font-size: 1.5em;")]
    #[case::explicit_unit("lh2e", "line-height: 2em;")]
    #[case::unitless("z10", "z-index: 10;")]
    #[case::colon_keyword("d:f", "display: flex;")]
    #[case::short_color("c#f", "color: #fff;")]
    #[case::two_digit_color("c#e0", "color: #e0e0e0;")]
    #[case::color_lowercase("c#ABCDEF", "color: #abcdef;")]
    #[case::border("bd1-s#0", "border: 1px solid #000;")]
    #[case::important("p10!", "padding: 10px !important;")]
    #[case::full_name("padding10", "padding: 10px;")]
    #[case::unknown("foo", "foo: ;")]
    fn expands(#[case] abbreviation: &str, #[case] expected: &str) {
        assert_eq!(expand(abbreviation), expected);
    }

    #[test]
    fn plus_joins_properties() {
        assert_eq!(expand("m0+p0"), "margin: 0;\npadding: 0;");
    }

    #[test]
    fn inline_joins_with_space() {
        let abbreviation = parse("m0+p0").expect("valid");
        let config = ActivationConfig {
            inline: true,
            context: Some(AbbreviationContext::Stylesheet(StylesheetScope::Global)),
            ..ActivationConfig::new(AbbreviationKind::Stylesheet, "css")
        };
        assert_eq!(
            render(&abbreviation, &config, &OutputOptions::default()),
            "margin: 0; padding: 0;"
        );
    }

    #[test]
    fn property_scope_renders_value_only() {
        let scope = || StylesheetScope::Property("display".to_string());
        assert_eq!(expand_in("ib", scope()), "inline-block");
        assert_eq!(expand_in("flex", scope()), "flex");
    }

    #[test]
    fn at_rules() {
        insta::assert_snapshot!(expand_in("@i", StylesheetScope::Section), @"@import url();");
        assert_eq!(expand_in("@m", StylesheetScope::Section), "@media screen {\n\t\n}");
    }

    #[test]
    fn output_options_shape_declarations() {
        let abbreviation = parse("m1").expect("valid");
        let config = ActivationConfig::new(AbbreviationKind::Stylesheet, "scss");
        let options = OutputOptions {
            property_separator: ":".to_string(),
            property_terminator: String::new(),
            ..OutputOptions::default()
        };
        assert_eq!(render(&abbreviation, &config, &options), "margin:1px");
    }

    #[rstest]
    #[case::stray_char("m10$", "Unexpected character \"$\"", 3)]
    #[case::stray_plus_item("m10+%", "Unexpected character \"%\"", 4)]
    fn parse_errors(#[case] text: &str, #[case] message: &str, #[case] position: usize) {
        assert_eq!(parse(text), Err(AbbreviationError::new(message, position)));
    }
}
