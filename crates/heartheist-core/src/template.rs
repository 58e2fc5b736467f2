//! Placeholder templates.
//!
//! Two layers live here:
//!
//! - [`inject`] — plain sequential string replacement. No escaping, no
//!   parsing. Only for values the operator controls.
//! - [`Template`] — parses `{{NAME}}` / `{{NAME|context}}` tokens once and
//!   renders them against a [`Context`], escaping every value for the context
//!   the token sits in. All visitor-supplied text goes through this path.
//!
//! # Escaping contexts
//!
//! | Context | Use | Output |
//! |---------|-----|--------|
//! | `html` (default) | element text | `& < > " '` as entities |
//! | `attr` | quoted attribute value | same as `html` |
//! | `js` | inside `<script>` | JSON literal, `<` `>` `&` U+2028 U+2029 as `\uXXXX` |
//! | `url` | URL component | percent-encoded |
//! | `uri` | whole `src`/`href` | `data:`/`https:`/`http:` only, then attribute-escaped |
//! | `css` | style value (colors) | only `#`, alphanumerics, `.%(), ` kept |
//! | `raw` | trusted markup | verbatim |

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::TemplateError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Schemes a `uri` placeholder may carry.
const ALLOWED_SCHEMES: [&str; 3] = ["data:", "https:", "http:"];

/// Replace every `(token, value)` pair in order, one whole-string pass each.
///
/// A value that contains a later token's text is rewritten by that later
/// pass; tokens with no pair stay in the output literally. Nothing is
/// escaped, so never feed this untrusted values.
pub fn inject<K, V>(template: &str, pairs: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut html = template.to_owned();
    for (token, value) in pairs {
        let token = token.as_ref();
        if token.is_empty() {
            continue;
        }
        html = html.replace(token, value.as_ref());
    }
    html
}

/// How a placeholder's value is escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    Html,
    Attr,
    Js,
    Url,
    Uri,
    Css,
    Raw,
}

impl FromStr for Escape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(Self::Html),
            "attr" => Ok(Self::Attr),
            "js" => Ok(Self::Js),
            "url" => Ok(Self::Url),
            "uri" => Ok(Self::Uri),
            "css" => Ok(Self::Css),
            "raw" => Ok(Self::Raw),
            other => Err(other.to_owned()),
        }
    }
}

/// A value bound to a placeholder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    List(Vec<String>),
    Number(i64),
}

impl Value {
    fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::List(items) => Cow::Owned(items.join(", ")),
            Self::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|s| serde_json::Value::String(s.clone()))
                    .collect(),
            ),
            Self::Number(n) => serde_json::Value::from(*n),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<u8> for Value {
    fn from(n: u8) -> Self {
        Self::Number(i64::from(n))
    }
}

/// Name → value bindings for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any earlier binding.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot { name: String, escape: Escape },
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source` into literal text and placeholders.
    ///
    /// Whitespace inside the braces is ignored: `{{ NAME | attr }}` is the
    /// same as `{{NAME|attr}}`.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::Unterminated`] for a `{{` with no closing `}}`.
    /// - [`TemplateError::InvalidName`] for names outside `[A-Za-z0-9_]+`.
    /// - [`TemplateError::UnknownContext`] for an unrecognised `|context`.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(open) = rest.find(OPEN) {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_owned()));
            }
            let after_open = &rest[open + OPEN.len()..];
            let close = after_open
                .find(CLOSE)
                .ok_or(TemplateError::Unterminated {
                    offset: offset + open,
                })?;
            segments.push(parse_slot(&after_open[..close], offset + open)?);

            let consumed = open + OPEN.len() + close + CLOSE.len();
            rest = &rest[consumed..];
            offset += consumed;
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_owned()));
        }

        Ok(Self { segments })
    }

    /// Placeholder names in order of first appearance, without duplicates.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Slot { name, .. } = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Render with every placeholder escaped for its context.
    ///
    /// Substituted values are never scanned for further placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingValues`] naming every placeholder
    /// that has no binding in `ctx`.
    pub fn render(&self, ctx: &Context) -> Result<String, TemplateError> {
        let missing: Vec<String> = self
            .placeholders()
            .into_iter()
            .filter(|name| ctx.get(name).is_none())
            .map(str::to_owned)
            .collect();
        if !missing.is_empty() {
            return Err(TemplateError::MissingValues { names: missing });
        }

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot { name, escape } => {
                    if let Some(value) = ctx.get(name) {
                        write_escaped(&mut out, value, *escape);
                    }
                }
            }
        }
        Ok(out)
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_slot(inner: &str, offset: usize) -> Result<Segment, TemplateError> {
    let (name, context) = match inner.split_once('|') {
        Some((name, context)) => (name.trim(), Some(context.trim())),
        None => (inner.trim(), None),
    };

    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(TemplateError::InvalidName {
            name: name.to_owned(),
            offset,
        });
    }

    let escape = match context {
        None => Escape::Html,
        Some(context) => context
            .parse()
            .map_err(|context| TemplateError::UnknownContext {
                name: name.to_owned(),
                context,
            })?,
    };

    Ok(Segment::Slot {
        name: name.to_owned(),
        escape,
    })
}

fn write_escaped(out: &mut String, value: &Value, escape: Escape) {
    match escape {
        Escape::Html | Escape::Attr => escape_html_into(out, &value.as_text()),
        Escape::Js => escape_js_into(out, &value.to_json().to_string()),
        Escape::Url => out.push_str(&urlencoding::encode(&value.as_text())),
        Escape::Uri => escape_html_into(out, &sanitize_uri(&value.as_text())),
        Escape::Css => out.extend(value.as_text().chars().filter(|&c| {
            c.is_ascii_alphanumeric() || matches!(c, '#' | '.' | '%' | '(' | ')' | ',' | ' ')
        })),
        Escape::Raw => out.push_str(&value.as_text()),
    }
}

/// Escape text for HTML element content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_html_into(&mut out, s);
    out
}

fn escape_html_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
}

fn escape_js_into(out: &mut String, json: &str) {
    for c in json.chars() {
        match c {
            '<' | '>' | '&' | '\u{2028}' | '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            other => out.push(other),
        }
    }
}

fn sanitize_uri(uri: &str) -> Cow<'_, str> {
    let trimmed = uri.trim();
    let lower = trimmed.to_ascii_lowercase();
    if ALLOWED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Borrowed("about:blank")
    }
}
