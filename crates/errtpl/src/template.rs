//! Message templates.
//!
//! A template is literal text with `{{ ... }}` actions:
//!
//! | Action            | Renders                                        |
//! |-------------------|------------------------------------------------|
//! | `{{.name}}`       | the `name` parameter                           |
//! | `{{ name }}`      | same, leading dot optional, whitespace ignored |
//! | `{{.user.id}}`    | field `id` of the object parameter `user`      |
//! | `{{.}}`           | all parameters as JSON                         |
//! | `{{/* note */}}`  | nothing                                        |
//!
//! Rendering is two-phase: [`compile`] turns the text into a [`Template`]
//! once, [`Template::execute`] fills it in per error. A parameter that is
//! absent (or `null`) renders as an internal marker, which
//! [`Template::render`] rewrites to the caller-visible sentinel.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::codes::MISSING_MARKER;

/// Why a template could not be compiled or executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed action starting at byte {offset}")]
    UnclosedAction { offset: usize },
    #[error("unclosed comment starting at byte {offset}")]
    UnclosedComment { offset: usize },
    #[error("missing value for action at byte {offset}")]
    EmptyAction { offset: usize },
    #[error("empty field name in action at byte {offset}")]
    EmptySegment { offset: usize },
    #[error("bad character {found:?} in action at byte {offset}")]
    BadCharacter { offset: usize, found: char },
    #[error("can't evaluate field {field} in type {kind}")]
    Exec { field: String, kind: &'static str },
}

impl TemplateError {
    /// True for failures detected while compiling.
    pub fn is_parse(&self) -> bool {
        !matches!(self, TemplateError::Exec { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    /// Dotted field path; empty means the whole parameter map.
    Field(Vec<String>),
}

/// A compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

/// Compile template text.
pub fn compile(source: &str) -> Result<Template, TemplateError> {
    let mut nodes = Vec::new();
    let mut pos = 0;

    while let Some(found) = source[pos..].find("{{") {
        let start = pos + found;
        if start > pos {
            nodes.push(Node::Text(source[pos..start].to_string()));
        }

        let body = start + 2;
        let lead = leading_ws(&source[body..]);
        if source[body + lead..].starts_with("/*") {
            pos = skip_comment(source, start, body + lead + 2)?;
            continue;
        }

        let end = source[body..]
            .find("}}")
            .map(|i| body + i)
            .ok_or(TemplateError::UnclosedAction { offset: start })?;
        nodes.push(Node::Field(parse_path(source, body, end, start)?));
        pos = end + 2;
    }

    if pos < source.len() {
        nodes.push(Node::Text(source[pos..].to_string()));
    }
    Ok(Template { nodes })
}

fn leading_ws(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

/// Returns the byte just past the comment's closing `}}`.
fn skip_comment(source: &str, start: usize, after_open: usize) -> Result<usize, TemplateError> {
    let unclosed = TemplateError::UnclosedComment { offset: start };
    let close = source[after_open..]
        .find("*/")
        .map(|i| after_open + i + 2)
        .ok_or_else(|| unclosed.clone())?;
    let ws = leading_ws(&source[close..]);
    if source[close + ws..].starts_with("}}") {
        Ok(close + ws + 2)
    } else {
        Err(unclosed)
    }
}

fn parse_path(source: &str, body: usize, end: usize, start: usize) -> Result<Vec<String>, TemplateError> {
    let raw = &source[body..end];
    let inner = raw.trim();
    if inner.is_empty() {
        return Err(TemplateError::EmptyAction { offset: start });
    }
    let base = body + leading_ws(raw);
    let (path, base) = match inner.strip_prefix('.') {
        Some("") => return Ok(Vec::new()),
        Some(rest) => (rest, base + 1),
        None => (inner, base),
    };

    let mut segments = Vec::new();
    let mut seg_start = base;
    for segment in path.split('.') {
        if segment.is_empty() {
            return Err(TemplateError::EmptySegment { offset: seg_start });
        }
        if let Some((i, c)) = segment
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        {
            return Err(TemplateError::BadCharacter { offset: seg_start + i, found: c });
        }
        segments.push(segment.to_string());
        seg_start += segment.len() + 1;
    }
    Ok(segments)
}

impl Template {
    /// Fill in the template. Missing values come out as the internal marker.
    pub fn execute(&self, params: &Map<String, Value>) -> Result<String, TemplateError> {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Field(path) if path.is_empty() => {
                    out.push_str(&Value::Object(params.clone()).to_string());
                }
                Node::Field(path) => match lookup(params, path)? {
                    Some(value) => push_value(&mut out, value),
                    None => out.push_str(MISSING_MARKER),
                },
            }
        }
        Ok(out)
    }

    /// Execute and replace missing-value markers with `sentinel`.
    pub fn render(&self, params: &Map<String, Value>, sentinel: &str) -> Result<String, TemplateError> {
        Ok(self.execute(params)?.replace(MISSING_MARKER, sentinel))
    }
}

/// Compile and render in one step.
pub fn render(source: &str, params: &Map<String, Value>, sentinel: &str) -> Result<String, TemplateError> {
    compile(source)?.render(params, sentinel)
}

fn lookup<'a>(params: &'a Map<String, Value>, path: &[String]) -> Result<Option<&'a Value>, TemplateError> {
    let mut current = match params.get(&path[0]) {
        Some(value) => value,
        None => return Ok(None),
    };
    for field in &path[1..] {
        current = match current {
            Value::Object(map) => match map.get(field) {
                Some(value) => value,
                None => return Ok(None),
            },
            Value::Null => return Ok(None),
            other => {
                return Err(TemplateError::Exec {
                    field: field.clone(),
                    kind: kind_of(other),
                })
            }
        };
    }
    Ok(Some(current))
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str(MISSING_MARKER),
        Value::String(s) => out.push_str(s),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Array(_) | Value::Object(_) => out.push_str(&value.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
