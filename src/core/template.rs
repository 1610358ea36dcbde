//! Message templates with named placeholders
//!
//! A template like `"Task {Id} failed after {Count} retries"` is parsed once
//! per write and carried on the event record alongside the raw argument
//! values, so providers can render text or emit structured fields without
//! re-parsing.

use super::field_value::FieldValue;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named argument slot: the event's ordered argument list pairs each value
/// with the placeholder name it bound to, or `None` for surplus positional
/// arguments.
pub type NamedArg = (Option<String>, FieldValue);

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Hole { name: String, format: Option<String> },
}

/// Parsed message template.
///
/// Parsing never fails: malformed placeholder syntax (an unterminated `{`,
/// empty braces, names with invalid characters) is kept as literal text, and
/// `{{`/`}}` are brace escapes. Substitution is positional by placeholder
/// order; placeholder names are metadata for structured sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageTemplate {
    text: String,
    segments: Vec<Segment>,
}

fn is_valid_hole_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

impl MessageTemplate {
    pub fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        body.push(inner);
                    }

                    let (name, format) = match body.split_once(':') {
                        Some((n, f)) => (n, Some(f.to_string())),
                        None => (body.as_str(), None),
                    };

                    if closed && is_valid_hole_name(name) {
                        if !literal.is_empty() {
                            segments.push(Segment::Literal(std::mem::take(&mut literal)));
                        }
                        segments.push(Segment::Hole {
                            name: name.to_string(),
                            format,
                        });
                    } else {
                        literal.push('{');
                        literal.push_str(&body);
                        if closed {
                            literal.push('}');
                        }
                    }
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            text: text.to_string(),
            segments,
        }
    }

    /// The original template text, unmodified.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Hole { .. }))
            .count()
    }

    /// Placeholder names in template order.
    pub fn placeholder_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Hole { name, .. } => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Pair raw argument values with placeholder names, positionally.
    ///
    /// Surplus values beyond the placeholder count are kept with a `None`
    /// name; missing values simply leave trailing placeholders unbound.
    pub fn bind(&self, values: Vec<FieldValue>) -> Vec<NamedArg> {
        let names = self.placeholder_names();
        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| (names.get(i).map(|n| (*n).to_string()), value))
            .collect()
    }

    /// Render the template against an ordered argument list.
    ///
    /// Placeholders without a matching argument render literally, preserving
    /// their braces and format suffix.
    pub fn render(&self, args: &[NamedArg]) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut hole_index = 0;

        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Hole { name, format } => {
                    match args.get(hole_index) {
                        Some((_, value)) => out.push_str(&render_value(value, format.as_deref())),
                        None => {
                            out.push('{');
                            out.push_str(name);
                            if let Some(f) = format {
                                out.push(':');
                                out.push_str(f);
                            }
                            out.push('}');
                        }
                    }
                    hole_index += 1;
                }
            }
        }

        out
    }
}

/// Default value rendering. The `X`/`x` suffixes request hexadecimal for
/// integer arguments; any other suffix falls back to the plain display form,
/// leaving richer interpretations to individual providers.
fn render_value(value: &FieldValue, format: Option<&str>) -> String {
    match (format, value) {
        (Some("X"), FieldValue::Int(i)) => format!("{:X}", i),
        (Some("x"), FieldValue::Int(i)) => format!("{:x}", i),
        _ => value.to_string(),
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl Serialize for MessageTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for MessageTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::parse(&text))
    }
}
