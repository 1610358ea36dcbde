//! Event record structure

use super::field_value::FieldValue;
use super::log_level::LogLevel;
use super::scope::ScopePayload;
use super::template::{MessageTemplate, NamedArg};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric event identity with an optional symbolic name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EventId {
    pub fn new(id: i64) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

impl From<i64> for EventId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:{}", self.id, name),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Captured error payload: the error's message plus its `source()` chain,
/// rendered at capture time so the record stays immutable and cloneable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub message: String,
    pub chain: Vec<String>,
}

impl ErrorDetails {
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        let message = error.to_string();
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        Self { message, chain }
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for cause in &self.chain {
            write!(f, " (caused by: {})", cause)?;
        }
        Ok(())
    }
}

/// An immutable log event, built at most once per write call and shared
/// read-only with every provider the dispatch fans out to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub event_id: EventId,
    pub category: String,
    pub template: MessageTemplate,
    /// Ordered arguments paired with the placeholder name each bound to
    /// (`None` for surplus positional arguments).
    pub args: Vec<NamedArg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Scope chain snapshot taken at build time, innermost first.
    pub scopes: Vec<ScopePayload>,
}

impl EventRecord {
    pub fn new(
        level: LogLevel,
        event_id: EventId,
        category: impl Into<String>,
        template: MessageTemplate,
        args: Vec<NamedArg>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            event_id,
            category: category.into(),
            template,
            args,
            error: None,
            scopes: Vec::new(),
        }
    }

    pub fn with_error(mut self, error: ErrorDetails) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<ScopePayload>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Render the message template against the stored arguments.
    pub fn message(&self) -> String {
        self.template.render(&self.args)
    }

    /// Look up an argument value by the placeholder name it bound to.
    pub fn arg(&self, name: &str) -> Option<&FieldValue> {
        self.args
            .iter()
            .find(|(n, _)| n.as_deref() == Some(name))
            .map(|(_, v)| v)
    }
}
