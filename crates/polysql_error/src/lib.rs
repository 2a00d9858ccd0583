//! Error types shared by the polysql crates.
//!
//! Every validation failure carries an [`ErrorKind`], the offending source
//! position and, for overloaded operators, the rendered allowed signatures.
mod kind;
mod pos;

pub mod messages;

use std::borrow::Cow;
use std::fmt;

pub use kind::{ErrorCategory, ErrorKind};
pub use pos::ParserPos;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}{}", details(.pos, .fields))]
pub struct DbError {
    kind: ErrorKind,
    message: String,
    pos: Option<ParserPos>,
    signature: Option<String>,
    fields: Vec<(Cow<'static, str>, String)>,
}

impl DbError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        DbError {
            kind,
            message: message.into(),
            pos: None,
            signature: None,
            fields: Vec::new(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Attach a source position, replacing any existing one.
    pub fn with_pos(mut self, pos: ParserPos) -> Self {
        self.pos = Some(pos);
        self
    }

    /// Attach a source position only if one hasn't been set yet.
    ///
    /// Errors raised deep in a tree keep their more precise position.
    pub fn or_pos(mut self, pos: ParserPos) -> Self {
        if self.pos.is_none() {
            self.pos = Some(pos);
        }
        self
    }

    /// Attach the allowed signatures for the failing operator.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Attach an additional diagnostic key/value pair.
    pub fn with_field<V>(mut self, key: impl Into<Cow<'static, str>>, value: V) -> Self
    where
        V: fmt::Display,
    {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn pos(&self) -> Option<ParserPos> {
        self.pos
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.fields().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

struct Details<'a> {
    pos: &'a Option<ParserPos>,
    fields: &'a [(Cow<'static, str>, String)],
}

fn details<'a>(
    pos: &'a Option<ParserPos>,
    fields: &'a [(Cow<'static, str>, String)],
) -> Details<'a> {
    Details { pos, fields }
}

impl fmt::Display for Details<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pos) = self.pos {
            if !pos.is_zero() {
                write!(f, " at {pos}")?;
            }
        }
        for (key, value) in self.fields {
            write!(f, "\n  {key}: {value}")?;
        }
        Ok(())
    }
}

/// Helper for turning missing values into internal errors.
pub trait OptionExt<T> {
    fn required(self, what: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, what: &'static str) -> Result<T> {
        self.ok_or_else(|| DbError::internal(format!("Missing required value: {what}")))
    }
}
