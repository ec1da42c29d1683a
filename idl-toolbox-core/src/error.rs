//! Structured error types for IDL parsing, hydration, layout and codec.
//!
//! Every layer returns an [`IdlError`]. Failures deep inside a nested type
//! are wrapped with breadcrumbs (typedef name, field, variant, byte offset)
//! as they bubble up, so the rendered message reads as a chain of context.

use std::fmt::Display;

use thiserror::Error;

/// Result type alias used across the toolbox.
pub type IdlResult<T> = Result<T, IdlError>;

/// The family a failure belongs to, independent of its breadcrumbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Hydration,
    Layout,
    Codec,
    Path,
    Resolution,
    NoMatch,
}

/// Structured error type for IDL operations.
///
/// # Example
/// ```rust
/// use idl_toolbox_core::error::{Context, ErrorKind, IdlError, IdlResult};
///
/// fn read_length(data: &[u8]) -> IdlResult<u8> {
///     data.first()
///         .copied()
///         .ok_or_else(|| IdlError::codec("empty buffer"))
///         .context("length prefix")
/// }
///
/// let err = read_length(&[]).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::Codec);
/// assert_eq!(err.to_string(), "length prefix > codec: empty buffer");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdlError {
    /// Malformed schema: unknown key set, bad literal, bad byte literal
    #[error("parse: {message}")]
    Parse { message: String },

    /// Unresolved generic or typedef, non-constant array length, duplicate enum entry
    #[error("hydration: {message}")]
    Hydration { message: String },

    /// Type cannot be given a native memory layout
    #[error("layout: {message}")]
    Layout { message: String },

    /// Bytes and values disagree with the type
    #[error("codec: {message}")]
    Codec { message: String },

    /// Path does not lead anywhere in the type or value
    #[error("path: {message}")]
    Path { message: String },

    /// Instruction accounts could not be resolved
    #[error("resolution: {message}")]
    Resolution { message: String },

    /// Breadcrumb wrapping an inner failure
    #[error("{context} > {source}")]
    Context {
        context: String,
        source: Box<IdlError>,
    },

    /// No candidate schema accepted the payload
    #[error("no {kind} matched: {}", summarize_attempts(.attempts))]
    NoMatch {
        kind: String,
        attempts: Vec<(String, IdlError)>,
    },
}

fn summarize_attempts(attempts: &[(String, IdlError)]) -> String {
    if attempts.is_empty() {
        return "no candidates".to_string();
    }
    attempts
        .iter()
        .map(|(name, err)| format!("[{}: {}]", name, err))
        .collect::<Vec<_>>()
        .join(", ")
}

impl IdlError {
    pub fn parse(message: impl Into<String>) -> Self {
        IdlError::Parse {
            message: message.into(),
        }
    }

    pub fn hydration(message: impl Into<String>) -> Self {
        IdlError::Hydration {
            message: message.into(),
        }
    }

    pub fn layout(message: impl Into<String>) -> Self {
        IdlError::Layout {
            message: message.into(),
        }
    }

    pub fn codec(message: impl Into<String>) -> Self {
        IdlError::Codec {
            message: message.into(),
        }
    }

    pub fn path(message: impl Into<String>) -> Self {
        IdlError::Path {
            message: message.into(),
        }
    }

    pub fn resolution(message: impl Into<String>) -> Self {
        IdlError::Resolution {
            message: message.into(),
        }
    }

    /// Wrap this error with a breadcrumb.
    pub fn wrap(self, context: impl Display) -> Self {
        IdlError::Context {
            context: context.to_string(),
            source: Box::new(self),
        }
    }

    /// The kind of the innermost failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdlError::Parse { .. } => ErrorKind::Parse,
            IdlError::Hydration { .. } => ErrorKind::Hydration,
            IdlError::Layout { .. } => ErrorKind::Layout,
            IdlError::Codec { .. } => ErrorKind::Codec,
            IdlError::Path { .. } => ErrorKind::Path,
            IdlError::Resolution { .. } => ErrorKind::Resolution,
            IdlError::Context { source, .. } => source.kind(),
            IdlError::NoMatch { .. } => ErrorKind::NoMatch,
        }
    }

    /// Breadcrumbs from outermost to innermost.
    pub fn breadcrumbs(&self) -> Vec<&str> {
        let mut crumbs = vec![];
        let mut current = self;
        while let IdlError::Context { context, source } = current {
            crumbs.push(context.as_str());
            current = source;
        }
        crumbs
    }
}

/// Breadcrumb helpers on results, in the spirit of `anyhow::Context`.
pub trait Context<T> {
    fn context(self, context: impl Display) -> IdlResult<T>;

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> IdlResult<T>;
}

impl<T> Context<T> for IdlResult<T> {
    fn context(self, context: impl Display) -> IdlResult<T> {
        self.map_err(|err| err.wrap(context))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> IdlResult<T> {
        self.map_err(|err| err.wrap(f()))
    }
}
