//! Error types and reporting
//!
//! Every fallible operation returns [`Result`]. A failing call produces exactly
//! one [`Error`]; callers propagate it with `?` and never replace it, so a
//! failure raised inside a user callable reaches the top level unchanged.

use crate::ast::Span;
use std::collections::TryReserveError;
use std::fmt;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Kinds of runtime and compile errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Capability absent or wrong argument shape
    TypeMismatch,
    /// Value out of domain
    Value,
    /// Resource exhaustion
    Allocation,
    ZeroDivision,
    Overflow,
    Index,
    Key,
    /// Unbound name
    Name,
    /// Lexer or parser failure
    Syntax,
    /// Evaluation nested deeper than the configured limit
    Recursion,
    Io,
    /// Broken interpreter invariant
    Internal,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "TypeError",
            ErrorKind::Value => "ValueError",
            ErrorKind::Allocation => "MemoryError",
            ErrorKind::ZeroDivision => "ZeroDivisionError",
            ErrorKind::Overflow => "OverflowError",
            ErrorKind::Index => "IndexError",
            ErrorKind::Key => "KeyError",
            ErrorKind::Name => "NameError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Recursion => "RecursionError",
            ErrorKind::Io => "IOError",
            ErrorKind::Internal => "SystemError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pending error: kind, message and, for syntax errors, where it happened
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Option<Span>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
            span: None,
        }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch, message)
    }

    pub fn value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Value, message)
    }

    pub fn allocation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Allocation, message)
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ZeroDivision, message)
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Overflow, message)
    }

    pub fn index(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Index, message)
    }

    pub fn key(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Key, message)
    }

    pub fn name_error(name: &str, hint: Option<&str>) -> Self {
        let message = match hint {
            Some(similar) => format!("name '{name}' is not defined; did you mean '{similar}'?"),
            None => format!("name '{name}' is not defined"),
        };
        Self::new(ErrorKind::Name, message)
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Error {
            kind: ErrorKind::Syntax,
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn recursion(limit: usize) -> Self {
        Self::new(
            ErrorKind::Recursion,
            format!("maximum recursion depth ({limit}) exceeded"),
        )
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Argument count outside `min..=max` for a builtin
    pub fn arity(name: &str, min: usize, max: usize, got: usize) -> Self {
        let expected = match (min, max) {
            (a, b) if a == b => format!("exactly {a}"),
            (a, usize::MAX) => format!("at least {a}"),
            (a, b) => format!("{a} to {b}"),
        };
        Self::type_mismatch(format!(
            "{name}() takes {expected} argument(s) ({got} given)"
        ))
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Self {
        Error::allocation(format!("cannot allocate container: {err}"))
    }
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &Error) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let span = error.span.unwrap_or_default();
    let range = span.start.min(source.len())..span.end.min(source.len());
    let mut report = Report::build(ReportKind::Error, (filename, range.clone()));
    report = match error.span {
        Some(_) => report.with_message(error.kind.name()).with_label(
            Label::new((filename, range))
                .with_message(&error.message)
                .with_color(Color::Red),
        ),
        None => report.with_message(error.to_string()),
    };
    if let Err(io_err) = report
        .finish()
        .eprint((filename, Source::from(source)))
    {
        eprintln!("{error} (report failed: {io_err})");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_kind_name() {
        let err = Error::value("zero step for range()");
        assert_eq!(err.to_string(), "ValueError: zero step for range()");
    }

    #[test]
    fn test_syntax_error_keeps_span() {
        let err = Error::syntax("unexpected token", Span::new(3, 4));
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.span, Some(Span::new(3, 4)));
    }

    #[test]
    fn test_name_error_with_hint() {
        let err = Error::name_error("mpa", Some("map"));
        assert!(err.is(ErrorKind::Name));
        assert!(err.message.contains("did you mean 'map'"));
    }

    #[test]
    fn test_arity_messages() {
        assert!(Error::arity("chr", 1, 1, 2).message.contains("exactly 1"));
        assert!(Error::arity("map", 2, usize::MAX, 1).message.contains("at least 2"));
        assert!(Error::arity("range", 1, 3, 0).message.contains("1 to 3"));
    }

    #[test]
    fn test_try_reserve_maps_to_allocation() {
        let mut v: Vec<u64> = Vec::new();
        let err: Error = v.try_reserve_exact(usize::MAX).unwrap_err().into();
        assert_eq!(err.kind, ErrorKind::Allocation);
    }
}
