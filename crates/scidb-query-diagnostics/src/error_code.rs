//! Query error codes following a structured numbering system
//!
//! Error code ranges:
//! - SDB0001-SDB0099: Lexical and syntax errors (fatal)
//! - SDB0100-SDB0199: Semantic diagnostics (signature lookup and matching)
//! - SDB0200-SDB0299: Dependency graph diagnostics
//! - SDB0400-SDB0499: Signature definition errors

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// The recoverable diagnostic kind this code reports, if any
    pub const fn kind(&self) -> Option<DiagnosticKind> {
        match self.0 {
            101 => Some(DiagnosticKind::UnknownFunction),
            110 => Some(DiagnosticKind::SignatureMismatch),
            120 => Some(DiagnosticKind::UnresolvedLabel),
            201 => Some(DiagnosticKind::UseAfterDelete),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SDB{:04}", self.0)
    }
}

/// Kinds of recoverable findings reported alongside a successful result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A call or operator name has no entry in the signature table
    UnknownFunction,
    /// Arity or argument types disagree with the declared signature
    SignatureMismatch,
    /// A bare identifier is still ambiguous at the top of its query
    UnresolvedLabel,
    /// A query references an array deleted by an earlier query
    UseAfterDelete,
}

impl DiagnosticKind {
    /// The error code used when reporting this kind
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownFunction => SDB0101,
            Self::SignatureMismatch => SDB0110,
            Self::UnresolvedLabel => SDB0120,
            Self::UseAfterDelete => SDB0201,
        }
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Lexical and syntax errors (0001-0099)
    map.insert(1, ErrorInfo::new("Invalid character"));
    map.insert(2, ErrorInfo::new("Invalid integer literal")
        .with_help("Integer literals must fit in a signed 64-bit value"));
    map.insert(10, ErrorInfo::new("Unexpected token"));
    map.insert(11, ErrorInfo::new("Unexpected end of input"));
    map.insert(12, ErrorInfo::new("Trailing input after query list"));
    map.insert(13, ErrorInfo::new("Chained comparison")
        .with_help("Comparison operators are non-associative; add parentheses"));
    map.insert(14, ErrorInfo::new("Expected function call")
        .with_help("An AFL query must be a single operator call such as scan(A)"));
    map.insert(15, ErrorInfo::new("Expression nested too deeply")
        .with_help("Flatten the query or split it into several stored steps"));

    // Semantic diagnostics (0100-0199)
    map.insert(101, ErrorInfo::new("Unknown function"));
    map.insert(110, ErrorInfo::new("Signature mismatch"));
    map.insert(120, ErrorInfo::new("Unresolved identifier")
        .with_help("The identifier could be an array, attribute or dimension"));

    // Dependency graph diagnostics (0200-0299)
    map.insert(201, ErrorInfo::new("Use after delete")
        .with_help("The array was removed by an earlier query and not recreated"));

    // Signature definition errors (0400-0499)
    map.insert(401, ErrorInfo::new("Invalid signature definition"));
    map.insert(402, ErrorInfo::new("Misplaced optional argument group")
        .with_help("Only one bracketed group is allowed and it must come last"));

    map
});

// Lexical and syntax errors
pub const SDB0001: ErrorCode = ErrorCode::new(1);
pub const SDB0002: ErrorCode = ErrorCode::new(2);
pub const SDB0010: ErrorCode = ErrorCode::new(10);
pub const SDB0011: ErrorCode = ErrorCode::new(11);
pub const SDB0012: ErrorCode = ErrorCode::new(12);
pub const SDB0013: ErrorCode = ErrorCode::new(13);
pub const SDB0014: ErrorCode = ErrorCode::new(14);
pub const SDB0015: ErrorCode = ErrorCode::new(15);

// Semantic diagnostics
pub const SDB0101: ErrorCode = ErrorCode::new(101);
pub const SDB0110: ErrorCode = ErrorCode::new(110);
pub const SDB0120: ErrorCode = ErrorCode::new(120);

// Dependency graph diagnostics
pub const SDB0201: ErrorCode = ErrorCode::new(201);

// Signature definition errors
pub const SDB0401: ErrorCode = ErrorCode::new(401);
pub const SDB0402: ErrorCode = ErrorCode::new(402);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(SDB0001.to_string(), "SDB0001");
        assert_eq!(SDB0110.to_string(), "SDB0110");
    }

    #[test]
    fn test_error_info() {
        assert_eq!(SDB0001.info().description, "Invalid character");
        assert_eq!(ErrorCode::new(999).info().description, "Unknown error");
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            DiagnosticKind::UnknownFunction,
            DiagnosticKind::SignatureMismatch,
            DiagnosticKind::UnresolvedLabel,
            DiagnosticKind::UseAfterDelete,
        ] {
            assert_eq!(kind.code().kind(), Some(kind));
        }
        assert_eq!(SDB0010.kind(), None);
    }
}
