//! Query error types

use crate::{DiagnosticKind, ErrorCode, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - the query is not usable as written
    Error,
    /// Warning - potential issue but analysis can continue
    Warning,
    /// Information - informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A recoverable diagnostic with location and context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Source location
    pub location: Option<SourceLocation>,
    /// Additional context or help
    pub help: Option<String>,
    /// Related information
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    /// Create a diagnostic with an explicit severity
    pub fn new(severity: Severity, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location: None,
            help: None,
            related: Vec::new(),
        }
    }

    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Create a new informational diagnostic
    pub fn info(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    /// Set the location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add related information
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    /// The recoverable kind of this diagnostic, if its code names one
    pub fn kind(&self) -> Option<DiagnosticKind> {
        self.code.kind()
    }

    /// Key used to order diagnostics by source position
    pub fn sort_key(&self) -> (usize, ErrorCode, &str) {
        let offset = self.location.as_ref().map_or(usize::MAX, |loc| loc.offset);
        (offset, self.code, self.message.as_str())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        }
        Ok(())
    }
}

/// Sort diagnostics by source position so repeated runs report identically
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Related diagnostic information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedInfo {
    /// Location of related code
    pub location: Option<SourceLocation>,
    /// Message explaining the relationship
    pub message: String,
}

impl RelatedInfo {
    /// Create new related info
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            location: None,
            message: message.into(),
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// Fatal query analysis error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Invalid character or malformed literal in the source text
    #[error("{code}: invalid character {character:?} at line {line}")]
    Lex {
        code: ErrorCode,
        character: char,
        line: usize,
        location: SourceLocation,
    },

    /// Token stream does not match the grammar
    #[error("{code}: syntax error at line {line}: found {found}, expected {expected}")]
    Syntax {
        code: ErrorCode,
        line: usize,
        found: String,
        expected: String,
        location: SourceLocation,
    },

    /// Malformed line in a signature definition text
    #[error("{code}: invalid signature definition at line {line}: {message}")]
    Definition {
        code: ErrorCode,
        line: usize,
        message: String,
    },
}

impl QueryError {
    /// Create a lex error
    pub fn lex(code: ErrorCode, character: char, location: SourceLocation) -> Self {
        Self::Lex {
            code,
            character,
            line: location.line,
            location,
        }
    }

    /// Create a syntax error
    pub fn syntax(
        code: ErrorCode,
        found: impl Into<String>,
        expected: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self::Syntax {
            code,
            line: location.line,
            found: found.into(),
            expected: expected.into(),
            location,
        }
    }

    /// Create a signature definition error
    pub fn definition(code: ErrorCode, line: usize, message: impl Into<String>) -> Self {
        Self::Definition {
            code,
            line,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Lex { code, .. } | Self::Syntax { code, .. } | Self::Definition { code, .. } => {
                *code
            }
        }
    }

    /// Get the line the error was reported at
    pub fn line(&self) -> usize {
        match self {
            Self::Lex { line, .. } | Self::Syntax { line, .. } | Self::Definition { line, .. } => {
                *line
            }
        }
    }

    /// Get the location if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Lex { location, .. } | Self::Syntax { location, .. } => Some(location),
            Self::Definition { .. } => None,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let message = match self {
            Self::Lex { character, .. } => format!("invalid character {character:?}"),
            Self::Syntax {
                found, expected, ..
            } => format!("found {found}, expected {expected}"),
            Self::Definition { message, .. } => message.clone(),
        };
        let mut diag = Diagnostic::error(self.code(), message);
        if let Some(loc) = self.location() {
            diag = diag.with_location(loc.clone());
        }
        if let Some(help) = self.code().info().help {
            diag = diag.with_help(help);
        }
        diag
    }
}
