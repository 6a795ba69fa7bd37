//! SciDB AFL/AQL query parser
//!
//! This crate turns query text into typed [`Query`] trees. Tokens come from a
//! logos lexer and a winnow grammar over the token stream builds nodes
//! bottom-up. Every function call or operator is checked against a
//! [`SignatureTable`] as it is reduced, which also decides whether bare
//! identifiers name arrays, attributes or dimensions.
//!
//! ```
//! use scidb_query_parser::parse;
//!
//! let output = parse("store(build(A, 1), B); remove(A);").unwrap();
//! assert_eq!(output.queries.len(), 2);
//! assert!(output.queries[0].arrays_created().contains("B"));
//! ```

mod builder;
pub mod lexer;
mod parser;

pub use parser::MAX_NESTING;

use builder::NodeBuilder;
use scidb_query_ast::{Node, Query};
use scidb_query_diagnostics::{Diagnostic, Result, Severity};
use scidb_query_types::SignatureTable;

/// Options controlling what the parser reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Emit an info diagnostic for every identifier still ambiguous at the top of a query
    pub report_unresolved: bool,
    /// Report signature mismatches as errors instead of warnings
    pub strict_signatures: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report_unresolved(mut self, enabled: bool) -> Self {
        self.report_unresolved = enabled;
        self
    }

    pub fn strict_signatures(mut self, enabled: bool) -> Self {
        self.strict_signatures = enabled;
        self
    }
}

/// Parsed queries plus the recoverable problems found while building them
#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// Queries in source order
    pub queries: Vec<Query>,
    /// Diagnostics ordered by source position
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    /// Check if any diagnostic has error severity
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Query parser bound to a signature table
#[derive(Debug, Clone, Copy)]
pub struct Parser<'t> {
    signatures: &'t SignatureTable,
    options: ParseOptions,
}

impl Parser<'static> {
    /// Create a parser using the built-in signatures
    pub fn new() -> Self {
        Self::with_signatures(SignatureTable::builtin())
    }
}

impl Default for Parser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'t> Parser<'t> {
    /// Create a parser using a custom signature table
    pub fn with_signatures(signatures: &'t SignatureTable) -> Self {
        Self {
            signatures,
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn signatures(&self) -> &'t SignatureTable {
        self.signatures
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parse a semicolon-separated list of queries
    pub fn parse(&self, source: &str) -> Result<ParseOutput> {
        let tokens = lexer::tokenize(source)?;
        let mut builder = NodeBuilder::new(self.signatures, self.options, source);
        let queries = parser::parse_tokens(&tokens, &mut builder, source.len(), parser::query_list)?;
        let diagnostics = builder.into_diagnostics();
        log::debug!(
            "parsed {} queries with {} diagnostics",
            queries.len(),
            diagnostics.len()
        );
        Ok(ParseOutput {
            queries,
            diagnostics,
        })
    }

    /// Parse a single expression, discarding diagnostics
    pub fn parse_expression(&self, source: &str) -> Result<Node> {
        let tokens = lexer::tokenize(source)?;
        let mut builder = NodeBuilder::new(self.signatures, self.options, source);
        parser::parse_tokens(&tokens, &mut builder, source.len(), parser::standalone_expression)
    }
}

/// Parse query text with the built-in signatures and default options
pub fn parse(source: &str) -> Result<ParseOutput> {
    Parser::new().parse(source)
}

/// Parse a single expression with the built-in signatures
pub fn parse_expression(source: &str) -> Result<Node> {
    Parser::new().parse_expression(source)
}
