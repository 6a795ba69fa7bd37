//! SciDB query analysis for Rust
//!
//! This crate ties the pipeline together:
//! - Lexing and parsing AFL/AQL query lists
//! - Resolving bare identifiers to arrays, attributes or dimensions
//! - Linking queries into an array dependency graph
//!
//! # Example
//!
//! ```
//! use scidb_query::analyze;
//!
//! let analysis = analyze("store(build(A, 1), B); scan(B); remove(B);").unwrap();
//! let heads: Vec<_> = analysis.tree.head_nodes().iter().map(|n| n.index()).collect();
//! assert_eq!(heads, vec![0]);
//! ```

// Re-export all public APIs from internal crates
pub use scidb_query_ast as ast;
pub use scidb_query_diagnostics as diagnostics;
pub use scidb_query_graph as graph;
pub use scidb_query_parser as parser;
pub use scidb_query_types as types;

// Convenience re-exports
pub use scidb_query_ast::{Node, Query};
pub use scidb_query_diagnostics::{Diagnostic, QueryError, Result};
pub use scidb_query_graph::{QueryTree, build_dependency_graph};
pub use scidb_query_parser::{ParseOptions, ParseOutput, Parser, parse};

use scidb_query_diagnostics::sort_diagnostics;

/// A parsed query list linked into its dependency graph
#[derive(Debug, Clone)]
pub struct Analysis {
    pub tree: QueryTree,
    /// Parser and graph diagnostics together, ordered by source position
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    pub fn queries(&self) -> impl Iterator<Item = &Query> {
        self.tree.nodes().iter().map(|node| node.query())
    }
}

/// Parse `source` with the built-in signatures and build its dependency graph
pub fn analyze(source: &str) -> Result<Analysis> {
    analyze_with(&Parser::new(), source)
}

/// Parse `source` with a configured parser and build its dependency graph
pub fn analyze_with(parser: &Parser<'_>, source: &str) -> Result<Analysis> {
    let ParseOutput {
        queries,
        mut diagnostics,
    } = parser.parse(source)?;
    let tree = build_dependency_graph(queries);
    diagnostics.extend_from_slice(tree.diagnostics());
    sort_diagnostics(&mut diagnostics);
    log::debug!(
        "analyzed {} queries, {} head nodes, {} diagnostics",
        tree.len(),
        tree.head_nodes().len(),
        diagnostics.len()
    );
    Ok(Analysis { tree, diagnostics })
}

/// Collect every diagnostic for `source`, reporting a fatal error as one more entry
pub fn check(source: &str) -> Vec<Diagnostic> {
    check_with(&Parser::new(), source)
}

/// [`check`] with a configured parser
pub fn check_with(parser: &Parser<'_>, source: &str) -> Vec<Diagnostic> {
    match analyze_with(parser, source) {
        Ok(analysis) => analysis.diagnostics,
        Err(err) => {
            log::debug!("analysis stopped: {err}");
            vec![err.to_diagnostic()]
        }
    }
}
