//! Diagnostics and error handling for SciDB query analysis
//!
//! This crate provides the error infrastructure shared by the lexer, parser,
//! disambiguator and dependency-graph builder: error codes, source locations,
//! recoverable diagnostics and the fatal [`QueryError`].

mod error;
mod error_code;
mod span;

pub use error::*;
pub use error_code::*;
pub use span::*;

/// Result type for query analysis operations
pub type Result<T> = std::result::Result<T, QueryError>;
