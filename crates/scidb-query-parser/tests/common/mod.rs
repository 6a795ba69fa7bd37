//! Shared helpers for parser tests
//!
//! - Label checks that rebuild a node's bookkeeping from its children

pub mod labels;

pub use labels::*;
