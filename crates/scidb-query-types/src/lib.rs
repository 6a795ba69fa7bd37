//! Signature system for SciDB queries
//!
//! This crate defines:
//! - Argument and return types (`void`, `bool`, `numeric`, `array`, `schema`, `attr`, `dim`)
//! - Function and operator signatures with trailing repeated argument groups
//! - The signature definition language and its loader
//! - The built-in signature table shared by all parses

mod lexicon;
pub mod loader;
mod signature;
mod table;

pub use lexicon::BUILTIN_DEFINITIONS;
pub use signature::*;
pub use table::*;
