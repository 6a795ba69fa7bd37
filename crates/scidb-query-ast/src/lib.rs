//! Abstract syntax tree for SciDB AFL/AQL queries
//!
//! Every production of the query grammar constructs a [`Node`]: a closed
//! [`NodeKind`] variant plus a shared envelope carrying its [`ExprType`] and
//! the arrays it references, creates and deletes. Nodes are built bottom-up
//! and never change after their parent has been built.

mod display;
mod node;
mod operator;
mod query;
mod types;

pub use node::*;
pub use operator::*;
pub use query::*;
pub use types::*;
