//! Query dependency graph for SciDB query lists
//!
//! Queries run top to bottom, so the order of a query list carries meaning.
//! [`build_dependency_graph`] links every query to the next one that touches
//! each of its arrays, giving one chain of successive touches per array.
//! Queries with no incoming link are the head nodes of the graph.

mod export;
mod tree;

pub use export::{ExportError, ExportOptions, GraphLink, GraphNode, NodeId, NodeLinkGraph};
pub use tree::{Edge, QueryTree, QueryTreeNode, build_dependency_graph};
