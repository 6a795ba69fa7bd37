//! Top-level queries

use crate::{ExprType, Node, NodeKind};
use scidb_query_diagnostics::SourceLocation;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Query language dialect, detected from the leading token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// Functional form: `store(build(...), X)`
    Afl,
    /// Declarative form: `CREATE ARRAY ...`, `DROP ARRAY ...`
    Aql,
}

/// One parsed top-level statement
#[derive(Debug, Clone)]
pub struct Query {
    index: usize,
    dialect: Dialect,
    root: Node,
    location: SourceLocation,
}

impl Query {
    /// Wrap a root node; the dialect follows from the root's production
    pub fn new(index: usize, root: Node, location: SourceLocation) -> Self {
        let dialect = match root.kind() {
            NodeKind::CreateArray { .. } | NodeKind::DropArray { .. } => Dialect::Aql,
            _ => Dialect::Afl,
        };
        Self {
            index,
            dialect,
            root,
            location,
        }
    }

    /// Position of this query in its query list (0-based)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Where the query starts in the source text
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn expr_type(&self) -> ExprType {
        self.root.expr_type()
    }

    pub fn arrays_referenced(&self) -> &BTreeSet<String> {
        self.root.arrays_referenced()
    }

    pub fn arrays_created(&self) -> &BTreeSet<String> {
        self.root.arrays_created()
    }

    pub fn arrays_deleted(&self) -> &BTreeSet<String> {
        self.root.arrays_deleted()
    }

    pub fn aliased_labels(&self) -> &BTreeMap<String, Arc<Node>> {
        self.root.aliased_labels()
    }

    pub fn ambiguous_labels(&self) -> &BTreeSet<String> {
        self.root.ambiguous_labels()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}
