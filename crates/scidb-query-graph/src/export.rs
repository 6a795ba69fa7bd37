//! Node-link export
//!
//! Produces the generic `{directed, multigraph, graph, nodes, links}` shape
//! that graph visualisation tools read.

use crate::QueryTree;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Errors that can occur during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options for [`QueryTree::to_node_link`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportOptions {
    /// Identify nodes by canonical query text instead of query index.
    ///
    /// Queries with identical text collapse into one node.
    pub string_labels: bool,
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string_labels(mut self, enabled: bool) -> Self {
        self.string_labels = enabled;
        self
    }

    pub fn pretty(mut self, enabled: bool) -> Self {
        self.pretty = enabled;
        self
    }
}

/// Node identifier: a query index, or its canonical text
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Index(usize),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: NodeId,
    pub target: NodeId,
    /// Array shared by the two queries
    pub array: String,
}

/// Serializable node-link representation of a [`QueryTree`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLinkGraph {
    pub directed: bool,
    /// Set when some pair of nodes has more than one link
    pub multigraph: bool,
    pub graph: BTreeMap<String, String>,
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl QueryTree {
    /// Build the node-link representation of this tree
    pub fn to_node_link(&self, options: &ExportOptions) -> NodeLinkGraph {
        let id_of = |index: usize| match self.node(index) {
            Some(node) if options.string_labels => NodeId::Label(node.query().to_string()),
            _ => NodeId::Index(index),
        };

        let mut nodes: Vec<GraphNode> = Vec::with_capacity(self.len());
        for index in 0..self.len() {
            let id = id_of(index);
            if !nodes.iter().any(|node| node.id == id) {
                nodes.push(GraphNode { id });
            }
        }

        let links: Vec<GraphLink> = self
            .edges()
            .into_iter()
            .map(|edge| GraphLink {
                source: id_of(edge.source),
                target: id_of(edge.target),
                array: edge.array.to_string(),
            })
            .collect();

        let multigraph = links.iter().enumerate().any(|(i, link)| {
            links[..i]
                .iter()
                .any(|other| other.source == link.source && other.target == link.target)
        });

        NodeLinkGraph {
            directed: true,
            multigraph,
            graph: BTreeMap::new(),
            nodes,
            links,
        }
    }

    /// Serialize the node-link representation as JSON
    pub fn to_json(&self, options: &ExportOptions) -> Result<String, ExportError> {
        let graph = self.to_node_link(options);
        let json = if options.pretty {
            serde_json::to_string_pretty(&graph)?
        } else {
            serde_json::to_string(&graph)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_serializes_untagged() {
        let index = serde_json::to_string(&NodeId::Index(3)).expect("json");
        let label = serde_json::to_string(&NodeId::Label("scan(A)".into())).expect("json");
        assert_eq!(index, "3");
        assert_eq!(label, "\"scan(A)\"");
    }

    #[test]
    fn test_empty_tree_exports() {
        let json = QueryTree::default()
            .to_json(&ExportOptions::new())
            .expect("json");
        assert_eq!(
            json,
            r#"{"directed":true,"multigraph":false,"graph":{},"nodes":[],"links":[]}"#
        );
    }

    #[test]
    fn test_round_trip_through_serde() {
        let graph = NodeLinkGraph {
            directed: true,
            multigraph: false,
            graph: BTreeMap::new(),
            nodes: vec![GraphNode { id: NodeId::Index(0) }, GraphNode { id: NodeId::Index(1) }],
            links: vec![GraphLink {
                source: NodeId::Index(0),
                target: NodeId::Index(1),
                array: "A".into(),
            }],
        };
        let json = serde_json::to_string(&graph).expect("json");
        let back: NodeLinkGraph = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, graph);
    }
}
