//! Query dependency tree

use scidb_query_ast::Query;
use scidb_query_diagnostics::{Diagnostic, RelatedInfo, SDB0201, sort_diagnostics};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

/// One query in a [`QueryTree`] together with its links.
///
/// Links are indices into the owning tree, keyed by the array that connects
/// the two queries.
#[derive(Debug, Clone)]
pub struct QueryTreeNode {
    query: Query,
    downward_links: BTreeMap<String, Vec<usize>>,
    upward_links: BTreeMap<String, Vec<usize>>,
}

impl QueryTreeNode {
    fn new(query: Query) -> Self {
        Self {
            query,
            downward_links: BTreeMap::new(),
            upward_links: BTreeMap::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.query.index()
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn arrays_referenced(&self) -> &BTreeSet<String> {
        self.query.arrays_referenced()
    }

    pub fn arrays_created(&self) -> &BTreeSet<String> {
        self.query.arrays_created()
    }

    pub fn arrays_deleted(&self) -> &BTreeSet<String> {
        self.query.arrays_deleted()
    }

    /// Later queries that touch an array next, keyed by array name
    pub fn downward_links(&self) -> &BTreeMap<String, Vec<usize>> {
        &self.downward_links
    }

    /// Earlier queries that touched an array last, keyed by array name
    pub fn upward_links(&self) -> &BTreeMap<String, Vec<usize>> {
        &self.upward_links
    }

    /// A head node has no incoming link on any array
    pub fn is_head(&self) -> bool {
        self.upward_links.is_empty()
    }
}

/// A directed link between two queries sharing an array
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge<'a> {
    pub source: usize,
    pub target: usize,
    pub array: &'a str,
}

/// Queries in source order, linked by the arrays they share
#[derive(Debug, Clone, Default)]
pub struct QueryTree {
    nodes: Vec<QueryTreeNode>,
    diagnostics: Vec<Diagnostic>,
}

/// Link each query to the next query that references the same array.
///
/// For every query `i` and array `a` it references, the first later query
/// `j` referencing `a` gets the edge `i -> j`; the search for `a` then
/// continues from `j`, so each array forms a chain of successive touches.
/// A query that deletes `a` ends its chain.
pub fn build_dependency_graph(queries: impl IntoIterator<Item = Query>) -> QueryTree {
    let mut nodes: Vec<QueryTreeNode> = queries.into_iter().map(QueryTreeNode::new).collect();

    for source in 0..nodes.len() {
        let arrays: Vec<String> = nodes[source]
            .arrays_referenced()
            .difference(nodes[source].arrays_deleted())
            .cloned()
            .collect();
        for array in arrays {
            let Some(offset) = nodes[source + 1..]
                .iter()
                .position(|node| node.arrays_referenced().contains(&array))
            else {
                continue;
            };
            let target = source + 1 + offset;
            log::debug!("link query {} -> {} on '{}'", source, target, array);
            nodes[source]
                .downward_links
                .entry(array.clone())
                .or_default()
                .push(target);
            nodes[target]
                .upward_links
                .entry(array)
                .or_default()
                .push(source);
        }
    }

    let diagnostics = use_after_delete(&nodes);
    let tree = QueryTree { nodes, diagnostics };
    for head in tree.head_nodes() {
        log::debug!("head node {}: {}", head.index(), head.query());
    }
    tree
}

/// Flag references to arrays deleted by an earlier query and not recreated since
fn use_after_delete(nodes: &[QueryTreeNode]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    // array -> position of the query that deleted it
    let mut deleted: BTreeMap<&str, usize> = BTreeMap::new();

    for (position, node) in nodes.iter().enumerate() {
        for array in node.arrays_referenced() {
            if node.arrays_created().contains(array) {
                continue;
            }
            let Some(&deleter) = deleted.get(array.as_str()) else {
                continue;
            };
            let deleting = nodes[deleter].query();
            diagnostics.push(
                Diagnostic::warning(
                    SDB0201,
                    format!(
                        "query {} references array '{}' deleted by query {}",
                        node.index(),
                        array,
                        deleting.index()
                    ),
                )
                .with_location(node.query().location().clone())
                .with_related(
                    RelatedInfo::new(format!("'{array}' deleted here"))
                        .with_location(deleting.location().clone()),
                ),
            );
        }

        for array in node.arrays_created() {
            deleted.remove(array.as_str());
        }
        for array in node.arrays_deleted() {
            deleted.insert(array.as_str(), position);
        }
    }

    sort_diagnostics(&mut diagnostics);
    diagnostics
}

impl QueryTree {
    /// All nodes in source order
    pub fn nodes(&self) -> &[QueryTreeNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&QueryTreeNode> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Queries with no incoming link, in source order
    pub fn head_nodes(&self) -> Vec<&QueryTreeNode> {
        self.nodes.iter().filter(|node| node.is_head()).collect()
    }

    /// Queries linked below `index` through `array`
    pub fn downward(&self, index: usize, array: &str) -> Vec<&QueryTreeNode> {
        self.linked(index, |node| node.downward_links.get(array))
    }

    /// Queries linked above `index` through `array`
    pub fn upward(&self, index: usize, array: &str) -> Vec<&QueryTreeNode> {
        self.linked(index, |node| node.upward_links.get(array))
    }

    fn linked<'a>(
        &'a self,
        index: usize,
        links: impl Fn(&'a QueryTreeNode) -> Option<&'a Vec<usize>>,
    ) -> Vec<&'a QueryTreeNode> {
        self.node(index)
            .and_then(links)
            .map(|targets| targets.iter().filter_map(|&i| self.node(i)).collect())
            .unwrap_or_default()
    }

    /// Every link, ordered by source, then target, then array
    pub fn edges(&self) -> Vec<Edge<'_>> {
        let mut edges: Vec<Edge<'_>> = self
            .nodes
            .iter()
            .enumerate()
            .flat_map(|(source, node)| {
                node.downward_links.iter().flat_map(move |(array, targets)| {
                    targets.iter().map(move |&target| Edge {
                        source,
                        target,
                        array: array.as_str(),
                    })
                })
            })
            .collect();
        edges.sort();
        edges
    }

    /// Use-after-delete warnings, ordered by source position
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Indented text view of the tree.
    ///
    /// Each head node is followed depth-first by the arrays it links through
    /// and the queries below them; every line carries one `-` per level.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for head in self.head_nodes() {
            self.render_node(&mut out, head, 0);
        }
        out
    }

    fn render_node(&self, out: &mut String, node: &QueryTreeNode, depth: usize) {
        let _ = writeln!(out, "{}{}", "-".repeat(depth), node.query());
        let prefix = "-".repeat(depth + 1);
        for (array, targets) in &node.downward_links {
            let _ = writeln!(out, "{prefix}{array}");
            for child in targets.iter().filter_map(|&i| self.node(i)) {
                self.render_node(out, child, depth + 1);
            }
        }
    }
}
