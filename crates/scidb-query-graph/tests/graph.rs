//! Dependency graph tests over parsed query lists
//!
//! Covers:
//! - Chain linking per array
//! - Head nodes
//! - Deletion ending a chain and use-after-delete warnings
//! - Text rendering and node-link export

use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use rstest::rstest;
use scidb_query_diagnostics::{DiagnosticKind, Severity};
use scidb_query_graph::*;
use scidb_query_parser::parse;

const EXAMPLE: &str = "store(build(A,iif(A.i0=A.i1,1,0)), A); \
                       store(build(A,iif(A.i0=A.i1,2,1)), B); \
                       multiply(A, B); \
                       remove(A);";

fn graph(input: &str) -> QueryTree {
    let output = parse(input).unwrap_or_else(|e| panic!("Failed to parse '{}': {}", input, e));
    build_dependency_graph(output.queries)
}

fn edge_list(tree: &QueryTree) -> Vec<(usize, usize, String)> {
    tree.edges()
        .into_iter()
        .map(|e| (e.source, e.target, e.array.to_string()))
        .collect()
}

fn heads(tree: &QueryTree) -> Vec<usize> {
    tree.head_nodes().iter().map(|n| n.index()).collect()
}

#[test]
fn test_example_chain() {
    let tree = graph(EXAMPLE);
    assert_eq!(tree.len(), 4);
    assert_eq!(
        edge_list(&tree),
        vec![
            (0, 1, "A".to_string()),
            (1, 2, "A".to_string()),
            (1, 2, "B".to_string()),
            (2, 3, "A".to_string()),
        ]
    );
    // the deleting query ends the chain
    assert!(tree.node(3).expect("node").downward_links().is_empty());
    assert!(tree.diagnostics().is_empty());
}

#[test]
fn test_example_head_nodes() {
    let tree = graph(EXAMPLE);
    assert_eq!(heads(&tree), vec![0]);
    for index in 1..4 {
        assert!(
            !tree.node(index).expect("node").upward_links().is_empty(),
            "query {} should have an incoming link",
            index
        );
    }
}

#[test]
fn test_links_are_symmetric() {
    let tree = graph(EXAMPLE);
    let below: Vec<_> = tree.downward(1, "B").iter().map(|n| n.index()).collect();
    let above: Vec<_> = tree.upward(2, "B").iter().map(|n| n.index()).collect();
    assert_eq!(below, vec![2]);
    assert_eq!(above, vec![1]);
    assert!(tree.downward(3, "A").is_empty());
}

#[test]
fn test_chain_skips_unrelated_queries() {
    let tree = graph("scan(A); scan(B); scan(C); scan(A)");
    assert_eq!(edge_list(&tree), vec![(0, 3, "A".to_string())]);
    assert_eq!(heads(&tree), vec![0, 1, 2]);
}

#[test]
fn test_sink_arrays_have_no_edges() {
    let tree = graph("store(build(<v:int64>[i=0:9,10,0], i), X); scan(Y)");
    assert!(tree.edges().is_empty());
    assert_eq!(heads(&tree), vec![0, 1]);
}

#[test]
fn test_mentions_after_delete_are_not_linked() {
    let tree = graph(
        "store(build(A, 1), A); remove(A); scan(A); store(build(A, 2), A); scan(A)",
    );
    assert_eq!(
        edge_list(&tree),
        vec![
            (0, 1, "A".to_string()),
            (2, 3, "A".to_string()),
            (3, 4, "A".to_string()),
        ]
    );
    assert_eq!(heads(&tree), vec![0, 2]);

    let diagnostics = tree.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), Some(DiagnosticKind::UseAfterDelete));
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(
        diagnostics[0].message,
        "query 2 references array 'A' deleted by query 1"
    );
}

#[rstest]
#[case("DROP ARRAY A; DROP ARRAY A", 1)]
#[case("remove(A); CREATE ARRAY A <v:int64>[i=0:9,10,0]; scan(A)", 0)]
#[case("remove(A); store(scan(B), A)", 0)]
#[case("remove(A); remove(B); multiply(A, B)", 2)]
fn test_use_after_delete_count(#[case] input: &str, #[case] expected: usize) {
    assert_eq!(graph(input).diagnostics().len(), expected);
}

#[test]
fn test_aql_statements_link() {
    let tree = graph(
        "CREATE ARRAY A <v:int64>[i=0:9,10,0]; store(build(A, i), A); DROP ARRAY A",
    );
    assert_eq!(
        edge_list(&tree),
        vec![(0, 1, "A".to_string()), (1, 2, "A".to_string())]
    );
}

#[test]
fn test_render_example() {
    assert_snapshot!(graph(EXAMPLE).render(), @r"
    store(build(A, iif(A.i0 = A.i1, 1, 0)), A)
    -A
    -store(build(A, iif(A.i0 = A.i1, 2, 1)), B)
    --A
    --multiply(A, B)
    ---A
    ---remove(A)
    --B
    --multiply(A, B)
    ---A
    ---remove(A)
    ");
}

#[test]
fn test_node_link_by_index() {
    let tree = graph("scan(A); scan(A); scan(B)");
    let export = tree.to_node_link(&ExportOptions::new());
    assert!(export.directed);
    assert!(!export.multigraph);
    assert_eq!(export.nodes.len(), 3);
    assert_eq!(
        export.links,
        vec![GraphLink {
            source: NodeId::Index(0),
            target: NodeId::Index(1),
            array: "A".into()
        }]
    );
}

#[test]
fn test_node_link_string_labels() {
    let tree = graph(EXAMPLE);
    let export = tree.to_node_link(&ExportOptions::new().string_labels(true));
    // 1 -> 2 is linked on both A and B
    assert!(export.multigraph);
    assert_eq!(export.nodes.len(), 4);
    assert_eq!(
        export.nodes[2].id,
        NodeId::Label("multiply(A, B)".to_string())
    );
}

#[test]
fn test_string_labels_merge_identical_queries() {
    let tree = graph("scan(A); scan(A)");
    let export = tree.to_node_link(&ExportOptions::new().string_labels(true));
    assert_eq!(export.nodes.len(), 1);
    assert_eq!(export.links[0].source, export.links[0].target);
}

#[test]
fn test_to_json() {
    let json = graph("scan(A); remove(A)")
        .to_json(&ExportOptions::new().string_labels(true))
        .expect("json");
    assert_snapshot!(
        json,
        @r#"{"directed":true,"multigraph":false,"graph":{},"nodes":[{"id":"scan(A)"},{"id":"remove(A)"}],"links":[{"source":"scan(A)","target":"remove(A)","array":"A"}]}"#
    );
}
