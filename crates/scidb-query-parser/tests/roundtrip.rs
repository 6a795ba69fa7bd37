//! Canonical text tests
//!
//! Printing a parsed query and parsing the text again must give the same
//! text back. Generated expressions cover operator nesting; snapshots pin
//! the canonical spelling of every production.

use insta::assert_snapshot;
use proptest::prelude::*;
use scidb_query_parser::{parse, parse_expression};

mod common;
use common::assert_query_labels;

fn canonical(input: &str) -> String {
    parse(input)
        .unwrap_or_else(|e| panic!("Failed to parse '{}': {}", input, e))
        .queries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";\n")
}

#[test]
fn test_canonical_afl() {
    assert_snapshot!(
        canonical("store(build(A,iif(A.i0=A.i1,1,0)),A)"),
        @"store(build(A, iif(A.i0 = A.i1, 1, 0)), A)"
    );
    assert_snapshot!(
        canonical("apply( A , s , (x+y)*-2 AS t , v % 3 )"),
        @"apply(A, s, (x + y) * -2 as t, v % 3)"
    );
    assert_snapshot!(
        canonical("filter(A@2, x<>'n/a'); subarray(B, 0, 2.)"),
        @r"
    filter(A@2, x <> 'n/a');
    subarray(B, 0, 2.)
    "
    );
}

#[test]
fn test_canonical_aql() {
    assert_snapshot!(
        canonical("CREATE ARRAY distance <miles:double> [i=0:9,10,0];"),
        @"CREATE ARRAY distance <miles:double>[i=0:9,10,0]"
    );
    assert_snapshot!(
        canonical("create array M <v:double NULL,w:int64>[i=-4:*,1000,0,j=0:99,10,2]; drop array M"),
        @r"
    CREATE ARRAY M <v:double null, w:int64>[i=-4:*,1000,0, j=0:99,10,2];
    DROP ARRAY M
    "
    );
}

#[test]
fn test_unbounded_dimension_round_trip() {
    let text = canonical("CREATE ARRAY U <v:int64>[i=0:*,100,0]");
    assert!(text.contains("i=0:*,100,0"));
    assert_eq!(canonical(&text), text);
}

#[test]
fn test_multi_query_round_trip() {
    let text = canonical(
        "store(build(A,iif(A.i0=A.i1,1,0)), A); \
         store(build(A,iif(A.i0=A.i1,2,1)), B); \
         multiply(A, B); \
         remove(A);",
    );
    assert_eq!(canonical(&text), text);
}

fn name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "x", "v0", "A", "i_1"]).prop_map(String::from)
}

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        name(),
        (0i64..10_000).prop_map(|n| n.to_string()),
        "[0-9]{1,3}\\.[0-9]{0,2}",
        "'[a-z ]{0,6}'",
        (name(), name()).prop_map(|(o, a)| format!("{o}.{a}")),
        (name(), 0i64..20).prop_map(|(a, v)| format!("{a}@{v}")),
    ]
}

fn expression() -> impl Strategy<Value = String> {
    leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            (inner.clone(), prop::sample::select(vec!["+", "-", "*", "/", "%"]), inner.clone())
                .prop_map(|(l, op, r)| format!("{l} {op} {r}")),
            (
                inner.clone(),
                prop::sample::select(vec!["=", "<>", "<", "<=", ">", ">="]),
                inner.clone()
            )
                .prop_map(|(l, op, r)| format!("({l} {op} {r})")),
            inner.clone().prop_map(|e| format!("-{e}")),
            inner.clone().prop_map(|e| format!("({e})")),
            (
                prop::sample::select(vec!["sqrt", "iif", "frob", "scan"]),
                prop::collection::vec(inner, 0..3)
            )
                .prop_map(|(f, args)| format!("{f}({})", args.join(", "))),
        ]
    })
}

proptest! {
    #[test]
    fn prop_expression_text_is_a_fixed_point(source in expression()) {
        let first = parse_expression(&source)
            .unwrap_or_else(|e| panic!("generated '{}' failed: {}", source, e));
        let text = first.to_string();
        let second = parse_expression(&text)
            .unwrap_or_else(|e| panic!("canonical '{}' failed: {}", text, e));
        prop_assert_eq!(second.to_string(), text);
    }

    #[test]
    fn prop_labels_hold_for_generated_queries(source in expression()) {
        let query = format!("apply(A, t, {source} as s)");
        let output = parse(&query).unwrap_or_else(|e| panic!("'{}' failed: {}", query, e));
        assert_query_labels(&output.queries);
    }
}
