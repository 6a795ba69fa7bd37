//! Label assertions
//!
//! Rebuilds each node's array sets from its children's stored labels and
//! the variant's own contribution, then compares with what the parser
//! stored on the node.

use scidb_query_ast::{Literal, Node, NodeKind, Query, Role};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Check one node against its direct children
pub fn assert_node_labels(node: &Node) {
    let labels = node.labels();
    let effects = node.effects();

    let mut referenced = BTreeSet::new();
    let mut created = BTreeSet::new();
    let mut deleted = BTreeSet::new();
    let mut ambiguous = BTreeSet::new();
    let mut aliases = BTreeSet::new();
    for child in node.children() {
        let child = child.labels();
        referenced.extend(child.arrays_referenced.iter().cloned());
        created.extend(child.arrays_created.iter().cloned());
        deleted.extend(child.arrays_deleted.iter().cloned());
        ambiguous.extend(child.ambiguous_labels.iter().cloned());
        aliases.extend(child.aliased_labels.keys().cloned());
    }

    match node.kind() {
        NodeKind::Literal(Literal::Name(name)) => match node.role() {
            None => {
                ambiguous.insert(name.clone());
            }
            Some(Role::Array) => {
                referenced.insert(name.clone());
            }
            Some(Role::Attr | Role::Dim) => {}
        },
        NodeKind::ObjectAttribute { object, .. } => {
            referenced.insert(object.clone());
        }
        NodeKind::ArrayVersionRef { array, .. } => {
            referenced.insert(array.clone());
        }
        NodeKind::AsAlias { expr, alias } => {
            let target = labels
                .aliased_labels
                .get(alias)
                .unwrap_or_else(|| panic!("alias '{}' missing from '{}'", alias, node));
            assert!(
                Arc::ptr_eq(target, expr),
                "alias '{}' of '{}' does not point at its expression",
                alias,
                node
            );
            aliases.insert(alias.clone());
        }
        NodeKind::CreateArray { name, .. } => {
            created = BTreeSet::from([name.clone()]);
            referenced = BTreeSet::from([name.clone()]);
        }
        NodeKind::DropArray { name } => {
            deleted = BTreeSet::from([name.clone()]);
            referenced = BTreeSet::from([name.clone()]);
        }
        _ => {}
    }

    referenced.extend(effects.referenced.iter().cloned());
    created.extend(effects.created.iter().cloned());
    deleted.extend(effects.deleted.iter().cloned());
    for name in &effects.resolved {
        assert!(
            !labels.ambiguous_labels.contains(name),
            "'{}' resolved by '{}' is still ambiguous",
            name,
            node
        );
        ambiguous.remove(name);
    }

    assert_eq!(labels.arrays_referenced, referenced, "referenced arrays of '{}'", node);
    assert_eq!(labels.arrays_created, created, "created arrays of '{}'", node);
    assert_eq!(labels.arrays_deleted, deleted, "deleted arrays of '{}'", node);
    assert_eq!(labels.ambiguous_labels, ambiguous, "ambiguous labels of '{}'", node);
    assert_eq!(
        labels.aliased_labels.keys().cloned().collect::<BTreeSet<_>>(),
        aliases,
        "aliases of '{}'",
        node
    );
}

/// Check every node of every query
pub fn assert_query_labels(queries: &[Query]) {
    for query in queries {
        for node in query.root().walk() {
            assert_node_labels(node);
        }
    }
}
