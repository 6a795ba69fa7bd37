//! AST nodes and the label envelope they share
//!
//! Every production builds a [`Node`]: a closed [`NodeKind`] variant wrapped
//! in an envelope holding the node's type, source span and aggregate
//! [`Labels`]. Labels are computed once, at construction, by folding the
//! labels of the already-built children and adding the node's own local
//! contribution.

use crate::{BinaryOp, ExprType, Role, UnaryOp};
use scidb_query_diagnostics::Span;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Literal values and bare names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Integer(i64),
    /// Float literal, kept as written so `2.` prints back as `2.`
    Float(String),
    /// String literal with its delimiter (`'` or `"`)
    String { value: String, quote: char },
    /// Bare identifier
    Name(String),
}

impl Literal {
    /// The nominal type of this literal
    pub const fn expr_type(&self) -> ExprType {
        match self {
            Self::Integer(_) => ExprType::Int,
            Self::Float(_) => ExprType::Float,
            Self::String { .. } => ExprType::String,
            Self::Name(_) => ExprType::Identifier,
        }
    }
}

/// Attribute declaration inside an array schema: `name:type [null]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSpec {
    pub name: String,
    pub type_name: String,
    pub nullable: bool,
}

/// Upper bound of a dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimBound {
    Bounded(i64),
    /// Written as `*`
    Unbounded,
}

/// Dimension declaration inside an array schema: `name=lo:hi,chunk,overlap`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimSpec {
    pub name: String,
    pub low: i64,
    pub high: DimBound,
    pub chunk: i64,
    pub overlap: i64,
}

/// One case per grammar production
#[derive(Debug, Clone)]
pub enum NodeKind {
    Literal(Literal),
    /// `object.attribute`
    ObjectAttribute { object: String, attribute: String },
    /// `array@version`
    ArrayVersionRef { array: String, version: i64 },
    FunctionCall { name: String, args: Vec<Node> },
    BinaryOp {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    UnaryOp { op: UnaryOp, operand: Box<Node> },
    /// Parenthesised expression
    Group(Box<Node>),
    /// `expr AS alias`; the aliased node is shared with `aliased_labels`
    AsAlias { expr: Arc<Node>, alias: String },
    AttrSpec(AttrSpec),
    DimSpec(DimSpec),
    /// `<attributes>[dimensions]`; children are `AttrSpec` and `DimSpec` nodes
    ArraySpec {
        attributes: Vec<Node>,
        dimensions: Vec<Node>,
    },
    /// `CREATE ARRAY name schema`
    CreateArray { name: String, schema: Box<Node> },
    /// `DROP ARRAY name`
    DropArray { name: String },
}

impl NodeKind {
    /// Direct AST children, in source order
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Self::Literal(_)
            | Self::ObjectAttribute { .. }
            | Self::ArrayVersionRef { .. }
            | Self::AttrSpec(_)
            | Self::DimSpec(_)
            | Self::DropArray { .. } => Vec::new(),
            Self::FunctionCall { args, .. } => args.iter().collect(),
            Self::BinaryOp { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Self::UnaryOp { operand, .. } => vec![operand.as_ref()],
            Self::Group(inner) => vec![inner.as_ref()],
            Self::AsAlias { expr, .. } => vec![expr.as_ref()],
            Self::ArraySpec {
                attributes,
                dimensions,
            } => attributes.iter().chain(dimensions.iter()).collect(),
            Self::CreateArray { schema, .. } => vec![schema.as_ref()],
        }
    }
}

/// Aggregate array bookkeeping carried by every node
#[derive(Debug, Clone, Default)]
pub struct Labels {
    pub arrays_referenced: BTreeSet<String>,
    pub arrays_created: BTreeSet<String>,
    pub arrays_deleted: BTreeSet<String>,
    /// Alias name to the node it names
    pub aliased_labels: BTreeMap<String, Arc<Node>>,
    /// Bare identifiers whose array/attribute/dimension role is undetermined
    pub ambiguous_labels: BTreeSet<String>,
}

impl Labels {
    /// Union the sets and overlay the alias map of `other` onto `self`
    pub fn absorb(&mut self, other: &Labels) {
        self.arrays_referenced
            .extend(other.arrays_referenced.iter().cloned());
        self.arrays_created
            .extend(other.arrays_created.iter().cloned());
        self.arrays_deleted
            .extend(other.arrays_deleted.iter().cloned());
        self.aliased_labels.extend(
            other
                .aliased_labels
                .iter()
                .map(|(name, node)| (name.clone(), Arc::clone(node))),
        );
        self.ambiguous_labels
            .extend(other.ambiguous_labels.iter().cloned());
    }
}

impl PartialEq for Labels {
    fn eq(&self, other: &Self) -> bool {
        self.arrays_referenced == other.arrays_referenced
            && self.arrays_created == other.arrays_created
            && self.arrays_deleted == other.arrays_deleted
            && self.ambiguous_labels == other.ambiguous_labels
            && self.aliased_labels.len() == other.aliased_labels.len()
            && self
                .aliased_labels
                .iter()
                .zip(other.aliased_labels.iter())
                .all(|((a, x), (b, y))| a == b && Arc::ptr_eq(x, y))
    }
}

/// Label changes a call-like production makes on top of the generic fold.
///
/// The disambiguator fills this in when it resolves argument roles and when a
/// call has array side effects (`store`, `remove`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effects {
    pub referenced: BTreeSet<String>,
    pub created: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
    /// Names removed from the aggregated `ambiguous_labels`
    pub resolved: BTreeSet<String>,
}

impl Effects {
    pub fn is_empty(&self) -> bool {
        self.referenced.is_empty()
            && self.created.is_empty()
            && self.deleted.is_empty()
            && self.resolved.is_empty()
    }
}

/// A typed AST node
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    expr_type: ExprType,
    role: Option<Role>,
    effects: Effects,
    labels: Labels,
    span: Span,
}

impl Node {
    /// Build a node whose labels come from the generic fold alone
    pub fn new(kind: NodeKind, expr_type: ExprType, span: Span) -> Self {
        Self::with_effects(kind, expr_type, span, Effects::default())
    }

    /// Build a node with production-specific label changes
    pub fn with_effects(kind: NodeKind, expr_type: ExprType, span: Span, effects: Effects) -> Self {
        let mut node = Self {
            kind,
            expr_type,
            role: None,
            effects,
            labels: Labels::default(),
            span,
        };
        node.labels = node.recompute_labels();
        node
    }

    /// Derive this node's labels from its children, its variant and its effects
    fn recompute_labels(&self) -> Labels {
        let mut labels = Labels::default();
        for child in self.kind.children() {
            labels.absorb(&child.labels);
        }

        match &self.kind {
            NodeKind::Literal(Literal::Name(name)) => match self.role {
                None => {
                    labels.ambiguous_labels.insert(name.clone());
                }
                Some(Role::Array) => {
                    labels.arrays_referenced.insert(name.clone());
                }
                Some(Role::Attr | Role::Dim) => {}
            },
            NodeKind::ObjectAttribute { object, .. } => {
                labels.arrays_referenced.insert(object.clone());
            }
            NodeKind::ArrayVersionRef { array, .. } => {
                labels.arrays_referenced.insert(array.clone());
            }
            NodeKind::AsAlias { expr, alias } => {
                labels
                    .aliased_labels
                    .insert(alias.clone(), Arc::clone(expr));
            }
            NodeKind::CreateArray { name, .. } => {
                labels.arrays_created = BTreeSet::from([name.clone()]);
                labels.arrays_referenced = BTreeSet::from([name.clone()]);
            }
            NodeKind::DropArray { name } => {
                labels.arrays_deleted = BTreeSet::from([name.clone()]);
                labels.arrays_referenced = BTreeSet::from([name.clone()]);
            }
            _ => {}
        }

        let effects = &self.effects;
        labels
            .arrays_referenced
            .extend(effects.referenced.iter().cloned());
        labels
            .arrays_created
            .extend(effects.created.iter().cloned());
        labels
            .arrays_deleted
            .extend(effects.deleted.iter().cloned());
        for name in &effects.resolved {
            labels.ambiguous_labels.remove(name);
        }

        labels
    }

    /// Record the role a bare identifier plays at its call site.
    ///
    /// Only unresolved bare names accept a role; the nominal type stays
    /// `Identifier`. Returns the resolved name, or `None` if the node is not
    /// an unresolved bare name.
    pub fn assign_role(&mut self, role: Role) -> Option<&str> {
        if self.role.is_some() || self.expr_type != ExprType::Identifier {
            return None;
        }
        if !matches!(self.kind, NodeKind::Literal(Literal::Name(_))) {
            return None;
        }
        self.role = Some(role);
        self.labels = self.recompute_labels();
        self.bare_name()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Nominal value type
    pub fn expr_type(&self) -> ExprType {
        self.expr_type
    }

    /// Role resolved from the enclosing call's signature, if any
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// The resolved role as a type when present, otherwise the nominal type
    pub fn effective_type(&self) -> ExprType {
        self.role.map_or(self.expr_type, ExprType::from)
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn children(&self) -> Vec<&Node> {
        self.kind.children()
    }

    /// The identifier if this node is a bare name
    pub fn bare_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Literal(Literal::Name(name)) => Some(name),
            _ => None,
        }
    }

    /// Function name if this node is a call
    pub fn call_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::FunctionCall { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn arrays_referenced(&self) -> &BTreeSet<String> {
        &self.labels.arrays_referenced
    }

    pub fn arrays_created(&self) -> &BTreeSet<String> {
        &self.labels.arrays_created
    }

    pub fn arrays_deleted(&self) -> &BTreeSet<String> {
        &self.labels.arrays_deleted
    }

    pub fn aliased_labels(&self) -> &BTreeMap<String, Arc<Node>> {
        &self.labels.aliased_labels
    }

    pub fn ambiguous_labels(&self) -> &BTreeSet<String> {
        &self.labels.ambiguous_labels
    }

    /// Pre-order walk over this node and all its descendants
    pub fn walk(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            let children = node.children();
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str) -> Node {
        Node::new(
            NodeKind::Literal(Literal::Name(text.to_string())),
            ExprType::Identifier,
            Span::default(),
        )
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_bare_name_is_ambiguous() {
        let node = name("A");
        assert_eq!(node.ambiguous_labels(), &set(&["A"]));
        assert!(node.arrays_referenced().is_empty());
    }

    #[test]
    fn test_assign_array_role() {
        let mut node = name("A");
        assert_eq!(node.assign_role(Role::Array), Some("A"));
        assert_eq!(node.expr_type(), ExprType::Identifier);
        assert_eq!(node.effective_type(), ExprType::Array);
        assert_eq!(node.arrays_referenced(), &set(&["A"]));
        assert!(node.ambiguous_labels().is_empty());

        // a role is assigned at most once
        assert_eq!(node.assign_role(Role::Attr), None);
    }

    #[test]
    fn test_assign_attr_role_only_clears_ambiguity() {
        let mut node = name("x");
        node.assign_role(Role::Attr);
        assert!(node.ambiguous_labels().is_empty());
        assert!(node.arrays_referenced().is_empty());
    }

    #[test]
    fn test_object_attribute_references_object() {
        let node = Node::new(
            NodeKind::ObjectAttribute {
                object: "A".into(),
                attribute: "i0".into(),
            },
            ExprType::Attr,
            Span::default(),
        );
        assert_eq!(node.arrays_referenced(), &set(&["A"]));
        assert!(node.ambiguous_labels().is_empty());
    }

    #[test]
    fn test_fold_unions_children_and_applies_effects() {
        let call = Node::with_effects(
            NodeKind::FunctionCall {
                name: "store".into(),
                args: vec![name("A"), name("B")],
            },
            ExprType::Array,
            Span::default(),
            Effects {
                created: set(&["B"]),
                referenced: set(&["B"]),
                resolved: set(&["B"]),
                ..Effects::default()
            },
        );
        assert_eq!(call.ambiguous_labels(), &set(&["A"]));
        assert_eq!(call.arrays_created(), &set(&["B"]));
        assert_eq!(call.arrays_referenced(), &set(&["B"]));
        assert!(call.arrays_deleted().is_empty());
    }

    #[test]
    fn test_alias_shares_inner_node() {
        let inner = Arc::new(name("x"));
        let alias = Node::new(
            NodeKind::AsAlias {
                expr: Arc::clone(&inner),
                alias: "y".into(),
            },
            inner.expr_type(),
            Span::default(),
        );
        let bound = &alias.aliased_labels()["y"];
        assert!(Arc::ptr_eq(bound, &inner));
        assert_eq!(alias.ambiguous_labels(), &set(&["x"]));
    }

    #[test]
    fn test_drop_array_sets_deleted_and_referenced() {
        let node = Node::new(
            NodeKind::DropArray { name: "B".into() },
            ExprType::Void,
            Span::default(),
        );
        assert_eq!(node.arrays_deleted(), &set(&["B"]));
        assert_eq!(node.arrays_referenced(), &set(&["B"]));
        assert!(node.arrays_created().is_empty());
    }

    #[test]
    fn test_walk_is_pre_order() {
        let call = Node::new(
            NodeKind::FunctionCall {
                name: "f".into(),
                args: vec![name("a"), name("b")],
            },
            ExprType::Unknown,
            Span::default(),
        );
        let names: Vec<_> = call
            .walk()
            .iter()
            .map(|n| n.bare_name().or(n.call_name()).unwrap_or("?").to_string())
            .collect();
        assert_eq!(names, vec!["f", "a", "b"]);
    }
}
