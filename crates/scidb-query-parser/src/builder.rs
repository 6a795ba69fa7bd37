//! Node construction and identifier disambiguation
//!
//! The parser hands every reduced production to [`NodeBuilder`]. Plain
//! productions only fold their children's labels; call-like productions
//! (function calls, binary and unary operators) additionally consult the
//! signature table to check their arguments and to resolve which bare
//! identifiers name arrays, attributes or dimensions.

use crate::ParseOptions;
use scidb_query_ast::{
    AttrSpec, BinaryOp, DimSpec, Effects, ExprType, Literal, Node, NodeKind, Role, UnaryOp,
};
use scidb_query_diagnostics::{
    Diagnostic, LineIndex, RelatedInfo, SDB0101, SDB0110, SDB0120, Severity, SourceLocation,
    Span, sort_diagnostics,
};
use scidb_query_types::{ArgumentMatch, FunctionSignature, SignatureTable};
use std::sync::Arc;

pub(crate) struct NodeBuilder<'t, 'src> {
    signatures: &'t SignatureTable,
    options: ParseOptions,
    lines: LineIndex<'src>,
    diagnostics: Vec<Diagnostic>,
}

impl<'t, 'src> NodeBuilder<'t, 'src> {
    pub(crate) fn new(signatures: &'t SignatureTable, options: ParseOptions, source: &'src str) -> Self {
        Self {
            signatures,
            options,
            lines: LineIndex::new(source),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn location(&self, span: Span) -> SourceLocation {
        self.lines.location(span)
    }

    /// Collected diagnostics, ordered by source position
    pub(crate) fn into_diagnostics(mut self) -> Vec<Diagnostic> {
        sort_diagnostics(&mut self.diagnostics);
        self.diagnostics
    }

    pub(crate) fn literal(&self, literal: Literal, span: Span) -> Node {
        let expr_type = literal.expr_type();
        Node::new(NodeKind::Literal(literal), expr_type, span)
    }

    pub(crate) fn object_attribute(&self, object: &str, attribute: &str, span: Span) -> Node {
        Node::new(
            NodeKind::ObjectAttribute {
                object: object.to_string(),
                attribute: attribute.to_string(),
            },
            ExprType::Attr,
            span,
        )
    }

    pub(crate) fn version_ref(&self, array: &str, version: i64, span: Span) -> Node {
        Node::new(
            NodeKind::ArrayVersionRef {
                array: array.to_string(),
                version,
            },
            ExprType::Array,
            span,
        )
    }

    pub(crate) fn group(&self, inner: Node, span: Span) -> Node {
        let expr_type = inner.expr_type();
        Node::new(NodeKind::Group(Box::new(inner)), expr_type, span)
    }

    pub(crate) fn alias(&self, expr: Node, alias: &str, span: Span) -> Node {
        let expr_type = expr.expr_type();
        Node::new(
            NodeKind::AsAlias {
                expr: Arc::new(expr),
                alias: alias.to_string(),
            },
            expr_type,
            span,
        )
    }

    pub(crate) fn attr_spec(&self, spec: AttrSpec, span: Span) -> Node {
        Node::new(NodeKind::AttrSpec(spec), ExprType::Void, span)
    }

    pub(crate) fn dim_spec(&self, spec: DimSpec, span: Span) -> Node {
        Node::new(NodeKind::DimSpec(spec), ExprType::Void, span)
    }

    pub(crate) fn array_spec(&self, attributes: Vec<Node>, dimensions: Vec<Node>, span: Span) -> Node {
        Node::new(
            NodeKind::ArraySpec {
                attributes,
                dimensions,
            },
            ExprType::Schema,
            span,
        )
    }

    pub(crate) fn create_array(&self, name: &str, schema: Node, span: Span) -> Node {
        Node::new(
            NodeKind::CreateArray {
                name: name.to_string(),
                schema: Box::new(schema),
            },
            ExprType::Void,
            span,
        )
    }

    pub(crate) fn drop_array(&self, name: &str, span: Span) -> Node {
        Node::new(
            NodeKind::DropArray {
                name: name.to_string(),
            },
            ExprType::Void,
            span,
        )
    }

    pub(crate) fn call(&mut self, name: &str, mut args: Vec<Node>, span: Span) -> Node {
        let signatures = self.signatures;
        let signature = signatures.function(name);
        let (expr_type, mut effects) = self.disambiguate(name, signature, &mut args, span);
        apply_array_effects(name, &mut args, &mut effects);
        Node::with_effects(
            NodeKind::FunctionCall {
                name: name.to_string(),
                args,
            },
            expr_type,
            span,
            effects,
        )
    }

    pub(crate) fn binary(&mut self, op: BinaryOp, left: Node, right: Node, span: Span) -> Node {
        let signatures = self.signatures;
        let signature = signatures.binary_op(op.symbol());
        let mut args = [left, right];
        let (expr_type, effects) = self.disambiguate(op.symbol(), signature, &mut args, span);
        let [left, right] = args;
        Node::with_effects(
            NodeKind::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            expr_type,
            span,
            effects,
        )
    }

    pub(crate) fn unary(&mut self, op: UnaryOp, operand: Node, span: Span) -> Node {
        let signatures = self.signatures;
        let signature = signatures.unary_op(op.symbol());
        let mut args = [operand];
        let (expr_type, effects) = self.disambiguate(op.symbol(), signature, &mut args, span);
        let [operand] = args;
        Node::with_effects(
            NodeKind::UnaryOp {
                op,
                operand: Box::new(operand),
            },
            expr_type,
            span,
            effects,
        )
    }

    /// Report identifiers still ambiguous at the top of a query
    pub(crate) fn finish_query(&mut self, index: usize, root: &Node) {
        if !self.options.report_unresolved {
            return;
        }
        let location = self.location(root.span());
        for name in root.ambiguous_labels() {
            self.diagnostics.push(
                Diagnostic::info(
                    SDB0120,
                    format!("identifier '{name}' in query {index} could not be resolved"),
                )
                .with_location(location.clone()),
            );
        }
    }

    /// Check the arguments of a call-like node and resolve identifier roles.
    ///
    /// Returns the node's type and the label changes the call makes.
    fn disambiguate(
        &mut self,
        name: &str,
        signature: Option<&FunctionSignature>,
        args: &mut [Node],
        span: Span,
    ) -> (ExprType, Effects) {
        let Some(signature) = signature else {
            log::debug!("unknown function '{}'", name);
            let diagnostic = Diagnostic::warning(SDB0101, format!("unknown function '{name}'"))
                .with_location(self.location(span));
            self.diagnostics.push(diagnostic);
            return (ExprType::Unknown, Effects::default());
        };

        let actual: Vec<ExprType> = args.iter().map(Node::expr_type).collect();
        let matched = signature.match_args(&actual);
        if !matched.is_match() {
            self.report_mismatch(name, signature, args, &matched, span);
        }

        let mut effects = Effects::default();
        for (arg, expected) in args.iter_mut().zip(&matched.expected) {
            let Some(role) = expected.and_then(|accepted| accepted.role()) else {
                continue;
            };
            if let Some(resolved) = arg.assign_role(role) {
                effects.resolved.insert(resolved.to_string());
            }
        }

        (signature.return_type.expr_type(), effects)
    }

    fn report_mismatch(
        &mut self,
        name: &str,
        signature: &FunctionSignature,
        args: &[Node],
        matched: &ArgumentMatch,
        span: Span,
    ) {
        log::debug!(
            "signature mismatch for '{}': arity_ok={} positions={:?}",
            name,
            matched.arity_ok,
            matched.mismatched
        );

        let mut problems = Vec::new();
        if !matched.arity_ok {
            problems.push(format!("does not accept {} argument(s)", args.len()));
        }
        if !matched.mismatched.is_empty() {
            let positions: Vec<String> = matched.mismatched.iter().map(ToString::to_string).collect();
            problems.push(format!("argument type mismatch at position(s) {}", positions.join(", ")));
        }

        let severity = if self.options.strict_signatures {
            Severity::Error
        } else {
            Severity::Warning
        };
        let mut diagnostic = Diagnostic::new(severity, SDB0110, format!("'{name}' {}", problems.join("; ")))
            .with_location(self.location(span))
            .with_help(format!("expected {signature}"));

        for &position in &matched.mismatched {
            let arg = &args[position];
            let expected = matched.expected[position]
                .map_or_else(|| "no argument".to_string(), |accepted| accepted.to_string());
            diagnostic = diagnostic.with_related(
                RelatedInfo::new(format!(
                    "argument {position} has type {}, expected {expected}",
                    arg.expr_type()
                ))
                .with_location(self.location(arg.span())),
            );
        }

        self.diagnostics.push(diagnostic);
    }
}

/// Array side effects of `remove` and `store`, applied whether or not the
/// signature table knows these names.
fn apply_array_effects(name: &str, args: &mut [Node], effects: &mut Effects) {
    match (name, args) {
        ("remove", [target]) => {
            if let Some(array) = claim_array(target, effects) {
                effects.deleted.insert(array);
            }
        }
        ("store", [_, target]) => {
            if let Some(array) = claim_array(target, effects) {
                effects.created.insert(array);
            }
        }
        _ => {}
    }
}

/// The array named by `target`, resolving a bare identifier to the array role
fn claim_array(target: &mut Node, effects: &mut Effects) -> Option<String> {
    if let NodeKind::ArrayVersionRef { array, .. } = target.kind() {
        return Some(array.clone());
    }
    if target.role() == Some(Role::Array) {
        return target.bare_name().map(str::to_string);
    }
    let name = target.assign_role(Role::Array)?.to_string();
    effects.resolved.insert(name.clone());
    effects.referenced.insert(name.clone());
    Some(name)
}
