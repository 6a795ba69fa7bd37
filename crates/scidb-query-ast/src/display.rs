//! Canonical text reconstruction
//!
//! Printing a parsed tree and parsing the result again yields the same text.

use crate::{AttrSpec, DimBound, DimSpec, Literal, Node, NodeKind};
use std::fmt;

fn write_list(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{node}")?;
    }
    Ok(())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(text) | Self::Name(text) => f.write_str(text),
            Self::String { value, quote } => write!(f, "{quote}{value}{quote}"),
        }
    }
}

impl fmt::Display for AttrSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.type_name)?;
        if self.nullable {
            f.write_str(" null")?;
        }
        Ok(())
    }
}

impl fmt::Display for DimBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(value) => write!(f, "{value}"),
            Self::Unbounded => f.write_str("*"),
        }
    }
}

impl fmt::Display for DimSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}:{},{},{}",
            self.name, self.low, self.high, self.chunk, self.overlap
        )
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Literal(literal) => write!(f, "{literal}"),
            NodeKind::ObjectAttribute { object, attribute } => write!(f, "{object}.{attribute}"),
            NodeKind::ArrayVersionRef { array, version } => write!(f, "{array}@{version}"),
            NodeKind::FunctionCall { name, args } => {
                write!(f, "{name}(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            NodeKind::BinaryOp { op, left, right } => write!(f, "{left} {op} {right}"),
            NodeKind::UnaryOp { op, operand } => write!(f, "{op}{operand}"),
            NodeKind::Group(inner) => write!(f, "({inner})"),
            NodeKind::AsAlias { expr, alias } => write!(f, "{expr} as {alias}"),
            NodeKind::AttrSpec(spec) => write!(f, "{spec}"),
            NodeKind::DimSpec(spec) => write!(f, "{spec}"),
            NodeKind::ArraySpec {
                attributes,
                dimensions,
            } => {
                f.write_str("<")?;
                write_list(f, attributes)?;
                f.write_str(">[")?;
                write_list(f, dimensions)?;
                f.write_str("]")
            }
            NodeKind::CreateArray { name, schema } => write!(f, "CREATE ARRAY {name} {schema}"),
            NodeKind::DropArray { name } => write!(f, "DROP ARRAY {name}"),
        }
    }
}
