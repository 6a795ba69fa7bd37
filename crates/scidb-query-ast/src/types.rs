//! Expression types and identifier roles

use serde::{Deserialize, Serialize};
use std::fmt;

/// The nominal type attached to every AST node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExprType {
    /// A bare name whose meaning has not been determined
    Identifier,
    Int,
    Float,
    String,
    Bool,
    /// Any numeric value; subsumes `Int`, `Float`, `Attr` and `Dim` when matching
    Numeric,
    Array,
    Attr,
    Dim,
    Schema,
    Void,
    /// Result of a call to a function with no known signature
    Unknown,
}

impl ExprType {
    /// Check if a value of this type can stand in where a numeric is expected
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int | Self::Float | Self::Numeric | Self::Attr | Self::Dim
        )
    }

    /// Lowercase name used in messages
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Numeric => "numeric",
            Self::Array => "array",
            Self::Attr => "attr",
            Self::Dim => "dim",
            Self::Schema => "schema",
            Self::Void => "void",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The semantic role a bare identifier plays at its call site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Array,
    Attr,
    Dim,
}

impl From<Role> for ExprType {
    fn from(role: Role) -> Self {
        match role {
            Role::Array => ExprType::Array,
            Role::Attr => ExprType::Attr,
            Role::Dim => ExprType::Dim,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ExprType::from(*self).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_subsumption() {
        assert!(ExprType::Attr.is_numeric());
        assert!(ExprType::Dim.is_numeric());
        assert!(ExprType::Int.is_numeric());
        assert!(!ExprType::Identifier.is_numeric());
        assert!(!ExprType::Bool.is_numeric());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Array.to_string(), "array");
        assert_eq!(ExprType::from(Role::Dim), ExprType::Dim);
    }
}
