//! Query operators with precedence information

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operators with their precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Precedence 1 (lowest) - non-associative
    /// Equality
    Equal,
    /// Inequality (`<>`)
    NotEqual,
    /// Less than
    Less,
    /// Less than or equal
    LessOrEqual,
    /// Greater than
    Greater,
    /// Greater than or equal
    GreaterOrEqual,

    // Precedence 2 - left-associative
    /// Addition
    Add,
    /// Subtraction
    Subtract,

    // Precedence 3 - left-associative
    /// Multiplication
    Multiply,
    /// Division
    Divide,
    /// Modulo
    Modulo,
}

impl BinaryOp {
    /// Get the precedence level (1-3, higher binds tighter)
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Equal
            | Self::NotEqual
            | Self::Less
            | Self::LessOrEqual
            | Self::Greater
            | Self::GreaterOrEqual => 1,
            Self::Add | Self::Subtract => 2,
            Self::Multiply | Self::Divide | Self::Modulo => 3,
        }
    }

    /// Check if this is a comparison operator
    pub const fn is_comparison(&self) -> bool {
        self.precedence() == 1
    }

    /// Get the operator symbol, which is also its signature table key
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators, binding tighter than any binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Unary minus (negation)
    Negate,
}

impl UnaryOp {
    /// Get the operator symbol
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Negate => "-",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
