//! Function and operator signatures

use scidb_query_ast::{ExprType, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared argument or return type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArgType {
    Void,
    Bool,
    Numeric,
    Array,
    Schema,
    Attr,
    Dim,
}

impl ArgType {
    /// All argument types, in display order
    pub const ALL: [ArgType; 7] = [
        Self::Void,
        Self::Bool,
        Self::Numeric,
        Self::Array,
        Self::Schema,
        Self::Attr,
        Self::Dim,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bool => "bool",
            Self::Numeric => "numeric",
            Self::Array => "array",
            Self::Schema => "schema",
            Self::Attr => "attr",
            Self::Dim => "dim",
        }
    }

    /// The node type a call declared to return this type produces
    pub const fn expr_type(&self) -> ExprType {
        match self {
            Self::Void => ExprType::Void,
            Self::Bool => ExprType::Bool,
            Self::Numeric => ExprType::Numeric,
            Self::Array => ExprType::Array,
            Self::Schema => ExprType::Schema,
            Self::Attr => ExprType::Attr,
            Self::Dim => ExprType::Dim,
        }
    }

    /// The identifier role this type pins down, if it is a role type
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::Array => Some(Role::Array),
            Self::Attr => Some(Role::Attr),
            Self::Dim => Some(Role::Dim),
            _ => None,
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of types accepted at one argument position, written `a|b` in definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ArgTypeSet(u8);

impl ArgTypeSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn single(ty: ArgType) -> Self {
        Self(ty.bit())
    }

    pub const fn with(self, ty: ArgType) -> Self {
        Self(self.0 | ty.bit())
    }

    pub const fn contains(&self, ty: ArgType) -> bool {
        self.0 & ty.bit() != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = ArgType> + '_ {
        ArgType::ALL.into_iter().filter(|ty| self.contains(*ty))
    }

    /// Check if a node of type `ty` may appear where this set is declared.
    ///
    /// Unresolved identifiers and results of unknown calls are accepted by
    /// anything except `void`, since their real type is not known yet.
    pub fn accepts(&self, ty: ExprType) -> bool {
        match ty {
            ExprType::Identifier | ExprType::Unknown => !self.without(ArgType::Void).is_empty(),
            ExprType::Int | ExprType::Float | ExprType::Numeric => self.contains(ArgType::Numeric),
            ExprType::Attr => self.contains(ArgType::Attr) || self.contains(ArgType::Numeric),
            ExprType::Dim => self.contains(ArgType::Dim) || self.contains(ArgType::Numeric),
            ExprType::Bool => self.contains(ArgType::Bool),
            ExprType::Array => self.contains(ArgType::Array),
            ExprType::Schema => self.contains(ArgType::Schema),
            ExprType::Void => self.contains(ArgType::Void),
            ExprType::String => false,
        }
    }

    /// The single identifier role this set admits.
    ///
    /// Non-role types are ignored, so `array|schema` yields `Array` while
    /// `attr|dim` and `numeric` yield nothing. A name in an `array|schema`
    /// slot is therefore resolved as an array on purpose, since a bare
    /// identifier there can only name one.
    pub fn role(&self) -> Option<Role> {
        let mut roles = self.iter().filter_map(|ty| ty.role());
        match (roles.next(), roles.next()) {
            (Some(role), None) => Some(role),
            _ => None,
        }
    }

    const fn without(self, ty: ArgType) -> Self {
        Self(self.0 & !ty.bit())
    }
}

impl From<ArgType> for ArgTypeSet {
    fn from(ty: ArgType) -> Self {
        Self::single(ty)
    }
}

impl FromIterator<ArgType> for ArgTypeSet {
    fn from_iter<T: IntoIterator<Item = ArgType>>(iter: T) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl fmt::Display for ArgTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ty) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{ty}")?;
        }
        Ok(())
    }
}

/// How often a trailing argument group may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Repeat {
    /// Exactly once (no suffix)
    Once,
    /// `+`
    OneOrMore,
    /// `*`
    ZeroOrMore,
    /// `?`
    Optional,
}

impl Repeat {
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Once => "",
            Self::OneOrMore => "+",
            Self::ZeroOrMore => "*",
            Self::Optional => "?",
        }
    }

    const fn is_unbounded(&self) -> bool {
        matches!(self, Self::OneOrMore | Self::ZeroOrMore)
    }
}

/// Trailing argument group: `[attr, numeric]+` repeats (attr, numeric) pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalGroup {
    pub args: Vec<ArgTypeSet>,
    pub repeat: Repeat,
}

/// Definition kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureKind {
    /// Named function or operator: `DEF`
    Def,
    /// Infix operator: `BINOP`
    BinOp,
    /// Prefix operator: `UNOP`
    UnOp,
}

impl fmt::Display for SignatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Def => "DEF",
            Self::BinOp => "BINOP",
            Self::UnOp => "UNOP",
        })
    }
}

/// Declared shape of a function or operator call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub kind: SignatureKind,
    pub return_type: ArgType,
    pub positional_args: Vec<ArgTypeSet>,
    pub optional_group: Option<OptionalGroup>,
}

impl FunctionSignature {
    /// Create a signature with no arguments
    pub fn new(kind: SignatureKind, name: impl Into<String>, return_type: ArgType) -> Self {
        Self {
            name: name.into(),
            kind,
            return_type,
            positional_args: Vec::new(),
            optional_group: None,
        }
    }

    /// Append a positional argument
    pub fn arg(mut self, accepted: impl Into<ArgTypeSet>) -> Self {
        self.positional_args.push(accepted.into());
        self
    }

    /// Set the trailing argument group
    pub fn group(mut self, args: Vec<ArgTypeSet>, repeat: Repeat) -> Self {
        self.optional_group = Some(OptionalGroup { args, repeat });
        self
    }

    /// Check an argument count against the declared shape
    pub fn accepts_arity(&self, count: usize) -> bool {
        let Some(remaining) = count.checked_sub(self.positional_args.len()) else {
            return false;
        };
        let Some(group) = &self.optional_group else {
            return remaining == 0;
        };
        let width = group.args.len();
        if width == 0 {
            return remaining == 0;
        }
        match group.repeat {
            Repeat::Once => remaining == width,
            Repeat::OneOrMore => remaining >= width && remaining % width == 0,
            Repeat::ZeroOrMore => remaining % width == 0,
            Repeat::Optional => remaining == 0 || remaining == width,
        }
    }

    /// Declared accepted set at argument position `index`, if the shape has one
    pub fn expected_at(&self, index: usize) -> Option<ArgTypeSet> {
        if let Some(accepted) = self.positional_args.get(index) {
            return Some(*accepted);
        }
        let group = self.optional_group.as_ref()?;
        let offset = index - self.positional_args.len();
        if group.repeat.is_unbounded() && !group.args.is_empty() {
            Some(group.args[offset % group.args.len()])
        } else {
            group.args.get(offset).copied()
        }
    }

    /// Compare actual argument types against this signature
    pub fn match_args(&self, actual: &[ExprType]) -> ArgumentMatch {
        let expected: Vec<Option<ArgTypeSet>> =
            (0..actual.len()).map(|i| self.expected_at(i)).collect();
        let mismatched = actual
            .iter()
            .zip(&expected)
            .enumerate()
            .filter(|(_, (ty, accepted))| !accepted.is_some_and(|set| set.accepts(**ty)))
            .map(|(i, _)| i)
            .collect();
        ArgumentMatch {
            arity_ok: self.accepts_arity(actual.len()),
            expected,
            mismatched,
        }
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}(", self.kind, self.return_type, self.name)?;
        let mut first = true;
        for accepted in &self.positional_args {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{accepted}")?;
        }
        if let Some(group) = &self.optional_group {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str("[")?;
            for (i, accepted) in group.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{accepted}")?;
            }
            write!(f, "]{}", group.repeat.suffix())?;
        }
        f.write_str(")")
    }
}

/// Outcome of matching actual argument types against a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentMatch {
    /// Whether the argument count fits the declared shape
    pub arity_ok: bool,
    /// Declared accepted set per actual argument; `None` past the declared shape
    pub expected: Vec<Option<ArgTypeSet>>,
    /// Argument positions (0-based) whose type is not accepted
    pub mismatched: Vec<usize>,
}

impl ArgumentMatch {
    pub fn is_match(&self) -> bool {
        self.arity_ok && self.mismatched.is_empty()
    }
}
