//! Signature table shared read-only by every parse

use crate::lexicon::BUILTIN_DEFINITIONS;
use crate::loader::parse_definitions;
use crate::{FunctionSignature, SignatureKind};
use indexmap::IndexMap;
use scidb_query_diagnostics::Result;
use std::sync::LazyLock;

static BUILTIN: LazyLock<SignatureTable> = LazyLock::new(|| {
    SignatureTable::from_definitions(BUILTIN_DEFINITIONS)
        .expect("built-in signature definitions are well-formed")
});

/// Signatures keyed by name, one map per definition kind.
///
/// Unary and binary `-` are distinct entries. Definition order is preserved.
#[derive(Debug, Clone, Default)]
pub struct SignatureTable {
    functions: IndexMap<String, FunctionSignature>,
    binary_ops: IndexMap<String, FunctionSignature>,
    unary_ops: IndexMap<String, FunctionSignature>,
}

impl SignatureTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide built-in table, built on first use and never mutated
    pub fn builtin() -> &'static SignatureTable {
        &BUILTIN
    }

    /// Build a table from definition-language text
    pub fn from_definitions(text: &str) -> Result<Self> {
        let mut table = Self::new();
        table.load_definitions(text)?;
        Ok(table)
    }

    /// Add every definition in `text`, returning how many were loaded
    pub fn load_definitions(&mut self, text: &str) -> Result<usize> {
        let signatures = parse_definitions(text)?;
        let count = signatures.len();
        for signature in signatures {
            self.insert(signature);
        }
        Ok(count)
    }

    /// Insert a signature, replacing any earlier one with the same name and kind
    pub fn insert(&mut self, signature: FunctionSignature) -> Option<FunctionSignature> {
        let kind = signature.kind;
        let previous = self
            .map_mut(kind)
            .insert(signature.name.clone(), signature);
        if let Some(previous) = &previous {
            log::warn!("{} signature for '{}' redefined", kind, previous.name);
        }
        previous
    }

    /// Look up a named function or operator
    pub fn function(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    /// Look up an infix operator by symbol
    pub fn binary_op(&self, symbol: &str) -> Option<&FunctionSignature> {
        self.binary_ops.get(symbol)
    }

    /// Look up a prefix operator by symbol
    pub fn unary_op(&self, symbol: &str) -> Option<&FunctionSignature> {
        self.unary_ops.get(symbol)
    }

    pub fn lookup(&self, kind: SignatureKind, name: &str) -> Option<&FunctionSignature> {
        self.map(kind).get(name)
    }

    /// Total number of signatures across all kinds
    pub fn len(&self) -> usize {
        self.functions.len() + self.binary_ops.len() + self.unary_ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All signatures: functions, then binary, then unary operators
    pub fn iter(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.functions
            .values()
            .chain(self.binary_ops.values())
            .chain(self.unary_ops.values())
    }

    fn map(&self, kind: SignatureKind) -> &IndexMap<String, FunctionSignature> {
        match kind {
            SignatureKind::Def => &self.functions,
            SignatureKind::BinOp => &self.binary_ops,
            SignatureKind::UnOp => &self.unary_ops,
        }
    }

    fn map_mut(&mut self, kind: SignatureKind) -> &mut IndexMap<String, FunctionSignature> {
        match kind {
            SignatureKind::Def => &mut self.functions,
            SignatureKind::BinOp => &mut self.binary_ops,
            SignatureKind::UnOp => &mut self.unary_ops,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArgType;

    #[test]
    fn test_builtin_loads() {
        let table = SignatureTable::builtin();
        assert!(!table.is_empty());
        assert_eq!(table.function("store").map(|s| s.positional_args.len()), Some(2));
        assert_eq!(table.function("remove").map(|s| s.return_type), Some(ArgType::Void));
    }

    #[test]
    fn test_unary_and_binary_minus_are_distinct() {
        let table = SignatureTable::builtin();
        assert_eq!(table.unary_op("-").map(|s| s.positional_args.len()), Some(1));
        assert_eq!(table.binary_op("-").map(|s| s.positional_args.len()), Some(2));
        assert!(table.function("-").is_none());
    }

    #[test]
    fn test_redefinition_replaces() {
        let mut table = SignatureTable::from_definitions("DEF numeric f(numeric)").expect("table");
        table
            .load_definitions("DEF bool f(bool, bool)")
            .expect("redefinition");
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.lookup(SignatureKind::Def, "f").map(ToString::to_string),
            Some("DEF bool f(bool, bool)".to_string())
        );
    }

    #[test]
    fn test_iteration_preserves_definition_order() {
        let table = SignatureTable::from_definitions(
            "DEF array scan(array)\nBINOP numeric +(numeric, numeric)\nDEF array show(array)",
        )
        .expect("table");
        let names: Vec<_> = table.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["scan", "show", "+"]);
    }
}
