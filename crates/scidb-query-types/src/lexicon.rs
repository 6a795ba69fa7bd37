//! Built-in operator and function signatures

/// Signature definitions loaded into [`crate::SignatureTable::builtin`]
pub const BUILTIN_DEFINITIONS: &str = r#"
# Scalar functions
DEF numeric abs(numeric)
DEF numeric ceil(numeric)
DEF numeric floor(numeric)
DEF numeric sqrt(numeric)
DEF numeric acos(numeric)
DEF numeric asin(numeric)
DEF numeric atan(numeric)
DEF numeric cos(numeric)
DEF numeric sin(numeric)
DEF numeric tan(numeric)
DEF numeric exp(numeric)
DEF numeric log(numeric)
DEF numeric log10(numeric)
DEF numeric pow(numeric, numeric)
DEF numeric iif(bool, numeric, numeric)
DEF bool is_nan(numeric)
DEF bool is_null(numeric)
DEF bool not(bool)

# Aggregates
DEF numeric approxdc(numeric)
DEF numeric avg(numeric)
DEF numeric count(numeric)
DEF numeric max(numeric)
DEF numeric min(numeric)
DEF numeric stdev(numeric)
DEF numeric sum(numeric)
DEF numeric var(numeric)

# Operators
UNOP numeric -(numeric)
BINOP numeric +(numeric, numeric)
BINOP numeric -(numeric, numeric)
BINOP numeric *(numeric, numeric)
BINOP numeric /(numeric, numeric)
BINOP numeric %(numeric, numeric)
BINOP bool <(numeric, numeric)
BINOP bool <=(numeric, numeric)
BINOP bool <>(numeric, numeric)
BINOP bool =(numeric, numeric)
BINOP bool >=(numeric, numeric)
BINOP bool >(numeric, numeric)

# Array operators
DEF array store(array, array)
DEF array build(array|schema, numeric)
DEF array apply(array, [attr, numeric]+)
DEF array project(array, [attr]+)
DEF array filter(array, bool)
DEF array multiply(array, array)
DEF array transpose(array)
DEF array scan(array)
DEF array show(array)
DEF array redimension(array, array|schema)
DEF array join(array, array)
DEF array cross_join(array, array, [dim, dim]*)
DEF array subarray(array, [numeric]*)
DEF array between(array, [numeric]*)
DEF array aggregate(array, [numeric|dim]+)
DEF array sort(array, [attr]*)
DEF void remove(array)
"#;
