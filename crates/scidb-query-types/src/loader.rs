//! Signature definition language
//!
//! One signature per line:
//!
//! ```text
//! KIND RETTYPE NAME(ARG[|ARG]*, ..., [OPTARG[|OPTARG]*, ...]REPEAT)
//! ```
//!
//! `KIND` is `DEF`, `BINOP` or `UNOP`; `REPEAT` is empty, `+`, `*` or `?`.
//! Blank lines and `#` comments are ignored.

use crate::{ArgType, ArgTypeSet, FunctionSignature, OptionalGroup, Repeat, SignatureKind};
use scidb_query_diagnostics::{QueryError, Result, SDB0401, SDB0402};
use winnow::Parser;
use winnow::combinator::{alt, delimited, opt, separated};
use winnow::error::ContextError;
use winnow::token::{one_of, take_while};

type DefResult<T> = std::result::Result<T, ContextError>;

enum ArgItem {
    Single(ArgTypeSet),
    Group(OptionalGroup),
}

struct RawDefinition<'i> {
    kind: SignatureKind,
    return_type: ArgType,
    name: &'i str,
    items: Vec<ArgItem>,
}

/// Parse every definition line in `text`
pub fn parse_definitions(text: &str) -> Result<Vec<FunctionSignature>> {
    let mut signatures = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or_default();
        if content.trim().is_empty() {
            continue;
        }
        signatures.push(parse_definition_line(content, i + 1)?);
    }
    Ok(signatures)
}

/// Parse a single definition, reporting errors against `line_number`
pub fn parse_definition_line(line: &str, line_number: usize) -> Result<FunctionSignature> {
    let mut input = line;
    let raw = definition(&mut input).map_err(|_| {
        let column = line.len() - input.len() + 1;
        QueryError::definition(
            SDB0401,
            line_number,
            format!("cannot parse definition at column {column}: {:?}", line.trim()),
        )
    })?;
    if !input.is_empty() {
        return Err(QueryError::definition(
            SDB0401,
            line_number,
            format!("unexpected trailing text {:?}", input.trim()),
        ));
    }

    let mut signature = FunctionSignature::new(raw.kind, raw.name, raw.return_type);
    let item_count = raw.items.len();
    for (position, item) in raw.items.into_iter().enumerate() {
        match item {
            ArgItem::Single(accepted) => signature = signature.arg(accepted),
            ArgItem::Group(group) if position + 1 == item_count => {
                signature.optional_group = Some(group);
            }
            ArgItem::Group(_) => {
                return Err(QueryError::definition(
                    SDB0402,
                    line_number,
                    format!("argument group of {} must be the last argument", raw.name),
                ));
            }
        }
    }
    Ok(signature)
}

fn ws(input: &mut &str) -> DefResult<()> {
    take_while(0.., [' ', '\t']).void().parse_next(input)
}

fn ws1(input: &mut &str) -> DefResult<()> {
    take_while(1.., [' ', '\t']).void().parse_next(input)
}

fn signature_kind(input: &mut &str) -> DefResult<SignatureKind> {
    alt((
        "DEF".value(SignatureKind::Def),
        "BINOP".value(SignatureKind::BinOp),
        "UNOP".value(SignatureKind::UnOp),
    ))
    .parse_next(input)
}

fn arg_type(input: &mut &str) -> DefResult<ArgType> {
    alt((
        "void".value(ArgType::Void),
        "bool".value(ArgType::Bool),
        "numeric".value(ArgType::Numeric),
        "array".value(ArgType::Array),
        "schema".value(ArgType::Schema),
        "attr".value(ArgType::Attr),
        "dim".value(ArgType::Dim),
    ))
    .parse_next(input)
}

fn type_set(input: &mut &str) -> DefResult<ArgTypeSet> {
    separated(1.., arg_type, (ws, '|', ws))
        .map(|types: Vec<ArgType>| types.into_iter().collect())
        .parse_next(input)
}

fn function_name<'i>(input: &mut &'i str) -> DefResult<&'i str> {
    alt((
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
        "<>",
        "<=",
        ">=",
        "<",
        ">",
        "=",
        "+",
        "-",
        "*",
        "/",
        "%",
    ))
    .parse_next(input)
}

fn repeat(input: &mut &str) -> DefResult<Repeat> {
    opt(one_of(['+', '*', '?']))
        .map(|suffix| match suffix {
            Some('+') => Repeat::OneOrMore,
            Some('*') => Repeat::ZeroOrMore,
            Some('?') => Repeat::Optional,
            _ => Repeat::Once,
        })
        .parse_next(input)
}

fn group(input: &mut &str) -> DefResult<OptionalGroup> {
    (
        delimited(('[', ws), separated(1.., type_set, (ws, ',', ws)), (ws, ']')),
        repeat,
    )
        .map(|(args, repeat): (Vec<ArgTypeSet>, Repeat)| OptionalGroup { args, repeat })
        .parse_next(input)
}

fn arg_item(input: &mut &str) -> DefResult<ArgItem> {
    alt((group.map(ArgItem::Group), type_set.map(ArgItem::Single))).parse_next(input)
}

fn arg_list(input: &mut &str) -> DefResult<Vec<ArgItem>> {
    delimited(('(', ws), separated(0.., arg_item, (ws, ',', ws)), (ws, ')')).parse_next(input)
}

fn definition<'i>(input: &mut &'i str) -> DefResult<RawDefinition<'i>> {
    ws(input)?;
    let kind = signature_kind(input)?;
    ws1(input)?;
    let return_type = arg_type(input)?;
    ws1(input)?;
    let name = function_name(input)?;
    ws(input)?;
    let items = arg_list(input)?;
    ws(input)?;
    Ok(RawDefinition {
        kind,
        return_type,
        name,
        items,
    })
}
