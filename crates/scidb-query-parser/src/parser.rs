//! Query grammar written with winnow over the lexed tokens
//!
//! ```text
//! query_list   := query (';' query)* ';'?
//! query        := CREATE ARRAY name array_spec | DROP ARRAY name | call
//! call         := name '(' [argument (',' argument)*] ')'
//! argument     := expression [AS name]
//! expression   := operand (binary_op operand)*
//! operand      := '-' operand | primary
//! primary      := '(' expression ')' | array_spec | call | name '@' integer
//!               | name '.' name | literal | name
//! array_spec   := '<' attr_spec (',' attr_spec)* '>' '[' dim_spec (',' dim_spec)* ']'
//! attr_spec    := name ':' name [NULL]
//! dim_spec     := name '=' int ':' (int | '*') ',' int ',' int
//! ```
//!
//! Binary operators bind by [`BinaryOp::precedence`]; comparisons do not
//! associate. Every reduced production goes through the [`NodeBuilder`]
//! carried in the stream state.

use crate::builder::NodeBuilder;
use crate::lexer::{Token, TokenKind};
use scidb_query_ast::{AttrSpec, BinaryOp, DimBound, DimSpec, Literal, Node, Query, UnaryOp};
use scidb_query_diagnostics::{
    ErrorCode, QueryError, Result, SDB0010, SDB0011, SDB0012, SDB0013, SDB0014, SDB0015, Span,
};
use std::fmt;
use winnow::combinator::{alt, cut_err, delimited, dispatch, opt, preceded, separated, terminated};
use winnow::error::{ErrMode, ParserError};
use winnow::prelude::*;
use winnow::stream::{Location, Stateful, TokenSlice};
use winnow::token::any;

/// Deepest nesting of expressions (groups, call arguments, unary minus)
/// accepted before parsing stops with `SDB0015`
pub const MAX_NESTING: usize = 64;

pub(crate) type Input<'i, 't, 'src> =
    Stateful<TokenSlice<'i, Token<'src>>, ParseState<'i, 't, 'src>>;

type PResult<O> = ModalResult<O, SyntaxError>;

pub(crate) struct ParseState<'i, 't, 'src> {
    builder: &'i mut NodeBuilder<'t, 'src>,
    source_len: usize,
    depth: usize,
}

impl fmt::Debug for ParseState<'_, '_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseState")
            .field("source_len", &self.source_len)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

/// A grammar failure, positioned at the token it stopped on
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    code: ErrorCode,
    expected: &'static str,
    /// Display text and span of the offending token; `None` at end of input
    found: Option<(String, Span)>,
}

impl SyntaxError {
    fn at(input: &Input<'_, '_, '_>, code: ErrorCode, expected: &'static str) -> Self {
        let found = input
            .peek_token()
            .map(|token| (format!("'{}'", token.kind), token.span));
        Self {
            code,
            expected,
            found,
        }
    }

    fn into_query_error(self, state: &ParseState<'_, '_, '_>) -> QueryError {
        match self.found {
            Some((found, span)) => {
                QueryError::syntax(self.code, found, self.expected, state.builder.location(span))
            }
            None => QueryError::syntax(
                SDB0011,
                "end of input",
                self.expected,
                state.builder.location(Span::point(state.source_len)),
            ),
        }
    }
}

impl<'i, 't, 'src> ParserError<Input<'i, 't, 'src>> for SyntaxError {
    type Inner = Self;

    fn from_input(input: &Input<'i, 't, 'src>) -> Self {
        Self::at(input, SDB0010, "valid input")
    }

    fn into_inner(self) -> std::result::Result<Self::Inner, Self> {
        Ok(self)
    }
}

fn backtrack(input: &Input<'_, '_, '_>, code: ErrorCode, expected: &'static str) -> ErrMode<SyntaxError> {
    ErrMode::Backtrack(SyntaxError::at(input, code, expected))
}

fn cut(input: &Input<'_, '_, '_>, code: ErrorCode, expected: &'static str) -> ErrMode<SyntaxError> {
    ErrMode::Cut(SyntaxError::at(input, code, expected))
}

/// Run `grammar` over `tokens`, reducing through `builder`
pub(crate) fn parse_tokens<'i, 't, 'src, O>(
    tokens: &'i [Token<'src>],
    builder: &'i mut NodeBuilder<'t, 'src>,
    source_len: usize,
    grammar: impl FnOnce(&mut Input<'i, 't, 'src>) -> PResult<O>,
) -> Result<O> {
    let mut input = Input {
        input: TokenSlice::new(tokens),
        state: ParseState {
            builder,
            source_len,
            depth: 0,
        },
    };
    grammar(&mut input).map_err(|err| {
        let err = match err {
            ErrMode::Backtrack(err) | ErrMode::Cut(err) => err,
            ErrMode::Incomplete(_) => SyntaxError::at(&input, SDB0011, "more input"),
        };
        err.into_query_error(&input.state)
    })
}

// === Entry points ===

/// One or more semicolon-separated queries covering the whole input
pub(crate) fn query_list(input: &mut Input<'_, '_, '_>) -> PResult<Vec<Query>> {
    let mut queries = Vec::new();
    loop {
        let query = query(input, queries.len())?;
        log::debug!("parsed query {}: {}", query.index(), query);
        queries.push(query);
        let separator = opt(token(TokenKind::Semicolon, "';'")).parse_next(input)?;
        if separator.is_none() || input.eof_offset() == 0 {
            break;
        }
    }
    if input.eof_offset() > 0 {
        return Err(cut(input, SDB0012, "';' or end of input"));
    }
    Ok(queries)
}

/// A single expression covering the whole input
pub(crate) fn standalone_expression(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    let node = expression(input)?;
    if input.eof_offset() > 0 {
        return Err(cut(input, SDB0012, "end of input"));
    }
    Ok(node)
}

// === Queries ===

fn query(input: &mut Input<'_, '_, '_>, index: usize) -> PResult<Query> {
    let root = dispatch! {peek_kind;
        Some(TokenKind::Create) => create_array,
        Some(TokenKind::Drop) => drop_array,
        Some(TokenKind::Name(_)) => operator_call,
        _ => fail_with(SDB0010, "query"),
    }
    .parse_next(input)?;
    input.state.builder.finish_query(index, &root);
    let location = input.state.builder.location(root.span());
    Ok(Query::new(index, root, location))
}

fn create_array(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    let start = input.current_token_start();
    let (name, schema) = preceded(
        (token(TokenKind::Create, "CREATE"), cut_err(token(TokenKind::Array, "ARRAY"))),
        cut_err((name("array name"), array_spec)),
    )
    .parse_next(input)?;
    let span = span_from(input, start);
    Ok(input.state.builder.create_array(name, schema, span))
}

fn drop_array(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    let start = input.current_token_start();
    let name = preceded(
        (token(TokenKind::Drop, "DROP"), cut_err(token(TokenKind::Array, "ARRAY"))),
        cut_err(name("array name")),
    )
    .parse_next(input)?;
    let span = span_from(input, start);
    Ok(input.state.builder.drop_array(name, span))
}

/// An AFL query: an operator call at the top level
fn operator_call(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    let start = input.current_token_start();
    if !matches!(input.get(1), Some(next) if next.kind == TokenKind::LParen) {
        return Err(cut(input, SDB0014, "function call"));
    }
    let name = name("function name").parse_next(input)?;
    function_call(input, name, start)
}

/// The argument list of a call whose name has been consumed
fn function_call(input: &mut Input<'_, '_, '_>, name: &str, start: usize) -> PResult<Node> {
    let args: Vec<Node> = preceded(
        token(TokenKind::LParen, "'('"),
        alt((
            token(TokenKind::RParen, "')'").map(|_| Vec::new()),
            terminated(
                separated(1.., cut_err(argument), token(TokenKind::Comma, "','")),
                cut_err(token(TokenKind::RParen, "',' or ')'")),
            ),
        )),
    )
    .parse_next(input)?;
    let span = span_from(input, start);
    Ok(input.state.builder.call(name, args, span))
}

fn argument(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    let start = input.current_token_start();
    let expr = expression(input)?;
    let alias = opt(preceded(
        token(TokenKind::As, "AS"),
        cut_err(name("alias name")),
    ))
    .parse_next(input)?;
    Ok(match alias {
        Some(alias) => {
            let span = span_from(input, start);
            input.state.builder.alias(expr, alias, span)
        }
        None => expr,
    })
}

// === Expressions ===

fn expression(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    nested(input, |input| binary_expression(input, BinaryOp::Equal.precedence()))
}

/// Precedence climbing: operators binding at least `min_precedence`.
/// Right operands climb one level higher, so every level associates left.
fn binary_expression(input: &mut Input<'_, '_, '_>, min_precedence: u8) -> PResult<Node> {
    let start = input.current_token_start();
    let mut left = unary_expression(input)?;
    let mut compared = false;

    while let Some(op) = peek_binary_op(input).filter(|op| op.precedence() >= min_precedence) {
        if compared && op.is_comparison() {
            return Err(cut(input, SDB0013, "parenthesised comparison"));
        }
        input.next_token();
        let right = binary_expression(input, op.precedence() + 1)?;
        compared |= op.is_comparison();
        let span = span_from(input, start);
        left = input.state.builder.binary(op, left, right, span);
    }
    Ok(left)
}

fn unary_expression(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    let start = input.current_token_start();
    if opt(token(TokenKind::Minus, "'-'")).parse_next(input)?.is_none() {
        return primary_expression(input);
    }
    let operand = nested(input, unary_expression)?;
    let span = span_from(input, start);
    Ok(input.state.builder.unary(UnaryOp::Negate, operand, span))
}

fn primary_expression(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    dispatch! {peek_kind;
        Some(TokenKind::LParen) => group,
        Some(TokenKind::Less) => array_spec,
        Some(TokenKind::Integer(_) | TokenKind::Float(_) | TokenKind::String(_)) => literal,
        Some(TokenKind::Name(_)) => name_expression,
        _ => fail_with(SDB0010, "expression"),
    }
    .parse_next(input)
}

fn group(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    let start = input.current_token_start();
    let inner = delimited(
        token(TokenKind::LParen, "'('"),
        cut_err(expression),
        cut_err(token(TokenKind::RParen, "')'")),
    )
    .parse_next(input)?;
    let span = span_from(input, start);
    Ok(input.state.builder.group(inner, span))
}

fn literal(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    let (literal, span) = any::<_, ErrMode<SyntaxError>>
        .verify_map(|token: &Token<'_>| Some((literal_value(token.kind)?, token.span)))
        .parse_next(input)?;
    Ok(input.state.builder.literal(literal, span))
}

/// A primary that starts with a name: call, version, attribute or bare name
fn name_expression(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    let start = input.current_token_start();
    let name = name("name").parse_next(input)?;
    match input.peek_token().map(|token| token.kind) {
        Some(TokenKind::LParen) => function_call(input, name, start),
        Some(TokenKind::At) => {
            let version = preceded(token(TokenKind::At, "'@'"), cut_err(integer("array version")))
                .parse_next(input)?;
            let span = span_from(input, start);
            Ok(input.state.builder.version_ref(name, version, span))
        }
        Some(TokenKind::Dot) => {
            let attribute = preceded(token(TokenKind::Dot, "'.'"), cut_err(self::name("attribute name")))
                .parse_next(input)?;
            let span = span_from(input, start);
            Ok(input.state.builder.object_attribute(name, attribute, span))
        }
        _ => {
            let span = span_from(input, start);
            Ok(input.state.builder.literal(Literal::Name(name.to_string()), span))
        }
    }
}

// === Array schemas ===

fn array_spec(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    let start = input.current_token_start();
    let attributes: Vec<Node> = delimited(
        token(TokenKind::Less, "'<'"),
        separated(1.., cut_err(attr_spec), token(TokenKind::Comma, "','")),
        cut_err(token(TokenKind::Greater, "',' or '>'")),
    )
    .parse_next(input)?;
    let dimensions: Vec<Node> = delimited(
        cut_err(token(TokenKind::LBracket, "'['")),
        separated(1.., cut_err(dim_spec), token(TokenKind::Comma, "','")),
        cut_err(token(TokenKind::RBracket, "',' or ']'")),
    )
    .parse_next(input)?;
    let span = span_from(input, start);
    Ok(input.state.builder.array_spec(attributes, dimensions, span))
}

fn attr_spec(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    let start = input.current_token_start();
    let (name, type_name, nullable) = (
        name("attribute name"),
        preceded(token(TokenKind::Colon, "':'"), name("attribute type")),
        opt(token(TokenKind::Null, "NULL")).map(|null| null.is_some()),
    )
        .parse_next(input)?;
    let spec = AttrSpec {
        name: name.to_string(),
        type_name: type_name.to_string(),
        nullable,
    };
    let span = span_from(input, start);
    Ok(input.state.builder.attr_spec(spec, span))
}

fn dim_spec(input: &mut Input<'_, '_, '_>) -> PResult<Node> {
    let start = input.current_token_start();
    let (name, low, high, chunk, overlap) = (
        name("dimension name"),
        preceded(token(TokenKind::Equal, "'='"), signed_integer("dimension low bound")),
        preceded(token(TokenKind::Colon, "':'"), dimension_bound),
        preceded(token(TokenKind::Comma, "','"), signed_integer("chunk size")),
        preceded(token(TokenKind::Comma, "','"), signed_integer("chunk overlap")),
    )
        .parse_next(input)?;
    let spec = DimSpec {
        name: name.to_string(),
        low,
        high,
        chunk,
        overlap,
    };
    let span = span_from(input, start);
    Ok(input.state.builder.dim_spec(spec, span))
}

fn dimension_bound(input: &mut Input<'_, '_, '_>) -> PResult<DimBound> {
    alt((
        token(TokenKind::Star, "'*'").map(|_| DimBound::Unbounded),
        signed_integer("dimension high bound or '*'").map(DimBound::Bounded),
    ))
    .parse_next(input)
}

// === Token parsers ===

/// Consume the next token if it is exactly `kind`
fn token<'i, 't, 'src>(
    kind: TokenKind<'static>,
    expected: &'static str,
) -> impl Parser<Input<'i, 't, 'src>, Token<'src>, ErrMode<SyntaxError>>
where
    't: 'i,
    'src: 'i,
{
    move |input: &mut Input<'i, 't, 'src>| match input.peek_token() {
        Some(next) if next.kind == kind => {
            input.next_token();
            Ok(*next)
        }
        _ => Err(backtrack(input, SDB0010, expected)),
    }
}

fn name<'i, 't, 'src>(
    expected: &'static str,
) -> impl Parser<Input<'i, 't, 'src>, &'src str, ErrMode<SyntaxError>>
where
    't: 'i,
    'src: 'i,
{
    move |input: &mut Input<'i, 't, 'src>| match input.peek_token() {
        Some(Token {
            kind: TokenKind::Name(name),
            ..
        }) => {
            input.next_token();
            Ok(*name)
        }
        _ => Err(backtrack(input, SDB0010, expected)),
    }
}

fn integer<'i, 't, 'src>(
    expected: &'static str,
) -> impl Parser<Input<'i, 't, 'src>, i64, ErrMode<SyntaxError>>
where
    't: 'i,
    'src: 'i,
{
    move |input: &mut Input<'i, 't, 'src>| match input.peek_token() {
        Some(Token {
            kind: TokenKind::Integer(value),
            ..
        }) => {
            input.next_token();
            Ok(*value)
        }
        _ => Err(backtrack(input, SDB0010, expected)),
    }
}

fn signed_integer<'i, 't, 'src>(
    expected: &'static str,
) -> impl Parser<Input<'i, 't, 'src>, i64, ErrMode<SyntaxError>>
where
    't: 'i,
    'src: 'i,
{
    (opt(token(TokenKind::Minus, "'-'")), integer(expected))
        .map(|(minus, value)| if minus.is_some() { -value } else { value })
}

/// Always fails, reporting the next token against `expected`
fn fail_with<'i, 't, 'src, O>(
    code: ErrorCode,
    expected: &'static str,
) -> impl Parser<Input<'i, 't, 'src>, O, ErrMode<SyntaxError>> {
    move |input: &mut Input<'i, 't, 'src>| Err(backtrack(input, code, expected))
}

fn peek_kind<'src>(input: &mut Input<'_, '_, 'src>) -> PResult<Option<TokenKind<'src>>> {
    Ok(input.peek_token().map(|token| token.kind))
}

fn peek_binary_op(input: &Input<'_, '_, '_>) -> Option<BinaryOp> {
    input.peek_token().and_then(|token| binary_op(token.kind))
}

// === Helpers ===

/// Run `parser` one nesting level deeper, failing past [`MAX_NESTING`]
fn nested<'i, 't, 'src, O>(
    input: &mut Input<'i, 't, 'src>,
    parser: impl FnOnce(&mut Input<'i, 't, 'src>) -> PResult<O>,
) -> PResult<O> {
    if input.state.depth >= MAX_NESTING {
        return Err(cut(input, SDB0015, "less deeply nested expression"));
    }
    input.state.depth += 1;
    let result = parser(input);
    input.state.depth -= 1;
    result
}

fn span_from(input: &Input<'_, '_, '_>, start: usize) -> Span {
    Span::new(start, input.previous_token_end().max(start))
}

fn binary_op(kind: TokenKind<'_>) -> Option<BinaryOp> {
    match kind {
        TokenKind::Equal => Some(BinaryOp::Equal),
        TokenKind::NotEqual => Some(BinaryOp::NotEqual),
        TokenKind::Less => Some(BinaryOp::Less),
        TokenKind::LessEqual => Some(BinaryOp::LessOrEqual),
        TokenKind::Greater => Some(BinaryOp::Greater),
        TokenKind::GreaterEqual => Some(BinaryOp::GreaterOrEqual),
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Subtract),
        TokenKind::Star => Some(BinaryOp::Multiply),
        TokenKind::Slash => Some(BinaryOp::Divide),
        TokenKind::Percent => Some(BinaryOp::Modulo),
        _ => None,
    }
}

fn literal_value(kind: TokenKind<'_>) -> Option<Literal> {
    match kind {
        TokenKind::Integer(value) => Some(Literal::Integer(value)),
        TokenKind::Float(text) => Some(Literal::Float(text.to_string())),
        TokenKind::String(raw) => Some(string_literal(raw)),
        _ => None,
    }
}

/// Split a raw string token into its delimiter and contents
fn string_literal(raw: &str) -> Literal {
    let quote = raw.chars().next().unwrap_or('\'');
    let value = raw
        .get(1..raw.len().saturating_sub(1))
        .unwrap_or_default()
        .to_string();
    Literal::String { value, quote }
}
