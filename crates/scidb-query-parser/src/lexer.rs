//! Tokenizer for AFL/AQL query text

use logos::Logos;
use scidb_query_diagnostics::{LineIndex, QueryError, Result, SDB0001, SDB0002, Span};
use std::fmt;
use winnow::stream::Location;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind<'src> {
    // Literals
    #[regex(r"[0-9]+\.[0-9]*")]
    Float(&'src str),
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),
    /// Raw text including the delimiters
    #[regex(r#""[^"\n]*""#)]
    #[regex(r"'[^'\n]*'")]
    String(&'src str),
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Name(&'src str),

    // Keywords, case-insensitive; longer names still lex as `Name`
    #[token("as", ignore(ascii_case))]
    As,
    #[token("null", ignore(ascii_case))]
    Null,
    #[token("create", ignore(ascii_case))]
    Create,
    #[token("drop", ignore(ascii_case))]
    Drop,
    #[token("array", ignore(ascii_case))]
    Array,

    // Comparison operators (multi-character first)
    #[token("<>")]
    NotEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("=")]
    Equal,

    // Arithmetic operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // Punctuation
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("@")]
    At,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(text) | Self::String(text) | Self::Name(text) => f.write_str(text),
            Self::Integer(value) => write!(f, "{value}"),
            Self::As => f.write_str("AS"),
            Self::Null => f.write_str("NULL"),
            Self::Create => f.write_str("CREATE"),
            Self::Drop => f.write_str("DROP"),
            Self::Array => f.write_str("ARRAY"),
            Self::NotEqual => f.write_str("<>"),
            Self::LessEqual => f.write_str("<="),
            Self::GreaterEqual => f.write_str(">="),
            Self::Less => f.write_str("<"),
            Self::Greater => f.write_str(">"),
            Self::Equal => f.write_str("="),
            Self::Plus => f.write_str("+"),
            Self::Minus => f.write_str("-"),
            Self::Star => f.write_str("*"),
            Self::Slash => f.write_str("/"),
            Self::Percent => f.write_str("%"),
            Self::Comma => f.write_str(","),
            Self::Dot => f.write_str("."),
            Self::Semicolon => f.write_str(";"),
            Self::Colon => f.write_str(":"),
            Self::At => f.write_str("@"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::LBracket => f.write_str("["),
            Self::RBracket => f.write_str("]"),
        }
    }
}

/// A lexed token with its source text and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind<'src>,
    pub text: &'src str,
    /// 1-based line of the first character
    pub line: usize,
    pub span: Span,
}

impl Location for Token<'_> {
    fn previous_token_end(&self) -> usize {
        self.span.end
    }

    fn current_token_start(&self) -> usize {
        self.span.start
    }
}

/// Split `source` into tokens, skipping whitespace
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>> {
    let lines = LineIndex::new(source);
    let mut tokens = Vec::new();

    for (result, range) in TokenKind::lexer(source).spanned() {
        let span = Span::from(range);
        let text = &source[span.as_range()];
        let kind = match result {
            Ok(kind) => kind,
            Err(()) => {
                let character = text.chars().next().unwrap_or_default();
                let code = if character.is_ascii_digit() {
                    SDB0002
                } else {
                    SDB0001
                };
                let location = lines.location(Span::new(span.start, span.start + character.len_utf8()));
                return Err(QueryError::lex(code, character, location));
            }
        };
        tokens.push(Token {
            kind,
            text,
            line: lines.line(span.start),
            span,
        });
    }

    log::trace!("lexed {} tokens from {} bytes", tokens.len(), source.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind<'_>> {
        tokenize(source)
            .unwrap_or_else(|e| panic!("lexer error: {e}"))
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_basic_lexer() {
        assert_eq!(
            kinds("store(build(A, iif(A.i0=A.i1,1,0)), A);"),
            vec![
                TokenKind::Name("store"),
                TokenKind::LParen,
                TokenKind::Name("build"),
                TokenKind::LParen,
                TokenKind::Name("A"),
                TokenKind::Comma,
                TokenKind::Name("iif"),
                TokenKind::LParen,
                TokenKind::Name("A"),
                TokenKind::Dot,
                TokenKind::Name("i0"),
                TokenKind::Equal,
                TokenKind::Name("A"),
                TokenKind::Dot,
                TokenKind::Name("i1"),
                TokenKind::Comma,
                TokenKind::Integer(1),
                TokenKind::Comma,
                TokenKind::Integer(0),
                TokenKind::RParen,
                TokenKind::RParen,
                TokenKind::Comma,
                TokenKind::Name("A"),
                TokenKind::RParen,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("CREATE array Drop As NULL"),
            vec![
                TokenKind::Create,
                TokenKind::Array,
                TokenKind::Drop,
                TokenKind::As,
                TokenKind::Null,
            ]
        );
        // only exact words are keywords
        assert_eq!(
            kinds("arrays creates"),
            vec![TokenKind::Name("arrays"), TokenKind::Name("creates")]
        );
    }

    #[test]
    fn test_multi_character_operators() {
        assert_eq!(
            kinds("a<>b<=c>=d<e>f"),
            vec![
                TokenKind::Name("a"),
                TokenKind::NotEqual,
                TokenKind::Name("b"),
                TokenKind::LessEqual,
                TokenKind::Name("c"),
                TokenKind::GreaterEqual,
                TokenKind::Name("d"),
                TokenKind::Less,
                TokenKind::Name("e"),
                TokenKind::Greater,
                TokenKind::Name("f"),
            ]
        );
    }

    #[test]
    fn test_numbers_and_strings() {
        assert_eq!(
            kinds("1.05 2. 42 'it' \"x y\""),
            vec![
                TokenKind::Float("1.05"),
                TokenKind::Float("2."),
                TokenKind::Integer(42),
                TokenKind::String("'it'"),
                TokenKind::String("\"x y\""),
            ]
        );
    }

    #[test]
    fn test_line_tracking() {
        let tokens = tokenize("scan(A);\n\nremove(A);").expect("tokens");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[5].text, "remove");
        assert_eq!(tokens[5].line, 3);
    }

    #[test]
    fn test_invalid_character() {
        let err = tokenize("scan(A);\nscan($B)").unwrap_err();
        match err {
            QueryError::Lex {
                code,
                character,
                line,
                ..
            } => {
                assert_eq!(code, SDB0001);
                assert_eq!(character, '$');
                assert_eq!(line, 2);
            }
            other => panic!("expected lex error, got {other:?}"),
        }
    }

    #[test]
    fn test_string_cannot_span_lines() {
        assert!(tokenize("'abc\ndef'").is_err());
    }

    #[test]
    fn test_integer_overflow() {
        let err = tokenize("subarray(A, 99999999999999999999)").unwrap_err();
        assert_eq!(err.code(), SDB0002);
    }
}
