//! Tokenizer and block scanner for the dictionary subset used by
//! `transportProperties`: named brace blocks holding `key value;` entries.

use crate::error::{Result, ViscosityError};
use logos::{FilterResult, Lexer, Logos};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LexError {
    #[default]
    Unrecognised,
    UnterminatedComment,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"#[^\n]*")] // #include, #inputMode and other directives
pub enum DictToken<'src> {
    #[token("/*", block_comment)]
    BlockComment,

    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token(";")]
    Semicolon,

    /// Optional sign, digits with optional fraction, optional exponent
    #[regex(r"[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?", |lex| lex.slice())]
    Number(&'src str),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice())]
    Ident(&'src str),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice())]
    Quoted(&'src str),

    // Dimension sets, lists and anything else the lexer has no rule for
    Other,
}

// Skips to the first `*/`; nesting is not recognised
fn block_comment<'src>(lex: &mut Lexer<'src, DictToken<'src>>) -> FilterResult<(), LexError> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(LexError::UnterminatedComment)
        }
    }
}

/// Tokenize `source`. Characters without a rule become [`DictToken::Other`];
/// an unterminated `/*` comment fails the whole text.
pub fn tokenize(source: &str) -> Result<Vec<DictToken<'_>>> {
    let mut lexer = DictToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(LexError::Unrecognised) => tokens.push(DictToken::Other),
            Err(LexError::UnterminatedComment) => {
                return Err(ViscosityError::InvalidInput(format!(
                    "unterminated block comment at byte {}",
                    lexer.span().start
                )));
            }
        }
    }

    Ok(tokens)
}

/// Tokens strictly inside the first `name { ... }` block, or `None` when no
/// such block exists or its braces never balance.
pub fn find_block<'a, 'src>(
    tokens: &'a [DictToken<'src>],
    name: &str,
) -> Option<&'a [DictToken<'src>]> {
    let open = tokens
        .windows(2)
        .position(|pair| matches!(pair, [DictToken::Ident(id), DictToken::BraceOpen] if *id == name))?
        + 1;

    let mut depth = 0usize;
    for (offset, token) in tokens[open..].iter().enumerate() {
        match token {
            DictToken::BraceOpen => depth += 1,
            DictToken::BraceClose => {
                depth -= 1;
                if depth == 0 {
                    return Some(&tokens[open + 1..open + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// `key value;` pairs at the top level of a block body. Sub-blocks, and
/// statements that are not exactly an identifier followed by a number, are
/// skipped.
pub fn scalar_entries<'src>(body: &[DictToken<'src>]) -> Vec<(&'src str, &'src str)> {
    let mut entries = Vec::new();
    let mut statement: Vec<DictToken<'src>> = Vec::new();
    let mut depth = 0usize;

    for &token in body {
        match token {
            DictToken::BraceOpen => {
                depth += 1;
            }
            DictToken::BraceClose => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    // Keyword of the sub-block goes with it
                    statement.clear();
                }
            }
            DictToken::Semicolon if depth == 0 => {
                if let [DictToken::Ident(key), DictToken::Number(value)] = statement[..] {
                    entries.push((key, value));
                }
                statement.clear();
            }
            _ if depth == 0 => statement.push(token),
            _ => {}
        }
    }

    entries
}
