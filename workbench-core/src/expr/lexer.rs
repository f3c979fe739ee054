//! Tokenizer for function expressions

use logos::Logos;

use crate::error::{Result, WorkbenchError};

#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    #[regex(r"(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    #[token("**")]
    Caret,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
}

/// A token and its 1-based column in the source
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub column: usize,
}

/// Split `source` into tokens, failing on the first unrecognised character
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>> {
    let mut lexer = Token::lexer(source);
    let mut out = Vec::new();
    let (mut column, mut counted) = (1, 0);
    while let Some(result) = lexer.next() {
        let start = lexer.span().start;
        column += source[counted..start].chars().count();
        counted = start;
        match result {
            Ok(token) => out.push(SpannedToken { token, column }),
            Err(()) => {
                return Err(WorkbenchError::Parse {
                    position: column,
                    message: format!("unexpected character '{}'", lexer.slice()),
                })
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_numbers_and_operators() {
        assert_eq!(
            kinds("x^3 - 2.5e1*x"),
            vec![
                Token::Ident("x".into()),
                Token::Caret,
                Token::Number(3.0),
                Token::Minus,
                Token::Number(25.0),
                Token::Star,
                Token::Ident("x".into()),
            ]
        );
    }

    #[test]
    fn test_double_star_is_power() {
        assert_eq!(
            kinds("x**2"),
            vec![Token::Ident("x".into()), Token::Caret, Token::Number(2.0)]
        );
    }

    #[test]
    fn test_columns() {
        let tokens = tokenize("  sin(x)").unwrap();
        assert_eq!(tokens[0].column, 3);
        assert_eq!(tokens[1].column, 6);
    }

    #[test]
    fn test_columns_on_long_input() {
        let long = vec!["x"; 500].join(" + ");
        let tokens = tokenize(&long).unwrap();
        assert_eq!(tokens.len(), 999);
        assert_eq!(tokens[998].column, long.len());
    }

    #[test]
    fn test_rejects_unknown_characters() {
        assert_eq!(
            tokenize("x $ 2"),
            Err(WorkbenchError::Parse {
                position: 3,
                message: "unexpected character '$'".into()
            })
        );
    }
}
