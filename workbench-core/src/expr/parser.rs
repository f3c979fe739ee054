//! Recursive-descent parser producing an [`Expr`] tree
//!
//! Grammar, one function per rule:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?
//! primary := number | 'x' | constant | func '(' expr ')' | '(' expr ')'
//! ```
//!
//! `^` binds tighter than unary minus and associates to the right, so
//! `-x^2` is `-(x^2)` and `2^3^2` is `2^9`.

use crate::constants::{MAX_EXPRESSION_DEPTH, MAX_EXPRESSION_LENGTH};
use crate::error::{Result, WorkbenchError};
use crate::expr::lexer::{tokenize, SpannedToken, Token};

/// Functions callable from an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Exp,
    Ln,
    Log10,
    Abs,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            "sqrt" => Self::Sqrt,
            "exp" => Self::Exp,
            "log" | "ln" => Self::Ln,
            "log10" => Self::Log10,
            "abs" => Self::Abs,
            _ => return None,
        })
    }

    pub fn apply(self, v: f64) -> f64 {
        match self {
            Self::Sin => v.sin(),
            Self::Cos => v.cos(),
            Self::Tan => v.tan(),
            Self::Asin => v.asin(),
            Self::Acos => v.acos(),
            Self::Atan => v.atan(),
            Self::Sqrt => v.sqrt(),
            Self::Exp => v.exp(),
            Self::Ln => v.ln(),
            Self::Log10 => v.log10(),
            Self::Abs => v.abs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Expression tree over the single variable `x`
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable,
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Function, Box<Expr>),
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    depth: usize,
    end_column: usize,
}

/// Parse `source` into an expression tree
///
/// Both the source length and the depth of the resulting tree are bounded,
/// so evaluating or dropping any accepted tree stays within a fixed stack.
pub fn parse(source: &str) -> Result<Expr> {
    let length = source.chars().count();
    if length > MAX_EXPRESSION_LENGTH {
        return Err(WorkbenchError::Parse {
            position: MAX_EXPRESSION_LENGTH + 1,
            message: format!("expression longer than {MAX_EXPRESSION_LENGTH} characters"),
        });
    }
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(WorkbenchError::Parse {
            position: 1,
            message: "empty expression".to_string(),
        });
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        end_column: length + 1,
    };
    let expr = parser.parse_expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(_) => Err(parser.unexpected()),
    }
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn column(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.end_column, |t| t.column)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|t| t.token.clone());
        self.pos += 1;
        token
    }

    fn error(&self, message: impl Into<String>) -> WorkbenchError {
        WorkbenchError::Parse {
            position: self.column(),
            message: message.into(),
        }
    }

    fn unexpected(&self) -> WorkbenchError {
        match self.peek() {
            None => self.error("unexpected end of expression"),
            Some(Token::Number(_) | Token::Ident(_) | Token::LParen) if self.pos > 0 => {
                self.error("implicit multiplication is not supported, use '*'")
            }
            Some(token) => self.error(format!("unexpected {}", describe(token))),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            return Err(self.error(format!(
                "expression deeper than {MAX_EXPRESSION_DEPTH} levels"
            )));
        }
        Ok(())
    }

    fn nested<T>(&mut self, rule: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let base = self.depth;
        let out = self.enter().and_then(|()| rule(self));
        self.depth = base;
        out
    }

    /// Left-associative chain of `operand`s joined by the operators `op_of` accepts
    fn chain(
        &mut self,
        op_of: fn(Option<&Token>) -> Option<BinaryOp>,
        operand: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        self.nested(|p| {
            let mut lhs = operand(p)?;
            while let Some(op) = op_of(p.peek()) {
                p.advance();
                // Every fold adds a level to the left spine
                p.enter()?;
                let rhs = operand(p)?;
                lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
            }
            Ok(lhs)
        })
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.chain(
            |token| match token {
                Some(Token::Plus) => Some(BinaryOp::Add),
                Some(Token::Minus) => Some(BinaryOp::Sub),
                _ => None,
            },
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> Result<Expr> {
        self.chain(
            |token| match token {
                Some(Token::Star) => Some(BinaryOp::Mul),
                Some(Token::Slash) => Some(BinaryOp::Div),
                _ => None,
            },
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        self.nested(|p| match p.peek() {
            Some(Token::Minus) => {
                p.advance();
                Ok(Expr::Neg(Box::new(p.parse_unary()?)))
            }
            Some(Token::Plus) => {
                p.advance();
                p.parse_unary()
            }
            _ => p.parse_power(),
        })
    }

    fn parse_power(&mut self) -> Result<Expr> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let column = self.column();
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect_close()?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "x" => Ok(Expr::Variable),
                "pi" => Ok(Expr::Number(std::f64::consts::PI)),
                "e" => Ok(Expr::Number(std::f64::consts::E)),
                _ => {
                    let function =
                        Function::lookup(&name).ok_or_else(|| WorkbenchError::Parse {
                            position: column,
                            message: format!("unknown identifier '{name}'"),
                        })?;
                    if self.peek() != Some(&Token::LParen) {
                        return Err(self.error(format!("expected '(' after {name}")));
                    }
                    self.advance();
                    let argument = self.parse_expr()?;
                    self.expect_close()?;
                    Ok(Expr::Call(function, Box::new(argument)))
                }
            },
            Some(token) => Err(WorkbenchError::Parse {
                position: column,
                message: format!("unexpected {}", describe(&token)),
            }),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn expect_close(&mut self) -> Result<()> {
        match self.peek() {
            Some(Token::RParen) => {
                self.advance();
                Ok(())
            }
            None => Err(self.error("missing ')'")),
            Some(_) => Err(self.unexpected()),
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(v) => format!("number {v}"),
        Token::Ident(name) => format!("identifier '{name}'"),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::Caret => "'^'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
    }
}
