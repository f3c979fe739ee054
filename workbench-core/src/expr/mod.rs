//! User-supplied functions of one variable
//!
//! Source text is tokenized, parsed into an [`Expr`] tree and evaluated by a
//! small interpreter. Only the operators, functions and constants the parser
//! knows about can appear, so nothing in an expression reaches the host.

pub mod eval;
pub mod lexer;
pub mod parser;

pub use parser::{parse, BinaryOp, Expr, Function};

use crate::error::{Result, WorkbenchError};
use crate::traits::ScalarFunction;

/// A parsed expression together with its source text
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    ast: Expr,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self> {
        Ok(Self {
            source: source.trim().to_string(),
            ast: parse(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }
}

impl core::str::FromStr for Expression {
    type Err = WorkbenchError;

    fn from_str(source: &str) -> Result<Self> {
        Self::parse(source)
    }
}

impl ScalarFunction for Expression {
    fn evaluate(&self, x: f64) -> Result<f64> {
        let y = self.ast.eval(x);
        if y.is_finite() {
            Ok(y)
        } else {
            Err(WorkbenchError::NonFiniteValue { x })
        }
    }

    fn label(&self) -> String {
        self.source.clone()
    }
}
