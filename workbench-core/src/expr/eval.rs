//! Tree-walking evaluation

use crate::expr::parser::{BinaryOp, Expr};

impl Expr {
    /// Evaluate at `x`; may yield NaN or an infinity
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Expr::Number(v) => *v,
            Expr::Variable => x,
            Expr::Neg(inner) => -inner.eval(x),
            Expr::Call(function, argument) => function.apply(argument.eval(x)),
            Expr::Binary(op, lhs, rhs) => {
                let (a, b) = (lhs.eval(x), rhs.eval(x));
                match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Pow => pow(a, b),
                }
            }
        }
    }
}

/// Integer exponents go through `powi` so negative bases stay real
fn pow(base: f64, exponent: f64) -> f64 {
    if exponent.fract() == 0.0 && exponent.abs() <= i32::MAX as f64 {
        base.powi(exponent as i32)
    } else {
        base.powf(exponent)
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::parser::parse;
    use approx::assert_relative_eq;

    fn at(source: &str, x: f64) -> f64 {
        parse(source).unwrap().eval(x)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(at("x^3 - x - 2", 2.0), 4.0);
        assert_eq!(at("2^3^2", 0.0), 512.0);
        assert_eq!(at("-x^2", 3.0), -9.0);
        assert_eq!(at("(-x)^2", 3.0), 9.0);
        assert_eq!(at("x**2 / 4", 4.0), 4.0);
        assert_eq!(at("(-2)^3", 0.0), -8.0);
    }

    #[test]
    fn test_functions_and_constants() {
        assert_relative_eq!(at("sin(pi/2) + cos(0)", 0.0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(at("ln(e) + log(e) + log10(100)", 0.0), 4.0, epsilon = 1e-12);
        assert_relative_eq!(at("sqrt(abs(x))", -16.0), 4.0);
        assert_relative_eq!(at("exp(x) - e^x", 1.3), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_finite_results_pass_through() {
        assert!(at("1/x", 0.0).is_infinite());
        assert!(at("sqrt(x)", -1.0).is_nan());
    }
}
