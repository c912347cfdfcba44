//! Expression evaluator
//!
//! Evaluates transformed expression ASTs to produce quantities.

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::functions;
use crate::parser::parse_expression;

/// Value types during expression evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl EvalValue {
    /// Convert to number, if possible
    pub fn as_number(&self) -> Option<f64> {
        match self {
            EvalValue::Number(n) => Some(*n),
            EvalValue::Bool(true) => Some(1.0),
            EvalValue::Bool(false) => Some(0.0),
            EvalValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Force conversion to number for arithmetic
    fn to_number(&self) -> FormulaResult<f64> {
        self.as_number()
            .ok_or_else(|| FormulaError::Evaluation(format!("Expected number, got {:?}", self)))
    }

    /// Truthiness for conditions and boolean operators
    fn truthy(&self) -> FormulaResult<bool> {
        match self {
            EvalValue::Bool(b) => Ok(*b),
            EvalValue::Number(n) => Ok(*n != 0.0),
            EvalValue::Text(_) => match self.as_number() {
                Some(n) => Ok(n != 0.0),
                None => Err(FormulaError::Evaluation(format!(
                    "Expected condition, got {:?}",
                    self
                ))),
            },
        }
    }

    /// Convert to string for textual comparison
    fn as_text(&self) -> String {
        match self {
            EvalValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            EvalValue::Text(s) => s.clone(),
            EvalValue::Bool(true) => "TRUE".to_string(),
            EvalValue::Bool(false) => "FALSE".to_string(),
        }
    }
}

/// Evaluate an expression AST
pub fn evaluate(expr: &Expr) -> FormulaResult<EvalValue> {
    match expr {
        Expr::Number(n) => Ok(EvalValue::Number(*n)),
        Expr::Text(s) => Ok(EvalValue::Text(s.clone())),

        Expr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right),

        Expr::UnaryOp { op, operand } => {
            let value = evaluate(operand)?;
            match op {
                UnaryOperator::Negate => Ok(EvalValue::Number(-value.to_number()?)),
            }
        }

        Expr::Ternary {
            cond,
            if_true,
            if_false,
        } => {
            if evaluate(cond)?.truthy()? {
                evaluate(if_true)
            } else {
                evaluate(if_false)
            }
        }

        Expr::Function { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg)?);
            }
            functions::call(name, &values)
        }
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(op: BinaryOperator, left: &Expr, right: &Expr) -> FormulaResult<EvalValue> {
    // && and || short-circuit
    match op {
        BinaryOperator::And => {
            if !evaluate(left)?.truthy()? {
                return Ok(EvalValue::Bool(false));
            }
            return Ok(EvalValue::Bool(evaluate(right)?.truthy()?));
        }
        BinaryOperator::Or => {
            if evaluate(left)?.truthy()? {
                return Ok(EvalValue::Bool(true));
            }
            return Ok(EvalValue::Bool(evaluate(right)?.truthy()?));
        }
        _ => {}
    }

    let left_val = evaluate(left)?;
    let right_val = evaluate(right)?;

    match op {
        BinaryOperator::Add => Ok(EvalValue::Number(
            left_val.to_number()? + right_val.to_number()?,
        )),
        BinaryOperator::Subtract => Ok(EvalValue::Number(
            left_val.to_number()? - right_val.to_number()?,
        )),
        BinaryOperator::Multiply => Ok(EvalValue::Number(
            left_val.to_number()? * right_val.to_number()?,
        )),
        // Division by zero produces a non-finite number; the top-level
        // result policy squashes it to 0.
        BinaryOperator::Divide => Ok(EvalValue::Number(
            left_val.to_number()? / right_val.to_number()?,
        )),

        BinaryOperator::Equal => Ok(EvalValue::Bool(values_equal(&left_val, &right_val))),
        BinaryOperator::NotEqual => Ok(EvalValue::Bool(!values_equal(&left_val, &right_val))),
        BinaryOperator::LessThan => Ok(EvalValue::Bool(
            left_val.to_number()? < right_val.to_number()?,
        )),
        BinaryOperator::LessEqual => Ok(EvalValue::Bool(
            left_val.to_number()? <= right_val.to_number()?,
        )),
        BinaryOperator::GreaterThan => Ok(EvalValue::Bool(
            left_val.to_number()? > right_val.to_number()?,
        )),
        BinaryOperator::GreaterEqual => Ok(EvalValue::Bool(
            left_val.to_number()? >= right_val.to_number()?,
        )),

        BinaryOperator::And | BinaryOperator::Or => unreachable!("handled above"),
    }
}

/// Equality: numeric when both sides are numeric, textual otherwise
fn values_equal(left: &EvalValue, right: &EvalValue) -> bool {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => l == r,
        _ => left.as_text() == right.as_text(),
    }
}

/// Evaluate a fully-transformed expression string to a quantity.
///
/// Total over any input: a parse error, evaluation error, non-numeric
/// outcome or non-finite number (NaN, ±∞) is reported through the log and
/// becomes `0.0`, so one bad formula never aborts a batch.
pub fn evaluate_expression(expr: &str) -> f64 {
    let ast = match parse_expression(expr) {
        Ok(ast) => ast,
        Err(e) => {
            log::warn!("expression '{}' failed to parse: {}", expr, e);
            return 0.0;
        }
    };

    let value = match evaluate(&ast) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("expression '{}' failed to evaluate: {}", expr, e);
            return 0.0;
        }
    };

    let n = match value.as_number() {
        Some(n) => n,
        None => {
            log::warn!("expression '{}' produced non-numeric result {:?}", expr, value);
            return 0.0;
        }
    };

    if !n.is_finite() {
        log::warn!("expression '{}' produced non-finite result {}", expr, n);
        return 0.0;
    }

    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arithmetic() {
        assert_eq!(evaluate_expression("2+2"), 4.0);
        assert_eq!(evaluate_expression("10-3*2"), 4.0);
        assert_eq!(evaluate_expression("(10-4)/3"), 2.0);
        assert_eq!(evaluate_expression("-5+8"), 3.0);
    }

    #[test]
    fn test_functions() {
        assert_eq!(evaluate_expression("CEIL(120/8)+1"), 16.0);
        assert_eq!(evaluate_expression("FLOOR(7.9)"), 7.0);
        assert_eq!(evaluate_expression("ROUND(2.5)"), 3.0);
        assert_eq!(evaluate_expression("MAX(2, 9, 4)"), 9.0);
        assert_eq!(evaluate_expression("MIN(2, 9, 4)"), 2.0);
    }

    #[test]
    fn test_ternary_and_comparisons() {
        assert_eq!(evaluate_expression("(5 > 3 ? 1 : 2)"), 1.0);
        assert_eq!(evaluate_expression("(5 <= 3 ? 1 : 2)"), 2.0);
        assert_eq!(evaluate_expression("(1 > 0 ? (0 > 1 ? 1 : 2) : 3)"), 2.0);
    }

    #[test]
    fn test_string_comparison() {
        assert_eq!(evaluate_expression("(\"cedar\" == \"cedar\" ? 2 : 3)"), 2.0);
        assert_eq!(evaluate_expression("(\"cedar\" != \"vinyl\" ? 2 : 3)"), 2.0);
        assert_eq!(evaluate_expression("(\"cedar\" == \"vinyl\" ? 2 : 3)"), 3.0);
    }

    #[test]
    fn test_boolean_operators() {
        assert_eq!(evaluate_expression("(1 > 0 && 2 > 1 ? 5 : 6)"), 5.0);
        assert_eq!(evaluate_expression("(1 > 2 || 2 > 1 ? 5 : 6)"), 5.0);
        assert_eq!(evaluate_expression("(1 > 2 && 2 > 1 ? 5 : 6)"), 6.0);
    }

    #[test]
    fn test_division_by_zero_squashes_to_zero() {
        assert_eq!(evaluate_expression("1/0"), 0.0);
        assert_eq!(evaluate_expression("0/0"), 0.0);
    }

    #[test]
    fn test_errors_squash_to_zero() {
        // parse error
        assert_eq!(evaluate_expression("1+"), 0.0);
        // unknown function
        assert_eq!(evaluate_expression("SUM(1,2)"), 0.0);
        // non-numeric result
        assert_eq!(evaluate_expression("\"cedar\""), 0.0);
    }

    #[test]
    fn test_bool_result_coerces_to_number() {
        assert_eq!(evaluate_expression("5 > 3"), 1.0);
        assert_eq!(evaluate_expression("3 > 5"), 0.0);
    }
}
