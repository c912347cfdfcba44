//! Numeric functions of the expression grammar
//!
//! These are the evaluable targets of the transformer's function-name
//! mapping: `ROUNDUP` arrives here as `CEIL`, `ROUNDDOWN` as `FLOOR`;
//! `ROUND`, `MAX` and `MIN` keep their names.

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::EvalValue;

/// Dispatch a function call by (uppercase) name
pub fn call(name: &str, args: &[EvalValue]) -> FormulaResult<EvalValue> {
    match name {
        "CEIL" => fn_ceil(args),
        "FLOOR" => fn_floor(args),
        "ROUND" => fn_round(args),
        "MAX" => fn_max(args),
        "MIN" => fn_min(args),
        _ => Err(FormulaError::UnknownFunction(name.to_string())),
    }
}

fn expect_args(function: &str, expected: usize, args: &[EvalValue]) -> FormulaResult<()> {
    if args.len() != expected {
        return Err(FormulaError::ArgumentCount {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: args.len(),
        });
    }
    Ok(())
}

fn numeric_args(function: &str, args: &[EvalValue]) -> FormulaResult<Vec<f64>> {
    args.iter()
        .map(|v| {
            v.as_number().ok_or_else(|| {
                FormulaError::Evaluation(format!("{}: expected number, got {:?}", function, v))
            })
        })
        .collect()
}

/// CEIL - round up to the next whole number
fn fn_ceil(args: &[EvalValue]) -> FormulaResult<EvalValue> {
    expect_args("CEIL", 1, args)?;
    let n = numeric_args("CEIL", args)?[0];
    Ok(EvalValue::Number(n.ceil()))
}

/// FLOOR - round down to the previous whole number
fn fn_floor(args: &[EvalValue]) -> FormulaResult<EvalValue> {
    expect_args("FLOOR", 1, args)?;
    let n = numeric_args("FLOOR", args)?[0];
    Ok(EvalValue::Number(n.floor()))
}

/// ROUND - round to the nearest whole number, halves away from zero
fn fn_round(args: &[EvalValue]) -> FormulaResult<EvalValue> {
    expect_args("ROUND", 1, args)?;
    let n = numeric_args("ROUND", args)?[0];
    Ok(EvalValue::Number(n.round()))
}

/// MAX - maximum of the arguments
fn fn_max(args: &[EvalValue]) -> FormulaResult<EvalValue> {
    if args.is_empty() {
        return Err(FormulaError::ArgumentCount {
            function: "MAX".to_string(),
            expected: "at least 1".to_string(),
            actual: 0,
        });
    }
    let nums = numeric_args("MAX", args)?;
    Ok(EvalValue::Number(nums.into_iter().fold(f64::MIN, f64::max)))
}

/// MIN - minimum of the arguments
fn fn_min(args: &[EvalValue]) -> FormulaResult<EvalValue> {
    if args.is_empty() {
        return Err(FormulaError::ArgumentCount {
            function: "MIN".to_string(),
            expected: "at least 1".to_string(),
            actual: 0,
        });
    }
    let nums = numeric_args("MIN", args)?;
    Ok(EvalValue::Number(nums.into_iter().fold(f64::MAX, f64::min)))
}
