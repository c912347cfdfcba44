//! Expression transformer
//!
//! Rewrites a raw spreadsheet-style formula into an expression the parser
//! accepts. Three steps, in strict order:
//!
//! 1. bracket substitution: `[name]` becomes the resolved value, inlined
//!    as a numeric or quoted string literal
//! 2. conditional rewriting: `IF(cond, a, b)` becomes `(cond ? a : b)`,
//!    at any nesting depth
//! 3. function-name mapping: `ROUNDUP` to `CEIL`, `ROUNDDOWN` to `FLOOR`
//!
//! Later steps assume earlier substitutions are complete, so the order is
//! load-bearing.

use crate::error::{FormulaError, FormulaResult};
use crate::resolver::resolve;
use fence_bom_core::{CalculationContext, ScopeValue};
use lazy_regex::regex_replace_all;

/// Upper bound on conditional rewrite passes; malformed input terminates
/// instead of looping.
const MAX_REWRITE_PASSES: usize = 20;

/// Transform a raw formula into an evaluable expression string
pub fn transform(formula: &str, ctx: &CalculationContext) -> FormulaResult<String> {
    let substituted = substitute_brackets(formula, ctx);
    let rewritten = rewrite_conditionals(&substituted)?;
    Ok(map_functions(&rewritten))
}

/// Step 1: replace every `[identifier]` with its resolved value.
///
/// Numbers inline as bare literals; text inlines as a double-quoted string
/// literal (embedded quotes doubled) so string comparisons against style
/// and material codes evaluate correctly.
fn substitute_brackets(formula: &str, ctx: &CalculationContext) -> String {
    regex_replace_all!(r"\[([^\[\]]+)\]", formula, |_, name: &str| {
        inline_value(&resolve(name.trim(), ctx))
    })
    .into_owned()
}

fn inline_value(value: &ScopeValue) -> String {
    match value {
        ScopeValue::Number(n) => format_number(*n),
        ScopeValue::Text(s) => format!("\"{}\"", s.replace('"', "\"\"")),
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Step 2: rewrite every `IF(cond, a, b)` call into `(cond ? a : b)`.
///
/// One call is rewritten per pass, outermost first; rewriting re-scans so
/// `IF`s nested inside arguments are picked up on the next pass. The pass
/// count is bounded so unbalanced input terminates.
fn rewrite_conditionals(expr: &str) -> FormulaResult<String> {
    let mut text = expr.to_string();

    for _ in 0..MAX_REWRITE_PASSES {
        let Some(start) = find_conditional(&text) else {
            return Ok(text);
        };
        text = rewrite_one(&text, start)?;
    }

    if find_conditional(&text).is_some() {
        return Err(FormulaError::MalformedConditional(format!(
            "conditional nesting exceeds {} rewrites",
            MAX_REWRITE_PASSES
        )));
    }
    Ok(text)
}

/// Find the next `IF(` occurrence outside string literals that is not the
/// tail of a longer identifier.
fn find_conditional(text: &str) -> Option<usize> {
    let mut in_string = false;
    let mut prev: Option<char> = None;

    for (i, c) in text.char_indices() {
        if c == '"' {
            in_string = !in_string;
            prev = Some(c);
            continue;
        }
        if !in_string
            && text[i..].starts_with("IF(")
            && !prev.map_or(false, |p| p.is_ascii_alphanumeric() || p == '_')
        {
            return Some(i);
        }
        prev = Some(c);
    }
    None
}

/// Rewrite the `IF(` call starting at `start` into a ternary.
fn rewrite_one(text: &str, start: usize) -> FormulaResult<String> {
    let open = start + 2; // byte offset of '('

    // scan forward for the matching close paren
    let mut depth = 0i32;
    let mut in_string = false;
    let mut close = None;
    for (i, c) in text[open..].char_indices() {
        if c == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        if c == '(' {
            depth += 1;
        } else if c == ')' {
            depth -= 1;
            if depth == 0 {
                close = Some(open + i);
                break;
            }
        }
    }
    let close = close.ok_or_else(|| {
        FormulaError::MalformedConditional("unbalanced parentheses in IF call".to_string())
    })?;

    let args = split_top_level(&text[open + 1..close]);
    if args.len() != 3 {
        return Err(FormulaError::MalformedConditional(format!(
            "IF expects 3 arguments, got {}",
            args.len()
        )));
    }

    Ok(format!(
        "{}({} ? {} : {}){}",
        &text[..start],
        args[0],
        args[1],
        args[2],
        &text[close + 1..]
    ))
}

/// Split an argument list on commas at parenthesis depth zero, ignoring
/// commas inside nested parens and string literals.
fn split_top_level(args: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut current = String::new();

    for c in args.chars() {
        match c {
            '"' => {
                in_string = !in_string;
                current.push(c);
            }
            _ if in_string => current.push(c),
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                pieces.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    pieces.push(current.trim().to_string());
    pieces
}

/// Step 3: map spreadsheet function names onto the grammar's functions.
///
/// Longest names first, so the plain `ROUND` that remains afterwards is
/// the nearest-integer function. `ROUND`, `MAX` and `MIN` are native to
/// the evaluator and pass through unchanged.
fn map_functions(expr: &str) -> String {
    expr.replace("ROUNDUP(", "CEIL(")
        .replace("ROUNDDOWN(", "FLOOR(")
}
