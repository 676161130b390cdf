//! Recursive-descent parser: token stream → numbered line table (spec.md §4.C).

mod cursor;
mod expression;
mod statement;

use basic_ast::{InterpreterError, Line, Program, Statement};
use basic_lexer::Lexer;
use cursor::Cursor;

/// Parse complete BASIC source text into a `Program`.
///
/// Accepts both classic numbered-line source and QBasic-style unnumbered
/// source, which is auto-numbered at 10-line intervals before parsing
/// (SPEC_FULL.md §3.1). Mixing numbered and unnumbered lines is rejected.
pub fn parse_program(source: &str) -> Result<Program, InterpreterError> {
    let normalized = normalize_source(source);
    let tokens = Lexer::tokenize(&normalized).map_err(|e| InterpreterError::Lexical {
        line: e.line,
        message: e.message,
    })?;
    let mut cursor = Cursor::new(tokens, &normalized);
    let mut lines = Vec::new();
    while !cursor.at_eof() {
        cursor.skip_blank_lines();
        if cursor.at_eof() {
            break;
        }
        let line = cursor.parse_line()?;
        lines.push(line);
    }
    Ok(Program::new(lines))
}

/// Auto-number QBasic-style source that has no leading line numbers.
/// A program is considered "numbered" the moment any non-blank,
/// non-comment-only line starts with a digit; mixed styles are left alone
/// here and rejected later with a parse error when the parser hits a
/// non-numeric line expecting a number.
fn normalize_source(source: &str) -> String {
    let raw_lines: Vec<&str> = source.lines().collect();
    let is_numbered = raw_lines.iter().any(|l| {
        let trimmed = l.trim_start();
        !trimmed.is_empty() && trimmed.chars().next().unwrap().is_ascii_digit()
    });
    if is_numbered {
        return source.to_string();
    }
    let mut out = String::new();
    let mut number = 10u32;
    for raw in raw_lines {
        let trimmed = raw.trim_start();
        if trimmed.is_empty() {
            out.push('\n');
            continue;
        }
        out.push_str(&format!("{number} {raw}\n"));
        number += 10;
    }
    out
}

fn compound_or_single(mut stmts: Vec<Statement>) -> Statement {
    if stmts.len() == 1 {
        stmts.pop().unwrap()
    } else {
        Statement::Compound(stmts)
    }
}

pub use basic_ast::InterpreterError as ParseError;

#[cfg(test)]
mod tests;
