//! `Let`/`Dim`/`Redim`/`Const`/`Swap`/`TYPE`/`DEFtype`/`DEF FN`/`DATA`/
//! `READ`/`RESTORE`/`DECLARE` (spec.md §4.F, §9).

use basic_ast::{DimDecl, InterpreterError, LValue, RuntimeErrorKind, Statement, Value};

use crate::array::ArrayVar;
use crate::expr::assign_lvalue;
use crate::record::RecordInstance;
use crate::Interpreter;

pub fn execute(interp: &mut Interpreter, stmt: &Statement, line: u32) -> Result<(), InterpreterError> {
    match stmt {
        Statement::Let { target, value } => {
            let v = interp.eval_expression(value, line)?;
            assign_lvalue(interp, target, v, line)
        }
        Statement::Dim(decls) => {
            for decl in decls {
                dim_one(interp, decl, false, line)?;
            }
            Ok(())
        }
        Statement::Redim { preserve, decls } => {
            for decl in decls {
                dim_one(interp, decl, *preserve, line)?;
            }
            Ok(())
        }
        Statement::Const { name, value } => {
            let v = interp.eval_expression(value, line)?;
            interp.env.constants.insert(name.to_ascii_uppercase(), v);
            Ok(())
        }
        Statement::Swap(a, b) => {
            let va = read_lvalue(interp, a, line)?;
            let vb = read_lvalue(interp, b, line)?;
            assign_lvalue(interp, a, vb, line)?;
            assign_lvalue(interp, b, va, line)
        }
        // `TYPE`/field decls/`EndType` are pre-scanned into `env.user_types`
        // before the program runs (`Interpreter::prescan_program`), the same
        // way `SUB`/`FUNCTION` headers are, so a `DIM ... AS t` earlier in
        // the line table than its `TYPE` block still resolves.
        Statement::Type(_) | Statement::TypeField(_) | Statement::EndType => Ok(()),
        Statement::DefType { first, last, basic_type } => {
            let kind = match basic_type.to_ascii_uppercase().as_str() {
                "INTEGER" => crate::environment::DefKind::Integer,
                "LONG" => crate::environment::DefKind::Long,
                "SINGLE" => crate::environment::DefKind::Single,
                "DOUBLE" => crate::environment::DefKind::Double,
                "STRING" => crate::environment::DefKind::Str,
                _ => return Err(InterpreterError::runtime(RuntimeErrorKind::Syntax, line)),
            };
            let lo = first.to_ascii_uppercase();
            let hi = last.to_ascii_uppercase();
            for c in lo..=hi {
                interp.env.def_types.insert(c, kind);
            }
            Ok(())
        }
        Statement::DefFn { name, params, body } => {
            interp.env.user_functions.insert(
                name.to_ascii_uppercase(),
                crate::environment::UserFunction {
                    params: params.clone(),
                    body: body.clone(),
                },
            );
            Ok(())
        }
        Statement::Declare { .. } => Ok(()),
        Statement::Data(_) => Ok(()),
        Statement::Read(targets) => exec_read(interp, targets, line),
        Statement::Restore(target) => exec_restore(interp, target.as_ref(), line),
        _ => unreachable!("non-data statement routed to dispatch::data"),
    }
}

fn read_lvalue(interp: &mut Interpreter, target: &LValue, line: u32) -> Result<Value, InterpreterError> {
    match target {
        LValue::Variable(name) => Ok(interp.env.get_variable(name)),
        LValue::Index(name, index_exprs) => {
            let mut indices = Vec::with_capacity(index_exprs.len());
            for e in index_exprs {
                indices.push(interp.eval_expression(e, line)?.as_number().unwrap_or(0.0) as i64);
            }
            let key = name.to_ascii_uppercase();
            match interp.env.arrays.get(&key).and_then(|a| a.get(&indices)) {
                Some(v) => Ok(v.clone()),
                None => Err(InterpreterError::runtime(RuntimeErrorKind::SubscriptOutOfRange, line)),
            }
        }
        LValue::Field(base, field) => match base.as_ref() {
            LValue::Variable(name) => interp
                .env
                .records
                .get(&name.to_ascii_uppercase())
                .and_then(|r| r.get(field))
                .cloned()
                .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::TypeMismatch, line)),
            _ => Err(InterpreterError::runtime(RuntimeErrorKind::TypeMismatch, line)),
        },
    }
}

fn dim_one(interp: &mut Interpreter, decl: &DimDecl, preserve: bool, line: u32) -> Result<(), InterpreterError> {
    let mut dims = Vec::with_capacity(decl.dims.len());
    for e in &decl.dims {
        dims.push(interp.eval_expression(e, line)?.as_number().unwrap_or(0.0).max(0.0) as u32);
    }
    let key = decl.name.to_ascii_uppercase();
    if let Some(type_name) = &decl.as_type {
        let type_key = type_name.to_ascii_uppercase();
        let fields = interp
            .env
            .user_types
            .get(&type_key)
            .cloned()
            .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::TypeMismatch, line))?;
        if dims.is_empty() {
            interp.env.records.insert(key, RecordInstance::new(&fields));
        } else {
            let count = dims.iter().map(|d| *d as usize + 1).product::<usize>().max(1);
            let elements = (0..count).map(|_| RecordInstance::new(&fields)).collect();
            interp
                .env
                .record_arrays
                .insert(key, crate::environment::RecordArray { dims, elements });
        }
        return Ok(());
    }
    if preserve {
        if let Some(existing) = interp.env.arrays.get(&key) {
            let resized = existing.redim_preserve(dims, &key);
            interp.env.arrays.insert(key, resized);
            return Ok(());
        }
    }
    interp.env.arrays.insert(key.clone(), ArrayVar::new(dims, &key));
    Ok(())
}

fn exec_read(interp: &mut Interpreter, targets: &[LValue], line: u32) -> Result<(), InterpreterError> {
    for target in targets {
        if interp.env.data_cursor >= interp.env.data_pool.len() {
            return Err(InterpreterError::runtime(RuntimeErrorKind::OutOfData, line));
        }
        let value = interp.env.data_pool[interp.env.data_cursor].clone();
        interp.env.data_cursor += 1;
        assign_lvalue(interp, target, value, line)?;
    }
    Ok(())
}

fn exec_restore(interp: &mut Interpreter, target: Option<&basic_ast::JumpTarget>, line: u32) -> Result<(), InterpreterError> {
    match target {
        None => interp.env.data_cursor = 0,
        Some(basic_ast::JumpTarget::Line(n)) => {
            let pos = interp
                .env
                .data_line_index
                .iter()
                .find(|(ln, _)| ln == n)
                .map(|(_, idx)| *idx)
                .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::UndefinedLineNumber, line))?;
            interp.env.data_cursor = pos;
        }
        Some(label @ basic_ast::JumpTarget::Label(_)) => {
            let pc = interp.resolve_jump(label, line)?;
            let line_number = interp.program.line_number_at(pc).unwrap_or(0);
            let pos = interp
                .env
                .data_line_index
                .iter()
                .find(|(ln, _)| *ln == line_number)
                .map(|(_, idx)| *idx)
                .unwrap_or(0);
            interp.env.data_cursor = pos;
        }
    }
    Ok(())
}

/// Pre-scans every `DATA` statement into one flat pool before the program
/// runs, since `READ` must see forward `DATA` regardless of where execution
/// currently is (spec.md §3 `data_pool`).
pub fn build_data_pool(interp: &mut Interpreter) {
    if interp.env.data_built {
        return;
    }
    let mut pool = Vec::new();
    let mut line_index = Vec::new();
    for line in interp.program.iter() {
        if let Statement::Data(raw) = &line.statement {
            line_index.push((line.number, pool.len()));
            for item in split_data_items(raw) {
                pool.push(parse_data_item(&item));
            }
        }
    }
    interp.env.data_pool = pool;
    interp.env.data_line_index = line_index;
    interp.env.data_built = true;
}

/// Splits a raw `DATA` payload on top-level commas, honoring double-quoted
/// strings the way GW-BASIC's `DATA` reader does.
fn split_data_items(raw: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in raw.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                items.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    items.push(current);
    items
}

fn parse_data_item(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Some(inner) = trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return Value::Text(inner.to_string());
    }
    match crate::builtins::parse_val(trimmed) {
        Some(n) if !trimmed.is_empty() && trimmed.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == '.') => {
            Value::Number(n)
        }
        _ => Value::Text(trimmed.to_string()),
    }
}
