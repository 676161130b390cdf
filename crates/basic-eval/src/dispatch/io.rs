//! Text/file I/O statements (spec.md §4.F "Print"/"Input", §4.G
//! component G): `PRINT`/`PRINT #`/`PRINT USING`, `INPUT`/`LINE INPUT`,
//! `OPEN`/`CLOSE`/`WRITE`/`FIELD`/`GET`/`PUT`/`LSET`/`RSET`, and
//! `KILL`/`NAME`/`FILES`.

use basic_ast::{Expression, InterpreterError, LValue, PrintItem, PrintSep, RuntimeErrorKind, Statement, Value};
use basic_files::{FilesError, OpenMode as FilesOpenMode};

use crate::expr::assign_lvalue;
use crate::format::{apply_print_using, format_number_for_print, format_text_for_print};
use crate::Interpreter;

pub fn execute(interp: &mut Interpreter, stmt: &Statement, line: u32) -> Result<(), InterpreterError> {
    match stmt {
        Statement::Print(items) => exec_print(interp, items, line),
        Statement::PrintFile { file_num, items } => exec_print_file(interp, file_num, items, line),
        Statement::PrintUsing { file_num, format, items } => exec_print_using(interp, file_num.as_ref(), format, items, line),
        Statement::Input { prompt, targets } => exec_input(interp, prompt.as_deref(), targets, line),
        Statement::LineInput { file_num, prompt, target } => exec_line_input(interp, file_num.as_ref(), prompt.as_deref(), target, line),
        Statement::Open { path, mode, file_num, record_len } => exec_open(interp, path, *mode, file_num, record_len.as_ref(), line),
        Statement::Close(nums) => exec_close(interp, nums, line),
        Statement::Write { file_num, items } => exec_write(interp, file_num.as_ref(), items, line),
        Statement::Field { file_num, fields } => exec_field(interp, file_num, fields, line),
        Statement::GetRecord { file_num, record } => exec_get_record(interp, file_num, record.as_ref(), line),
        Statement::PutRecord { file_num, record } => exec_put_record(interp, file_num, record.as_ref(), line),
        Statement::Lset { target, value } => exec_lset_rset(interp, target, value, true, line),
        Statement::Rset { target, value } => exec_lset_rset(interp, target, value, false, line),
        Statement::Kill(path) => {
            let p = interp.eval_expression(path, line)?;
            interp.env.files.kill(&text_of(&p)).map_err(|e| files_err(e, line))
        }
        Statement::Name { old, new } => {
            let o = interp.eval_expression(old, line)?;
            let n = interp.eval_expression(new, line)?;
            interp.env.files.name(&text_of(&o), &text_of(&n)).map_err(|e| files_err(e, line))
        }
        Statement::Files(path) => {
            let p = match path {
                Some(e) => Some(text_of(&interp.eval_expression(e, line)?)),
                None => None,
            };
            let names = interp.env.files.files(p.as_deref()).map_err(|e| files_err(e, line))?;
            for name in names {
                interp.console.write_line(Some(&name));
            }
            Ok(())
        }
        _ => unreachable!("non-io statement routed to dispatch::io"),
    }
}

fn text_of(v: &Value) -> String {
    match v {
        Value::Text(s) => s.clone(),
        Value::Number(n) => crate::format::str_dollar(*n).trim().to_string(),
    }
}

fn file_num_of(interp: &mut Interpreter, expr: &Expression, line: u32) -> Result<u32, InterpreterError> {
    Ok(interp.eval_expression(expr, line)?.as_number().unwrap_or(0.0) as u32)
}

/// `PRINT`: semicolons mean "no separator", commas advance to the next
/// 14-column zone (spec.md §4.F "Print"). `print_column` tracks position for
/// `POS`/zone math across calls, reset at each newline.
fn render_print_items(interp: &mut Interpreter, items: &[PrintItem], line: u32) -> Result<String, InterpreterError> {
    let mut out = String::new();
    let mut trailing_sep = false;
    for item in items {
        match item {
            PrintItem::Expr(e) => {
                // `TAB`/`SPC` move the cursor rather than contributing a
                // formatted value (spec.md §4.F); render them as the raw
                // padding `dispatch_builtin` computed, never through
                // `format_number_for_print`'s sign/trailing-space padding.
                let is_cursor_builtin = matches!(
                    e,
                    Expression::ArrayOrCall(name, _)
                        if name.eq_ignore_ascii_case("TAB") || name.eq_ignore_ascii_case("SPC")
                );
                let v = interp.eval_expression(e, line)?;
                let rendered = match &v {
                    Value::Text(s) if is_cursor_builtin => s.clone(),
                    Value::Number(n) => format_number_for_print(*n),
                    Value::Text(s) => format_text_for_print(s),
                };
                out.push_str(&rendered);
                interp.env.print_column += rendered.chars().count();
                trailing_sep = false;
            }
            PrintItem::Sep(PrintSep::Semicolon) => {
                trailing_sep = true;
            }
            PrintItem::Sep(PrintSep::Comma) => {
                let target = crate::format::next_zone_column(interp.env.print_column);
                let pad = target.saturating_sub(interp.env.print_column);
                out.push_str(&" ".repeat(pad));
                interp.env.print_column = target;
                trailing_sep = true;
            }
        }
    }
    if !trailing_sep {
        out.push('\n');
        interp.env.print_column = 0;
    }
    Ok(out)
}

fn exec_print(interp: &mut Interpreter, items: &[PrintItem], line: u32) -> Result<(), InterpreterError> {
    let rendered = render_print_items(interp, items, line)?;
    interp.console.write(&rendered);
    Ok(())
}

fn exec_print_file(interp: &mut Interpreter, file_num: &Expression, items: &[PrintItem], line: u32) -> Result<(), InterpreterError> {
    let num = file_num_of(interp, file_num, line)?;
    let rendered = render_print_items(interp, items, line)?;
    interp.env.files.write_text(num, &rendered).map_err(|e| files_err(e, line))
}

fn exec_print_using(
    interp: &mut Interpreter,
    file_num: Option<&Expression>,
    format: &Expression,
    items: &[Expression],
    line: u32,
) -> Result<(), InterpreterError> {
    let fmt = interp.eval_expression(format, line)?;
    let fmt_text = text_of(&fmt);
    let mut values = Vec::with_capacity(items.len());
    for e in items {
        values.push(interp.eval_expression(e, line)?);
    }
    let rendered = apply_print_using(&fmt_text, &values);
    match file_num {
        Some(fe) => {
            let num = file_num_of(interp, fe, line)?;
            interp.env.files.write_text(num, &format!("{rendered}\n")).map_err(|e| files_err(e, line))
        }
        None => {
            interp.console.write_line(Some(&rendered));
            interp.env.print_column = 0;
            Ok(())
        }
    }
}

fn exec_input(interp: &mut Interpreter, prompt: Option<&str>, targets: &[LValue], line: u32) -> Result<(), InterpreterError> {
    if let Some(p) = prompt {
        interp.console.write(p);
    }
    interp.console.write("? ");
    let line_text = interp.console.read_line().unwrap_or_default();
    let parts: Vec<&str> = line_text.split(',').collect();
    for (i, target) in targets.iter().enumerate() {
        let raw = parts.get(i).copied().unwrap_or("").trim();
        let value = input_value_for(interp, target, raw);
        assign_lvalue(interp, target, value, line)?;
    }
    Ok(())
}

fn input_value_for(interp: &Interpreter, target: &LValue, raw: &str) -> Value {
    let is_text = match target {
        LValue::Variable(name) => interp.env.is_text_name(name),
        LValue::Index(name, _) => interp.env.is_text_name(name),
        LValue::Field(..) => true,
    };
    if is_text {
        Value::Text(raw.to_string())
    } else {
        Value::Number(crate::builtins::parse_val(raw).unwrap_or(0.0))
    }
}

fn exec_line_input(
    interp: &mut Interpreter,
    file_num: Option<&Expression>,
    prompt: Option<&str>,
    target: &LValue,
    line: u32,
) -> Result<(), InterpreterError> {
    let raw = match file_num {
        Some(fe) => {
            let num = file_num_of(interp, fe, line)?;
            interp.env.files.read_line_required(num).map_err(|e| files_err(e, line))?
        }
        None => {
            if let Some(p) = prompt {
                interp.console.write(p);
            }
            interp.console.read_line().unwrap_or_default()
        }
    };
    assign_lvalue(interp, target, Value::Text(raw), line)
}

fn map_open_mode(mode: basic_ast::OpenMode) -> FilesOpenMode {
    match mode {
        basic_ast::OpenMode::Input => FilesOpenMode::Input,
        basic_ast::OpenMode::Output => FilesOpenMode::Output,
        basic_ast::OpenMode::Append => FilesOpenMode::Append,
        basic_ast::OpenMode::Random => FilesOpenMode::Random,
    }
}

fn exec_open(
    interp: &mut Interpreter,
    path: &Expression,
    mode: basic_ast::OpenMode,
    file_num: &Expression,
    record_len: Option<&Expression>,
    line: u32,
) -> Result<(), InterpreterError> {
    let path_v = interp.eval_expression(path, line)?;
    let num = file_num_of(interp, file_num, line)?;
    let len = match record_len {
        Some(e) => Some(interp.eval_expression(e, line)?.as_number().unwrap_or(128.0) as usize),
        None => None,
    };
    interp
        .env
        .files
        .open(num, &text_of(&path_v), map_open_mode(mode), len)
        .map_err(|e| files_err(e, line))
}

fn exec_close(interp: &mut Interpreter, nums: &[Expression], line: u32) -> Result<(), InterpreterError> {
    if nums.is_empty() {
        interp.env.files.close_all();
        return Ok(());
    }
    for e in nums {
        let num = file_num_of(interp, e, line)?;
        interp.env.files.close(num).map_err(|err| files_err(err, line))?;
    }
    Ok(())
}

fn exec_write(interp: &mut Interpreter, file_num: Option<&Expression>, items: &[Expression], line: u32) -> Result<(), InterpreterError> {
    let mut rendered = String::new();
    for (i, e) in items.iter().enumerate() {
        if i > 0 {
            rendered.push(',');
        }
        let v = interp.eval_expression(e, line)?;
        match v {
            Value::Text(s) => rendered.push_str(&format!("\"{s}\"")),
            Value::Number(n) => rendered.push_str(&crate::format::str_dollar(n).trim()),
        }
    }
    rendered.push_str("\r\n");
    match file_num {
        Some(fe) => {
            let num = file_num_of(interp, fe, line)?;
            interp.env.files.write_text(num, &rendered).map_err(|e| files_err(e, line))
        }
        None => {
            interp.console.write(&rendered);
            Ok(())
        }
    }
}

fn exec_field(interp: &mut Interpreter, file_num: &Expression, fields: &[basic_ast::FieldSpec], line: u32) -> Result<(), InterpreterError> {
    let num = file_num_of(interp, file_num, line)?;
    let mut decls = Vec::with_capacity(fields.len());
    for f in fields {
        let w = interp.eval_expression(&f.width, line)?.as_number().unwrap_or(0.0).max(0.0) as usize;
        decls.push((w, f.var.clone()));
    }
    interp.env.files.set_field(num, &decls).map_err(|e| files_err(e, line))
}

fn exec_get_record(interp: &mut Interpreter, file_num: &Expression, record: Option<&Expression>, line: u32) -> Result<(), InterpreterError> {
    let num = file_num_of(interp, file_num, line)?;
    let rec = match record {
        Some(e) => Some(interp.eval_expression(e, line)?.as_number().unwrap_or(0.0) as u32),
        None => None,
    };
    interp.env.files.get_record(num, rec).map_err(|e| files_err(e, line))
}

fn exec_put_record(interp: &mut Interpreter, file_num: &Expression, record: Option<&Expression>, line: u32) -> Result<(), InterpreterError> {
    let num = file_num_of(interp, file_num, line)?;
    let rec = match record {
        Some(e) => Some(interp.eval_expression(e, line)?.as_number().unwrap_or(0.0) as u32),
        None => None,
    };
    interp.env.files.put_record(num, rec).map_err(|e| files_err(e, line))
}

fn exec_lset_rset(interp: &mut Interpreter, target: &LValue, value: &Expression, left: bool, line: u32) -> Result<(), InterpreterError> {
    let v = interp.eval_expression(value, line)?;
    let text = text_of(&v);
    let var_name = match target {
        LValue::Variable(name) => name.clone(),
        _ => return Err(InterpreterError::runtime(RuntimeErrorKind::TypeMismatch, line)),
    };
    // `LSET`/`RSET` on a `FIELD`-bound variable write through the file
    // record buffer of whichever open file currently declares that field
    // name (spec.md §4.G); scanning every handle keeps the statement from
    // needing its own file-number argument, matching classic BASIC syntax.
    for num in interp.env.files.open_numbers() {
        if interp
            .env
            .files
            .get(num)
            .ok()
            .map(|h| h.fields().iter().any(|f| f.var.eq_ignore_ascii_case(&var_name)))
            .unwrap_or(false)
        {
            return if left {
                interp.env.files.lset(num, &var_name, &text).map_err(|e| files_err(e, line))
            } else {
                interp.env.files.rset(num, &var_name, &text).map_err(|e| files_err(e, line))
            };
        }
    }
    // Not a FIELD variable: plain string assignment, left- or right-padded
    // to its current length the way `LSET`/`RSET` behave on ordinary
    // string variables.
    let current = interp.env.get_variable(&var_name);
    let width = match &current {
        Value::Text(s) => s.chars().count(),
        _ => text.chars().count(),
    };
    let mut cell: String = text.chars().take(width).collect();
    while cell.chars().count() < width {
        if left {
            cell.push(' ');
        } else {
            cell.insert(0, ' ');
        }
    }
    assign_lvalue(interp, target, Value::Text(cell), line)
}

pub fn files_err(e: FilesError, line: u32) -> InterpreterError {
    match e {
        FilesError::FileNotFound(_) => InterpreterError::runtime(RuntimeErrorKind::FileNotFound, line),
        FilesError::FileAlreadyOpen(_) => InterpreterError::runtime(RuntimeErrorKind::FileAlreadyOpen, line),
        FilesError::InputPastEnd(_) => InterpreterError::runtime(RuntimeErrorKind::InputPastEnd, line),
        FilesError::PathNotFound(_) => InterpreterError::runtime(RuntimeErrorKind::PathNotFound, line),
        FilesError::NotOpen(_) => InterpreterError::runtime(RuntimeErrorKind::FileNotFound, line),
        FilesError::Io(err) => InterpreterError::runtime_with(RuntimeErrorKind::FileNotFound, line, err.to_string()),
    }
}
