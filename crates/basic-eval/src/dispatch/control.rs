//! Control-flow statements (spec.md §4.F "Execute", §9 "Line-numbered
//! structured code"): `GOTO`/`GOSUB`/`RETURN`, block `IF`, `FOR`/`NEXT`,
//! `WHILE`/`WEND`, `DO`/`LOOP`, `SELECT CASE`, and `SUB`/`FUNCTION` calls.
//!
//! Structured bodies are never nested in the AST; every marker statement
//! here is found by scanning the flat line table with a depth counter, the
//! way spec.md §9 describes.

use basic_ast::{
    CaseClause, DoKind, Expression, ExitScope, InterpreterError, JumpTarget, OnErrorTarget,
    ParamDecl, ResumeKind, RuntimeErrorKind, Statement, Value,
};

use crate::environment::{ForState, IfFrame, RoutineInfo, SelectFrame};
use crate::expr::apply_binop;
use crate::Interpreter;

pub fn execute(interp: &mut Interpreter, stmt: &Statement, line: u32) -> Result<(), InterpreterError> {
    match stmt {
        Statement::Goto(target) => {
            let idx = interp.resolve_jump(target, line)?;
            interp.set_next_pc(idx);
            Ok(())
        }
        Statement::Gosub(target) => {
            let idx = interp.resolve_jump(target, line)?;
            interp.env.gosub_return.push(interp.pc + 1);
            interp.set_next_pc(idx);
            Ok(())
        }
        Statement::Return => {
            let ret = interp
                .env
                .gosub_return
                .pop()
                .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::ReturnWithoutGosub, line))?;
            interp.set_next_pc(ret);
            Ok(())
        }

        Statement::If { condition, then, .. } => exec_if(interp, condition, then, line),
        Statement::ElseIf(condition) => exec_elseif(interp, condition, line),
        Statement::Else => exec_else(interp, line),
        Statement::EndIf => exec_endif(interp, line),

        Statement::For { var, start, end, step } => exec_for(interp, var, start, end, step.as_ref(), line),
        Statement::Next(name) => exec_next(interp, name.as_deref(), line),

        Statement::While(condition) => exec_while(interp, condition, line),
        Statement::Wend => exec_wend(interp, line),

        Statement::Do { cond, kind } => exec_do(interp, cond.as_ref(), *kind, line),
        Statement::Loop { cond, kind } => exec_loop(interp, cond.as_ref(), *kind, line),

        Statement::Exit(scope) => exec_exit(interp, *scope, line),

        Statement::End | Statement::Stop => {
            interp.end_program = true;
            Ok(())
        }

        Statement::OnGoto { selector, targets, is_gosub } => exec_on_goto(interp, selector, targets, *is_gosub, line),
        Statement::OnError(target) => exec_on_error(interp, target, line),
        Statement::Resume { kind, target } => exec_resume(interp, *kind, target.as_ref(), line),

        Statement::Sleep(duration) => {
            let secs = match duration {
                Some(e) => interp.eval_expression(e, line)?.as_number().unwrap_or(0.0),
                None => 0.0,
            };
            if secs > 0.0 {
                std::thread::sleep(std::time::Duration::from_secs_f64(secs.max(0.0)));
            }
            Ok(())
        }
        Statement::Randomize(seed) => {
            match seed {
                Some(e) => {
                    let n = interp.eval_expression(e, line)?.as_number().unwrap_or(0.0);
                    interp.env.reseed(n);
                }
                None => interp.env.reseed_nondeterministic(),
            }
            Ok(())
        }

        Statement::SelectCase(selector) => exec_select_case(interp, selector, line),
        Statement::Case(clauses) => exec_case(interp, clauses, line),
        Statement::CaseElse => exec_case_else(interp, line),
        Statement::EndSelect => exec_end_select(interp, line),

        Statement::Sub { .. } | Statement::Function { .. } => {
            // Headers only matter at prescan time; reached by straight-line
            // fallthrough only if a program runs directly into a routine body
            // without calling it, which just skips over into its statements.
            Ok(())
        }
        Statement::EndSub | Statement::EndFunction => {
            pop_routine_frame(interp, line)
        }
        Statement::CallSub { name, args } => exec_call_sub(interp, name, args, line),

        _ => unreachable!("non-control statement routed to dispatch::control"),
    }
}

/// Finds the marker at depth 0 that closes the block opened at `start`,
/// treating every occurrence of `is_open` after `start` as one level of
/// nesting to skip (spec.md §9).
fn scan_forward(
    interp: &Interpreter,
    start: usize,
    is_open: impl Fn(&Statement) -> bool,
    is_close: impl Fn(&Statement) -> bool,
) -> Option<usize> {
    let mut depth = 0i32;
    let mut idx = start + 1;
    while let Some(line) = interp.program.get(idx) {
        if is_close(&line.statement) {
            if depth == 0 {
                return Some(idx);
            }
            depth -= 1;
        } else if is_open(&line.statement) {
            depth += 1;
        }
        idx += 1;
    }
    None
}

fn is_block_if(stmt: &Statement) -> bool {
    matches!(stmt, Statement::If { then: basic_ast::ThenBranch::Block, .. })
}

/// The final `EndIf` that closes the `If` at `start`, skipping any nested
/// block `If`s entirely (their own `ElseIf`/`Else` never affect this depth).
fn scan_to_endif(interp: &Interpreter, start: usize) -> Option<usize> {
    scan_forward(interp, start, is_block_if, |s| matches!(s, Statement::EndIf))
}

/// The next `ElseIf`/`Else`/`EndIf` belonging to the same `If`, used only
/// while no branch has matched yet.
fn scan_to_next_if_branch(interp: &Interpreter, start: usize) -> Option<usize> {
    scan_forward(interp, start, is_block_if, |s| {
        matches!(s, Statement::ElseIf(_) | Statement::Else | Statement::EndIf)
    })
}

fn exec_if(
    interp: &mut Interpreter,
    condition: &Expression,
    then: &basic_ast::ThenBranch,
    line: u32,
) -> Result<(), InterpreterError> {
    let taken = interp.eval_expression(condition, line)?.truthy();
    match then {
        basic_ast::ThenBranch::Inline(inner) => {
            if taken {
                super::execute_statement(interp, inner, line)?;
            }
            Ok(())
        }
        basic_ast::ThenBranch::Block => {
            let endif_pc = scan_to_endif(interp, interp.pc)
                .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
            interp.env.if_stack.push(IfFrame { endif_pc, taken });
            if taken {
                interp.set_next_pc(interp.pc + 1);
            } else {
                let next_branch = scan_to_next_if_branch(interp, interp.pc)
                    .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
                interp.set_next_pc(next_branch);
            }
            Ok(())
        }
    }
}

fn exec_elseif(interp: &mut Interpreter, condition: &Expression, line: u32) -> Result<(), InterpreterError> {
    let frame = interp
        .env
        .if_stack
        .last()
        .cloned()
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
    if frame.taken {
        interp.env.if_stack.pop();
        interp.set_next_pc(frame.endif_pc + 1);
        return Ok(());
    }
    let taken = interp.eval_expression(condition, line)?.truthy();
    if taken {
        interp.env.if_stack.last_mut().unwrap().taken = true;
        interp.set_next_pc(interp.pc + 1);
    } else {
        let next_branch = scan_to_next_if_branch(interp, interp.pc)
            .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
        interp.set_next_pc(next_branch);
    }
    Ok(())
}

fn exec_else(interp: &mut Interpreter, line: u32) -> Result<(), InterpreterError> {
    let frame = interp
        .env
        .if_stack
        .last()
        .cloned()
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
    if frame.taken {
        interp.env.if_stack.pop();
        interp.set_next_pc(frame.endif_pc + 1);
    } else {
        interp.env.if_stack.last_mut().unwrap().taken = true;
        interp.set_next_pc(interp.pc + 1);
    }
    Ok(())
}

fn exec_endif(interp: &mut Interpreter, line: u32) -> Result<(), InterpreterError> {
    interp
        .env
        .if_stack
        .pop()
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
    interp.set_next_pc(interp.pc + 1);
    Ok(())
}

fn exec_for(
    interp: &mut Interpreter,
    var: &str,
    start: &Expression,
    end: &Expression,
    step: Option<&Expression>,
    line: u32,
) -> Result<(), InterpreterError> {
    let start_v = interp.eval_expression(start, line)?.as_number().unwrap_or(0.0);
    let end_v = interp.eval_expression(end, line)?.as_number().unwrap_or(0.0);
    let step_v = match step {
        Some(e) => interp.eval_expression(e, line)?.as_number().unwrap_or(1.0),
        None => 1.0,
    };
    interp.env.set_variable(var, Value::Number(start_v));
    let continues = if step_v >= 0.0 { start_v <= end_v } else { start_v >= end_v };
    if !continues {
        let next_idx = scan_forward(interp, interp.pc, |s| matches!(s, Statement::For { .. }), |s| {
            matches!(s, Statement::Next(_))
        })
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
        interp.set_next_pc(next_idx + 1);
        return Ok(());
    }
    interp.env.for_loop_state.push(ForState {
        var: var.to_string(),
        end: end_v,
        step: step_v,
        pc: interp.pc,
    });
    interp.set_next_pc(interp.pc + 1);
    Ok(())
}

fn exec_next(interp: &mut Interpreter, name: Option<&str>, line: u32) -> Result<(), InterpreterError> {
    let frame = interp
        .env
        .for_loop_state
        .last()
        .cloned()
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::NextWithoutFor, line))?;
    if let Some(expected) = name
        && !expected.eq_ignore_ascii_case(&frame.var)
    {
        // `Next x` naming a variable that isn't the innermost open `For` is
        // fatal, not a silent pop of the wrong frame (spec.md §4.F, §8
        // "stack discipline").
        return Err(InterpreterError::runtime(RuntimeErrorKind::NextWithoutFor, line));
    }
    let current = interp.env.get_variable(&frame.var).as_number().unwrap_or(0.0);
    let updated = current + frame.step;
    let continues = if frame.step >= 0.0 { updated <= frame.end } else { updated >= frame.end };
    if continues {
        interp.env.set_variable(&frame.var, Value::Number(updated));
        interp.set_next_pc(frame.pc + 1);
    } else {
        interp.env.for_loop_state.pop();
        interp.set_next_pc(interp.pc + 1);
    }
    Ok(())
}

fn exec_while(interp: &mut Interpreter, condition: &Expression, line: u32) -> Result<(), InterpreterError> {
    let taken = interp.eval_expression(condition, line)?.truthy();
    if taken {
        interp.env.while_loop_state.push(interp.pc);
        interp.set_next_pc(interp.pc + 1);
    } else {
        let wend_idx = scan_forward(interp, interp.pc, |s| matches!(s, Statement::While(_)), |s| {
            matches!(s, Statement::Wend)
        })
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
        interp.set_next_pc(wend_idx + 1);
    }
    Ok(())
}

fn exec_wend(interp: &mut Interpreter, line: u32) -> Result<(), InterpreterError> {
    let while_pc = interp
        .env
        .while_loop_state
        .pop()
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
    interp.set_next_pc(while_pc);
    Ok(())
}

fn do_condition(interp: &mut Interpreter, cond: &Expression, kind: Option<DoKind>, line: u32) -> Result<bool, InterpreterError> {
    let v = interp.eval_expression(cond, line)?.truthy();
    Ok(match kind {
        Some(DoKind::Until) => !v,
        _ => v,
    })
}

fn exec_do(interp: &mut Interpreter, cond: Option<&Expression>, kind: Option<DoKind>, line: u32) -> Result<(), InterpreterError> {
    let enter = match cond {
        Some(c) => do_condition(interp, c, kind, line)?,
        None => true,
    };
    if enter {
        interp.env.do_loop_state.push(interp.pc);
        interp.set_next_pc(interp.pc + 1);
    } else {
        let loop_idx = scan_forward(interp, interp.pc, |s| matches!(s, Statement::Do { .. }), |s| {
            matches!(s, Statement::Loop { .. })
        })
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
        interp.set_next_pc(loop_idx + 1);
    }
    Ok(())
}

fn exec_loop(interp: &mut Interpreter, cond: Option<&Expression>, kind: Option<DoKind>, line: u32) -> Result<(), InterpreterError> {
    let do_pc = interp
        .env
        .do_loop_state
        .pop()
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
    let again = match cond {
        Some(c) => do_condition(interp, c, kind, line)?,
        None => true,
    };
    if again {
        interp.set_next_pc(do_pc);
    } else {
        interp.set_next_pc(interp.pc + 1);
    }
    Ok(())
}

fn exec_exit(interp: &mut Interpreter, scope: ExitScope, line: u32) -> Result<(), InterpreterError> {
    match scope {
        ExitScope::For => {
            let frame = interp
                .env
                .for_loop_state
                .pop()
                .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::NextWithoutFor, line))?;
            let next_idx = scan_forward(interp, frame.pc, |s| matches!(s, Statement::For { .. }), |s| {
                matches!(s, Statement::Next(_))
            })
            .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
            interp.set_next_pc(next_idx + 1);
            Ok(())
        }
        ExitScope::Do => {
            let do_pc = interp
                .env
                .do_loop_state
                .pop()
                .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
            let loop_idx = scan_forward(interp, do_pc, |s| matches!(s, Statement::Do { .. }), |s| {
                matches!(s, Statement::Loop { .. })
            })
            .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
            interp.set_next_pc(loop_idx + 1);
            Ok(())
        }
        ExitScope::Sub | ExitScope::Function => pop_routine_frame(interp, line),
    }
}

fn exec_on_goto(
    interp: &mut Interpreter,
    selector: &Expression,
    targets: &[JumpTarget],
    is_gosub: bool,
    line: u32,
) -> Result<(), InterpreterError> {
    let idx = interp.eval_expression(selector, line)?.as_number().unwrap_or(0.0) as i64;
    if idx < 1 || idx as usize > targets.len() {
        return Ok(());
    }
    let target = &targets[idx as usize - 1];
    let resolved = interp.resolve_jump(target, line)?;
    if is_gosub {
        interp.env.gosub_return.push(interp.pc + 1);
    }
    interp.set_next_pc(resolved);
    Ok(())
}

fn exec_on_error(interp: &mut Interpreter, target: &OnErrorTarget, line: u32) -> Result<(), InterpreterError> {
    match target {
        OnErrorTarget::Goto(jump) => {
            let idx = interp.resolve_jump(jump, line)?;
            interp.env.error.handler_pc = Some(idx);
        }
        OnErrorTarget::Off => {
            interp.env.error.handler_pc = None;
        }
    }
    Ok(())
}

fn exec_resume(
    interp: &mut Interpreter,
    kind: ResumeKind,
    target: Option<&JumpTarget>,
    line: u32,
) -> Result<(), InterpreterError> {
    if !interp.env.error.in_handler {
        return Err(InterpreterError::runtime(RuntimeErrorKind::ResumeWithoutError, line));
    }
    let fault_pc = interp
        .env
        .error
        .resume_pc
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::ResumeWithoutError, line))?;
    let dest = match kind {
        ResumeKind::Same => fault_pc,
        ResumeKind::Next => fault_pc + 1,
        ResumeKind::Line => {
            let t = target.ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
            interp.resolve_jump(t, line)?
        }
    };
    interp.env.error.in_handler = false;
    interp.env.error.resume_pc = None;
    interp.set_next_pc(dest);
    Ok(())
}

fn is_select_case(stmt: &Statement) -> bool {
    matches!(stmt, Statement::SelectCase(_))
}

fn scan_to_endselect(interp: &Interpreter, start: usize) -> Option<usize> {
    scan_forward(interp, start, is_select_case, |s| matches!(s, Statement::EndSelect))
}

fn scan_to_next_case_branch(interp: &Interpreter, start: usize) -> Option<usize> {
    scan_forward(interp, start, is_select_case, |s| {
        matches!(s, Statement::Case(_) | Statement::CaseElse | Statement::EndSelect)
    })
}

fn exec_select_case(interp: &mut Interpreter, selector: &Expression, line: u32) -> Result<(), InterpreterError> {
    let value = interp.eval_expression(selector, line)?;
    interp.env.select_case.push(SelectFrame { value, matched: false });
    interp.set_next_pc(interp.pc + 1);
    Ok(())
}

fn clause_matches(selector: &Value, clause: &CaseClause, interp: &mut Interpreter, line: u32) -> Result<bool, InterpreterError> {
    match clause {
        CaseClause::Value(e) => {
            let v = interp.eval_expression(e, line)?;
            Ok(apply_binop(selector.clone(), basic_ast::BinOp::Eq, v, line)?.truthy())
        }
        CaseClause::Range(lo, hi) => {
            let lo_v = interp.eval_expression(lo, line)?;
            let hi_v = interp.eval_expression(hi, line)?;
            let ge_lo = apply_binop(selector.clone(), basic_ast::BinOp::GtEq, lo_v, line)?.truthy();
            let le_hi = apply_binop(selector.clone(), basic_ast::BinOp::LtEq, hi_v, line)?.truthy();
            Ok(ge_lo && le_hi)
        }
        CaseClause::Is(op, e) => {
            let v = interp.eval_expression(e, line)?;
            Ok(apply_binop(selector.clone(), *op, v, line)?.truthy())
        }
    }
}

fn exec_case(interp: &mut Interpreter, clauses: &[CaseClause], line: u32) -> Result<(), InterpreterError> {
    let frame = interp
        .env
        .select_case
        .last()
        .cloned()
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
    if frame.matched {
        let endselect_pc = scan_to_endselect(interp, interp.pc)
            .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
        interp.env.select_case.pop();
        interp.set_next_pc(endselect_pc + 1);
        return Ok(());
    }
    let mut hit = false;
    for clause in clauses {
        if clause_matches(&frame.value, clause, interp, line)? {
            hit = true;
            break;
        }
    }
    if hit {
        interp.env.select_case.last_mut().unwrap().matched = true;
        interp.set_next_pc(interp.pc + 1);
    } else {
        let next_branch = scan_to_next_case_branch(interp, interp.pc)
            .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
        interp.set_next_pc(next_branch);
    }
    Ok(())
}

fn exec_case_else(interp: &mut Interpreter, line: u32) -> Result<(), InterpreterError> {
    let frame = interp
        .env
        .select_case
        .last()
        .cloned()
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
    if frame.matched {
        let endselect_pc = scan_to_endselect(interp, interp.pc)
            .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
        interp.env.select_case.pop();
        interp.set_next_pc(endselect_pc + 1);
    } else {
        interp.env.select_case.last_mut().unwrap().matched = true;
        interp.set_next_pc(interp.pc + 1);
    }
    Ok(())
}

fn exec_end_select(interp: &mut Interpreter, line: u32) -> Result<(), InterpreterError> {
    interp
        .env
        .select_case
        .pop()
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::Syntax, line))?;
    interp.set_next_pc(interp.pc + 1);
    Ok(())
}

/// Scalar params are bound by value, saving the caller's prior binding (if
/// any) to restore on return; array params are approximated as
/// call-by-value-result (copied in, copied back on return) since true
/// aliasing isn't practical over `HashMap<String, ArrayVar>` ownership
/// (documented in DESIGN.md as a deliberate simplification).
struct ParamBindings {
    saved_scalars: Vec<(String, Option<Value>)>,
    array_bindings: Vec<(String, String)>,
}

fn bind_params(
    interp: &mut Interpreter,
    params: &[ParamDecl],
    args: &[Expression],
    line: u32,
) -> Result<ParamBindings, InterpreterError> {
    let mut saved_scalars = Vec::new();
    let mut array_bindings = Vec::new();
    for (param, arg) in params.iter().zip(args.iter()) {
        if param.is_array {
            if let Some(arg_name) = array_arg_name(arg) {
                let key = arg_name.to_ascii_uppercase();
                let param_key = param.name.to_ascii_uppercase();
                if let Some(arr) = interp.env.arrays.get(&key).cloned() {
                    interp.env.arrays.insert(param_key, arr);
                }
                array_bindings.push((param.name.to_ascii_uppercase(), key));
            }
        } else {
            let value = interp.eval_expression(arg, line)?;
            let key = param.name.to_ascii_uppercase();
            saved_scalars.push((key.clone(), interp.env.variables.get(&key).cloned()));
            interp.env.set_variable(&param.name, value);
        }
    }
    Ok(ParamBindings { saved_scalars, array_bindings })
}

fn array_arg_name(expr: &Expression) -> Option<&str> {
    match expr {
        Expression::Variable(n) => Some(n.as_str()),
        Expression::ArrayOrCall(n, args) if args.is_empty() => Some(n.as_str()),
        _ => None,
    }
}

fn unbind_params(interp: &mut Interpreter, bindings: ParamBindings) {
    for (param_key, arg_key) in bindings.array_bindings {
        if let Some(arr) = interp.env.arrays.get(&param_key).cloned() {
            interp.env.arrays.insert(arg_key, arr);
        }
    }
    for (key, saved) in bindings.saved_scalars {
        match saved {
            Some(v) => {
                interp.env.variables.insert(key, v);
            }
            None => {
                interp.env.variables.remove(&key);
            }
        }
    }
}

fn exec_call_sub(interp: &mut Interpreter, name: &str, args: &[Expression], line: u32) -> Result<(), InterpreterError> {
    let routine = interp
        .env
        .routines
        .get(&name.to_ascii_uppercase())
        .cloned()
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::UndefinedLineNumber, line))?;
    let bindings = bind_params(interp, &routine.params, args, line)?;
    interp.env.sub_return.push(interp.pc + 1);
    interp.env.sub_param_bindings.push(bindings_to_stash(bindings));
    interp.set_next_pc(routine.start_pc + 1);
    Ok(())
}

/// `call_user_function` re-enters the statement-stepping loop synchronously:
/// a `FUNCTION` body is ordinary statements, but it's invoked mid-expression,
/// so it can't just redirect `next_pc` and return the way `SUB` does
/// (spec.md §4.F "Evaluation").
impl Interpreter {
    pub(crate) fn call_user_function(
        &mut self,
        name: &str,
        args: &[Expression],
        line: u32,
    ) -> Result<Value, InterpreterError> {
        let key = name.to_ascii_uppercase();
        let routine: RoutineInfo = self
            .env
            .routines
            .get(&key)
            .cloned()
            .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::UndefinedLineNumber, line))?;
        if !routine.is_function {
            return Err(InterpreterError::runtime(RuntimeErrorKind::IllegalFunctionCall, line));
        }
        let bindings = bind_params(self, &routine.params, args, line)?;
        let caller_pc = self.pc;
        let depth = self.env.sub_return.len();
        self.env.sub_return.push(caller_pc);
        self.pc = routine.start_pc + 1;
        loop {
            if self.env.sub_return.len() <= depth {
                break;
            }
            if !self.step()? {
                break;
            }
        }
        self.pc = caller_pc;
        let result = self.env.get_variable(&key);
        unbind_params(self, bindings);
        Ok(result)
    }
}

/// `EndSub`/`EndFunction`/`Exit Sub`/`Exit Function` all pop the same frame
/// and jump back to the caller; a `FUNCTION`'s return value is just read
/// back from its name-shadowed variable by `call_user_function` afterward.
fn pop_routine_frame(interp: &mut Interpreter, line: u32) -> Result<(), InterpreterError> {
    let ret = interp
        .env
        .sub_return
        .pop()
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::ReturnWithoutGosub, line))?;
    if let Some(bindings) = interp.env.sub_param_bindings.pop() {
        unbind_params(interp, stash_to_bindings(bindings));
    }
    interp.set_next_pc(ret);
    Ok(())
}

/// `sub_param_bindings` stores the plain-data form so `Environment` doesn't
/// need to know about `ParamBindings` (kept private to this module).
fn bindings_to_stash(b: ParamBindings) -> (Vec<(String, Option<Value>)>, Vec<(String, String)>) {
    (b.saved_scalars, b.array_bindings)
}

fn stash_to_bindings(b: (Vec<(String, Option<Value>)>, Vec<(String, String)>)) -> ParamBindings {
    ParamBindings { saved_scalars: b.0, array_bindings: b.1 }
}
