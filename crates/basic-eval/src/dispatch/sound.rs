//! `BEEP`/`SOUND`/`PLAY` (spec.md §4). The full `PLAY` macro language is a
//! Non-goal; evaluating its argument still surfaces type errors, and `SOUND`
//! validates its arguments the way the real statement does, but neither
//! statement has an audible effect without a host audio backend.

use basic_ast::{InterpreterError, RuntimeErrorKind, Statement};

use crate::Interpreter;

pub fn execute(interp: &mut Interpreter, stmt: &Statement, line: u32) -> Result<(), InterpreterError> {
    match stmt {
        Statement::Beep => Ok(()),
        Statement::Sound { frequency, duration } => {
            let freq = interp.eval_expression(frequency, line)?.as_number().unwrap_or(0.0);
            let dur = interp.eval_expression(duration, line)?.as_number().unwrap_or(0.0);
            if !(37.0..=32767.0).contains(&freq) && freq != 0.0 {
                return Err(InterpreterError::runtime(RuntimeErrorKind::IllegalFunctionCall, line));
            }
            if dur < 0.0 {
                return Err(InterpreterError::runtime(RuntimeErrorKind::IllegalFunctionCall, line));
            }
            Ok(())
        }
        Statement::Play(expr) => {
            interp.eval_expression(expr, line)?;
            Ok(())
        }
        _ => unreachable!("non-sound statement routed to dispatch::sound"),
    }
}
