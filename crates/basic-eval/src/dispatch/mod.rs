//! Statement dispatch (spec.md §4.F "Execute"), split by concern the way
//! the teacher splits `core-actions` into per-domain handler modules.

pub mod control;
pub mod data;
pub mod graphics;
pub mod io;
pub mod sound;

use basic_ast::{InterpreterError, Statement};

use crate::Interpreter;

pub fn execute_statement(
    interp: &mut Interpreter,
    stmt: &Statement,
    line: u32,
) -> Result<(), InterpreterError> {
    match stmt {
        Statement::Compound(stmts) => {
            for s in stmts {
                execute_statement(interp, s, line)?;
                if interp.control_transferred() {
                    break;
                }
            }
            Ok(())
        }
        Statement::Empty | Statement::Label(_) => Ok(()),

        Statement::Let { .. }
        | Statement::Dim(_)
        | Statement::Redim { .. }
        | Statement::Const { .. }
        | Statement::Swap(_, _)
        | Statement::Type(_)
        | Statement::TypeField(_)
        | Statement::EndType
        | Statement::DefType { .. }
        | Statement::DefFn { .. }
        | Statement::Declare { .. }
        | Statement::Data(_)
        | Statement::Read(_)
        | Statement::Restore(_) => data::execute(interp, stmt, line),

        Statement::Goto(_)
        | Statement::Gosub(_)
        | Statement::Return
        | Statement::If { .. }
        | Statement::ElseIf(_)
        | Statement::Else
        | Statement::EndIf
        | Statement::For { .. }
        | Statement::Next(_)
        | Statement::While(_)
        | Statement::Wend
        | Statement::Do { .. }
        | Statement::Loop { .. }
        | Statement::Exit(_)
        | Statement::End
        | Statement::Stop
        | Statement::OnGoto { .. }
        | Statement::OnError(_)
        | Statement::Resume { .. }
        | Statement::Sleep(_)
        | Statement::Randomize(_)
        | Statement::SelectCase(_)
        | Statement::Case(_)
        | Statement::CaseElse
        | Statement::EndSelect
        | Statement::Sub { .. }
        | Statement::EndSub
        | Statement::Function { .. }
        | Statement::EndFunction
        | Statement::CallSub { .. } => control::execute(interp, stmt, line),

        Statement::Print(_)
        | Statement::PrintFile { .. }
        | Statement::PrintUsing { .. }
        | Statement::Input { .. }
        | Statement::LineInput { .. }
        | Statement::Open { .. }
        | Statement::Close(_)
        | Statement::Write { .. }
        | Statement::Field { .. }
        | Statement::GetRecord { .. }
        | Statement::PutRecord { .. }
        | Statement::Lset { .. }
        | Statement::Rset { .. }
        | Statement::Kill(_)
        | Statement::Name { .. }
        | Statement::Files(_) => io::execute(interp, stmt, line),

        Statement::Cls
        | Statement::Screen { .. }
        | Statement::Color { .. }
        | Statement::Locate { .. }
        | Statement::Pset { .. }
        | Statement::Preset { .. }
        | Statement::Line { .. }
        | Statement::Circle { .. }
        | Statement::Paint { .. }
        | Statement::Draw(_)
        | Statement::Palette { .. }
        | Statement::GetGraphics { .. }
        | Statement::PutGraphics { .. } => graphics::execute(interp, stmt, line),

        Statement::Beep | Statement::Sound { .. } | Statement::Play(_) => {
            sound::execute(interp, stmt, line)
        }
    }
}
