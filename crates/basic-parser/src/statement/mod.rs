//! Statement dispatch (spec.md §4.C). Keyword-driven, with the documented
//! ambiguous first-token cases (`LINE`, `GET`/`PUT`, `DEF`, `END`, bare
//! identifier) resolved here by one-token lookahead.

mod control;
mod data;
mod graphics;
mod io;

use crate::cursor::Cursor;
use crate::expression::parse_expression;
use basic_ast::{InterpreterError, LValue, Statement, TokenKind};

pub fn parse_statement(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    match c.peek_kind() {
        TokenKind::Let => {
            c.advance();
            data::parse_assignment(c)
        }
        TokenKind::Identifier => parse_identifier_led(c),

        TokenKind::Goto => control::parse_goto(c),
        TokenKind::Gosub => control::parse_gosub(c),
        TokenKind::Return => {
            c.advance();
            Ok(Statement::Return)
        }
        TokenKind::If => control::parse_if(c),
        TokenKind::ElseIf => {
            c.advance();
            let cond = parse_expression(c)?;
            let _ = c.matches(TokenKind::Then);
            Ok(Statement::ElseIf(cond))
        }
        TokenKind::Else => {
            c.advance();
            Ok(Statement::Else)
        }
        TokenKind::EndIf => {
            c.advance();
            Ok(Statement::EndIf)
        }
        TokenKind::For => control::parse_for(c),
        TokenKind::Next => control::parse_next(c),
        TokenKind::While => control::parse_while(c),
        TokenKind::Wend => {
            c.advance();
            Ok(Statement::Wend)
        }
        TokenKind::Do => control::parse_do(c),
        TokenKind::Loop => control::parse_loop(c),
        TokenKind::Exit => control::parse_exit(c),
        TokenKind::End => control::parse_end(c),
        TokenKind::Stop => {
            c.advance();
            Ok(Statement::Stop)
        }
        TokenKind::On => control::parse_on(c),
        TokenKind::Resume => control::parse_resume(c),
        TokenKind::Sleep => {
            c.advance();
            let arg = if c.at_line_end() || c.check(TokenKind::Colon) {
                None
            } else {
                Some(parse_expression(c)?)
            };
            Ok(Statement::Sleep(arg))
        }
        TokenKind::Randomize => {
            c.advance();
            let arg = if c.at_line_end() || c.check(TokenKind::Colon) {
                None
            } else {
                Some(parse_expression(c)?)
            };
            Ok(Statement::Randomize(arg))
        }
        TokenKind::Select => control::parse_select(c),
        TokenKind::Case => control::parse_case(c),

        TokenKind::Print => io::parse_print(c, None),
        TokenKind::Input => io::parse_input(c),
        TokenKind::Line => io::parse_line_or_line_input(c),
        TokenKind::Open => io::parse_open(c),
        TokenKind::Close => io::parse_close(c),
        TokenKind::Write => io::parse_write(c),
        TokenKind::Field => io::parse_field(c),
        TokenKind::Get => io::parse_get(c),
        TokenKind::Put => io::parse_put(c),
        TokenKind::Lset => io::parse_lset_rset(c, true),
        TokenKind::Rset => io::parse_lset_rset(c, false),
        TokenKind::Kill => {
            c.advance();
            Ok(Statement::Kill(parse_expression(c)?))
        }
        TokenKind::Name => io::parse_name(c),
        TokenKind::Files => {
            c.advance();
            let path = if c.at_line_end() || c.check(TokenKind::Colon) {
                None
            } else {
                Some(parse_expression(c)?)
            };
            Ok(Statement::Files(path))
        }

        TokenKind::Dim => data::parse_dim(c, false),
        TokenKind::Redim => data::parse_redim(c),
        TokenKind::Data => {
            let tok = c.advance();
            let raw = match tok.literal {
                basic_ast::Literal::Text(s) => s,
                _ => String::new(),
            };
            Ok(Statement::Data(raw))
        }
        TokenKind::Read => data::parse_read(c),
        TokenKind::Restore => data::parse_restore(c),
        TokenKind::Swap => data::parse_swap(c),
        TokenKind::Const => data::parse_const(c),
        TokenKind::Type => data::parse_type(c),
        TokenKind::DefType => data::parse_def_type(c),
        TokenKind::Def => data::parse_def(c),
        TokenKind::Declare => data::parse_declare(c),
        TokenKind::Sub => data::parse_sub(c),
        TokenKind::Function => data::parse_function(c),
        TokenKind::Call => data::parse_call(c),

        TokenKind::Cls => {
            c.advance();
            Ok(Statement::Cls)
        }
        TokenKind::Screen => graphics::parse_screen(c),
        TokenKind::Color => graphics::parse_color(c),
        TokenKind::Locate => graphics::parse_locate(c),
        TokenKind::Pset => graphics::parse_pset(c),
        TokenKind::Circle => graphics::parse_circle(c),
        TokenKind::Paint => graphics::parse_paint(c),
        TokenKind::Draw => {
            c.advance();
            Ok(Statement::Draw(parse_expression(c)?))
        }
        TokenKind::Palette => graphics::parse_palette(c),
        TokenKind::Beep => {
            c.advance();
            Ok(Statement::Beep)
        }
        TokenKind::Sound => graphics::parse_sound(c),
        TokenKind::Play => {
            c.advance();
            Ok(Statement::Play(parse_expression(c)?))
        }

        other => Err(c.error(format!("unexpected token starting a statement: {other:?}"))),
    }
}

/// Bare-identifier-led statement: label, assignment, or `CallSub` (spec.md §4.C).
fn parse_identifier_led(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    // Label: `name:` with nothing else meaningful before the colon.
    if c.peek_at(1).kind == TokenKind::Colon {
        let name_tok = c.advance();
        c.advance(); // colon
        return Ok(Statement::Label(name_tok.lexeme));
    }

    // Type field declaration inside a `TYPE ... END TYPE` block: `name AS type`.
    if c.peek_at(1).kind == TokenKind::As {
        return data::parse_type_field(c);
    }

    // Assignment: `name[(idx,...)][.field...] = expr`.
    if is_assignment_lead(c) {
        return data::parse_assignment(c);
    }

    // Otherwise: CallSub with a paren-free comma-separated argument list.
    let name_tok = c.advance();
    let mut args = Vec::new();
    if !c.at_line_end() && !c.check(TokenKind::Colon) {
        loop {
            args.push(parse_expression(c)?);
            if !c.matches(TokenKind::Comma) {
                break;
            }
        }
    }
    Ok(Statement::CallSub {
        name: name_tok.lexeme,
        args,
    })
}

/// Looks ahead (without consuming) to decide whether an identifier begins an
/// assignment: optionally `(args)`, optionally a `.field` chain, then `=`.
fn is_assignment_lead(c: &Cursor) -> bool {
    let mut i = 1usize;
    if c.peek_at(i).kind == TokenKind::LParen {
        let mut depth = 0i32;
        loop {
            match c.peek_at(i).kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        i += 1;
                        break;
                    }
                }
                TokenKind::NewLine | TokenKind::Eof => return false,
                _ => {}
            }
            i += 1;
        }
    }
    while c.peek_at(i).kind == TokenKind::Dot {
        i += 1;
        if c.peek_at(i).kind != TokenKind::Identifier {
            return false;
        }
        i += 1;
    }
    c.peek_at(i).kind == TokenKind::Equal
}

/// Parses an lvalue: `name`, `name(idx,...)`, or a dotted chain of either.
pub(crate) fn parse_lvalue(c: &mut Cursor) -> Result<LValue, InterpreterError> {
    let name_tok = c.expect(TokenKind::Identifier, "a variable name")?;
    let mut lvalue = if c.check(TokenKind::LParen) {
        c.advance();
        let mut indices = Vec::new();
        if !c.check(TokenKind::RParen) {
            loop {
                indices.push(parse_expression(c)?);
                if !c.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        c.expect(TokenKind::RParen, "')'")?;
        LValue::Index(name_tok.lexeme, indices)
    } else {
        LValue::Variable(name_tok.lexeme)
    };
    while c.matches(TokenKind::Dot) {
        let field_tok = c.expect(TokenKind::Identifier, "a field name")?;
        lvalue = LValue::Field(Box::new(lvalue), field_tok.lexeme);
    }
    Ok(lvalue)
}
