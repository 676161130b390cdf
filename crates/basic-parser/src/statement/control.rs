use crate::cursor::Cursor;
use crate::expression::parse_expression;
use basic_ast::{
    CaseClause, DoKind, ExitScope, InterpreterError, JumpTarget, Literal, OnErrorTarget,
    ResumeKind, Statement, ThenBranch, TokenKind,
};

fn parse_jump_target(c: &mut Cursor) -> Result<JumpTarget, InterpreterError> {
    if c.check(TokenKind::NumberLiteral) {
        let tok = c.advance();
        match tok.literal {
            Literal::Number(n) => Ok(JumpTarget::Line(n as u32)),
            _ => Err(c.error("malformed line number target")),
        }
    } else {
        let tok = c.expect(TokenKind::Identifier, "a line number or label")?;
        Ok(JumpTarget::Label(tok.lexeme))
    }
}

pub fn parse_goto(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    Ok(Statement::Goto(parse_jump_target(c)?))
}

pub fn parse_gosub(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    Ok(Statement::Gosub(parse_jump_target(c)?))
}

pub fn parse_if(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // IF
    let condition = parse_expression(c)?;
    c.expect(TokenKind::Then, "THEN")?;
    // A THEN immediately followed by end-of-line is the multi-line block form.
    if c.at_line_end() {
        return Ok(Statement::If {
            condition,
            then: ThenBranch::Block,
            else_branch: None,
        });
    }
    // Inline form: `THEN <stmt> [: <stmt>...] [ELSE <stmt> [: <stmt>...]]`.
    // A bare line number after THEN is sugar for `THEN GOTO <n>`.
    let then_stmt = if c.check(TokenKind::NumberLiteral) {
        let target = parse_jump_target(c)?;
        Statement::Goto(target)
    } else {
        super::parse_statement(c)?
    };
    let mut then_stmts = vec![then_stmt];
    while c.matches(TokenKind::Colon) {
        if c.check(TokenKind::Else) || c.at_line_end() {
            break;
        }
        then_stmts.push(super::parse_statement(c)?);
    }
    let then_branch = ThenBranch::Inline(Box::new(crate::compound_or_single(then_stmts)));

    let else_branch = if c.matches(TokenKind::Else) {
        let first = if c.check(TokenKind::NumberLiteral) {
            Statement::Goto(parse_jump_target(c)?)
        } else {
            super::parse_statement(c)?
        };
        let mut stmts = vec![first];
        while c.matches(TokenKind::Colon) {
            if c.at_line_end() {
                break;
            }
            stmts.push(super::parse_statement(c)?);
        }
        Some(Box::new(crate::compound_or_single(stmts)))
    } else {
        None
    };

    Ok(Statement::If {
        condition,
        then: then_branch,
        else_branch,
    })
}

pub fn parse_for(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let var_tok = c.expect(TokenKind::Identifier, "a loop variable")?;
    c.expect(TokenKind::Equal, "'='")?;
    let start = parse_expression(c)?;
    c.expect(TokenKind::To, "TO")?;
    let end = parse_expression(c)?;
    let step = if c.matches(TokenKind::Step) {
        Some(parse_expression(c)?)
    } else {
        None
    };
    Ok(Statement::For {
        var: var_tok.lexeme,
        start,
        end,
        step,
    })
}

pub fn parse_next(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let var = if c.check(TokenKind::Identifier) {
        Some(c.advance().lexeme)
    } else {
        None
    };
    Ok(Statement::Next(var))
}

pub fn parse_while(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    Ok(Statement::While(parse_expression(c)?))
}

fn parse_do_loop_condition(c: &mut Cursor) -> Result<(Option<basic_ast::Expression>, Option<DoKind>), InterpreterError> {
    if c.matches(TokenKind::While) {
        Ok((Some(parse_expression(c)?), Some(DoKind::While)))
    } else if c.matches(TokenKind::Until) {
        Ok((Some(parse_expression(c)?), Some(DoKind::Until)))
    } else {
        Ok((None, None))
    }
}

pub fn parse_do(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let (cond, kind) = parse_do_loop_condition(c)?;
    Ok(Statement::Do { cond, kind })
}

pub fn parse_loop(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let (cond, kind) = parse_do_loop_condition(c)?;
    Ok(Statement::Loop { cond, kind })
}

pub fn parse_exit(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let scope = match c.peek_kind() {
        TokenKind::For => {
            c.advance();
            ExitScope::For
        }
        TokenKind::Do => {
            c.advance();
            ExitScope::Do
        }
        TokenKind::Sub => {
            c.advance();
            ExitScope::Sub
        }
        TokenKind::Function => {
            c.advance();
            ExitScope::Function
        }
        _ => return Err(c.error("expected FOR, DO, SUB, or FUNCTION after EXIT")),
    };
    Ok(Statement::Exit(scope))
}

pub fn parse_end(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    match c.peek_kind() {
        TokenKind::If => {
            c.advance();
            Ok(Statement::EndIf)
        }
        TokenKind::Sub => {
            c.advance();
            Ok(Statement::EndSub)
        }
        TokenKind::Function => {
            c.advance();
            Ok(Statement::EndFunction)
        }
        TokenKind::Type => {
            c.advance();
            Ok(Statement::EndType)
        }
        TokenKind::Select => {
            c.advance();
            Ok(Statement::EndSelect)
        }
        _ => Ok(Statement::End),
    }
}

pub fn parse_on(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // ON
    if c.matches(TokenKind::Error) {
        c.expect(TokenKind::Goto, "GOTO")?;
        if c.check(TokenKind::NumberLiteral) && matches!(c.peek().literal, Literal::Number(n) if n == 0.0) {
            c.advance();
            return Ok(Statement::OnError(OnErrorTarget::Off));
        }
        let target = parse_jump_target(c)?;
        return Ok(Statement::OnError(OnErrorTarget::Goto(target)));
    }
    let selector = parse_expression(c)?;
    let is_gosub = if c.matches(TokenKind::Goto) {
        false
    } else {
        c.expect(TokenKind::Gosub, "GOTO or GOSUB")?;
        true
    };
    let mut targets = vec![parse_jump_target(c)?];
    while c.matches(TokenKind::Comma) {
        targets.push(parse_jump_target(c)?);
    }
    Ok(Statement::OnGoto {
        selector,
        targets,
        is_gosub,
    })
}

pub fn parse_resume(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    if c.at_line_end() || c.check(TokenKind::Colon) {
        return Ok(Statement::Resume {
            kind: ResumeKind::Same,
            target: None,
        });
    }
    if c.matches(TokenKind::Next) {
        return Ok(Statement::Resume {
            kind: ResumeKind::Next,
            target: None,
        });
    }
    let target = parse_jump_target(c)?;
    Ok(Statement::Resume {
        kind: ResumeKind::Line,
        target: Some(target),
    })
}

pub fn parse_select(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // SELECT
    c.expect(TokenKind::Case, "CASE")?;
    Ok(Statement::SelectCase(parse_expression(c)?))
}

fn parse_single_case_clause(c: &mut Cursor) -> Result<CaseClause, InterpreterError> {
    if c.matches(TokenKind::Is) {
        let op = match c.peek_kind() {
            TokenKind::Equal => basic_ast::BinOp::Eq,
            TokenKind::NotEqual => basic_ast::BinOp::NotEq,
            TokenKind::Less => basic_ast::BinOp::Lt,
            TokenKind::LessEqual => basic_ast::BinOp::LtEq,
            TokenKind::Greater => basic_ast::BinOp::Gt,
            TokenKind::GreaterEqual => basic_ast::BinOp::GtEq,
            _ => return Err(c.error("expected a comparison operator after IS")),
        };
        c.advance();
        let value = parse_expression(c)?;
        return Ok(CaseClause::Is(op, value));
    }
    let first = parse_expression(c)?;
    if c.matches(TokenKind::To) {
        let second = parse_expression(c)?;
        Ok(CaseClause::Range(first, second))
    } else {
        Ok(CaseClause::Value(first))
    }
}

pub fn parse_case(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // CASE
    if c.check(TokenKind::Else) {
        c.advance();
        return Ok(Statement::CaseElse);
    }
    let mut clauses = vec![parse_single_case_clause(c)?];
    while c.matches(TokenKind::Comma) {
        clauses.push(parse_single_case_clause(c)?);
    }
    Ok(Statement::Case(clauses))
}

pub(crate) use parse_jump_target as jump_target;
