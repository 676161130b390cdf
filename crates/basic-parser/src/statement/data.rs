use super::parse_lvalue;
use crate::cursor::Cursor;
use crate::expression::parse_expression;
use basic_ast::{
    DimDecl, InterpreterError, JumpTarget, Literal, ParamDecl, Statement, TokenKind, TypeFieldDecl,
};

pub fn parse_assignment(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    let target = parse_lvalue(c)?;
    c.expect(TokenKind::Equal, "'='")?;
    let value = parse_expression(c)?;
    Ok(Statement::Let { target, value })
}

fn parse_dim_decl(c: &mut Cursor) -> Result<DimDecl, InterpreterError> {
    let name_tok = c.expect(TokenKind::Identifier, "a variable name")?;
    let mut dims = Vec::new();
    if c.matches(TokenKind::LParen) {
        if !c.check(TokenKind::RParen) {
            loop {
                dims.push(parse_expression(c)?);
                if !c.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        c.expect(TokenKind::RParen, "')'")?;
    }
    let as_type = if c.matches(TokenKind::As) {
        Some(c.expect(TokenKind::Identifier, "a type name")?.lexeme)
    } else {
        None
    };
    Ok(DimDecl {
        name: name_tok.lexeme,
        dims,
        as_type,
    })
}

pub fn parse_dim(c: &mut Cursor, _shared: bool) -> Result<Statement, InterpreterError> {
    c.advance(); // DIM
    let _ = c.matches(TokenKind::Shared);
    let mut decls = vec![parse_dim_decl(c)?];
    while c.matches(TokenKind::Comma) {
        decls.push(parse_dim_decl(c)?);
    }
    Ok(Statement::Dim(decls))
}

pub fn parse_redim(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // REDIM
    let preserve = c.matches(TokenKind::Preserve);
    let mut decls = vec![parse_dim_decl(c)?];
    while c.matches(TokenKind::Comma) {
        decls.push(parse_dim_decl(c)?);
    }
    Ok(Statement::Redim { preserve, decls })
}

pub fn parse_read(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let mut targets = vec![parse_lvalue(c)?];
    while c.matches(TokenKind::Comma) {
        targets.push(parse_lvalue(c)?);
    }
    Ok(Statement::Read(targets))
}

pub fn parse_restore(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    if c.at_line_end() || c.check(TokenKind::Colon) {
        return Ok(Statement::Restore(None));
    }
    let target = if c.check(TokenKind::NumberLiteral) {
        let tok = c.advance();
        match tok.literal {
            Literal::Number(n) => JumpTarget::Line(n as u32),
            _ => return Err(c.error("malformed RESTORE target")),
        }
    } else {
        JumpTarget::Label(c.expect(TokenKind::Identifier, "a label")?.lexeme)
    };
    Ok(Statement::Restore(Some(target)))
}

pub fn parse_swap(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let a = parse_lvalue(c)?;
    c.expect(TokenKind::Comma, "','")?;
    let b = parse_lvalue(c)?;
    Ok(Statement::Swap(a, b))
}

pub fn parse_const(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let name_tok = c.expect(TokenKind::Identifier, "a constant name")?;
    c.expect(TokenKind::Equal, "'='")?;
    let value = parse_expression(c)?;
    Ok(Statement::Const {
        name: name_tok.lexeme,
        value,
    })
}

pub fn parse_type(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let name_tok = c.expect(TokenKind::Identifier, "a type name")?;
    Ok(Statement::Type(name_tok.lexeme))
}

pub fn parse_type_field(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    let name_tok = c.expect(TokenKind::Identifier, "a field name")?;
    c.expect(TokenKind::As, "AS")?;
    let type_tok = c.expect(TokenKind::Identifier, "a type name")?;
    let string_width = if c.matches(TokenKind::Star) {
        Some(parse_expression(c)?)
    } else {
        None
    };
    Ok(Statement::TypeField(TypeFieldDecl {
        field_name: name_tok.lexeme,
        type_name: type_tok.lexeme,
        string_width,
    }))
}

pub fn parse_def_type(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    let tok = c.advance();
    let basic_type = match tok.lexeme.to_ascii_uppercase().as_str() {
        "DEFINT" => "INTEGER",
        "DEFLNG" => "LONG",
        "DEFSNG" => "SINGLE",
        "DEFDBL" => "DOUBLE",
        "DEFSTR" => "STRING",
        _ => return Err(c.error("unknown DEF-type statement")),
    }
    .to_string();
    let first_tok = c.expect(TokenKind::Identifier, "a starting letter")?;
    let first = first_tok
        .lexeme
        .chars()
        .next()
        .ok_or_else(|| c.error("expected a single letter"))?
        .to_ascii_uppercase();
    let last = if c.matches(TokenKind::Minus) {
        let last_tok = c.expect(TokenKind::Identifier, "an ending letter")?;
        last_tok
            .lexeme
            .chars()
            .next()
            .ok_or_else(|| c.error("expected a single letter"))?
            .to_ascii_uppercase()
    } else {
        first
    };
    Ok(Statement::DefType {
        first,
        last,
        basic_type,
    })
}

fn parse_params(c: &mut Cursor) -> Result<Vec<ParamDecl>, InterpreterError> {
    let mut params = Vec::new();
    if c.matches(TokenKind::LParen) {
        if !c.check(TokenKind::RParen) {
            loop {
                let name_tok = c.expect(TokenKind::Identifier, "a parameter name")?;
                let is_array = if c.matches(TokenKind::LParen) {
                    c.expect(TokenKind::RParen, "')'")?;
                    true
                } else {
                    false
                };
                let type_name = if c.matches(TokenKind::As) {
                    Some(c.expect(TokenKind::Identifier, "a type name")?.lexeme)
                } else {
                    None
                };
                params.push(ParamDecl {
                    name: name_tok.lexeme,
                    is_array,
                    type_name,
                });
                if !c.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        c.expect(TokenKind::RParen, "')'")?;
    }
    Ok(params)
}

pub fn parse_def(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // DEF
    if c.check(TokenKind::Identifier) && c.peek().lexeme.eq_ignore_ascii_case("SEG") {
        c.advance();
        let target = if c.matches(TokenKind::Equal) {
            Some(parse_expression(c)?)
        } else {
            None
        };
        // `DEF SEG` has no runtime effect in this core (no raw memory model);
        // it still must parse so legacy programs load. Represented as a
        // no-arg CallSub so the evaluator can treat it as a silent no-op.
        let args = target.into_iter().collect();
        return Ok(Statement::CallSub {
            name: "__DEFSEG".into(),
            args,
        });
    }
    c.expect(TokenKind::Fn, "FN")?;
    let name_tok = c.expect(TokenKind::Identifier, "a function name")?;
    let params = parse_params(c)?;
    c.expect(TokenKind::Equal, "'='")?;
    let body = parse_expression(c)?;
    Ok(Statement::DefFn {
        name: name_tok.lexeme,
        params: params.into_iter().map(|p| p.name).collect(),
        body,
    })
}

pub fn parse_declare(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let is_function = if c.matches(TokenKind::Sub) {
        false
    } else {
        c.expect(TokenKind::Function, "SUB or FUNCTION")?;
        true
    };
    let name_tok = c.expect(TokenKind::Identifier, "a routine name")?;
    let params = parse_params(c)?;
    Ok(Statement::Declare {
        name: name_tok.lexeme,
        is_function,
        params,
    })
}

pub fn parse_sub(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let name_tok = c.expect(TokenKind::Identifier, "a sub name")?;
    let params = parse_params(c)?;
    Ok(Statement::Sub {
        name: name_tok.lexeme,
        params,
    })
}

pub fn parse_function(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let name_tok = c.expect(TokenKind::Identifier, "a function name")?;
    let params = parse_params(c)?;
    Ok(Statement::Function {
        name: name_tok.lexeme,
        params,
    })
}

pub fn parse_call(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // CALL
    let name_tok = c.expect(TokenKind::Identifier, "a sub name")?;
    let mut args = Vec::new();
    if c.matches(TokenKind::LParen) {
        if !c.check(TokenKind::RParen) {
            loop {
                args.push(parse_expression(c)?);
                if !c.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        c.expect(TokenKind::RParen, "')'")?;
    } else if !c.at_line_end() && !c.check(TokenKind::Colon) {
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
