use super::parse_lvalue;
use crate::cursor::Cursor;
use crate::expression::parse_expression;
use crate::statement::graphics;
use basic_ast::{
    FieldSpec, InterpreterError, Literal, OpenMode, PrintItem, PrintSep, Statement, TokenKind,
};

fn parse_print_items(c: &mut Cursor) -> Result<Vec<PrintItem>, InterpreterError> {
    let mut items = Vec::new();
    loop {
        match c.peek_kind() {
            TokenKind::Semicolon => {
                c.advance();
                items.push(PrintItem::Sep(PrintSep::Semicolon));
            }
            TokenKind::Comma => {
                c.advance();
                items.push(PrintItem::Sep(PrintSep::Comma));
            }
            TokenKind::NewLine | TokenKind::Eof | TokenKind::Colon => break,
            _ => items.push(PrintItem::Expr(parse_expression(c)?)),
        }
    }
    Ok(items)
}

pub fn parse_print(c: &mut Cursor, _unused: Option<()>) -> Result<Statement, InterpreterError> {
    c.advance(); // PRINT
    let file_num = if c.matches(TokenKind::Hash) {
        let n = parse_expression(c)?;
        let _ = c.matches(TokenKind::Comma);
        Some(n)
    } else {
        None
    };

    if c.matches(TokenKind::Using) {
        let format = parse_expression(c)?;
        c.expect(TokenKind::Semicolon, "';'")?;
        let mut items = vec![parse_expression(c)?];
        while c.matches(TokenKind::Comma) || c.matches(TokenKind::Semicolon) {
            if c.at_line_end() || c.check(TokenKind::Colon) {
                break;
            }
            items.push(parse_expression(c)?);
        }
        return Ok(Statement::PrintUsing {
            file_num,
            format,
            items,
        });
    }

    let items = parse_print_items(c)?;
    match file_num {
        Some(file_num) => Ok(Statement::PrintFile { file_num, items }),
        None => Ok(Statement::Print(items)),
    }
}

pub fn parse_input(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // INPUT
    let _ = c.matches(TokenKind::Semicolon); // suppress `? ` / keep-cursor flag, no AST effect
    let prompt = if c.check(TokenKind::StringLiteral) {
        let tok = c.advance();
        let text = match tok.literal {
            Literal::Text(s) => s,
            _ => String::new(),
        };
        if !c.matches(TokenKind::Semicolon) {
            c.expect(TokenKind::Comma, "',' or ';' after the INPUT prompt")?;
        }
        Some(text)
    } else {
        None
    };
    let mut targets = vec![parse_lvalue(c)?];
    while c.matches(TokenKind::Comma) {
        targets.push(parse_lvalue(c)?);
    }
    Ok(Statement::Input { prompt, targets })
}

/// `LINE` is shared between the graphics draw statement and `LINE INPUT`;
/// disambiguated here by one token of lookahead.
pub fn parse_line_or_line_input(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    if c.peek_at(1).kind == TokenKind::Input {
        c.advance(); // LINE
        c.advance(); // INPUT
        let file_num = if c.matches(TokenKind::Hash) {
            let n = parse_expression(c)?;
            let _ = c.matches(TokenKind::Comma);
            Some(n)
        } else {
            None
        };
        let prompt = if c.check(TokenKind::StringLiteral) {
            let tok = c.advance();
            let text = match tok.literal {
                Literal::Text(s) => s,
                _ => String::new(),
            };
            let _ = c.matches(TokenKind::Semicolon) || c.matches(TokenKind::Comma);
            Some(text)
        } else {
            None
        };
        let target = parse_lvalue(c)?;
        Ok(Statement::LineInput {
            file_num,
            prompt,
            target,
        })
    } else {
        graphics::parse_line(c)
    }
}

pub fn parse_open(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // OPEN
    let path = parse_expression(c)?;
    c.expect(TokenKind::For, "FOR")?;
    let mode = match c.peek_kind() {
        TokenKind::Input => OpenMode::Input,
        TokenKind::Output => OpenMode::Output,
        TokenKind::Append => OpenMode::Append,
        TokenKind::Random => OpenMode::Random,
        _ => return Err(c.error("expected INPUT, OUTPUT, APPEND, or RANDOM")),
    };
    c.advance();
    c.expect(TokenKind::As, "AS")?;
    let _ = c.matches(TokenKind::Hash);
    let file_num = parse_expression(c)?;
    let record_len = if c.check(TokenKind::Identifier) && c.peek().lexeme.eq_ignore_ascii_case("LEN") {
        c.advance();
        c.expect(TokenKind::Equal, "'='")?;
        Some(parse_expression(c)?)
    } else {
        None
    };
    Ok(Statement::Open {
        path,
        mode,
        file_num,
        record_len,
    })
}

pub fn parse_close(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // CLOSE
    let mut handles = Vec::new();
    if !c.at_line_end() && !c.check(TokenKind::Colon) {
        loop {
            let _ = c.matches(TokenKind::Hash);
            handles.push(parse_expression(c)?);
            if !c.matches(TokenKind::Comma) {
                break;
            }
        }
    }
    Ok(Statement::Close(handles))
}

pub fn parse_write(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // WRITE
    let file_num = if c.matches(TokenKind::Hash) {
        let n = parse_expression(c)?;
        let _ = c.matches(TokenKind::Comma);
        Some(n)
    } else {
        None
    };
    let mut items = vec![parse_expression(c)?];
    while c.matches(TokenKind::Comma) {
        items.push(parse_expression(c)?);
    }
    Ok(Statement::Write { file_num, items })
}

pub fn parse_field(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // FIELD
    let _ = c.matches(TokenKind::Hash);
    let file_num = parse_expression(c)?;
    c.expect(TokenKind::Comma, "','")?;
    let mut fields = vec![parse_one_field(c)?];
    while c.matches(TokenKind::Comma) {
        fields.push(parse_one_field(c)?);
    }
    Ok(Statement::Field { file_num, fields })
}

fn parse_one_field(c: &mut Cursor) -> Result<FieldSpec, InterpreterError> {
    let width = parse_expression(c)?;
    c.expect(TokenKind::As, "AS")?;
    let var_tok = c.expect(TokenKind::Identifier, "a field variable name")?;
    Ok(FieldSpec {
        width,
        var: var_tok.lexeme,
    })
}

/// `GET` is shared between random-file record reads and the graphics
/// screen-region capture; disambiguated by whether `#` or `(` follows.
pub fn parse_get(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // GET
    if c.check(TokenKind::Hash) || c.check(TokenKind::NumberLiteral) {
        let _ = c.matches(TokenKind::Hash);
        let file_num = parse_expression(c)?;
        let record = if c.matches(TokenKind::Comma) {
            Some(parse_expression(c)?)
        } else {
            None
        };
        return Ok(Statement::GetRecord { file_num, record });
    }
    let p1 = crate::expression::parse_point(c)?;
    c.expect(TokenKind::Minus, "'-'")?;
    let p2 = crate::expression::parse_point(c)?;
    c.expect(TokenKind::Comma, "','")?;
    let array_tok = c.expect(TokenKind::Identifier, "an array name")?;
    Ok(Statement::GetGraphics {
        p1,
        p2,
        array: array_tok.lexeme,
    })
}

pub fn parse_put(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // PUT
    if c.check(TokenKind::Hash) || c.check(TokenKind::NumberLiteral) {
        let _ = c.matches(TokenKind::Hash);
        let file_num = parse_expression(c)?;
        let record = if c.matches(TokenKind::Comma) {
            Some(parse_expression(c)?)
        } else {
            None
        };
        return Ok(Statement::PutRecord { file_num, record });
    }
    let point = crate::expression::parse_point(c)?;
    c.expect(TokenKind::Comma, "','")?;
    let array_tok = c.expect(TokenKind::Identifier, "an array name")?;
    let action = graphics::parse_raster_op(c)?;
    Ok(Statement::PutGraphics {
        point,
        array: array_tok.lexeme,
        action,
    })
}

pub fn parse_lset_rset(c: &mut Cursor, is_lset: bool) -> Result<Statement, InterpreterError> {
    c.advance();
    let target = parse_lvalue(c)?;
    c.expect(TokenKind::Equal, "'='")?;
    let value = parse_expression(c)?;
    if is_lset {
        Ok(Statement::Lset { target, value })
    } else {
        Ok(Statement::Rset { target, value })
    }
}

pub fn parse_name(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // NAME
    let old = parse_expression(c)?;
    c.expect(TokenKind::As, "AS")?;
    let new = parse_expression(c)?;
    Ok(Statement::Name { old, new })
}
