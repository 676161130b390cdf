use crate::cursor::Cursor;
use crate::expression::{parse_expression, parse_point};
use basic_ast::{InterpreterError, RasterOp, Statement, TokenKind};

fn opt_expr(c: &mut Cursor) -> Result<Option<basic_ast::Expression>, InterpreterError> {
    if c.check(TokenKind::Comma) || c.at_line_end() || c.check(TokenKind::Colon) {
        Ok(None)
    } else {
        Ok(Some(parse_expression(c)?))
    }
}

pub fn parse_screen(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let mode = parse_expression(c)?;
    let active_page = if c.matches(TokenKind::Comma) {
        opt_expr(c)?
    } else {
        None
    };
    let visual_page = if c.matches(TokenKind::Comma) {
        opt_expr(c)?
    } else {
        None
    };
    Ok(Statement::Screen {
        mode,
        active_page,
        visual_page,
    })
}

pub fn parse_color(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let foreground = opt_expr(c)?;
    let background = if c.matches(TokenKind::Comma) {
        opt_expr(c)?
    } else {
        None
    };
    let border = if c.matches(TokenKind::Comma) {
        opt_expr(c)?
    } else {
        None
    };
    Ok(Statement::Color {
        foreground,
        background,
        border,
    })
}

pub fn parse_locate(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let row = opt_expr(c)?;
    let col = if c.matches(TokenKind::Comma) {
        opt_expr(c)?
    } else {
        None
    };
    Ok(Statement::Locate { row, col })
}

pub fn parse_pset(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    let is_preset = c.peek().lexeme.eq_ignore_ascii_case("PRESET");
    c.advance();
    let point = parse_point(c)?;
    let color = if c.matches(TokenKind::Comma) {
        Some(parse_expression(c)?)
    } else {
        None
    };
    if is_preset {
        Ok(Statement::Preset { point, color })
    } else {
        Ok(Statement::Pset { point, color })
    }
}

pub fn parse_circle(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let center = parse_point(c)?;
    c.expect(TokenKind::Comma, "','")?;
    let radius = parse_expression(c)?;
    let color = if c.matches(TokenKind::Comma) {
        opt_expr(c)?
    } else {
        None
    };
    let start = if c.matches(TokenKind::Comma) {
        opt_expr(c)?
    } else {
        None
    };
    let end = if c.matches(TokenKind::Comma) {
        opt_expr(c)?
    } else {
        None
    };
    let aspect = if c.matches(TokenKind::Comma) {
        opt_expr(c)?
    } else {
        None
    };
    Ok(Statement::Circle {
        center,
        radius,
        color,
        start,
        end,
        aspect,
    })
}

pub fn parse_paint(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let point = parse_point(c)?;
    let fill_color = if c.matches(TokenKind::Comma) {
        opt_expr(c)?
    } else {
        None
    };
    let border_color = if c.matches(TokenKind::Comma) {
        opt_expr(c)?
    } else {
        None
    };
    Ok(Statement::Paint {
        point,
        fill_color,
        border_color,
    })
}

pub fn parse_palette(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let index = opt_expr(c)?;
    let color = if c.matches(TokenKind::Comma) {
        opt_expr(c)?
    } else {
        None
    };
    Ok(Statement::Palette { index, color })
}

pub fn parse_sound(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance();
    let frequency = parse_expression(c)?;
    c.expect(TokenKind::Comma, "','")?;
    let duration = parse_expression(c)?;
    Ok(Statement::Sound {
        frequency,
        duration,
    })
}

/// Parses the `LINE [(x1,y1)]-(x2,y2)[,color][,B|BF][,style]` graphics form,
/// called once `io::parse_line_or_line_input` has ruled out `LINE INPUT`.
pub(crate) fn parse_line(c: &mut Cursor) -> Result<Statement, InterpreterError> {
    c.advance(); // LINE
    let p1 = if c.check(TokenKind::Minus) {
        None
    } else {
        Some(parse_point(c)?)
    };
    c.expect(TokenKind::Minus, "'-'")?;
    let p2 = parse_point(c)?;
    let color = if c.matches(TokenKind::Comma) {
        opt_expr(c)?
    } else {
        None
    };
    let mut is_box = false;
    let mut filled = false;
    if c.matches(TokenKind::Comma) {
        let tok = c.expect(TokenKind::Identifier, "B or BF")?;
        match tok.lexeme.to_ascii_uppercase().as_str() {
            "B" => is_box = true,
            "BF" => {
                is_box = true;
                filled = true;
            }
            _ => return Err(c.error("expected B or BF")),
        }
    }
    Ok(Statement::Line {
        p1,
        p2,
        color,
        is_box,
        filled,
    })
}

pub(crate) fn parse_raster_op(c: &mut Cursor) -> Result<Option<RasterOp>, InterpreterError> {
    if !c.matches(TokenKind::Comma) {
        return Ok(None);
    }
    let op = match c.peek_kind() {
        TokenKind::Pset if c.peek().lexeme.eq_ignore_ascii_case("PRESET") => RasterOp::Preset,
        TokenKind::Pset => RasterOp::Pset,
        TokenKind::And => RasterOp::And,
        TokenKind::Or => RasterOp::Or,
        TokenKind::Xor => RasterOp::Xor,
        _ => return Err(c.error("expected a PUT raster operation")),
    };
    c.advance();
    Ok(Some(op))
}
