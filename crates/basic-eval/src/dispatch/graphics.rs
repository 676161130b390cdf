//! `CLS`/`SCREEN`/`COLOR`/`LOCATE` and the raster drawing statements
//! (spec.md §4.D/§4.E, components D and E): `PSET`/`PRESET`/`LINE`/
//! `CIRCLE`/`PAINT`/`DRAW`/`PALETTE`/`GET`/`PUT`.

use basic_ast::{Expression, InterpreterError, Point, RasterOp, RuntimeErrorKind, Statement};
use basic_framebuffer::{copy_region, paste_region};

use crate::Interpreter;

pub fn execute(interp: &mut Interpreter, stmt: &Statement, line: u32) -> Result<(), InterpreterError> {
    match stmt {
        Statement::Cls => {
            interp.env.graphics.cls();
            Ok(())
        }
        Statement::Screen { mode, active_page, visual_page } => exec_screen(interp, mode, active_page.as_ref(), visual_page.as_ref(), line),
        Statement::Color { foreground, background, border: _ } => exec_color(interp, foreground.as_ref(), background.as_ref(), line),
        Statement::Locate { row, col } => exec_locate(interp, row.as_ref(), col.as_ref(), line),
        Statement::Pset { point, color } => exec_pset(interp, point, color.as_ref(), line),
        Statement::Preset { point, color } => exec_preset(interp, point, color.as_ref(), line),
        Statement::Line { p1, p2, color, is_box, filled } => exec_line(interp, p1.as_ref(), p2, color.as_ref(), *is_box, *filled, line),
        Statement::Circle { center, radius, color, start, end, aspect } => {
            exec_circle(interp, center, radius, color.as_ref(), start.as_ref(), end.as_ref(), aspect.as_ref(), line)
        }
        Statement::Paint { point, fill_color, border_color } => exec_paint(interp, point, fill_color.as_ref(), border_color.as_ref(), line),
        Statement::Draw(expr) => {
            // Full `DRAW` macro language is out of scope (Non-goal); evaluating
            // the string still surfaces type errors in the expression itself.
            interp.eval_expression(expr, line)?;
            Ok(())
        }
        Statement::Palette { index, color } => exec_palette(interp, index.as_ref(), color.as_ref(), line),
        Statement::GetGraphics { p1, p2, array } => exec_get_graphics(interp, p1, p2, array, line),
        Statement::PutGraphics { point, array, action } => exec_put_graphics(interp, point, array, *action, line),
        _ => unreachable!("non-graphics statement routed to dispatch::graphics"),
    }
}

fn as_u32(interp: &mut Interpreter, expr: &Expression, line: u32) -> Result<u32, InterpreterError> {
    Ok(interp.eval_expression(expr, line)?.as_number().unwrap_or(0.0) as u32)
}

fn as_i32(interp: &mut Interpreter, expr: &Expression, line: u32) -> Result<i32, InterpreterError> {
    Ok(interp.eval_expression(expr, line)?.as_number().unwrap_or(0.0) as i32)
}

/// Resolves a `Point`, honoring `STEP(dx,dy)` relative coordinates against
/// the active page's last plotted point (spec.md §4.D "STEP").
fn point_xy(interp: &mut Interpreter, p: &Point, line: u32) -> Result<(i32, i32), InterpreterError> {
    let x = as_i32(interp, &p.x, line)?;
    let y = as_i32(interp, &p.y, line)?;
    if p.step {
        let (lx, ly) = interp.env.graphics.active_page().last_point();
        Ok((lx + x, ly + y))
    } else {
        Ok((x, y))
    }
}

fn exec_screen(
    interp: &mut Interpreter,
    mode: &Expression,
    active_page: Option<&Expression>,
    visual_page: Option<&Expression>,
    line: u32,
) -> Result<(), InterpreterError> {
    let mode_n = as_u32(interp, mode, line)?;
    if basic_graphics::mode_info(mode_n).is_none() {
        return Err(InterpreterError::runtime(RuntimeErrorKind::IllegalFunctionCall, line));
    }
    let active = match active_page {
        Some(e) => Some(as_u32(interp, e, line)?),
        None => None,
    };
    let visual = match visual_page {
        Some(e) => Some(as_u32(interp, e, line)?),
        None => None,
    };
    interp.env.graphics.set_screen(mode_n, active, visual);
    Ok(())
}

fn exec_color(interp: &mut Interpreter, foreground: Option<&Expression>, background: Option<&Expression>, line: u32) -> Result<(), InterpreterError> {
    let fg = match foreground {
        Some(e) => Some(as_u32(interp, e, line)?),
        None => None,
    };
    let bg = match background {
        Some(e) => Some(as_u32(interp, e, line)?),
        None => None,
    };
    interp.env.graphics.set_text_colors(fg, bg);
    Ok(())
}

fn exec_locate(interp: &mut Interpreter, row: Option<&Expression>, col: Option<&Expression>, line: u32) -> Result<(), InterpreterError> {
    let (cur_row, cur_col) = interp.env.graphics.cursor();
    let r = match row {
        Some(e) => as_u32(interp, e, line)?.saturating_sub(1),
        None => cur_row,
    };
    let c = match col {
        Some(e) => as_u32(interp, e, line)?.saturating_sub(1),
        None => cur_col,
    };
    interp.env.graphics.set_cursor(r, c);
    Ok(())
}

fn exec_pset(interp: &mut Interpreter, point: &Point, color: Option<&Expression>, line: u32) -> Result<(), InterpreterError> {
    let (x, y) = point_xy(interp, point, line)?;
    let c = match color {
        Some(e) => as_u32(interp, e, line)?,
        None => 15,
    };
    interp.env.graphics.active_page_mut().set_pixel(x, y, c);
    Ok(())
}

fn exec_preset(interp: &mut Interpreter, point: &Point, color: Option<&Expression>, line: u32) -> Result<(), InterpreterError> {
    let (x, y) = point_xy(interp, point, line)?;
    let c = match color {
        Some(e) => as_u32(interp, e, line)?,
        None => 0,
    };
    interp.env.graphics.active_page_mut().set_pixel(x, y, c);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn exec_line(
    interp: &mut Interpreter,
    p1: Option<&Point>,
    p2: &Point,
    color: Option<&Expression>,
    is_box: bool,
    filled: bool,
    line: u32,
) -> Result<(), InterpreterError> {
    let (x1, y1) = match p1 {
        Some(p) => point_xy(interp, p, line)?,
        None => interp.env.graphics.active_page().last_point(),
    };
    let (x2, y2) = point_xy(interp, p2, line)?;
    let c = match color {
        Some(e) => as_u32(interp, e, line)?,
        None => 15,
    };
    let fb = interp.env.graphics.active_page_mut();
    if is_box {
        fb.draw_box(x1, y1, x2, y2, c, filled);
    } else {
        fb.draw_line(x1, y1, x2, y2, c);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn exec_circle(
    interp: &mut Interpreter,
    center: &Point,
    radius: &Expression,
    color: Option<&Expression>,
    start: Option<&Expression>,
    end: Option<&Expression>,
    aspect: Option<&Expression>,
    line: u32,
) -> Result<(), InterpreterError> {
    let (cx, cy) = point_xy(interp, center, line)?;
    let r = as_i32(interp, radius, line)?;
    let c = match color {
        Some(e) => as_u32(interp, e, line)?,
        None => 15,
    };
    let start_angle = match start {
        Some(e) => interp.eval_expression(e, line)?.as_number().unwrap_or(0.0),
        None => 0.0,
    };
    let end_angle = match end {
        Some(e) => interp.eval_expression(e, line)?.as_number().unwrap_or(std::f64::consts::TAU),
        None => std::f64::consts::TAU,
    };
    let a = match aspect {
        Some(e) => interp.eval_expression(e, line)?.as_number().unwrap_or(1.0),
        None => 1.0,
    };
    interp.env.graphics.active_page_mut().draw_circle(cx, cy, r, c, start_angle, end_angle, a);
    Ok(())
}

fn exec_paint(interp: &mut Interpreter, point: &Point, fill_color: Option<&Expression>, border_color: Option<&Expression>, line: u32) -> Result<(), InterpreterError> {
    let (x, y) = point_xy(interp, point, line)?;
    let fill = match fill_color {
        Some(e) => as_u32(interp, e, line)?,
        None => 15,
    };
    let border = match border_color {
        Some(e) => Some(as_u32(interp, e, line)?),
        None => None,
    };
    interp.env.graphics.active_page_mut().flood_fill(x, y, fill, border);
    Ok(())
}

fn exec_palette(interp: &mut Interpreter, index: Option<&Expression>, color: Option<&Expression>, line: u32) -> Result<(), InterpreterError> {
    let (idx, packed) = match (index, color) {
        (Some(i), Some(c)) => (as_u32(interp, i, line)? as u8, as_u32(interp, c, line)?),
        _ => return Ok(()), // bare `PALETTE` resets nothing we model; no-op.
    };
    let r = ((packed >> 16) & 0xFF) as u8;
    let g = ((packed >> 8) & 0xFF) as u8;
    let b = (packed & 0xFF) as u8;
    interp.env.graphics.active_page_mut().palette_mut().set(idx, (b, g, r));
    Ok(())
}

fn exec_get_graphics(interp: &mut Interpreter, p1: &Point, p2: &Point, array: &str, line: u32) -> Result<(), InterpreterError> {
    let (x1, y1) = point_xy(interp, p1, line)?;
    let (x2, y2) = point_xy(interp, p2, line)?;
    let bytes = copy_region(interp.env.graphics.active_page(), x1, y1, x2, y2);
    interp.env.sprite_buffers.insert(array.to_ascii_uppercase(), bytes);
    Ok(())
}

fn map_raster_op(op: RasterOp) -> basic_framebuffer::RasterOp {
    match op {
        RasterOp::Pset => basic_framebuffer::RasterOp::Pset,
        RasterOp::Preset => basic_framebuffer::RasterOp::Preset,
        RasterOp::And => basic_framebuffer::RasterOp::And,
        RasterOp::Or => basic_framebuffer::RasterOp::Or,
        RasterOp::Xor => basic_framebuffer::RasterOp::Xor,
    }
}

fn exec_put_graphics(interp: &mut Interpreter, point: &Point, array: &str, action: Option<RasterOp>, line: u32) -> Result<(), InterpreterError> {
    let (x, y) = point_xy(interp, point, line)?;
    let key = array.to_ascii_uppercase();
    let bytes = interp
        .env
        .sprite_buffers
        .get(&key)
        .cloned()
        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::IllegalFunctionCall, line))?;
    paste_region(interp.env.graphics.active_page_mut(), x, y, &bytes, action.map(map_raster_op));
    Ok(())
}
