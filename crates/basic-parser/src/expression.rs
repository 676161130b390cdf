//! Expression parsing at classic BASIC precedence (spec.md §4.C), lowest to
//! highest: `Imp`, `Eqv`, `Xor`, `Or`, `And`, `Not` (unary prefix),
//! relational (nonassociative), additive, `Mod`, integer div `\`,
//! multiplicative, power `^` (right-associative), unary `-`, primary.

use crate::cursor::Cursor;
use basic_ast::{BinOp, Expression, InterpreterError, Literal, TokenKind, UnOp, Value};

pub fn parse_expression(c: &mut Cursor) -> Result<Expression, InterpreterError> {
    parse_imp(c)
}

macro_rules! left_assoc {
    ($name:ident, $next:ident, [$($tok:pat => $op:expr),+ $(,)?]) => {
        fn $name(c: &mut Cursor) -> Result<Expression, InterpreterError> {
            let mut left = $next(c)?;
            loop {
                let op = match c.peek_kind() {
                    $($tok => $op,)+
                    _ => break,
                };
                c.advance();
                let right = $next(c)?;
                left = Expression::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                };
            }
            Ok(left)
        }
    };
}

left_assoc!(parse_imp, parse_eqv, [TokenKind::Imp => BinOp::Imp]);
left_assoc!(parse_eqv, parse_xor, [TokenKind::Eqv => BinOp::Eqv]);
left_assoc!(parse_xor, parse_or, [TokenKind::Xor => BinOp::Xor]);
left_assoc!(parse_or, parse_and, [TokenKind::Or => BinOp::Or]);
left_assoc!(parse_and, parse_not, [TokenKind::And => BinOp::And]);

fn parse_not(c: &mut Cursor) -> Result<Expression, InterpreterError> {
    if c.matches(TokenKind::Not) {
        let right = parse_not(c)?;
        Ok(Expression::Unary {
            op: UnOp::Not,
            right: Box::new(right),
        })
    } else {
        parse_relational(c)
    }
}

fn parse_relational(c: &mut Cursor) -> Result<Expression, InterpreterError> {
    let left = parse_additive(c)?;
    let op = match c.peek_kind() {
        TokenKind::Equal => BinOp::Eq,
        TokenKind::NotEqual => BinOp::NotEq,
        TokenKind::Less => BinOp::Lt,
        TokenKind::LessEqual => BinOp::LtEq,
        TokenKind::Greater => BinOp::Gt,
        TokenKind::GreaterEqual => BinOp::GtEq,
        _ => return Ok(left),
    };
    c.advance();
    let right = parse_additive(c)?;
    Ok(Expression::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    })
}

left_assoc!(parse_additive, parse_mod, [
    TokenKind::Plus => BinOp::Add,
    TokenKind::Minus => BinOp::Sub,
]);
left_assoc!(parse_mod, parse_intdiv, [TokenKind::Mod => BinOp::Mod]);
left_assoc!(parse_intdiv, parse_multiplicative, [TokenKind::Backslash => BinOp::IntDiv]);
left_assoc!(parse_multiplicative, parse_power, [
    TokenKind::Star => BinOp::Mul,
    TokenKind::Slash => BinOp::Div,
]);

fn parse_power(c: &mut Cursor) -> Result<Expression, InterpreterError> {
    let left = parse_unary(c)?;
    if c.matches(TokenKind::Caret) {
        let right = parse_power(c)?; // right-associative
        Ok(Expression::Binary {
            left: Box::new(left),
            op: BinOp::Pow,
            right: Box::new(right),
        })
    } else {
        Ok(left)
    }
}

fn parse_unary(c: &mut Cursor) -> Result<Expression, InterpreterError> {
    if c.matches(TokenKind::Minus) {
        let right = parse_unary(c)?;
        Ok(Expression::Unary {
            op: UnOp::Neg,
            right: Box::new(right),
        })
    } else if c.matches(TokenKind::Plus) {
        parse_unary(c)
    } else {
        parse_primary(c)
    }
}

fn parse_primary(c: &mut Cursor) -> Result<Expression, InterpreterError> {
    let expr = match c.peek_kind() {
        TokenKind::NumberLiteral => {
            let tok = c.advance();
            match tok.literal {
                Literal::Number(n) => Expression::Literal(Value::Number(n)),
                _ => return Err(c.error("malformed number literal")),
            }
        }
        TokenKind::StringLiteral => {
            let tok = c.advance();
            match tok.literal {
                Literal::Text(s) => Expression::Literal(Value::Text(s)),
                _ => return Err(c.error("malformed string literal")),
            }
        }
        TokenKind::LParen => {
            c.advance();
            let inner = parse_expression(c)?;
            c.expect(TokenKind::RParen, "')'")?;
            Expression::Grouping(Box::new(inner))
        }
        TokenKind::Fn => {
            c.advance();
            let name_tok = c.expect(TokenKind::Identifier, "a function name")?;
            let args = parse_call_args(c)?;
            Expression::FnCall(name_tok.lexeme, args)
        }
        TokenKind::Identifier => {
            let name_tok = c.advance();
            let mut expr = if c.check(TokenKind::LParen) {
                let args = parse_call_args(c)?;
                Expression::ArrayOrCall(name_tok.lexeme, args)
            } else {
                Expression::Variable(name_tok.lexeme)
            };
            while c.matches(TokenKind::Dot) {
                let field_tok = c.expect(TokenKind::Identifier, "a field name")?;
                expr = Expression::FieldAccess(Box::new(expr), field_tok.lexeme);
            }
            expr
        }
        _ => return Err(c.error("expected an expression")),
    };
    Ok(expr)
}

fn parse_call_args(c: &mut Cursor) -> Result<Vec<Expression>, InterpreterError> {
    c.expect(TokenKind::LParen, "'('")?;
    let mut args = Vec::new();
    if !c.check(TokenKind::RParen) {
        loop {
            args.push(parse_expression(c)?);
            if !c.matches(TokenKind::Comma) {
                break;
            }
        }
    }
    c.expect(TokenKind::RParen, "')'")?;
    Ok(args)
}

pub(crate) fn parse_point(c: &mut Cursor) -> Result<basic_ast::Point, InterpreterError> {
    let step = c.matches(TokenKind::Step);
    c.expect(TokenKind::LParen, "'('")?;
    let x = parse_expression(c)?;
    c.expect(TokenKind::Comma, "','")?;
    let y = parse_expression(c)?;
    c.expect(TokenKind::RParen, "')'")?;
    Ok(basic_ast::Point { x, y, step })
}
