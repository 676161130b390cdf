//! Expression AST (spec.md §3 "Expression").

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Xor,
    Eqv,
    Imp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// Tagged expression variant. `ArrayOrCall` is deliberately ambiguous at
/// parse time (spec.md §4.C, §9): the evaluator decides at evaluation
/// whether `name(args)` is a user function call, a built-in call, or an
/// array read.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Value),
    Variable(String),
    /// `name(args)` — resolution deferred to the evaluator.
    ArrayOrCall(String, Vec<Expression>),
    /// Explicit `FN name(args)` call.
    FnCall(String, Vec<Expression>),
    FieldAccess(Box<Expression>, String),
    Binary {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
    Unary {
        op: UnOp,
        right: Box<Expression>,
    },
    Grouping(Box<Expression>),
}
