//! Expression evaluation (spec.md §4.F "Evaluation"): variable/constant
//! lookup, the `ArrayOrCall` three-way resolution (user function, builtin,
//! or array read), arithmetic/relational/logical operators, and field
//! access into `TYPE` instances.

use basic_ast::{BinOp, Expression, InterpreterError, LValue, RuntimeErrorKind, UnOp, Value};

use crate::array::{ArrayVar, AUTO_DIM_UPPER};
use crate::Interpreter;

impl Interpreter {
    pub fn eval_expression(&mut self, expr: &Expression, line: u32) -> Result<Value, InterpreterError> {
        match expr {
            Expression::Literal(v) => Ok(v.clone()),
            Expression::Variable(name) => self.eval_name_as_value(name, line),
            Expression::ArrayOrCall(name, args) => self.eval_array_or_call(name, args, line),
            Expression::FnCall(name, args) => self.eval_fn_call(name, args, line),
            Expression::FieldAccess(base, field) => self.eval_field_access(base, field, line),
            Expression::Binary { left, op, right } => self.eval_binary(left, *op, right, line),
            Expression::Unary { op, right } => self.eval_unary(*op, right, line),
            Expression::Grouping(inner) => self.eval_expression(inner, line),
        }
    }

    /// A bare identifier: zero-arg builtins (`TIMER`, `INKEY$`, ...) come
    /// before constants/variables, since they carry no parens at all
    /// (spec.md §6 "Zero-argument forms that need no parens").
    fn eval_name_as_value(&mut self, name: &str, line: u32) -> Result<Value, InterpreterError> {
        if let Some(result) = self.call_builtin(name, &[], line) {
            return result;
        }
        Ok(self.env.get_variable(name))
    }

    /// `ArrayOrCall(name, args)` — deferred resolution (spec.md §3, §9):
    /// a `FUNCTION`/`DEF FN` call wins over a builtin, which wins over an
    /// array read; an unknown array auto-creates with upper bound 10 on
    /// every axis (spec.md §9 "Auto-creating arrays").
    fn eval_array_or_call(
        &mut self,
        name: &str,
        args: &[Expression],
        line: u32,
    ) -> Result<Value, InterpreterError> {
        if self.env.has_routine(name) {
            return self.call_user_function(name, args, line);
        }
        if self.env.has_user_function(name) {
            return self.eval_def_fn(name, args, line);
        }
        if !self.env.has_array(name) {
            if let Some(result) = self.call_builtin(name, args, line) {
                return result;
            }
        }
        self.eval_array_read(name, args, line)
    }

    fn eval_fn_call(&mut self, name: &str, args: &[Expression], line: u32) -> Result<Value, InterpreterError> {
        if self.env.has_user_function(name) {
            self.eval_def_fn(name, args, line)
        } else if self.env.has_routine(name) {
            self.call_user_function(name, args, line)
        } else {
            Err(InterpreterError::runtime_with(
                RuntimeErrorKind::IllegalFunctionCall,
                line,
                format!("undefined function FN {name}"),
            ))
        }
    }

    fn eval_def_fn(&mut self, name: &str, args: &[Expression], line: u32) -> Result<Value, InterpreterError> {
        let key = name.to_ascii_uppercase();
        let func = self
            .env
            .user_functions
            .get(&key)
            .cloned()
            .expect("checked by has_user_function");
        let mut values = Vec::with_capacity(args.len());
        for a in args {
            values.push(self.eval_expression(a, line)?);
        }
        let saved: Vec<(String, Option<Value>)> = func
            .params
            .iter()
            .map(|p| (p.clone(), self.env.variables.get(&p.to_ascii_uppercase()).cloned()))
            .collect();
        for (p, v) in func.params.iter().zip(values.into_iter()) {
            self.env.set_variable(p, v);
        }
        let result = self.eval_expression(&func.body, line);
        for (p, saved_value) in saved {
            match saved_value {
                Some(v) => {
                    self.env.variables.insert(p.to_ascii_uppercase(), v);
                }
                None => {
                    self.env.variables.remove(&p.to_ascii_uppercase());
                }
            }
        }
        result
    }

    fn eval_array_read(&mut self, name: &str, args: &[Expression], line: u32) -> Result<Value, InterpreterError> {
        let mut indices = Vec::with_capacity(args.len());
        for a in args {
            indices.push(self.eval_expression(a, line)?.as_number().unwrap_or(0.0) as i64);
        }
        let key = name.to_ascii_uppercase();
        if !self.env.arrays.contains_key(&key) {
            let dims = vec![AUTO_DIM_UPPER; indices.len().max(1)];
            self.env.arrays.insert(key.clone(), ArrayVar::new(dims, &key));
        }
        let array = self.env.arrays.get(&key).unwrap();
        array.get(&indices).cloned().ok_or_else(|| {
            InterpreterError::runtime(RuntimeErrorKind::SubscriptOutOfRange, line)
        })
    }

    fn eval_field_access(
        &mut self,
        base: &Expression,
        field: &str,
        line: u32,
    ) -> Result<Value, InterpreterError> {
        match base {
            Expression::Variable(name) => {
                let key = name.to_ascii_uppercase();
                if let Some(rec) = self.env.records.get(&key) {
                    return rec
                        .get(field)
                        .cloned()
                        .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::TypeMismatch, line));
                }
                Err(InterpreterError::runtime(RuntimeErrorKind::TypeMismatch, line))
            }
            Expression::ArrayOrCall(name, index_exprs) => {
                let key = name.to_ascii_uppercase();
                let mut indices = Vec::with_capacity(index_exprs.len());
                for e in index_exprs {
                    indices.push(self.eval_expression(e, line)?.as_number().unwrap_or(0.0) as i64);
                }
                let ra = self
                    .env
                    .record_arrays
                    .get(&key)
                    .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::SubscriptOutOfRange, line))?;
                let offset = record_array_offset(ra, &indices)
                    .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::SubscriptOutOfRange, line))?;
                ra.elements[offset]
                    .get(field)
                    .cloned()
                    .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::TypeMismatch, line))
            }
            _ => Err(InterpreterError::runtime(RuntimeErrorKind::TypeMismatch, line)),
        }
    }

    fn eval_binary(
        &mut self,
        left: &Expression,
        op: BinOp,
        right: &Expression,
        line: u32,
    ) -> Result<Value, InterpreterError> {
        let l = self.eval_expression(left, line)?;
        let r = self.eval_expression(right, line)?;
        apply_binop(l, op, r, line)
    }

    fn eval_unary(&mut self, op: UnOp, right: &Expression, line: u32) -> Result<Value, InterpreterError> {
        let v = self.eval_expression(right, line)?;
        match op {
            UnOp::Neg => Ok(Value::Number(-to_number(&v, line)?)),
            UnOp::Not => Ok(bool_value(!v.truthy())),
        }
    }
}

/// Stores `value` into an `LValue` target (spec.md §4.F `Let`, shared with
/// `READ`/`INPUT`/`SWAP`): a bare variable, an array element (auto-creating
/// on first write the same way a read does), or a dotted `TYPE` field,
/// possibly through an array of records.
pub fn assign_lvalue(
    interp: &mut Interpreter,
    target: &LValue,
    value: Value,
    line: u32,
) -> Result<(), InterpreterError> {
    match target {
        LValue::Variable(name) => {
            interp.env.set_variable(name, value);
            Ok(())
        }
        LValue::Index(name, index_exprs) => {
            let mut indices = Vec::with_capacity(index_exprs.len());
            for e in index_exprs {
                indices.push(interp.eval_expression(e, line)?.as_number().unwrap_or(0.0) as i64);
            }
            let key = name.to_ascii_uppercase();
            if !interp.env.arrays.contains_key(&key) {
                let dims = vec![AUTO_DIM_UPPER; indices.len().max(1)];
                interp.env.arrays.insert(key.clone(), ArrayVar::new(dims, &key));
            }
            let coerced = interp.env.coerce_for_store(&key, value);
            let array = interp.env.arrays.get_mut(&key).unwrap();
            array
                .set(&indices, coerced)
                .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::SubscriptOutOfRange, line))
        }
        LValue::Field(base, field) => match base.as_ref() {
            LValue::Variable(name) => {
                let key = name.to_ascii_uppercase();
                let rec = interp
                    .env
                    .records
                    .get_mut(&key)
                    .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::TypeMismatch, line))?;
                rec.set(field, value);
                Ok(())
            }
            LValue::Index(name, index_exprs) => {
                let key = name.to_ascii_uppercase();
                let mut indices = Vec::with_capacity(index_exprs.len());
                for e in index_exprs {
                    indices.push(interp.eval_expression(e, line)?.as_number().unwrap_or(0.0) as i64);
                }
                let ra = interp
                    .env
                    .record_arrays
                    .get_mut(&key)
                    .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::SubscriptOutOfRange, line))?;
                let offset = record_array_offset(ra, &indices)
                    .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::SubscriptOutOfRange, line))?;
                ra.elements[offset].set(field, value);
                Ok(())
            }
            LValue::Field(..) => Err(InterpreterError::runtime(RuntimeErrorKind::TypeMismatch, line)),
        },
    }
}

pub(crate) fn record_array_offset(
    ra: &crate::environment::RecordArray,
    indices: &[i64],
) -> Option<usize> {
    if indices.len() != ra.dims.len() {
        return None;
    }
    let mut offset = 0usize;
    for (i, &idx) in indices.iter().enumerate() {
        let upper = ra.dims[i] as i64;
        if idx < 0 || idx > upper {
            return None;
        }
        let axis_len = upper as usize + 1;
        offset = offset * axis_len + idx as usize;
    }
    Some(offset)
}

/// Coerces to a number, converting a text operand only via `VAL`-style
/// leading-numeric-prefix parsing; a non-numeric string is a type mismatch
/// (spec.md §4.F "Arithmetic operators coerce text-to-number when needed;
/// failure is fatal").
pub fn to_number(v: &Value, line: u32) -> Result<f64, InterpreterError> {
    match v {
        Value::Number(n) => Ok(*n),
        Value::Text(s) => crate::builtins::parse_val(s)
            .ok_or_else(|| InterpreterError::runtime(RuntimeErrorKind::TypeMismatch, line)),
    }
}

fn to_text(v: &Value) -> String {
    match v {
        Value::Text(s) => s.clone(),
        Value::Number(n) => crate::format::str_dollar(*n),
    }
}

/// `+` concatenates when either side is text, stringifies the other side
/// (spec.md §3 "A `+` on two Text values concatenates; on any mixed pair it
/// stringifies; otherwise numeric addition").
pub fn apply_binop(l: Value, op: BinOp, r: Value, line: u32) -> Result<Value, InterpreterError> {
    use BinOp::*;
    if op == Add && (l.is_text() || r.is_text()) {
        return Ok(Value::Text(format!("{}{}", to_text(&l), to_text(&r))));
    }
    match op {
        Eq | NotEq | Lt | LtEq | Gt | GtEq => {
            let result = if l.is_text() && r.is_text() {
                let (a, b) = (to_text(&l), to_text(&r));
                compare(a.cmp(&b), op)
            } else {
                let (a, b) = (to_number(&l, line)?, to_number(&r, line)?);
                compare(a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal), op)
            };
            Ok(bool_value(result))
        }
        And | Or | Xor | Eqv | Imp => {
            let a = to_number(&l, line)? as i64;
            let b = to_number(&r, line)? as i64;
            let result = match op {
                And => a & b,
                Or => a | b,
                Xor => a ^ b,
                Eqv => !(a ^ b),
                Imp => !a | b,
                _ => unreachable!(),
            };
            Ok(Value::Number(result as f64))
        }
        _ => {
            let a = to_number(&l, line)?;
            let b = to_number(&r, line)?;
            let result = match op {
                Add => a + b,
                Sub => a - b,
                Mul => a * b,
                Div => {
                    if b == 0.0 {
                        return Err(InterpreterError::runtime(RuntimeErrorKind::DivisionByZero, line));
                    }
                    a / b
                }
                IntDiv => {
                    let bi = b.trunc();
                    if bi == 0.0 {
                        return Err(InterpreterError::runtime(RuntimeErrorKind::DivisionByZero, line));
                    }
                    (a.trunc() / bi).trunc()
                }
                Mod => {
                    let bi = b.trunc();
                    if bi == 0.0 {
                        return Err(InterpreterError::runtime(RuntimeErrorKind::DivisionByZero, line));
                    }
                    a.trunc() % bi
                }
                Pow => a.powf(b),
                _ => unreachable!(),
            };
            Ok(Value::Number(result))
        }
    }
}

fn bool_value(b: bool) -> Value {
    Value::Number(if b { -1.0 } else { 0.0 })
}

fn compare(ord: std::cmp::Ordering, op: BinOp) -> bool {
    use std::cmp::Ordering::*;
    match op {
        BinOp::Eq => ord == Equal,
        BinOp::NotEq => ord != Equal,
        BinOp::Lt => ord == Less,
        BinOp::LtEq => ord != Greater,
        BinOp::Gt => ord == Greater,
        BinOp::GtEq => ord != Less,
        _ => unreachable!(),
    }
}
