//! Sequencing, arithmetic, comparison, short-circuit logic and `print`.

use crate::error::EvalError;
use crate::runtime::gc::Heap;
use crate::runtime::interpreter::{Interpreter, Operands};
use crate::runtime::value::{NativeFn, Value};

use super::{NativeSet, right};

pub struct CoreNatives;

impl NativeSet for CoreNatives {
    fn name(&self) -> &'static str { "core" }

    fn natives(&self) -> Vec<NativeFn> {
        vec![
            NativeFn::new(";", then),
            NativeFn::new("//", comment),
            NativeFn::new("rem", comment),
            NativeFn::new("+", add),
            NativeFn::new("-", sub),
            NativeFn::new("*", mul),
            NativeFn::new("==", eq),
            NativeFn::new("!=", ne),
            NativeFn::new("<", lt),
            NativeFn::new("<=", le),
            NativeFn::new(">", gt),
            NativeFn::new(">=", ge),
            NativeFn::new("&&", and),
            NativeFn::new("||", or),
            NativeFn::new("print", print),
        ]
    }

    fn constants(&self, _heap: &Heap) -> Vec<(&'static str, Value)> {
        vec![("@", Value::Null)]
    }
}

// ─── Sequencing ──────────────────────────────────────────────────────────────

fn then(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    right(interp, &ops)
}

/// Keeps `l` and never looks at the right operand.
fn comment(_: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    Ok(ops.l)
}

// ─── Arithmetic ──────────────────────────────────────────────────────────────

fn add(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    let r = right(interp, &ops)?;
    Ok(ops.l.add(interp.heap(), &r))
}

fn sub(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    numeric(interp, ops, |a, b| a - b)
}

fn mul(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    numeric(interp, ops, |a, b| a * b)
}

fn numeric(interp: &mut Interpreter, ops: Operands, f: fn(f64, f64) -> f64) -> Result<Value, EvalError> {
    let r = right(interp, &ops)?;
    Ok(Value::Number(f(ops.l.to_number(), r.to_number())))
}

// ─── Comparison ──────────────────────────────────────────────────────────────

fn eq(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    let r = right(interp, &ops)?;
    Ok((ops.l == r).into())
}

fn ne(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    let r = right(interp, &ops)?;
    Ok((ops.l != r).into())
}

fn lt(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    compare(interp, ops, |a, b| a < b)
}

fn le(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    compare(interp, ops, |a, b| a <= b)
}

fn gt(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    compare(interp, ops, |a, b| a > b)
}

fn ge(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    compare(interp, ops, |a, b| a >= b)
}

fn compare(interp: &mut Interpreter, ops: Operands, f: fn(f64, f64) -> bool) -> Result<Value, EvalError> {
    let r = right(interp, &ops)?;
    Ok(f(ops.l.to_number(), r.to_number()).into())
}

// ─── Logic ───────────────────────────────────────────────────────────────────

fn and(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    if !ops.l.to_bool() { return Ok(ops.l); }
    right(interp, &ops)
}

fn or(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    if ops.l.to_bool() { return Ok(ops.l); }
    right(interp, &ops)
}

// ─── Output ──────────────────────────────────────────────────────────────────

fn print(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    let r = right(interp, &ops)?;
    interp.print(&r)?;
    Ok(Value::Null)
}
