use crate::error::EvalError;
use crate::runtime::interpreter::{Interpreter, Operands};
use crate::runtime::value::{NativeFn, Value};

use super::{NativeSet, expect_callable, right};

pub struct ArrayNatives;

impl NativeSet for ArrayNatives {
    fn name(&self) -> &'static str { "arrays" }

    fn natives(&self) -> Vec<NativeFn> {
        vec![
            NativeFn::new("range", range),
            NativeFn::new("length", length),
            NativeFn::new("map", map),
            NativeFn::new("forEach", for_each),
        ]
    }
}

/// `range n` → `[0, 1, …, n-1]`; the count is truncated, negatives give `[]`.
fn range(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    let n = right(interp, &ops)?.to_number();
    let count = if n.is_finite() && n > 0.0 { n as usize } else { 0 };
    let items = (0..count).map(|i| Value::Number(i as f64)).collect();
    Ok(Value::array(interp.heap(), items))
}

fn length(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    let r = right(interp, &ops)?;
    Ok(Value::Number(r.length() as f64))
}

fn map(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    let results = each(interp, &ops, "map")?;
    Ok(Value::array(interp.heap(), results))
}

fn for_each(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    each(interp, &ops, "forEach")?;
    Ok(Value::Null)
}

/// Calls the right operand once per element of `l`, with `l = Null` and the
/// element as `r`. Iterates a snapshot, so the callee may mutate the array.
fn each(interp: &mut Interpreter, ops: &Operands, name: &str) -> Result<Vec<Value>, EvalError> {
    let func = right(interp, ops)?;
    expect_callable(name, &func)?;

    let items = match ops.l.items() {
        Some(items) => items,
        None if ops.l.is_null() => Vec::new(),
        None => {
            return Err(EvalError::TypeMismatch(format!("`{name}` expects an array, found {}", ops.l.type_name())));
        }
    };

    items
        .into_iter()
        .map(|item| interp.apply(&ops.env, &func, Value::Null, item))
        .collect()
}
