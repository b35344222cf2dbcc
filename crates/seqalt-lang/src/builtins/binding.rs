//! Names and members: `var`, `=`, `.` and closure creation with `=>`.

use crate::error::EvalError;
use crate::runtime::env;
use crate::runtime::interpreter::{Interpreter, Operands};
use crate::runtime::value::{NativeFn, Value};
use crate::syntax::node;

use super::{NativeSet, right};

pub struct BindingNatives;

impl NativeSet for BindingNatives {
    fn name(&self) -> &'static str { "binding" }

    fn natives(&self) -> Vec<NativeFn> {
        vec![
            NativeFn::new("var", declare),
            NativeFn::new("=", assign),
            NativeFn::new(".", member),
            NativeFn::new("=>", lambda),
        ]
    }
}

/// Binds the rendered right operand to `Null` in the current scope and
/// returns the name, so `var "x" = 1` declares then assigns.
fn declare(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    let name = right(interp, &ops)?.to_string();
    let mut scope = ops.env.clone();
    scope.insert(interp.heap(), name.as_str(), Value::Null)?;
    Ok(Value::string(interp.heap(), name))
}

/// Target, in order: the sequence's leading symbol, an `[object, key]`
/// pair, or the name `l` renders to.
fn assign(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    if let Some(name) = &ops.l_symbol {
        let val = right(interp, &ops)?;
        assign_name(interp, &ops.env, name, val.clone())?;
        return Ok(val);
    }

    if ops.l.is_array() && ops.l.length() == 2 {
        let mut object = ops.l.get(&Value::Number(0.0));
        let key = ops.l.get(&Value::Number(1.0));
        if object.as_gc().is_none() {
            return Err(EvalError::TypeMismatch(format!("cannot assign a member of {}", object.type_name())));
        }
        let val = right(interp, &ops)?;
        object.set(interp.heap(), &key, val.clone())?;
        return Ok(val);
    }

    let name = ops.l.to_string();
    let val = right(interp, &ops)?;
    assign_name(interp, &ops.env, &name, val.clone())?;
    Ok(val)
}

/// Writes into the scope that already defines `name`, else the root env.
fn assign_name(interp: &Interpreter, scope: &Value, name: &str, val: Value) -> Result<(), EvalError> {
    let mut owner = env::owner_env(scope, name).unwrap_or_else(|| interp.root_env().clone());
    owner.insert(interp.heap(), name, val)
}

/// A bare symbol on the right is a literal key; anything else is evaluated.
fn member(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    if let Some(key) = node::symbol_name(&ops.r_expr) {
        return Ok(ops.l.get_key(&key));
    }
    let key = right(interp, &ops)?;
    Ok(ops.l.get(&key))
}

fn lambda(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    let heap = interp.heap();
    let arg_names = if ops.l.is_array() {
        ops.l.clone()
    } else if ops.l.is_null() {
        Value::empty_array(heap)
    } else {
        Value::array(heap, vec![ops.l.clone()])
    };
    Ok(env::closure(heap, ops.env, arg_names, ops.r_expr))
}
