//! Environments are dicts chained through `__parentEnv`; closures are dicts
//! carrying their defining env, argument names and body.

use crate::runtime::gc::{Heap, Object};
use crate::runtime::value::Value;

pub const PARENT_ENV: &str = "__parentEnv";
pub const ARGS: &str = "args";

pub const CLOSURE_ENV: &str = "env";
pub const CLOSURE_ARG_NAMES: &str = "argNames";
pub const CLOSURE_EXPR: &str = "expr";

/// Nearest scope in the `__parentEnv` chain that defines `name`.
pub fn owner_env(env: &Value, name: &str) -> Option<Value> {
    let mut seen: Vec<*const Object> = Vec::new();
    let mut current = env.clone();
    while let Some(gc) = current.as_gc() {
        let ptr = gc.as_ptr();
        if seen.contains(&ptr) {
            return None;
        }
        seen.push(ptr);
        if current.find(name).is_some() {
            return Some(current);
        }
        current = current.get_key(PARENT_ENV);
    }
    None
}

/// Value bound to `name`, or `Null` when no scope defines it.
pub fn env_val(env: &Value, name: &str) -> Value {
    owner_env(env, name)
        .map(|scope| scope.get_key(name))
        .unwrap_or_default()
}

/// Fresh scope whose parent is `parent`.
pub fn new_scope(heap: &Heap, parent: Value) -> Value {
    Value::dict(heap, [(PARENT_ENV, parent)])
}

pub fn is_closure(v: &Value) -> bool {
    v.is_dict() && v.find(CLOSURE_EXPR).is_some() && v.find(CLOSURE_ARG_NAMES).is_some()
}

pub fn closure(heap: &Heap, env: Value, arg_names: Value, expr: Value) -> Value {
    Value::dict(heap, [
        (CLOSURE_ENV, env),
        (CLOSURE_ARG_NAMES, arg_names),
        (CLOSURE_EXPR, expr),
    ])
}

// ─── Tests ───────────────────────────────────────────────────────────────────
