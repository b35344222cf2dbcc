//! Aggregate builders and the lazy conditional.
//!
//! `"a" : 1 , "b" : 2` builds a dict through an intermediate wrapper
//! `{__type: DictUnderConstruction, body}`; a `,` stashes the next key in
//! `__tmpKey` and the following `:` stores the value under it. `c ? x : y`
//! goes through `{__type: IfThenResult, isTrue, exprIfTrue}` so that only
//! one branch is evaluated. Builders copy before writing, so a value bound
//! elsewhere is never mutated through them.

use crate::error::EvalError;
use crate::runtime::gc::Heap;
use crate::runtime::interpreter::{Interpreter, Operands};
use crate::runtime::value::{NativeFn, Value};

use super::{NativeSet, right};

pub const MARKER: &str = "__type";
pub const DICT_UNDER_CONSTRUCTION: &str = "DictUnderConstruction";
pub const IF_THEN_RESULT: &str = "IfThenResult";
pub const BODY: &str = "body";
pub const TMP_KEY: &str = "__tmpKey";
pub const IS_TRUE: &str = "isTrue";
pub const EXPR_IF_TRUE: &str = "exprIfTrue";

pub struct BuilderNatives;

impl NativeSet for BuilderNatives {
    fn name(&self) -> &'static str { "builders" }

    fn natives(&self) -> Vec<NativeFn> {
        vec![
            NativeFn::new(",", comma),
            NativeFn::new("?", if_then),
            NativeFn::new(":", colon),
        ]
    }
}

// ─── Markers ─────────────────────────────────────────────────────────────────

fn has_marker(v: &Value, kind: &str) -> bool {
    v.find(MARKER).and_then(|m| m.as_string()).is_some_and(|m| m == kind)
}

pub fn is_dict_under_construction(v: &Value) -> bool {
    has_marker(v, DICT_UNDER_CONSTRUCTION)
}

pub fn is_if_then_result(v: &Value) -> bool {
    has_marker(v, IF_THEN_RESULT)
}

/// The finished dict of a builder; any other value unchanged.
pub fn unwrap_dict(v: Value) -> Value {
    if is_dict_under_construction(&v) { v.get_key(BODY) } else { v }
}

fn under_construction(heap: &Heap, body: Value) -> Value {
    Value::dict(heap, [
        (MARKER, Value::string(heap, DICT_UNDER_CONSTRUCTION)),
        (BODY, body),
    ])
}

// ─── Natives ─────────────────────────────────────────────────────────────────

fn comma(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    let r = right(interp, &ops)?;
    let heap = interp.heap();

    if is_dict_under_construction(&ops.l) {
        let mut copy = ops.l.shallow_copy(heap);
        copy.insert(heap, TMP_KEY, r)?;
        return Ok(copy);
    }
    if ops.l.is_array() && ops.l.length() > 0 {
        let mut copy = ops.l.shallow_copy(heap);
        copy.push(heap, r)?;
        return Ok(copy);
    }
    Ok(Value::array(heap, vec![ops.l, r]))
}

fn if_then(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    let heap = interp.heap();
    Ok(Value::dict(heap, [
        (MARKER, Value::string(heap, IF_THEN_RESULT)),
        (IS_TRUE, ops.l),
        (EXPR_IF_TRUE, ops.r_expr),
    ]))
}

fn colon(interp: &mut Interpreter, ops: Operands) -> Result<Value, EvalError> {
    if is_if_then_result(&ops.l) {
        if ops.l.get_key(IS_TRUE).to_bool() {
            let branch = ops.l.get_key(EXPR_IF_TRUE);
            return interp.eval_expr(&ops.env, &branch);
        }
        return right(interp, &ops);
    }

    if is_dict_under_construction(&ops.l) {
        let key = ops.l.find(TMP_KEY).ok_or_else(|| {
            EvalError::TypeMismatch("`:` after a dict entry needs `,` and a key first".into())
        })?;
        let r = right(interp, &ops)?;
        let heap = interp.heap();
        let mut body = ops.l.get_key(BODY).shallow_copy(heap);
        body.set(heap, &key, r)?;
        return Ok(under_construction(heap, body));
    }

    if let Some(key) = ops.l.as_string() {
        let r = right(interp, &ops)?;
        let heap = interp.heap();
        let body = Value::dict(heap, [(key, r)]);
        return Ok(under_construction(heap, body));
    }

    Err(EvalError::TypeMismatch(format!("`:` cannot follow {}", ops.l.type_name())))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
