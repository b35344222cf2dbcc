//! Root-environment natives, grouped into sets that the registry installs.
//! Operators are plain entries here; the evaluator has no built-in syntax
//! beyond brackets.

use crate::error::EvalError;
use crate::runtime::gc::Heap;
use crate::runtime::interpreter::{Interpreter, Operands};
use crate::runtime::value::{NativeFn, Value};

pub mod arrays;
pub mod binding;
pub mod builders;
pub mod core;

// ─── Native sets ─────────────────────────────────────────────────────────────

pub trait NativeSet {
    fn name(&self) -> &'static str;
    fn natives(&self) -> Vec<NativeFn>;

    /// Non-function bindings installed next to the natives.
    fn constants(&self, _heap: &Heap) -> Vec<(&'static str, Value)> {
        Vec::new()
    }
}

// ─── Registry ────────────────────────────────────────────────────────────────

pub struct BuiltinRegistry {
    sets: Vec<Box<dyn NativeSet>>,
}

impl BuiltinRegistry {
    pub fn new() -> Self { Self { sets: Vec::new() } }

    pub fn register(&mut self, set: Box<dyn NativeSet>) { self.sets.push(set); }

    /// Bind every native and constant into `env`. Later sets shadow earlier ones.
    pub fn install(&self, env: &mut Value, heap: &Heap) {
        for set in &self.sets {
            tracing::trace!(set = set.name(), "installing builtins");
            for native in set.natives() {
                bind(env, heap, native.name(), Value::native(native));
            }
            for (name, value) in set.constants(heap) {
                bind(env, heap, name, value);
            }
        }
    }

    pub fn standard() -> Self {
        let mut r = Self::new();
        r.register(Box::new(core::CoreNatives));
        r.register(Box::new(binding::BindingNatives));
        r.register(Box::new(builders::BuilderNatives));
        r.register(Box::new(arrays::ArrayNatives));
        r
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self { Self::standard() }
}

fn bind(env: &mut Value, heap: &Heap, name: &str, value: Value) {
    if let Err(e) = env.insert(heap, name, value) {
        tracing::warn!(name, error = %e, "cannot install builtin");
    }
}

// ─── Shared helpers ──────────────────────────────────────────────────────────

/// Evaluate the right operand.
pub(crate) fn right(interp: &mut Interpreter, ops: &Operands) -> Result<Value, EvalError> {
    interp.eval_right(ops)
}

pub(crate) fn expect_callable(name: &str, v: &Value) -> Result<(), EvalError> {
    if crate::runtime::interpreter::is_callable(v) {
        Ok(())
    } else {
        Err(EvalError::TypeMismatch(format!("`{name}` expects a callable, found {}", v.type_name())))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
