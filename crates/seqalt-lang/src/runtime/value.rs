use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::EvalError;
use crate::runtime::gc::{Gc, Heap, Object};
use crate::runtime::interpreter::{Interpreter, Operands};

pub type Dict = BTreeMap<String, Value>;

/// Signature shared by every native function bound in an environment.
pub type NativeFnPtr = fn(&mut Interpreter, Operands) -> Result<Value, EvalError>;

// ─── Native functions ────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
pub struct NativeFn {
    name: &'static str,
    func: NativeFnPtr,
}

impl NativeFn {
    pub const fn new(name: &'static str, func: NativeFnPtr) -> Self {
        Self { name, func }
    }

    pub fn name(&self) -> &'static str { self.name }

    pub fn call(&self, interp: &mut Interpreter, operands: Operands) -> Result<Value, EvalError> {
        (self.func)(interp, operands)
    }
}

impl PartialEq for NativeFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && std::ptr::fn_addr_eq(self.func, other.func)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}

// ─── Composite ───────────────────────────────────────────────────────────────

/// Heap payload behind a `Value::Ref`. Mutable in place through any handle.
#[derive(Debug, Clone)]
pub enum Composite {
    Str(String),
    Array(Vec<Value>),
    Dict(Dict),
}

// ─── Value ───────────────────────────────────────────────────────────────────

/// The single runtime type. Also the shape of AST nodes and environments.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Number(f64),
    NativeFn(NativeFn),
    Ref(Gc),
}

impl Value {
    // ─── Construction ────────────────────────────────────────────────────────

    pub fn native(f: NativeFn) -> Self { Value::NativeFn(f) }

    pub fn string(heap: &Heap, s: impl Into<String>) -> Self {
        Value::Ref(heap.alloc(Composite::Str(s.into())))
    }

    pub fn array(heap: &Heap, items: Vec<Value>) -> Self {
        Value::Ref(heap.alloc(Composite::Array(items)))
    }

    pub fn dict<K: Into<String>>(heap: &Heap, entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let dict = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Ref(heap.alloc(Composite::Dict(dict)))
    }

    pub fn empty_array(heap: &Heap) -> Self { Self::array(heap, Vec::new()) }

    pub fn empty_dict(heap: &Heap) -> Self { Self::dict::<String>(heap, []) }

    // ─── Inspection ──────────────────────────────────────────────────────────

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_gc(&self) -> Option<&Gc> {
        match self {
            Value::Ref(gc) => Some(gc),
            _ => None,
        }
    }

    /// Contents of a string composite.
    pub fn as_string(&self) -> Option<String> {
        match &*self.as_gc()?.borrow() {
            Composite::Str(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        self.as_gc().is_some_and(|gc| matches!(&*gc.borrow(), Composite::Array(_)))
    }

    pub fn is_dict(&self) -> bool {
        self.as_gc().is_some_and(|gc| matches!(&*gc.borrow(), Composite::Dict(_)))
    }

    /// Snapshot of an array's elements. Callers iterate the copy so the
    /// composite is not borrowed while user code runs.
    pub fn items(&self) -> Option<Vec<Value>> {
        match &*self.as_gc()?.borrow() {
            Composite::Array(items) => Some(items.clone()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::NativeFn(_) => "native function",
            Value::Ref(gc) => match &*gc.borrow() {
                Composite::Str(_) => "string",
                Composite::Array(_) => "array",
                Composite::Dict(_) => "dict",
            },
        }
    }

    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Ref(a), Value::Ref(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    // ─── Indexed access ──────────────────────────────────────────────────────

    /// Non-mutating read. Missing keys, out-of-range indices and
    /// non-indexable receivers all yield `Null`.
    pub fn get(&self, key: &Value) -> Value {
        let Some(gc) = self.as_gc() else { return Value::Null };
        match (&*gc.borrow(), key) {
            (Composite::Array(items), Value::Number(n)) => array_index(*n)
                .and_then(|i| items.get(i).cloned())
                .unwrap_or_default(),
            (Composite::Dict(entries), key) => entries.get(&key.to_string()).cloned().unwrap_or_default(),
            _ => Value::Null,
        }
    }

    pub fn get_key(&self, key: &str) -> Value {
        self.find(key).unwrap_or_default()
    }

    /// Presence probe on a dict. Never auto-vivifies.
    pub fn find(&self, key: &str) -> Option<Value> {
        match &*self.as_gc()?.borrow() {
            Composite::Dict(entries) => entries.get(key).cloned(),
            _ => None,
        }
    }

    /// Indexed write. A `Null` receiver becomes an empty array (numeric key)
    /// or dict (any other key) first; arrays grow with `Null` padding.
    pub fn set(&mut self, heap: &Heap, key: &Value, val: Value) -> Result<(), EvalError> {
        if let Value::Number(n) = key {
            if self.is_null() {
                *self = Value::empty_array(heap);
            }
            let target = self.as_gc().ok_or_else(|| not_indexable(self))?;
            let mut body = target.borrow_mut();
            return match &mut *body {
                Composite::Array(items) => {
                    let idx = array_index(*n)
                        .ok_or_else(|| EvalError::TypeMismatch(format!("invalid array index {n}")))?;
                    if idx >= items.len() {
                        if idx - items.len() >= MAX_ARRAY_GROWTH {
                            return Err(EvalError::IndexOutOfRange { index: *n, len: items.len() });
                        }
                        items.resize(idx + 1, Value::Null);
                    }
                    items[idx] = val;
                    Ok(())
                }
                Composite::Dict(entries) => {
                    entries.insert(key.to_string(), val);
                    Ok(())
                }
                Composite::Str(_) => Err(EvalError::TypeMismatch("cannot assign into a string".into())),
            };
        }
        self.insert(heap, key.to_string(), val)
    }

    /// Keyed write into a dict, auto-vivifying `Null`.
    pub fn insert(&mut self, heap: &Heap, key: impl Into<String>, val: Value) -> Result<(), EvalError> {
        if self.is_null() {
            *self = Value::empty_dict(heap);
        }
        let target = self.as_gc().ok_or_else(|| not_indexable(self))?;
        match &mut *target.borrow_mut() {
            Composite::Dict(entries) => {
                entries.insert(key.into(), val);
                Ok(())
            }
            Composite::Array(_) => Err(EvalError::TypeMismatch("array keys must be numbers".into())),
            Composite::Str(_) => Err(EvalError::TypeMismatch("cannot assign into a string".into())),
        }
    }

    /// Array length or dict entry count; 0 for everything else.
    pub fn length(&self) -> usize {
        let Some(gc) = self.as_gc() else { return 0 };
        match &*gc.borrow() {
            Composite::Array(items) => items.len(),
            Composite::Dict(entries) => entries.len(),
            Composite::Str(_) => 0,
        }
    }

    pub fn push(&mut self, heap: &Heap, val: Value) -> Result<(), EvalError> {
        if self.is_null() {
            *self = Value::empty_array(heap);
        }
        let target = self.as_gc().ok_or_else(|| not_indexable(self))?;
        match &mut *target.borrow_mut() {
            Composite::Array(items) => {
                items.push(val);
                Ok(())
            }
            Composite::Dict(_) => Err(EvalError::TypeMismatch("cannot push onto a dict".into())),
            Composite::Str(_) => Err(EvalError::TypeMismatch("cannot push onto a string".into())),
        }
    }

    /// New registered container holding the same top-level handles.
    /// Non-composites are returned as-is.
    pub fn shallow_copy(&self, heap: &Heap) -> Value {
        match self {
            Value::Ref(gc) => {
                let body = gc.borrow().clone();
                Value::Ref(heap.alloc(body))
            }
            other => other.clone(),
        }
    }

    // ─── Conversions ─────────────────────────────────────────────────────────

    pub fn to_number(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Only `Null` and numeric zero are false. Empty strings, arrays and
    /// dicts are true.
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Number(n) => *n != 0.0,
            _ => true,
        }
    }

    // ─── Operators ───────────────────────────────────────────────────────────

    /// Numeric sum when both sides are numbers, string concatenation otherwise.
    pub fn add(&self, heap: &Heap, rhs: &Value) -> Value {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            _ => Value::string(heap, format!("{self}{rhs}")),
        }
    }

    /// Iterative so that deeply nested composites render without recursion.
    /// A composite already open on the current path renders as `[...]` or
    /// `{...}`.
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut visiting: HashSet<*const Object> = HashSet::new();
        let mut steps = vec![RenderStep::Value(self.clone())];

        while let Some(step) = steps.pop() {
            let value = match step {
                RenderStep::Text(s) => { f.write_str(s)?; continue; }
                RenderStep::Key(k) => { write!(f, "{k}:")?; continue; }
                RenderStep::Leave(ptr) => { visiting.remove(&ptr); continue; }
                RenderStep::Value(v) => v,
            };
            let gc = match &value {
                Value::Null => { f.write_str("null")?; continue; }
                Value::Number(n) => { write!(f, "{n}")?; continue; }
                Value::NativeFn(_) => { f.write_str("NativeFunction")?; continue; }
                Value::Ref(gc) => gc,
            };

            let ptr = gc.as_ptr();
            let body = gc.borrow();
            if visiting.contains(&ptr) {
                f.write_str(match &*body {
                    Composite::Dict(_) => "{...}",
                    _ => "[...]",
                })?;
                continue;
            }
            match &*body {
                Composite::Str(s) => f.write_str(s)?,
                Composite::Array(items) => {
                    f.write_str("[")?;
                    visiting.insert(ptr);
                    steps.push(RenderStep::Leave(ptr));
                    steps.push(RenderStep::Text("]"));
                    for (i, item) in items.iter().enumerate().rev() {
                        steps.push(RenderStep::Value(item.clone()));
                        if i > 0 { steps.push(RenderStep::Text(",")); }
                    }
                }
                Composite::Dict(entries) => {
                    f.write_str("{")?;
                    visiting.insert(ptr);
                    steps.push(RenderStep::Leave(ptr));
                    steps.push(RenderStep::Text("}"));
                    for (i, (k, v)) in entries.iter().enumerate().rev() {
                        steps.push(RenderStep::Value(v.clone()));
                        steps.push(RenderStep::Key(k.clone()));
                        if i > 0 { steps.push(RenderStep::Text(",")); }
                    }
                }
            }
        }
        Ok(())
    }
}

enum RenderStep {
    Value(Value),
    Text(&'static str),
    Key(String),
    Leave(*const Object),
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Largest padding a single indexed write may add to an array.
pub const MAX_ARRAY_GROWTH: usize = 1 << 24;

fn array_index(n: f64) -> Option<usize> {
    (n.is_finite() && n >= 0.0).then(|| n as usize)
}

fn not_indexable(v: &Value) -> EvalError {
    EvalError::TypeMismatch(format!("cannot index into {}", v.type_name()))
}

// ─── Trait impls ─────────────────────────────────────────────────────────────

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_string() {
            Some(s) => write!(f, "{s:?}"),
            None => write!(f, "{self}"),
        }
    }
}

/// Numbers by value, strings by content, other composites and natives by
/// identity. A number never equals a non-number.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::NativeFn(a), Value::NativeFn(b)) => a == b,
            (Value::Ref(a), Value::Ref(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                match (&*a.borrow(), &*b.borrow()) {
                    (Composite::Str(x), Composite::Str(y)) => x == y,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Number(n) }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Number(if b { 1.0 } else { 0.0 }) }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
