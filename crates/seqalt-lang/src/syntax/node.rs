//! AST nodes are ordinary `Value` dicts so programs can hold, pass and store
//! unevaluated code. This module owns the key names, the constructors the
//! parser uses, and a typed read-only view for the evaluator.

use crate::error::EvalError;
use crate::runtime::gc::Heap;
use crate::runtime::value::Value;

pub const TYPE: &str = "type";
pub const VALUE: &str = "value";
pub const SUBTYPE: &str = "subtype";
pub const EXPRS: &str = "exprs";

pub const SEQUENCE: &str = "Sequence";
pub const NUMBER: &str = "Number";
pub const STRING: &str = "String";
pub const SYMBOL: &str = "Symbol";
pub const NULL: &str = "Null";
pub const QUOTE: &str = "Quote";

// ─── Subtype ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subtype {
    Paren,
    Brace,
    Bracket,
}

impl Subtype {
    pub fn from_open(c: char) -> Option<Self> {
        match c {
            '(' => Some(Subtype::Paren),
            '{' => Some(Subtype::Brace),
            '[' => Some(Subtype::Bracket),
            _ => None,
        }
    }

    pub fn from_close(c: char) -> Option<Self> {
        match c {
            ')' => Some(Subtype::Paren),
            '}' => Some(Subtype::Brace),
            ']' => Some(Subtype::Bracket),
            _ => None,
        }
    }

    pub fn open(self) -> char {
        match self {
            Subtype::Paren => '(',
            Subtype::Brace => '{',
            Subtype::Bracket => '[',
        }
    }

    pub fn close(self) -> char {
        match self {
            Subtype::Paren => ')',
            Subtype::Brace => '}',
            Subtype::Bracket => ']',
        }
    }
}

// ─── Constructors ────────────────────────────────────────────────────────────

pub fn sequence(heap: &Heap, subtype: Subtype, exprs: Vec<Value>) -> Value {
    Value::dict(heap, [
        (TYPE, Value::string(heap, SEQUENCE)),
        (SUBTYPE, Value::string(heap, subtype.open().to_string())),
        (EXPRS, Value::array(heap, exprs)),
    ])
}

pub fn number(heap: &Heap, n: f64) -> Value {
    leaf(heap, NUMBER, Value::Number(n))
}

pub fn string(heap: &Heap, s: &str) -> Value {
    leaf(heap, STRING, Value::string(heap, s))
}

pub fn symbol(heap: &Heap, name: &str) -> Value {
    leaf(heap, SYMBOL, Value::string(heap, name))
}

pub fn null(heap: &Heap) -> Value {
    Value::dict(heap, [(TYPE, Value::string(heap, NULL))])
}

/// Leaf that evaluates to `value` as-is.
pub fn quote(heap: &Heap, value: Value) -> Value {
    leaf(heap, QUOTE, value)
}

fn leaf(heap: &Heap, kind: &str, value: Value) -> Value {
    Value::dict(heap, [(TYPE, Value::string(heap, kind)), (VALUE, value)])
}

// ─── View ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum NodeView {
    Sequence { subtype: Subtype, exprs: Vec<Value> },
    Number(Value),
    String(Value),
    Symbol(String),
    Null,
    Quote(Value),
}

pub fn view(node: &Value) -> Result<NodeView, EvalError> {
    let kind = node
        .find(TYPE)
        .and_then(|t| t.as_string())
        .ok_or_else(|| EvalError::MalformedNode(format!("expected an AST node, found {node}")))?;

    match kind.as_str() {
        SEQUENCE => {
            let subtype = node
                .get_key(SUBTYPE)
                .as_string()
                .and_then(|s| s.chars().next())
                .and_then(Subtype::from_open)
                .ok_or_else(|| EvalError::MalformedNode(format!("bad sequence subtype in {node}")))?;
            let exprs = node
                .get_key(EXPRS)
                .items()
                .ok_or_else(|| EvalError::MalformedNode(format!("sequence without exprs: {node}")))?;
            Ok(NodeView::Sequence { subtype, exprs })
        }
        NUMBER => Ok(NodeView::Number(node.get_key(VALUE))),
        STRING => Ok(NodeView::String(node.get_key(VALUE))),
        SYMBOL => Ok(NodeView::Symbol(node.get_key(VALUE).to_string())),
        NULL => Ok(NodeView::Null),
        QUOTE => Ok(NodeView::Quote(node.get_key(VALUE))),
        other => Err(EvalError::MalformedNode(format!("unknown node type `{other}`"))),
    }
}

/// Name carried by a Symbol node, if `node` is one.
pub fn symbol_name(node: &Value) -> Option<String> {
    match view(node).ok()? {
        NodeView::Symbol(name) => Some(name),
        _ => None,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
