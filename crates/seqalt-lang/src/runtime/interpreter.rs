//! Tree-walking evaluator over Value-shaped AST nodes.
//!
//! A sequence folds left to right: child 0 seeds the accumulator, then each
//! (operator, operand) pair calls the operator with the accumulator as `l`
//! and the operand still unevaluated. Every operator, including `=`, `;` and
//! `&&`, is an ordinary native bound in the root env; the interpreter itself
//! knows none of them.

use std::io::{self, Write};

use tracing::{debug, trace, warn};

use crate::builtins::{BuiltinRegistry, builders};
use crate::config::Config;
use crate::error::{Error, EvalError, ScriptError};
use crate::runtime::env::{self, ARGS, CLOSURE_ARG_NAMES, CLOSURE_ENV, CLOSURE_EXPR};
use crate::runtime::gc::{GcStats, Heap};
use crate::runtime::stack::ensure_sufficient_stack;
use crate::runtime::value::Value;
use crate::syntax::lexer::Lexer;
use crate::syntax::node::{self, NodeView, Subtype};
use crate::syntax::parser::Parser;

// ─── Operands ────────────────────────────────────────────────────────────────

/// What a callable receives for one fold step.
#[derive(Debug, Clone)]
pub struct Operands {
    /// Scope the sequence is evaluated in.
    pub env: Value,
    /// Accumulated left value.
    pub l: Value,
    /// Text of the sequence's first child when it is a bare symbol and this
    /// is the first operator applied.
    pub l_symbol: Option<String>,
    /// Unevaluated right operand.
    pub r_expr: Value,
}

// ─── Interpreter ─────────────────────────────────────────────────────────────

pub struct Interpreter {
    heap: Heap,
    root_env: Value,
    config: Config,
    output: Box<dyn Write>,
    depth: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        let heap = Heap::new();
        let mut root_env = env::new_scope(&heap, Value::Null);
        let registry = BuiltinRegistry::standard();
        registry.install(&mut root_env, &heap);
        debug!(natives = root_env.length(), "interpreter session started");

        Self {
            heap,
            root_env,
            config: Config::default(),
            output: Box::new(io::stdout()),
            depth: 0,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Redirect `print` output.
    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn heap(&self) -> &Heap { &self.heap }

    pub fn root_env(&self) -> &Value { &self.root_env }

    pub fn config(&self) -> &Config { &self.config }

    /// Bind `name` in the root env.
    pub fn define(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        let heap = &self.heap;
        self.root_env.insert(heap, name, value)
    }

    // ─── Entry points ────────────────────────────────────────────────────────

    pub fn parse(&self, source: &str) -> Result<Value, Vec<Error>> {
        let tokens = Lexer::new(source).tokenize();
        Parser::new(tokens, &self.heap).parse()
    }

    /// Parse and evaluate `source` in the root env.
    pub fn eval_code(&mut self, source: &str) -> Result<Value, ScriptError> {
        let ast = self.parse(source)?;
        let root = self.root_env.clone();
        let result = self.eval_expr(&root, &ast)?;
        drop(ast);

        if self.config.collect_after_run {
            self.collect_garbage([&result]);
        }
        Ok(result)
    }

    // ─── Expression evaluator ────────────────────────────────────────────────

    pub fn eval_expr(&mut self, env: &Value, expr: &Value) -> Result<Value, EvalError> {
        match node::view(expr)? {
            NodeView::Sequence { subtype, exprs } => self.eval_sequence(env, subtype, &exprs),
            NodeView::Number(v) | NodeView::String(v) | NodeView::Quote(v) => Ok(v),
            NodeView::Symbol(name) => Ok(env::env_val(env, &name)),
            NodeView::Null => Ok(Value::Null),
        }
    }

    fn eval_sequence(&mut self, env: &Value, subtype: Subtype, exprs: &[Value]) -> Result<Value, EvalError> {
        if exprs.is_empty() {
            return Ok(match subtype {
                Subtype::Bracket => Value::empty_array(&self.heap),
                Subtype::Brace => Value::empty_dict(&self.heap),
                Subtype::Paren => Value::Null,
            });
        }

        if self.depth >= self.config.max_depth {
            return Err(EvalError::RecursionLimit(self.config.max_depth));
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.fold_sequence(env, subtype, exprs));
        self.depth -= 1;
        result
    }

    fn fold_sequence(&mut self, env: &Value, subtype: Subtype, exprs: &[Value]) -> Result<Value, EvalError> {
        let first = &exprs[0];
        let mut acc = self.eval_expr(env, first)?;
        let mut l_symbol = node::symbol_name(first);
        if subtype == Subtype::Bracket {
            acc = Value::array(&self.heap, vec![acc]);
            l_symbol = None;
        }

        let mut rest = exprs[1..].iter();
        while let Some(op_expr) = rest.next() {
            let func = self.eval_expr(env, op_expr)?;
            if !is_callable(&func) {
                return Err(EvalError::NotCallable {
                    callee: node::symbol_name(op_expr).unwrap_or_else(|| func.to_string()),
                    found: func.type_name(),
                });
            }
            let r_expr = match rest.next() {
                Some(r) => r.clone(),
                None => node::null(&self.heap),
            };
            let operands = Operands { env: env.clone(), l: acc, l_symbol: l_symbol.take(), r_expr };
            acc = self.call_func(&func, operands)?;
        }

        if subtype == Subtype::Brace {
            acc = builders::unwrap_dict(acc);
        }
        Ok(acc)
    }

    // ─── Call dispatch ───────────────────────────────────────────────────────

    /// Natives see the right operand unevaluated; closures get it forced.
    pub fn call_func(&mut self, func: &Value, operands: Operands) -> Result<Value, EvalError> {
        match func {
            Value::NativeFn(native) => {
                trace!(native = native.name(), "call");
                native.call(self, operands)
            }
            closure if env::is_closure(closure) => {
                let r = self.eval_right(&operands)?;
                self.call_user_func(closure, operands.l, r)
            }
            other => Err(EvalError::NotCallable { callee: other.to_string(), found: other.type_name() }),
        }
    }

    /// Call `func` with an already-evaluated right operand.
    pub fn apply(&mut self, env: &Value, func: &Value, l: Value, r: Value) -> Result<Value, EvalError> {
        let r_expr = node::quote(&self.heap, r);
        self.call_func(func, Operands { env: env.clone(), l, l_symbol: None, r_expr })
    }

    pub fn eval_right(&mut self, operands: &Operands) -> Result<Value, EvalError> {
        self.eval_expr(&operands.env, &operands.r_expr)
    }

    /// Evaluate a closure body in `{__parentEnv: closure.env, args: {l, r}}`
    /// with its argument names bound from `r`.
    pub fn call_user_func(&mut self, closure: &Value, l: Value, r: Value) -> Result<Value, EvalError> {
        let heap = &self.heap;
        let mut scope = env::new_scope(heap, closure.get_key(CLOSURE_ENV));
        let args = Value::dict(heap, [("l", l), ("r", r.clone())]);
        scope.insert(heap, ARGS, args)?;

        let names = arg_names(&closure.get_key(CLOSURE_ARG_NAMES));
        match names.as_slice() {
            [] => {}
            [name] => scope.insert(heap, name.as_str(), r)?,
            names => {
                let items = r.items().ok_or(EvalError::ArgumentMismatch {
                    expected: names.len(),
                    found: r.type_name(),
                })?;
                for (i, name) in names.iter().enumerate() {
                    let val = items.get(i).cloned().unwrap_or_default();
                    scope.insert(heap, name.as_str(), val)?;
                }
            }
        }

        let body = closure.get_key(CLOSURE_EXPR);
        self.eval_expr(&scope, &body)
    }

    // ─── Output ──────────────────────────────────────────────────────────────

    pub fn print(&mut self, value: &Value) -> Result<(), EvalError> {
        writeln!(self.output, "{value}").map_err(|e| EvalError::Output(e.to_string()))
    }

    // ─── Collection ──────────────────────────────────────────────────────────

    /// Mark from the root env plus `roots`, then sweep. Any value not
    /// reachable from those must not be used afterwards.
    pub fn collect_garbage<'a>(&self, roots: impl IntoIterator<Item = &'a Value>) -> GcStats {
        self.heap.mark(&self.root_env);
        self.heap.collect(roots)
    }

    /// End the session: drop the root env and reclaim everything not
    /// reachable from `roots`.
    pub fn finish<'a>(self, roots: impl IntoIterator<Item = &'a Value>) -> GcStats {
        let Interpreter { heap, root_env, mut output, .. } = self;
        if let Err(e) = output.flush().map_err(|e| EvalError::Output(e.to_string())) {
            warn!(error = %e, "cannot flush output at session end");
        }
        drop(root_env);
        heap.collect(roots)
    }
}

impl Default for Interpreter {
    fn default() -> Self { Self::new() }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

pub fn is_callable(v: &Value) -> bool {
    matches!(v, Value::NativeFn(_)) || env::is_closure(v)
}

/// An array of names as-is, `Null` as none, anything else as a single name.
fn arg_names(v: &Value) -> Vec<String> {
    match v.items() {
        Some(items) => items.iter().map(Value::to_string).collect(),
        None if v.is_null() => Vec::new(),
        None => vec![v.to_string()],
    }
}
