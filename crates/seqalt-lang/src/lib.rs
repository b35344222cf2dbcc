pub mod syntax;
pub mod runtime;
pub mod builtins;
pub mod error;
pub mod config;

pub use config::Config;
pub use error::{Error, ErrorCode, EvalError, ScriptError};
pub use syntax::token::{Token, TokenKind};
pub use runtime::gc::{Gc, GcStats, Heap};
pub use runtime::interpreter::{Interpreter, Operands};
pub use runtime::value::{Composite, NativeFn, Value};

// ─── Public API ───────────────────────────────────────────────────────────────

/// Run `source` in a fresh interpreter printing to stdout.
///
/// The session is swept before returning, so the result is the only value
/// from it that stays usable.
pub fn eval_code(source: &str) -> Result<Value, ScriptError> {
    let mut interp = Interpreter::new();
    let result = interp.eval_code(source);
    interp.finish(result.as_ref().ok());
    result
}
