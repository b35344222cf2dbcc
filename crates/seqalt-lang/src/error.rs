/// Syntax diagnostic codes. The lexer cannot fail, so every code is a parser one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    P001, // closing bracket with nothing open
    P002, // unclosed bracket at end of input
    P003, // closing bracket does not match its opener
    P004, // nesting too deep
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::P003 => "P003",
            Self::P004 => "P004",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self { code, line, column, message: message.into() }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}:{}: {}", self.code.as_str(), self.line, self.column, self.message)
    }
}

impl std::error::Error for Error {}

// ─────────────────────────────────────────────────────────────────────────────

/// Failure while evaluating a parsed program.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("`{callee}` is not callable (found {found})")]
    NotCallable { callee: String, found: &'static str },

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("expected {expected} arguments as an array, found {found}")]
    ArgumentMismatch { expected: usize, found: &'static str },

    #[error("malformed AST node: {0}")]
    MalformedNode(String),

    #[error("array index {index} is out of range (length {len})")]
    IndexOutOfRange { index: f64, len: usize },

    #[error("recursion limit of {0} exceeded")]
    RecursionLimit(usize),

    #[error("cannot write output: {0}")]
    Output(String),
}

/// Anything `eval_code` can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("{}", render_syntax(.0))]
    Syntax(Vec<Error>),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl From<Vec<Error>> for ScriptError {
    fn from(errors: Vec<Error>) -> Self {
        ScriptError::Syntax(errors)
    }
}

fn render_syntax(errors: &[Error]) -> String {
    errors.iter().map(Error::to_string).collect::<Vec<_>>().join("\n")
}
