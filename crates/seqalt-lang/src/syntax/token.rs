#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    SequenceStart(char), // ( { [
    SequenceEnd(char),   // ) } ]

    // Literals
    Number(f64),
    String(String),

    /// Identifier or a run of operator characters.
    Symbol(String),

    Eof,
}

/// Characters that glue together into a single operator symbol.
pub fn is_operator_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b',' | b'-' | b'.' | b'/'
            | b':' | b';' | b'<' | b'=' | b'>' | b'?' | b'@' | b'^' | b'`' | b'|' | b'~'
    )
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}
