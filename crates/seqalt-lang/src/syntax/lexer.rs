use crate::syntax::token::{Token, TokenKind, is_operator_char};

/// Byte-level scanner. Never fails: characters outside the grammar are
/// skipped, and so is the opening quote of an unterminated string.
pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source: source.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_ignored();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, self.line, self.column));
                break;
            }

            if let Some(tok) = self.next_token() {
                tokens.push(tok);
            }
        }

        tokens
    }

    fn next_token(&mut self) -> Option<Token> {
        let line = self.line;
        let col = self.column;
        let ch = self.peek();

        let kind = match ch {
            b'(' | b'{' | b'[' => { self.advance(); TokenKind::SequenceStart(ch as char) }
            b')' | b'}' | b']' => { self.advance(); TokenKind::SequenceEnd(ch as char) }
            b'"' => match self.string_end() {
                Some(end) => TokenKind::String(self.read_string(end)),
                None => { self.advance(); return None; }
            },
            b'0'..=b'9' => TokenKind::Number(self.read_number()),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => TokenKind::Symbol(self.read_while(is_ident_char)),
            c if is_operator_char(c) => TokenKind::Symbol(self.read_while(is_operator_char)),
            _ => { self.advance(); return None; }
        };

        Some(Token::new(kind, line, col))
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> u8 {
        let ch = self.source[self.pos];
        self.pos += 1;
        if ch == b'\n' { self.line += 1; self.column = 1; }
        else { self.column += 1; }
        ch
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() { 0 } else { self.source[self.pos] }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn skip_ignored(&mut self) {
        while !self.is_at_end() && self.peek().is_ascii_whitespace() {
            self.advance();
        }
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    /// Position of the closing quote for the string starting at `pos`.
    fn string_end(&self) -> Option<usize> {
        let mut i = self.pos + 1;
        while i < self.source.len() {
            match self.source[i] {
                b'\\' => i += 2,
                b'"' => return Some(i),
                _ => i += 1,
            }
        }
        None
    }

    /// Reads up to and including the closing quote at `end`.
    /// A backslash keeps the following byte verbatim.
    fn read_string(&mut self, end: usize) -> String {
        self.advance(); // opening quote
        let mut bytes = Vec::new();
        while self.pos < end {
            let ch = self.advance();
            if ch == b'\\' && self.pos < end {
                bytes.push(self.advance());
            } else {
                bytes.push(ch);
            }
        }
        self.advance(); // closing quote
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn read_number(&mut self) -> f64 {
        let digits = self.read_while(|b| b.is_ascii_digit());
        digits.parse().unwrap_or(0.0)
    }

    fn read_while(&mut self, pred: impl Fn(u8) -> bool) -> String {
        let start = self.pos;
        while !self.is_at_end() && pred(self.peek()) {
            self.advance();
        }
        String::from_utf8_lossy(&self.source[start..self.pos]).into_owned()
    }
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

// ─── Tests ───────────────────────────────────────────────────────────────────
