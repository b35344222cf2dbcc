use crate::error::{Error, ErrorCode};
use crate::runtime::gc::Heap;
use crate::runtime::stack::ensure_sufficient_stack;
use crate::runtime::value::Value;
use crate::syntax::node::{self, Subtype};
use crate::syntax::token::{Token, TokenKind};

/// Deepest bracket nesting the recursive descent accepts.
pub const MAX_NESTING: usize = 1024;

/// Builds the Value-shaped AST. The program is an implicit `(` sequence.
pub struct Parser<'h> {
    tokens: Vec<Token>,
    pos: usize,
    heap: &'h Heap,
    depth: usize,
    errors: Vec<Error>,
}

impl<'h> Parser<'h> {
    pub fn new(tokens: Vec<Token>, heap: &'h Heap) -> Self {
        Self { tokens, pos: 0, heap, depth: 0, errors: Vec::new() }
    }

    pub fn parse(mut self) -> Result<Value, Vec<Error>> {
        let mut exprs = Vec::new();

        while !self.is_at_end() {
            if let TokenKind::SequenceEnd(c) = self.peek_kind() {
                let c = *c;
                let tok = self.advance();
                self.errors.push(Error::new(ErrorCode::P001, tok.line, tok.column,
                    format!("unexpected `{c}` with no open sequence")));
                continue;
            }
            match self.parse_expr() {
                Ok(expr) => exprs.push(expr),
                Err(e) => {
                    self.errors.push(e);
                    return Err(self.errors);
                }
            }
        }

        if self.errors.is_empty() {
            Ok(node::sequence(self.heap, Subtype::Paren, exprs))
        } else {
            Err(self.errors)
        }
    }

    // ─── Expressions ─────────────────────────────────────────────────────────

    /// Errors returned here are fatal; recoverable ones go to `self.errors`.
    fn parse_expr(&mut self) -> Result<Value, Error> {
        let tok = self.advance();
        let heap = self.heap;
        match tok.kind {
            TokenKind::SequenceStart(c) => {
                let subtype = Subtype::from_open(c).unwrap_or(Subtype::Paren);
                ensure_sufficient_stack(|| self.parse_sequence(subtype, tok.line, tok.column))
            }
            TokenKind::Number(n) => Ok(node::number(heap, n)),
            TokenKind::String(s) => Ok(node::string(heap, &s)),
            TokenKind::Symbol(s) => Ok(node::symbol(heap, &s)),
            TokenKind::SequenceEnd(c) => Err(Error::new(ErrorCode::P001, tok.line, tok.column,
                format!("unexpected `{c}`"))),
            TokenKind::Eof => Err(Error::new(ErrorCode::P002, tok.line, tok.column,
                "unexpected end of input")),
        }
    }

    /// Called with the opener already consumed.
    fn parse_sequence(&mut self, subtype: Subtype, line: usize, column: usize) -> Result<Value, Error> {
        if self.depth >= MAX_NESTING {
            return Err(Error::new(ErrorCode::P004, line, column,
                format!("sequences nested deeper than {MAX_NESTING} levels")));
        }
        self.depth += 1;

        let mut exprs = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Eof => {
                    return Err(Error::new(ErrorCode::P002, line, column,
                        format!("`{}` is never closed", subtype.open())));
                }
                TokenKind::SequenceEnd(c) => {
                    let c = *c;
                    let tok = self.advance();
                    if Subtype::from_close(c) != Some(subtype) {
                        self.errors.push(Error::new(ErrorCode::P003, tok.line, tok.column,
                            format!("expected `{}` to close `{}` from {line}:{column}, found `{c}`",
                                subtype.close(), subtype.open())));
                    }
                    break;
                }
                _ => exprs.push(self.parse_expr()?),
            }
        }

        self.depth -= 1;
        Ok(node::sequence(self.heap, subtype, exprs))
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    fn peek_kind(&self) -> &TokenKind {
        self.tokens.get(self.pos).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned()
            .unwrap_or_else(|| self.eof_token());
        if self.pos < self.tokens.len() { self.pos += 1; }
        tok
    }

    fn eof_token(&self) -> Token {
        let (line, column) = self.tokens.last().map(|t| (t.line, t.column)).unwrap_or((1, 1));
        Token::new(TokenKind::Eof, line, column)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
