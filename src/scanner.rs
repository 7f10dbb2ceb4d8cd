//! One-pass, streaming lexer.
//!
//! Transforms a byte slice into a sequence of [`Token`]s, skipping
//! whitespace and `//` comments and emitting exactly one `EOF` token at
//! the end. Implemented as a [`FusedIterator`] over `Result<Token>`: an
//! `Err` item reports a lexical error with line information, after which
//! the scanner keeps going — one run can surface several lexical errors.
//!
//! Lexing notes:
//! - Two-character operators (`!=`, `==`, `<=`, `>=`) use maximal munch.
//! - String literals may span lines; each embedded newline bumps the line
//!   counter. An unterminated string is reported once at end of input.
//! - Numbers are digits with an optional `.digits` fraction; a trailing
//!   `.` not followed by a digit is left for the next token.
//! - Identifiers are `[A-Za-z_][A-Za-z0-9_]*`, resolved against a
//!   compile-time perfect-hash keyword table.

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenKind};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

static KEYWORDS: phf::Map<&'static [u8], TokenKind> = phf_map! {
    b"and"    => TokenKind::AND,
    b"class"  => TokenKind::CLASS,
    b"else"   => TokenKind::ELSE,
    b"false"  => TokenKind::FALSE,
    b"fun"    => TokenKind::FUN,
    b"for"    => TokenKind::FOR,
    b"if"     => TokenKind::IF,
    b"nil"    => TokenKind::NIL,
    b"or"     => TokenKind::OR,
    b"print"  => TokenKind::PRINT,
    b"return" => TokenKind::RETURN,
    b"super"  => TokenKind::SUPER,
    b"this"   => TokenKind::THIS,
    b"true"   => TokenKind::TRUE,
    b"var"    => TokenKind::VAR,
    b"while"  => TokenKind::WHILE,
};

/// Single-pass scanner over a source buffer. Lexeme slices are copied
/// into the emitted tokens, so the buffer only needs to outlive the scan.
pub struct Scanner<'a> {
    src: &'a [u8],
    start: usize,               // first byte of the current lexeme
    curr: usize,                // one past the last byte examined
    line: usize,                // 1-based, incremented on '\n'
    pending: Option<TokenKind>, // recognized kind waiting to be emitted
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(src: &'a [u8]) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
        }
    }

    // ───────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    const fn len(&self) -> usize {
        self.src.len()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it. Callers guard with [`is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Current byte without consuming it; `0` past end of input.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.src[self.curr]
        }
    }

    /// One byte beyond [`peek`]. Safe at end of input.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.len() {
            0
        } else {
            self.src[self.curr + 1]
        }
    }

    /// Consume the current byte iff it matches `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    // ───────────────────────────── core lexing ──────────────────────────

    /// Scan a single token starting at `self.curr`. A recognized lexeme
    /// stores its kind in `self.pending`; whitespace and comments return
    /// `Ok(())` with `pending` still `None`.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            b'(' => self.pending = Some(TokenKind::LEFT_PAREN),
            b')' => self.pending = Some(TokenKind::RIGHT_PAREN),
            b'{' => self.pending = Some(TokenKind::LEFT_BRACE),
            b'}' => self.pending = Some(TokenKind::RIGHT_BRACE),
            b',' => self.pending = Some(TokenKind::COMMA),
            b'.' => self.pending = Some(TokenKind::DOT),
            b'-' => self.pending = Some(TokenKind::MINUS),
            b'+' => self.pending = Some(TokenKind::PLUS),
            b';' => self.pending = Some(TokenKind::SEMICOLON),
            b'*' => self.pending = Some(TokenKind::STAR),

            // maximal munch for the two-character operators
            b'!' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::BANG_EQUAL
                } else {
                    TokenKind::BANG
                };

                self.pending = Some(kind);
            }

            b'=' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::EQUAL_EQUAL
                } else {
                    TokenKind::EQUAL
                };

                self.pending = Some(kind);
            }

            b'<' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::LESS_EQUAL
                } else {
                    TokenKind::LESS
                };

                self.pending = Some(kind);
            }

            b'>' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::GREATER_EQUAL
                } else {
                    TokenKind::GREATER
                };

                self.pending = Some(kind);
            }

            b' ' | b'\r' | b'\t' => {
                return Ok(());
            }

            b'\n' => {
                self.line += 1;

                return Ok(());
            }

            b'/' => {
                if self.match_byte(b'/') {
                    // Fast-forward to the next newline with memchr; if
                    // none remains, skip to end of input.
                    if let Some(pos) = memchr(b'\n', &self.src[self.curr..]) {
                        self.curr += pos;
                    } else {
                        self.curr = self.len();
                    }

                    return Ok(());
                }

                self.pending = Some(TokenKind::SLASH);
            }

            b'"' => {
                return self.scan_string();
            }

            b'0'..=b'9' => {
                self.scan_number();
            }

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.scan_identifier();
            }

            _ => {
                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", b as char),
                ));
            }
        }

        Ok(())
    }

    /// Scan a double-quoted string literal. `self.start` points at the
    /// opening quote; on success `self.curr` is past the closing quote.
    fn scan_string(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1; // strings may span lines
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.advance(); // closing quote

        let slice: &[u8] = &self.src[self.start + 1..self.curr - 1];
        let s: String = String::from_utf8_lossy(slice).into_owned();

        self.pending = Some(TokenKind::STRING(s));

        Ok(())
    }

    /// Scan a numeric literal (`123`, `3.14`). The fraction is optional
    /// and a bare trailing `.` is not consumed.
    fn scan_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume '.'

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let slice: &[u8] = &self.src[self.start..self.curr];
        let s: &str = std::str::from_utf8(slice).unwrap_or("0");
        let n: f64 = s.parse::<f64>().unwrap_or(0.0); // digits only, cannot fail

        self.pending = Some(TokenKind::NUMBER(n));
    }

    /// Scan an identifier and decide keyword vs `IDENTIFIER`.
    fn scan_identifier(&mut self) {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        let slice: &[u8] = &self.src[self.start..self.curr];

        let kind: TokenKind = KEYWORDS.get(slice).cloned().unwrap_or(TokenKind::IDENTIFIER);

        self.pending = Some(kind);
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        // Loop until a token is emitted, an error surfaces, or input ends.
        while self.curr <= self.len() {
            // Exactly one EOF token, carrying the final line number.
            if self.curr == self.len() {
                self.curr += 1; // fused from here on
                return Some(Ok(Token::new(TokenKind::EOF, "", self.line)));
            }

            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            if let Some(kind) = self.pending.take() {
                let slice: &[u8] = &self.src[self.start..self.curr];
                let lexeme: String = String::from_utf8_lossy(slice).into_owned();

                debug!("Scanned {:?} on line {}", kind, self.line);

                return Some(Ok(Token::new(kind, lexeme, self.line)));
            }
            // Whitespace or comment: keep looping.
        }

        None // EOF already yielded
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
