use serde::Serialize;
use std::fmt;
use std::mem;

/// The different kinds of tokens recognized by the scanner.
///
/// Variants without data represent single-character, multi-character, or
/// keyword tokens. `STRING(String)` and `NUMBER(f64)` carry their literal
/// values. `IDENTIFIER` is used for user-defined names. `EOF` marks the
/// end of input; the scanner emits exactly one.
///
/// `SUPER` is reserved by the keyword table but has no grammar production.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Serialize)]
pub enum TokenKind {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// '{'
    LEFT_BRACE,

    /// '}'
    RIGHT_BRACE,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// '-'
    MINUS,

    /// '+'
    PLUS,

    /// ';'
    SEMICOLON,

    /// '/'
    SLASH,

    /// '*'
    STAR,

    /// '!'
    BANG,

    /// '!='
    BANG_EQUAL,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// A user-defined identifier
    IDENTIFIER,

    /// A string literal (contents without quotes)
    STRING(String),

    /// A numeric literal
    #[serde(rename = "NUMBER")]
    NUMBER(f64),

    /// 'and'
    AND,

    /// 'class'
    CLASS,

    /// 'else'
    ELSE,

    /// 'false'
    FALSE,

    /// 'fun'
    FUN,

    /// 'for'
    FOR,

    /// 'if'
    IF,

    /// 'nil'
    NIL,

    /// 'or'
    OR,

    /// 'print'
    PRINT,

    /// 'return'
    RETURN,

    /// 'super' (reserved, no grammar production)
    SUPER,

    /// 'this'
    THIS,

    /// 'true'
    TRUE,

    /// 'var'
    VAR,

    /// 'while'
    WHILE,

    /// End-of-input marker
    EOF,
}

impl PartialEq for TokenKind {
    /// Two kinds are equal if they share the same variant, ignoring any
    /// inner literal data. Uses `mem::discriminant` so the parser can
    /// `check(TokenKind::NUMBER(0.0))` against any numeric token.
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

impl TokenKind {
    /// Variant name without payloads, for diagnostic output.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LEFT_PAREN => "LEFT_PAREN",
            TokenKind::RIGHT_PAREN => "RIGHT_PAREN",
            TokenKind::LEFT_BRACE => "LEFT_BRACE",
            TokenKind::RIGHT_BRACE => "RIGHT_BRACE",
            TokenKind::COMMA => "COMMA",
            TokenKind::DOT => "DOT",
            TokenKind::MINUS => "MINUS",
            TokenKind::PLUS => "PLUS",
            TokenKind::SEMICOLON => "SEMICOLON",
            TokenKind::SLASH => "SLASH",
            TokenKind::STAR => "STAR",
            TokenKind::BANG => "BANG",
            TokenKind::BANG_EQUAL => "BANG_EQUAL",
            TokenKind::EQUAL => "EQUAL",
            TokenKind::EQUAL_EQUAL => "EQUAL_EQUAL",
            TokenKind::GREATER => "GREATER",
            TokenKind::GREATER_EQUAL => "GREATER_EQUAL",
            TokenKind::LESS => "LESS",
            TokenKind::LESS_EQUAL => "LESS_EQUAL",
            TokenKind::IDENTIFIER => "IDENTIFIER",
            TokenKind::STRING(_) => "STRING",
            TokenKind::NUMBER(_) => "NUMBER",
            TokenKind::AND => "AND",
            TokenKind::CLASS => "CLASS",
            TokenKind::ELSE => "ELSE",
            TokenKind::FALSE => "FALSE",
            TokenKind::FUN => "FUN",
            TokenKind::FOR => "FOR",
            TokenKind::IF => "IF",
            TokenKind::NIL => "NIL",
            TokenKind::OR => "OR",
            TokenKind::PRINT => "PRINT",
            TokenKind::RETURN => "RETURN",
            TokenKind::SUPER => "SUPER",
            TokenKind::THIS => "THIS",
            TokenKind::TRUE => "TRUE",
            TokenKind::VAR => "VAR",
            TokenKind::WHILE => "WHILE",
            TokenKind::EOF => "EOF",
        }
    }
}

/// A scanned token: its kind (carrying any literal value), the exact
/// lexeme text, and the 1-based line it was scanned from.
///
/// Lexemes are owned so the AST — and the function declarations closures
/// hold on to — can outlive the source buffer of a single REPL line.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token {
    /// The category of this token.
    pub kind: TokenKind,

    /// The exact substring of the source that produced this token.
    pub lexeme: String,

    /// 1-based line number in the source.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }
}

impl fmt::Display for Token {
    /// `KIND lexeme literal` form used by the `tokenize` subcommand.
    /// Integral numbers render with a trailing `.0` (`3` → `3.0`);
    /// non-literal tokens render `null` in the literal slot.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.kind.name(), self.lexeme)?;

        match &self.kind {
            TokenKind::STRING(s) => write!(f, "{}", s),

            TokenKind::NUMBER(n) => {
                if n.fract() == 0.0 {
                    // itoa only when the cast is exact; integral values
                    // beyond i64 range would otherwise truncate.
                    let int = *n as i64;

                    if int as f64 == *n {
                        let mut buf: itoa::Buffer = itoa::Buffer::new();
                        write!(f, "{}.0", buf.format(int))
                    } else {
                        write!(f, "{:.1}", n)
                    }
                } else {
                    write!(f, "{}", n)
                }
            }

            _ => write!(f, "null"),
        }
    }
}
