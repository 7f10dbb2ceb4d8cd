/*!
Recursive-descent parser.

Grammar (EBNF, condensed; precedence low→high in the expression rules):

```text
program        → declaration* EOF ;
declaration    → classDecl | funDecl | varDecl | statement ;
classDecl      → "class" IDENT "{" function* "}" ;
funDecl        → "fun" function ;
function       → IDENT "(" parameters? ")" block ;
varDecl        → "var" IDENT ( "=" expression )? ";" ;
statement      → forStmt | ifStmt | printStmt | returnStmt
               | whileStmt | block | exprStmt ;
forStmt        → "for" "(" ( varDecl | exprStmt | ";" )
                 expression? ";" expression? ")" statement ;
ifStmt         → "if" "(" expression ")" statement ( "else" statement )? ;
printStmt      → "print" expression ";" ;
returnStmt     → "return" expression? ";" ;
whileStmt      → "while" "(" expression ")" statement ;
block          → "{" declaration* "}" ;
expression     → assignment ;
assignment     → ( call "." )? IDENT "=" assignment | logic_or ;
logic_or       → logic_and ( "or" logic_and )* ;
logic_and      → equality ( "and" equality )* ;
equality       → comparison ( ( "!=" | "==" ) comparison )* ;
comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
term           → factor ( ( "-" | "+" ) factor )* ;
factor         → unary ( ( "/" | "*" ) unary )* ;
unary          → ( "!" | "-" ) unary | call ;
call           → primary ( "(" arguments? ")" | "." IDENT )* ;
primary        → NUMBER | STRING | "true" | "false" | "nil" | "this"
               | IDENT | "(" expression ")" ;
```

`for` is pure sugar: it is rewritten at parse time into a `Block` holding
the optional initializer and a `While` whose body appends the increment,
so no loop construct beyond `While` reaches the runtime.

`parse()` never fails out of the top level. Each malformed declaration is
reported to the diagnostics sink and recovery runs `synchronize()`, which
discards tokens until a statement boundary so the rest of the file still
parses.
*/

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::diagnostics::Diagnostics;
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenKind};
use log::{debug, info};
use std::rc::Rc;

/// Parameter and argument lists are capped at this many entries.
const MAX_ARITY: usize = 255;

/// Parser over an immutable token slice, reporting errors through the
/// shared per-run diagnostics context.
pub struct Parser<'a, 'd> {
    tokens: &'a [Token],
    current: usize,
    diagnostics: &'d mut Diagnostics,
}

impl<'a, 'd> Parser<'a, 'd> {
    pub fn new(tokens: &'a [Token], diagnostics: &'d mut Diagnostics) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            diagnostics,
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program. Malformed statements are reported and
    /// skipped; the well-formed remainder is still returned.
    pub fn parse(&mut self) -> Vec<Stmt> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),

                Err(e) => {
                    self.diagnostics.report(&e);
                    self.synchronize();
                }
            }
        }

        statements
    }

    /// Parse a single expression (used by the `parse` debug subcommand).
    pub fn parse_expression(&mut self) -> Result<Expr> {
        self.expression()
    }

    // ──────────────────────── declaration rules ───────────────────

    fn declaration(&mut self) -> Result<Stmt> {
        debug!("Entering declaration");

        if self.matches(TokenKind::CLASS) {
            self.class_declaration()
        } else if self.matches(TokenKind::FUN) {
            Ok(Stmt::Function(self.function("function")?))
        } else if self.matches(TokenKind::VAR) {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    fn class_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self
            .consume(TokenKind::IDENTIFIER, "Expected class name.")?
            .clone();

        self.consume(TokenKind::LEFT_BRACE, "Expected '{' before class body.")?;

        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();

        while !self.check(TokenKind::RIGHT_BRACE) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(TokenKind::RIGHT_BRACE, "Expected '}' after class body.")?;

        Ok(Stmt::Class { name, methods })
    }

    /// `IDENT "(" parameters? ")" block` — shared by function and method
    /// declarations; `kind` only flavors the error messages.
    fn function(&mut self, kind: &str) -> Result<Rc<FunctionDecl>> {
        let name: Token = self
            .consume(TokenKind::IDENTIFIER, format!("Expected {} name.", kind))?
            .clone();

        self.consume(
            TokenKind::LEFT_PAREN,
            format!("Expected '(' after {} name.", kind),
        )?;

        let mut params: Vec<Token> = Vec::new();

        if !self.check(TokenKind::RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARITY {
                    // Non-fatal: report and keep consuming parameters.
                    let e = LoxError::parse(self.peek(), "Can't have more than 255 parameters.");
                    self.diagnostics.report(&e);
                }

                params.push(
                    self.consume(TokenKind::IDENTIFIER, "Expected parameter name.")?
                        .clone(),
                );

                if !self.matches(TokenKind::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after parameters.")?;
        self.consume(
            TokenKind::LEFT_BRACE,
            format!("Expected '{{' before {} body.", kind),
        )?;

        let body: Vec<Stmt> = self.block()?;

        Ok(Rc::new(FunctionDecl { name, params, body }))
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self
            .consume(TokenKind::IDENTIFIER, "Expected variable name.")?
            .clone();

        let initializer: Option<Expr> = if self.matches(TokenKind::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenKind::SEMICOLON,
            "Expected ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Result<Stmt> {
        if self.matches(TokenKind::FOR) {
            self.for_statement()
        } else if self.matches(TokenKind::IF) {
            self.if_statement()
        } else if self.matches(TokenKind::WHILE) {
            self.while_statement()
        } else if self.matches(TokenKind::RETURN) {
            self.return_statement()
        } else if self.matches(TokenKind::LEFT_BRACE) {
            Ok(Stmt::Block(self.block()?))
        } else if self.matches(TokenKind::PRINT) {
            self.print_statement()
        } else {
            self.expression_statement()
        }
    }

    /// Desugar `for` into `Block` / `While` so the loop never exists as
    /// its own runtime construct.
    fn for_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::LEFT_PAREN, "Expected '(' after 'for'.")?;

        let initializer: Option<Stmt> = if self.matches(TokenKind::SEMICOLON) {
            None
        } else if self.matches(TokenKind::VAR) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition: Option<Expr> = if !self.check(TokenKind::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::SEMICOLON, "Expected ';' after loop condition.")?;

        let increment: Option<Expr> = if !self.check(TokenKind::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after for clauses.")?;

        let mut body: Stmt = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        // A missing condition defaults to literal `true`.
        let condition = condition.unwrap_or(Expr::Literal(LiteralValue::True));

        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn print_statement(&mut self) -> Result<Stmt> {
        let value: Expr = self.expression()?;

        self.consume(TokenKind::SEMICOLON, "Expected ';' after value.")?;

        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr: Expr = self.expression()?;

        self.consume(TokenKind::SEMICOLON, "Expected ';' after expression.")?;

        Ok(Stmt::Expression(expr))
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::LEFT_PAREN, "Expected '(' after 'if'.")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after condition.")?;

        let then_branch: Box<Stmt> = Box::new(self.statement()?);
        let else_branch: Option<Box<Stmt>> = if self.matches(TokenKind::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::LEFT_PAREN, "Expected '(' after 'while'.")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after condition.")?;

        let body: Box<Stmt> = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn return_statement(&mut self) -> Result<Stmt> {
        let keyword: Token = self.previous().clone();

        let value: Option<Expr> = if !self.check(TokenKind::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::SEMICOLON, "Expected ';' after return value.")?;

        Ok(Stmt::Return { keyword, value })
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(TokenKind::RIGHT_BRACE) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        self.consume(TokenKind::RIGHT_BRACE, "Expected '}' after block.")?;

        Ok(statements)
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr> {
        let expr: Expr = self.logical_or()?;

        if self.matches(TokenKind::EQUAL) {
            let equals: Token = self.previous().clone();
            let value: Expr = self.assignment()?;

            // Only a bare variable or a property access may appear left
            // of '='.
            match expr {
                Expr::Variable { name, .. } => {
                    return Ok(Expr::Assign {
                        id: ExprId::next(),
                        name,
                        value: Box::new(value),
                    });
                }

                Expr::Get { object, name } => {
                    return Ok(Expr::Set {
                        object,
                        name,
                        value: Box::new(value),
                    });
                }

                _ => {
                    return Err(LoxError::parse(&equals, "Invalid assignment target."));
                }
            }
        }

        Ok(expr)
    }

    fn logical_or(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.logical_and()?;

        while self.matches(TokenKind::OR) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.logical_and()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.equality()?;

        while self.matches(TokenKind::AND) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.equality()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.comparison()?;

        while self.matches(TokenKind::BANG_EQUAL) || self.matches(TokenKind::EQUAL_EQUAL) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.comparison()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.term()?;

        while self.matches(TokenKind::GREATER)
            || self.matches(TokenKind::GREATER_EQUAL)
            || self.matches(TokenKind::LESS)
            || self.matches(TokenKind::LESS_EQUAL)
        {
            let operator: Token = self.previous().clone();
            let right: Expr = self.term()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.factor()?;

        while self.matches(TokenKind::MINUS) || self.matches(TokenKind::PLUS) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.factor()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.unary()?;

        while self.matches(TokenKind::STAR) || self.matches(TokenKind::SLASH) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.matches(TokenKind::BANG) || self.matches(TokenKind::MINUS) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;

            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.call()
    }

    /// Chained calls and property access: `f()(x).y` alternates consuming
    /// argument lists and property names.
    fn call(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.primary()?;

        loop {
            if self.matches(TokenKind::LEFT_PAREN) {
                expr = self.finish_call(expr)?;
            } else if self.matches(TokenKind::DOT) {
                let name: Token = self
                    .consume(TokenKind::IDENTIFIER, "Expected property name after '.'.")?
                    .clone();

                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut arguments: Vec<Expr> = Vec::new();

        if !self.check(TokenKind::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    // Non-fatal: report and keep consuming arguments.
                    let e = LoxError::parse(self.peek(), "Can't have more than 255 arguments.");
                    self.diagnostics.report(&e);
                }

                arguments.push(self.expression()?);

                if !self.matches(TokenKind::COMMA) {
                    break;
                }
            }
        }

        let paren: Token = self
            .consume(TokenKind::RIGHT_PAREN, "Expected ')' after arguments.")?
            .clone();

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.matches(TokenKind::FALSE) {
            return Ok(Expr::Literal(LiteralValue::False));
        }

        if self.matches(TokenKind::TRUE) {
            return Ok(Expr::Literal(LiteralValue::True));
        }

        if self.matches(TokenKind::NIL) {
            return Ok(Expr::Literal(LiteralValue::Nil));
        }

        // Discriminant equality: the payload of the probe is ignored.
        if self.matches(TokenKind::NUMBER(0.0)) {
            if let TokenKind::NUMBER(n) = self.previous().kind {
                return Ok(Expr::Literal(LiteralValue::Number(n)));
            }
        }

        if let TokenKind::STRING(ref s) = self.peek().kind {
            let s = s.clone();
            self.advance();

            return Ok(Expr::Literal(LiteralValue::Str(s)));
        }

        if self.matches(TokenKind::THIS) {
            return Ok(Expr::This {
                id: ExprId::next(),
                keyword: self.previous().clone(),
            });
        }

        if self.matches(TokenKind::IDENTIFIER) {
            return Ok(Expr::Variable {
                id: ExprId::next(),
                name: self.previous().clone(),
            });
        }

        if self.matches(TokenKind::LEFT_PAREN) {
            let expr: Expr = self.expression()?;

            self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after expression.")?;

            return Ok(Expr::Grouping(Box::new(expr)));
        }

        Err(LoxError::parse(self.peek(), "Expected expression."))
    }

    // ────────────────────── utility helpers ───────────────────────

    #[inline(always)]
    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, kind: TokenKind, message: impl Into<String>) -> Result<&'a Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }

        Err(LoxError::parse(self.peek(), message.into()))
    }

    #[inline(always)]
    fn check(&self, kind: TokenKind) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().kind == kind
    }

    #[inline(always)]
    fn advance(&mut self) -> &'a Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &'a Token {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &'a Token {
        &self.tokens[self.current - 1]
    }

    /// Discard tokens until the next statement boundary: just past a
    /// `;`, or in front of a token that begins a statement.
    fn synchronize(&mut self) {
        self.advance(); // skip the token that caused the error

        while !self.is_at_end() {
            if matches!(self.previous().kind, TokenKind::SEMICOLON) {
                return;
            }

            match self.peek().kind {
                TokenKind::CLASS
                | TokenKind::FUN
                | TokenKind::VAR
                | TokenKind::FOR
                | TokenKind::IF
                | TokenKind::WHILE
                | TokenKind::PRINT
                | TokenKind::RETURN => return,
                _ => {}
            }

            self.advance();
        }
    }
}
