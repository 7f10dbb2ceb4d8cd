use rilox::scanner::Scanner;
use rilox::token::{Token, TokenKind};

fn assert_token_sequence(source: &str, expected: &[(TokenKind, &str)]) {
    let scanner = Scanner::new(source.as_bytes());
    let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

    assert_eq!(
        tokens.len(),
        expected.len(),
        "token count mismatch for {:?}",
        source
    );

    for (actual, (expected_kind, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
        assert_eq!(actual.kind, *expected_kind);
        assert_eq!(actual.lexeme, *expected_lexeme);
    }
}

#[test]
fn symbols() {
    assert_token_sequence(
        "({*.,+*})",
        &[
            (TokenKind::LEFT_PAREN, "("),
            (TokenKind::LEFT_BRACE, "{"),
            (TokenKind::STAR, "*"),
            (TokenKind::DOT, "."),
            (TokenKind::COMMA, ","),
            (TokenKind::PLUS, "+"),
            (TokenKind::STAR, "*"),
            (TokenKind::RIGHT_BRACE, "}"),
            (TokenKind::RIGHT_PAREN, ")"),
            (TokenKind::EOF, ""),
        ],
    );
}

#[test]
fn maximal_munch_operators() {
    assert_token_sequence(
        "! != = == < <= > >=",
        &[
            (TokenKind::BANG, "!"),
            (TokenKind::BANG_EQUAL, "!="),
            (TokenKind::EQUAL, "="),
            (TokenKind::EQUAL_EQUAL, "=="),
            (TokenKind::LESS, "<"),
            (TokenKind::LESS_EQUAL, "<="),
            (TokenKind::GREATER, ">"),
            (TokenKind::GREATER_EQUAL, ">="),
            (TokenKind::EOF, ""),
        ],
    );
}

#[test]
fn keywords_vs_identifiers() {
    assert_token_sequence(
        "var varx fun functional class classy this thistle",
        &[
            (TokenKind::VAR, "var"),
            (TokenKind::IDENTIFIER, "varx"),
            (TokenKind::FUN, "fun"),
            (TokenKind::IDENTIFIER, "functional"),
            (TokenKind::CLASS, "class"),
            (TokenKind::IDENTIFIER, "classy"),
            (TokenKind::THIS, "this"),
            (TokenKind::IDENTIFIER, "thistle"),
            (TokenKind::EOF, ""),
        ],
    );
}

#[test]
fn super_is_reserved() {
    assert_token_sequence(
        "super duper",
        &[
            (TokenKind::SUPER, "super"),
            (TokenKind::IDENTIFIER, "duper"),
            (TokenKind::EOF, ""),
        ],
    );
}

#[test]
fn number_literals() {
    let tokens: Vec<Token> = Scanner::new(b"123 3.14 0.5")
        .filter_map(Result::ok)
        .collect();

    let expected = [123.0, 3.14, 0.5];

    for (token, want) in tokens.iter().zip(expected.iter()) {
        match token.kind {
            TokenKind::NUMBER(n) => assert_eq!(n, *want),
            ref other => panic!("expected NUMBER, got {:?}", other),
        }
    }
}

#[test]
fn trailing_dot_is_not_part_of_number() {
    assert_token_sequence(
        "123.",
        &[
            (TokenKind::NUMBER(123.0), "123"),
            (TokenKind::DOT, "."),
            (TokenKind::EOF, ""),
        ],
    );
}

#[test]
fn string_literal_contents() {
    let tokens: Vec<Token> = Scanner::new(b"\"hello world\"")
        .filter_map(Result::ok)
        .collect();

    match &tokens[0].kind {
        TokenKind::STRING(s) => assert_eq!(s, "hello world"),
        other => panic!("expected STRING, got {:?}", other),
    }

    assert_eq!(tokens[0].lexeme, "\"hello world\"");
}

#[test]
fn multiline_string_advances_line_counter() {
    let tokens: Vec<Token> = Scanner::new(b"\"a\nb\"\nident")
        .filter_map(Result::ok)
        .collect();

    // The string starts on line 1; the identifier after it is on line 3.
    assert_eq!(tokens[1].kind, TokenKind::IDENTIFIER);
    assert_eq!(tokens[1].line, 3);
}

#[test]
fn unterminated_string_is_reported_once() {
    let results: Vec<_> = Scanner::new(b"\"oops").collect();

    let errors: Vec<_> = results.iter().filter(|r| r.is_err()).collect();
    assert_eq!(errors.len(), 1);

    let message = format!("{}", results[0].as_ref().unwrap_err());
    assert!(message.contains("Unterminated string."), "{}", message);

    // Scan still terminates with exactly one EOF.
    let eofs = results
        .iter()
        .filter(|r| matches!(r, Ok(t) if t.kind == TokenKind::EOF))
        .count();
    assert_eq!(eofs, 1);
}

#[test]
fn comments_and_whitespace_are_skipped() {
    assert_token_sequence(
        "a // the rest is ignored\nb",
        &[
            (TokenKind::IDENTIFIER, "a"),
            (TokenKind::IDENTIFIER, "b"),
            (TokenKind::EOF, ""),
        ],
    );
}

#[test]
fn comment_at_end_of_input() {
    assert_token_sequence("// nothing here", &[(TokenKind::EOF, "")]);
}

#[test]
fn unexpected_characters_interleave_with_tokens() {
    let results: Vec<_> = Scanner::new(b",.$(#").collect();

    // COMMA, DOT, error for '$', LEFT_PAREN, error for '#', EOF.
    assert_eq!(results.len(), 6);

    let error_count = results.iter().filter(|r| r.is_err()).count();
    assert_eq!(error_count, 2);

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        let message = format!("{}", err);
        assert!(message.contains("Unexpected character"), "{}", message);
    }

    let kinds: Vec<&TokenKind> = results
        .iter()
        .filter_map(|r| r.as_ref().ok().map(|t| &t.kind))
        .collect();

    assert_eq!(
        kinds,
        vec![
            &TokenKind::COMMA,
            &TokenKind::DOT,
            &TokenKind::LEFT_PAREN,
            &TokenKind::EOF
        ]
    );
}

#[test]
fn eof_carries_final_line_number() {
    let tokens: Vec<Token> = Scanner::new(b"a\nb\nc\n").filter_map(Result::ok).collect();

    let eof = tokens.last().unwrap();
    assert_eq!(eof.kind, TokenKind::EOF);
    assert_eq!(eof.line, 4);
}

#[test]
fn token_display_format() {
    let tokens: Vec<Token> = Scanner::new(b"3 3.5 \"hi\" foo")
        .filter_map(Result::ok)
        .collect();

    assert_eq!(format!("{}", tokens[0]), "NUMBER 3 3.0");
    assert_eq!(format!("{}", tokens[1]), "NUMBER 3.5 3.5");
    assert_eq!(format!("{}", tokens[2]), "STRING \"hi\" hi");
    assert_eq!(format!("{}", tokens[3]), "IDENTIFIER foo null");
}

#[test]
fn token_display_of_numbers_beyond_i64_range() {
    let tokens: Vec<Token> = Scanner::new(b"10000000000000000000")
        .filter_map(Result::ok)
        .collect();

    assert_eq!(
        format!("{}", tokens[0]),
        "NUMBER 10000000000000000000 10000000000000000000.0"
    );
}
