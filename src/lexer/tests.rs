//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords and identifiers
//! - Numeric literals (integers and floats)
//! - String literals with escape sequences
//! - Operators and punctuation
//! - Comments and line tracking
//! - Error cases

use super::{
    lexer::{string_literals, tokenize},
    tokens::TokenKind,
};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string())
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    let source = "void bool char int float if else while return delete print new true false null";

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Void,
            TokenKind::Bool,
            TokenKind::Char,
            TokenKind::Int,
            TokenKind::Float,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Return,
            TokenKind::Delete,
            TokenKind::Print,
            TokenKind::New,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Null,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo bar baz_123 _underscore CamelCase integer".to_string();
    let tokens = tokenize(source).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[2].value, "baz_123");
    assert_eq!(tokens[3].value, "_underscore");
    assert_eq!(tokens[4].value, "CamelCase");
    // Keyword prefixes stay identifiers
    assert_eq!(tokens[5].kind, TokenKind::Identifier);
    assert_eq!(tokens[5].value, "integer");
    assert_eq!(tokens[6].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_numbers() {
    let source = "42 3.14 0 100.5".to_string();
    let tokens = tokenize(source).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].value, "0");
    assert_eq!(tokens[3].value, "100.5");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_strings() {
    let source = r#""hello" "multiple words""#.to_string();
    let tokens = tokenize(source).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].value, "multiple words");
}

#[test]
fn test_tokenize_string_escapes() {
    let source = r#""line\n" "tab\t" "quote\"inside" "back\\slash""#.to_string();
    let tokens = tokenize(source).unwrap();

    assert_eq!(tokens[0].value, "line\n");
    assert_eq!(tokens[1].value, "tab\t");
    assert_eq!(tokens[2].value, "quote\"inside");
    assert_eq!(tokens[3].value, "back\\slash");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("= == ! != < <= > >= && || + - * /"),
        vec![
            TokenKind::Assignment,
            TokenKind::Equals,
            TokenKind::Not,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::LessEquals,
            TokenKind::Greater,
            TokenKind::GreaterEquals,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_punctuation() {
    assert_eq!(
        kinds("( ) { } [ ] ; ,"),
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_comments() {
    let source = "int x; // this is a comment\nx = 5;".to_string();
    let tokens = tokenize(source).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Int);
    assert_eq!(tokens[1].value, "x");
    assert_eq!(tokens[2].kind, TokenKind::Semicolon);
    assert_eq!(tokens[3].value, "x");
    assert_eq!(tokens[4].kind, TokenKind::Assignment);
}

#[test]
fn test_tokenize_tracks_lines() {
    let source = "int a;\n\nfloat b; // note\n\"two\nlines\" c".to_string();
    let tokens = tokenize(source).unwrap();

    assert_eq!(tokens[0].line, 1);
    assert_eq!(tokens[3].kind, TokenKind::Float);
    assert_eq!(tokens[3].line, 3);
    assert_eq!(tokens[6].kind, TokenKind::String);
    assert_eq!(tokens[6].line, 4);
    assert_eq!(tokens[7].value, "c");
    assert_eq!(tokens[7].line, 5);
}

#[test]
fn test_tokenize_array_declaration() {
    assert_eq!(
        kinds("int[][] m;"),
        vec![
            TokenKind::Int,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::Identifier,
            TokenKind::Semicolon,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_empty() {
    let tokens = tokenize(String::new()).unwrap();

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_unrecognised() {
    let result = tokenize("int a;\nint b = @;".to_string());

    let error = result.unwrap_err();
    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_line(), 2);
}

#[test]
fn test_string_literals_are_distinct_and_ordered() {
    let tokens = tokenize(r#"print "b"; print "a", "b"; print "c";"#.to_string()).unwrap();

    assert_eq!(string_literals(&tokens), vec!["b", "a", "c"]);
}
