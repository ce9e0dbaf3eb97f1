//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Global variable declarations
//! - Function definitions and prototypes
//! - Expressions and operator precedence
//! - Control flow statements
//! - Error cases

use super::parser::parse;
use crate::{
    ast::{
        ast::{DeclKind, Program, Symbol},
        expressions::{BinaryOp, ExprKind, Expression, UnaryOp, VariableKind},
        statements::{Statement, StmtKind},
        types::Type,
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<Program, Error> {
    parse(tokenize(source.to_string())?)
}

/// Statements of the body of the only function in `source`.
fn body_of(source: &str) -> Vec<Statement> {
    let program = parse_source(source).unwrap();
    let function = program
        .top_level
        .iter()
        .map(|id| program.declaration(*id))
        .find(|decl| matches!(decl.kind, DeclKind::Function { .. }))
        .unwrap();

    match &function.kind {
        DeclKind::Function {
            body: Some(body), ..
        } => match &body.kind {
            StmtKind::Block { statements, .. } => statements.clone(),
            _ => panic!("Expected block body"),
        },
        _ => panic!("Expected function"),
    }
}

fn returned_expression(source: &str) -> Expression {
    match body_of(source).remove(0).kind {
        StmtKind::Return(Some(expr)) => expr,
        other => panic!("Expected return, got {:?}", other),
    }
}

#[test]
fn test_parse_global_variables() {
    let program = parse_source("int x; float[] a, b;").unwrap();

    assert_eq!(program.top_level.len(), 3);
    let a = program.declaration(program.top_level[1]);
    assert_eq!(a.name, "a");
    assert_eq!(a.ty, Type::FLOAT.array_of());
    assert!(a.is_variable());
    assert_eq!(program.declaration(program.top_level[2]).name, "b");
}

#[test]
fn test_parse_function_definition() {
    let program = parse_source("int add(int a, int b) { return a + b; }").unwrap();

    assert_eq!(program.top_level.len(), 1);
    let add = program.declaration(program.top_level[0]);
    assert_eq!(add.name, "add");
    assert_eq!(add.ty, Type::INT);
    assert_eq!(add.parameters().len(), 2);
    assert_eq!(program.declaration(add.parameters()[1]).name, "b");
    assert!(matches!(add.kind, DeclKind::Function { body: Some(_), .. }));
}

#[test]
fn test_parse_prototype() {
    let program = parse_source("void f(char[] s);").unwrap();

    let f = program.declaration(program.top_level[0]);
    assert!(matches!(f.kind, DeclKind::Prototype { .. }));
    assert_eq!(program.declaration(f.parameters()[0]).ty, Type::STRING);
}

#[test]
fn test_parse_block_declarations() {
    let program = parse_source("void f() { int i, j; bool b; i = 1; }").unwrap();
    let f = program.declaration(program.top_level[0]);

    match &f.kind {
        DeclKind::Function {
            body: Some(body), ..
        } => match &body.kind {
            StmtKind::Block {
                declarations,
                statements,
            } => {
                assert_eq!(declarations.len(), 3);
                assert_eq!(program.declaration(declarations[2]).ty, Type::BOOL);
                assert_eq!(statements.len(), 1);
            }
            _ => panic!("Expected block"),
        },
        _ => panic!("Expected function"),
    }
}

#[test]
fn test_parse_precedence() {
    let expr = returned_expression("int f() { return 1 + 2 * 3; }");

    match expr.kind {
        ExprKind::Binary { op, right, .. } => {
            assert_eq!(op, BinaryOp::Add);
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    op: BinaryOp::Mul,
                    ..
                }
            ));
        }
        _ => panic!("Expected binary expression"),
    }
}

#[test]
fn test_parse_logical_precedence() {
    let expr = returned_expression("bool f() { return a || b && c == d; }");

    match expr.kind {
        ExprKind::Binary { op, right, .. } => {
            assert_eq!(op, BinaryOp::Or);
            match right.kind {
                ExprKind::Binary { op, right, .. } => {
                    assert_eq!(op, BinaryOp::And);
                    assert!(matches!(
                        right.kind,
                        ExprKind::Binary {
                            op: BinaryOp::Equal,
                            ..
                        }
                    ));
                }
                _ => panic!("Expected and"),
            }
        }
        _ => panic!("Expected or"),
    }
}

#[test]
fn test_parse_left_associative() {
    let expr = returned_expression("int f() { return 10 - 4 - 3; }");

    match expr.kind {
        ExprKind::Binary { left, right, .. } => {
            assert!(matches!(left.kind, ExprKind::Binary { .. }));
            assert_eq!(right.kind, ExprKind::Int(3));
        }
        _ => panic!("Expected binary expression"),
    }
}

#[test]
fn test_parse_unary_binds_tighter() {
    let expr = returned_expression("int f() { return -a + 1; }");

    match expr.kind {
        ExprKind::Binary { op, left, .. } => {
            assert_eq!(op, BinaryOp::Add);
            assert!(matches!(
                left.kind,
                ExprKind::Unary {
                    op: UnaryOp::Minus,
                    ..
                }
            ));
        }
        _ => panic!("Expected binary expression"),
    }
}

#[test]
fn test_parse_literals() {
    assert_eq!(returned_expression("int f() { return 42; }").kind, ExprKind::Int(42));
    assert_eq!(
        returned_expression("float f() { return 2.5; }").kind,
        ExprKind::Float(2.5)
    );
    assert_eq!(
        returned_expression("bool f() { return true; }").kind,
        ExprKind::Bool(true)
    );
    assert_eq!(
        returned_expression("char[] f() { return \"hi\"; }").kind,
        ExprKind::Str("hi".to_string())
    );
    assert_eq!(returned_expression("int[] f() { return null; }").kind, ExprKind::Null);
}

#[test]
fn test_parse_call_and_index() {
    let expr = returned_expression("int f() { return g(1, x)[2]; }");

    match expr.kind {
        ExprKind::Variable(variable) => match variable.kind {
            VariableKind::Array { location, offset } => {
                assert_eq!(offset.kind, ExprKind::Int(2));
                match location.kind {
                    ExprKind::Call { callee, arguments } => {
                        assert_eq!(callee, Symbol::Name("g".to_string()));
                        assert_eq!(arguments.len(), 2);
                    }
                    _ => panic!("Expected call"),
                }
            }
            _ => panic!("Expected array access"),
        },
        _ => panic!("Expected variable"),
    }
}

#[test]
fn test_parse_new() {
    let expr = returned_expression("int[][] f() { return new int[][n + 1]; }");

    match expr.kind {
        ExprKind::New { element, size } => {
            assert_eq!(element, Type::INT.array_of());
            assert!(matches!(size.kind, ExprKind::Binary { .. }));
        }
        _ => panic!("Expected new"),
    }
}

#[test]
fn test_parse_statements() {
    let statements = body_of(
        "void f() {
            a[0] = 1;
            g();
            print 1, \"x\";
            delete a;
            while (a[0] < 3) a[0] = a[0] + 1;
            if (true) return; else { }
            return;
        }",
    );

    assert!(matches!(statements[0].kind, StmtKind::Assign { .. }));
    assert!(matches!(statements[1].kind, StmtKind::Call(_)));
    assert!(matches!(&statements[2].kind, StmtKind::Print(args) if args.len() == 2));
    assert!(matches!(statements[3].kind, StmtKind::Delete(_)));
    assert!(matches!(statements[4].kind, StmtKind::While { .. }));
    assert!(matches!(
        statements[5].kind,
        StmtKind::If {
            else_branch: Some(_),
            ..
        }
    ));
    assert!(matches!(statements[6].kind, StmtKind::Return(None)));
    assert_eq!(statements[6].line, 8);
}

#[test]
fn test_parse_dangling_else() {
    let statements = body_of("void f() { if (a) if (b) g(); else h(); }");

    match &statements[0].kind {
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            assert!(else_branch.is_none());
            assert!(matches!(
                then_branch.kind,
                StmtKind::If {
                    else_branch: Some(_),
                    ..
                }
            ));
        }
        _ => panic!("Expected if"),
    }
}

#[test]
fn test_parse_collects_strings() {
    let program = parse_source("void f() { print \"a\", \"b\"; print \"a\"; }").unwrap();

    assert_eq!(program.strings, vec!["a", "b"]);
}

#[test]
fn test_parse_missing_semicolon() {
    let error = parse_source("int x").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedToken");
}

#[test]
fn test_parse_expression_statement_must_be_call() {
    let error = parse_source("void f() {\n 1 + 2;\n}").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
    assert_eq!(error.get_line(), 2);
}

#[test]
fn test_parse_number_overflow() {
    let error = parse_source("int f() { return 99999999999; }").unwrap_err();

    assert_eq!(error.get_error_name(), "NumberParseError");
}

#[test]
fn test_parse_rejects_void_values() {
    let sources = [
        ("void g;", 1),
        ("int x;\nvoid[] a, b;", 2),
        ("void f() {\n void x;\n}", 2),
        ("int f(int a,\n void b) { return a; }", 2),
        ("void f() {\n int[] a;\n a = new void[3];\n}", 3),
        ("void[] f();", 1),
    ];

    for (source, line) in sources {
        let error = parse_source(source).unwrap_err();

        assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed", "{}", source);
        assert_eq!(error.get_line(), line, "{}", source);
    }
}

#[test]
fn test_parse_void_functions() {
    let program = parse_source("void f();\nvoid g() { f(); }").unwrap();

    assert_eq!(program.top_level.len(), 2);
    assert!(program
        .top_level
        .iter()
        .all(|id| program.declaration(*id).ty == Type::VOID));
}
