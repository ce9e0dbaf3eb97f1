use crate::{
    ast::{
        ast::{DeclId, DeclKind, Declaration},
        expressions::ExprKind,
        statements::{Statement, StmtKind},
        types::{Type, TypeTag},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{
    parser::Parser,
    types::{parse_type, parse_value_type},
};

/// Parses one top-level declaration: global variables, a function
/// definition or a prototype.
pub fn parse_declaration(parser: &mut Parser) -> Result<(), Error> {
    let line = parser.get_line();
    let ty = parse_type(parser, BindingPower::Default)?;

    let error = parser.unexpected_detailed("expected identifier in declaration");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let is_function = parser.current_token_kind() == TokenKind::OpenParen;

    // Only a function may return `void`, and nothing holds `void` elements
    if ty.tag == TypeTag::Void && (!is_function || ty.is_array()) {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: ty.to_string(),
                message: String::from("`void` cannot hold a value"),
            },
            line,
        ));
    }

    if !is_function {
        for id in parse_variable_names(parser, name, ty, line)? {
            parser.push_top_level(id);
        }
        return Ok(());
    }

    parser.advance();
    let mut parameters = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            let param_line = parser.get_line();
            let param_ty = parse_value_type(parser)?;
            let param_name = parser.expect(TokenKind::Identifier)?.value;
            let parameter = Declaration::variable(param_name, param_ty, param_line);
            parameters.push(parser.declare(parameter));

            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let kind = if parser.current_token_kind() == TokenKind::OpenCurly {
        let body = parse_block_stmt(parser)?;
        DeclKind::Function {
            parameters,
            body: Some(Box::new(body)),
        }
    } else {
        let error = parser.unexpected_detailed("expected function body or `;`");
        parser.expect_error(TokenKind::Semicolon, Some(error))?;
        DeclKind::Prototype { parameters }
    };

    let id = parser.declare(Declaration {
        name,
        ty,
        line,
        kind,
    });
    parser.push_top_level(id);

    Ok(())
}

/// Parses `a, b, c;` after the first name of a variable declaration.
fn parse_variable_names(
    parser: &mut Parser,
    first: String,
    ty: Type,
    line: i32,
) -> Result<Vec<DeclId>, Error> {
    let mut ids = vec![parser.declare(Declaration::variable(first, ty, line))];

    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        let name_line = parser.get_line();
        let name = parser.expect(TokenKind::Identifier)?.value;
        ids.push(parser.declare(Declaration::variable(name, ty, name_line)));
    }

    parser.expect(TokenKind::Semicolon)?;

    Ok(ids)
}

pub fn parse_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let handler = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied();

    if let Some(handler) = handler {
        return handler(parser);
    }

    let line = parser.get_line();
    let expr = parse_expr(parser, BindingPower::Default)?;

    let kind = if parser.current_token_kind() == TokenKind::Assignment {
        let target = match expr.kind {
            ExprKind::Variable(target) => target,
            _ => return Err(parser.unexpected_detailed("cannot assign to this expression")),
        };
        parser.advance();
        let value = parse_expr(parser, BindingPower::Default)?;
        StmtKind::Assign { target, value }
    } else if matches!(expr.kind, ExprKind::Call { .. }) {
        StmtKind::Call(expr)
    } else {
        return Err(parser.unexpected_detailed("expected an assignment or a call"));
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(Statement::new(kind, line))
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let line = parser.expect(TokenKind::OpenCurly)?.line;

    let mut declarations = vec![];
    while parser.current_token().is_type_keyword() {
        let decl_line = parser.get_line();
        let ty = parse_value_type(parser)?;
        let name = parser.expect(TokenKind::Identifier)?.value;
        declarations.extend(parse_variable_names(parser, name, ty, decl_line)?);
    }

    let mut statements = vec![];
    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseCurly {
        statements.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Statement::new(
        StmtKind::Block {
            declarations,
            statements,
        },
        line,
    ))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let line = parser.advance().line;

    parser.expect(TokenKind::OpenParen)?;
    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    let then_branch = Box::new(parse_stmt(parser)?);

    let else_branch = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        Some(Box::new(parse_stmt(parser)?))
    } else {
        None
    };

    Ok(Statement::new(
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        },
        line,
    ))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let line = parser.advance().line;

    parser.expect(TokenKind::OpenParen)?;
    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    let body = Box::new(parse_stmt(parser)?);

    Ok(Statement::new(StmtKind::While { condition, body }, line))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let line = parser.advance().line;

    let value = if parser.current_token_kind() == TokenKind::Semicolon {
        None
    } else {
        Some(parse_expr(parser, BindingPower::Default)?)
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(Statement::new(StmtKind::Return(value), line))
}

pub fn parse_delete_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let line = parser.advance().line;
    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Statement::new(StmtKind::Delete(value), line))
}

pub fn parse_print_stmt(parser: &mut Parser) -> Result<Statement, Error> {
    let line = parser.advance().line;

    let mut arguments = vec![parse_expr(parser, BindingPower::Default)?];
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        arguments.push(parse_expr(parser, BindingPower::Default)?);
    }

    parser.expect(TokenKind::Semicolon)?;

    Ok(Statement::new(StmtKind::Print(arguments), line))
}
