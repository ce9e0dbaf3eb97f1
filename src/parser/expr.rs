use crate::{
    ast::{
        ast::Symbol,
        expressions::{BinaryOp, ExprKind, Expression, UnaryOp, Variable, VariableKind},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    lookups::BindingPower,
    parser::Parser,
    types::parse_value_type,
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expression, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(parser.unexpected()),
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let token_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);

        if token_bp <= bp {
            break;
        }

        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => return Err(parser.unexpected()),
        };

        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expression, Error> {
    let token = parser.advance();

    let kind = match token.kind {
        TokenKind::Number if token.value.contains('.') => match token.value.parse::<f32>() {
            Ok(value) => ExprKind::Float(value),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.line,
                ))
            }
        },
        TokenKind::Number => match token.value.parse::<i32>() {
            Ok(value) => ExprKind::Int(value),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.line,
                ))
            }
        },
        TokenKind::String => ExprKind::Str(token.value),
        TokenKind::True => ExprKind::Bool(true),
        TokenKind::False => ExprKind::Bool(false),
        TokenKind::Null => ExprKind::Null,
        TokenKind::Identifier => ExprKind::Variable(Variable::new(
            VariableKind::Reference(Symbol::Name(token.value)),
            token.line,
        )),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.line,
            ))
        }
    };

    Ok(Expression::new(kind, token.line))
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Dash => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Equals => Some(BinaryOp::Equal),
        TokenKind::NotEquals => Some(BinaryOp::NotEqual),
        TokenKind::Less => Some(BinaryOp::Less),
        TokenKind::LessEquals => Some(BinaryOp::LessEqual),
        TokenKind::Greater => Some(BinaryOp::Greater),
        TokenKind::GreaterEquals => Some(BinaryOp::GreaterEqual),
        TokenKind::And => Some(BinaryOp::And),
        TokenKind::Or => Some(BinaryOp::Or),
        _ => None,
    }
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: Expression,
    bp: BindingPower,
) -> Result<Expression, Error> {
    let op = match binary_operator(parser.current_token_kind()) {
        Some(op) => op,
        None => return Err(parser.unexpected()),
    };
    let operator_token = parser.advance();

    let right = parse_expr(parser, bp)?;

    Ok(Expression::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        operator_token.line,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expression, Error> {
    let operator_token = parser.advance();
    let op = if operator_token.kind == TokenKind::Not {
        UnaryOp::Not
    } else {
        UnaryOp::Minus
    };

    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expression::new(
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        operator_token.line,
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expression, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

pub fn parse_call_expr(
    parser: &mut Parser,
    left: Expression,
    _bp: BindingPower,
) -> Result<Expression, Error> {
    let callee = match left.kind {
        ExprKind::Variable(Variable {
            kind: VariableKind::Reference(symbol),
            ..
        }) => symbol,
        _ => return Err(parser.unexpected_detailed("only named functions can be called")),
    };

    parser.advance();

    let mut arguments = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        arguments.push(parse_expr(parser, BindingPower::Default)?);

        while parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            arguments.push(parse_expr(parser, BindingPower::Default)?);
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    Ok(Expression::new(
        ExprKind::Call { callee, arguments },
        left.line,
    ))
}

pub fn parse_index_expr(
    parser: &mut Parser,
    left: Expression,
    _bp: BindingPower,
) -> Result<Expression, Error> {
    let line = parser.advance().line;
    let offset = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(Expression::new(
        ExprKind::Variable(Variable::new(
            VariableKind::Array {
                location: Box::new(left),
                offset: Box::new(offset),
            },
            line,
        )),
        line,
    ))
}

pub fn parse_new_expr(parser: &mut Parser) -> Result<Expression, Error> {
    // new int[][10]
    let line = parser.advance().line;

    let element = parse_value_type(parser)?;

    parser.expect(TokenKind::OpenBracket)?;
    let size = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(Expression::new(
        ExprKind::New {
            element,
            size: Box::new(size),
        },
        line,
    ))
}
