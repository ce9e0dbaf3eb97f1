//! Type parsing implementation.
//!
//! This module handles parsing of type annotations: a base type keyword
//! followed by any number of `[]` suffixes.
//!
//! Similar to expression parsing, it uses NUD/LED handlers with
//! binding powers.

use std::collections::HashMap;

use crate::{
    ast::types::{Type, TypeTag},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

/// Type alias for type left denotation handler functions.
pub type TypeLEDHandler = fn(&mut Parser, Type, BindingPower) -> Result<Type, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Type alias for type LED lookup table.
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;

/// Type alias for type binding power lookup table.
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

/// Initializes the type parsing lookup tables.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Void, parse_base_type);
    parser.type_nud(TokenKind::Bool, parse_base_type);
    parser.type_nud(TokenKind::Char, parse_base_type);
    parser.type_nud(TokenKind::Int, parse_base_type);
    parser.type_nud(TokenKind::Float, parse_base_type);
    parser.type_led(TokenKind::OpenBracket, BindingPower::Call, parse_array_type);
}

pub fn parse_base_type(parser: &mut Parser) -> Result<Type, Error> {
    let tag = match parser.current_token_kind() {
        TokenKind::Void => TypeTag::Void,
        TokenKind::Bool => TypeTag::Bool,
        TokenKind::Char => TypeTag::Char,
        TokenKind::Int => TypeTag::Int,
        TokenKind::Float => TypeTag::Float,
        _ => return Err(parser.unexpected_detailed("expected a type")),
    };

    parser.advance();
    Ok(Type::new(tag, 0))
}

pub fn parse_array_type(
    parser: &mut Parser,
    left: Type,
    _bp: BindingPower,
) -> Result<Type, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(left.array_of())
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<Type, Error> {
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_type_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(parser.unexpected_detailed("expected a type")),
    };

    let mut left = nud(parser)?;

    loop {
        let token_kind = parser.current_token_kind();
        let token_bp = *parser
            .get_type_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);

        // `[` not followed by `]` starts a `new` size, not a type suffix
        if token_bp <= bp
            || (token_kind == TokenKind::OpenBracket
                && parser.peek_kind() != TokenKind::CloseBracket)
        {
            break;
        }

        let led = match parser.get_type_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => return Err(parser.unexpected()),
        };

        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}

/// Parses the type of a variable, a parameter or a `new` element, none of
/// which may be built on `void`.
pub fn parse_value_type(parser: &mut Parser) -> Result<Type, Error> {
    if parser.current_token_kind() == TokenKind::Void {
        return Err(parser.unexpected_detailed("`void` cannot hold a value"));
    }

    parse_type(parser, BindingPower::Default)
}
