//! Lexical analysis.
//!
//! Converts source text into a stream of line-tagged tokens using an
//! ordered table of anchored regular expressions, and collects the
//! program's string literals.

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
