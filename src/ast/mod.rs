/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Declarations, symbols and the program arena
/// - expressions: Expressions and assignable variables
/// - statements: Statement kinds
/// - types: The `Type` of declarations and expressions
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
