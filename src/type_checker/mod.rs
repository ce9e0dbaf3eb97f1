//! Type checking and semantic analysis module.
//!
//! This module performs semantic analysis on the parsed `Program`, in place:
//!
//! - Resolving variable and function references to declarations
//! - Assigning a type to every expression
//! - Inserting `int`/`float` conversions where values change type
//! - Checking function signatures and argument counts
//! - Checking that non-void functions return on every path
//!
//! Scopes are tracked by a `SymbolTable` owned by each analysis run.

pub mod symbol_table;
pub mod type_checker;
