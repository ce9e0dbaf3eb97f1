//! Code generation module for the compiler.
//!
//! This module contains the LLVM-based code generator that transforms
//! the analyzed `Program` into an LLVM module in SSA form. It handles:
//!
//! - Compilation of expressions and statements
//! - Type conversion from language types to LLVM types
//! - Tracking the current value of every local in an `Environment`
//! - Merging environments with phis where control flow joins
//! - Declarations of the C runtime (`printf`, `malloc`)

pub mod compiler;
pub mod environment;
pub mod expr;
pub mod runtime;
pub mod stmt;

#[cfg(test)]
mod tests;
