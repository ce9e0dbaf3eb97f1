//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the compilation
//! process. It includes:
//!
//! - Line-annotated diagnostics for scanning, parsing and semantic analysis
//! - Backend failures raised while building, verifying or running a module
//! - Error formatting and display functionality
//! - Helpful error messages and suggestions

pub mod errors;
