use std::{fmt::Display, path::PathBuf};

use inkwell::builder::BuilderError;
use thiserror::Error;

/// A line-annotated, fatal compile-time diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    line: i32,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, line: i32) -> Self {
        Error {
            internal_error: error_impl,
            line,
        }
    }

    pub fn get_line(&self) -> i32 {
        self.line
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::DuplicateSymbol { .. } => "DuplicateSymbol",
            ErrorImpl::UndeclaredSymbol { .. } => "UndeclaredSymbol",
            ErrorImpl::NotAVariable { .. } => "NotAVariable",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::ArityMismatch { .. } => "ArityMismatch",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::UnreachableStatement => "UnreachableStatement",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::DuplicateSymbol { symbol } => {
                ErrorTip::Suggestion(format!("Symbol `{}` is already declared", symbol))
            }
            ErrorImpl::UndeclaredSymbol { symbol } => {
                ErrorTip::Suggestion(format!("Symbol `{}` is not declared", symbol))
            }
            ErrorImpl::NotAVariable { symbol } => ErrorTip::Suggestion(format!(
                "Cannot access the value of function `{}`",
                symbol
            )),
            ErrorImpl::NotCallable { symbol } => {
                ErrorTip::Suggestion(format!("Cannot call non-function symbol `{}`", symbol))
            }
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::ArityMismatch {
                function,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "Function `{}` expects {} arguments, received {}",
                function, expected, received
            )),
            ErrorImpl::MissingReturn { function } => ErrorTip::Suggestion(format!(
                "Some paths of function `{}` don't return a value",
                function
            )),
            ErrorImpl::UnreachableStatement => {
                ErrorTip::Suggestion(String::from("Statement follows a return"))
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error at line {}, {}", self.line, self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("symbol {symbol:?} is already declared")]
    DuplicateSymbol { symbol: String },
    #[error("symbol {symbol:?} is not declared")]
    UndeclaredSymbol { symbol: String },
    #[error("cannot access {symbol:?} function's value")]
    NotAVariable { symbol: String },
    #[error("cannot call non-function symbol {symbol:?}")]
    NotCallable { symbol: String },
    #[error("mismatch type: expected {expected:?}, received {received:?}")]
    TypeMismatch { expected: String, received: String },
    #[error("mismatch number of parameters in {function:?} call: expected {expected}, received {received}")]
    ArityMismatch {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("there are branches of function {function:?} that don't return")]
    MissingReturn { function: String },
    #[error("unexpected statement after return")]
    UnreachableStatement,
}

/// Failures raised while lowering a resolved program to LLVM or running it.
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("llvm builder error: {0}")]
    Builder(#[from] BuilderError),
    #[error("invalid module: {0}")]
    InvalidModule(String),
    #[error("target initialisation failed: {0}")]
    Target(String),
    #[error("main function not found")]
    MissingMain,
    #[error("execution failed: {0}")]
    Execution(String),
    #[error("error writing bitcode to {0:?}")]
    Bitcode(PathBuf),
}

/// Any failure of the whole pipeline, from source text to module.
#[derive(Error, Debug)]
pub enum CompileFailure {
    #[error("{0}")]
    Diagnostic(#[from] Error),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}
