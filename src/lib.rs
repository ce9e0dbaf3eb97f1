#![allow(clippy::module_inception)]

use std::path::Path;

use inkwell::{
    context::Context,
    module::Module,
    targets::{InitializationConfig, Target},
    types::BasicTypeEnum,
    OptimizationLevel,
};

use crate::{
    compiler::compiler::compile,
    errors::errors::{CodegenError, CompileFailure, Error, ErrorTip},
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::type_check,
};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// Runs the whole pipeline on `source`: scan, parse, analyze and generate a
/// verified LLVM module named `module_name`.
pub fn compile_source<'ctx>(
    source: &str,
    context: &'ctx Context,
    module_name: &str,
) -> Result<Module<'ctx>, CompileFailure> {
    let tokens = tokenize(source.to_string())?;
    let mut program = parse(tokens)?;
    type_check(&mut program)?;

    Ok(compile(&program, context, module_name)?)
}

/// JIT-compiles `module` and calls its `main`.
///
/// Returns what `main` returned, or 0 for a `void main`.
pub fn run_main(module: &Module<'_>) -> Result<i32, CodegenError> {
    let main = module
        .get_function("main")
        .ok_or(CodegenError::MissingMain)?;

    if main.count_params() != 0 {
        return Err(CodegenError::Execution(String::from(
            "main must not take parameters",
        )));
    }

    let returns_int = match main.get_type().get_return_type() {
        None => false,
        Some(BasicTypeEnum::IntType(ty)) if ty.get_bit_width() == 32 => true,
        Some(_) => {
            return Err(CodegenError::Execution(String::from(
                "main must return int or void",
            )))
        }
    };

    Target::initialize_native(&InitializationConfig::default()).map_err(CodegenError::Target)?;
    let engine = module
        .create_jit_execution_engine(OptimizationLevel::None)
        .map_err(|message| CodegenError::Execution(message.to_string()))?;

    unsafe {
        if returns_int {
            let function = engine
                .get_function::<unsafe extern "C" fn() -> i32>("main")
                .map_err(|error| CodegenError::Execution(error.to_string()))?;
            Ok(function.call())
        } else {
            let function = engine
                .get_function::<unsafe extern "C" fn()>("main")
                .map_err(|error| CodegenError::Execution(error.to_string()))?;
            function.call();
            Ok(0)
        }
    }
}

pub fn write_bitcode(module: &Module<'_>, path: &Path) -> Result<(), CodegenError> {
    if module.write_bitcode_to_path(path) {
        Ok(())
    } else {
        Err(CodegenError::Bitcode(path.to_path_buf()))
    }
}

/// The text of the 1-based `line` of `source`.
pub fn get_line(source: &str, line: i32) -> Option<&str> {
    let index = usize::try_from(line).ok()?.checked_sub(1)?;
    source.lines().nth(index)
}

pub fn display_error(error: &Error, source: &str, file: &str) {
    /*
        Error: TypeMismatch (Expected type `int`, received `bool`)
        -> final.phi:3
          |
        3 | x = true;
          | ^^^^^^^^^
    */

    if let ErrorTip::None = error.get_tip() {
        eprintln!("Error: {}", error.get_error_name());
    } else {
        eprintln!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }
    eprintln!("-> {}:{}", file, error.get_line());

    let Some(line_text) = get_line(source, error.get_line()) else {
        return;
    };

    let line_string = error.get_line().to_string();
    let padding = line_string.len() + 2;
    let line_text = line_text.trim();

    eprintln!("{:>padding$}", "|");
    eprintln!("{} | {}", line_string, line_text);
    eprintln!("{:>padding$} {}", "|", "^".repeat(line_text.len().max(1)));
}
