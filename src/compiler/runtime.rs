//! External C functions the generated code calls, and the `print`
//! format strings handed to them.

use inkwell::{
    context::Context,
    module::{Linkage, Module},
    values::FunctionValue,
    AddressSpace,
};

use crate::ast::types::Type;

/// Declarations of the C runtime used by generated code.
#[derive(Debug, Clone, Copy)]
pub struct Runtime<'ctx> {
    /// `i32 printf(i8*, ...)`
    pub printf: FunctionValue<'ctx>,
    /// `i8* malloc(i64)`
    pub malloc: FunctionValue<'ctx>,
}

impl<'ctx> Runtime<'ctx> {
    /// Declares the runtime functions in `module` with external linkage.
    pub fn declare(context: &'ctx Context, module: &Module<'ctx>) -> Self {
        let i8_ptr_type = context.i8_type().ptr_type(AddressSpace::default());

        let printf_type = context.i32_type().fn_type(&[i8_ptr_type.into()], true);
        let printf = module.add_function("printf", printf_type, Some(Linkage::External));

        let malloc_type = i8_ptr_type.fn_type(&[context.i64_type().into()], false);
        let malloc = module.add_function("malloc", malloc_type, Some(Linkage::External));

        Runtime { printf, malloc }
    }
}

/// Builds the `printf` format for a `print` statement from the static
/// types of its arguments.
///
/// Arguments are rendered back to back. A newline ends the line unless the
/// last argument is a string, so strings can continue a line.
pub fn print_format(types: &[Type]) -> String {
    let mut format = String::new();

    for ty in types {
        let directive = if ty.is_string() || ty.is_bool() {
            "%s"
        } else if ty.is_array() || ty.is_null() {
            "%p"
        } else if ty.is_int() || ty.is_char() {
            "%d"
        } else if ty.is_float() {
            "%f"
        } else {
            "<void>"
        };
        format.push_str(directive);
    }

    if !types.last().is_some_and(Type::is_string) {
        format.push('\n');
    }

    format
}
