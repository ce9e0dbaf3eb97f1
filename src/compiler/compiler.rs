//! Main compiler module.
//!
//! This module holds the `Compiler` state and drives code generation for a
//! whole analyzed `Program`: string constants and globals first, then one
//! LLVM function per declared function, then module verification.

use std::collections::HashMap;

use inkwell::{
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::{Linkage, Module},
    types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType},
    values::{BasicValueEnum, FunctionValue, PointerValue},
    AddressSpace,
};

use crate::{
    ast::{
        ast::{DeclId, DeclKind, Declaration, Program},
        types::{Type, TypeTag},
    },
    errors::errors::CodegenError,
};

use super::{environment::Environment, runtime::Runtime, stmt::gen_statement};

/// The state of one code generation run.
///
/// # Type Parameters
///
/// * `'p` - Lifetime of the analyzed program
/// * `'a` - Lifetime of the LLVM context
pub struct Compiler<'p, 'a> {
    /// The analyzed program being compiled
    pub program: &'p Program,

    /// Storage of every global variable
    pub globals: HashMap<DeclId, PointerValue<'a>>,
    /// LLVM function of every prototype and definition
    pub functions: HashMap<DeclId, FunctionValue<'a>>,
    /// `i8*` constant of every string literal
    pub strings: HashMap<String, PointerValue<'a>>,
    /// External C functions
    pub runtime: Runtime<'a>,

    /// The function whose body is being generated
    pub current_function: Option<FunctionValue<'a>>,
    /// Declared return type of `current_function`
    pub return_type: Type,

    /// Reference to the LLVM context
    pub context: &'a Context,
    /// The LLVM module being built
    pub module: Module<'a>,
    /// The LLVM IR builder
    pub builder: Builder<'a>,
}

impl<'p, 'a> Compiler<'p, 'a> {
    pub fn new(program: &'p Program, context: &'a Context, module_name: &str) -> Self {
        let module = context.create_module(module_name);
        let runtime = Runtime::declare(context, &module);

        Compiler {
            program,
            globals: HashMap::new(),
            functions: HashMap::new(),
            strings: HashMap::new(),
            runtime,
            current_function: None,
            return_type: Type::VOID,
            module,
            builder: context.create_builder(),
            context,
        }
    }

    pub fn declaration(&self, id: DeclId) -> &'p Declaration {
        let program = self.program;
        program.declaration(id)
    }

    /// Converts a language type to an LLVM basic type.
    ///
    /// Each array level adds one pointer. `null` that never met an array
    /// context is an `i8*`.
    ///
    /// # Panics
    ///
    /// Panics on `void` and `undefined`, which have no value representation.
    pub fn convert_type(&self, ty: Type) -> BasicTypeEnum<'a> {
        let base: BasicTypeEnum<'a> = match ty.tag {
            TypeTag::Bool => self.context.bool_type().into(),
            TypeTag::Char | TypeTag::Null => self.context.i8_type().into(),
            TypeTag::Int => self.context.i32_type().into(),
            TypeTag::Float => self.context.f32_type().into(),
            TypeTag::Void | TypeTag::Undefined => {
                panic!("Attempted to convert type {} to a basic type", ty)
            }
        };

        let pointers = if ty.is_null() { 1 } else { ty.pointers };
        (0..pointers).fold(base, |inner, _| {
            inner.ptr_type(AddressSpace::default()).into()
        })
    }

    /// Signature of a function or prototype declaration.
    pub fn function_type(&self, declaration: &Declaration) -> FunctionType<'a> {
        let parameters: Vec<BasicMetadataTypeEnum<'a>> = declaration
            .parameters()
            .iter()
            .map(|id| self.convert_type(self.declaration(*id).ty).into())
            .collect();

        if declaration.ty.is_void() {
            self.context.void_type().fn_type(&parameters, false)
        } else {
            self.convert_type(declaration.ty).fn_type(&parameters, false)
        }
    }

    pub fn string(&self, value: &str) -> PointerValue<'a> {
        *self
            .strings
            .get(value)
            .unwrap_or_else(|| panic!("String literal {:?} was not collected", value))
    }

    /// Appends a block to the function being generated.
    pub fn create_basic_block(&self, name: &str) -> BasicBlock<'a> {
        let function = self
            .current_function
            .unwrap_or_else(|| panic!("Block {:?} created outside of a function", name));
        self.context.append_basic_block(function, name)
    }

    /// Adds a private, constant, null-terminated string global.
    fn add_string_constant(&self, value: &str, name: &str) -> PointerValue<'a> {
        let initializer = self.context.const_string(value.as_bytes(), true);
        let global = self
            .module
            .add_global(initializer.get_type(), Some(AddressSpace::default()), name);
        global.set_initializer(&initializer);
        global.set_constant(true);
        global.set_linkage(Linkage::Private);

        let i8_ptr_type = self.context.i8_type().ptr_type(AddressSpace::default());
        global.as_pointer_value().const_cast(i8_ptr_type)
    }

    /// Seeds one constant per collected string literal, plus the texts
    /// used to print booleans.
    fn compile_strings(&mut self) {
        let program = self.program;
        let literals = program
            .strings
            .iter()
            .map(String::as_str)
            .chain(["true", "false"]);

        for literal in literals {
            if !self.strings.contains_key(literal) {
                let pointer = self.add_string_constant(literal, ".str");
                self.strings.insert(literal.to_string(), pointer);
            }
        }
    }

    /// Zero-initialised module storage for every global variable.
    fn compile_globals(&mut self) {
        let program = self.program;
        for id in program.top_level.iter().copied() {
            let declaration = self.declaration(id);
            if !declaration.is_variable() {
                continue;
            }

            let ty = self.convert_type(declaration.ty);
            let global = self
                .module
                .add_global(ty, Some(AddressSpace::default()), &declaration.name);
            global.set_initializer(&const_zero(ty));
            self.globals.insert(id, global.as_pointer_value());
        }
    }

    /// Declares every function before any body is generated, so calls may
    /// refer forward. A prototype and its definition share one function.
    fn declare_functions(&mut self) {
        let program = self.program;
        let mut by_name: HashMap<&'p str, FunctionValue<'a>> = HashMap::new();

        for id in program.top_level.iter().copied() {
            let declaration = self.declaration(id);
            if !declaration.is_callable() {
                continue;
            }

            let function = match by_name.get(declaration.name.as_str()) {
                Some(function) => *function,
                None => {
                    let function_type = self.function_type(declaration);
                    let function = self.module.add_function(
                        &declaration.name,
                        function_type,
                        Some(Linkage::External),
                    );
                    by_name.insert(&declaration.name, function);
                    function
                }
            };

            self.functions.insert(id, function);
        }
    }

    /// Generates the body of one function definition.
    fn compile_function(&mut self, id: DeclId) -> Result<(), CodegenError> {
        let declaration = self.declaration(id);
        let body = match &declaration.kind {
            DeclKind::Function {
                body: Some(body), ..
            } => body,
            _ => return Ok(()),
        };

        let function = self.functions[&id];
        self.current_function = Some(function);
        self.return_type = declaration.ty;

        // Parameters are plain SSA values
        let mut environment = Environment::new();
        for (parameter, value) in declaration.parameters().iter().zip(function.get_param_iter()) {
            value.set_name(&self.declaration(*parameter).name);
            environment.bind(*parameter, value);
        }

        let entry = self.create_basic_block("entry");
        self.builder.position_at_end(entry);

        let exit = gen_statement(self, body, &mut environment)?;

        // Analysis appends a return to void bodies, so only a body that
        // somehow falls through reaches this point
        if exit.is_some() {
            if declaration.ty.is_void() {
                self.builder.build_return(None)?;
            } else {
                self.builder.build_unreachable()?;
            }
        }

        self.current_function = None;
        Ok(())
    }

    /// Generates the module and checks it with the LLVM verifier.
    pub fn compile(&mut self) -> Result<(), CodegenError> {
        self.compile_strings();
        self.compile_globals();
        self.declare_functions();

        let program = self.program;
        for id in program.top_level.iter().copied() {
            self.compile_function(id)?;
        }

        self.module
            .verify()
            .map_err(|message| CodegenError::InvalidModule(message.to_string()))
    }
}

/// The all-zero constant of `ty`.
pub fn const_zero(ty: BasicTypeEnum<'_>) -> BasicValueEnum<'_> {
    match ty {
        BasicTypeEnum::ArrayType(ty) => ty.const_zero().into(),
        BasicTypeEnum::FloatType(ty) => ty.const_zero().into(),
        BasicTypeEnum::IntType(ty) => ty.const_zero().into(),
        BasicTypeEnum::PointerType(ty) => ty.const_null().into(),
        BasicTypeEnum::StructType(ty) => ty.const_zero().into(),
        BasicTypeEnum::VectorType(ty) => ty.const_zero().into(),
    }
}

/// Generates the LLVM module of an analyzed program.
///
/// # Arguments
///
/// * `program` - The program, already through `type_check`
/// * `context` - Reference to the LLVM context
/// * `module_name` - Name given to the LLVM module
///
/// # Returns
///
/// The verified module, or the first builder or verifier failure.
pub fn compile<'a>(
    program: &Program,
    context: &'a Context,
    module_name: &str,
) -> Result<Module<'a>, CodegenError> {
    let mut compiler = Compiler::new(program, context, module_name);
    compiler.compile()?;

    Ok(compiler.module)
}
