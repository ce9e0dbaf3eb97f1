use inkwell::{
    basic_block::BasicBlock,
    types::BasicType,
    values::{BasicMetadataValueEnum, BasicValueEnum, IntValue, PointerValue},
    FloatPredicate, IntPredicate,
};

use crate::{
    ast::{
        ast::{DeclId, Symbol},
        expressions::{BinaryOp, CastKind, ExprKind, Expression, UnaryOp, Variable, VariableKind},
        types::Type,
    },
    errors::errors::CodegenError,
};

use super::{compiler::Compiler, environment::Environment};

type GenResult<'a> = Result<BasicValueEnum<'a>, CodegenError>;

fn resolved(symbol: &Symbol) -> DeclId {
    match symbol {
        Symbol::Resolved(id) => *id,
        Symbol::Name(name) => panic!("Symbol {:?} reached code generation unresolved", name),
    }
}

/// Generates LLVM IR for the given expression at the builder's position.
///
/// Expressions never change the environment, but `&&` and `||` add blocks,
/// so the builder may end up in a later block than it started in.
pub fn gen_expression<'a>(
    compiler: &Compiler<'_, 'a>,
    expression: &Expression,
    environment: &Environment<'a>,
) -> GenResult<'a> {
    match &expression.kind {
        ExprKind::Bool(value) => Ok(compiler
            .context
            .bool_type()
            .const_int(*value as u64, false)
            .into()),
        ExprKind::Int(value) => Ok(compiler
            .context
            .i32_type()
            .const_int(*value as i64 as u64, true)
            .into()),
        ExprKind::Float(value) => Ok(compiler
            .context
            .f32_type()
            .const_float(*value as f64)
            .into()),
        ExprKind::Str(value) => Ok(compiler.string(value).into()),
        ExprKind::Null => Ok(compiler
            .convert_type(expression.ty)
            .into_pointer_type()
            .const_null()
            .into()),
        ExprKind::Call { callee, arguments } => {
            match gen_call(compiler, callee, arguments, environment)? {
                Some(value) => Ok(value),
                None => panic!("Void call used as a value at line {}", expression.line),
            }
        }
        ExprKind::Variable(variable) => gen_variable(compiler, variable, environment),
        ExprKind::New { element, size } => gen_new(compiler, *element, size, environment),
        ExprKind::Unary { op, operand } => {
            let value = gen_expression(compiler, operand, environment)?;

            Ok(match op {
                UnaryOp::Minus if operand.ty.is_float() => compiler
                    .builder
                    .build_float_neg(value.into_float_value(), "")?
                    .into(),
                UnaryOp::Minus => compiler
                    .builder
                    .build_int_neg(value.into_int_value(), "")?
                    .into(),
                UnaryOp::Not => compiler
                    .builder
                    .build_not(value.into_int_value(), "")?
                    .into(),
            })
        }
        ExprKind::Binary { op, left, right } if op.is_logical() => {
            gen_logical(compiler, *op, left, right, environment)
        }
        ExprKind::Binary { op, left, right } => {
            let lhs = gen_expression(compiler, left, environment)?;
            let rhs = gen_expression(compiler, right, environment)?;

            gen_binary(compiler, *op, left.ty, lhs, rhs)
        }
        ExprKind::Cast { kind, operand } => {
            let value = gen_expression(compiler, operand, environment)?;

            Ok(match kind {
                CastKind::IntToFloat => compiler
                    .builder
                    .build_signed_int_to_float(
                        value.into_int_value(),
                        compiler.context.f32_type(),
                        "",
                    )?
                    .into(),
                CastKind::FloatToInt => compiler
                    .builder
                    .build_float_to_signed_int(
                        value.into_float_value(),
                        compiler.context.i32_type(),
                        "",
                    )?
                    .into(),
            })
        }
    }
}

/// Generates a call. Returns `None` for a call to a void function.
///
/// `char` parameters receive truncated `int` arguments and a `char` result
/// is widened back to `int`.
pub fn gen_call<'a>(
    compiler: &Compiler<'_, 'a>,
    callee: &Symbol,
    arguments: &[Expression],
    environment: &Environment<'a>,
) -> Result<Option<BasicValueEnum<'a>>, CodegenError> {
    let id = resolved(callee);
    let declaration = compiler.declaration(id);
    let function = *compiler
        .functions
        .get(&id)
        .unwrap_or_else(|| panic!("Function {} was not declared", declaration.name));

    let mut values: Vec<BasicMetadataValueEnum<'a>> = Vec::with_capacity(arguments.len());
    for (argument, parameter) in arguments.iter().zip(declaration.parameters()) {
        let mut value = gen_expression(compiler, argument, environment)?;
        if compiler.declaration(*parameter).ty.is_char() {
            value = narrow_to_char(compiler, value)?;
        }
        values.push(value.into());
    }

    let result = compiler
        .builder
        .build_call(function, &values, "")?
        .try_as_basic_value()
        .left();

    match result {
        Some(value) if declaration.ty.is_char() => Ok(Some(widen_char(compiler, value)?)),
        result => Ok(result),
    }
}

/// Address of an array element.
pub fn gen_element_address<'a>(
    compiler: &Compiler<'_, 'a>,
    location: &Expression,
    offset: &Expression,
    environment: &Environment<'a>,
) -> Result<PointerValue<'a>, CodegenError> {
    let array = gen_expression(compiler, location, environment)?.into_pointer_value();
    let index = gen_expression(compiler, offset, environment)?.into_int_value();

    Ok(unsafe { compiler.builder.build_gep(array, &[index], "")? })
}

/// Reads a variable: a local is its current binding, a global or an array
/// element is loaded from memory.
fn gen_variable<'a>(
    compiler: &Compiler<'_, 'a>,
    variable: &Variable,
    environment: &Environment<'a>,
) -> GenResult<'a> {
    let value = match &variable.kind {
        VariableKind::Reference(symbol) => {
            let id = resolved(symbol);

            match compiler.globals.get(&id) {
                Some(global) => compiler.builder.build_load(*global, "")?,
                None => environment.get(id).unwrap_or_else(|| {
                    panic!(
                        "Variable {} has no value at line {}",
                        compiler.declaration(id).name,
                        variable.line
                    )
                }),
            }
        }
        VariableKind::Array { location, offset } => {
            let address = gen_element_address(compiler, location, offset, environment)?;
            compiler.builder.build_load(address, "")?
        }
    };

    if variable.ty.is_char() {
        return widen_char(compiler, value);
    }

    Ok(value)
}

/// `new T[n]`: `n * sizeof(T)` bytes from `malloc`.
fn gen_new<'a>(
    compiler: &Compiler<'_, 'a>,
    element: Type,
    size: &Expression,
    environment: &Environment<'a>,
) -> GenResult<'a> {
    let count = gen_expression(compiler, size, environment)?.into_int_value();
    let element_type = compiler.convert_type(element);

    let i64_type = compiler.context.i64_type();
    let count = compiler.builder.build_int_s_extend(count, i64_type, "")?;
    let element_size = element_type
        .size_of()
        .unwrap_or_else(|| panic!("Array element type {} has no size", element));
    let element_size = compiler
        .builder
        .build_int_cast(element_size, i64_type, "")?;
    let bytes = compiler.builder.build_int_mul(count, element_size, "")?;

    let memory = compiler
        .builder
        .build_call(compiler.runtime.malloc, &[bytes.into()], "")?
        .try_as_basic_value()
        .left()
        .unwrap_or_else(|| panic!("malloc declared without a result"))
        .into_pointer_value();

    let array_type = compiler.convert_type(element.array_of()).into_pointer_type();
    Ok(compiler
        .builder
        .build_pointer_cast(memory, array_type, "")?
        .into())
}

fn gen_binary<'a>(
    compiler: &Compiler<'_, 'a>,
    op: BinaryOp,
    operand_type: Type,
    lhs: BasicValueEnum<'a>,
    rhs: BasicValueEnum<'a>,
) -> GenResult<'a> {
    let builder = &compiler.builder;

    if operand_type.is_float() {
        let (lhs, rhs) = (lhs.into_float_value(), rhs.into_float_value());

        return Ok(match op {
            BinaryOp::Add => builder.build_float_add(lhs, rhs, "")?.into(),
            BinaryOp::Sub => builder.build_float_sub(lhs, rhs, "")?.into(),
            BinaryOp::Mul => builder.build_float_mul(lhs, rhs, "")?.into(),
            BinaryOp::Div => builder.build_float_div(lhs, rhs, "")?.into(),
            _ => builder
                .build_float_compare(float_predicate(op), lhs, rhs, "")?
                .into(),
        });
    }

    let (lhs, rhs) = if operand_type.is_array() {
        (pointer_to_int(compiler, lhs)?, pointer_to_int(compiler, rhs)?)
    } else {
        (lhs.into_int_value(), rhs.into_int_value())
    };

    Ok(match op {
        BinaryOp::Add => builder.build_int_add(lhs, rhs, "")?.into(),
        BinaryOp::Sub => builder.build_int_sub(lhs, rhs, "")?.into(),
        BinaryOp::Mul => builder.build_int_mul(lhs, rhs, "")?.into(),
        BinaryOp::Div => builder.build_int_signed_div(lhs, rhs, "")?.into(),
        _ => builder
            .build_int_compare(int_predicate(op), lhs, rhs, "")?
            .into(),
    })
}

/// `&&` and `||` as values: the right operand only runs when the left one
/// does not decide the result, and a phi picks the outcome.
fn gen_logical<'a>(
    compiler: &Compiler<'_, 'a>,
    op: BinaryOp,
    left: &Expression,
    right: &Expression,
    environment: &Environment<'a>,
) -> GenResult<'a> {
    let lhs = gen_expression(compiler, left, environment)?.into_int_value();
    let lhs_block = current_block(compiler);

    let rhs_block = compiler.create_basic_block("logical_rhs");
    let end_block = compiler.create_basic_block("logical_end");

    if op == BinaryOp::Or {
        compiler
            .builder
            .build_conditional_branch(lhs, end_block, rhs_block)?;
    } else {
        compiler
            .builder
            .build_conditional_branch(lhs, rhs_block, end_block)?;
    }

    compiler.builder.position_at_end(rhs_block);
    let rhs = gen_expression(compiler, right, environment)?.into_int_value();
    let rhs_out_block = current_block(compiler);
    compiler.builder.build_unconditional_branch(end_block)?;

    compiler.builder.position_at_end(end_block);
    let phi = compiler.builder.build_phi(compiler.context.bool_type(), "")?;
    phi.add_incoming(&[(&lhs, lhs_block), (&rhs, rhs_out_block)]);

    Ok(phi.as_basic_value())
}

/// Compiles a condition straight into control flow.
///
/// `&&`, `||` and `!` become branches instead of values. Every block that
/// ends up branching to `true_block` or `false_block` is pushed on the
/// matching `arrive_at_*` list, which callers use to build phis there.
pub fn gen_jump<'a>(
    compiler: &Compiler<'_, 'a>,
    expression: &Expression,
    true_block: BasicBlock<'a>,
    false_block: BasicBlock<'a>,
    environment: &Environment<'a>,
    mut arrive_at_true: Option<&mut Vec<BasicBlock<'a>>>,
    mut arrive_at_false: Option<&mut Vec<BasicBlock<'a>>>,
) -> Result<(), CodegenError> {
    match &expression.kind {
        ExprKind::Unary {
            op: UnaryOp::Not,
            operand,
        } => gen_jump(
            compiler,
            operand,
            false_block,
            true_block,
            environment,
            arrive_at_false,
            arrive_at_true,
        ),
        ExprKind::Binary { op, left, right } if op.is_logical() => {
            let rhs_block = compiler.create_basic_block("compute_rhs");

            if *op == BinaryOp::Or {
                gen_jump(
                    compiler,
                    left,
                    true_block,
                    rhs_block,
                    environment,
                    arrive_at_true.as_deref_mut(),
                    None,
                )?;
            } else {
                gen_jump(
                    compiler,
                    left,
                    rhs_block,
                    false_block,
                    environment,
                    None,
                    arrive_at_false.as_deref_mut(),
                )?;
            }

            compiler.builder.position_at_end(rhs_block);
            gen_jump(
                compiler,
                right,
                true_block,
                false_block,
                environment,
                arrive_at_true,
                arrive_at_false,
            )
        }
        _ => {
            let condition = gen_expression(compiler, expression, environment)?.into_int_value();
            let block = current_block(compiler);
            compiler
                .builder
                .build_conditional_branch(condition, true_block, false_block)?;

            if let Some(arrivals) = arrive_at_true {
                arrivals.push(block);
            }
            if let Some(arrivals) = arrive_at_false {
                arrivals.push(block);
            }

            Ok(())
        }
    }
}

pub fn current_block<'a>(compiler: &Compiler<'_, 'a>) -> BasicBlock<'a> {
    compiler
        .builder
        .get_insert_block()
        .unwrap_or_else(|| panic!("Builder is not positioned in a block"))
}

/// `char` values travel as `i32` and are stored as `i8`.
pub fn narrow_to_char<'a>(compiler: &Compiler<'_, 'a>, value: BasicValueEnum<'a>) -> GenResult<'a> {
    Ok(compiler
        .builder
        .build_int_truncate(value.into_int_value(), compiler.context.i8_type(), "")?
        .into())
}

fn widen_char<'a>(compiler: &Compiler<'_, 'a>, value: BasicValueEnum<'a>) -> GenResult<'a> {
    Ok(compiler
        .builder
        .build_int_z_extend(value.into_int_value(), compiler.context.i32_type(), "")?
        .into())
}

fn pointer_to_int<'a>(
    compiler: &Compiler<'_, 'a>,
    value: BasicValueEnum<'a>,
) -> Result<IntValue<'a>, CodegenError> {
    Ok(compiler.builder.build_ptr_to_int(
        value.into_pointer_value(),
        compiler.context.i64_type(),
        "",
    )?)
}

fn int_predicate(op: BinaryOp) -> IntPredicate {
    match op {
        BinaryOp::Equal => IntPredicate::EQ,
        BinaryOp::NotEqual => IntPredicate::NE,
        BinaryOp::Less => IntPredicate::SLT,
        BinaryOp::LessEqual => IntPredicate::SLE,
        BinaryOp::Greater => IntPredicate::SGT,
        BinaryOp::GreaterEqual => IntPredicate::SGE,
        _ => panic!("{:?} is not a comparison", op),
    }
}

fn float_predicate(op: BinaryOp) -> FloatPredicate {
    match op {
        BinaryOp::Equal => FloatPredicate::OEQ,
        BinaryOp::NotEqual => FloatPredicate::ONE,
        BinaryOp::Less => FloatPredicate::OLT,
        BinaryOp::LessEqual => FloatPredicate::OLE,
        BinaryOp::Greater => FloatPredicate::OGT,
        BinaryOp::GreaterEqual => FloatPredicate::OGE,
        _ => panic!("{:?} is not a comparison", op),
    }
}
