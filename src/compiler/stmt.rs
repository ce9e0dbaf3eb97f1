use std::collections::BTreeSet;

use inkwell::{
    basic_block::BasicBlock,
    values::{BasicMetadataValueEnum, BasicValueEnum, PhiValue},
};

use crate::{
    ast::{
        ast::{DeclId, Symbol},
        expressions::{ExprKind, Expression, Variable, VariableKind},
        statements::{Statement, StmtKind},
        types::Type,
    },
    errors::errors::CodegenError,
};

use super::{
    compiler::{const_zero, Compiler},
    environment::Environment,
    expr::{current_block, gen_call, gen_element_address, gen_expression, gen_jump, narrow_to_char},
    runtime::print_format,
};

type StmtResult<'a> = Result<Option<BasicBlock<'a>>, CodegenError>;

/// Generates a statement at the builder's position.
///
/// `environment` enters holding the value of every local before the
/// statement and leaves holding the values after it. Returns the block
/// where control continues, or `None` when every path through the
/// statement returned.
pub fn gen_statement<'a>(
    compiler: &Compiler<'_, 'a>,
    statement: &Statement,
    environment: &mut Environment<'a>,
) -> StmtResult<'a> {
    match &statement.kind {
        StmtKind::Block {
            declarations,
            statements,
        } => gen_block(compiler, declarations, statements, environment),
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => gen_if(
            compiler,
            condition,
            then_branch,
            else_branch.as_deref(),
            environment,
        ),
        StmtKind::While { condition, body } => gen_while(compiler, condition, body, environment),
        StmtKind::Assign { target, value } => {
            gen_assign(compiler, target, value, environment)?;
            Ok(Some(current_block(compiler)))
        }
        StmtKind::Delete(value) => {
            let array = gen_expression(compiler, value, environment)?.into_pointer_value();
            compiler.builder.build_free(array)?;
            Ok(Some(current_block(compiler)))
        }
        StmtKind::Print(arguments) => {
            gen_print(compiler, arguments, environment)?;
            Ok(Some(current_block(compiler)))
        }
        StmtKind::Return(value) => {
            gen_return(compiler, value.as_ref(), environment)?;
            Ok(None)
        }
        StmtKind::Call(call) => {
            if let ExprKind::Call { callee, arguments } = &call.kind {
                gen_call(compiler, callee, arguments, environment)?;
            } else {
                gen_expression(compiler, call, environment)?;
            }
            Ok(Some(current_block(compiler)))
        }
    }
}

/// Locals start out zeroed and are dropped from the environment when the
/// block ends.
fn gen_block<'a>(
    compiler: &Compiler<'_, 'a>,
    declarations: &[DeclId],
    statements: &[Statement],
    environment: &mut Environment<'a>,
) -> StmtResult<'a> {
    for id in declarations {
        let ty = compiler.convert_type(compiler.declaration(*id).ty);
        environment.bind(*id, const_zero(ty));
    }

    let mut exit = Some(current_block(compiler));
    for statement in statements {
        exit = gen_statement(compiler, statement, environment)?;
        if exit.is_none() {
            break;
        }
    }

    for id in declarations {
        environment.remove(*id);
    }

    Ok(exit)
}

fn gen_if<'a>(
    compiler: &Compiler<'_, 'a>,
    condition: &Expression,
    then_branch: &Statement,
    else_branch: Option<&Statement>,
    environment: &mut Environment<'a>,
) -> StmtResult<'a> {
    let then_block = compiler.create_basic_block("then");
    let else_block = compiler.create_basic_block("else");
    gen_jump(
        compiler,
        condition,
        then_block,
        else_block,
        environment,
        None,
        None,
    )?;

    let mut then_environment = environment.clone();
    compiler.builder.position_at_end(then_block);
    let then_exit = gen_statement(compiler, then_branch, &mut then_environment)?;

    // A missing else is an empty one
    let mut else_environment = environment.clone();
    compiler.builder.position_at_end(else_block);
    let else_exit = match else_branch {
        Some(else_branch) => gen_statement(compiler, else_branch, &mut else_environment)?,
        None => Some(else_block),
    };

    match (then_exit, else_exit) {
        (None, None) => Ok(None),
        (Some(exit), None) => {
            *environment = then_environment;
            compiler.builder.position_at_end(exit);
            Ok(Some(exit))
        }
        (None, Some(exit)) => {
            *environment = else_environment;
            compiler.builder.position_at_end(exit);
            Ok(Some(exit))
        }
        (Some(then_exit), Some(else_exit)) => {
            let out_block = compiler.create_basic_block("out");

            compiler.builder.position_at_end(then_exit);
            compiler.builder.build_unconditional_branch(out_block)?;
            compiler.builder.position_at_end(else_exit);
            compiler.builder.build_unconditional_branch(out_block)?;

            compiler.builder.position_at_end(out_block);
            *environment = Environment::merge(
                &compiler.builder,
                environment,
                (&then_environment, then_exit),
                (&else_environment, else_exit),
            )?;

            Ok(Some(out_block))
        }
    }
}

/// Compiles `while (c) s` as `if (c) do s while (c)`.
///
/// The condition is tested once in front of the loop and once at the bottom
/// of the body. Locals assigned in the body get a phi in the loop header and
/// another in the exit block. Their incoming edges are only known once the
/// body is compiled, so the phis are created empty and linked afterwards.
fn gen_while<'a>(
    compiler: &Compiler<'_, 'a>,
    condition: &Expression,
    body: &Statement,
    environment: &mut Environment<'a>,
) -> StmtResult<'a> {
    let loop_block = compiler.create_basic_block("loop");
    let end_block = compiler.create_basic_block("loop_end");

    let mut loop_from_entry = vec![];
    let mut end_from_entry = vec![];
    gen_jump(
        compiler,
        condition,
        loop_block,
        end_block,
        environment,
        Some(&mut loop_from_entry),
        Some(&mut end_from_entry),
    )?;

    let mut assigned = BTreeSet::new();
    collect_assigned(body, &mut assigned);
    let carried: Vec<DeclId> = assigned
        .into_iter()
        .filter(|id| environment.contains(*id))
        .collect();

    compiler.builder.position_at_end(loop_block);
    let mut loop_environment = environment.clone();
    let loop_phis = create_phis(compiler, &carried, environment)?;
    for (id, phi) in carried.iter().zip(&loop_phis) {
        loop_environment.bind(*id, phi.as_basic_value());
    }

    let body_exit = gen_statement(compiler, body, &mut loop_environment)?;

    // A body that always returns has no back edge
    let mut loop_from_body = vec![];
    let mut end_from_body = vec![];
    if body_exit.is_some() {
        gen_jump(
            compiler,
            condition,
            loop_block,
            end_block,
            &loop_environment,
            Some(&mut loop_from_body),
            Some(&mut end_from_body),
        )?;
    }

    compiler.builder.position_at_end(end_block);
    let end_phis = create_phis(compiler, &carried, environment)?;

    link_phis(
        &carried,
        &loop_phis,
        (&*environment, loop_from_entry.as_slice()),
        (&loop_environment, loop_from_body.as_slice()),
    );
    link_phis(
        &carried,
        &end_phis,
        (&*environment, end_from_entry.as_slice()),
        (&loop_environment, end_from_body.as_slice()),
    );

    for (id, phi) in carried.iter().zip(&end_phis) {
        environment.bind(*id, phi.as_basic_value());
    }

    Ok(Some(end_block))
}

/// One empty phi per local, typed like its current value.
fn create_phis<'a>(
    compiler: &Compiler<'_, 'a>,
    locals: &[DeclId],
    environment: &Environment<'a>,
) -> Result<Vec<PhiValue<'a>>, CodegenError> {
    let mut phis = Vec::with_capacity(locals.len());

    for id in locals {
        let value = environment
            .get(*id)
            .unwrap_or_else(|| panic!("Local {:?} has no value before the loop", id));
        let name = &compiler.declaration(*id).name;
        phis.push(compiler.builder.build_phi(value.get_type(), name)?);
    }

    Ok(phis)
}

/// Adds one incoming edge per arriving block: the value from the left
/// environment for blocks in the left list, and likewise on the right.
fn link_phis<'a>(
    locals: &[DeclId],
    phis: &[PhiValue<'a>],
    (left, left_arrivals): (&Environment<'a>, &[BasicBlock<'a>]),
    (right, right_arrivals): (&Environment<'a>, &[BasicBlock<'a>]),
) {
    for (id, phi) in locals.iter().zip(phis) {
        let sides = [(left, left_arrivals), (right, right_arrivals)];

        for (environment, arrivals) in sides {
            let value = environment
                .get(*id)
                .unwrap_or_else(|| panic!("Local {:?} lost its value in the loop", id));

            for block in arrivals {
                phi.add_incoming(&[(&value, *block)]);
            }
        }
    }
}

/// Locals written anywhere inside `statement`.
fn collect_assigned(statement: &Statement, assigned: &mut BTreeSet<DeclId>) {
    match &statement.kind {
        StmtKind::Block { statements, .. } => {
            for statement in statements {
                collect_assigned(statement, assigned);
            }
        }
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            collect_assigned(then_branch, assigned);
            if let Some(else_branch) = else_branch {
                collect_assigned(else_branch, assigned);
            }
        }
        StmtKind::While { body, .. } => collect_assigned(body, assigned),
        StmtKind::Assign {
            target:
                Variable {
                    kind: VariableKind::Reference(Symbol::Resolved(id)),
                    ..
                },
            ..
        } => {
            assigned.insert(*id);
        }
        _ => {}
    }
}

/// A local assignment only rebinds the variable; globals and array
/// elements are stored to memory.
fn gen_assign<'a>(
    compiler: &Compiler<'_, 'a>,
    target: &Variable,
    value: &Expression,
    environment: &mut Environment<'a>,
) -> Result<(), CodegenError> {
    let mut value = gen_expression(compiler, value, environment)?;
    if target.ty.is_char() {
        value = narrow_to_char(compiler, value)?;
    }

    match &target.kind {
        VariableKind::Reference(Symbol::Resolved(id)) => match compiler.globals.get(id) {
            Some(global) => {
                compiler.builder.build_store(*global, value)?;
            }
            None => environment.bind(*id, value),
        },
        VariableKind::Reference(Symbol::Name(name)) => {
            panic!("Assignment to unresolved variable {:?}", name)
        }
        VariableKind::Array { location, offset } => {
            let address = gen_element_address(compiler, location, offset, environment)?;
            compiler.builder.build_store(address, value)?;
        }
    }

    Ok(())
}

/// `print` is one `printf` call. Floats are promoted to `double` and
/// booleans print as `true`/`false`.
fn gen_print<'a>(
    compiler: &Compiler<'_, 'a>,
    arguments: &[Expression],
    environment: &Environment<'a>,
) -> Result<(), CodegenError> {
    let types: Vec<Type> = arguments.iter().map(|argument| argument.ty).collect();
    let format = compiler
        .builder
        .build_global_string_ptr(&print_format(&types), "format")?
        .as_pointer_value();

    let mut values: Vec<BasicMetadataValueEnum<'a>> = vec![format.into()];

    for argument in arguments {
        if argument.ty.is_void() {
            // Still run the call for its effects
            if let ExprKind::Call { callee, arguments } = &argument.kind {
                gen_call(compiler, callee, arguments, environment)?;
            }
            continue;
        }

        let value = gen_expression(compiler, argument, environment)?;

        let value: BasicValueEnum<'a> = if argument.ty.is_float() {
            compiler
                .builder
                .build_float_ext(value.into_float_value(), compiler.context.f64_type(), "")?
                .into()
        } else if argument.ty.is_bool() {
            compiler.builder.build_select(
                value.into_int_value(),
                compiler.string("true"),
                compiler.string("false"),
                "",
            )?
        } else {
            value
        };

        values.push(value.into());
    }

    compiler
        .builder
        .build_call(compiler.runtime.printf, &values, "")?;

    Ok(())
}

fn gen_return<'a>(
    compiler: &Compiler<'_, 'a>,
    value: Option<&Expression>,
    environment: &Environment<'a>,
) -> Result<(), CodegenError> {
    match value {
        None => {
            compiler.builder.build_return(None)?;
        }
        Some(Expression {
            kind: ExprKind::Call { callee, arguments },
            ty,
            ..
        }) if ty.is_void() => {
            gen_call(compiler, callee, arguments, environment)?;
            compiler.builder.build_return(None)?;
        }
        Some(value) => {
            let mut result = gen_expression(compiler, value, environment)?;
            if compiler.return_type.is_char() {
                result = narrow_to_char(compiler, result)?;
            }
            compiler.builder.build_return(Some(&result))?;
        }
    }

    Ok(())
}
