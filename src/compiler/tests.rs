//! Unit tests for the code generator.
//!
//! IR shape is checked through inkwell; behavior is checked by JIT-running
//! the generated functions.

use inkwell::{
    context::Context,
    execution_engine::ExecutionEngine,
    module::Module,
    targets::{InitializationConfig, Target},
    values::{BasicValue, BasicValueEnum, InstructionOpcode},
    OptimizationLevel,
};

use super::{environment::Environment, runtime::print_format};
use crate::{
    ast::{ast::DeclId, types::Type},
    compile_source,
    errors::errors::{CodegenError, CompileFailure},
    run_main,
};

fn jit<'ctx>(module: &Module<'ctx>) -> ExecutionEngine<'ctx> {
    Target::initialize_native(&InitializationConfig::default()).unwrap();
    module
        .create_jit_execution_engine(OptimizationLevel::None)
        .unwrap()
}

fn call_int(source: &str, name: &str) -> i32 {
    let context = Context::create();
    let module = compile_source(source, &context, "test").unwrap();
    let engine = jit(&module);

    let result = unsafe {
        engine
            .get_function::<unsafe extern "C" fn() -> i32>(name)
            .unwrap()
            .call()
    };
    result
}

fn call_int_with(source: &str, name: &str, argument: i32) -> i32 {
    let context = Context::create();
    let module = compile_source(source, &context, "test").unwrap();
    let engine = jit(&module);

    let result = unsafe {
        engine
            .get_function::<unsafe extern "C" fn(i32) -> i32>(name)
            .unwrap()
            .call(argument)
    };
    result
}

fn is_phi(value: BasicValueEnum) -> bool {
    value
        .as_instruction_value()
        .is_some_and(|instruction| instruction.get_opcode() == InstructionOpcode::Phi)
}

#[test]
fn test_environment_merge_only_changed_variables() {
    let context = Context::create();
    let module = context.create_module("merge");
    let builder = context.create_builder();
    let function = module.add_function("f", context.void_type().fn_type(&[], false), None);
    let left_block = context.append_basic_block(function, "left");
    let right_block = context.append_basic_block(function, "right");
    let merge_block = context.append_basic_block(function, "merge");

    let i32_type = context.i32_type();
    let (x, y) = (DeclId(0), DeclId(1));

    let mut before = Environment::new();
    before.bind(x, i32_type.const_int(1, false).into());
    before.bind(y, i32_type.const_int(2, false).into());

    let mut left = before.clone();
    left.bind(x, i32_type.const_int(3, false).into());
    let right = before.clone();

    builder.position_at_end(merge_block);
    let merged =
        Environment::merge(&builder, &before, (&left, left_block), (&right, right_block)).unwrap();

    assert_eq!(merged.len(), 2);
    assert_eq!(merged.get(y), before.get(y));

    let x_value = merged.get(x).unwrap();
    assert!(is_phi(x_value));
    let phi = x_value.as_instruction_value().unwrap();
    assert_eq!(phi.get_num_operands(), 2);
    assert_eq!(phi.get_parent(), Some(merge_block));
}

#[test]
fn test_environment_merge_missing_side_uses_value_before_branch() {
    let context = Context::create();
    let module = context.create_module("merge");
    let builder = context.create_builder();
    let function = module.add_function("f", context.void_type().fn_type(&[], false), None);
    let left_block = context.append_basic_block(function, "left");
    let right_block = context.append_basic_block(function, "right");
    let merge_block = context.append_basic_block(function, "merge");

    let i32_type = context.i32_type();
    let x = DeclId(7);

    let mut before = Environment::new();
    before.bind(x, i32_type.const_int(1, false).into());

    let left = before.clone();
    let mut right = before.clone();
    right.remove(x);

    builder.position_at_end(merge_block);
    let merged =
        Environment::merge(&builder, &before, (&left, left_block), (&right, right_block)).unwrap();

    assert_eq!(merged.get(x), before.get(x));
    assert!(merge_block.get_first_instruction().is_none());
}

#[test]
fn test_environment_clone_is_independent() {
    let context = Context::create();
    let i32_type = context.i32_type();

    let mut original = Environment::new();
    original.bind(DeclId(0), i32_type.const_int(1, false).into());

    let mut copy = original.clone();
    copy.bind(DeclId(0), i32_type.const_int(2, false).into());
    copy.bind(DeclId(1), i32_type.const_int(3, false).into());

    assert_eq!(
        original.get(DeclId(0)),
        Some(i32_type.const_int(1, false).as_basic_value_enum())
    );
    assert!(!original.contains(DeclId(1)));
    assert_eq!(copy.len(), 2);
}

#[test]
fn test_print_format() {
    assert_eq!(print_format(&[Type::INT]), "%d\n");
    assert_eq!(print_format(&[Type::STRING]), "%s");
    assert_eq!(print_format(&[Type::STRING, Type::INT]), "%s%d\n");
    assert_eq!(
        print_format(&[Type::FLOAT, Type::BOOL, Type::INT.array_of()]),
        "%f%s%p\n"
    );
    assert_eq!(print_format(&[Type::VOID]), "<void>\n");
}

#[test]
fn test_both_arms_return_has_no_merge_block() {
    let source = "int f() { if (true) return 1; else return 2; }";

    let context = Context::create();
    let module = compile_source(source, &context, "test").unwrap();
    let f = module.get_function("f").unwrap();

    let names: Vec<String> = f
        .get_basic_blocks()
        .iter()
        .map(|block| block.get_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["entry", "then", "else"]);

    assert_eq!(call_int(source, "f"), 1);
}

#[test]
fn test_if_merges_reassigned_local() {
    let source = "int f(int a) {
        int x, y;
        x = 1;
        y = 2;
        if (a > 0) x = 10;
        return x + y;
    }";

    assert_eq!(call_int_with(source, "f", 1), 12);
    assert_eq!(call_int_with(source, "f", 0), 3);

    let context = Context::create();
    let module = compile_source(source, &context, "test").unwrap();
    let out = module
        .get_function("f")
        .unwrap()
        .get_basic_blocks()
        .into_iter()
        .find(|block| block.get_name().to_str() == Ok("out"))
        .unwrap();

    // Only x changed, so only x needs a phi
    let first = out.get_first_instruction().unwrap();
    assert_eq!(first.get_opcode(), InstructionOpcode::Phi);
    assert_ne!(
        first.get_next_instruction().map(|i| i.get_opcode()),
        Some(InstructionOpcode::Phi)
    );
}

#[test]
fn test_one_arm_returns_keeps_other_environment() {
    let source = "int f(int a) {
        int x;
        x = 5;
        if (a == 0) return 0; else x = x * 2;
        return x;
    }";

    assert_eq!(call_int_with(source, "f", 0), 0);
    assert_eq!(call_int_with(source, "f", 3), 10);
}

#[test]
fn test_while_loop_locals() {
    let source = "int sum(int n) {
        int i, s;
        i = 0;
        s = 0;
        while (i < n) {
            s = s + i;
            i = i + 1;
        }
        return s;
    }";

    assert_eq!(call_int_with(source, "sum", 5), 10);
    assert_eq!(call_int_with(source, "sum", 0), 0);
}

#[test]
fn test_while_phis_only_for_assigned_locals() {
    let source = "int f(int n) {
        int i, k;
        k = 3;
        while (i < n) i = i + k;
        return i;
    }";

    let context = Context::create();
    let module = compile_source(source, &context, "test").unwrap();
    let blocks = module.get_function("f").unwrap().get_basic_blocks();

    for name in ["loop", "loop_end"] {
        let block = blocks
            .iter()
            .find(|block| block.get_name().to_str() == Ok(name))
            .unwrap();
        let first = block.get_first_instruction().unwrap();

        assert_eq!(first.get_opcode(), InstructionOpcode::Phi);
        assert_ne!(
            first.get_next_instruction().map(|i| i.get_opcode()),
            Some(InstructionOpcode::Phi)
        );
    }

    assert_eq!(call_int_with(source, "f", 10), 12);
}

#[test]
fn test_nested_loops() {
    let source = "int f(int n) {
        int i, j, count;
        while (i < n) {
            j = 0;
            while (j < i) {
                if (j == 2) count = count + 10; else count = count + 1;
                j = j + 1;
            }
            i = i + 1;
        }
        return count;
    }";

    // Pairs j < i for i < 5: 10 in total, 2 of them with j == 2
    assert_eq!(call_int_with(source, "f", 5), 28);
}

#[test]
fn test_loop_body_that_returns() {
    let source = "int f(int n) {
        while (n > 0) return n * 2;
        return 0 - 1;
    }";

    assert_eq!(call_int_with(source, "f", 4), 8);
    assert_eq!(call_int_with(source, "f", 0), -1);
}

#[test]
fn test_short_circuit_in_conditions() {
    let source = "int f(int a) {
        if (a != 0 && 10 / a > 2) return 1;
        if (!(a == 0) || false) return 2;
        return 3;
    }";

    assert_eq!(call_int_with(source, "f", 0), 3);
    assert_eq!(call_int_with(source, "f", 2), 1);
    assert_eq!(call_int_with(source, "f", 5), 2);
}

#[test]
fn test_short_circuit_values() {
    let source = "int f(int a) {
        bool b;
        b = a == 0 || 10 / a > 2;
        if (b) return 1;
        return 0;
    }";

    assert_eq!(call_int_with(source, "f", 0), 1);
    assert_eq!(call_int_with(source, "f", 3), 1);
    assert_eq!(call_int_with(source, "f", 4), 0);
}

#[test]
fn test_numeric_conversions() {
    let source = "int f() {
        float x;
        x = 7;
        x = x / 2;
        return x;
    }
    int g() {
        char c;
        c = 300;
        return c;
    }";

    assert_eq!(call_int(source, "f"), 3);
    assert_eq!(call_int(source, "g"), 44);
}

#[test]
fn test_char_parameters_and_results() {
    let source = "char next(char c) { return c + 1; }
    int f() { return next(65) + next(255); }";

    assert_eq!(call_int(source, "f"), 66);
}

#[test]
fn test_globals_and_arrays() {
    let source = "int[] a;
    int total;
    int f() {
        int i;
        a = new int[4];
        while (i < 4) {
            a[i] = i * i;
            total = total + a[i];
            i = i + 1;
        }
        delete a;
        return total;
    }";

    assert_eq!(call_int(source, "f"), 14);
}

#[test]
fn test_array_null_comparison() {
    let source = "int f() {
        float[] values;
        if (values == null) values = new float[1];
        values[0] = 2.5;
        if (values != null) return values[0] * 2;
        return 0;
    }";

    assert_eq!(call_int(source, "f"), 5);
}

#[test]
fn test_prototype_and_recursion() {
    let source = "int fib(int n);
    int main() { return fib(10); }
    int fib(int n) {
        if (n < 2) return n;
        return fib(n - 1) + fib(n - 2);
    }";

    let context = Context::create();
    let module = compile_source(source, &context, "test").unwrap();

    assert_eq!(run_main(&module).unwrap(), 55);
}

#[test]
fn test_void_main_returns_zero() {
    let context = Context::create();
    let module = compile_source("int x; void main() { x = 3; }", &context, "test").unwrap();

    assert_eq!(run_main(&module).unwrap(), 0);
}

#[test]
fn test_missing_main() {
    let context = Context::create();
    let module = compile_source("int f() { return 1; }", &context, "test").unwrap();

    assert!(matches!(run_main(&module), Err(CodegenError::MissingMain)));
}

#[test]
fn test_print_emits_format() {
    let source = "void f(int[] a) { print 1, \" \", 2.5, true; print \"no newline\"; print a; }";

    let context = Context::create();
    let module = compile_source(source, &context, "test").unwrap();
    let ir = module.print_to_string().to_string();

    assert!(ir.contains("c\"%d%s%f%s\\0A\\00\""));
    assert!(ir.contains("c\"no newline\\00\""));
    assert!(ir.contains("c\"%p\\0A\\00\""));
    assert!(ir.contains("call i32 (i8*, ...) @printf"));
}

#[test]
fn test_front_end_errors_surface_as_diagnostics() {
    let context = Context::create();
    let failure = compile_source("int f() { return true; }", &context, "test").unwrap_err();

    match failure {
        CompileFailure::Diagnostic(error) => assert_eq!(error.get_error_name(), "TypeMismatch"),
        other => panic!("Expected a diagnostic, got {:?}", other),
    }
}
