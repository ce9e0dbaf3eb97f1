//! Integration tests for end-to-end compilation.
//!
//! These tests verify that the complete compilation pipeline works correctly
//! from source code through tokenization, parsing, type checking, LLVM IR
//! generation and execution.

use std::process::Command;

use inkwell::{
    context::Context,
    targets::{InitializationConfig, Target},
    OptimizationLevel,
};
use phic::{
    compile_source,
    errors::errors::{CompileFailure, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse,
    run_main,
    type_checker::type_checker::type_check,
    write_bitcode,
};

fn diagnostic(source: &str) -> phic::errors::errors::Error {
    let context = Context::create();
    let result = compile_source(source, &context, "test");
    match result {
        Err(CompileFailure::Diagnostic(error)) => error,
        Err(other) => panic!("Expected a diagnostic, got {:?}", other),
        Ok(_) => panic!("Expected {:?} to fail", source),
    }
}

#[test]
fn test_global_loop_program() {
    let source = "int x;
    void f() {
        x = 1;
        while (x < 5) x = x + 1;
        print x;
    }
    int main() {
        f();
        return x;
    }";

    let context = Context::create();
    let module = compile_source(source, &context, "test").unwrap();

    // Globals live in memory, so the loop needs no phis
    let ir = module.print_to_string().to_string();
    assert!(!ir.contains("phi"));

    assert_eq!(run_main(&module).unwrap(), 5);
}

#[test]
fn test_binary_prints_global_loop_result() {
    let path = std::env::temp_dir().join("phic_global_loop.phi");
    std::fs::write(
        &path,
        "int x;
        void f() {
            x = 1;
            while (x < 5) x = x + 1;
            print x;
        }
        void main() {
            f();
        }",
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_phic"))
        .arg(&path)
        .output()
        .unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "5\n");
}

#[test]
fn test_void_variable_is_a_diagnostic() {
    let error = diagnostic("void g;
int main() { return 0; }");

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
    assert_eq!(error.get_line(), 1);

    let error = diagnostic("int main() {
 int[] a;
 a = new void[3];
 return 0;
}");

    assert_eq!(error.get_line(), 3);
}

#[test]
fn test_arity_mismatch() {
    let error = diagnostic(
        "int add(int a, int b) { return a + b; }
        int main() {
            return add(1);
        }",
    );

    assert_eq!(error.get_error_name(), "ArityMismatch");
    assert_eq!(error.get_line(), 3);
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::ArityMismatch {
            function: "add".to_string(),
            expected: 2,
            received: 1,
        }
    );
}

#[test]
fn test_missing_return() {
    let error = diagnostic("int f(bool b) {\n if (b) return 1;\n}");

    assert_eq!(error.get_error_name(), "MissingReturn");
    assert_eq!(error.get_line(), 1);
}

#[test]
fn test_unreachable_statement() {
    let error = diagnostic("void f() {\n return;\n print 1;\n}");

    assert_eq!(error.get_error_name(), "UnreachableStatement");
    assert_eq!(error.get_line(), 3);
}

#[test]
fn test_analysis_runs_once() {
    let mut program = parse(tokenize("float f() { return 1; }".to_string()).unwrap()).unwrap();

    type_check(&mut program).unwrap();
    let analyzed = program.clone();
    type_check(&mut program).unwrap();

    assert_eq!(program, analyzed);
}

#[test]
fn test_program_with_everything() {
    let source = "
    // Sieve of Eratosthenes
    bool[] composite;

    int count_primes(int limit) {
        int i, j, count;
        composite = new bool[limit + 1];
        while (i <= limit) {
            composite[i] = false;
            i = i + 1;
        }
        i = 2;
        while (i <= limit) {
            if (!composite[i]) {
                count = count + 1;
                j = i * i;
                while (j <= limit) {
                    composite[j] = true;
                    j = j + i;
                }
            }
            i = i + 1;
        }
        delete composite;
        return count;
    }

    float average(int[] values, int n) {
        int i;
        float total;
        while (i < n) {
            total = total + values[i];
            i = i + 1;
        }
        return total / n;
    }

    int main() {
        int[] values;
        int primes, result;
        values = new int[3];
        values[0] = 1;
        values[1] = 2;
        values[2] = 6;
        primes = count_primes(30);
        print \"primes: \", primes;
        print \"average: \", average(values, 3);
        if (primes == 10 && average(values, 3) == 3.0 || false) result = primes;
        delete values;
        return result;
    }";

    let context = Context::create();
    let module = compile_source(source, &context, "test").unwrap();

    assert_eq!(run_main(&module).unwrap(), 10);
}

#[test]
fn test_write_bitcode() {
    let context = Context::create();
    let module = compile_source("int main() { return 0; }", &context, "test").unwrap();
    let path = std::env::temp_dir().join("phic_integration_test.bc");

    write_bitcode(&module, &path).unwrap();

    assert!(std::fs::metadata(&path).unwrap().len() > 0);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_call_with_jit_directly() {
    let source = "float scale(float x, int factor) { return x * factor; }";

    let context = Context::create();
    let module = compile_source(source, &context, "test").unwrap();
    Target::initialize_native(&InitializationConfig::default()).unwrap();
    let engine = module
        .create_jit_execution_engine(OptimizationLevel::None)
        .unwrap();

    let result = unsafe {
        engine
            .get_function::<unsafe extern "C" fn(f32, i32) -> f32>("scale")
            .unwrap()
            .call(1.5, 4)
    };

    assert_eq!(result, 6.0);
}
