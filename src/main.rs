use std::{
    env,
    fs::read_to_string,
    io::{self, Read},
    path::PathBuf,
    process,
    time::Instant,
};

use inkwell::context::Context;
use phic::{
    compiler::compiler::compile, display_error, errors::errors::Error, lexer::lexer::tokenize,
    parser::parser::parse, run_main, type_checker::type_checker::type_check, write_bitcode,
};

const USAGE: &str = "usage: phic [--emit-bytecode] [--dump] [--no-execute] [file]

Compiles a source file (or standard input) and runs its main function.

  --emit-bytecode  write the module to out.bc
  --dump           print the LLVM IR to stderr
  --no-execute     do not run main
  -h, --help       show this message";

struct Options {
    emit_bytecode: bool,
    dump: bool,
    execute: bool,
    file: Option<PathBuf>,
}

fn parse_arguments(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        emit_bytecode: false,
        dump: false,
        execute: true,
        file: None,
    };

    for arg in args {
        match arg.as_str() {
            "--emit-bytecode" => options.emit_bytecode = true,
            "--dump" => options.dump = true,
            "--no-execute" => options.execute = false,
            "-h" | "--help" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option {}", flag)),
            path if options.file.is_none() => options.file = Some(PathBuf::from(path)),
            _ => return Err(String::from("only one source file may be given")),
        }
    }

    Ok(options)
}

fn read_source(file: &Option<PathBuf>) -> io::Result<String> {
    match file {
        Some(path) => read_to_string(path),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn fail(error: Error, source: &str, file_name: &str) -> ! {
    display_error(&error, source, file_name);
    process::exit(1)
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_arguments(&args).unwrap_or_else(|message| {
        eprintln!("{}\n\n{}", message, USAGE);
        process::exit(1)
    });

    let file_name = options
        .file
        .as_ref()
        .map(|path| path.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("<stdin>"));

    let source = read_source(&options.file).unwrap_or_else(|error| {
        eprintln!("Failed to read {}: {}", file_name, error);
        process::exit(1)
    });

    let start = Instant::now();

    let tokens = tokenize(source.clone()).unwrap_or_else(|error| fail(error, &source, &file_name));
    eprintln!("Tokenized in {:?}", start.elapsed());

    let parse_start = Instant::now();
    let mut program = parse(tokens).unwrap_or_else(|error| fail(error, &source, &file_name));
    eprintln!("Parsed in {:?}", parse_start.elapsed());

    let type_check_start = Instant::now();
    if let Err(error) = type_check(&mut program) {
        fail(error, &source, &file_name);
    }
    eprintln!("Type checked in {:?}", type_check_start.elapsed());

    let context = Context::create();
    let compile_start = Instant::now();
    let module = compile(&program, &context, &file_name).unwrap_or_else(|error| {
        eprintln!("Error: {}", error);
        process::exit(1)
    });
    eprintln!("Compiled in {:?}", compile_start.elapsed());
    eprintln!("Total time for IR generation: {:?}", start.elapsed());

    if options.dump {
        eprintln!("{}", module.print_to_string().to_string());
    }

    if options.emit_bytecode {
        if let Err(error) = write_bitcode(&module, &PathBuf::from("out.bc")) {
            eprintln!("Error: {}", error);
            process::exit(1);
        }
        eprintln!("Wrote out.bc");
    }

    if !options.execute {
        return;
    }

    match run_main(&module) {
        Ok(code) => process::exit(code),
        Err(error) => {
            eprintln!("Error: {}", error);
            process::exit(1)
        }
    }
}
