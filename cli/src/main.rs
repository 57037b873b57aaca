//! Breeze CLI - compiles a .bz source file to a native executable.
//!
//! The pipeline is strictly linear and fails fast: scan, parse, analyze,
//! emit C, invoke the C compiler, run the result. A phase that reported
//! errors stops the run with a DATAERR exit.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};
use std::time::Instant;

use breeze_lang::codegen::{CompileError, Compiler};
use breeze_lang::diagnostics::Reporter;
use breeze_lang::lexer;
use breeze_lang::parser;
use breeze_lang::source::SourceFile;
use breeze_lang::types;

mod output;

// BSD sysexits
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;
const EX_OSERR: u8 = 71;
const EX_OSFILE: u8 = 72;
const EX_IOERR: u8 = 74;

/// Breeze compiler - compiles .bz sources to native executables via C
#[derive(Parser, Debug)]
#[command(name = "breeze")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The .bz source file to compile
    script: PathBuf,

    /// Executable output path (defaults to the script path without extension)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Compile only; do not run the produced executable
    #[arg(short = 'e', long = "emit")]
    emit: bool,

    /// Stop after static analysis; no C is written and no compiler is spawned
    #[arg(short = 'c', long = "check")]
    check: bool,

    /// Print collected diagnostics as JSON on stdout
    #[arg(long = "json")]
    json: bool,

    /// Disable ANSI colors in diagnostics
    #[arg(long = "no-color")]
    no_color: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut file = SourceFile::new(&args.script);
    if let Err(err) = file.validate() {
        let mut reporter = Reporter::new(args.script.display().to_string(), "");
        if args.no_color {
            reporter.set_color(false);
        }
        reporter.error_message(&format!(
            "Could not validate path {}: {}",
            args.script.display(),
            err
        ));
        return finish(&reporter, &args, EX_OSFILE);
    }

    let source = match file.content() {
        Ok(source) => source,
        Err(_) => {
            let mut reporter = Reporter::new(file.display_path(), "");
            if args.no_color {
                reporter.set_color(false);
            }
            reporter.error_message(&format!("Could not read {}", file.display_path()));
            return finish(&reporter, &args, EX_OSFILE);
        }
    };

    let mut reporter = Reporter::new(file.display_path(), &source);
    if args.no_color {
        reporter.set_color(false);
    }

    let (tokens, had_error) = lexer::lex(&source, &mut reporter);
    if had_error {
        reporter.error_message("Scanning phase failed");
        return finish(&reporter, &args, EX_DATAERR);
    }

    for token in &tokens {
        println!("{}", token);
    }

    let (mut nodes, had_error) = parser::parse(tokens, &mut reporter);
    if had_error {
        reporter.error_message("Parsing phase failed");
        return finish(&reporter, &args, EX_DATAERR);
    }

    for node in &nodes {
        println!("{}", node);
    }

    let had_error = types::analyze(&mut nodes, &mut reporter);
    if had_error {
        reporter.error_message("Static analyzing phase failed");
        return finish(&reporter, &args, EX_DATAERR);
    }

    if args.check {
        return finish(&reporter, &args, 0);
    }

    // Analysis rejects error nodes, so this only fires on a compiler bug
    if nodes.iter().any(|node| node.contains_err()) {
        reporter.error_message("Error node survived analysis");
        return finish(&reporter, &args, EX_SOFTWARE);
    }

    let executable = args
        .output
        .clone()
        .unwrap_or_else(|| file.path().with_extension(""));

    let compiler = Compiler::new();
    match compiler.compile_to_executable(file.path(), &nodes, &executable) {
        Ok(c_path) => {
            println!("Compiled to: {} (via {})", executable.display(), c_path.display());
        }
        Err(err @ CompileError::Io(_)) => {
            reporter.error_message(&err.to_string());
            return finish(&reporter, &args, EX_IOERR);
        }
        Err(err) => {
            reporter.error_message(&err.to_string());
            return finish(&reporter, &args, EX_SOFTWARE);
        }
    }

    if args.emit {
        return finish(&reporter, &args, 0);
    }

    let started = Instant::now();
    match Command::new(spawn_path(&executable)).output() {
        Ok(run) => {
            print!("{}", String::from_utf8_lossy(&run.stderr));
            print!("{}", String::from_utf8_lossy(&run.stdout));
            println!("Exit Code: {}", run.status.code().unwrap_or(-1));
            println!("Execution took: {}ms", started.elapsed().as_millis());
            finish(&reporter, &args, 0)
        }
        Err(err) => {
            reporter.error_message(&format!(
                "Failed to run {}: {}",
                executable.display(),
                err
            ));
            finish(&reporter, &args, EX_OSERR)
        }
    }
}

/// A bare relative name would be resolved against PATH; anchor it to the
/// current directory instead
fn spawn_path(executable: &Path) -> PathBuf {
    if executable.is_relative() && executable.components().count() == 1 {
        Path::new(".").join(executable)
    } else {
        executable.to_path_buf()
    }
}

fn finish(reporter: &Reporter, args: &Args, code: u8) -> ExitCode {
    if args.json {
        println!("{}", output::diagnostics_json(reporter));
    }
    if code == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(code)
    }
}
