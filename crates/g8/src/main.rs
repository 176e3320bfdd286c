//! `g8` — the Girder JavaScript shell.
//!
//! Runs script files in one shared global context, evaluates inline source
//! with `-e`, dumps parsed ASTs as JSON with `--dump-ast`, and drops into a
//! line-based REPL when given nothing to run. Exit code 0 on normal
//! completion; 1 with the error's `toString()` on stderr for uncaught
//! throws and parse errors.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use girder_core::parser::dump;
use girder_core::runtime::completion::Completion;
use girder_core::{parse_string, Interpreter, Value};

/// The Girder JavaScript shell.
#[derive(Parser)]
#[command(name = "g8", version, about)]
struct Cli {
    /// Script files to execute, in order, in one shared context.
    scripts: Vec<PathBuf>,

    /// Evaluate SOURCE instead of reading script files.
    #[arg(short = 'e', long = "eval", value_name = "SOURCE")]
    eval: Option<String>,

    /// Print the parsed AST as JSON instead of evaluating.
    #[arg(long)]
    dump_ast: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("g8: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.dump_ast {
        return dump_asts(&cli);
    }

    let mut interp = Interpreter::new();

    if let Some(source) = &cli.eval {
        let ok = execute(&mut interp, source, "<eval>");
        return Ok(exit_code(ok));
    }

    if cli.scripts.is_empty() {
        repl(&mut interp)?;
        return Ok(ExitCode::SUCCESS);
    }

    for path in &cli.scripts {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let name = path.display().to_string();
        if !execute(&mut interp, &source, &name) {
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Parse and run one source; uncaught throws and parse errors go to
/// stderr. Returns `false` on either failure.
fn execute(interp: &mut Interpreter, source: &str, name: &str) -> bool {
    let program = match parse_string(source, Some(name)) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("{err}");
            return false;
        }
    };
    match interp.run_program(&program) {
        Completion::Throw(thrown) => {
            eprintln!("Uncaught {}", render_error(interp, &thrown));
            false
        }
        _ => true,
    }
}

/// An uncaught value renders via its `toString` (Error objects produce
/// `"TypeError: …"` shapes); a value whose `toString` itself throws falls
/// back to its type.
fn render_error(interp: &mut Interpreter, thrown: &Value) -> String {
    interp.to_display_string(thrown)
}

fn dump_asts(cli: &Cli) -> Result<ExitCode> {
    let mut sources: Vec<(String, String)> = Vec::new();
    if let Some(source) = &cli.eval {
        sources.push(("<eval>".to_string(), source.clone()));
    }
    for path in &cli.scripts {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        sources.push((path.display().to_string(), text));
    }
    for (name, text) in sources {
        match parse_string(&text, Some(&name)) {
            Ok(program) => {
                let json = dump::program_to_json(&program);
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            Err(err) => {
                eprintln!("{err}");
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Line-based REPL: each line parses and runs in the shared context; the
/// completion value echoes back.
fn repl(interp: &mut Interpreter) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("g8> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ".exit" {
            return Ok(());
        }
        match parse_string(line, Some("<repl>")) {
            Err(err) => eprintln!("{err}"),
            Ok(program) => match interp.run_program(&program) {
                Completion::Throw(thrown) => {
                    let rendered = render_error(interp, &thrown);
                    eprintln!("Uncaught {rendered}");
                }
                completion => {
                    let value = completion.value().cloned().unwrap_or(Value::Undefined);
                    let rendered = interp.to_display_string(&value);
                    println!("{rendered}");
                }
            },
        }
    }
}
