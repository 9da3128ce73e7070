//! EXA program runner.
//!
//! Parses an `.exa` program, runs it against an in-memory file store and
//! prints the final registers.
//!
//! # Usage
//! ```text
//! exa <program.exa> [OPTIONS]
//! ```
//!
//! # Options
//! - `-f, --file <ID=ROWS>`: Seed file `ID` with comma-separated rows (repeatable)
//! - `-v, --verbose`: Trace every executed instruction
//! - `-d, --dump-files`: Print the file store after the run
//!
//! # Environment
//! - `EXA_LOG`: Minimum log level (`debug`, `info`, `warn`, `error`)
//!
//! # Examples
//! ```text
//! exa sum.exa --file 100=1,265,3,6,557,4
//! exa sum.exa -f 100=1,2 -f 200= --dump-files
//! ```

use exa::utils::log::{self, Level};
use exa::virtual_machine::files::FileStore;
use exa::virtual_machine::parser::parse_file;
use exa::virtual_machine::vm::VM;
use exa::{debug, error, info, warn};
use std::env;
use std::process;

const LOG_ENV: &str = "EXA_LOG";

fn main() {
    let args: Vec<String> = env::args().collect();
    let exe = program_name(&args);

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(exe);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    init_log_level();

    let program_path = &args[1];
    let mut store = FileStore::new();
    let mut dump_files = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            k @ ("--file" | "-f") => {
                i += 1;
                if i >= args.len() {
                    error!("{k} requires an argument");
                    process::exit(1);
                }
                if let Err(e) = store.seed_from_spec(&args[i]) {
                    error!("{e}");
                    process::exit(1);
                }
                i += 1;
            }
            "--verbose" | "-v" => {
                log::set_max_level(Level::Debug);
                i += 1;
            }
            "--dump-files" | "-d" => {
                dump_files = true;
                i += 1;
            }
            other => {
                error!("Unexpected argument: {}\n", other);
                print_usage(exe);
                process::exit(1);
            }
        }
    }

    let program = match parse_file(program_path) {
        Ok(p) => p,
        Err(e) => {
            error!("Parsing failed: {}", e);
            process::exit(1);
        }
    };
    info!(
        "Loaded {} ({} instructions, {} labels)",
        program_path,
        program.len(),
        program.labels().len()
    );
    if store.is_empty() {
        debug!("No files seeded");
    }

    let mut vm = VM::new(program);
    let registers = match vm.run(&mut store) {
        Ok(r) => r,
        Err(e) => {
            error!("Execution failed after {} steps: {}", vm.steps(), e);
            process::exit(1);
        }
    };
    if registers.held {
        warn!(
            "Program ended still holding file {}",
            registers.file_id.as_deref().unwrap_or_default()
        );
    }

    println!("{registers}");
    if dump_files {
        print!("{store}");
    }
}

/// Applies `EXA_LOG` when it names a known level.
fn init_log_level() {
    let Ok(name) = env::var(LOG_ENV) else {
        return;
    };
    match Level::parse(&name) {
        Some(level) => log::set_max_level(level),
        None => warn!("Ignoring {LOG_ENV}={name}: unknown log level"),
    }
}

/// Name to show in usage text; argv may be empty.
fn program_name(args: &[String]) -> &str {
    args.first().map_or("exa", String::as_str)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <program.exa> [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -f, --file <ID=ROWS>  Seed a file, e.g. 100=1,265,3 (repeatable)");
    eprintln!("  -v, --verbose         Trace every executed instruction");
    eprintln!("  -d, --dump-files      Print the file store after the run");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  {LOG_ENV}=<level>     debug, info, warn or error");
}
