//! kame CLI — compile, run, and step block programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/file/JSON error
//! - 2: Compile error
//! - 3: Runtime error

mod commands;

use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "compile" => commands::compile(&args[2..]),
        "run" => commands::run(&args[2..]),
        "step" => commands::step(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn print_usage() {
    eprintln!("Usage: kame <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  compile <program.json>                      Print the compiled tagged source");
    eprintln!("  run <program.json> [--grid N] [--speed L] [--free]");
    eprintln!("                                              Execute and print the final state");
    eprintln!("  step <program.json> <K>                     Replay to step K and print the state");
}
