//! CLI command implementations.

use std::fs;

use serde::{Deserialize, Serialize};

use kame_common::{line::render, Block, BlockSpec, Program, RunConfig};
use kame_compiler::{build, resolve};
use kame_vm::{Machine, Mode, NullSink, RealtimeClock, Session};

/// The authoring UI's export format:
/// `{"version": "1.0", "blocks": [{"type": ..., "params": {...}}, ...]}`.
#[derive(Debug, Serialize, Deserialize)]
struct ProgramFile {
    #[serde(default = "default_version")]
    version: String,
    blocks: Vec<BlockSpec>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Print the tagged compiled source for a program file.
pub fn compile(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: compile requires an input file");
        eprintln!("Usage: kame compile <program.json>");
        return Err(1);
    }

    let blocks = load_blocks(&args[0])?;
    let lines = kame_compiler::compile(&blocks).map_err(|e| {
        eprintln!("error: {e}");
        2
    })?;
    print!("{}", render(&lines));
    Ok(())
}

/// Compile and execute a program file, then print the final machine state.
pub fn run(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: kame run <program.json> [--grid N] [--speed L] [--free]");
        return Err(1);
    }

    let blocks = load_blocks(&args[0])?;
    let (config, mode) = parse_run_flags(&args[1..])?;
    let program = build_program(&blocks)?;

    let mut session = Session::new(program, config, mode);
    let mut clock = RealtimeClock::new();
    let mut events = NullSink;
    let result = session.run(&mut clock, &mut events);
    print_state(&session);

    result.map_err(|e| {
        eprintln!("error: {e}");
        3
    })
}

/// Replay a program to step K and print the machine state at that point.
pub fn step(args: &[String]) -> Result<(), i32> {
    if args.len() < 2 {
        eprintln!("error: step requires an input file and a step count");
        eprintln!("Usage: kame step <program.json> <K>");
        return Err(1);
    }

    let blocks = load_blocks(&args[0])?;
    let target: u64 = args[1].parse().map_err(|_| {
        eprintln!("error: invalid step count '{}'", args[1]);
        1
    })?;
    let program = build_program(&blocks)?;

    let mut session = Session::new(program, RunConfig::default(), Mode::Grid);
    let mut events = NullSink;
    let result = session.step_to(target, &mut events);
    print_state(&session);

    result.map_err(|e| {
        eprintln!("error: {e}");
        3
    })
}

fn load_blocks(path: &str) -> Result<Vec<Block>, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;
    let file: ProgramFile = serde_json::from_str(&text).map_err(|e| {
        eprintln!("error: invalid program file '{path}': {e}");
        1
    })?;
    resolve(file.blocks).map_err(|e| {
        eprintln!("error: {e}");
        2
    })
}

fn build_program(blocks: &[Block]) -> Result<Program, i32> {
    let (_, program) = build(blocks).map_err(|e| {
        eprintln!("error: {e}");
        2
    })?;
    Ok(program)
}

fn parse_run_flags(args: &[String]) -> Result<(RunConfig, Mode), i32> {
    let mut config = RunConfig::default();
    let mut mode = Mode::Grid;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--grid" => {
                config.grid_size = parse_flag_value(args, i, "--grid")?;
                i += 2;
            }
            "--speed" => {
                let level: u8 = parse_flag_value(args, i, "--speed")?;
                if level > 10 {
                    eprintln!("error: --speed must be between 0 and 10");
                    return Err(1);
                }
                config.speed_level = level;
                i += 2;
            }
            "--free" => {
                mode = Mode::Free;
                i += 1;
            }
            other => {
                eprintln!("error: unknown flag '{other}'");
                return Err(1);
            }
        }
    }
    Ok((config, mode))
}

fn parse_flag_value<T: std::str::FromStr>(
    args: &[String],
    i: usize,
    flag: &str,
) -> Result<T, i32> {
    args.get(i + 1)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            eprintln!("error: {flag} requires a numeric value");
            1
        })
}

/// Print the final machine and store state in a stable, line-oriented form.
fn print_state(session: &Session) {
    let machine = session.machine();
    match machine.mode() {
        Mode::Grid => {
            let (col, row) = machine.cell();
            println!("position: {} (column {col}, row {row})", cell_label(col, row));
        }
        Mode::Free => {
            let (x, y) = machine.position();
            println!("position: ({x:.1}, {y:.1})");
        }
    }
    println!("heading: {}", machine.heading());
    println!("pen: {}", if machine.pen_is_down() { "down" } else { "up" });
    println!("steps: {}", machine.step_count);
    if machine.has_error {
        println!("status: halted on error at block {}", machine.current_block);
    } else {
        println!("status: ok");
    }

    for (name, value) in session.store().variables() {
        println!("var {name} = {value}");
    }

    print_grid(machine);
}

fn print_grid(machine: &Machine) {
    if machine.mode() != Mode::Grid {
        return;
    }
    let size = machine.config().grid_size as i64;
    for row in 0..size {
        for col in 0..size {
            let value = machine.value_at(col, row).unwrap_or(0);
            if value != 0 {
                println!("cell {} = {value}", cell_label(col, row));
            }
            if let Some(color) = machine.color_at(col, row) {
                println!("cell {} color {color}", cell_label(col, row));
            }
        }
    }
}

/// Spreadsheet-style cell label: column letter, then 1-based row (`A1` is
/// the home cell).
fn cell_label(col: i64, row: i64) -> String {
    if (0..26).contains(&col) {
        let letter = (b'A' + col as u8) as char;
        format!("{letter}{}", row + 1)
    } else {
        format!("c{col}r{row}")
    }
}
