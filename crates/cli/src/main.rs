//! APEX cycle-accurate simulator CLI.
//!
//! Loads a text assembly program and drops into the interactive shell:
//! `i` initialize, `s` run to HALT or the cycle limit, `d` display machine
//! state, `m` inspect a data-memory word, `q` quit.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use apex_core::config::Config;
use apex_core::sim::display;
use apex_core::sim::loader;
use apex_core::sim::{RunOutcome, Simulator};

mod shell;

use shell::Command;

#[derive(Parser, Debug)]
#[command(
    name = "apex",
    author,
    version,
    about = "APEX out-of-order pipeline simulator",
    long_about = "Simulate an APEX assembly program on a cycle-accurate \
out-of-order pipeline.\n\nExamples:\n  apex programs/sum.asm 500\n  \
apex --config machine.json programs/sum.asm 500"
)]
struct Cli {
    /// Assembly program file.
    program: String,

    /// Cycle limit for `s` runs.
    cycles: u64,

    /// Optional JSON machine-configuration override.
    #[arg(long)]
    config: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("apex: {message}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!("APEX CPU Pipeline Simulator");
    run_shell(&cli, &config)
}

fn load_config(path: Option<&str>) -> Result<Config, String> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read config '{path}': {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("bad config '{path}': {e}"))
}

fn run_shell(cli: &Cli, config: &Config) -> ExitCode {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut sim: Option<Simulator> = None;

    loop {
        println!(
            "\nPress <i> to initialize, <s> to simulate, <d> to display state, \
<m> to show memory, <q> to quit"
        );
        let _ = io::stdout().flush();

        let Some(Ok(line)) = lines.next() else {
            return ExitCode::SUCCESS; // EOF
        };
        match Command::parse(&line) {
            None => continue,
            Some(Command::Init) => match loader::load_program(&cli.program, config) {
                Ok(program) => {
                    sim = Some(Simulator::new(program, config));
                    println!("Initialized; cycle limit = {}", cli.cycles);
                }
                Err(e) => {
                    eprintln!("apex: {e}");
                    return ExitCode::FAILURE;
                }
            },
            Some(Command::Step) => {
                let Some(sim) = sim.as_mut() else {
                    eprintln!("apex: not initialized (use 'i' first)");
                    continue;
                };
                match sim.run(cli.cycles) {
                    RunOutcome::Halted => {
                        println!("Simulation complete: {}", sim.stats);
                    }
                    RunOutcome::CycleLimit => {
                        println!("Cycle limit reached: {}", sim.stats);
                    }
                }
                print!("{}", display::register_report(sim));
            }
            Some(Command::Display) => {
                let Some(sim) = sim.as_ref() else {
                    eprintln!("apex: not initialized (use 'i' first)");
                    continue;
                };
                print!("{}", display::register_report(sim));
                print!("{}", display::pipeline_report(sim));
                print!("{}", display::memory_report(sim));
            }
            Some(Command::Memory) => {
                let Some(sim) = sim.as_ref() else {
                    eprintln!("apex: not initialized (use 'i' first)");
                    continue;
                };
                println!("Enter the memory address:");
                let _ = io::stdout().flush();
                let Some(Ok(addr_line)) = lines.next() else {
                    return ExitCode::SUCCESS;
                };
                match addr_line.trim().parse::<i32>() {
                    Ok(addr) => println!("MEM[{addr}] = {}", sim.mem_word(addr)),
                    Err(_) => eprintln!("apex: bad address '{}'", addr_line.trim()),
                }
            }
            Some(Command::Quit) => return ExitCode::SUCCESS,
        }
    }
}
