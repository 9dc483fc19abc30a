//! Interactive front end: one command per line on stdin.
//!
//! Usage: `containers [config.json]`. Set `RUST_LOG=debug` to trace table
//! activity.

use keyed_containers::{ContainerManager, ManagerConfig, Outcome};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => match ManagerConfig::from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("cannot read config {}: {e}", path.to_string_lossy());
                return ExitCode::FAILURE;
            }
        },
        None => ManagerConfig::default(),
    };
    log::debug!("starting with {config:?}");

    let mut manager = ContainerManager::new(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("Type HELP for the command list.");
    loop {
        print!("> ");
        let _ = stdout.flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("error reading input: {e}");
                return ExitCode::FAILURE;
            }
        }
        match manager.execute(&line) {
            Ok(Outcome::Output(text)) => println!("{text}"),
            Ok(Outcome::Silent) => {}
            Ok(Outcome::Exit) => break,
            Err(e) => eprintln!("error: {e}"),
        }
    }
    ExitCode::SUCCESS
}
