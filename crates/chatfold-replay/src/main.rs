//! Replays a JSON-lines capture of chat response updates and prints the folded response.

mod config;
mod replay;

use clap::Parser;

use crate::replay::{ReplayArgs, run};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_files = config::init();
    chatfold_core::init_observability();
    env_files.log();
    let args = ReplayArgs::parse();
    let output = run(&args)?;
    println!("{output}");
    Ok(())
}
