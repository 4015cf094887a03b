use clap::Parser;
use colored::*;
use std::io;
use std::process;

use vllm_chat::cli::ProbeArgs;
use vllm_chat::config::Config;
use vllm_chat::probe::Prober;

#[tokio::main]
async fn main() {
    let args = ProbeArgs::parse();

    let config = match Config::load(&args.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            process::exit(1);
        }
    };

    let prober = match Prober::from_config(&config) {
        Ok(prober) => prober,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    let mut stdout = io::stdout();
    if !prober.run_all(&mut stdout).await {
        process::exit(1);
    }
}
