#![forbid(unsafe_code)]

//! ayur: Ayurvedic remedy lookup CLI entry point.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        if !e.is_reported() {
            eprintln!("ayur: {e}");
        }
        std::process::exit(e.exit_code());
    }
}
