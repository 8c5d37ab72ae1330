use mfetch_core::logging;

mod cli;

use crate::cli::Cli;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    if logging::init_logging(cli.global.verbose).is_err() {
        logging::init_logging_stderr(cli.global.verbose);
    }

    match cli.run() {
        Ok(report) if report.failed > 0 => {
            eprintln!("mfetch: {} of {} request(s) failed", report.failed, report.completed);
            std::process::exit(2);
        }
        Ok(_) => {}
        Err(err) => {
            eprintln!("mfetch error: {:#}", err);
            std::process::exit(1);
        }
    }
}
