// Tue Jan 13 2026 - Alex

use pclntab_resolver::ui;
use std::process::ExitCode;

fn main() -> ExitCode {
    match ui::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
