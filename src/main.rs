use std::process::ExitCode;

use adt::ui::output;

fn main() -> ExitCode {
    match adt::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(format!("{:#}", e));
            ExitCode::from(1)
        }
    }
}
