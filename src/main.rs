use std::process::ExitCode;

use dirlink::output as out;

mod app;
mod logging;

fn main() -> ExitCode {
    let args = dirlink::cli::parse();
    match app::run(args) {
        Ok(code) => code,
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            ExitCode::from(app::EXIT_FAILURE)
        }
    }
}
