use std::process::ExitCode;

fn main() -> ExitCode {
    perfex_cli::run()
}
