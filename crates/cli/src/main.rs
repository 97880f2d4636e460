use std::process::ExitCode;

fn main() -> ExitCode {
    roamly_cli::run()
}
