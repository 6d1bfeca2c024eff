use std::process::ExitCode;

fn main() -> ExitCode {
    rocketshoes_cli::run()
}
