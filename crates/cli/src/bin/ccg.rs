use std::process::ExitCode;

fn main() -> ExitCode {
    ccg_cli::main_entry()
}
