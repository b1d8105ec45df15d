use std::process::ExitCode;

fn main() -> ExitCode {
    starter_packs_lib::run()
}
