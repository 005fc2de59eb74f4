//! mig - creates migration files and scaffolds migration managers

fn main() -> std::process::ExitCode {
    mig_cli::run_tool()
}
