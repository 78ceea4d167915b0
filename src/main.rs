use reqbench::core;
use reqbench::status::ExitStatus;

/// Entry point - hands the command line to core::run()
///
/// Returns ExitStatus directly, which implements std::process::Termination.
fn main() -> ExitStatus {
    core::run(std::env::args_os())
}
