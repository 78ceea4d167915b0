//! Core CLI execution
//!
//! Parses arguments, loads configuration and the workspace, then runs the
//! selected command on a tokio runtime. Results go to stdout as JSON; logs
//! and errors go to stderr.

use std::io::Write;

use clap::Parser;
use serde::Serialize;
use tracing::debug;

use crate::cli::{Args, Command};
use crate::config::{parse_duration, Config};
use crate::errors::WorkbenchError;
use crate::executor::RequestExecutor;
use crate::logging;
use crate::scenario::ScenarioOptions;
use crate::status::ExitStatus;
use crate::store::MemoryStore;
use crate::workbench::Workbench;

/// Entry point used by the binary
pub fn run<I, T>(args: I) -> ExitStatus
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let parsed = match Args::try_parse_from(args) {
        Ok(parsed) => parsed,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitStatus::Error } else { ExitStatus::Success };
        }
    };

    let config = match load_config(&parsed) {
        Ok(config) => config,
        Err(e) => return handle_error(e),
    };

    if let Err(e) = logging::init(config.log_format, parsed.verbose) {
        return handle_error(e);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => return handle_error(WorkbenchError::Io(e)),
    };

    match runtime.block_on(program(parsed, config)) {
        Ok(status) => status,
        Err(e) => handle_error(e),
    }
}

/// Load config and apply command-line overrides
pub fn load_config(args: &Args) -> Result<Config, WorkbenchError> {
    let mut config = match args.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(ref timeout) = args.timeout {
        config.request_timeout = parse_duration("--timeout", timeout)?;
    }
    if let Some(ref timeout) = args.script_timeout {
        config.script_timeout = parse_duration("--script-timeout", timeout)?;
    }
    if let Some(format) = args.log_format {
        config.log_format = format;
    }
    Ok(config)
}

pub async fn program(args: Args, config: Config) -> Result<ExitStatus, WorkbenchError> {
    debug!(workspace = %args.workspace.display(), "Loading workspace");
    let store = MemoryStore::load(&args.workspace)?;
    let executor = RequestExecutor::from_config(&config)?;

    match args.command {
        Command::Send { request_id, env } => {
            let result = Workbench::new(executor, store).execute_request(request_id, env).await?;
            print_json(&result)?;
            Ok(ExitStatus::for_request(&result))
        }
        Command::Run { scenario_id, chain_variables } => {
            let result = Workbench::new(executor, store)
                .with_options(ScenarioOptions { chain_variables })
                .run_scenario(scenario_id)
                .await?;
            print_json(&result)?;
            Ok(ExitStatus::for_scenario(&result))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), WorkbenchError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn handle_error(error: WorkbenchError) -> ExitStatus {
    eprintln!("Error: {}", error);
    ExitStatus::Error
}
