//! CLI argument definitions using clap

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Run stored API requests and scenarios from a workspace file
#[derive(Parser, Debug, Clone)]
#[command(name = "reqbench", version, about, long_about = None)]
pub struct Args {
    /// Workspace file holding environments, requests and scenarios (YAML, JSON or TOML)
    #[arg(short = 'w', long = "workspace", value_name = "FILE", env = "REQBENCH_WORKSPACE")]
    pub workspace: PathBuf,

    /// Config file to use instead of the default location
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Request timeout (e.g. "20s", "500ms")
    #[arg(long = "timeout", value_name = "DURATION", global = true)]
    pub timeout: Option<String>,

    /// Script timeout (e.g. "5s")
    #[arg(long = "script-timeout", value_name = "DURATION", global = true)]
    pub script_timeout: Option<String>,

    /// Log format
    #[arg(long = "log-format", value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Verbose logging. Use -vv for even more verbose
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Execute one stored request and print the result as JSON
    Send {
        /// Request id
        #[arg(value_name = "REQUEST_ID")]
        request_id: i64,

        /// Environment id to resolve variables from
        #[arg(short = 'e', long = "env", value_name = "ENV_ID")]
        env: Option<i64>,
    },

    /// Run one stored scenario and print the per-step results as JSON
    Run {
        /// Scenario id
        #[arg(value_name = "SCENARIO_ID")]
        scenario_id: i64,

        /// Pass variables set by one request step on to the next
        #[arg(long = "chain-variables", action = ArgAction::SetTrue)]
        chain_variables: bool,
    },
}
