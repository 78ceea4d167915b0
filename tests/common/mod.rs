//! Common test utilities for reqbench integration tests
//!
//! - Executor and environment builders for library-level tests
//! - Workspace fixtures and CLI invocation helpers

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use reqbench::http::HttpDispatcher;
use reqbench::models::{Environment, EnvironmentVariable};
use reqbench::scripting::ScriptSandbox;
use reqbench::executor::RequestExecutor;
use tempfile::TempDir;

/// Executor with default timeouts and sandbox limits
pub fn executor() -> RequestExecutor {
    RequestExecutor::new(HttpDispatcher::new().unwrap(), ScriptSandbox::default())
}

/// Environment from `(key, value)` pairs
pub fn environment(id: i64, vars: &[(&str, &str)]) -> Environment {
    Environment {
        id,
        name: format!("env-{}", id),
        description: String::new(),
        variables: vars.iter().map(|(k, v)| EnvironmentVariable::new(k, v)).collect(),
    }
}

/// A local port with nothing listening on it
pub fn unused_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

/// Temporary directory holding a workspace file and an empty config file
pub struct Fixture {
    dir: TempDir,
    workspace: PathBuf,
    config: PathBuf,
}

impl Fixture {
    pub fn new(file_name: &str, content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path().join(file_name);
        std::fs::write(&workspace, content).unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "").unwrap();
        Self { dir, workspace, config }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// `reqbench` command pointed at this fixture
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("reqbench").unwrap();
        cmd.env_remove("RUST_LOG")
            .env_remove("REQBENCH_WORKSPACE")
            .arg("--workspace")
            .arg(&self.workspace)
            .arg("--config")
            .arg(&self.config)
            .args(["--timeout", "2s"]);
        cmd
    }
}
