//! Exit status codes for the CLI
//!
//! - 0: every request or step reported `ok: true`
//! - 1: any error (unknown id, unreadable workspace, bad configuration)
//! - 10: the run finished but some request or step reported `ok: false`

use std::process::{ExitCode, Termination};

use crate::models::{ExecutionResult, ScenarioResult};

/// Exit code for runs with failed requests or steps
pub const EXIT_STEP_FAILED: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    Error = 1,
    StepFailed = EXIT_STEP_FAILED,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

impl ExitStatus {
    pub fn from_ok(ok: bool) -> Self {
        if ok {
            ExitStatus::Success
        } else {
            ExitStatus::StepFailed
        }
    }

    pub fn for_request(result: &ExecutionResult) -> Self {
        Self::from_ok(result.ok)
    }

    pub fn for_scenario(result: &ScenarioResult) -> Self {
        Self::from_ok(result.all_ok())
    }
}
