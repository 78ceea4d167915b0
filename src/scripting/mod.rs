//! Scripting support for reqbench
//!
//! Pre-request and post-response scripts are user-authored JavaScript run in
//! a QuickJS sandbox. The sandbox is fail-open: a script that does not parse,
//! throws, runs out of time or memory leaves the variables exactly as they
//! were, and the request carries on as if the script were empty.

pub mod context;
pub mod js;

pub use context::{RequestSnapshot, ResponseSnapshot, ScriptContext};
pub use js::{JsSandbox, SandboxLimits};

use tracing::{debug, warn};

/// Where in the request lifecycle a script runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPhase {
    /// Before the payload is encoded and sent
    PreRequest,
    /// After a response was received
    PostResponse,
}

impl ScriptPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptPhase::PreRequest => "pre_request",
            ScriptPhase::PostResponse => "post_response",
        }
    }
}

/// Fail-open script runner
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptSandbox {
    engine: JsSandbox,
}

impl ScriptSandbox {
    pub fn new(limits: SandboxLimits) -> Self {
        Self { engine: JsSandbox::new(limits) }
    }

    pub fn limits(&self) -> SandboxLimits {
        self.engine.limits()
    }

    /// Run `script` against `ctx` and return the context it finished with.
    ///
    /// Only `env` can change. On any failure the input context is returned
    /// untouched.
    pub fn run(&self, script: &str, phase: ScriptPhase, ctx: ScriptContext) -> ScriptContext {
        if script.trim().is_empty() {
            return ctx;
        }

        match self.engine.evaluate(script, &ctx) {
            Ok(entries) => {
                let env = ctx.env.merged_with(entries);
                debug!(
                    phase = phase.as_str(),
                    variables = env.len(),
                    "Script completed"
                );
                ScriptContext { env, ..ctx }
            }
            Err(e) => {
                warn!(phase = phase.as_str(), error = %e, "Script failed; keeping original environment");
                ctx
            }
        }
    }

    /// [`run`](Self::run) on the blocking thread pool.
    ///
    /// Script evaluation is CPU-bound and may take up to the configured
    /// timeout, so it must not occupy an async worker thread.
    pub async fn run_blocking(&self, script: &str, phase: ScriptPhase, ctx: ScriptContext) -> ScriptContext {
        if script.trim().is_empty() {
            return ctx;
        }

        let sandbox = *self;
        let source = script.to_string();
        let fallback = ctx.clone();

        match tokio::task::spawn_blocking(move || sandbox.run(&source, phase, ctx)).await {
            Ok(finished) => finished,
            Err(e) => {
                warn!(phase = phase.as_str(), error = %e, "Script task failed; keeping original environment");
                fallback
            }
        }
    }
}
