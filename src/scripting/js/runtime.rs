//! JavaScript runtime using QuickJS via rquickjs
//!
//! A `JsSandbox` owns nothing but its limits. Every evaluation builds a fresh
//! runtime and context so no state survives from one script to the next.
//! Promise jobs queued by the script are drained before the variables are
//! read, under the same deadline as the script itself.

use rquickjs::{Context, Ctx, Runtime, Value};
use std::time::{Duration, Instant};

use super::context::{inject_context, EXPORT_EXPR};
use crate::errors::WorkbenchError;
use crate::scripting::context::ScriptContext;

/// Resource bounds for one script evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxLimits {
    /// Wall-clock budget; the interrupt handler aborts evaluation past it
    pub timeout: Duration,
    /// QuickJS heap limit in bytes
    pub memory_limit: usize,
    /// QuickJS stack limit in bytes
    pub max_stack_size: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            memory_limit: 32 * 1024 * 1024,
            max_stack_size: 1024 * 1024,
        }
    }
}

/// JavaScript script sandbox powered by QuickJS
#[derive(Debug, Clone, Copy, Default)]
pub struct JsSandbox {
    limits: SandboxLimits,
}

impl JsSandbox {
    pub fn new(limits: SandboxLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> SandboxLimits {
        self.limits
    }

    /// Evaluate `source` against `script_ctx` and return the variable entries
    /// the script finished with.
    pub fn evaluate(
        &self,
        source: &str,
        script_ctx: &ScriptContext,
    ) -> Result<Vec<(String, String)>, WorkbenchError> {
        let runtime = Runtime::new()
            .map_err(|e| WorkbenchError::Script(format!("Failed to create JS runtime: {}", e)))?;
        runtime.set_memory_limit(self.limits.memory_limit);
        runtime.set_max_stack_size(self.limits.max_stack_size);

        let context = Context::full(&runtime)
            .map_err(|e| WorkbenchError::Script(format!("Failed to create JS context: {}", e)))?;

        // Armed after the context exists so setup time is not charged to the script
        let timeout = self.limits.timeout;
        let started = Instant::now();
        let deadline = started + timeout;
        runtime.set_interrupt_handler(Some(Box::new(move || Instant::now() >= deadline)));

        let timed_out = || WorkbenchError::Script(format!("script timed out after {:?}", timeout));

        context.with(|ctx| {
            inject_context(&ctx, script_ctx)?;

            ctx.eval::<Value, _>(source).map_err(|e| {
                if started.elapsed() >= timeout {
                    timed_out()
                } else {
                    WorkbenchError::Script(describe_error(&ctx, e))
                }
            })?;
            Ok::<_, WorkbenchError>(())
        })?;

        // Jobs run outside `with`; the runtime takes the context lock itself
        while runtime.is_job_pending() {
            if Instant::now() >= deadline {
                return Err(timed_out());
            }
            match runtime.execute_pending_job() {
                Ok(true) => {}
                Ok(false) => break,
                Err(_) if started.elapsed() >= timeout => return Err(timed_out()),
                Err(_) => {
                    return Err(WorkbenchError::Script("pending job raised an exception".to_string()));
                }
            }
        }

        context.with(|ctx| {
            let exported: String = ctx.eval(EXPORT_EXPR)
                .map_err(|e| WorkbenchError::Script(format!("Failed to read variables: {}", describe_error(&ctx, e))))?;

            let entries: Vec<(String, String)> = serde_json::from_str(&exported)?;
            Ok(entries)
        })
    }
}

/// Turn an rquickjs error into a readable message, pulling the pending
/// exception out of the context when there is one.
fn describe_error(ctx: &Ctx<'_>, err: rquickjs::Error) -> String {
    if !err.is_exception() {
        return err.to_string();
    }

    let caught = ctx.catch();
    if let Some(exception) = caught.as_exception() {
        return exception
            .message()
            .unwrap_or_else(|| "uncaught exception".to_string());
    }
    if let Some(s) = caught.as_string() {
        if let Ok(text) = s.to_string() {
            return text;
        }
    }
    format!("uncaught exception: {:?}", caught)
}
