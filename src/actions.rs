//! Action runner contract
//!
//! Action steps hand off to external automation backends (browser flows,
//! remote database calls). The core only knows their id and the outcome.

use std::future::Future;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::models::ActionOutcome;

/// Runs one action by id. Failures are reported through `ok: false`.
pub trait ActionRunner: Send + Sync {
    fn run(&self, action_id: i64) -> impl Future<Output = ActionOutcome> + Send;
}

/// Runner used when no automation backend is attached
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableActionRunner;

impl ActionRunner for UnavailableActionRunner {
    async fn run(&self, action_id: i64) -> ActionOutcome {
        debug!(action_id, "No action runner configured");
        ActionOutcome::failure("no action runner configured").with("action_id", JsonValue::from(action_id))
    }
}
