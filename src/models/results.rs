//! Results produced by the engine
//!
//! Every operation hands back one of these rather than an error, so the
//! serialized shapes match what a caller of the workbench API sees:
//! `{ok, status, headers, data, env}` on success, `{ok: false, error}` on
//! dispatch failure.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::types::HeadersDict;
use crate::variables::VariableStore;

// =============================================================================
// RESPONSE BODY
// =============================================================================

/// Decoded response body: parsed JSON when possible, raw text otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(JsonValue),
    Text(String),
}

impl ResponseBody {
    /// Decode raw bytes. A JSON document that is just a string counts as text.
    pub fn decode(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<JsonValue>(bytes) {
            Ok(JsonValue::String(s)) => ResponseBody::Text(s),
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    pub fn json(&self) -> Option<&JsonValue> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(_) => None,
            ResponseBody::Text(text) => Some(text),
        }
    }
}

// =============================================================================
// REQUEST EXECUTION
// =============================================================================

/// Outcome of executing one request definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeadersDict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<VariableStore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn success(status: u16, headers: HeadersDict, data: ResponseBody, env: VariableStore) -> Self {
        Self {
            ok: true,
            status: Some(status),
            headers: Some(headers),
            data: Some(data),
            env: Some(env),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: None,
            headers: None,
            data: None,
            env: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// Opaque result reported by an action runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub ok: bool,
    #[serde(flatten)]
    pub payload: Map<String, JsonValue>,
}

impl ActionOutcome {
    pub fn success(payload: Map<String, JsonValue>) -> Self {
        Self { ok: true, payload }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("error".to_string(), JsonValue::String(error.into()));
        Self { ok: false, payload }
    }

    pub fn with(mut self, key: &str, value: JsonValue) -> Self {
        self.payload.insert(key.to_string(), value);
        self
    }
}

// =============================================================================
// SCENARIOS
// =============================================================================

/// Result of one scenario step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepOutcome {
    Request(ExecutionResult),
    Action(ActionOutcome),
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        match self {
            StepOutcome::Request(result) => result.ok,
            StepOutcome::Action(outcome) => outcome.ok,
        }
    }

    pub fn as_request(&self) -> Option<&ExecutionResult> {
        match self {
            StepOutcome::Request(result) => Some(result),
            StepOutcome::Action(_) => None,
        }
    }
}

/// `{step, result}` entry of a scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: i64,
    pub result: StepOutcome,
}

/// Ordered per-step results of a scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_id: i64,
    pub results: Vec<StepReport>,
}

impl ScenarioResult {
    pub fn all_ok(&self) -> bool {
        self.results.iter().all(|report| report.result.is_ok())
    }

    pub fn failed_steps(&self) -> Vec<i64> {
        self.results
            .iter()
            .filter(|report| !report.result.is_ok())
            .map(|report| report.step)
            .collect()
    }
}
