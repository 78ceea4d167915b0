//! Record types the engine reads from the record store
//!
//! These are immutable snapshots. The engine never writes them back.
//!
//! # Why IndexMap?
//!
//! Header order and variable order are visible to users (in scripts, in
//! results, in the wire request), so every user-facing dictionary preserves
//! insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// =============================================================================
// TYPE ALIASES
// =============================================================================

/// Request headers as stored: name -> JSON value (coerced to text at execution)
pub type RequestHeaders = IndexMap<String, JsonValue>;

/// Resolved header dictionary - header name to value, in order
pub type HeadersDict = IndexMap<String, String>;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// A named set of variables usable for substitution and scripts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub variables: Vec<EnvironmentVariable>,
}

/// One environment variable
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub is_secret: bool,
}

impl EnvironmentVariable {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            is_secret: false,
        }
    }

    pub fn secret(key: &str, value: &str) -> Self {
        Self {
            is_secret: true,
            ..Self::new(key, value)
        }
    }
}

// Secret values must not leak through `{:?}` in logs
impl fmt::Debug for EnvironmentVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.is_secret { "[REDACTED]" } else { self.value.as_str() };
        f.debug_struct("EnvironmentVariable")
            .field("key", &self.key)
            .field("value", &value)
            .field("is_secret", &self.is_secret)
            .finish()
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// Declared encoding of a request body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PayloadType {
    #[default]
    Json,
    Xml,
    Form,
    /// Plain text; also used for any unrecognized declaration
    Text,
}

impl PayloadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadType::Json => "json",
            PayloadType::Xml => "xml",
            PayloadType::Form => "form",
            PayloadType::Text => "text",
        }
    }
}

impl From<&str> for PayloadType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => PayloadType::Json,
            "xml" => PayloadType::Xml,
            "form" => PayloadType::Form,
            _ => PayloadType::Text,
        }
    }
}

impl From<String> for PayloadType {
    fn from(s: String) -> Self {
        PayloadType::from(s.as_str())
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_method() -> String {
    "GET".to_string()
}

/// A stored HTTP request with optional pre/post scripts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDefinition {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_method")]
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: RequestHeaders,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub payload_type: PayloadType,
    /// JavaScript run before the request is built
    #[serde(default)]
    pub pre_script: String,
    /// JavaScript run after a response is received
    #[serde(default)]
    pub post_script: String,
}

impl RequestDefinition {
    pub fn new(id: i64, method: &str, url: &str) -> Self {
        Self {
            id,
            name: String::new(),
            method: method.to_string(),
            url: url.to_string(),
            headers: RequestHeaders::new(),
            body: String::new(),
            payload_type: PayloadType::default(),
            pre_script: String::new(),
            post_script: String::new(),
        }
    }
}

// =============================================================================
// SCENARIO
// =============================================================================

/// What a scenario step points at. `ref_id` lives in a different table per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step_type", rename_all = "lowercase")]
pub enum StepTarget {
    Request { ref_id: i64 },
    Action { ref_id: i64 },
}

/// One ordered step of a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub id: i64,
    pub order: i64,
    #[serde(flatten)]
    pub target: StepTarget,
}

impl ScenarioStep {
    pub fn request(id: i64, order: i64, ref_id: i64) -> Self {
        Self { id, order, target: StepTarget::Request { ref_id } }
    }

    pub fn action(id: i64, order: i64, ref_id: i64) -> Self {
        Self { id, order, target: StepTarget::Action { ref_id } }
    }
}

/// An ordered, best-effort batch of request and action steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Environment to run against; the store's default environment if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<i64>,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Steps in ascending `order`; steps sharing an order keep their listed order
    pub fn ordered_steps(&self) -> Vec<&ScenarioStep> {
        let mut steps: Vec<&ScenarioStep> = self.steps.iter().collect();
        steps.sort_by_key(|step| step.order);
        steps
    }
}
